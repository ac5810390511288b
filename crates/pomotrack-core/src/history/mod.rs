mod aggregate;
mod store;

pub use aggregate::{
    is_valid_label_format, percent_of_goal, DailyProgress, DayBucket, HistoryAggregator,
    DAILY_GOAL, DEFAULT_DAY_LABEL_FORMAT, WEEK_DAYS,
};
pub use store::{startup_prune_cutoff, HistoryStore, HISTORY_KEY, RETENTION_DAYS};
