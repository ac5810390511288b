//! Plain-text rendering of engine and statistics values.

use pomotrack_core::history::DAILY_GOAL;
use pomotrack_core::{DailyProgress, DayBucket, Phase, RemainingDisplay, TimerStatus};

/// `2 / 4 (50%)`
pub fn progress_line(progress: &DailyProgress) -> String {
    format!("{} / {} ({}%)", progress.count, DAILY_GOAL, progress.percent)
}

/// `[Work] 24:59` with a suffix while paused or stopped.
pub fn countdown_line(phase: Phase, status: TimerStatus, display: RemainingDisplay) -> String {
    let suffix = match status {
        TimerStatus::Running => "",
        TimerStatus::Paused => " (paused)",
        TimerStatus::Stopped => " (stopped)",
    };
    format!("[{}] {display}{suffix}", phase.label())
}

/// Three rows (label, count, percent), one column per day, oldest first.
pub fn week_table(buckets: &[DayBucket]) -> String {
    let cells: Vec<[String; 3]> = buckets
        .iter()
        .map(|b| {
            [
                b.day_label.clone(),
                b.count.to_string(),
                format!("{}%", b.percent),
            ]
        })
        .collect();
    let width = cells
        .iter()
        .flat_map(|c| c.iter().map(|s| s.chars().count()))
        .max()
        .unwrap_or(0);

    let row = |i: usize| -> String {
        cells
            .iter()
            .map(|c| format!("{:>width$}", c[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    [
        format!("day    {}", row(0)),
        format!("done   {}", row(1)),
        format!("goal   {}", row(2)),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pomotrack_core::Timestamp;

    fn bucket(label: &str, count: u32) -> DayBucket {
        DayBucket {
            day_label: label.into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            day_start: Timestamp::from_millis(0),
            count,
            percent: f64::from(count) * 25.0,
        }
    }

    #[test]
    fn progress_line_formats_whole_percent() {
        let p = DailyProgress {
            count: 2,
            percent: 50.0,
        };
        assert_eq!(progress_line(&p), "2 / 4 (50%)");
    }

    #[test]
    fn progress_line_is_not_capped() {
        let p = DailyProgress {
            count: 5,
            percent: 125.0,
        };
        assert_eq!(progress_line(&p), "5 / 4 (125%)");
    }

    #[test]
    fn countdown_line_marks_paused() {
        let d = RemainingDisplay {
            minutes: 9,
            seconds: 5,
        };
        assert_eq!(countdown_line(Phase::Work, TimerStatus::Running, d), "[Work] 9:05");
        assert_eq!(
            countdown_line(Phase::Work, TimerStatus::Paused, d),
            "[Work] 9:05 (paused)"
        );
    }

    #[test]
    fn week_table_aligns_columns() {
        let table = week_table(&[bucket("03/01", 2), bucket("03/02", 0)]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "day    03/01  03/02");
        assert_eq!(lines[1], "done       2      0");
        assert_eq!(lines[2], "goal     50%     0%");
    }
}
