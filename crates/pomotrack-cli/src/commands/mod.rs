pub mod config;
pub mod history;
pub mod stats;
pub mod timer;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;
