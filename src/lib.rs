pub mod config;
pub mod journal;
pub mod output;
pub mod report;
