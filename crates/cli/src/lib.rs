pub mod cli;
pub mod commands;
pub mod dry_run;
pub mod error;
pub mod logging;
pub mod output;
pub mod styles;
