//! CLI subcommand implementations.

pub mod countdown;
pub mod reset;
pub mod resolve;
pub mod today;
pub mod util;
pub mod video;
