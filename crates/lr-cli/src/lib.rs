//! Learn/rest timer CLI library.
//!
//! This crate provides the terminal host for the timer core: configuration,
//! the event loop driving engine ticks, and a headless stand-in for the
//! embedded video player.

mod cli;
pub mod commands;
mod config;
pub mod headless;
pub mod input;
pub mod notify;
pub mod session;
pub mod ticker;

pub use cli::{Cli, Commands};
pub use config::Config;
