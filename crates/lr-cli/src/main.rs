use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use lr_core::Category;
use tracing_subscriber::EnvFilter;

use lr_cli::commands::video::VideoRest;
use lr_cli::commands::{countdown, reset, resolve, today, video};
use lr_cli::{Cli, Commands, Config, session};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = io::stdout();
    match &cli.command {
        Some(Commands::Learn { minutes }) => {
            let mut session = session::open(&config);
            let minutes = minutes.unwrap_or_else(|| i64::from(config.learn_minutes));
            countdown::run(
                &mut stdout,
                &mut session,
                Category::Learning,
                minutes,
                config.tick_interval(),
            )
            .await?;
            session.teardown();
        }
        Some(Commands::Rest {
            minutes,
            video: reference,
            duration,
            open,
        }) => {
            let mut session = session::open(&config);
            match (reference, duration) {
                (Some(input), Some(duration_seconds)) => {
                    let options = VideoRest {
                        input: input.clone(),
                        duration_seconds: *duration_seconds,
                        open: *open,
                    };
                    video::run(&mut stdout, &mut session, &options, config.tick_interval()).await?;
                }
                _ => {
                    let minutes = minutes.unwrap_or_else(|| i64::from(config.rest_minutes));
                    countdown::run(
                        &mut stdout,
                        &mut session,
                        Category::Rest,
                        minutes,
                        config.tick_interval(),
                    )
                    .await?;
                }
            }
            session.teardown();
        }
        Some(Commands::Today { json }) => {
            let session = session::open(&config);
            today::run(&mut stdout, &session, *json)?;
        }
        Some(Commands::Reset) => {
            let mut session = session::open(&config);
            reset::run(&mut stdout, &mut session)?;
        }
        Some(Commands::Resolve { input }) => {
            resolve::run(&mut stdout, input)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
