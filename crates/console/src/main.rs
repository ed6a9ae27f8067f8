//! Raid admin console.
//!
//! Reads one admin command per stdin line and drives an in-process raid runtime
//! backed by the logging collaborators and an in-memory world. Logs go to stderr,
//! command output to stdout.
//!
//! # Examples
//!
//! ```bash
//! RUST_LOG=raid=debug cargo run -p raid-console
//! > raid lapras
//! > join 1 --battle 11
//! > faint 1 11
//! > status
//! ```

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use commands::{Console, ConsoleLine, Flow};
use config::ConsoleConfig;
use raid_runtime::{RaidRuntime, RaidRuntimeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ConsoleConfig::from_env();
    let raid_config = config.load_raid_config()?;
    let bosses = config.load_bosses()?;
    tracing::info!(
        bosses = bosses.bosses.len(),
        duration_seconds = raid_config.duration_seconds,
        "Content loaded"
    );

    let mut runtime_config = RaidRuntimeConfig::default();
    if let Some(interval) = config.tick_interval {
        runtime_config.tick_interval = interval;
    }
    let runtime = RaidRuntime::builder()
        .config(runtime_config)
        .raid_config(raid_config)
        .build()?;
    let console = Console::new(runtime.handle(), bosses);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        let command = match ConsoleLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(error) => {
                let _ = error.print();
                continue;
            }
        };
        match console.execute(command).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(error) => eprintln!("error: {error:#}"),
        }
    }

    drop(console);
    runtime.shutdown().await?;
    Ok(())
}
