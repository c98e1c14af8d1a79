use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use shared::domain::{format_clock, SessionConfig, TimerPhase};
use timer_core::{
    bootstrap_store, dispatch, MissingPubSubChannel, MissingSessionBootstrap, SyncBridge,
    TickScheduler, TimerStore, UserIntent,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

mod config;

use config::load_settings;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Surface {
    SidePanel,
    MainStage,
}

impl Surface {
    fn as_str(self) -> &'static str {
        match self {
            Surface::SidePanel => "side-panel",
            Surface::MainStage => "main-stage",
        }
    }
}

#[derive(Parser, Debug)]
struct Args {
    /// Which add-on surface this process hosts.
    #[arg(long, value_enum, default_value = "side-panel")]
    surface: Surface,
    /// Overrides the configured countdown default.
    #[arg(long)]
    default_seconds: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(seconds) = args.default_seconds.filter(|seconds| *seconds > 0) {
        settings.default_seconds = seconds;
    }

    let store = bootstrap_store(
        &MissingSessionBootstrap,
        SessionConfig {
            default_seconds: settings.default_seconds,
        },
    )
    .await;
    let _ticker = TickScheduler::spawn(Arc::clone(&store));

    // The platform pub/sub transport is a stub; the bridge degrades to
    // local-only mode until it is wired.
    let bridge = SyncBridge::new(
        Arc::clone(&store),
        Arc::new(MissingPubSubChannel),
        settings.sync_topic.clone(),
    );
    let _sync = match bridge.run().await {
        Ok(handle) => Some(handle),
        Err(err) => {
            warn!("cross-surface sync disabled, running local-only: {err}");
            None
        }
    };

    info!(surface = args.surface.as_str(), topic = %settings.sync_topic, "surface ready");
    println!("commands: start|pause|reset|remove <id>, add <name>, pause_all, reset_all, set_default <seconds>, show, quit");
    render(&store).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" | "show" => render(&store).await,
            "quit" | "exit" => break,
            _ => match UserIntent::parse(line) {
                Some(intent) => {
                    dispatch(&store, intent).await;
                    render(&store).await;
                }
                None => println!("unrecognized command: {line}"),
            },
        }
    }

    Ok(())
}

async fn render(store: &TimerStore) {
    let snapshot = store.snapshot().await;
    if snapshot.is_empty() {
        println!("(no participants)");
        return;
    }
    for timer in snapshot {
        let status = match timer.phase() {
            TimerPhase::Overtime => "time exceeded",
            TimerPhase::Running => "in progress",
            TimerPhase::Paused => "paused",
        };
        println!(
            "{:>8}  {:<14}  {}  [{}]",
            format_clock(timer.remaining_seconds),
            status,
            timer.name,
            timer.id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_argument_accepts_only_known_surfaces() {
        let args = Args::try_parse_from(["timebox", "--surface", "main-stage"]).expect("parse");
        assert_eq!(args.surface, Surface::MainStage);

        let args = Args::try_parse_from(["timebox"]).expect("parse");
        assert_eq!(args.surface, Surface::SidePanel);

        assert!(Args::try_parse_from(["timebox", "--surface", "lobby"]).is_err());
    }
}

