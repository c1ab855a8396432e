// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! relayd — background process hosting the task router (C3), the
//! scoped avatar cache (C2), and the event ingest services (C5).
//!
//! A concrete chat-platform subscriber is out of scope; this binary
//! wires every in-scope component together and idles on the router's
//! own background work (sweep, retries, cron) until a shutdown signal
//! arrives.

mod config;
mod env;
mod logging;
mod wiring;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("relayd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("relayd {}", env!("CARGO_PKG_VERSION"));
                println!("Background process hosting the task router, avatar cache, and event ingest services.");
                println!();
                println!("USAGE:");
                println!("    relayd");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: relayd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;
    let log_guard = logging::setup_logging(&config)?;

    info!(state_dir = %config.state_dir.display(), "starting relay daemon");

    let daemon = wiring::build(&config);

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("daemon ready");
    println!("READY");

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    daemon.router.close().await;
    if let Err(err) = daemon.avatar_store.save() {
        error!(error = %err, "final avatar cache save failed");
    }

    info!("daemon stopped");
    drop(log_guard);
    Ok(())
}
