// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup: file-appended, non-blocking, env-filtered tracing.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;

pub fn setup_logging(
    config: &Config,
) -> std::io::Result<tracing_appender::non_blocking::WorkerGuard> {
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config
            .log_path
            .parent()
            .unwrap_or_else(|| std::path::Path::new(".")),
        config
            .log_path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("relayd.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
