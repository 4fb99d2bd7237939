// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Registry, prelude::*};

use crate::cli_shared::cli::{CliOpts, LogConfig};

pub const LOG_FILE_NAME: &str = "dapp-deploy.log";

/// Keeps the file writer flushing until dropped at the end of `main`.
#[derive(Default)]
pub struct Guards {
    _file: Option<WorkerGuard>,
}

/// Console logs go to stderr so stdout carries only command output.
pub fn setup_logger(opts: &CliOpts, log: &LogConfig) -> Guards {
    let mut guards = Guards::default();
    let console = tracing_subscriber::fmt::Layer::new()
        .with_ansi(opts.color.coloring_enabled())
        .with_writer(std::io::stderr);
    let mut layers: Vec<Box<dyn tracing_subscriber::layer::Layer<Registry> + Send + Sync>> =
        vec![if opts.log_json {
            console
                .json()
                .with_filter(get_env_filter(default_env_filter(log)))
                .boxed()
        } else {
            console
                .with_filter(get_env_filter(default_env_filter(log)))
                .boxed()
        }];

    if let Some(log_dir) = &opts.log_dir {
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME));
        guards._file = Some(guard);
        layers.push(
            tracing_subscriber::fmt::Layer::new()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(get_env_filter(default_env_filter(log)))
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).init();
    guards
}

/// Returns an [`EnvFilter`] according to the `RUST_LOG` environment variable,
/// or `def` when it is unset.
fn get_env_filter(def: EnvFilter) -> EnvFilter {
    use std::env::{
        self,
        VarError::{NotPresent, NotUnicode},
    };
    match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(s) => EnvFilter::new(s),
        Err(NotPresent) => def,
        Err(NotUnicode(_)) => EnvFilter::default(),
    }
}

/// `info` plus the configured module filters. Filters that fail to parse are
/// skipped with the rest kept.
fn default_env_filter(log: &LogConfig) -> EnvFilter {
    let directives = format!("info,{}", log.to_filter_string());
    EnvFilter::builder().parse_lossy(directives.trim_end_matches(','))
}
