// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::ffi::OsString;

use clap::Parser;
use tracing::info;

use super::subcommands::{Cli, Subcommand};
use crate::cli_shared::{logger, read_config};

pub fn main<ArgT>(args: impl IntoIterator<Item = ArgT>) -> anyhow::Result<()>
where
    ArgT: Into<OsString> + Clone,
{
    // Capture Cli inputs
    let Cli { opts, cmd } = Cli::parse_from(args);
    let (config_path, config) = read_config(opts.config.as_ref())?;
    let _guards = logger::setup_logger(&opts, &config.log);
    if let Some(path) = &config_path {
        info!("using config file {}", path.to_path_buf().display());
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            match cmd {
                Subcommand::Store(cmd) => cmd.run(&config).await,
                Subcommand::Migrate(cmd) => cmd.run(&config).await,
                Subcommand::Config(cmd) => cmd.run(&config, &mut std::io::stdout()),
            }
        })
}
