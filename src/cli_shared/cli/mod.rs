// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod client;
mod config;

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::utils::misc::LoggingColor;

pub use self::{
    client::Client,
    config::{Config, LogConfig, LogValue},
};

/// Environment variable pointing at a configuration file.
pub const CONFIG_PATH_ENV: &str = "DAPP_CONFIG_PATH";

/// Options accepted by every subcommand.
#[derive(Default, Debug, clap::Args)]
pub struct CliOpts {
    /// A TOML file containing relevant configurations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Also write logs to rolling daily files in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
    /// Print console logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
    /// Enable or disable colored logging
    #[arg(long, global = true, default_value_t = LoggingColor::Auto)]
    pub color: LoggingColor,
}

/// Where the configuration file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigPath {
    Cli(PathBuf),
    Env(PathBuf),
    Project(PathBuf),
}

impl ConfigPath {
    pub fn to_path_buf(&self) -> &PathBuf {
        match self {
            ConfigPath::Cli(path) | ConfigPath::Env(path) | ConfigPath::Project(path) => path,
        }
    }
}

/// `--config` first, then [`CONFIG_PATH_ENV`], then `config.toml` in the
/// project configuration directory if it exists.
pub fn find_config_path(config: Option<&PathBuf>) -> Option<ConfigPath> {
    if let Some(path) = config {
        return Some(ConfigPath::Cli(path.clone()));
    }
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Some(ConfigPath::Env(path.into()));
    }
    let path = ProjectDirs::from("io", "ChainSafe", "secret-dapp-deploy")?
        .config_dir()
        .join("config.toml");
    path.exists().then_some(ConfigPath::Project(path))
}
