// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::PathBuf;

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use dapp::{Client, Config};
use tempfile::TempDir;

/// The binary with every environment variable it reads cleared.
pub fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("dapp-deploy");
    cmd.env_remove("DAPP_CONFIG_PATH")
        .env_remove("DAPP_NODE_TYPE")
        .env_remove("TEST_ENV")
        .env_remove("CONTRACT_PATH")
        .env_remove("SECRET_SIGNER_API_INFO")
        .env_remove("RUST_LOG")
        .arg("--color")
        .arg("never");
    cmd
}

/// Writes a configuration whose directories all live in a fresh temp dir.
pub fn create_tmp_config() -> (PathBuf, TempDir) {
    let temp_dir = tempfile::tempdir().expect("couldn't create temp dir");
    let config = Config {
        client: Client {
            deployed_dir: temp_dir.path().join("deployed"),
            contracts_dir: temp_dir.path().join("contracts"),
            keystore: temp_dir.path().join("keystore.json"),
            ..Client::default()
        },
        ..Config::default()
    };
    let config_file = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_file,
        toml::to_string(&config).expect("couldn't serialize config"),
    )
    .expect("couldn't write config");
    (config_file, temp_dir)
}
