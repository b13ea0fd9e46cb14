// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Nothing listens on the discard port, so every probe and request fails fast.
const UNREACHABLE: &str = "http://127.0.0.1:9";

/// A `medsync` command isolated from the caller's environment.
pub fn medsync() -> Command {
    let mut cmd = cargo_bin_cmd!("medsync");
    cmd.env_remove("MEDSYNC_DATA_DIR")
        .env_remove("MEDSYNC_TOKEN")
        .env_remove("MEDSYNC_PROFILE")
        .env_remove("MEDSYNC_USER")
        .env("RUST_LOG", "warn");
    cmd
}

/// A data directory whose config points every URL at an unreachable host.
pub fn offline_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    let config = format!(
        "[api]\nbase_url = \"{UNREACHABLE}/api\"\ntimeout_secs = 1\n\n\
         [connectivity]\nprobe_urls = [\"{UNREACHABLE}\"]\ntimeout_secs = 1\n"
    );
    std::fs::write(temp.path().join("medsync.toml"), config).unwrap();
    temp
}

/// `medsync --data-dir <dir> --token tok --profile p1 --user u1`.
pub fn signed_in(dir: &TempDir) -> Command {
    let mut cmd = medsync();
    cmd.arg("--data-dir")
        .arg(dir.path())
        .args(["--token", "tok", "--profile", "p1", "--user", "u1"]);
    cmd
}
