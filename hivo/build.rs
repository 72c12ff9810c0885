// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

//! Build script for the `hivo` crate.
//!
//! This script generates `constants.rs` containing the default VO device node
//! path. The default can be changed at build time through the
//! `HIVO_DEVICE_NODE` environment variable (for boards that expose the VO
//! driver under another name).

use std::env;
use std::path::PathBuf;

const DEFAULT_DEVICE_NODE: &str = "/dev/hi_vo";

fn main() {
    println!("cargo:rerun-if-env-changed=HIVO_DEVICE_NODE");
    let device_node =
        env::var("HIVO_DEVICE_NODE").unwrap_or_else(|_| DEFAULT_DEVICE_NODE.to_string());

    let out_path = PathBuf::from(env::var("OUT_DIR").expect("failed to get output directory"))
        .join("constants.rs");

    let data = format!("pub const HIVO_DEVICE_NODE: &str = {device_node:?};\n");
    std::fs::write(out_path, data).expect("Unable to write file");
}
