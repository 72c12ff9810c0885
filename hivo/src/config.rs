// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

//! Device path resolution for the VO driver.

use std::path::PathBuf;

// Build script generates constants.rs with HIVO_DEVICE_NODE
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

/// Environment variable overriding the VO device node at run time.
pub const DEVICE_ENV_VAR: &str = "HIVO_DEVICE";

/// Returns the path of the VO character device.
///
/// The `HIVO_DEVICE` environment variable wins when set and non-empty;
/// otherwise the node chosen at build time is used (`/dev/hi_vo` unless the
/// crate was built with `HIVO_DEVICE_NODE`).
///
/// # Examples
///
/// ```no_run
/// use hivo::config::get_vo_device_path;
/// use hivo::{Channel, DeviceNodeDriver};
///
/// let channel = Channel::new(DeviceNodeDriver::new(get_vo_device_path()));
/// ```
pub fn get_vo_device_path() -> PathBuf {
    resolve_device_path(std::env::var_os(DEVICE_ENV_VAR))
}

fn resolve_device_path(from_env: Option<std::ffi::OsString>) -> PathBuf {
    match from_env {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(HIVO_DEVICE_NODE),
    }
}
