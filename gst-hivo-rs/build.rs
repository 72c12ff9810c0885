//! Build Script for gst-hivo-rs
//!
//! Generates version information for the GStreamer plugin using
//! `gst_plugin_version_helper`.
//!
//! ## Generated Environment Variables
//! - `COMMIT_ID`: Git commit hash (for version string)
//! - `BUILD_REL_DATE`: Build date (for plugin metadata)
//!
//! Both are consumed by the `gst::plugin_define!` invocation in lib.rs.

// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

fn main() {
    gst_plugin_version_helper::info()
}
