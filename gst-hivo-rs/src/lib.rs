//! GStreamer Plugin for HiSilicon VO
//!
//! This crate implements a GStreamer plugin providing one element:
//!
//! - **hivosink**: a video sink that hands every buffer to a window of the
//!   HiSilicon VO (video output) driver, which composites and displays it
//!
//! ## VO Overview
//! The VO driver of HiSilicon set-top-box SoCs is controlled through ioctls on
//! `/dev/hi_vo`. A client creates a display window, enables it, and queues
//! frame descriptors pointing at the physical memory of each picture. The
//! [`hivo`] crate wraps that interface; this crate adapts it to a pipeline.
//!
//! ## Supported Media Formats
//! - **Video**: NV21 (semi-planar 4:2:0) and RGB (packed)
//!
//! ## Example Pipeline
//! ```bash
//! gst-launch-1.0 videotestsrc ! video/x-raw,format=NV21 ! \
//!     hivosink window-rect="0,0,1280,720" stop-keep-frame=true
//! ```

// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

// Allow non-Send fields in Send types (required for GStreamer's threading model)
// and unused doc comments (sometimes present in macro-generated code)
#![allow(clippy::non_send_fields_in_send_ty, unused_doc_comments)]

use gst::glib;
use gstreamer as gst;

/// HiSilicon VO sink element
mod hivosink;

/// Registers all elements of the plugin with GStreamer.
///
/// Called once when the plugin is loaded, or by `plugin_register_static()`
/// when the plugin is linked into an application.
fn plugin_init(plugin: &gst::Plugin) -> Result<(), glib::BoolError> {
    hivosink::register(plugin)?;

    Ok(())
}

gst::plugin_define!(
    hivo,
    env!("CARGO_PKG_DESCRIPTION"),
    plugin_init,
    concat!(env!("CARGO_PKG_VERSION"), "-", env!("COMMIT_ID")),
    "Apache-2.0",
    env!("CARGO_PKG_NAME"),
    env!("CARGO_PKG_NAME"),
    env!("CARGO_PKG_REPOSITORY"),
    env!("BUILD_REL_DATE")
);
