//! HiSilicon VO Sink Element
//!
//! This module implements `hivosink`, a GStreamer video sink that displays
//! raw video frames through a window of the HiSilicon VO driver.
//!
//! ## Responsibilities
//! - Brings up a VO window when the element is created (open the device,
//!   create the window, enable it)
//! - Describes every incoming buffer with a frame descriptor and queues it on
//!   the window
//! - Applies the configured hold policy (last frame or black) and destroys
//!   the window when the element is disposed
//!
//! ## Properties
//! - `window-rect`: output rectangle as `"x,y,width,height"`
//! - `freeze`: hold the current picture on screen
//! - `stop-keep-frame`: keep the last frame on screen after disposal
//! - `current-timestamp`: PTS of the last presented buffer (read-only)
//!
//! ## Example Pipeline
//! ```bash
//! gst-launch-1.0 filesrc location=clip.yuv ! rawvideoparse format=nv21 \
//!     width=1920 height=1080 ! hivosink
//! ```

// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

use gst::glib;
use gst::prelude::*;
use gstreamer as gst;
use gstreamer_base as gst_base;
use gstreamer_video as gst_video;

/// Device-facing half of the element (window lifecycle, frame submission)
mod adapter;

/// Core implementation (properties, GStreamer trait impls)
mod imp;


/// Element settings and their defaults
mod state;

glib::wrapper! {
    pub struct HiVoSink(ObjectSubclass<imp::HiVoSink>) @extends gst_video::VideoSink, gst_base::BaseSink, gst::Element, gst::Object;
}

/// Registers the hivosink element with GStreamer.
///
/// # Rank
/// PRIMARY, so that `autovideosink` and `playbin` pick the VO output on
/// boards where the plugin is installed.
pub fn register(plugin: &gst::Plugin) -> Result<(), glib::BoolError> {
    gst::Element::register(
        Some(plugin),
        "hivosink",
        gst::Rank::PRIMARY,
        HiVoSink::static_type(),
    )
}
