//! HiSilicon VO Sink Implementation
//!
//! This module contains the GStreamer side of the hivosink element. It
//! implements GStreamer's VideoSink trait, handling:
//! - Property management (window-rect, freeze, stop-keep-frame,
//!   current-timestamp)
//! - Caps negotiation (remembering the frame geometry)
//! - Frame presentation (handing buffers to the [`SinkAdapter`])
//! - Disposal (releasing the VO window)
//!
//! ## Implementation Structure
//! - `HiVoSink`: the struct holding element state (adapter, negotiated info)
//! - `ObjectImpl`: GObject property system integration and window lifecycle
//! - `ElementImpl`: element metadata and pad templates
//! - `BaseSinkImpl`: caps handling
//! - `VideoSinkImpl`: frame presentation

// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

use gst::glib;
use gst::prelude::*;
use gst::subclass::prelude::*;
use gst_base::prelude::BaseSinkExt;
use gst_base::subclass::prelude::*;
use gst_video::subclass::prelude::*;
use gstreamer as gst;
use gstreamer_base as gst_base;
use gstreamer_video as gst_video;

use hivo::WindowRegistry;
use tracing::trace;

use std::sync::LazyLock;
use std::sync::Mutex;

use crate::hivosink;
use crate::hivosink::adapter::SinkAdapter;
use crate::hivosink::state::DEFAULT_FREEZE;
use crate::hivosink::state::DEFAULT_STOP_KEEP_FRAME;
use crate::hivosink::state::DEFAULT_WINDOW_RECT;
use crate::hivosink::state::Settings;

/// GStreamer debug category for hivosink messages.
///
/// Set GST_DEBUG=hivosink:5 to see TRACE-level logs.
pub(crate) static CAT: LazyLock<gst::DebugCategory> = LazyLock::new(|| {
    gst::DebugCategory::new(
        "hivosink",
        gst::DebugColorFlags::empty(),
        Some("HiSilicon VO Sink"),
    )
});

/// Value of `current-timestamp` while no timestamp is known.
const NO_TIMESTAMP: u64 = u64::MAX;

/// HiSilicon VO sink element implementation.
///
/// Both fields are behind a Mutex because property changes and rendering
/// may come from different threads.
#[derive(Default)]
pub struct HiVoSink {
    /// Window and settings; `None` before construction and after disposal
    adapter: Mutex<Option<SinkAdapter>>,

    /// Negotiated video format
    info: Mutex<Option<gst_video::VideoInfo>>,
}

#[glib::object_subclass]
impl ObjectSubclass for HiVoSink {
    const NAME: &'static str = "GstRsHiVoSink";

    type Type = hivosink::HiVoSink;

    type ParentType = gst_video::VideoSink;
}

impl ObjectImpl for HiVoSink {
    fn properties() -> &'static [glib::ParamSpec] {
        static PROPERTIES: LazyLock<Vec<glib::ParamSpec>> = LazyLock::new(|| {
            let default_rect = DEFAULT_WINDOW_RECT.to_string();
            vec![
                glib::ParamSpecString::builder("window-rect")
                    .nick("Window rectangle")
                    .blurb("Output rectangle on the display as \"x,y,width,height\"")
                    .default_value(default_rect.as_str())
                    .mutable_playing()
                    .build(),
                glib::ParamSpecBoolean::builder("freeze")
                    .nick("Freeze")
                    .blurb("Hold the current picture on screen")
                    .default_value(DEFAULT_FREEZE)
                    .mutable_playing()
                    .build(),
                glib::ParamSpecBoolean::builder("stop-keep-frame")
                    .nick("Stop keep frame")
                    .blurb("Keep the last frame on screen instead of blanking when stopped")
                    .default_value(DEFAULT_STOP_KEEP_FRAME)
                    .mutable_playing()
                    .build(),
                glib::ParamSpecUInt64::builder("current-timestamp")
                    .nick("Current timestamp")
                    .blurb("PTS in nanoseconds of the last presented buffer (MAX if unknown)")
                    .default_value(NO_TIMESTAMP)
                    .read_only()
                    .build(),
            ]
        });

        PROPERTIES.as_ref()
    }

    /// Sets up tracing (if enabled) and brings up the VO window.
    ///
    /// A failed bring-up does not fail construction: the element then
    /// accepts and drops every buffer.
    fn constructed(&self) {
        #[cfg(feature = "tracing")]
        {
            use tracing_subscriber::filter::LevelFilter;
            use tracing_subscriber::util::SubscriberInitExt;

            let _ = tracing_subscriber::fmt()
                .compact()
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_target(false)
                .with_max_level(LevelFilter::TRACE)
                .with_ansi(true)
                .finish()
                .try_init();
        }

        self.parent_constructed();

        self.obj().set_sync(true);

        let adapter = SinkAdapter::new(WindowRegistry::global(), Settings::default());
        match adapter.window() {
            Some(window) => gst::info!(CAT, imp = self, "Displaying into VO window {}", window),
            None => gst::error!(CAT, imp = self, "No VO window, frames will be dropped"),
        }

        if let Ok(mut slot) = self.adapter.lock() {
            *slot = Some(adapter);
        } else {
            gst::error!(CAT, imp = self, "Adapter mutex poisoned");
        }
    }

    fn set_property(&self, _id: usize, value: &glib::Value, pspec: &glib::ParamSpec) {
        let Ok(mut adapter) = self.adapter.lock() else {
            gst::error!(
                CAT,
                imp = self,
                "Adapter mutex poisoned, property change ignored"
            );
            return;
        };
        let Some(adapter) = adapter.as_mut() else {
            gst::error!(CAT, imp = self, "Element is disposed, property change ignored");
            return;
        };

        match pspec.name() {
            "window-rect" => {
                if let Ok(Some(text)) = value.get::<Option<String>>() {
                    let previous = adapter.window_rect();
                    if adapter.set_window_rect(&text) {
                        gst::info!(
                            CAT,
                            imp = self,
                            "Changing window-rect from {} to {}",
                            previous,
                            adapter.window_rect()
                        );
                    } else {
                        gst::warning!(CAT, imp = self, "Ignoring window-rect {:?}", text);
                    }
                } else {
                    gst::error!(CAT, imp = self, "Invalid value for window-rect property");
                }
            }
            "freeze" => {
                if let Ok(freeze) = value.get::<bool>() {
                    gst::info!(
                        CAT,
                        imp = self,
                        "Changing freeze from {} to {}",
                        adapter.freeze(),
                        freeze
                    );
                    adapter.set_freeze(freeze);
                } else {
                    gst::error!(CAT, imp = self, "Invalid type for freeze property");
                }
            }
            "stop-keep-frame" => {
                if let Ok(keep) = value.get::<bool>() {
                    gst::info!(
                        CAT,
                        imp = self,
                        "Changing stop-keep-frame from {} to {}",
                        adapter.stop_keep_frame(),
                        keep
                    );
                    adapter.set_stop_keep_frame(keep);
                } else {
                    gst::error!(CAT, imp = self, "Invalid type for stop-keep-frame property");
                }
            }
            other => {
                gst::error!(CAT, imp = self, "Unknown property '{}'", other);
            }
        }
    }

    fn property(&self, _id: usize, pspec: &glib::ParamSpec) -> glib::Value {
        let Ok(adapter) = self.adapter.lock() else {
            gst::error!(CAT, imp = self, "Adapter mutex poisoned");
            return pspec.default_value().clone();
        };
        let Some(adapter) = adapter.as_ref() else {
            return pspec.default_value().clone();
        };

        match pspec.name() {
            "window-rect" => adapter.window_rect().to_string().to_value(),
            "freeze" => adapter.freeze().to_value(),
            "stop-keep-frame" => adapter.stop_keep_frame().to_value(),
            "current-timestamp" => adapter
                .current_timestamp()
                .unwrap_or(NO_TIMESTAMP)
                .to_value(),
            _ => {
                gst::error!(CAT, imp = self, "Unknown property {}", pspec.name());
                pspec.default_value().clone()
            }
        }
    }

    /// Applies the stop hold policy and releases the VO window.
    fn dispose(&self) {
        if let Ok(mut slot) = self.adapter.lock() {
            if let Some(mut adapter) = slot.take() {
                adapter.dispose();
                gst::info!(CAT, imp = self, "Disposed");
            }
        }
    }
}

impl GstObjectImpl for HiVoSink {}

impl ElementImpl for HiVoSink {
    fn metadata() -> Option<&'static gst::subclass::ElementMetadata> {
        static ELEMENT_METADATA: LazyLock<gst::subclass::ElementMetadata> = LazyLock::new(|| {
            gst::subclass::ElementMetadata::new(
                "HiSilicon VO Sink",
                "Sink/Video",
                "Displays raw video through a HiSilicon VO window",
                "Contributors to the hivo project",
            )
        });

        Some(&*ELEMENT_METADATA)
    }

    /// One always-present sink pad accepting NV21 or RGB video of any size
    /// and frame rate.
    fn pad_templates() -> &'static [gst::PadTemplate] {
        static PAD_TEMPLATES: LazyLock<Result<Vec<gst::PadTemplate>, glib::BoolError>> =
            LazyLock::new(|| {
                let caps = gst_video::VideoCapsBuilder::new()
                    .format_list([gst_video::VideoFormat::Nv21, gst_video::VideoFormat::Rgb])
                    .build();

                let sink_pad_template = gst::PadTemplate::new(
                    "sink",
                    gst::PadDirection::Sink,
                    gst::PadPresence::Always,
                    &caps,
                )?;

                Ok(vec![sink_pad_template])
            });

        match PAD_TEMPLATES.as_ref() {
            Ok(templates) => templates,
            Err(err) => {
                trace!("Failed to create pad templates: {:?}", err);
                &[]
            }
        }
    }
}

impl BaseSinkImpl for HiVoSink {
    fn stop(&self) -> Result<(), gst::ErrorMessage> {
        let mut info = self.info.lock().map_err(|e| {
            gst::error_msg!(gst::CoreError::Failed, ["Failed to lock info mutex: {}", e])
        })?;
        info.take();

        gst::info!(CAT, imp = self, "Stopped");
        Ok(())
    }

    /// Remembers the negotiated frame geometry for [`VideoSinkImpl::show_frame`].
    fn set_caps(&self, caps: &gst::Caps) -> Result<(), gst::LoggableError> {
        gst::debug!(CAT, imp = self, "Setting caps {:?}", caps);

        let video_info = gst_video::VideoInfo::from_caps(caps)
            .map_err(|e| gst::loggable_error!(CAT, "Invalid video caps: {}", e))?;

        let mut info = self
            .info
            .lock()
            .map_err(|e| gst::loggable_error!(CAT, "Failed to lock info mutex: {}", e))?;
        info.replace(video_info);

        Ok(())
    }
}

impl VideoSinkImpl for HiVoSink {
    /// Queues the buffer on the VO window.
    ///
    /// The buffer's memory address is handed to the driver as the frame's
    /// 32-bit physical base address. Frames that cannot be described or
    /// queued are dropped after logging; the pipeline always sees `Ok`.
    fn show_frame(&self, buffer: &gst::Buffer) -> Result<gst::FlowSuccess, gst::FlowError> {
        gst::trace!(CAT, imp = self, "Rendering buffer {:?}", buffer);

        let Some((width, height)) = self
            .info
            .lock()
            .ok()
            .and_then(|info| info.as_ref().map(|info| (info.width(), info.height())))
        else {
            gst::error!(CAT, imp = self, "Received no caps yet, dropping frame");
            return Ok(gst::FlowSuccess::Ok);
        };

        let map = match buffer.map_readable() {
            Ok(map) => map,
            Err(err) => {
                gst::error!(CAT, imp = self, "Failed to map buffer: {}", err);
                return Ok(gst::FlowSuccess::Ok);
            }
        };
        let address = match u32::try_from(map.as_slice().as_ptr() as usize) {
            Ok(address) => address,
            Err(_) => {
                gst::error!(
                    CAT,
                    imp = self,
                    "Buffer at {:p} is outside the 32-bit address space, dropping frame",
                    map.as_slice().as_ptr()
                );
                return Ok(gst::FlowSuccess::Ok);
            }
        };
        let pts = buffer.pts().map(gst::ClockTime::nseconds);

        match self.adapter.lock() {
            Ok(mut adapter) => {
                if let Some(adapter) = adapter.as_mut() {
                    adapter.present_frame(width, height, address, pts);
                }
            }
            Err(_) => gst::error!(CAT, imp = self, "Adapter mutex poisoned, dropping frame"),
        }

        Ok(gst::FlowSuccess::Ok)
    }
}
