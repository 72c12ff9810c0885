//! Device-facing half of the hivosink element.
//!
//! [`SinkAdapter`] owns the element's VO window and its settings. It knows
//! nothing about GStreamer: the element hands it plain frame geometry,
//! addresses and timestamps, which keeps it testable against a simulated
//! driver.
//!
//! Failures never leave this module. A window that could not be brought up
//! is logged once and every later frame is dropped; a frame the driver
//! refuses is logged and dropped.

// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use hivo::{FrameDescriptor, SwitchMode, WindowHandle, WindowRect, WindowRegistry, WindowSession};
use tracing::{debug, error, info, trace, warn};

use crate::hivosink::state::Settings;

pub(crate) struct SinkAdapter {
    settings: Settings,
    session: Option<WindowSession>,
    current_timestamp: Option<u64>,
}

impl SinkAdapter {
    /// Brings up a window on `registry` from `settings`.
    ///
    /// A failed bring-up is logged and leaves the adapter without a window.
    pub fn new(registry: Arc<WindowRegistry>, settings: Settings) -> Self {
        let session = match WindowSession::open(registry, &settings.window_attr()) {
            Ok(mut session) => {
                session.set_hold_mode(settings.hold_mode());
                info!("VO window {} created", session.handle());
                Some(session)
            }
            Err(err) => {
                error!("VO initialization failed: {}", err);
                None
            }
        };

        SinkAdapter {
            settings,
            session,
            current_timestamp: None,
        }
    }

    /// Handle of the live window, if bring-up succeeded.
    pub fn window(&self) -> Option<WindowHandle> {
        self.session.as_ref().map(WindowSession::handle)
    }

    pub fn window_rect(&self) -> WindowRect {
        self.settings.window_rect()
    }

    /// Parses and applies `"x,y,width,height"`.
    ///
    /// A live window is moved right away. Malformed text, or a rectangle the
    /// driver refuses, leaves the current rectangle untouched and returns
    /// `false`.
    pub fn set_window_rect(&mut self, text: &str) -> bool {
        let rect = match text.parse::<WindowRect>() {
            Ok(rect) => rect,
            Err(err) => {
                warn!("Ignoring window-rect {:?}: {}", text, err);
                return false;
            }
        };
        let mut requested = self.settings.clone();
        requested.set_window_rect(rect);

        if let Some(session) = &self.session {
            let attr = requested.window_attr();
            if let Err(err) = session.registry().set_attr(session.handle(), &attr) {
                error!("Failed to move window {} to {}: {}", session.handle(), rect, err);
                return false;
            }
        }
        self.settings = requested;
        true
    }

    pub fn freeze(&self) -> bool {
        self.settings.freeze()
    }

    /// Freezes or unfreezes the window on its current picture.
    pub fn set_freeze(&mut self, freeze: bool) {
        self.settings.set_freeze(freeze);

        if let Some(session) = &self.session {
            let result = session
                .registry()
                .freeze(session.handle(), freeze, SwitchMode::LastFrame);
            if let Err(err) = result {
                error!("Failed to set freeze={} on window {}: {}", freeze, session.handle(), err);
            }
        }
    }

    pub fn stop_keep_frame(&self) -> bool {
        self.settings.stop_keep_frame()
    }

    pub fn set_stop_keep_frame(&mut self, keep: bool) {
        self.settings.set_stop_keep_frame(keep);
        if let Some(session) = &mut self.session {
            session.set_hold_mode(self.settings.hold_mode());
        }
    }

    /// PTS in nanoseconds of the last presented buffer, `None` before the
    /// first buffer or when that buffer carried no PTS.
    pub fn current_timestamp(&self) -> Option<u64> {
        self.current_timestamp
    }

    /// Queues one frame stored at `address` on the window.
    pub fn present_frame(&mut self, width: u32, height: u32, address: u32, pts: Option<u64>) {
        self.current_timestamp = pts;

        let Some(session) = &self.session else {
            trace!("No VO window, dropping frame");
            return;
        };

        let result = FrameDescriptor::build(width, height, address)
            .and_then(|frame| session.registry().queue_frame(session.handle(), &frame));
        match result {
            Ok(()) => trace!("Queued {}x{} frame at {:#x}", width, height, address),
            Err(err) => error!("Failed to queue frame on window {}: {}", session.handle(), err),
        }
    }

    /// Applies the hold policy and releases the window. Later calls do
    /// nothing.
    pub fn dispose(&mut self) {
        if let Some(session) = self.session.take() {
            let handle = session.handle();
            match session.close() {
                Ok(()) => debug!("VO window {} released", handle),
                Err(err) => error!("Failed to release VO window {}: {}", handle, err),
            }
        }
    }
}

impl Drop for SinkAdapter {
    fn drop(&mut self) {
        self.dispose();
    }
}
