//! Settings of the hivosink element.
//!
//! ## Key Types
//! - `Settings`: user-configurable properties (output rectangle, freeze,
//!   stop hold policy)

// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

use hivo::{AspectMode, DisplayId, SwitchMode, WindowAttr, WindowRect};

/// Default value for the window-rect property (all zero = whole display)
pub(crate) const DEFAULT_WINDOW_RECT: WindowRect = WindowRect::new(0, 0, 0, 0);

/// Default value for the freeze property
pub(crate) const DEFAULT_FREEZE: bool = false;

/// Default value for the stop-keep-frame property (blank the window on stop)
pub(crate) const DEFAULT_STOP_KEEP_FRAME: bool = false;

/// User-configurable settings for the hivosink element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settings {
    window_rect: WindowRect,
    freeze: bool,
    stop_keep_frame: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            window_rect: DEFAULT_WINDOW_RECT,
            freeze: DEFAULT_FREEZE,
            stop_keep_frame: DEFAULT_STOP_KEEP_FRAME,
        }
    }
}

impl Settings {
    /// Output rectangle of the window on the display.
    pub fn window_rect(&self) -> WindowRect {
        self.window_rect
    }

    pub fn set_window_rect(&mut self, rect: WindowRect) {
        self.window_rect = rect;
    }

    pub fn freeze(&self) -> bool {
        self.freeze
    }

    pub fn set_freeze(&mut self, freeze: bool) {
        self.freeze = freeze;
    }

    /// Whether the last frame stays on screen when the element goes away.
    pub fn stop_keep_frame(&self) -> bool {
        self.stop_keep_frame
    }

    pub fn set_stop_keep_frame(&mut self, keep: bool) {
        self.stop_keep_frame = keep;
    }

    /// What the window shows once the element has stopped.
    pub fn hold_mode(&self) -> SwitchMode {
        SwitchMode::holding(self.stop_keep_frame)
    }

    /// Attributes of the window the element displays into: a physical
    /// window on the second display, stretched to the output rectangle.
    pub fn window_attr(&self) -> WindowAttr {
        WindowAttr {
            display: DisplayId::Display1,
            is_virtual: false,
            aspect_mode: AspectMode::Full,
            crop: None,
            output: self.window_rect,
            ..Default::default()
        }
    }
}
