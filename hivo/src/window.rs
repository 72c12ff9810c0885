// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

//! Display windows and their lifecycle.
//!
//! A window is a display surface managed by the VO driver and addressed by an
//! opaque [`WindowHandle`]. [`WindowRegistry`] validates window requests,
//! forwards them through the [`Channel`], and keeps track of the windows that
//! are currently alive.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use hivo_sys as sys;
use tracing::debug;

use crate::{Channel, Command, Error, FrameDescriptor, Result};

/// Opaque handle of a window, as returned by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowHandle(sys::Handle);

impl WindowHandle {
    /// The "no window" sentinel.
    pub const INVALID: WindowHandle = WindowHandle(sys::HI_INVALID_HANDLE);

    pub fn from_raw(raw: sys::Handle) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> sys::Handle {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    fn checked(self) -> Result<sys::Handle> {
        if self.is_valid() {
            Ok(self.0)
        } else {
            Err(Error::InvalidHandle)
        }
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Display output a window is attached to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayId {
    Display0,
    #[default]
    Display1,
    Display2,
}

impl DisplayId {
    pub fn as_raw(self) -> sys::Display {
        match self {
            DisplayId::Display0 => sys::HI_DRV_DISPLAY_0,
            DisplayId::Display1 => sys::HI_DRV_DISPLAY_1,
            DisplayId::Display2 => sys::HI_DRV_DISPLAY_2,
        }
    }

    pub fn from_raw(raw: sys::Display) -> Result<Self> {
        match raw {
            sys::HI_DRV_DISPLAY_0 => Ok(DisplayId::Display0),
            sys::HI_DRV_DISPLAY_1 => Ok(DisplayId::Display1),
            sys::HI_DRV_DISPLAY_2 => Ok(DisplayId::Display2),
            _ => Err(Error::InvalidArgument("unknown display")),
        }
    }
}

/// How a picture is fitted into the window when aspect ratios differ.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AspectMode {
    #[default]
    Full,
    LetterBox,
    PanAndScan,
    Combined,
    FullHorizontal,
    FullVertical,
    /// Uses [`WindowAttr::custom_aspect`].
    Custom,
}

impl AspectMode {
    pub fn as_raw(self) -> sys::AspectRatioMode {
        match self {
            AspectMode::Full => sys::HI_DRV_ASP_RAT_MODE_FULL,
            AspectMode::LetterBox => sys::HI_DRV_ASP_RAT_MODE_LETTERBOX,
            AspectMode::PanAndScan => sys::HI_DRV_ASP_RAT_MODE_PANANDSCAN,
            AspectMode::Combined => sys::HI_DRV_ASP_RAT_MODE_COMBINED,
            AspectMode::FullHorizontal => sys::HI_DRV_ASP_RAT_MODE_FULL_H,
            AspectMode::FullVertical => sys::HI_DRV_ASP_RAT_MODE_FULL_V,
            AspectMode::Custom => sys::HI_DRV_ASP_RAT_MODE_CUSTOMER,
        }
    }

    pub fn from_raw(raw: sys::AspectRatioMode) -> Result<Self> {
        match raw {
            sys::HI_DRV_ASP_RAT_MODE_FULL => Ok(AspectMode::Full),
            sys::HI_DRV_ASP_RAT_MODE_LETTERBOX => Ok(AspectMode::LetterBox),
            sys::HI_DRV_ASP_RAT_MODE_PANANDSCAN => Ok(AspectMode::PanAndScan),
            sys::HI_DRV_ASP_RAT_MODE_COMBINED => Ok(AspectMode::Combined),
            sys::HI_DRV_ASP_RAT_MODE_FULL_H => Ok(AspectMode::FullHorizontal),
            sys::HI_DRV_ASP_RAT_MODE_FULL_V => Ok(AspectMode::FullVertical),
            sys::HI_DRV_ASP_RAT_MODE_CUSTOMER => Ok(AspectMode::Custom),
            _ => Err(Error::InvalidArgument("unknown aspect ratio mode")),
        }
    }
}

/// What a window shows while no new frame arrives.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SwitchMode {
    /// Keep the last displayed frame on screen.
    LastFrame,
    /// Blank the window.
    #[default]
    Black,
}

impl SwitchMode {
    /// `LastFrame` when `keep_last_frame` is set, `Black` otherwise.
    pub fn holding(keep_last_frame: bool) -> Self {
        if keep_last_frame {
            SwitchMode::LastFrame
        } else {
            SwitchMode::Black
        }
    }

    pub fn as_raw(self) -> sys::WinSwitch {
        match self {
            SwitchMode::LastFrame => sys::HI_DRV_WIN_SWITCH_LAST,
            SwitchMode::Black => sys::HI_DRV_WIN_SWITCH_BLACK,
        }
    }
}

/// Rectangle in display coordinates. All zero means "whole display".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl WindowRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl fmt::Display for WindowRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

/// Parses `"x,y,width,height"`.
///
/// # Examples
///
/// ```
/// use hivo::WindowRect;
///
/// let rect: WindowRect = "0,0,1280,720".parse().unwrap();
/// assert_eq!(rect, WindowRect::new(0, 0, 1280, 720));
/// assert!("garbage".parse::<WindowRect>().is_err());
/// ```
impl FromStr for WindowRect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        const MALFORMED: Error = Error::InvalidArgument("expected \"x,y,width,height\"");

        let mut fields = s.split(',').map(|field| field.trim().parse::<i32>());
        let mut next = || fields.next().and_then(|field| field.ok()).ok_or(MALFORMED);
        let rect = WindowRect::new(next()?, next()?, next()?, next()?);

        if fields.next().is_some() {
            return Err(MALFORMED);
        }
        if rect.width < 0 || rect.height < 0 {
            return Err(Error::InvalidArgument("negative window size"));
        }
        Ok(rect)
    }
}

impl From<WindowRect> for sys::Rect {
    fn from(rect: WindowRect) -> Self {
        sys::Rect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

impl From<sys::Rect> for WindowRect {
    fn from(rect: sys::Rect) -> Self {
        WindowRect::new(rect.x, rect.y, rect.width, rect.height)
    }
}

/// Window attributes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowAttr {
    pub display: DisplayId,
    pub is_virtual: bool,
    pub aspect_mode: AspectMode,
    /// Aspect ratio (width, height) used with [`AspectMode::Custom`].
    pub custom_aspect: (u8, u8),
    /// Part of the source picture to show, as offsets from its edges.
    pub crop: Option<sys::CropRect>,
    pub input: WindowRect,
    pub output: WindowRect,
    /// Virtual windows only: buffers are allocated by the user.
    pub user_alloc_buffer: bool,
    /// Virtual windows only, `1..=16`.
    pub buffer_count: u32,
    /// Virtual windows only.
    pub data_format: sys::PixelFormat,
}

impl From<&WindowAttr> for sys::WinAttr {
    fn from(attr: &WindowAttr) -> Self {
        sys::WinAttr {
            is_virtual: to_hi_bool(attr.is_virtual),
            disp: attr.display.as_raw(),
            custom_ar: sys::AspectRatio {
                ar_w: attr.custom_aspect.0,
                ar_h: attr.custom_aspect.1,
            },
            ar_cvrs: attr.aspect_mode.as_raw(),
            use_crop_rect: to_hi_bool(attr.crop.is_some()),
            in_rect: attr.input.into(),
            crop_rect: attr.crop.unwrap_or_default(),
            out_rect: attr.output.into(),
            user_alloc_buffer: to_hi_bool(attr.user_alloc_buffer),
            buf_number: attr.buffer_count,
            data_format: attr.data_format,
        }
    }
}

impl TryFrom<&sys::WinAttr> for WindowAttr {
    type Error = Error;

    fn try_from(raw: &sys::WinAttr) -> Result<Self> {
        Ok(WindowAttr {
            display: DisplayId::from_raw(raw.disp)?,
            is_virtual: from_hi_bool(raw.is_virtual)?,
            aspect_mode: AspectMode::from_raw(raw.ar_cvrs)?,
            custom_aspect: (raw.custom_ar.ar_w, raw.custom_ar.ar_h),
            crop: from_hi_bool(raw.use_crop_rect)?.then_some(raw.crop_rect),
            input: raw.in_rect.into(),
            output: raw.out_rect.into(),
            user_alloc_buffer: from_hi_bool(raw.user_alloc_buffer)?,
            buffer_count: raw.buf_number,
            data_format: raw.data_format,
        })
    }
}

fn to_hi_bool(value: bool) -> sys::Bool {
    if value { sys::HI_TRUE } else { sys::HI_FALSE }
}

fn from_hi_bool(raw: sys::Bool) -> Result<bool> {
    match raw {
        sys::HI_TRUE => Ok(true),
        sys::HI_FALSE => Ok(false),
        _ => Err(Error::InvalidArgument("boolean is neither true nor false")),
    }
}

/// Validates and forwards window commands, and tracks live windows.
///
/// # Examples
///
/// ```no_run
/// use hivo::{WindowAttr, WindowRegistry};
///
/// # fn main() -> Result<(), hivo::Error> {
/// let registry = WindowRegistry::global();
/// registry.channel().open()?;
///
/// let window = registry.create_window(&WindowAttr::default())?;
/// registry.set_enable(window, true)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WindowRegistry {
    channel: Arc<Channel>,
    live: Mutex<BTreeSet<WindowHandle>>,
    lifecycle: Mutex<()>,
}

static GLOBAL: LazyLock<Arc<WindowRegistry>> =
    LazyLock::new(|| Arc::new(WindowRegistry::new(Channel::global())));

impl WindowRegistry {
    pub fn new(channel: Arc<Channel>) -> Self {
        Self {
            channel,
            live: Mutex::new(BTreeSet::new()),
            lifecycle: Mutex::new(()),
        }
    }

    /// The registry over [`Channel::global`].
    pub fn global() -> Arc<WindowRegistry> {
        GLOBAL.clone()
    }

    pub fn channel(&self) -> &Arc<Channel> {
        &self.channel
    }

    /// Number of windows created through this registry and not yet destroyed.
    pub fn live_windows(&self) -> usize {
        self.live().len()
    }

    /// Creates a window.
    ///
    /// Nothing is cleaned up on failure: the caller must not use any handle.
    pub fn create_window(&self, attr: &WindowAttr) -> Result<WindowHandle> {
        self.create_window_raw(&attr.into())
    }

    /// Creates a window from a raw attribute record.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the display or the aspect ratio mode is
    /// out of range; no command reaches the driver in that case.
    pub fn create_window_raw(&self, attr: &sys::WinAttr) -> Result<WindowHandle> {
        if attr.disp >= sys::HI_DRV_DISPLAY_BUTT {
            return Err(Error::InvalidArgument("display is out of range"));
        }
        validate_aspect_mode(attr)?;

        let mut payload = sys::WinCreate {
            win_attr: *attr,
            h_window: sys::HI_INVALID_HANDLE,
        };
        self.channel.submit(Command::CreateWindow(&mut payload))?;

        let handle = WindowHandle(payload.h_window);
        self.live().insert(handle);
        debug!("Created window {}", handle);
        Ok(handle)
    }

    /// Destroys a window. It is forgotten by the registry even if the driver
    /// reports a failure.
    pub fn destroy_window(&self, handle: WindowHandle) -> Result<()> {
        let raw = handle.checked()?;
        let result = self.channel.submit(Command::DestroyWindow(&raw));
        self.live().remove(&handle);
        debug!("Destroyed window {}", handle);
        result
    }

    pub fn set_enable(&self, handle: WindowHandle, enable: bool) -> Result<()> {
        let payload = sys::WinEnable {
            h_window: handle.checked()?,
            enable: to_hi_bool(enable),
        };
        self.channel.submit(Command::SetEnable(&payload))
    }

    pub fn get_enable(&self, handle: WindowHandle) -> Result<bool> {
        let mut payload = sys::WinEnable {
            h_window: handle.checked()?,
            enable: sys::HI_FALSE,
        };
        self.channel.submit(Command::GetEnable(&mut payload))?;
        from_hi_bool(payload.enable)
    }

    pub fn set_attr(&self, handle: WindowHandle, attr: &WindowAttr) -> Result<()> {
        self.set_attr_raw(handle, &attr.into())
    }

    /// Replaces the attributes of a live window.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the aspect ratio mode is out of range.
    pub fn set_attr_raw(&self, handle: WindowHandle, attr: &sys::WinAttr) -> Result<()> {
        let h_window = handle.checked()?;
        validate_aspect_mode(attr)?;

        let payload = sys::WinCreate {
            win_attr: *attr,
            h_window,
        };
        self.channel.submit(Command::SetAttr(&payload))
    }

    pub fn get_attr(&self, handle: WindowHandle) -> Result<WindowAttr> {
        WindowAttr::try_from(&self.get_attr_raw(handle)?)
    }

    pub fn get_attr_raw(&self, handle: WindowHandle) -> Result<sys::WinAttr> {
        let mut payload = sys::WinCreate {
            h_window: handle.checked()?,
            ..Default::default()
        };
        self.channel.submit(Command::GetAttr(&mut payload))?;
        Ok(payload.win_attr)
    }

    pub fn send_frame(&self, handle: WindowHandle, frame: &FrameDescriptor) -> Result<()> {
        let payload = frame_payload(handle, frame)?;
        self.channel.submit(Command::SendFrame(&payload))
    }

    /// Hands a frame to the window's display queue.
    pub fn queue_frame(&self, handle: WindowHandle, frame: &FrameDescriptor) -> Result<()> {
        let payload = frame_payload(handle, frame)?;
        self.channel.submit(Command::QueueFrame(&payload))
    }

    /// Gives back a frame that should be released without being displayed.
    pub fn queue_useless_frame(&self, handle: WindowHandle, frame: &FrameDescriptor) -> Result<()> {
        let payload = frame_payload(handle, frame)?;
        self.channel.submit(Command::QueueUselessFrame(&payload))
    }

    /// Takes back a frame the window has finished displaying.
    pub fn dequeue_frame(&self, handle: WindowHandle) -> Result<FrameDescriptor> {
        let mut payload = sys::WinFrame {
            h_window: handle.checked()?,
            ..Default::default()
        };
        self.channel.submit(Command::DequeueFrame(&mut payload))?;
        Ok(FrameDescriptor::from_raw(payload.frame))
    }

    /// Freezes (or unfreezes) the window on its last frame or on black.
    pub fn freeze(&self, handle: WindowHandle, enable: bool, mode: SwitchMode) -> Result<()> {
        let payload = sys::WinFreeze {
            h_window: handle.checked()?,
            enable: to_hi_bool(enable),
            mode: mode.as_raw(),
        };
        self.channel.submit(Command::Freeze(&payload))
    }

    /// Drops queued frames, holding the last frame or black on screen.
    pub fn reset(&self, handle: WindowHandle, mode: SwitchMode) -> Result<()> {
        let payload = sys::WinReset {
            h_window: handle.checked()?,
            mode: mode.as_raw(),
        };
        self.channel.submit(Command::Reset(&payload))
    }

    fn live(&self) -> MutexGuard<'_, BTreeSet<WindowHandle>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Held by sessions from channel open to window creation and from window
    /// destruction to channel close, so the live count they act on can't
    /// change under them.
    pub(crate) fn lifecycle(&self) -> MutexGuard<'_, ()> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn validate_aspect_mode(attr: &sys::WinAttr) -> Result<()> {
    if attr.ar_cvrs >= sys::HI_DRV_ASP_RAT_MODE_BUTT {
        return Err(Error::InvalidArgument("aspect ratio mode is out of range"));
    }
    Ok(())
}

fn frame_payload(handle: WindowHandle, frame: &FrameDescriptor) -> Result<sys::WinFrame> {
    Ok(sys::WinFrame {
        h_window: handle.checked()?,
        frame: *frame.as_raw(),
    })
}
