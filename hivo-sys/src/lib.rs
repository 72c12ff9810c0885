// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

//! # hivo-sys: Raw ABI of the HiSilicon VO window driver
//!
//! This crate describes the fixed binary interface spoken by the VO window
//! driver behind `/dev/hi_vo`: the `#[repr(C)]` records exchanged with the
//! kernel, the enumeration codes stored in them, and the `ioctl` entry points
//! (generated with `nix`'s ioctl macros).
//!
//! ## Usage
//!
//! **Most users should NOT use this crate directly.** Use the safe [`hivo`]
//! wrapper crate instead, which provides:
//! - A serialized, injectable device channel
//! - Typed window attributes and validation before any device call
//! - The frame-descriptor defaulting policy
//!
//! ## Safety
//!
//! The `ioctl` functions are `unsafe`: the caller must pass a descriptor
//! opened on the VO device node and a pointer to a live, correctly typed
//! payload for the duration of the call.
//!
//! [`hivo`]: https://docs.rs/hivo

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::missing_safety_doc)]

use std::mem::size_of;

use libc::{c_int, c_uint};

pub use nix::sys::ioctl::ioctl_num_type;

pub type S32 = c_int;
pub type U32 = c_uint;

/// `HI_BOOL`: only [`HI_FALSE`] and [`HI_TRUE`] are valid.
pub type Bool = c_uint;
pub const HI_FALSE: Bool = 0;
pub const HI_TRUE: Bool = 1;

pub type Handle = U32;
pub const HI_INVALID_HANDLE: Handle = 0xFFFF_FFFF;

pub const HI_SUCCESS: S32 = 0;
pub const HI_FAILURE: S32 = -1;

/// Timestamp value meaning "unknown".
pub const HI_INVALID_PTS: U32 = 0xFFFF_FFFF;

pub type Display = c_uint;
pub const HI_DRV_DISPLAY_0: Display = 0;
pub const HI_DRV_DISPLAY_1: Display = 1;
pub const HI_DRV_DISPLAY_2: Display = 2;
pub const HI_DRV_DISPLAY_BUTT: Display = 3;

pub type AspectRatioMode = c_uint;
pub const HI_DRV_ASP_RAT_MODE_FULL: AspectRatioMode = 0;
pub const HI_DRV_ASP_RAT_MODE_LETTERBOX: AspectRatioMode = 1;
pub const HI_DRV_ASP_RAT_MODE_PANANDSCAN: AspectRatioMode = 2;
pub const HI_DRV_ASP_RAT_MODE_COMBINED: AspectRatioMode = 3;
pub const HI_DRV_ASP_RAT_MODE_FULL_H: AspectRatioMode = 4;
pub const HI_DRV_ASP_RAT_MODE_FULL_V: AspectRatioMode = 5;
pub const HI_DRV_ASP_RAT_MODE_CUSTOMER: AspectRatioMode = 6;
pub const HI_DRV_ASP_RAT_MODE_BUTT: AspectRatioMode = 7;

/// What a window shows while it has no new frame (freeze / reset).
pub type WinSwitch = c_uint;
pub const HI_DRV_WIN_SWITCH_LAST: WinSwitch = 0;
pub const HI_DRV_WIN_SWITCH_BLACK: WinSwitch = 1;
pub const HI_DRV_WIN_SWITCH_BUTT: WinSwitch = 2;

pub type PixelFormat = c_uint;
pub const HI_DRV_PIX_FMT_RGB888: PixelFormat = 0x09;
pub const HI_DRV_PIX_FMT_NV12: PixelFormat = 0x1C;
pub const HI_DRV_PIX_FMT_NV21: PixelFormat = 0x1D;
pub const HI_DRV_PIX_FMT_YUYV: PixelFormat = 0x24;

pub type FieldMode = c_uint;
pub const HI_DRV_FIELD_TOP: FieldMode = 0;
pub const HI_DRV_FIELD_BOTTOM: FieldMode = 1;
pub const HI_DRV_FIELD_ALL: FieldMode = 2;
pub const HI_DRV_FIELD_BUTT: FieldMode = 3;

pub type ColorSpace = c_uint;
pub const HI_DRV_CS_UNKNOWN: ColorSpace = 0;
pub const HI_DRV_CS_DEFAULT: ColorSpace = 1;
pub const HI_DRV_CS_BT601_YUV_LIMITED: ColorSpace = 2;
pub const HI_DRV_CS_BT601_YUV_FULL: ColorSpace = 3;
pub const HI_DRV_CS_BT709_YUV_LIMITED: ColorSpace = 6;
pub const HI_DRV_CS_BT709_YUV_FULL: ColorSpace = 7;

pub type FrameType = c_uint;
pub const HI_DRV_FT_NOT_STEREO: FrameType = 0;
pub const HI_DRV_FT_SBS: FrameType = 1;
pub const HI_DRV_FT_TAB: FrameType = 2;
pub const HI_DRV_FT_FPK: FrameType = 3;

/// `HI_RECT_S`
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Rect {
    pub x: S32,
    pub y: S32,
    pub width: S32,
    pub height: S32,
}

/// `HI_DRV_CROP_RECT_S`: offsets from each edge of the source picture.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CropRect {
    pub left_offset: U32,
    pub top_offset: U32,
    pub right_offset: U32,
    pub bottom_offset: U32,
}

/// `HI_DRV_ASPECT_RATIO_S`
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct AspectRatio {
    pub ar_w: u8,
    pub ar_h: u8,
}

/// `HI_DRV_WIN_ATTR_S`
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct WinAttr {
    pub is_virtual: Bool,
    /// Fixed for the lifetime of the window.
    pub disp: Display,
    pub custom_ar: AspectRatio,
    pub ar_cvrs: AspectRatioMode,
    pub use_crop_rect: Bool,
    pub in_rect: Rect,
    pub crop_rect: CropRect,
    pub out_rect: Rect,
    /// Virtual windows only.
    pub user_alloc_buffer: Bool,
    /// Virtual windows only, `[1, 16]`.
    pub buf_number: U32,
    /// Virtual windows only.
    pub data_format: PixelFormat,
}

/// `HI_DRV_VID_FRAME_ADDR_S`: physical plane addresses and strides.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FrameAddr {
    pub phy_addr_y_head: U32,
    pub phy_addr_y: U32,
    pub stride_y: U32,
    pub phy_addr_c_head: U32,
    pub phy_addr_c: U32,
    pub stride_c: U32,
    pub phy_addr_cr_head: U32,
    pub phy_addr_cr: U32,
    pub stride_cr: U32,
}

/// Number of 32-bit words reserved for driver-private frame data.
pub const HI_DRV_VIDEO_PRIV_WORDS: usize = 64;

/// `HI_DRV_VIDEO_FRAME_S`
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub frame_index: U32,
    /// `[0]` is the (left-eye) picture, `[1]` the right eye for stereo content.
    pub buf_addr: [FrameAddr; 2],
    pub width: U32,
    pub height: U32,
    pub src_pts: U32,
    pub pts: U32,
    pub aspect_width: U32,
    pub aspect_height: U32,
    /// In 1/100 Hz, 0 means unknown.
    pub frame_rate: U32,
    pub pix_format: PixelFormat,
    pub progressive: Bool,
    pub field_mode: FieldMode,
    pub top_field_first: Bool,
    pub disp_rect: Rect,
    pub frame_type: FrameType,
    pub circumrotate: U32,
    pub to_flip_h: Bool,
    pub to_flip_v: Bool,
    pub error_level: U32,
    pub private: [U32; HI_DRV_VIDEO_PRIV_WORDS],
}

impl Default for VideoFrame {
    fn default() -> Self {
        let mut s = std::mem::MaybeUninit::<Self>::uninit();
        unsafe {
            std::ptr::write_bytes(s.as_mut_ptr(), 0, 1);
            s.assume_init()
        }
    }
}

/// `HI_DRV_VIDEO_PRIVATE_S`, overlaid on [`VideoFrame::private`].
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct VideoPrivate {
    pub valid: Bool,
    pub last_flag: U32,
    pub color_space: ColorSpace,
    pub origin_field: FieldMode,
    pub origin_image_rect: Rect,
    pub disp_center_x: S32,
    pub disp_center_y: S32,
}

const _: () = assert!(size_of::<VideoPrivate>() <= size_of::<[U32; HI_DRV_VIDEO_PRIV_WORDS]>());
const _: () = assert!(std::mem::align_of::<VideoPrivate>() <= std::mem::align_of::<U32>());

impl VideoFrame {
    pub fn private_info(&self) -> &VideoPrivate {
        // Size and alignment are checked at compile time above, and every bit
        // pattern is a valid `VideoPrivate`.
        unsafe { &*(self.private.as_ptr() as *const VideoPrivate) }
    }

    pub fn private_info_mut(&mut self) -> &mut VideoPrivate {
        unsafe { &mut *(self.private.as_mut_ptr() as *mut VideoPrivate) }
    }
}

/// `WIN_CREATE_S`, also used by set/get attribute.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct WinCreate {
    pub win_attr: WinAttr,
    pub h_window: Handle,
}

/// `WIN_ENABLE_S`
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct WinEnable {
    pub h_window: Handle,
    pub enable: Bool,
}

/// `WIN_FRAME_S`
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct WinFrame {
    pub h_window: Handle,
    pub frame: VideoFrame,
}

/// `WIN_FREEZE_S`
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct WinFreeze {
    pub h_window: Handle,
    pub enable: Bool,
    pub mode: WinSwitch,
}

/// `WIN_RESET_S`
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct WinReset {
    pub h_window: Handle,
    pub mode: WinSwitch,
}

/// ioctl type (magic) of the VO module.
pub const HI_ID_VO: u8 = 0x2C;

pub const WIN_CREATE_NR: u8 = 0x01;
pub const WIN_DESTROY_NR: u8 = 0x02;
pub const WIN_SET_ENABLE_NR: u8 = 0x03;
pub const WIN_GET_ENABLE_NR: u8 = 0x04;
pub const WIN_SET_ATTR_NR: u8 = 0x05;
pub const WIN_GET_ATTR_NR: u8 = 0x06;
pub const WIN_SEND_FRAME_NR: u8 = 0x07;
pub const WIN_DQ_FRAME_NR: u8 = 0x08;
pub const WIN_QU_FRAME_NR: u8 = 0x09;
pub const WIN_QU_ULSFRAME_NR: u8 = 0x0A;
pub const WIN_FREEZE_NR: u8 = 0x0B;
pub const WIN_RESET_NR: u8 = 0x0C;

pub const CMD_WIN_CREATE: ioctl_num_type =
    nix::request_code_readwrite!(HI_ID_VO, WIN_CREATE_NR, size_of::<WinCreate>());
pub const CMD_WIN_DESTROY: ioctl_num_type =
    nix::request_code_write!(HI_ID_VO, WIN_DESTROY_NR, size_of::<Handle>());
pub const CMD_WIN_SET_ENABLE: ioctl_num_type =
    nix::request_code_write!(HI_ID_VO, WIN_SET_ENABLE_NR, size_of::<WinEnable>());
pub const CMD_WIN_GET_ENABLE: ioctl_num_type =
    nix::request_code_readwrite!(HI_ID_VO, WIN_GET_ENABLE_NR, size_of::<WinEnable>());
pub const CMD_WIN_SET_ATTR: ioctl_num_type =
    nix::request_code_write!(HI_ID_VO, WIN_SET_ATTR_NR, size_of::<WinCreate>());
pub const CMD_WIN_GET_ATTR: ioctl_num_type =
    nix::request_code_readwrite!(HI_ID_VO, WIN_GET_ATTR_NR, size_of::<WinCreate>());
pub const CMD_WIN_SEND_FRAME: ioctl_num_type =
    nix::request_code_write!(HI_ID_VO, WIN_SEND_FRAME_NR, size_of::<WinFrame>());
pub const CMD_WIN_DQ_FRAME: ioctl_num_type =
    nix::request_code_readwrite!(HI_ID_VO, WIN_DQ_FRAME_NR, size_of::<WinFrame>());
pub const CMD_WIN_QU_FRAME: ioctl_num_type =
    nix::request_code_write!(HI_ID_VO, WIN_QU_FRAME_NR, size_of::<WinFrame>());
pub const CMD_WIN_QU_ULSFRAME: ioctl_num_type =
    nix::request_code_write!(HI_ID_VO, WIN_QU_ULSFRAME_NR, size_of::<WinFrame>());
pub const CMD_WIN_FREEZE: ioctl_num_type =
    nix::request_code_write!(HI_ID_VO, WIN_FREEZE_NR, size_of::<WinFreeze>());
pub const CMD_WIN_RESET: ioctl_num_type =
    nix::request_code_write!(HI_ID_VO, WIN_RESET_NR, size_of::<WinReset>());

nix::ioctl_readwrite!(win_create, HI_ID_VO, WIN_CREATE_NR, WinCreate);
nix::ioctl_write_ptr!(win_destroy, HI_ID_VO, WIN_DESTROY_NR, Handle);
nix::ioctl_write_ptr!(win_set_enable, HI_ID_VO, WIN_SET_ENABLE_NR, WinEnable);
nix::ioctl_readwrite!(win_get_enable, HI_ID_VO, WIN_GET_ENABLE_NR, WinEnable);
nix::ioctl_write_ptr!(win_set_attr, HI_ID_VO, WIN_SET_ATTR_NR, WinCreate);
nix::ioctl_readwrite!(win_get_attr, HI_ID_VO, WIN_GET_ATTR_NR, WinCreate);
nix::ioctl_write_ptr!(win_send_frame, HI_ID_VO, WIN_SEND_FRAME_NR, WinFrame);
nix::ioctl_readwrite!(win_dequeue_frame, HI_ID_VO, WIN_DQ_FRAME_NR, WinFrame);
nix::ioctl_write_ptr!(win_queue_frame, HI_ID_VO, WIN_QU_FRAME_NR, WinFrame);
nix::ioctl_write_ptr!(win_queue_useless_frame, HI_ID_VO, WIN_QU_ULSFRAME_NR, WinFrame);
nix::ioctl_write_ptr!(win_freeze, HI_ID_VO, WIN_FREEZE_NR, WinFreeze);
nix::ioctl_write_ptr!(win_reset, HI_ID_VO, WIN_RESET_NR, WinReset);
