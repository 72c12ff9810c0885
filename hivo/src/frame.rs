// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

//! Frame descriptors.
//!
//! The driver describes every frame with a large fixed-layout record. Most of
//! its fields are irrelevant to a plain video sink, so
//! [`FrameDescriptor::build`] fills them from a fixed policy: NV21
//! semi-planar 4:2:0, progressive, full-frame display rectangle, unknown
//! timestamps.

use hivo_sys as sys;

use crate::{Error, Result, WindowRect};

/// Alignment of luma and chroma strides, in bytes.
pub const STRIDE_ALIGNMENT: u32 = 16;

/// One frame as the VO driver sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor {
    raw: sys::VideoFrame,
}

impl FrameDescriptor {
    /// Describes a semi-planar 4:2:0 picture stored at `physical_address`.
    ///
    /// The chroma plane is expected right after the luma plane, both with a
    /// stride of `width` rounded up to [`STRIDE_ALIGNMENT`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `width` or `height` is zero, or if the
    /// picture does not fit in the 32-bit physical address space.
    ///
    /// # Examples
    ///
    /// ```
    /// use hivo::FrameDescriptor;
    ///
    /// let frame = FrameDescriptor::build(1920, 1080, 0x1000_0000).unwrap();
    /// assert_eq!(frame.luma_stride(), 1920);
    /// assert_eq!(frame.chroma_address(), 0x1000_0000 + 1920 * 1080);
    /// ```
    pub fn build(width: u32, height: u32, physical_address: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument("frame width and height must be non-zero"));
        }

        let stride = width
            .checked_next_multiple_of(STRIDE_ALIGNMENT)
            .ok_or(Error::InvalidArgument("frame is too wide"))?;
        let chroma_address = stride
            .checked_mul(height)
            .and_then(|luma_size| physical_address.checked_add(luma_size))
            .ok_or(Error::InvalidArgument("frame exceeds the physical address space"))?;
        let (display_width, display_height) = (to_s32(width)?, to_s32(height)?);

        let mut raw = sys::VideoFrame::default();
        raw.frame_index = 0;
        raw.buf_addr[0].phy_addr_y = physical_address;
        raw.buf_addr[0].phy_addr_c = chroma_address;
        raw.buf_addr[0].stride_y = stride;
        raw.buf_addr[0].stride_c = stride;

        raw.width = width;
        raw.height = height;

        raw.src_pts = sys::HI_INVALID_PTS;
        raw.pts = sys::HI_INVALID_PTS;

        raw.aspect_width = 0;
        raw.aspect_height = 0;
        raw.frame_rate = 0;

        raw.pix_format = sys::HI_DRV_PIX_FMT_NV21;
        raw.progressive = sys::HI_TRUE;
        raw.field_mode = sys::HI_DRV_FIELD_ALL;
        raw.top_field_first = sys::HI_TRUE;

        raw.disp_rect = sys::Rect {
            x: 0,
            y: 0,
            width: display_width,
            height: display_height,
        };

        raw.frame_type = sys::HI_DRV_FT_NOT_STEREO;
        raw.circumrotate = 0;
        raw.to_flip_h = sys::HI_FALSE;
        raw.to_flip_v = sys::HI_FALSE;
        raw.error_level = 0;

        let disp_rect = raw.disp_rect;
        let private = raw.private_info_mut();
        private.valid = sys::HI_TRUE;
        private.last_flag = sys::HI_FALSE;
        private.color_space = sys::HI_DRV_CS_BT709_YUV_LIMITED;
        private.origin_field = sys::HI_DRV_FIELD_ALL;
        private.origin_image_rect = disp_rect;
        private.disp_center_x = display_width / 2;
        private.disp_center_y = display_height / 2;

        Ok(Self { raw })
    }

    /// Wraps a record returned by the driver.
    pub fn from_raw(raw: sys::VideoFrame) -> Self {
        Self { raw }
    }

    pub fn as_raw(&self) -> &sys::VideoFrame {
        &self.raw
    }

    pub fn width(&self) -> u32 {
        self.raw.width
    }

    pub fn height(&self) -> u32 {
        self.raw.height
    }

    pub fn luma_address(&self) -> u32 {
        self.raw.buf_addr[0].phy_addr_y
    }

    pub fn chroma_address(&self) -> u32 {
        self.raw.buf_addr[0].phy_addr_c
    }

    pub fn luma_stride(&self) -> u32 {
        self.raw.buf_addr[0].stride_y
    }

    pub fn chroma_stride(&self) -> u32 {
        self.raw.buf_addr[0].stride_c
    }

    /// Presentation timestamp, `None` when unknown.
    pub fn pts(&self) -> Option<u32> {
        known_pts(self.raw.pts)
    }

    /// Source timestamp, `None` when unknown.
    pub fn src_pts(&self) -> Option<u32> {
        known_pts(self.raw.src_pts)
    }

    pub fn pixel_format(&self) -> sys::PixelFormat {
        self.raw.pix_format
    }

    pub fn is_progressive(&self) -> bool {
        self.raw.progressive == sys::HI_TRUE
    }

    pub fn field_mode(&self) -> sys::FieldMode {
        self.raw.field_mode
    }

    pub fn is_top_field_first(&self) -> bool {
        self.raw.top_field_first == sys::HI_TRUE
    }

    pub fn display_rect(&self) -> WindowRect {
        self.raw.disp_rect.into()
    }

    /// Centre of the display rectangle.
    pub fn display_center(&self) -> (i32, i32) {
        let private = self.raw.private_info();
        (private.disp_center_x, private.disp_center_y)
    }

    pub fn color_space(&self) -> sys::ColorSpace {
        self.raw.private_info().color_space
    }
}

fn known_pts(pts: u32) -> Option<u32> {
    (pts != sys::HI_INVALID_PTS).then_some(pts)
}

fn to_s32(value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::InvalidArgument("frame dimension is too large"))
}
