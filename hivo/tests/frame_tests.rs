// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

use hivo::{FrameDescriptor, WindowRect};
use hivo_sys as sys;

/// A full HD picture at a typical physical address.
#[test]
fn full_hd_frame() {
    let frame = FrameDescriptor::build(1920, 1080, 0x1000_0000).unwrap();

    assert_eq!(frame.width(), 1920);
    assert_eq!(frame.height(), 1080);
    assert_eq!(frame.luma_address(), 0x1000_0000);
    assert_eq!(frame.chroma_address(), 0x101F_A400);
    assert_eq!(frame.luma_stride(), 1920);
    assert_eq!(frame.chroma_stride(), 1920);

    assert_eq!(frame.pts(), None);
    assert_eq!(frame.src_pts(), None);
    assert_eq!(frame.as_raw().pts, sys::HI_INVALID_PTS);

    assert_eq!(frame.pixel_format(), sys::HI_DRV_PIX_FMT_NV21);
    assert!(frame.is_progressive());
    assert!(frame.is_top_field_first());
    assert_eq!(frame.field_mode(), sys::HI_DRV_FIELD_ALL);
    assert_eq!(frame.display_rect(), WindowRect::new(0, 0, 1920, 1080));
}

#[test]
fn unaligned_width_pads_the_luma_plane() {
    let frame = FrameDescriptor::build(1366, 768, 0x2000_0000).unwrap();

    assert_eq!(frame.luma_stride(), 1376);
    assert_eq!(frame.chroma_address(), 0x2000_0000 + 1376 * 768);
    assert_eq!(frame.display_rect(), WindowRect::new(0, 0, 1366, 768));
}

#[test]
fn remaining_fields_follow_the_fixed_policy() {
    let frame = FrameDescriptor::build(720, 576, 0x1000).unwrap();
    let raw = frame.as_raw();

    assert_eq!(raw.frame_index, 0);
    assert_eq!(raw.aspect_width, 0);
    assert_eq!(raw.aspect_height, 0);
    assert_eq!(raw.frame_rate, 0);
    assert_eq!(raw.frame_type, sys::HI_DRV_FT_NOT_STEREO);
    assert_eq!(raw.circumrotate, 0);
    assert_eq!(raw.to_flip_h, sys::HI_FALSE);
    assert_eq!(raw.to_flip_v, sys::HI_FALSE);
    assert_eq!(raw.buf_addr[1], sys::FrameAddr::default());

    let private = raw.private_info();
    assert_eq!(private.valid, sys::HI_TRUE);
    assert_eq!(private.last_flag, sys::HI_FALSE);
    assert_eq!(private.origin_field, sys::HI_DRV_FIELD_ALL);
    assert_eq!(private.origin_image_rect, raw.disp_rect);
    assert_eq!(frame.color_space(), sys::HI_DRV_CS_BT709_YUV_LIMITED);
    assert_eq!(frame.display_center(), (360, 288));
}

/// Building twice from the same inputs gives identical records.
#[test]
fn build_is_deterministic() {
    assert_eq!(
        FrameDescriptor::build(640, 480, 0x3000_0000).unwrap(),
        FrameDescriptor::build(640, 480, 0x3000_0000).unwrap()
    );
}

#[test]
fn from_raw_keeps_driver_timestamps() {
    let mut raw = *FrameDescriptor::build(64, 64, 0).unwrap().as_raw();
    raw.pts = 40;
    raw.src_pts = 20;

    let frame = FrameDescriptor::from_raw(raw);

    assert_eq!(frame.pts(), Some(40));
    assert_eq!(frame.src_pts(), Some(20));
}
