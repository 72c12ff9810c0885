// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

//! # hivo - HiSilicon video output
//!
//! Safe, idiomatic Rust access to the VO (video output) window driver of
//! HiSilicon set-top-box SoCs, wrapping the raw ABI of [`hivo_sys`].
//!
//! ## Overview
//!
//! The VO driver composites and displays frames; this crate only gets frames
//! to it. Every request travels through one serialized [`Channel`] as a typed
//! [`Command`] carrying the driver's fixed-layout payload.
//!
//! ### Key Concepts
//!
//! - **Channel**: the single connection to `/dev/hi_vo` ([`Channel`])
//! - **Window**: a display surface addressed by a [`WindowHandle`], managed
//!   through the [`WindowRegistry`]
//! - **Session**: an enabled window with ordered bring-up and tear-down
//!   ([`WindowSession`])
//! - **Frame descriptor**: the per-frame record handed to a window
//!   ([`FrameDescriptor`])
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐
//! │ WindowSession  │  open → create → enable, reverse unwind on failure
//! └───────┬────────┘
//!         │
//! ┌───────▼────────┐     ┌─────────────────┐
//! │ WindowRegistry │ ◄── │ FrameDescriptor │
//! └───────┬────────┘     └─────────────────┘
//!         │ Command
//! ┌───────▼────────┐
//! │    Channel     │  one lock, open once
//! └───────┬────────┘
//!         │ VoDriver / VoNode
//!   /dev/hi_vo (ioctl)    or    mock::MockDriver
//! ```
//!
//! ## Examples
//!
//! ```no_run
//! use hivo::{FrameDescriptor, WindowAttr, WindowRegistry, WindowSession};
//!
//! # fn main() -> Result<(), hivo::Error> {
//! let session = WindowSession::open(WindowRegistry::global(), &WindowAttr::default())?;
//!
//! let frame = FrameDescriptor::build(1920, 1080, 0x1000_0000)?;
//! session.registry().queue_frame(session.handle(), &frame)?;
//!
//! session.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! [`Channel`] and [`WindowRegistry`] are `Send + Sync`. Commands issued from
//! any thread are serialized by the channel's lock and may block for as long
//! as the driver takes to answer.
//!
//! ## Feature Flags
//!
//! - `mock`: the [`mock`] module with a simulated driver

mod channel;
mod command;
mod device;
mod error;
mod frame;
mod session;
mod window;

pub mod config;
#[cfg(feature = "mock")]
pub mod mock;

pub use channel::Channel;
pub use command::{Command, CommandKind};
pub use device::{DeviceNodeDriver, VoDriver, VoNode};
pub use error::{Error, Result};
pub use frame::{FrameDescriptor, STRIDE_ALIGNMENT};
pub use session::WindowSession;
pub use window::{
    AspectMode, DisplayId, SwitchMode, WindowAttr, WindowHandle, WindowRect, WindowRegistry,
};
