// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for VO operations.
//!
//! This module defines the errors returned by the device channel, the window
//! registry and the frame descriptor builder.

use crate::CommandKind;

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur when talking to the VO driver.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The device node is missing or is not a character device.
    #[error("VO device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The device node exists but could not be opened.
    #[error("Failed to open VO device: {0}")]
    OpenFailed(#[source] nix::errno::Errno),

    /// A command was submitted while the channel is closed.
    #[error("VO is not initialized")]
    NotInitialized,

    /// The window handle is the invalid sentinel.
    #[error("Invalid window handle")]
    InvalidHandle,

    /// An argument was rejected before reaching the device.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The driver rejected a command.
    ///
    /// `status` is the driver's status code (the `errno` of the failed
    /// `ioctl` for the real device).
    #[error("{command} failed with status {status:#x}")]
    SubmitFailed { command: CommandKind, status: i32 },

    /// Closing the device node failed. The channel is closed anyway.
    #[error("Failed to close VO device: {0}")]
    CloseFailed(#[source] nix::errno::Errno),
}

impl Error {
    /// Maps a failed `ioctl` onto [`Error::SubmitFailed`].
    pub(crate) fn submit(command: CommandKind, errno: nix::errno::Errno) -> Self {
        Error::SubmitFailed {
            command,
            status: errno as i32,
        }
    }
}
