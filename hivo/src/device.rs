// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

//! Access to the VO driver.
//!
//! [`VoDriver`] is the seam between the [`crate::Channel`] and whatever
//! executes commands: [`DeviceNodeDriver`] talks to the kernel driver through
//! its character device, and the `mock` feature provides a simulated driver
//! for tests.

use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd};
use std::path::{Path, PathBuf};

use hivo_sys as sys;
use nix::fcntl::OFlag;
use nix::sys::stat::{Mode, SFlag};
use tracing::debug;

use crate::{Command, Error, Result};

/// Opens connections to the VO driver.
pub trait VoDriver: Send + Sync {
    /// Opens a new connection. Called at most once per open channel.
    fn open(&self) -> Result<Box<dyn VoNode>>;
}

/// An open connection to the VO driver.
pub trait VoNode: Send {
    /// Executes one command, leaving the driver's reply in the payload.
    fn execute(&mut self, command: Command<'_>) -> Result<()>;

    /// Closes the connection.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Driver backed by the VO character device (`/dev/hi_vo` by default).
#[derive(Debug, Clone)]
pub struct DeviceNodeDriver {
    path: PathBuf,
}

impl DeviceNodeDriver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VoDriver for DeviceNodeDriver {
    fn open(&self) -> Result<Box<dyn VoNode>> {
        let stat = nix::sys::stat::stat(&self.path).map_err(|e| {
            Error::DeviceUnavailable(format!("{} does not exist ({e})", self.path.display()))
        })?;

        if SFlag::from_bits_truncate(stat.st_mode) & SFlag::S_IFMT != SFlag::S_IFCHR {
            return Err(Error::DeviceUnavailable(format!(
                "{} is not a character device",
                self.path.display()
            )));
        }

        let fd = nix::fcntl::open(
            &self.path,
            OFlag::O_RDWR | OFlag::O_NONBLOCK | OFlag::O_CLOEXEC,
            Mode::empty(),
        )
        .map_err(Error::OpenFailed)?;
        debug!("Opened {} as fd {}", self.path.display(), fd);

        // Safety: `open` just returned this descriptor and nothing else owns it.
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        Ok(Box::new(DeviceNode { fd }))
    }
}

/// Open descriptor on the VO character device.
struct DeviceNode {
    fd: OwnedFd,
}

impl VoNode for DeviceNode {
    fn execute(&mut self, command: Command<'_>) -> Result<()> {
        let fd = self.fd.as_raw_fd();
        let kind = command.kind();

        // Safety: `fd` is open on the VO device for the lifetime of `self`, and
        // every payload is a live reference to the record type the request
        // code was built from.
        let result = unsafe {
            match command {
                Command::CreateWindow(payload) => sys::win_create(fd, payload),
                Command::DestroyWindow(handle) => sys::win_destroy(fd, handle),
                Command::SetEnable(payload) => sys::win_set_enable(fd, payload),
                Command::GetEnable(payload) => sys::win_get_enable(fd, payload),
                Command::SetAttr(payload) => sys::win_set_attr(fd, payload),
                Command::GetAttr(payload) => sys::win_get_attr(fd, payload),
                Command::SendFrame(payload) => sys::win_send_frame(fd, payload),
                Command::DequeueFrame(payload) => sys::win_dequeue_frame(fd, payload),
                Command::QueueFrame(payload) => sys::win_queue_frame(fd, payload),
                Command::QueueUselessFrame(payload) => sys::win_queue_useless_frame(fd, payload),
                Command::Freeze(payload) => sys::win_freeze(fd, payload),
                Command::Reset(payload) => sys::win_reset(fd, payload),
            }
        };

        match result {
            Ok(sys::HI_SUCCESS) => Ok(()),
            // The driver may report vendor status codes as a positive return value.
            Ok(status) => Err(Error::SubmitFailed {
                command: kind,
                status,
            }),
            Err(errno) => Err(Error::submit(kind, errno)),
        }
    }

    fn close(self: Box<Self>) -> Result<()> {
        let fd = self.fd.into_raw_fd();
        nix::unistd::close(fd).map_err(Error::CloseFailed)
    }
}
