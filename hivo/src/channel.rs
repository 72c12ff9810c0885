// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

//! The serialized command channel to the VO driver.
//!
//! A [`Channel`] owns at most one open connection to the driver and funnels
//! every command through a single lock: the driver accepts one command
//! stream, so no two commands may ever be in flight at the same time.

use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::device::{DeviceNodeDriver, VoDriver, VoNode};
use crate::{Command, Error, Result, config};

/// Serialized, open-once connection to the VO driver.
///
/// The process normally shares one channel ([`Channel::global`]); tests build
/// their own over a simulated driver with [`Channel::new`].
///
/// # Examples
///
/// ```no_run
/// use hivo::Channel;
///
/// # fn main() -> Result<(), hivo::Error> {
/// let channel = Channel::global();
/// channel.open()?;
/// channel.open()?; // already open, nothing happens
/// channel.close()?;
/// # Ok(())
/// # }
/// ```
pub struct Channel {
    driver: Box<dyn VoDriver>,
    node: Mutex<Option<Box<dyn VoNode>>>,
}

static GLOBAL: LazyLock<Arc<Channel>> = LazyLock::new(|| {
    Arc::new(Channel::new(DeviceNodeDriver::new(
        config::get_vo_device_path(),
    )))
});

impl Channel {
    /// Creates a closed channel over `driver`.
    pub fn new(driver: impl VoDriver + 'static) -> Self {
        Self {
            driver: Box::new(driver),
            node: Mutex::new(None),
        }
    }

    /// The process-wide channel on the configured VO device node.
    pub fn global() -> Arc<Channel> {
        GLOBAL.clone()
    }

    /// Opens the driver connection unless it is already open.
    ///
    /// # Errors
    ///
    /// - [`Error::DeviceUnavailable`] if the device node is missing or is not
    ///   a character device
    /// - [`Error::OpenFailed`] if opening the node fails
    pub fn open(&self) -> Result<()> {
        let mut node = self.lock();
        if node.is_some() {
            return Ok(());
        }

        *node = Some(self.driver.open()?);
        debug!("VO channel opened");
        Ok(())
    }

    /// Closes the driver connection if it is open.
    ///
    /// The channel is closed afterwards even when [`Error::CloseFailed`] is
    /// returned.
    pub fn close(&self) -> Result<()> {
        let mut node = self.lock();
        let Some(open) = node.take() else {
            return Ok(());
        };

        debug!("VO channel closed");
        open.close()
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Submits one command and waits for the driver's answer.
    ///
    /// The lock is held for the whole call, so commands from all threads are
    /// strictly serialized.
    ///
    /// # Errors
    ///
    /// - [`Error::NotInitialized`] if the channel is closed (nothing is sent)
    /// - [`Error::SubmitFailed`] if the driver rejects the command
    pub fn submit(&self, command: Command<'_>) -> Result<()> {
        let mut node = self.lock();
        let node = node.as_mut().ok_or(Error::NotInitialized)?;

        trace!("Submitting {}", command.kind());
        node.execute(command)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn VoNode>>> {
        // The guarded value is a plain Option, it can't be left half-updated.
        self.node.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("open", &self.is_open())
            .finish()
    }
}
