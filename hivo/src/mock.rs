// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

//! Simulated VO driver.
//!
//! [`MockDriver`] records every open, command and close it sees, keeps a
//! small model of the windows it created, and can be told to fail specific
//! operations. It is meant for tests of code built on [`crate::Channel`].
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use hivo::mock::{DriverEvent, MockDriver};
//! use hivo::{Channel, CommandKind, WindowAttr, WindowRegistry};
//!
//! let driver = MockDriver::new();
//! let registry = WindowRegistry::new(Arc::new(Channel::new(driver.clone())));
//! registry.channel().open().unwrap();
//! registry.create_window(&WindowAttr::default()).unwrap();
//!
//! assert_eq!(
//!     driver.events(),
//!     vec![DriverEvent::Open, DriverEvent::Command(CommandKind::CreateWindow)]
//! );
//! ```

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hivo_sys as sys;
use nix::errno::Errno;

use crate::device::{VoDriver, VoNode};
use crate::{Command, CommandKind, Error, Result, WindowHandle};

/// Something the simulated driver observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverEvent {
    Open,
    Command(CommandKind),
    Close,
}

/// Simulated state of one window.
#[derive(Debug, Clone, Default)]
pub struct MockWindow {
    pub attr: sys::WinAttr,
    pub enabled: sys::Bool,
    /// Last freeze request: (enabled, mode).
    pub frozen: Option<(bool, sys::WinSwitch)>,
    /// Mode of the last reset request.
    pub last_reset: Option<sys::WinSwitch>,
    /// Frames waiting to be displayed or dequeued.
    pub queued: VecDeque<sys::VideoFrame>,
    pub useless_frames: usize,
}

#[derive(Debug)]
enum OpenFailure {
    Missing,
    Refused(Errno),
}

#[derive(Debug)]
struct MockState {
    events: Vec<DriverEvent>,
    open_failure: Option<OpenFailure>,
    close_failure: Option<Errno>,
    command_failures: HashMap<CommandKind, i32>,
    next_handle: sys::Handle,
    windows: BTreeMap<sys::Handle, MockWindow>,
    destroyed: BTreeMap<sys::Handle, MockWindow>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            open_failure: None,
            close_failure: None,
            command_failures: HashMap::new(),
            next_handle: (sys::HI_ID_VO as sys::Handle) << 16,
            windows: BTreeMap::new(),
            destroyed: BTreeMap::new(),
        }
    }
}

/// Cloneable handle on a simulated driver; all clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything observed so far, in order.
    pub fn events(&self) -> Vec<DriverEvent> {
        self.state().events.clone()
    }

    /// The commands observed so far, in order.
    pub fn commands(&self) -> Vec<CommandKind> {
        self.state()
            .events
            .iter()
            .filter_map(|event| match event {
                DriverEvent::Command(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn clear_events(&self) {
        self.state().events.clear();
    }

    /// Makes the device node look absent until [`MockDriver::restore_device`].
    pub fn remove_device(&self) {
        self.state().open_failure = Some(OpenFailure::Missing);
    }

    /// Makes opening the node fail with `errno`.
    pub fn refuse_open(&self, errno: Errno) {
        self.state().open_failure = Some(OpenFailure::Refused(errno));
    }

    pub fn restore_device(&self) {
        self.state().open_failure = None;
    }

    /// Makes every close fail with `errno`.
    pub fn fail_close(&self, errno: Errno) {
        self.state().close_failure = Some(errno);
    }

    /// Makes every `kind` command fail with `status` until
    /// [`MockDriver::succeed_command`] is called.
    pub fn fail_command(&self, kind: CommandKind, status: i32) {
        self.state().command_failures.insert(kind, status);
    }

    pub fn succeed_command(&self, kind: CommandKind) {
        self.state().command_failures.remove(&kind);
    }

    /// Snapshot of a window created through this driver.
    pub fn window(&self, handle: WindowHandle) -> Option<MockWindow> {
        self.state().windows.get(&handle.as_raw()).cloned()
    }

    /// Last state of a window that has been destroyed.
    pub fn destroyed_window(&self, handle: WindowHandle) -> Option<MockWindow> {
        self.state().destroyed.get(&handle.as_raw()).cloned()
    }

    /// Number of windows alive in the driver.
    pub fn window_count(&self) -> usize {
        self.state().windows.len()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl VoDriver for MockDriver {
    fn open(&self) -> Result<Box<dyn VoNode>> {
        let mut state = self.state();
        match state.open_failure {
            Some(OpenFailure::Missing) => {
                return Err(Error::DeviceUnavailable("mock device removed".to_string()));
            }
            Some(OpenFailure::Refused(errno)) => return Err(Error::OpenFailed(errno)),
            None => {}
        }

        state.events.push(DriverEvent::Open);
        Ok(Box::new(MockNode {
            driver: self.clone(),
        }))
    }
}

struct MockNode {
    driver: MockDriver,
}

impl VoNode for MockNode {
    fn execute(&mut self, command: Command<'_>) -> Result<()> {
        let mut state = self.driver.state();
        let kind = command.kind();
        state.events.push(DriverEvent::Command(kind));

        if let Some(&status) = state.command_failures.get(&kind) {
            return Err(Error::SubmitFailed {
                command: kind,
                status,
            });
        }

        match command {
            Command::CreateWindow(payload) => {
                let handle = state.next_handle;
                state.next_handle += 1;
                payload.h_window = handle;
                state.windows.insert(
                    handle,
                    MockWindow {
                        attr: payload.win_attr,
                        ..Default::default()
                    },
                );
            }
            Command::DestroyWindow(handle) => {
                let window = state
                    .windows
                    .remove(handle)
                    .ok_or(Error::submit(kind, Errno::EINVAL))?;
                state.destroyed.insert(*handle, window);
            }
            Command::SetEnable(payload) => {
                state.window_mut(kind, payload.h_window)?.enabled = payload.enable;
            }
            Command::GetEnable(payload) => {
                payload.enable = state.window_mut(kind, payload.h_window)?.enabled;
            }
            Command::SetAttr(payload) => {
                state.window_mut(kind, payload.h_window)?.attr = payload.win_attr;
            }
            Command::GetAttr(payload) => {
                payload.win_attr = state.window_mut(kind, payload.h_window)?.attr;
            }
            Command::SendFrame(payload) | Command::QueueFrame(payload) => {
                let window = state.window_mut(kind, payload.h_window)?;
                window.queued.push_back(payload.frame);
            }
            Command::QueueUselessFrame(payload) => {
                state.window_mut(kind, payload.h_window)?.useless_frames += 1;
            }
            Command::DequeueFrame(payload) => {
                let window = state.window_mut(kind, payload.h_window)?;
                payload.frame = window
                    .queued
                    .pop_front()
                    .ok_or(Error::submit(kind, Errno::EAGAIN))?;
            }
            Command::Freeze(payload) => {
                let window = state.window_mut(kind, payload.h_window)?;
                window.frozen = Some((payload.enable == sys::HI_TRUE, payload.mode));
            }
            Command::Reset(payload) => {
                let window = state.window_mut(kind, payload.h_window)?;
                window.queued.clear();
                window.last_reset = Some(payload.mode);
            }
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        let mut state = self.driver.state();
        state.events.push(DriverEvent::Close);
        match state.close_failure {
            Some(errno) => Err(Error::CloseFailed(errno)),
            None => Ok(()),
        }
    }
}

impl MockState {
    fn window_mut(&mut self, kind: CommandKind, handle: sys::Handle) -> Result<&mut MockWindow> {
        self.windows
            .get_mut(&handle)
            .ok_or(Error::submit(kind, Errno::EINVAL))
    }
}
