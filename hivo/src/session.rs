// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

//! Bring-up and tear-down of a displaying window.
//!
//! A [`WindowSession`] walks `channel open → window created → enabled`. Each
//! completed step is recorded; if a later step fails, the recorded steps are
//! released in reverse order before the error is returned.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{Result, SwitchMode, WindowAttr, WindowHandle, WindowRegistry};

#[derive(Debug, Clone, Copy)]
enum Step {
    ChannelOpen,
    WindowCreated(WindowHandle),
    Enabled(WindowHandle),
}

/// Releases recorded steps in reverse unless [`Unwind::complete`] is called.
struct Unwind<'a> {
    registry: &'a WindowRegistry,
    steps: Vec<Step>,
}

impl<'a> Unwind<'a> {
    fn new(registry: &'a WindowRegistry) -> Self {
        Self {
            registry,
            steps: Vec::with_capacity(3),
        }
    }

    fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    fn complete(mut self) {
        self.steps.clear();
    }

    fn release(&self, step: Step) {
        let result = match step {
            Step::Enabled(handle) => self.registry.set_enable(handle, false),
            Step::WindowCreated(handle) => self.registry.destroy_window(handle),
            Step::ChannelOpen => release_channel(self.registry),
        };
        if let Err(err) = result {
            warn!("Failed to undo {:?}: {}", step, err);
        }
    }
}

impl Drop for Unwind<'_> {
    fn drop(&mut self) {
        while let Some(step) = self.steps.pop() {
            debug!("Unwinding {:?}", step);
            self.release(step);
        }
    }
}

/// Closes the channel once no window uses it anymore. Callers hold the
/// registry's lifecycle lock.
fn release_channel(registry: &WindowRegistry) -> Result<()> {
    if registry.live_windows() == 0 {
        registry.channel().close()
    } else {
        Ok(())
    }
}

/// An enabled window, torn down when closed or dropped.
///
/// # Examples
///
/// ```no_run
/// use hivo::{SwitchMode, WindowAttr, WindowRegistry, WindowSession};
///
/// # fn main() -> Result<(), hivo::Error> {
/// let mut session = WindowSession::open(WindowRegistry::global(), &WindowAttr::default())?;
/// session.set_hold_mode(SwitchMode::LastFrame);
/// session.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WindowSession {
    registry: Arc<WindowRegistry>,
    handle: WindowHandle,
    hold: SwitchMode,
    closed: bool,
}

impl WindowSession {
    /// Opens the channel, creates a window from `attr` and enables it.
    ///
    /// # Errors
    ///
    /// Returns the error of the failing step after undoing the previous ones:
    /// a failed enable destroys the window and then closes the channel, a
    /// failed create closes the channel. The channel stays open while other
    /// windows are alive.
    pub fn open(registry: Arc<WindowRegistry>, attr: &WindowAttr) -> Result<Self> {
        let lifecycle = registry.lifecycle();
        let mut unwind = Unwind::new(&registry);

        registry.channel().open()?;
        unwind.push(Step::ChannelOpen);

        let handle = registry.create_window(attr)?;
        unwind.push(Step::WindowCreated(handle));

        registry.set_enable(handle, true)?;
        unwind.push(Step::Enabled(handle));

        unwind.complete();
        drop(lifecycle);
        debug!("Window {} is up", handle);

        Ok(Self {
            registry,
            handle,
            hold: SwitchMode::default(),
            closed: false,
        })
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    pub fn registry(&self) -> &Arc<WindowRegistry> {
        &self.registry
    }

    /// What stays on screen after the session is closed.
    pub fn hold_mode(&self) -> SwitchMode {
        self.hold
    }

    pub fn set_hold_mode(&mut self, hold: SwitchMode) {
        self.hold = hold;
    }

    /// Resets the window to the hold mode, destroys it, and closes the
    /// channel if it was the last window.
    pub fn close(mut self) -> Result<()> {
        self.teardown()
    }

    fn teardown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if let Err(err) = self.registry.reset(self.handle, self.hold) {
            warn!("Failed to reset window {}: {}", self.handle, err);
        }
        let lifecycle = self.registry.lifecycle();
        let destroyed = self.registry.destroy_window(self.handle);
        let released = release_channel(&self.registry);
        drop(lifecycle);

        destroyed.and(released)
    }
}

impl Drop for WindowSession {
    fn drop(&mut self) {
        if let Err(err) = self.teardown() {
            warn!("Failed to tear down window {}: {}", self.handle, err);
        }
    }
}
