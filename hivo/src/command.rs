// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

//! The closed set of commands understood by the VO window driver.
//!
//! Each variant borrows the fixed-layout payload record the driver expects.
//! Commands that return data (`Get*`, `CreateWindow`, `DequeueFrame`) borrow
//! their payload mutably; the driver's reply is left in it.

use std::fmt;

use hivo_sys as sys;

/// A window command together with its payload.
#[derive(Debug)]
pub enum Command<'a> {
    CreateWindow(&'a mut sys::WinCreate),
    DestroyWindow(&'a sys::Handle),
    SetEnable(&'a sys::WinEnable),
    GetEnable(&'a mut sys::WinEnable),
    SetAttr(&'a sys::WinCreate),
    GetAttr(&'a mut sys::WinCreate),
    SendFrame(&'a sys::WinFrame),
    DequeueFrame(&'a mut sys::WinFrame),
    QueueFrame(&'a sys::WinFrame),
    QueueUselessFrame(&'a sys::WinFrame),
    Freeze(&'a sys::WinFreeze),
    Reset(&'a sys::WinReset),
}

impl Command<'_> {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::CreateWindow(_) => CommandKind::CreateWindow,
            Command::DestroyWindow(_) => CommandKind::DestroyWindow,
            Command::SetEnable(_) => CommandKind::SetEnable,
            Command::GetEnable(_) => CommandKind::GetEnable,
            Command::SetAttr(_) => CommandKind::SetAttr,
            Command::GetAttr(_) => CommandKind::GetAttr,
            Command::SendFrame(_) => CommandKind::SendFrame,
            Command::DequeueFrame(_) => CommandKind::DequeueFrame,
            Command::QueueFrame(_) => CommandKind::QueueFrame,
            Command::QueueUselessFrame(_) => CommandKind::QueueUselessFrame,
            Command::Freeze(_) => CommandKind::Freeze,
            Command::Reset(_) => CommandKind::Reset,
        }
    }
}

/// Payload-free identifier of a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    CreateWindow,
    DestroyWindow,
    SetEnable,
    GetEnable,
    SetAttr,
    GetAttr,
    SendFrame,
    DequeueFrame,
    QueueFrame,
    QueueUselessFrame,
    Freeze,
    Reset,
}

impl CommandKind {
    /// The `ioctl` request number the driver assigns to this command.
    pub fn request_code(self) -> sys::ioctl_num_type {
        match self {
            CommandKind::CreateWindow => sys::CMD_WIN_CREATE,
            CommandKind::DestroyWindow => sys::CMD_WIN_DESTROY,
            CommandKind::SetEnable => sys::CMD_WIN_SET_ENABLE,
            CommandKind::GetEnable => sys::CMD_WIN_GET_ENABLE,
            CommandKind::SetAttr => sys::CMD_WIN_SET_ATTR,
            CommandKind::GetAttr => sys::CMD_WIN_GET_ATTR,
            CommandKind::SendFrame => sys::CMD_WIN_SEND_FRAME,
            CommandKind::DequeueFrame => sys::CMD_WIN_DQ_FRAME,
            CommandKind::QueueFrame => sys::CMD_WIN_QU_FRAME,
            CommandKind::QueueUselessFrame => sys::CMD_WIN_QU_ULSFRAME,
            CommandKind::Freeze => sys::CMD_WIN_FREEZE,
            CommandKind::Reset => sys::CMD_WIN_RESET,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CommandKind::CreateWindow => "create-window",
            CommandKind::DestroyWindow => "destroy-window",
            CommandKind::SetEnable => "set-enable",
            CommandKind::GetEnable => "get-enable",
            CommandKind::SetAttr => "set-attr",
            CommandKind::GetAttr => "get-attr",
            CommandKind::SendFrame => "send-frame",
            CommandKind::DequeueFrame => "dequeue-frame",
            CommandKind::QueueFrame => "queue-frame",
            CommandKind::QueueUselessFrame => "queue-useless-frame",
            CommandKind::Freeze => "freeze",
            CommandKind::Reset => "reset",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
