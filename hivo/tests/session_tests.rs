// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

//! Window session bring-up, unwinding and tear-down.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use hivo::mock::{DriverEvent, MockDriver};
use hivo::{
    Channel, CommandKind, Error, FrameDescriptor, SwitchMode, VoDriver, VoNode,
    WindowAttr, WindowRect, WindowRegistry, WindowSession,
};
use hivo_sys as sys;
use nix::errno::Errno;

use DriverEvent::{Close, Command, Open};

/// Ensures logging is initialized only once across all tests.
static LOG_ONCE: std::sync::Once = std::sync::Once::new();

fn setup_test() -> (Arc<WindowRegistry>, MockDriver) {
    LOG_ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .init();
    });

    let driver = MockDriver::new();
    let registry = Arc::new(WindowRegistry::new(Arc::new(Channel::new(driver.clone()))));
    (registry, driver)
}

fn sink_attr() -> WindowAttr {
    WindowAttr {
        output: WindowRect::new(0, 0, 1920, 1080),
        ..Default::default()
    }
}

#[test]
fn open_brings_up_an_enabled_window() {
    let (registry, driver) = setup_test();

    let session = WindowSession::open(registry.clone(), &sink_attr()).unwrap();

    assert_eq!(
        driver.events(),
        vec![
            Open,
            Command(CommandKind::CreateWindow),
            Command(CommandKind::SetEnable),
        ]
    );
    assert!(registry.get_enable(session.handle()).unwrap());
    assert_eq!(session.hold_mode(), SwitchMode::Black);
}

/// A failed enable destroys the window and closes the channel, in that order.
#[test]
fn failed_enable_unwinds_in_reverse() {
    let (registry, driver) = setup_test();
    driver.fail_command(CommandKind::SetEnable, -1);

    let err = WindowSession::open(registry.clone(), &sink_attr()).unwrap_err();

    assert!(matches!(
        err,
        Error::SubmitFailed {
            command: CommandKind::SetEnable,
            ..
        }
    ));
    assert_eq!(
        driver.events(),
        vec![
            Open,
            Command(CommandKind::CreateWindow),
            Command(CommandKind::SetEnable),
            Command(CommandKind::DestroyWindow),
            Close,
        ]
    );
    assert_eq!(driver.window_count(), 0);
    assert_eq!(registry.live_windows(), 0);
    assert!(!registry.channel().is_open());
}

#[test]
fn failed_create_closes_the_channel() {
    let (registry, driver) = setup_test();
    driver.fail_command(CommandKind::CreateWindow, -1);

    assert!(WindowSession::open(registry.clone(), &sink_attr()).is_err());

    assert_eq!(
        driver.events(),
        vec![Open, Command(CommandKind::CreateWindow), Close]
    );
    assert!(!registry.channel().is_open());
}

#[test]
fn failed_open_touches_nothing_else() {
    let (registry, driver) = setup_test();
    driver.remove_device();

    assert!(matches!(
        WindowSession::open(registry, &sink_attr()),
        Err(Error::DeviceUnavailable(_))
    ));
    assert!(driver.events().is_empty());
}

#[test]
fn close_resets_destroys_and_closes() {
    let (registry, driver) = setup_test();
    let mut session = WindowSession::open(registry.clone(), &sink_attr()).unwrap();
    let handle = session.handle();
    session.set_hold_mode(SwitchMode::LastFrame);
    driver.clear_events();

    session.close().unwrap();

    assert_eq!(
        driver.events(),
        vec![
            Command(CommandKind::Reset),
            Command(CommandKind::DestroyWindow),
            Close,
        ]
    );
    assert!(driver.window(handle).is_none());
    assert_eq!(
        driver.destroyed_window(handle).unwrap().last_reset,
        Some(sys::HI_DRV_WIN_SWITCH_LAST)
    );
    assert!(!registry.channel().is_open());
}

#[test]
fn dropping_a_session_tears_it_down() {
    let (registry, driver) = setup_test();
    let session = WindowSession::open(registry.clone(), &sink_attr()).unwrap();
    let handle = session.handle();
    driver.clear_events();

    drop(session);

    assert_eq!(
        driver.events(),
        vec![
            Command(CommandKind::Reset),
            Command(CommandKind::DestroyWindow),
            Close,
        ]
    );
    assert_eq!(
        driver.destroyed_window(handle).unwrap().last_reset,
        Some(sys::HI_DRV_WIN_SWITCH_BLACK)
    );
}

/// The channel stays open while another session still owns a window.
#[test]
fn channel_outlives_all_but_the_last_window() {
    let (registry, driver) = setup_test();
    let first = WindowSession::open(registry.clone(), &sink_attr()).unwrap();
    let second = WindowSession::open(registry.clone(), &sink_attr()).unwrap();
    assert_eq!(
        driver.events().iter().filter(|event| **event == Open).count(),
        1
    );

    first.close().unwrap();
    assert!(registry.channel().is_open());
    assert!(!driver.events().contains(&Close));

    second.close().unwrap();
    assert!(!registry.channel().is_open());
    assert_eq!(driver.events().last(), Some(&Close));
}

#[test]
fn failed_enable_keeps_the_channel_for_other_windows() {
    let (registry, driver) = setup_test();
    let _running = WindowSession::open(registry.clone(), &sink_attr()).unwrap();
    driver.fail_command(CommandKind::SetEnable, -1);

    assert!(WindowSession::open(registry.clone(), &sink_attr()).is_err());

    assert!(registry.channel().is_open());
    assert_eq!(registry.live_windows(), 1);
    assert!(!driver.events().contains(&Close));
}

/// A failing reset is logged but does not stop the window from going away.
#[test]
fn teardown_continues_past_a_failed_reset() {
    let (registry, driver) = setup_test();
    let session = WindowSession::open(registry.clone(), &sink_attr()).unwrap();
    driver.fail_command(CommandKind::Reset, -1);
    driver.clear_events();

    session.close().unwrap();

    assert_eq!(
        driver.events(),
        vec![
            Command(CommandKind::Reset),
            Command(CommandKind::DestroyWindow),
            Close,
        ]
    );
}

#[test]
fn close_failure_is_reported_after_teardown() {
    let (registry, driver) = setup_test();
    let session = WindowSession::open(registry.clone(), &sink_attr()).unwrap();
    driver.fail_close(Errno::EIO);

    assert!(matches!(
        session.close(),
        Err(Error::CloseFailed(Errno::EIO))
    ));
    assert_eq!(driver.window_count(), 0);
    assert!(!registry.channel().is_open());
}

#[test]
fn frames_reach_the_session_window() {
    let (registry, driver) = setup_test();
    let session = WindowSession::open(registry, &sink_attr()).unwrap();

    let frame = FrameDescriptor::build(1920, 1080, 0x1000_0000).unwrap();
    session
        .registry()
        .queue_frame(session.handle(), &frame)
        .unwrap();

    let window = driver.window(session.handle()).unwrap();
    assert_eq!(window.queued.len(), 1);
    assert_eq!(window.queued[0].buf_addr[0].phy_addr_c, 0x101F_A400);
    assert_eq!(window.queued[0].pix_format, sys::HI_DRV_PIX_FMT_NV21);
}

type Gate = Arc<Mutex<Option<(Sender<()>, Receiver<()>)>>>;

/// Simulated driver that parks the first window destruction until released.
struct GatedDriver {
    inner: MockDriver,
    gate: Gate,
}

struct GatedNode {
    inner: Box<dyn VoNode>,
    gate: Gate,
}

impl VoDriver for GatedDriver {
    fn open(&self) -> hivo::Result<Box<dyn VoNode>> {
        Ok(Box::new(GatedNode {
            inner: self.inner.open()?,
            gate: self.gate.clone(),
        }))
    }
}

impl VoNode for GatedNode {
    fn execute(&mut self, command: hivo::Command<'_>) -> hivo::Result<()> {
        if command.kind() == CommandKind::DestroyWindow {
            let gate = self.gate.lock().unwrap().take();
            if let Some((entered, release)) = gate {
                entered.send(()).unwrap();
                release.recv().unwrap();
            }
        }
        self.inner.execute(command)
    }

    fn close(self: Box<Self>) -> hivo::Result<()> {
        self.inner.close()
    }
}

/// A window opened while the last one is being torn down gets a fresh
/// channel instead of losing it to the tear-down.
#[test]
fn open_during_last_teardown_reopens_the_channel() {
    setup_test();
    let driver = MockDriver::new();
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let gated = GatedDriver {
        inner: driver.clone(),
        gate: Arc::new(Mutex::new(Some((entered_tx, release_rx)))),
    };
    let registry = Arc::new(WindowRegistry::new(Arc::new(Channel::new(gated))));

    let first = WindowSession::open(registry.clone(), &sink_attr()).unwrap();
    driver.clear_events();

    let closing = thread::spawn(move || first.close());
    entered_rx.recv().unwrap();

    let opening = {
        let registry = registry.clone();
        thread::spawn(move || WindowSession::open(registry, &sink_attr()))
    };
    thread::sleep(Duration::from_millis(50));
    release_tx.send(()).unwrap();

    closing.join().unwrap().unwrap();
    let second = opening.join().unwrap().unwrap();

    assert_eq!(
        driver.events(),
        vec![
            Command(CommandKind::Reset),
            Command(CommandKind::DestroyWindow),
            Close,
            Open,
            Command(CommandKind::CreateWindow),
            Command(CommandKind::SetEnable),
        ]
    );
    assert!(registry.channel().is_open());
    assert!(registry.get_enable(second.handle()).unwrap());
    assert_eq!(registry.live_windows(), 1);
}
