// SPDX-FileCopyrightText: 2025 Contributors to the hivo project.
// SPDX-License-Identifier: Apache-2.0

//! Device channel tests against the simulated driver and a non-device path.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use hivo::mock::{DriverEvent, MockDriver};
use hivo::{Channel, Command, CommandKind, DeviceNodeDriver, Error, VoDriver, VoNode};
use nix::errno::Errno;

/// Ensures logging is initialized only once across all tests.
static LOG_ONCE: std::sync::Once = std::sync::Once::new();

fn setup_test() -> (Channel, MockDriver) {
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
    (Channel::new(driver.clone()), driver)
}

#[test]
fn open_is_idempotent() {
    let (channel, driver) = setup_test();

    channel.open().unwrap();
    channel.open().unwrap();

    assert!(channel.is_open());
    assert_eq!(driver.events(), vec![DriverEvent::Open]);
}

#[test]
fn close_twice_is_a_no_op() {
    let (channel, driver) = setup_test();
    channel.open().unwrap();

    channel.close().unwrap();
    channel.close().unwrap();

    assert!(!channel.is_open());
    assert_eq!(driver.events(), vec![DriverEvent::Open, DriverEvent::Close]);
}

#[test]
fn close_without_open_does_nothing() {
    let (channel, driver) = setup_test();

    channel.close().unwrap();

    assert!(driver.events().is_empty());
}

/// A closed channel refuses commands without touching the driver.
#[test]
fn submit_requires_an_open_channel() {
    let (channel, driver) = setup_test();
    let handle = 7;

    let err = channel.submit(Command::DestroyWindow(&handle)).unwrap_err();

    assert!(matches!(err, Error::NotInitialized));
    assert!(driver.events().is_empty());
}

#[test]
fn submit_after_close_fails() {
    let (channel, driver) = setup_test();
    channel.open().unwrap();
    channel.close().unwrap();
    driver.clear_events();

    let payload = hivo_sys::WinReset::default();
    let err = channel.submit(Command::Reset(&payload)).unwrap_err();

    assert!(matches!(err, Error::NotInitialized));
    assert!(driver.events().is_empty());
}

#[test]
fn driver_status_is_reported() {
    let (channel, driver) = setup_test();
    channel.open().unwrap();
    driver.fail_command(CommandKind::Reset, 0x8011_0005_u32 as i32);

    let payload = hivo_sys::WinReset::default();
    let err = channel.submit(Command::Reset(&payload)).unwrap_err();

    match err {
        Error::SubmitFailed { command, status } => {
            assert_eq!(command, CommandKind::Reset);
            assert_eq!(status as u32, 0x8011_0005);
        }
        other => panic!("unexpected error {other}"),
    }
}

/// The reply written by the driver ends up in the caller's payload.
#[test]
fn reply_is_left_in_the_payload() {
    let (channel, _driver) = setup_test();
    channel.open().unwrap();

    let mut create = hivo_sys::WinCreate {
        h_window: hivo_sys::HI_INVALID_HANDLE,
        ..Default::default()
    };
    channel.submit(Command::CreateWindow(&mut create)).unwrap();

    assert_ne!(create.h_window, hivo_sys::HI_INVALID_HANDLE);
}

#[test]
fn failed_close_still_closes() {
    let (channel, driver) = setup_test();
    channel.open().unwrap();
    driver.fail_close(Errno::EIO);

    assert!(matches!(channel.close(), Err(Error::CloseFailed(Errno::EIO))));
    assert!(!channel.is_open());
    channel.close().unwrap();
}

#[test]
fn open_failures_keep_the_channel_closed() {
    let (channel, driver) = setup_test();

    driver.remove_device();
    assert!(matches!(channel.open(), Err(Error::DeviceUnavailable(_))));

    driver.refuse_open(Errno::EACCES);
    assert!(matches!(channel.open(), Err(Error::OpenFailed(Errno::EACCES))));

    assert!(!channel.is_open());
    driver.restore_device();
    channel.open().unwrap();
}

#[test]
fn missing_device_node_is_unavailable() {
    let channel = Channel::new(DeviceNodeDriver::new("/nonexistent/hi_vo"));

    assert!(matches!(channel.open(), Err(Error::DeviceUnavailable(_))));
}

#[test]
fn regular_file_is_not_a_device() {
    let path = std::env::temp_dir().join(format!("hivo_not_a_device_{}", std::process::id()));
    std::fs::write(&path, b"").unwrap();
    let channel = Channel::new(DeviceNodeDriver::new(&path));

    let result = channel.open();
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(result, Err(Error::DeviceUnavailable(_))));
}

/// Commands from several threads are all delivered.
#[test]
fn concurrent_submissions_are_serialized() {
    let (channel, driver) = setup_test();
    let channel = Arc::new(channel);
    channel.open().unwrap();

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let channel = channel.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    let mut create = hivo_sys::WinCreate::default();
                    channel.submit(Command::CreateWindow(&mut create)).unwrap();
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    assert_eq!(driver.commands().len(), 200);
    assert_eq!(driver.window_count(), 200);
}

/// Driver that records how many commands it is running at once.
#[derive(Clone, Default)]
struct InFlightDriver {
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    executed: Arc<AtomicUsize>,
}

impl VoDriver for InFlightDriver {
    fn open(&self) -> hivo::Result<Box<dyn VoNode>> {
        Ok(Box::new(self.clone()))
    }
}

impl VoNode for InFlightDriver {
    fn execute(&mut self, _command: Command<'_>) -> hivo::Result<()> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        std::thread::sleep(Duration::from_micros(200));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.executed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(self: Box<Self>) -> hivo::Result<()> {
        Ok(())
    }
}

/// At most one command is inside the driver at any time.
#[test]
fn one_command_in_flight_at_a_time() {
    setup_test();
    let driver = InFlightDriver::default();
    let channel = Arc::new(Channel::new(driver.clone()));
    channel.open().unwrap();

    let threads: Vec<_> = (0..6)
        .map(|_| {
            let channel = channel.clone();
            std::thread::spawn(move || {
                for _ in 0..20 {
                    let enable = hivo_sys::WinEnable::default();
                    channel.submit(Command::SetEnable(&enable)).unwrap();
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    assert_eq!(driver.executed.load(Ordering::SeqCst), 120);
    assert_eq!(driver.peak.load(Ordering::SeqCst), 1);
}
