//! Tests for error types

use barsched::core::SchedError;
use nix::errno::Errno;

#[test]
fn test_short_read_error() {
    let err = SchedError::ShortRead;
    assert_eq!(format!("{}", err), "short read from signal descriptor");
}

#[test]
fn test_empty_wait_error() {
    let err = SchedError::EmptyWait;
    assert_eq!(
        format!("{}", err),
        "should not happen: poll returned 0 ready descriptors"
    );
    assert!(!err.is_startup());
}

#[test]
fn test_signal_set_error() {
    let err = SchedError::SignalSet {
        signo: 99,
        source: Errno::EINVAL,
    };
    assert!(format!("{}", err).starts_with("sigaddset(99) failed: "));
    assert!(err.is_startup());
}

#[test]
fn test_wait_error_keeps_source() {
    use std::error::Error;

    let err = SchedError::Wait(Errno::EBADF);
    assert!(format!("{}", err).starts_with("poll failed: "));
    let source = err.source().unwrap();
    assert_eq!(source.downcast_ref::<Errno>(), Some(&Errno::EBADF));
}

#[test]
fn test_timer_error() {
    let err = SchedError::Timer {
        period: 5,
        source: Errno::EAGAIN,
    };
    assert!(format!("{}", err).starts_with("failed to arm 5s timer: "));
}

#[test]
fn test_config_error_into_anyhow() {
    let err: anyhow::Error = SchedError::Config("block #0 `x` invalid".into()).into();
    assert_eq!(err.to_string(), "config invalid: block #0 `x` invalid");
}
