//! Tests for signal translation

use barsched::core::{signal_name, RtRange, SchedEvent, SignalRecord};

#[test]
fn test_every_platform_rt_signal_targets_an_offset() {
    let rt = RtRange::platform();
    let offsets: Vec<u32> = rt
        .block_signals()
        .map(|signo| match SchedEvent::from_signo(signo, rt) {
            SchedEvent::BlockSignaled(k) => k,
            other => panic!("signal {signo} translated to {other:?}"),
        })
        .collect();
    let expected: Vec<u32> = (1..=rt.max_offset()).collect();
    assert_eq!(offsets, expected);
}

#[test]
fn test_record_translation_ignores_sender() {
    let rt = RtRange::new(34, 64);
    let from_shell = SignalRecord { signo: 44, pid: 1234 };
    let from_kernel = SignalRecord { signo: 44, pid: 0 };
    assert_eq!(SchedEvent::from_record(from_shell, rt), SchedEvent::BlockSignaled(10));
    assert_eq!(
        SchedEvent::from_record(from_shell, rt),
        SchedEvent::from_record(from_kernel, rt)
    );
}

#[test]
fn test_unnamed_signal() {
    assert_eq!(signal_name(1000), "signal 1000");
    assert_eq!(signal_name(libc::SIGCHLD), "SIGCHLD");
}
