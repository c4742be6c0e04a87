//! Tests for builder modules

use barsched::builders::build_bar_with;
use barsched::config::BarConfig;
use barsched::core::{BarDriver, Interval, SchedError, Stream};

#[test]
fn test_build_bar_from_config() {
    let cfg = BarConfig::from_json_str(
        r#"{"blocks":[
            {"name":"time","command":"date","interval":5},
            {"name":"log","command":"cat","interval":"persist"}
        ]}"#,
    )
    .unwrap();
    let bar = build_bar_with(&cfg, Vec::new(), std::io::empty()).unwrap();
    assert_eq!(bar.block_count(), 2);
    assert_eq!(bar.interval(0), Interval::Every(5));
    assert_eq!(bar.interval(1), Interval::Persist);
    // Nothing runs until the scheduler starts.
    assert!(bar.stream_fd(1, Stream::Stdout).is_none());
    assert_eq!(bar.renderer().lines(), 0);
}

#[test]
fn test_build_bar_rejects_invalid_block() {
    let mut cfg = BarConfig::from_json_str(r#"{"blocks":[{"name":"a"}]}"#).unwrap();
    cfg.blocks[0].signal = Some(1);
    let err = build_bar_with(&cfg, Vec::new(), std::io::empty()).unwrap_err();
    assert!(matches!(err, SchedError::Config(_)));
}

#[test]
fn test_out_of_range_block_queries() {
    let cfg = BarConfig::default();
    let bar = build_bar_with(&cfg, Vec::new(), std::io::empty()).unwrap();
    assert_eq!(bar.interval(3), Interval::Never);
    assert!(bar.stream_fd(3, Stream::Stderr).is_none());
}
