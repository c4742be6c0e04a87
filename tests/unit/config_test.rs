//! Tests for configuration validation

use barsched::config::{BarConfig, BlockConfig};
use barsched::core::{Interval, RtRange};

fn rt() -> RtRange {
    RtRange::new(34, 64)
}

fn block(name: &str, command: Option<&str>, interval: Interval) -> BlockConfig {
    BlockConfig {
        name: name.to_string(),
        command: command.map(str::to_string),
        interval,
        ..BlockConfig::default()
    }
}

#[test]
fn test_block_config_validation() {
    let valid = block("time", Some("date"), Interval::Every(1));
    assert!(valid.validate(rt()).is_ok());

    let static_text = block("label", None, Interval::Never);
    assert!(static_text.validate(rt()).is_ok());
}

#[test]
fn test_block_config_empty_name() {
    let invalid = block("  ", Some("date"), Interval::Every(1));
    assert!(invalid.validate(rt()).is_err());
}

#[test]
fn test_block_config_interval_needs_command() {
    for interval in [Interval::Once, Interval::Persist, Interval::Every(3)] {
        let invalid = block("x", None, interval);
        assert!(invalid.validate(rt()).is_err(), "{interval} accepted without command");
    }
    let blank = block("x", Some("   "), Interval::Once);
    assert!(blank.validate(rt()).is_err());
}

#[test]
fn test_block_config_signal_range() {
    let mut cfg = block("vol", Some("amixer"), Interval::Never);

    cfg.signal = Some(0);
    assert!(cfg.validate(rt()).is_err());

    cfg.signal = Some(1);
    assert!(cfg.validate(rt()).is_ok());

    cfg.signal = Some(30);
    assert!(cfg.validate(rt()).is_ok());

    cfg.signal = Some(31);
    assert!(cfg.validate(rt()).is_err());

    cfg.command = None;
    cfg.signal = Some(1);
    assert!(cfg.validate(rt()).is_err());
}

#[test]
fn test_bar_config_from_json() {
    let json = r#"{
        "click_events": false,
        "blocks": [
            { "name": "time", "command": "date +%T", "interval": 1 },
            { "name": "log", "command": "tail -F log", "interval": "persist" },
            { "name": "vol", "command": "amixer get Master", "signal": 10, "label": "VOL " },
            { "name": "host", "command": "hostname", "interval": "once" },
            { "name": "off", "interval": 0 }
        ]
    }"#;
    let cfg = BarConfig::from_json_str(json).unwrap();
    assert!(!cfg.scheduler.click_events);
    let intervals: Vec<Interval> = cfg.intervals().collect();
    assert_eq!(
        intervals,
        vec![
            Interval::Every(1),
            Interval::Persist,
            Interval::Never,
            Interval::Once,
            Interval::Never
        ]
    );
    assert_eq!(cfg.blocks[2].signal, Some(10));
    assert_eq!(cfg.blocks[2].label.as_deref(), Some("VOL "));
}

#[test]
fn test_bar_config_defaults() {
    let cfg = BarConfig::from_json_str(r#"{"blocks":[{"name":"a"}]}"#).unwrap();
    assert!(cfg.scheduler.click_events);
    assert_eq!(cfg.blocks[0].interval, Interval::Never);
}

#[test]
fn test_bar_config_rejects_bad_interval_keyword() {
    let err = BarConfig::from_json_str(r#"{"blocks":[{"name":"a","interval":"sometimes"}]}"#)
        .unwrap_err();
    assert!(err.starts_with("parse error"), "{err}");
}

#[test]
fn test_bar_config_reports_block_index() {
    let err = BarConfig::from_json_str(
        r#"{"blocks":[{"name":"ok"},{"name":"bad","interval":"once"}]}"#,
    )
    .unwrap_err();
    assert!(err.contains("block #1 `bad`"), "{err}");
}

#[test]
fn test_interval_keywords_serialize_back() {
    let cfg = BarConfig::from_json_str(
        r#"{"blocks":[{"name":"p","command":"x","interval":"persist"},{"name":"e","command":"x","interval":5}]}"#,
    )
    .unwrap();
    let json = serde_json::to_value(&cfg).unwrap();
    assert_eq!(json["blocks"][0]["interval"], "persist");
    assert_eq!(json["blocks"][1]["interval"], 5);
}
