//! Tests for click event parsing

use barsched::bar::{ClickEvent, ClickReader};

#[test]
fn test_click_stream_from_bar() {
    let mut reader = ClickReader::new();
    let mut input: &[u8] = b"[\n{\"name\":\"vol\",\"instance\":\"master\",\"button\":4,\"x\":1,\"y\":2,\"modifiers\":[]}\n,{\"name\":\"time\",\"button\":1}\n";
    reader.read_from(&mut input).unwrap();

    assert_eq!(
        reader.next_event(),
        Some(ClickEvent {
            name: Some("vol".into()),
            instance: Some("master".into()),
            button: 4,
            x: 1,
            y: 2,
        })
    );
    let second = reader.next_event().unwrap();
    assert_eq!(second.name.as_deref(), Some("time"));
    assert_eq!(second.instance, None);
    assert!(reader.next_event().is_none());
}

#[test]
fn test_partial_line_waits_for_newline() {
    let mut reader = ClickReader::new();
    reader.feed(b",{\"name\":\"a\",\"but");
    assert!(reader.next_event().is_none());
    reader.feed(b"ton\":2}");
    assert!(reader.next_event().is_none());
    reader.feed(b"\n");
    assert_eq!(reader.next_event().unwrap().button, 2);
    assert!(!reader.is_eof());
}
