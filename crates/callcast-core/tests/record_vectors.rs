//! Outbound record JSON shape tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use callcast_core::protocol::{CallEvent, LogRecord, StatInterval, StatSnapshot};

#[test]
fn log_record_fields() {
    let ev = CallEvent::new("Biz/Check", "consumer2").with_origin("10.0.0.2:4100");
    let rec = LogRecord::from_event(&ev, "127.0.0.1:9000");
    let v = serde_json::to_value(&rec).unwrap();

    assert_eq!(v["consumer"], "consumer2");
    assert_eq!(v["method"], "Biz/Check");
    // host is the receiving session's peer, not the caller's
    assert_eq!(v["host"], "127.0.0.1:9000");
    assert!(v["timestamp"].as_i64().unwrap() > 0);
}

#[test]
fn stat_snapshot_parse() {
    let s = r#"{
        "timestamp": 1700000000,
        "by_method": { "Biz/Check": 2, "Biz/Add": 1 },
        "by_consumer": { "biz_user": 3 }
    }"#;
    let snap: StatSnapshot = serde_json::from_str(s).unwrap();
    assert_eq!(snap.by_method.get("Biz/Check"), Some(&2));
    assert_eq!(snap.by_method.get("Biz/Add"), Some(&1));
    assert_eq!(snap.by_consumer.get("biz_user"), Some(&3));
}

#[test]
fn stat_snapshot_empty_maps_default() {
    let snap: StatSnapshot = serde_json::from_str(r#"{"timestamp": 5}"#).unwrap();
    assert!(snap.by_method.is_empty());
    assert!(snap.by_consumer.is_empty());
}

#[test]
fn stat_interval_rejects_unknown_fields() {
    let ok: StatInterval = serde_json::from_str(r#"{"interval_seconds": 2}"#).unwrap();
    assert_eq!(ok.interval_seconds, 2);

    let bad = serde_json::from_str::<StatInterval>(r#"{"interval": 2}"#);
    assert!(bad.is_err());
}
