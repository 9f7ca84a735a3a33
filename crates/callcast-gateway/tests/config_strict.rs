#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use callcast_gateway::{app_state::AppState, config};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
gateway:
  listen: "127.0.0.1:8082"
  inbox_capacty: 4 # typo should fail
acl:
  logger: ["Admin/Logging"]
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
acl:
  biz_admin: ["Biz/*"]
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.acl["biz_admin"], vec!["Biz/*".to_string()]);
    assert_eq!(cfg.gateway.inbox_capacity, 16);
    assert_eq!(cfg.gateway.intake_capacity, 1024);
}

#[test]
fn acl_pattern_order_is_kept() {
    let ok = r#"
version: 1
acl:
  after_admin: ["Admin/*", "Biz/*", "Biz/Check"]
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.acl["after_admin"], vec!["Admin/*", "Biz/*", "Biz/Check"]);
}

#[test]
fn wrong_version_and_empty_acl_rejected() {
    let err = config::load_from_str("version: 2\nacl:\n  a: [\"Biz/*\"]\n").unwrap_err();
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");

    let err = config::load_from_str("version: 1\n").unwrap_err();
    assert_eq!(err.client_code().as_str(), "CONFIG");
}

#[test]
fn capacity_bounds_checked() {
    let bad = r#"
version: 1
gateway:
  intake_capacity: 0
acl:
  a: ["Biz/*"]
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[tokio::test]
async fn malformed_acl_pattern_fails_startup() {
    let cfg = config::load_from_str(
        r#"
version: 1
acl:
  biz_user: ["Biz/Ch*"]
"#,
    )
    .expect("yaml itself is valid");

    let err = AppState::new(cfg).err().expect("must fail");
    assert_eq!(err.client_code().as_str(), "CONFIG");
}
