use std::collections::HashMap;

use callcast_core::error::{CallcastError, Result};

use crate::config::schema::AclConfig;

use super::acl::{compile_patterns, first_match, MethodPattern};

/// Why a call was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    UnknownConsumer,
    NoMatchingPattern,
}

impl DenyReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DenyReason::UnknownConsumer => "unknown_consumer",
            DenyReason::NoMatchingPattern => "no_matching_pattern",
        }
    }
}

/// Decision from policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny(DenyReason),
}

/// Per-consumer method allow-list.
/// Construct once at startup, then share via Arc (read-only, no lock).
#[derive(Debug, Default)]
pub struct AccessPolicy {
    rules: HashMap<String, Vec<MethodPattern>>,
}

impl AccessPolicy {
    pub fn new(acl: &AclConfig) -> Result<Self> {
        let mut rules = HashMap::with_capacity(acl.len());
        for (consumer, raw) in acl {
            if consumer.is_empty() {
                return Err(CallcastError::Config("acl consumer name must not be empty".into()));
            }
            let compiled = compile_patterns(raw).map_err(|e| {
                CallcastError::Config(format!("acl compile failed (consumer={consumer}): {e}"))
            })?;
            rules.insert(consumer.clone(), compiled);
        }
        Ok(Self { rules })
    }

    /// Parse the JSON form: `{"consumer": ["Service/Method", "Service/*"]}`.
    pub fn from_json(s: &str) -> Result<Self> {
        let acl: AclConfig = serde_json::from_str(s)
            .map_err(|e| CallcastError::Config(format!("invalid acl json: {e}")))?;
        Self::new(&acl)
    }

    pub fn authorize(&self, consumer: &str, method: &str) -> bool {
        self.decide(consumer, method) == PolicyDecision::Allow
    }

    pub fn decide(&self, consumer: &str, method: &str) -> PolicyDecision {
        let Some(rules) = self.rules.get(consumer) else {
            return PolicyDecision::Deny(DenyReason::UnknownConsumer);
        };
        match first_match(rules, method) {
            Some(_) => PolicyDecision::Allow,
            None => PolicyDecision::Deny(DenyReason::NoMatchingPattern),
        }
    }

    pub fn consumers(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACL: &str = r#"{
        "logger": ["Admin/Logging"],
        "stat": ["Admin/Statistics"],
        "biz_user": ["Biz/Check", "Biz/Add"],
        "biz_admin": ["Biz/*"],
        "after_admin": ["Admin/*", "Biz/*"],
        "nobody": []
    }"#;

    #[test]
    fn unknown_consumer_denied() {
        let p = AccessPolicy::from_json(ACL).unwrap();
        assert_eq!(
            p.decide("stranger", "Biz/Check"),
            PolicyDecision::Deny(DenyReason::UnknownConsumer)
        );
        assert!(!p.authorize("nobody", "Biz/Check"));
    }

    #[test]
    fn exact_and_wildcard_entries() {
        let p = AccessPolicy::from_json(ACL).unwrap();
        assert!(p.authorize("biz_user", "Biz/Check"));
        assert!(p.authorize("biz_user", "Biz/Add"));
        assert!(!p.authorize("biz_user", "Biz/Test"));

        assert!(p.authorize("biz_admin", "Biz/Test"));
        assert!(!p.authorize("biz_admin", "Biz/Test/Extra"));
        assert!(!p.authorize("biz_admin", "Admin/Logging"));

        assert!(p.authorize("after_admin", "Admin/Statistics"));
        assert!(p.authorize("after_admin", "Biz/Add"));
    }

    #[test]
    fn authorize_is_deterministic() {
        let p = AccessPolicy::from_json(ACL).unwrap();
        for (c, m) in [("logger", "Admin/Logging"), ("logger", "Biz/Check"), ("x", "y")] {
            assert_eq!(p.authorize(c, m), p.authorize(c, m));
        }
    }

    #[test]
    fn malformed_acl_is_config_error() {
        let err = AccessPolicy::from_json(r#"{"a": "Biz/*"}"#).unwrap_err();
        assert_eq!(err.client_code().as_str(), "CONFIG");

        let err = AccessPolicy::from_json(r#"{"a": ["Biz/Ch*"]}"#).unwrap_err();
        assert_eq!(err.client_code().as_str(), "CONFIG");
    }
}
