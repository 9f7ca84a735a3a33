//! ACL pattern compilation and matching.
//!
//! Patterns are either an exact method name (`Biz/Check`) or a `/`-delimited
//! pattern where `*` stands for exactly one whole segment (`Biz/*`).

use callcast_core::error::{CallcastError, Result};

/// One `/`-delimited pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Any,
}

/// Compiled ACL pattern.
#[derive(Debug, Clone)]
pub struct MethodPattern {
    pub raw: String,
    segments: Option<Vec<Segment>>, // None => exact match only
}

impl MethodPattern {
    pub fn is_wildcard(&self) -> bool {
        self.segments.is_some()
    }

    pub fn matches(&self, method: &str) -> bool {
        if self.raw == method {
            return true;
        }
        let Some(segments) = &self.segments else {
            return false;
        };

        // segment-count mismatch never matches, not even as a prefix
        let given: Vec<&str> = method.split('/').collect();
        if given.len() != segments.len() {
            return false;
        }
        segments.iter().zip(given).all(|(seg, g)| match seg {
            Segment::Any => true,
            Segment::Literal(s) => s == g,
        })
    }
}

pub fn compile_pattern(raw: &str) -> Result<MethodPattern> {
    if raw.is_empty() {
        return Err(CallcastError::Config("empty acl pattern".into()));
    }
    if !raw.contains('*') {
        return Ok(MethodPattern { raw: raw.to_string(), segments: None });
    }

    let mut segments = Vec::new();
    for seg in raw.split('/') {
        if seg == "*" {
            segments.push(Segment::Any);
        } else if seg.contains('*') {
            return Err(CallcastError::Config(format!(
                "invalid acl pattern: {raw} (`*` must occupy a whole segment)"
            )));
        } else {
            segments.push(Segment::Literal(seg.to_string()));
        }
    }
    Ok(MethodPattern { raw: raw.to_string(), segments: Some(segments) })
}

pub fn compile_patterns(raw: &[String]) -> Result<Vec<MethodPattern>> {
    raw.iter().map(|s| compile_pattern(s)).collect()
}

/// First pattern (in registration order) that matches `method`.
pub fn first_match<'a>(rules: &'a [MethodPattern], method: &str) -> Option<&'a MethodPattern> {
    rules.iter().find(|r| r.matches(method))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pat(s: &str) -> MethodPattern {
        compile_pattern(s).unwrap()
    }

    #[test]
    fn wildcard_matches_single_segment() {
        let p = pat("Biz/*");
        assert!(p.is_wildcard());
        assert!(p.matches("Biz/Check"));
        assert!(p.matches("Biz/Add"));
        assert!(!p.matches("Biz/Check/Extra"));
        assert!(!p.matches("Admin/Check"));
        assert!(!p.matches("Biz"));
    }

    #[test]
    fn exact_pattern() {
        let p = pat("Biz/Check");
        assert!(!p.is_wildcard());
        assert!(p.matches("Biz/Check"));
        assert!(!p.matches("Biz/Add"));
        assert!(!p.matches("Biz/Check/"));
    }

    #[test]
    fn leading_wildcard_segment() {
        let p = pat("*/Check");
        assert!(p.matches("Biz/Check"));
        assert!(p.matches("Admin/Check"));
        assert!(!p.matches("Biz/Add"));
    }

    #[test]
    fn rejects_partial_segment_wildcard() {
        assert!(compile_pattern("Biz/Ch*").is_err());
        assert!(compile_pattern("").is_err());
    }

    #[test]
    fn later_pattern_still_considered_after_count_mismatch() {
        let rules = compile_patterns(&["Admin/*/Deep".into(), "Biz/Check".into()]).unwrap();
        let hit = first_match(&rules, "Biz/Check").unwrap();
        assert_eq!(hit.raw, "Biz/Check");
        assert!(first_match(&rules, "Biz/Add").is_none());
    }
}
