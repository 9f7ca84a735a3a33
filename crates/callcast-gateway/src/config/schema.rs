use std::collections::BTreeMap;

use serde::Deserialize;
use callcast_core::error::{CallcastError, Result};

/// Consumer -> ordered method patterns.
pub type AclConfig = BTreeMap<String, Vec<String>>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub acl: AclConfig,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(CallcastError::UnsupportedVersion);
        }
        if self.acl.is_empty() {
            return Err(CallcastError::Config("acl must not be empty".into()));
        }

        self.gateway.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Dispatcher intake queue depth. Submitters wait when it is full.
    #[serde(default = "default_intake_capacity")]
    pub intake_capacity: usize,

    /// Per-subscriber inbox depth. The dispatch loop waits when it is full.
    #[serde(default = "default_inbox_capacity")]
    pub inbox_capacity: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            intake_capacity: default_intake_capacity(),
            inbox_capacity: default_inbox_capacity(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=65536).contains(&self.intake_capacity) {
            return Err(CallcastError::Config(
                "gateway.intake_capacity must be between 1 and 65536".into(),
            ));
        }
        if !(1..=4096).contains(&self.inbox_capacity) {
            return Err(CallcastError::Config(
                "gateway.inbox_capacity must be between 1 and 4096".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "127.0.0.1:8082".into()
}
fn default_intake_capacity() -> usize {
    1024
}
fn default_inbox_capacity() -> usize {
    16
}
