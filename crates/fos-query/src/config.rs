//! Registry configuration

use serde::Deserialize;

/// What `register` leaves behind when one binding in a multi-node or
/// multi-type call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchPolicy {
    /// Validate every binding first; a failing call binds nothing
    #[default]
    Atomic,
    /// Stop at the first failure; earlier bindings from the call stay active
    Partial,
}

/// Registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub batch_policy: BatchPolicy,
    /// On an `unregister` miss, still ask the host to remove the
    /// caller-supplied listener (covers listeners bound outside the registry)
    pub native_removal_fallback: bool,
    /// Keep the flat list of every registration made
    pub audit_log: bool,
    /// Plugin name recorded on every registration
    pub plugin: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            batch_policy: BatchPolicy::Atomic,
            native_removal_fallback: true,
            audit_log: true,
            plugin: None,
        }
    }
}

impl RegistryConfig {
    pub fn batch_policy(mut self, policy: BatchPolicy) -> Self {
        self.batch_policy = policy;
        self
    }

    pub fn native_removal_fallback(mut self, enabled: bool) -> Self {
        self.native_removal_fallback = enabled;
        self
    }

    pub fn audit_log(mut self, enabled: bool) -> Self {
        self.audit_log = enabled;
        self
    }

    pub fn plugin(mut self, name: &str) -> Self {
        self.plugin = Some(name.to_string());
        self
    }
}
