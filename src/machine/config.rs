//! Per-instance configuration.

use serde::{Deserialize, Serialize};

/// Settings for one state machine instance.
///
/// Missing fields fall back to their defaults, so partial configs such as
/// `{"logging": true}` are accepted.
///
/// # Example
///
/// ```rust
/// use tickmind::machine::InstanceConfig;
///
/// let config = InstanceConfig::from_json(r#"{"logging": true}"#).unwrap();
/// assert!(config.logging);
/// assert!(config.label.is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceConfig {
    /// Emit a trace of noteworthy resolve passes through `tracing`
    pub logging: bool,
    /// Name used in traces instead of the instance id
    pub label: Option<String>,
}

impl InstanceConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_quiet_and_unlabelled() {
        let config = InstanceConfig::default();
        assert!(!config.logging);
        assert!(config.label.is_none());
    }

    #[test]
    fn empty_json_uses_defaults() {
        let config = InstanceConfig::from_json("{}").unwrap();
        assert_eq!(config, InstanceConfig::default());
    }

    #[test]
    fn fluent_setters_apply() {
        let config = InstanceConfig::default().logging(true).label("sheep-3");
        assert!(config.logging);
        assert_eq!(config.label.as_deref(), Some("sheep-3"));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(InstanceConfig::from_json(r#"{"logging": "yes"}"#).is_err());
    }
}
