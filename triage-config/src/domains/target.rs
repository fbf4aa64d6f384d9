//! Target application configuration

use crate::error::ConfigResult;
use crate::validation::{validate_http_url, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};

/// The HTTP application under test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL every task path is joined onto
    #[serde(default = "default_host")]
    pub host: String,

    /// Human readable name used in run banners
    #[serde(default = "default_name")]
    pub name: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            name: default_name(),
        }
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_http_url(&self.host, "host", self.domain_name())?;
        validate_required_string(&self.name, "name", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}

fn default_host() -> String {
    "http://localhost:8888".to_string()
}

fn default_name() -> String {
    "Hospital Management Application".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_defaults() {
        let target = TargetConfig::default();
        assert_eq!(target.host, "http://localhost:8888");
        assert!(target.validate().is_ok());
    }

    #[test]
    fn test_target_validation() {
        let mut target = TargetConfig::default();
        target.host = "localhost:8888".to_string();
        assert!(target.validate().is_err());

        target = TargetConfig::default();
        target.name = "  ".to_string();
        assert!(target.validate().is_err());
    }
}
