//! Engage client configuration.

use std::fmt;
use std::time::Duration;

/// Report comment service of the Cambridge School portal.
pub const DEFAULT_BASE_URL: &str =
    "https://cambridgeschoolportal.engagehosted.com/Services/ReportCommentServices.asmx";

/// Connection settings for [`crate::EngageClient`].
#[derive(Clone)]
pub struct EngageConfig {
    /// Base URL the endpoint names are appended to.
    pub base_url: String,
    /// Static bearer credential sent with every call.
    pub token: String,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl EngageConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for EngageConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: String::new(),
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl fmt::Debug for EngageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngageConfig")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let config = EngageConfig::new("secret-cookie");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-cookie"));
        assert!(debug.contains("REDACTED"));
    }
}
