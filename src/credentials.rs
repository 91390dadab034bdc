use crate::error::{AssistantError, Result};
use std::fmt;
use strum::Display;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum KeySource {
    #[strum(serialize = "personal key")]
    Manual,
    #[strum(serialize = "system key")]
    Stored,
}

/// Credential for the generation service. The manual override always wins
/// over the stored default.
#[derive(Clone)]
pub struct ApiKey {
    value: String,
    source: KeySource,
}

impl ApiKey {
    pub fn resolve(manual: Option<&str>, stored: Option<&str>) -> Result<Self> {
        let (raw, source) = match (non_blank(manual), non_blank(stored)) {
            (Some(key), _) => (key, KeySource::Manual),
            (None, Some(key)) => (key, KeySource::Stored),
            (None, None) => return Err(AssistantError::MissingCredential),
        };

        let value = raw.trim();
        if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(AssistantError::MalformedCredential);
        }

        Ok(Self {
            value: value.to_string(),
            source,
        })
    }

    pub fn from_env(manual: Option<&str>) -> Result<Self> {
        let stored = std::env::var(API_KEY_VAR).ok();
        Self::resolve(manual, stored.as_deref())
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    pub fn expose(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("value", &"***")
            .field("source", &self.source)
            .finish()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_key_wins() {
        let key = ApiKey::resolve(Some("manual-key"), Some("stored-key")).unwrap();
        assert_eq!(key.expose(), "manual-key");
        assert_eq!(key.source(), KeySource::Manual);
    }

    #[test]
    fn test_blank_manual_falls_back_to_stored() {
        let key = ApiKey::resolve(Some("   "), Some("stored-key")).unwrap();
        assert_eq!(key.expose(), "stored-key");
        assert_eq!(key.source(), KeySource::Stored);
    }

    #[test]
    fn test_missing_key() {
        let result = ApiKey::resolve(None, Some(""));
        assert!(matches!(result, Err(AssistantError::MissingCredential)));
    }

    #[test]
    fn test_malformed_key() {
        let result = ApiKey::resolve(Some("abc def"), None);
        assert!(matches!(result, Err(AssistantError::MalformedCredential)));
    }

    #[test]
    fn test_debug_hides_value() {
        let key = ApiKey::resolve(Some("secret-value"), None).unwrap();
        assert!(!format!("{key:?}").contains("secret-value"));
    }
}
