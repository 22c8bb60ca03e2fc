//! Secure credential handling for external collaborators.
//!
//! One type-safe path for every API key in the runtime:
//!
//! - **No accidental logging**: credentials cannot appear in Debug output
//! - **Memory safety**: values are zeroed on drop
//! - **Explicit exposure**: `.expose()` at the point of use only
//!
//! ## Usage
//!
//! ```ignore
//! let cred = ApiCredential::from_env("GOOGLE_API_KEY", "Gemini API key")?;
//! request.header("x-goog-api-key", cred.expose());
//! ```

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use super::ProviderError;

/// Where a credential was loaded from.
///
/// Useful for debugging configuration issues without exposing the
/// credential value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from environment variable
    Environment,
    /// Provided programmatically
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A securely-stored API credential.
///
/// Debug shows `[REDACTED]`; the value is only reachable through
/// [`ApiCredential::expose`], called at the HTTP-header site and nowhere
/// else.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Create a credential from a string value.
    ///
    /// The value is immediately wrapped and cannot be accidentally
    /// logged after this point.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load a credential from an environment variable.
    ///
    /// # Arguments
    /// * `env_var` - Name of the environment variable
    /// * `name` - Human-readable name for error messages (e.g., "Gemini API key")
    pub fn from_env(env_var: &str, name: &'static str) -> Result<Self, ProviderError> {
        std::env::var(env_var)
            .map(|v| Self::new(v, CredentialSource::Environment, name))
            .map_err(|_| {
                ProviderError::NotConfigured(format!(
                    "{} not set: configure '{}' environment variable",
                    name, env_var
                ))
            })
    }

    /// Expose the credential value for use in an API call.
    ///
    /// # Security
    ///
    /// Only call this at the point where the credential is actually
    /// needed. Never store the exposed value.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// Check if the credential is empty.
    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    /// Where this credential came from.
    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_is_redacted() {
        let cred = ApiCredential::new("super-secret", CredentialSource::Programmatic, "test key");
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_expose_returns_value() {
        let cred = ApiCredential::new("k-123", CredentialSource::Programmatic, "test key");
        assert_eq!(cred.expose(), "k-123");
        assert!(!cred.is_empty());
    }

    #[test]
    fn test_empty_credential() {
        let cred = ApiCredential::new("", CredentialSource::Programmatic, "test key");
        assert!(cred.is_empty());
    }

    #[test]
    fn test_from_env_missing_is_not_configured() {
        let err = ApiCredential::from_env("CLAIMCHECK_TEST_ABSENT_VAR", "test key").unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn test_source_is_tracked() {
        let cred = ApiCredential::new("k", CredentialSource::Programmatic, "test key");
        assert_eq!(cred.source(), CredentialSource::Programmatic);
        assert_eq!(cred.source().to_string(), "programmatic");
    }
}
