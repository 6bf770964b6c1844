//! Credential port.
//!
//! The bearer token is issued by the login flow elsewhere; this crate only
//! reads it.

/// Source of the opaque bearer token used to authenticate.
pub trait CredentialSource: Send + Sync {
    /// The current token, or `None` when no one is logged in.
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed token, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential {
    token: Option<String>,
}

impl StaticCredential {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A source that never has a token.
    #[must_use]
    pub const fn missing() -> Self {
        Self { token: None }
    }
}

impl CredentialSource for StaticCredential {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// Reads the token from an environment variable on every call.
///
/// Empty or whitespace-only values count as absent.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    #[must_use]
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl CredentialSource for EnvCredential {
    fn bearer_token(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_credential_returns_token() {
        assert_eq!(
            StaticCredential::new("abc").bearer_token().as_deref(),
            Some("abc")
        );
        assert_eq!(StaticCredential::missing().bearer_token(), None);
    }

    #[test]
    fn env_credential_treats_blank_as_missing() {
        let var = "RESOURCEHUB_TEST_TOKEN_BLANK";
        std::env::set_var(var, "   ");
        assert_eq!(EnvCredential::new(var).bearer_token(), None);
        std::env::remove_var(var);
    }

    #[test]
    fn env_credential_reads_latest_value() {
        let var = "RESOURCEHUB_TEST_TOKEN_LATEST";
        let source = EnvCredential::new(var);
        std::env::remove_var(var);
        assert_eq!(source.bearer_token(), None);

        std::env::set_var(var, "issued-after-login");
        assert_eq!(source.bearer_token().as_deref(), Some("issued-after-login"));
        std::env::remove_var(var);
    }
}
