use crate::errors::{CredentialError, XboxAuthError};

/// Supplies the Microsoft access token the Xbox Live exchange starts from
///
/// Implementations may refresh an expired token before returning it.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<String, CredentialError>;
}

/// Exchanges a Microsoft access token for an XSTS assertion
#[async_trait::async_trait]
pub trait XblExchange: Send + Sync {
    /// Request an XSTS token scoped to `relying_party`
    async fn exchange(
        &self,
        credential: &str,
        relying_party: &str,
    ) -> Result<XblAssertion, XboxAuthError>;
}

/// XSTS token together with the user hash it was issued for
#[derive(Clone, PartialEq, Eq)]
pub struct XblAssertion {
    pub user_hash: String,
    pub token: String,
}

impl XblAssertion {
    pub fn new(user_hash: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_hash: user_hash.into(),
            token: token.into(),
        }
    }

    /// `XBL3.0 x=<user-hash>;<token>`, the value PlayFab expects as `XboxToken`
    pub fn authorization_header(&self) -> String {
        format!("XBL3.0 x={};{}", self.user_hash, self.token)
    }
}

impl std::fmt::Debug for XblAssertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XblAssertion")
            .field("user_hash", &self.user_hash)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Token source returning a fixed access token
#[derive(Clone)]
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait::async_trait]
impl TokenSource for StaticTokenSource {
    async fn token(&self) -> Result<String, CredentialError> {
        if self.token.is_empty() {
            return Err(CredentialError::Unavailable("empty access token".to_string()));
        }
        Ok(self.token.clone())
    }
}

/// Exchange returning a fixed assertion
#[derive(Debug, Clone)]
pub struct StaticXblExchange {
    assertion: XblAssertion,
}

impl StaticXblExchange {
    pub fn new(assertion: XblAssertion) -> Self {
        Self { assertion }
    }
}

#[async_trait::async_trait]
impl XblExchange for StaticXblExchange {
    async fn exchange(
        &self,
        _credential: &str,
        _relying_party: &str,
    ) -> Result<XblAssertion, XboxAuthError> {
        Ok(self.assertion.clone())
    }
}
