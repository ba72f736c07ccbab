use thiserror::Error;

/// Boxed error returned by custom transports
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// PlayFab client error types
#[derive(Error, Debug)]
pub enum PlayFabError {
    #[error("Token source failed: {0}")]
    Credential(#[from] CredentialError),

    #[error("Xbox Live token exchange failed: {0}")]
    PlatformExchange(#[from] XboxAuthError),

    #[error("Failed to encode request body: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[source] BoxError),

    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Unexpected response shape: {0}")]
    Shape(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

impl PlayFabError {
    /// Wrap any transport failure
    pub fn network(err: impl Into<BoxError>) -> Self {
        Self::Network(err.into())
    }
}

impl From<reqwest::Error> for PlayFabError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(Box::new(err))
    }
}

/// Failures of a [`crate::TokenSource`]
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("No credential available: {0}")]
    Unavailable(String),

    #[error("Missing refresh token - cannot refresh credential")]
    MissingRefreshToken,

    #[error("OAuth invalid_grant - refresh token may be expired")]
    InvalidGrant,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error {status}: {body_snippet}")]
    Http {
        status: reqwest::StatusCode,
        body_snippet: String,
    },
}

/// Failures of a [`crate::XblExchange`]
#[derive(Error, Debug)]
pub enum XboxAuthError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error {status}: {body_snippet}")]
    Http {
        status: reqwest::StatusCode,
        body_snippet: String,
    },

    #[error("Xbox Live authentication failed after retry")]
    BadRequest,

    #[error("XSTS authorization denied: {0}")]
    XstsDenied(#[from] XstsError),

    #[error("Missing XUI claims in Xbox Live response")]
    MissingClaims,
}

/// XSTS-specific error codes from XErr field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XstsError {
    #[error("Account doesn't have an Xbox account (XErr: 2148916233)")]
    NoXboxAccount,

    #[error("Xbox Live not available in this country (XErr: 2148916235)")]
    RegionNotSupported,

    #[error("Adult verification required on Xbox page (XErr: 2148916236/2148916237)")]
    AdultVerificationRequired,

    #[error("Child account requires Family (XErr: 2148916238)")]
    ChildAccountRequiresFamily,

    #[error("Unknown XSTS error code: {0}")]
    Unknown(u64),
}

impl XstsError {
    /// Parse XErr code from XSTS response
    pub fn from_xerr(code: u64) -> Self {
        match code {
            2148916233 => Self::NoXboxAccount,
            2148916235 => Self::RegionNotSupported,
            2148916236 | 2148916237 => Self::AdultVerificationRequired,
            2148916238 => Self::ChildAccountRequiresFamily,
            code => Self::Unknown(code),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlayFabError>;
