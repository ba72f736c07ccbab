use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::EntityKey;

/// Authenticated PlayFab session produced by the login handshake
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// PlayFab ID from the login response
    pub player_id: String,
    /// Entity token from the entity token exchange
    pub entity_token: String,
    pub token_expiration: Option<DateTime<Utc>>,
    pub entity: EntityKey,
}

impl Session {
    /// Whether the entity token's expiration has passed
    ///
    /// Nothing refreshes the token; a caller seeing this must log in again.
    pub fn is_expired(&self) -> bool {
        self.token_expiration.is_some_and(|at| Utc::now() >= at)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("player_id", &self.player_id)
            .field("entity_token", &"<redacted>")
            .field("token_expiration", &self.token_expiration)
            .field("entity", &self.entity)
            .finish()
    }
}

/// Microsoft OAuth tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MsTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl MsTokens {
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: u64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(expires_in as i64);
        Self {
            access_token,
            refresh_token,
            expires_at,
        }
    }

    /// Tokens known only by their refresh token; the first use refreshes them
    pub fn from_refresh_token(refresh_token: String) -> Self {
        Self {
            access_token: String::new(),
            refresh_token: Some(refresh_token),
            expires_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    pub fn is_expired(&self) -> bool {
        use crate::config::TOKEN_EXPIRY_SKEW;
        let skew_duration = chrono::Duration::from_std(TOKEN_EXPIRY_SKEW)
            .unwrap_or(chrono::Duration::seconds(300));
        self.access_token.is_empty() || Utc::now() + skew_duration >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_tokens_expiry_skew() {
        assert!(!MsTokens::new("a".to_string(), None, 3600).is_expired());
        // Inside the five minute skew.
        assert!(MsTokens::new("a".to_string(), None, 60).is_expired());
        assert!(MsTokens::from_refresh_token("r".to_string()).is_expired());
    }

    #[test]
    fn test_session_expiry() {
        let mut session = Session {
            player_id: "P1".to_string(),
            entity_token: "T2".to_string(),
            token_expiration: None,
            entity: EntityKey::default(),
        };
        assert!(!session.is_expired());

        session.token_expiration = Some(Utc::now() - chrono::Duration::seconds(1));
        assert!(session.is_expired());
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session {
            player_id: "P1".to_string(),
            entity_token: "very-secret".to_string(),
            token_expiration: None,
            entity: EntityKey::default(),
        };
        assert!(!format!("{:?}", session).contains("very-secret"));
    }
}
