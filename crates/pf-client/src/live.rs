//! Microsoft and Xbox Live collaborators backed by `reqwest`

use reqwest::{Client, StatusCode};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::config::{HttpTimeouts, XboxEndpoints, official};
use crate::errors::{CredentialError, XboxAuthError, XstsError};
use crate::models::{
    MsTokenResponse, XblAuthProperties, XblAuthRequest, XblTokenResponse, XstsAuthProperties,
    XstsAuthRequest, XstsErrorResponse,
};
use crate::session::MsTokens;
use crate::token::{TokenSource, XblAssertion, XblExchange};

fn build_http(timeouts: &HttpTimeouts) -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.request)
        .build()
}

fn body_snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

/// Token source that refreshes Microsoft tokens with the official launcher's client ID
#[derive(Debug)]
pub struct LiveTokenSource {
    http: Client,
    token_url: String,
    tokens: Mutex<MsTokens>,
}

impl LiveTokenSource {
    pub fn new(tokens: MsTokens, timeouts: &HttpTimeouts) -> Result<Self, CredentialError> {
        Ok(Self::with_client(build_http(timeouts)?, tokens, &XboxEndpoints::default()))
    }

    pub fn with_client(http: Client, tokens: MsTokens, endpoints: &XboxEndpoints) -> Self {
        Self {
            http,
            token_url: endpoints.ms_token.clone(),
            tokens: Mutex::new(tokens),
        }
    }

    /// Current tokens, e.g. to persist the rotated refresh token
    pub async fn tokens(&self) -> MsTokens {
        self.tokens.lock().await.clone()
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> Result<MsTokens, CredentialError> {
        debug!("Refreshing Microsoft access token");
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", official::CLIENT_ID),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
                ("scope", official::SCOPE),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if body.contains("invalid_grant") {
                return Err(CredentialError::InvalidGrant);
            }

            return Err(CredentialError::Http {
                status,
                body_snippet: body_snippet(&body),
            });
        }

        let token_response: MsTokenResponse = response.json().await?;
        Ok(MsTokens::new(
            token_response.access_token,
            // Keep the old refresh token if none was rotated in.
            token_response
                .refresh_token
                .or_else(|| Some(refresh_token.to_string())),
            token_response.expires_in,
        ))
    }
}

#[async_trait::async_trait]
impl TokenSource for LiveTokenSource {
    async fn token(&self) -> Result<String, CredentialError> {
        let mut tokens = self.tokens.lock().await;
        if !tokens.is_expired() {
            return Ok(tokens.access_token.clone());
        }

        let refresh_token = tokens
            .refresh_token
            .clone()
            .ok_or(CredentialError::MissingRefreshToken)?;
        *tokens = self.refresh(&refresh_token).await?;
        Ok(tokens.access_token.clone())
    }
}

/// Xbox Live user authentication followed by XSTS authorization
#[derive(Debug, Clone)]
pub struct XboxLiveExchange {
    http: Client,
    endpoints: XboxEndpoints,
}

impl XboxLiveExchange {
    pub fn new(timeouts: &HttpTimeouts) -> Result<Self, XboxAuthError> {
        Ok(Self::with_client(build_http(timeouts)?, XboxEndpoints::default()))
    }

    pub fn with_client(http: Client, endpoints: XboxEndpoints) -> Self {
        Self { http, endpoints }
    }

    fn xbl_request(rps_ticket: String) -> XblAuthRequest {
        XblAuthRequest {
            properties: XblAuthProperties {
                auth_method: "RPS".to_string(),
                site_name: "user.auth.xboxlive.com".to_string(),
                rps_ticket,
            },
            relying_party: "http://auth.xboxlive.com".to_string(),
            token_type: "JWT".to_string(),
        }
    }

    async fn post_xbl(&self, request: &XblAuthRequest) -> reqwest::Result<reqwest::Response> {
        self.http
            .post(&self.endpoints.xbl_authenticate)
            .header("Accept", "application/json")
            .header("x-xbl-contract-version", "1")
            .json(request)
            .send()
            .await
    }

    /// Authenticate with Xbox Live, returning the user token
    #[instrument(skip_all)]
    pub async fn xbl_authenticate(&self, ms_access_token: &str) -> Result<String, XboxAuthError> {
        debug!("Authenticating with Xbox Live");
        let mut response = self
            .post_xbl(&Self::xbl_request(ms_access_token.to_string()))
            .await?;

        // Some tokens are only accepted with the "d=" prefix.
        if response.status() == StatusCode::BAD_REQUEST {
            warn!("XBL authentication failed, retrying with 'd=' prefix");
            response = self
                .post_xbl(&Self::xbl_request(format!("d={}", ms_access_token)))
                .await?;

            if !response.status().is_success() {
                return Err(XboxAuthError::BadRequest);
            }
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(XboxAuthError::Http {
                status,
                body_snippet: body_snippet(&body),
            });
        }

        let xbl_response: XblTokenResponse = response.json().await?;
        Ok(xbl_response.token)
    }

    /// Authorize the user token for `relying_party`
    #[instrument(skip(self, xbl_token))]
    pub async fn xsts_authorize(
        &self,
        xbl_token: &str,
        relying_party: &str,
    ) -> Result<XblAssertion, XboxAuthError> {
        let request = XstsAuthRequest {
            properties: XstsAuthProperties {
                sandbox_id: "RETAIL".to_string(),
                user_tokens: vec![xbl_token.to_string()],
            },
            relying_party: relying_party.to_string(),
            token_type: "JWT".to_string(),
        };

        debug!("Authorizing with XSTS");
        let response = self
            .http
            .post(&self.endpoints.xsts_authorize)
            .header("Accept", "application/json")
            .header("x-xbl-contract-version", "1")
            .json(&request)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let error_response: XstsErrorResponse = response.json().await?;
            if let Some(message) = &error_response.message {
                debug!(xerr = error_response.xerr, detail = %message, "XSTS denied authorization");
            }
            return Err(XstsError::from_xerr(error_response.xerr).into());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(XboxAuthError::Http {
                status,
                body_snippet: body_snippet(&body),
            });
        }

        let xsts_response: XblTokenResponse = response.json().await?;
        let user_hash = xsts_response
            .display_claims
            .xui
            .first()
            .ok_or(XboxAuthError::MissingClaims)?
            .uhs
            .clone();

        Ok(XblAssertion {
            user_hash,
            token: xsts_response.token,
        })
    }
}

#[async_trait::async_trait]
impl XblExchange for XboxLiveExchange {
    async fn exchange(
        &self,
        credential: &str,
        relying_party: &str,
    ) -> Result<XblAssertion, XboxAuthError> {
        let xbl_token = self.xbl_authenticate(credential).await?;
        self.xsts_authorize(&xbl_token, relying_party).await
    }
}
