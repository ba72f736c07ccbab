use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::PlayFabConfig;
use crate::errors::{PlayFabError, Result};
use crate::transport::{HttpRequest, HttpTransport};

pub const X_PLAYFAB_SDK: HeaderName = HeaderName::from_static("x-playfabsdk");
pub const X_REPORT_ERROR_AS_SUCCESS: HeaderName =
    HeaderName::from_static("x-reporterrorassuccess");
pub const X_ENTITY_TOKEN: HeaderName = HeaderName::from_static("x-entitytoken");

/// Sends JSON requests to the PlayFab API with the Minecraft client's headers
///
/// The service is asked to report errors as HTTP 200 (`X-ReportErrorAsSuccess`),
/// and the status code is never checked here. A failed call shows up either as
/// a body that does not decode into `R`, or as error fields the caller has to
/// inspect in the decoded envelope.
#[derive(Clone)]
pub struct Requester {
    config: PlayFabConfig,
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for Requester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Requester")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Requester {
    pub fn new(config: PlayFabConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &PlayFabConfig {
        &self.config
    }

    /// POST `body` to `path` and decode the response into `R`
    ///
    /// `entity_token` is sent as `X-EntityToken` unless it is absent or empty.
    #[instrument(
        skip(self, body, entity_token),
        fields(authenticated = entity_token.is_some_and(|t| !t.is_empty()))
    )]
    pub async fn request<B, R>(&self, path: &str, body: &B, entity_token: Option<&str>) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_vec(body).map_err(PlayFabError::Serialization)?;
        let url = self.config.endpoint(path)?;
        let headers = self.headers(entity_token)?;

        debug!("Sending PlayFab request");
        let response = self.transport.send(HttpRequest { url, headers, body }).await?;

        if !response.status.is_success() {
            warn!(status = %response.status, "PlayFab answered with a non-success status");
        }

        serde_json::from_slice(&response.body).map_err(PlayFabError::Decode)
    }

    fn headers(&self, entity_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        headers.insert(USER_AGENT, header_value(&self.config.user_agent)?);
        headers.insert(X_PLAYFAB_SDK, header_value(&self.config.sdk_version)?);
        headers.insert(X_REPORT_ERROR_AS_SUCCESS, HeaderValue::from_static("true"));

        if let Some(token) = entity_token.filter(|t| !t.is_empty()) {
            let mut value = header_value(token)?;
            value.set_sensitive(true);
            headers.insert(X_ENTITY_TOKEN, value);
        }

        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| PlayFabError::InvalidHeader(e.to_string()))
}
