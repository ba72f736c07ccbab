use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::config::PlayFabConfig;
use crate::errors::Result;
use crate::login;
use crate::requester::Requester;
use crate::session::Session;
use crate::token::{TokenSource, XblExchange};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Logged-in PlayFab client
///
/// Only the constructors create one, and they run the full login handshake
/// first. The session never changes afterwards, so a shared reference can
/// serve concurrent calls.
#[derive(Debug, Clone)]
pub struct PlayFabClient {
    requester: Requester,
    session: Session,
}

impl PlayFabClient {
    /// Log in through `transport` with the Minecraft configuration
    pub async fn new(
        transport: Arc<dyn HttpTransport>,
        source: &dyn TokenSource,
        exchange: &dyn XblExchange,
    ) -> Result<Self> {
        Self::with_config(PlayFabConfig::minecraft(), transport, source, exchange).await
    }

    /// Log in through `transport` with a custom configuration
    #[instrument(skip_all)]
    pub async fn with_config(
        config: PlayFabConfig,
        transport: Arc<dyn HttpTransport>,
        source: &dyn TokenSource,
        exchange: &dyn XblExchange,
    ) -> Result<Self> {
        let requester = Requester::new(config, transport);
        let session = login::handshake(&requester, source, exchange).await?;
        Ok(Self { requester, session })
    }

    /// Log in over a `reqwest` transport built from the config's timeouts
    pub async fn connect(
        config: PlayFabConfig,
        source: &dyn TokenSource,
        exchange: &dyn XblExchange,
    ) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config.http_timeouts)?);
        Self::with_config(config, transport, source, exchange).await
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn player_id(&self) -> &str {
        &self.session.player_id
    }

    pub fn entity_token(&self) -> &str {
        &self.session.entity_token
    }

    /// Authenticated request for endpoints without a wrapper
    ///
    /// See [`Requester::request`] for how failures are reported.
    pub async fn request<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.requester
            .request(path, body, Some(&self.session.entity_token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::Filter;
    use crate::errors::PlayFabError;
    use crate::requester::X_ENTITY_TOKEN;
    use crate::token::{StaticTokenSource, StaticXblExchange, XblAssertion};
    use crate::transport::testing::{Reply, StubTransport};
    use serde_json::{Value, json};

    fn handshake_replies() -> Vec<Value> {
        vec![
            json!({
                "code": 200,
                "status": "OK",
                "data": { "PlayFabId": "P1", "EntityToken": { "EntityToken": "T1" } }
            }),
            json!({ "code": 200, "status": "OK", "data": { "EntityToken": "T2" } }),
        ]
    }

    async fn logged_in(stub: Arc<StubTransport>) -> PlayFabClient {
        PlayFabClient::new(
            stub,
            &StaticTokenSource::new("ms"),
            &StaticXblExchange::new(XblAssertion::new("uhs", "xsts")),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_new_stores_player_and_exchanged_token() {
        let stub = Arc::new(StubTransport::json(handshake_replies()));
        let client = logged_in(stub).await;

        assert_eq!(client.player_id(), "P1");
        assert_eq!(client.entity_token(), "T2");
    }

    #[tokio::test]
    async fn test_new_fails_without_credential() {
        let stub = Arc::new(StubTransport::json(handshake_replies()));
        let result = PlayFabClient::new(
            stub.clone(),
            &StaticTokenSource::new(""),
            &StaticXblExchange::new(XblAssertion::new("uhs", "xsts")),
        )
        .await;

        assert!(matches!(result, Err(PlayFabError::Credential(_))));
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn test_new_fails_when_entity_step_fails() {
        let stub = Arc::new(StubTransport::new(vec![
            Reply::Body(serde_json::to_vec(&handshake_replies()[0]).unwrap()),
            Reply::Body(b"not json".to_vec()),
        ]));
        let result = PlayFabClient::new(
            stub,
            &StaticTokenSource::new("ms"),
            &StaticXblExchange::new(XblAssertion::new("uhs", "xsts")),
        )
        .await;

        assert!(matches!(result, Err(PlayFabError::Decode(_))));
    }

    #[tokio::test]
    async fn test_later_requests_carry_session_token() {
        let stub = Arc::new(StubTransport::json(handshake_replies()));
        let client = logged_in(stub.clone()).await;

        stub.push(Reply::Body(b"{}".to_vec()));
        stub.push(Reply::Body(b"{}".to_vec()));
        let _: Value = client.request("Catalog/GetItems", &json!({})).await.unwrap();
        let _: Value = client.request("Catalog/GetItems", &json!({})).await.unwrap();

        let requests = stub.requests();
        assert_eq!(requests.len(), 4);
        for sent in &requests[2..] {
            assert_eq!(sent.headers[X_ENTITY_TOKEN], "T2");
        }
    }

    #[tokio::test]
    async fn test_search_returns_echoed_filter() {
        let stub = Arc::new(StubTransport::json(handshake_replies()));
        let client = logged_in(stub.clone()).await;

        stub.push(Reply::EchoData);
        let data = client
            .search(&Filter {
                limit: 300,
                scid: "abc".to_string(),
                order_by: "x desc".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(data["top"], json!(300));
        assert_eq!(data["scid"], json!("abc"));
        assert_eq!(data["orderBy"], json!("x desc"));
        assert!(!data.contains_key("skip"));

        let sent = stub.requests().pop().unwrap();
        assert_eq!(
            sent.url.as_str(),
            "https://20ca2.playfabapi.com/Catalog/Search"
        );
        assert_eq!(sent.headers[X_ENTITY_TOKEN], "T2");
    }

    #[tokio::test]
    async fn test_search_without_data_is_shape_error() {
        let stub = Arc::new(StubTransport::json(handshake_replies()));
        let client = logged_in(stub.clone()).await;

        stub.push(Reply::Body(
            br#"{"code":400,"status":"BadRequest","errorCode":1000}"#.to_vec(),
        ));
        let result = client.search(&Filter::default()).await;
        assert!(matches!(result, Err(PlayFabError::Shape(_))));
    }
}
