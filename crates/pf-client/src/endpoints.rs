use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::client::PlayFabClient;
use crate::config::paths;
use crate::errors::{PlayFabError, Result};

/// Catalog search query
///
/// `filter` and `order_by` are OData expressions, e.g.
/// `contentType eq 'PersonaDurable'` and `creationDate desc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub count: bool,
    pub filter: String,
    #[serde(rename = "orderBy")]
    pub order_by: String,
    /// Store the search is scoped to
    pub scid: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub skip: u32,
    #[serde(rename = "top")]
    pub limit: u32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// Untyped PlayFab response envelope
///
/// With `X-ReportErrorAsSuccess` the service answers 200 even when a call
/// fails, so a decoded envelope is not proof of success. Check
/// [`Envelope::application_error`] when an endpoint can fail on the server.
///
/// Every field is kept as raw JSON; only the shape of `data` can fail a call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default, rename = "errorCode")]
    pub error_code: Option<Value>,
    #[serde(default, rename = "errorMessage")]
    pub error_message: Option<Value>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// What an envelope's `data` key holds
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeData {
    Object(Map<String, Value>),
    Missing,
    NotAnObject(Value),
}

/// Error fields of an envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationError {
    pub code: Option<i64>,
    pub error: Option<String>,
    pub error_code: Option<i64>,
    pub message: Option<String>,
}

impl Envelope {
    pub fn classify(self) -> EnvelopeData {
        match self.data {
            Some(Value::Object(map)) => EnvelopeData::Object(map),
            None | Some(Value::Null) => EnvelopeData::Missing,
            Some(other) => EnvelopeData::NotAnObject(other),
        }
    }

    /// The `data` mapping, or a shape error
    pub fn into_data(self) -> Result<Map<String, Value>> {
        match self.classify() {
            EnvelopeData::Object(map) => Ok(map),
            EnvelopeData::Missing => Err(PlayFabError::Shape(
                "response envelope has no \"data\" key".to_string(),
            )),
            EnvelopeData::NotAnObject(value) => Err(PlayFabError::Shape(format!(
                "response \"data\" is not an object: {}",
                value_kind(&value)
            ))),
        }
    }

    /// Error details when the envelope reports a failure
    ///
    /// Fields of an unexpected type are read as text rather than rejected.
    pub fn application_error(&self) -> Option<ApplicationError> {
        let code = self.code.as_ref().and_then(Value::as_i64);
        let error = lenient_text(self.error.as_ref());
        let error_code = self.error_code.as_ref().and_then(Value::as_i64);

        let failed_code = code.is_some_and(|c| !(200..300).contains(&c));
        if !failed_code && error.is_none() && error_code.is_none() {
            return None;
        }
        Some(ApplicationError {
            code,
            error,
            error_code,
            message: lenient_text(self.error_message.as_ref()),
        })
    }
}

fn lenient_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl PlayFabClient {
    /// Search the Minecraft catalog
    ///
    /// Returns the envelope's `data` mapping as is. Application errors are not
    /// detected; an error envelope without `data` fails with
    /// [`PlayFabError::Shape`].
    #[instrument(skip(self, filter), fields(scid = %filter.scid))]
    pub async fn search(&self, filter: &Filter) -> Result<Map<String, Value>> {
        let envelope: Envelope = self.request(paths::CATALOG_SEARCH, filter).await?;
        if let Some(err) = envelope.application_error() {
            warn!(?err, "Catalog search reported an error");
        }

        let data = envelope.into_data()?;
        debug!(keys = data.len(), "Catalog search succeeded");
        Ok(data)
    }
}
