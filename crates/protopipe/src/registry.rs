//! Schema registry REST client.
//!
//! Thin wrapper over the registry's subject/version routes. Every call is a
//! single attempt; a non-success status becomes `PipeError::Registry` with
//! the raw body attached.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PipeError;

/// Build the subject name a schema registers under. Value schemas use
/// `<topic>-value`, key schemas `<topic>-key`.
pub fn subject_for_topic(topic: &str, for_key: bool) -> String {
    if for_key {
        format!("{topic}-key")
    } else {
        format!("{topic}-value")
    }
}

#[derive(Debug, Serialize)]
struct RegisterSchemaRequest {
    #[serde(rename = "schemaType")]
    schema_type: String,
    schema: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterSchemaResponse {
    pub id: i32,
}

pub struct SchemaRegistryClient {
    base_url: String,
    client: reqwest::Client,
}

impl SchemaRegistryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Register a Protobuf schema under a subject.
    ///
    /// POSTs `{"schemaType":"PROTOBUF","schema":...}` to
    /// `/subjects/<subject>/versions` and returns the assigned schema id.
    pub async fn register_schema(
        &self,
        subject: &str,
        schema: &str,
    ) -> Result<RegisterSchemaResponse, PipeError> {
        let url = format!("{}/subjects/{}/versions", self.base_url, subject);
        let request = RegisterSchemaRequest {
            schema_type: "PROTOBUF".to_string(),
            schema: schema.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipeError::from_transport_error(e, "schema registration"))?;
        let body = read_response(response, "schema registration").await?;

        serde_json::from_str(&body)
            .map_err(|e| PipeError::from_parse_error(e, "registry response"))
    }

    /// Delete every version of a subject. Returns the deleted version list.
    pub async fn delete_subject(&self, subject: &str) -> Result<Vec<i32>, PipeError> {
        let url = format!("{}/subjects/{}", self.base_url, subject);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| PipeError::from_transport_error(e, "subject deletion"))?;
        let body = read_response(response, "subject deletion").await?;

        serde_json::from_str(&body)
            .map_err(|e| PipeError::from_parse_error(e, "registry response"))
    }

    /// Delete one version of a subject. Returns the deleted version number.
    pub async fn delete_version(&self, subject: &str, version: &str) -> Result<i32, PipeError> {
        let url = format!("{}/subjects/{}/versions/{}", self.base_url, subject, version);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| PipeError::from_transport_error(e, "version deletion"))?;
        let body = read_response(response, "version deletion").await?;

        serde_json::from_str(&body)
            .map_err(|e| PipeError::from_parse_error(e, "registry response"))
    }
}

/// Read the body, log status and body at debug, and turn non-success
/// statuses into `Registry` errors.
async fn read_response(response: reqwest::Response, context: &str) -> Result<String, PipeError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| PipeError::from_transport_error(e, context))?;

    debug!(status = status.as_u16(), body = %body, "Registry response");

    if !status.is_success() {
        return Err(PipeError::Registry {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}
