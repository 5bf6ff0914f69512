//! REST client for the archived-lead service.
//!
//! Wraps the four service endpoints using [`reqwest`]:
//!
//! | Operation    | Request                                              |
//! |--------------|------------------------------------------------------|
//! | listing      | `GET {base}/archived-records?page=&perPage=&<query>` |
//! | preview      | `POST {base}/redistribution/preview`                 |
//! | execute      | `POST {base}/redistribution/execute`                 |
//! | import batch | `POST {base}/records/import`                         |
//!
//! Successful bodies may be bare or wrapped in `{ "data": ... }`. Error
//! bodies follow `{ "error": "...", "code": "..." }`.

use leadbridge_core::destination::DestinationConfig;
use leadbridge_core::filters::FilterQuery;
use leadbridge_core::leads::ArchivedPage;
use leadbridge_core::payload::SelectionPayload;
use leadbridge_core::redistribution::{
    ExecuteRequest, ExecuteResponse, ImportBatchRequest, ImportBatchResponse,
    RedistributionPreview,
};
use leadbridge_engine::LeadsBackend;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::ApiError;

/// Header carrying the execute request's idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// HTTP client for one archived-lead service.
#[derive(Debug, Clone)]
pub struct LeadsApiClient {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

/// Success body, either enveloped or bare.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(inner) => inner,
        }
    }
}

/// Standard error body.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    code: Option<String>,
}

#[derive(Serialize)]
struct PreviewBody<'a> {
    selection: &'a SelectionPayload,
    destination: &'a DestinationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageParams {
    page: u32,
    per_page: u32,
}

impl LeadsApiClient {
    /// Build a client from configuration. The timeout applies to every
    /// request.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one page of archived records.
    pub async fn list_archived(
        &self,
        query: &FilterQuery,
        page: u32,
        per_page: u32,
    ) -> Result<ArchivedPage, ApiError> {
        tracing::debug!(page, per_page, "GET archived-records");
        let response = self
            .authorized(self.client.get(self.url("archived-records")))
            .query(&PageParams { page, per_page })
            .query(query)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Dry-run a redistribution.
    pub async fn preview(
        &self,
        selection: &SelectionPayload,
        destination: &DestinationConfig,
    ) -> Result<RedistributionPreview, ApiError> {
        tracing::debug!(
            selection = selection.kind(),
            strategy = destination.strategy.as_str(),
            "POST redistribution/preview"
        );
        let response = self
            .authorized(self.client.post(self.url("redistribution/preview")))
            .json(&PreviewBody {
                selection,
                destination,
            })
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Run a redistribution. The idempotency key travels both in the body
    /// and in the `Idempotency-Key` header.
    pub async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, ApiError> {
        tracing::debug!(
            selection = request.selection.kind(),
            idempotency_key = %request.idempotency_key,
            "POST redistribution/execute"
        );
        let response = self
            .authorized(self.client.post(self.url("redistribution/execute")))
            .header(IDEMPOTENCY_KEY_HEADER, request.idempotency_key.to_string())
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Send a batch of records for ingestion.
    pub async fn import_batch(
        &self,
        request: &ImportBatchRequest,
    ) -> Result<ImportBatchResponse, ApiError> {
        tracing::debug!(records = request.records.len(), "POST records/import");
        let response = self
            .authorized(self.client.post(self.url("records/import")))
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Ensure the response has a success status code. On failure the body
    /// is decoded as `{ "error", "code" }` when possible and kept raw
    /// otherwise.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let (code, message) = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => (parsed.code, parsed.error),
            Err(_) => (None, body),
        };
        tracing::debug!(status = status.as_u16(), ?code, "Service returned an error status");
        Err(ApiError::Status {
            status: status.as_u16(),
            code,
            message,
        })
    }

    /// Parse a successful JSON body, unwrapping a `data` envelope if present.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
        Ok(envelope.into_inner())
    }
}

impl LeadsBackend for LeadsApiClient {
    type Error = ApiError;

    async fn list_archived(
        &self,
        query: &FilterQuery,
        page: u32,
        per_page: u32,
    ) -> Result<ArchivedPage, ApiError> {
        LeadsApiClient::list_archived(self, query, page, per_page).await
    }

    async fn preview(
        &self,
        selection: &SelectionPayload,
        destination: &DestinationConfig,
    ) -> Result<RedistributionPreview, ApiError> {
        LeadsApiClient::preview(self, selection, destination).await
    }

    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, ApiError> {
        LeadsApiClient::execute(self, request).await
    }

    async fn import_batch(
        &self,
        request: &ImportBatchRequest,
    ) -> Result<ImportBatchResponse, ApiError> {
        LeadsApiClient::import_batch(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_accepts_wrapped_and_bare() {
        let wrapped: Envelope<ArchivedPage> =
            serde_json::from_str(r#"{"data":{"items":[],"total":4}}"#).unwrap();
        assert_eq!(wrapped.into_inner().total, 4);

        let bare: Envelope<ArchivedPage> =
            serde_json::from_str(r#"{"items":[],"total":9}"#).unwrap();
        assert_eq!(bare.into_inner().total, 9);
    }

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let config = ClientConfig {
            base_url: "http://crm.local/api/".to_string(),
            ..ClientConfig::default()
        };
        let client = LeadsApiClient::with_client(reqwest::Client::new(), &config);
        assert_eq!(client.url("records/import"), "http://crm.local/api/records/import");
    }
}
