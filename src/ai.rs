//! Client for the AI document service.
//!
//! The service sits behind [`AiCapability`] so that handlers and services only
//! see the request/response contract: document bytes in, structured fields
//! out; repair notes in, summary out; ledger document in, transaction lines
//! out.

use crate::config::AppConfig;
use crate::errors::ServiceError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

/// A document handed to the AI service.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInput {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DocumentAnalysis {
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub fields: Map<String, Value>,
}

/// One ledger line recognised in an uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtractedTransaction {
    #[serde(default)]
    pub reference: Option<String>,
    pub description: String,
    pub amount_cents: i64,
    #[serde(default)]
    pub transaction_date: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait AiCapability: Send + Sync {
    async fn analyze_document(
        &self,
        document: DocumentInput,
    ) -> Result<DocumentAnalysis, ServiceError>;

    async fn summarize_notes(&self, notes: &str) -> Result<String, ServiceError>;

    async fn extract_transactions(
        &self,
        document: DocumentInput,
    ) -> Result<Vec<ExtractedTransaction>, ServiceError>;
}

/// Builds the capability configured in `AppConfig`: the HTTP client when an
/// endpoint is set, otherwise [`DisabledAi`].
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn AiCapability>, ServiceError> {
    match config.ai_endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
        Some(endpoint) => Ok(Arc::new(HttpAiClient::new(
            endpoint,
            config.ai_api_key.clone(),
            Duration::from_secs(config.ai_timeout_secs),
        )?)),
        None => {
            info!("AI endpoint not configured; AI features disabled");
            Ok(Arc::new(DisabledAi))
        }
    }
}

/// Answers every request with an `ExternalServiceError`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledAi;

impl DisabledAi {
    fn unavailable<T>() -> Result<T, ServiceError> {
        Err(ServiceError::ExternalServiceError(
            "AI capability is not configured".to_string(),
        ))
    }
}

#[async_trait]
impl AiCapability for DisabledAi {
    async fn analyze_document(
        &self,
        _document: DocumentInput,
    ) -> Result<DocumentAnalysis, ServiceError> {
        Self::unavailable()
    }

    async fn summarize_notes(&self, _notes: &str) -> Result<String, ServiceError> {
        Self::unavailable()
    }

    async fn extract_transactions(
        &self,
        _document: DocumentInput,
    ) -> Result<Vec<ExtractedTransaction>, ServiceError> {
        Self::unavailable()
    }
}

#[derive(Serialize)]
struct DocumentRequest {
    file_name: String,
    content_type: String,
    content_base64: String,
}

impl From<DocumentInput> for DocumentRequest {
    fn from(document: DocumentInput) -> Self {
        Self {
            content_base64: STANDARD.encode(&document.bytes),
            file_name: document.file_name,
            content_type: document.content_type,
        }
    }
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    notes: &'a str,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    summary: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    transactions: Vec<ExtractedTransaction>,
}

/// JSON-over-HTTP client. Endpoints are relative to the configured base URL.
pub struct HttpAiClient {
    client: Client,
    base_url: String,
}

impl HttpAiClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|_| {
                ServiceError::InternalError("invalid characters in AI API key".to_string())
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                ServiceError::InternalError(format!("failed to build AI HTTP client: {}", e))
            })?;

        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ServiceError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(%url, error = %e, "AI request failed");
                ServiceError::ExternalServiceError(format!("AI request failed: {}", e))
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("failed to read AI response: {}", e))
        })?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            error!(%url, %status, "AI service returned an error");
            return Err(ServiceError::ExternalServiceError(format!(
                "AI service error (status: {}): {}",
                status, text
            )));
        }

        serde_json::from_slice(&body).map_err(|e| {
            ServiceError::ExternalServiceError(format!("malformed AI response: {}", e))
        })
    }
}

#[async_trait]
impl AiCapability for HttpAiClient {
    #[instrument(skip(self, document), fields(file_name = %document.file_name))]
    async fn analyze_document(
        &self,
        document: DocumentInput,
    ) -> Result<DocumentAnalysis, ServiceError> {
        self.post("analyze", &DocumentRequest::from(document)).await
    }

    #[instrument(skip(self, notes), fields(len = notes.len()))]
    async fn summarize_notes(&self, notes: &str) -> Result<String, ServiceError> {
        let response: SummarizeResponse =
            self.post("summarize", &SummarizeRequest { notes }).await?;
        Ok(response.summary)
    }

    #[instrument(skip(self, document), fields(file_name = %document.file_name))]
    async fn extract_transactions(
        &self,
        document: DocumentInput,
    ) -> Result<Vec<ExtractedTransaction>, ServiceError> {
        let response: ExtractResponse = self
            .post("extract-transactions", &DocumentRequest::from(document))
            .await?;
        Ok(response.transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn disabled_capability_reports_external_error() {
        let ai = DisabledAi;
        assert_matches!(
            ai.summarize_notes("replaced pump seal").await,
            Err(ServiceError::ExternalServiceError(_))
        );
    }

    #[test]
    fn document_request_encodes_bytes() {
        let request = DocumentRequest::from(DocumentInput {
            file_name: "invoice.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: Bytes::from_static(b"hello"),
        });
        assert_eq!(request.content_base64, "aGVsbG8=");
    }

    #[test]
    fn analysis_tolerates_missing_fields() {
        let parsed: DocumentAnalysis = serde_json::from_str(r#"{"summary":"ok"}"#).unwrap();
        assert_eq!(parsed.summary.as_deref(), Some("ok"));
        assert!(parsed.fields.is_empty());
        assert!(parsed.document_type.is_none());
    }

    #[tokio::test]
    async fn unreachable_endpoint_maps_to_external_error() {
        let client =
            HttpAiClient::new("http://127.0.0.1:9", None, Duration::from_millis(200)).unwrap();
        assert_matches!(
            client.summarize_notes("notes").await,
            Err(ServiceError::ExternalServiceError(_))
        );
    }
}
