use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures::stream::BoxStream;
use snafu::Snafu;

use crate::wire::{
    AnalyzeRequest, Diagnosis, Document, FilePrediction, GenerateRequest, ImageUpload, PdfRequest,
};

/// Default base URL of the diagnosis service.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_CHUNK_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub endpoint: String,
    pub request_timeout: Duration,
}

impl BackendConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim().trim_end_matches('/').to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Joins an endpoint path onto the configured base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
pub type BackendResult<T> = Result<T, BackendError>;

/// Decoded text fragments of one streamed answer, in arrival order.
pub type FragmentStream = BoxStream<'static, BackendResult<String>>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BackendError {
    #[snafu(display("backend endpoint '{endpoint}' is invalid"))]
    InvalidEndpoint {
        stage: &'static str,
        endpoint: String,
    },
    #[snafu(display("http client failed on `{stage}`, {source}"))]
    HttpClient {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("{detail}"))]
    Status {
        stage: &'static str,
        status: u16,
        detail: String,
    },
    #[snafu(display("request timed out on `{stage}` after {}s", elapsed.as_secs()))]
    Timeout {
        stage: &'static str,
        elapsed: Duration,
    },
    #[snafu(display("failed to parse response on `{stage}`: {source}"))]
    DecodePayload {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("unsupported response content type '{content_type}': {detail}"))]
    UnsupportedResponse {
        stage: &'static str,
        content_type: String,
        detail: String,
    },
    #[snafu(display("failed to read image '{path}': {source}"))]
    ReadImage {
        stage: &'static str,
        path: String,
        source: std::io::Error,
    },
}

impl BackendError {
    /// Text shown to the user when an operation fails with this error.
    pub fn detail(&self) -> String {
        match self {
            Self::Status { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// Remote collaborator behind the assistant: classification, answer streaming,
/// report rendering and batch prediction.
pub trait DiagnosisBackend: Send + Sync {
    fn name(&self) -> &str;
    fn analyze<'a>(&'a self, request: AnalyzeRequest) -> BoxFuture<'a, BackendResult<Diagnosis>>;
    fn open_stream<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> BoxFuture<'a, BackendResult<FragmentStream>>;
    fn generate_pdf<'a>(&'a self, request: PdfRequest) -> BoxFuture<'a, BackendResult<Document>>;
    fn predict<'a>(
        &'a self,
        files: Vec<ImageUpload>,
    ) -> BoxFuture<'a, BackendResult<Vec<FilePrediction>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_normalizes_trailing_slashes() {
        let config = BackendConfig::new(" http://plants.local:8000/ ");
        assert_eq!(config.endpoint, "http://plants.local:8000");
        assert_eq!(config.url("/analyze/"), "http://plants.local:8000/analyze/");
        assert_eq!(
            config.url("generate-stream"),
            "http://plants.local:8000/generate-stream"
        );
    }

    #[test]
    fn status_detail_is_the_server_message() {
        let error = BackendError::Status {
            stage: "analyze-status",
            status: 500,
            detail: "model unavailable".to_string(),
        };
        assert_eq!(error.detail(), "model unavailable");
    }
}
