#![deny(unsafe_code)]

use std::sync::Arc;

mod backend;
mod decoder;
mod http_adapter;
mod wire;

pub use backend::{
    BackendConfig, BackendError, BackendResult, BoxFuture, DEFAULT_CHUNK_TIMEOUT,
    DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT, DiagnosisBackend, FragmentStream,
};
pub use decoder::{FragmentDecoder, StreamDecoder};
pub use http_adapter::{HTTP_BACKEND_NAME, HttpBackend};
pub use wire::{
    AnalyzeRequest, AnalyzeResponse, Diagnosis, Document, FilePrediction, GenerateRequest,
    ImageUpload, PDF_CONTENT_TYPE, PdfMessage, PdfRequest, PredictResponse, Prediction, Speaker,
};

pub fn create_backend(config: BackendConfig) -> BackendResult<Arc<dyn DiagnosisBackend>> {
    tracing::info!(endpoint = %config.endpoint, "creating diagnosis backend");
    Ok(Arc::new(HttpBackend::new(config)?))
}
