use std::collections::VecDeque;
use std::sync::Mutex;

use futures::StreamExt;
use futures::stream;
use plantai_backend::{
    AnalyzeRequest, BackendError, BackendResult, BoxFuture, Diagnosis, DiagnosisBackend, Document,
    FilePrediction, FragmentStream, GenerateRequest, ImageUpload, PDF_CONTENT_TYPE, PdfRequest,
};

/// How a scripted `/generate-stream` call behaves.
pub(crate) enum ScriptedStream {
    /// Yields the items, then ends.
    Items(Vec<BackendResult<String>>),
    /// Yields the items, then never produces another chunk.
    Stall(Vec<String>),
    /// Fails before the body starts.
    Reject(BackendError),
}

/// In-memory backend that replays queued responses and records requests.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    analyses: Mutex<VecDeque<BackendResult<Diagnosis>>>,
    streams: Mutex<VecDeque<ScriptedStream>>,
    documents: Mutex<VecDeque<BackendResult<Document>>>,
    pub(crate) analyze_requests: Mutex<Vec<(String, String)>>,
    pub(crate) generate_requests: Mutex<Vec<GenerateRequest>>,
    pub(crate) pdf_requests: Mutex<Vec<PdfRequest>>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_analysis(self, result: BackendResult<Diagnosis>) -> Self {
        self.analyses.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn with_stream(self, stream: ScriptedStream) -> Self {
        self.streams.lock().unwrap().push_back(stream);
        self
    }

    pub(crate) fn with_document(self, result: BackendResult<Document>) -> Self {
        self.documents.lock().unwrap().push_back(result);
        self
    }
}

pub(crate) fn diagnosis(label: Option<&str>, confidence: f64, narrative: &str) -> Diagnosis {
    Diagnosis {
        label: label.map(str::to_string),
        confidence,
        narrative: narrative.to_string(),
    }
}

pub(crate) fn status_error(status: u16, detail: &str) -> BackendError {
    BackendError::Status {
        stage: "scripted",
        status,
        detail: detail.to_string(),
    }
}

pub(crate) fn pdf(bytes: &[u8]) -> Document {
    Document {
        content_type: PDF_CONTENT_TYPE.to_string(),
        bytes: bytes.to_vec(),
    }
}

pub(crate) fn image(name: &str) -> ImageUpload {
    ImageUpload::new(name, vec![0xFF, 0xD8, 0xFF])
}

fn unscripted() -> BackendError {
    status_error(503, "no scripted response")
}

impl DiagnosisBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn analyze<'a>(&'a self, request: AnalyzeRequest) -> BoxFuture<'a, BackendResult<Diagnosis>> {
        Box::pin(async move {
            self.analyze_requests
                .lock()
                .unwrap()
                .push((request.image.file_name, request.language));
            self.analyses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(unscripted()))
        })
    }

    fn open_stream<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> BoxFuture<'a, BackendResult<FragmentStream>> {
        Box::pin(async move {
            self.generate_requests.lock().unwrap().push(request);
            let script = self.streams.lock().unwrap().pop_front();
            match script {
                Some(ScriptedStream::Items(items)) => Ok(stream::iter(items).boxed()),
                Some(ScriptedStream::Stall(items)) => Ok(stream::iter(items.into_iter().map(Ok))
                    .chain(stream::pending())
                    .boxed()),
                Some(ScriptedStream::Reject(error)) => Err(error),
                None => Err(unscripted()),
            }
        })
    }

    fn generate_pdf<'a>(&'a self, request: PdfRequest) -> BoxFuture<'a, BackendResult<Document>> {
        Box::pin(async move {
            self.pdf_requests.lock().unwrap().push(request);
            self.documents
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(unscripted()))
        })
    }

    fn predict<'a>(
        &'a self,
        _files: Vec<ImageUpload>,
    ) -> BoxFuture<'a, BackendResult<Vec<FilePrediction>>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}
