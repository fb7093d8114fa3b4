use std::future::Future;
use std::time::Duration;

use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use snafu::{ResultExt, ensure};

use crate::backend::{
    BackendConfig, BackendResult, BoxFuture, DecodePayloadSnafu, DiagnosisBackend,
    FragmentStream, HttpClientSnafu, InvalidEndpointSnafu, StatusSnafu, TimeoutSnafu,
    UnsupportedResponseSnafu,
};
use crate::decoder::FragmentDecoder;
use crate::wire::{
    AnalyzeRequest, AnalyzeResponse, Diagnosis, Document, FilePrediction, GenerateRequest,
    ImageUpload, PDF_CONTENT_TYPE, PdfRequest, PredictResponse,
};

pub const HTTP_BACKEND_NAME: &str = "http";

const ANALYZE_PATH: &str = "/analyze/";
const GENERATE_STREAM_PATH: &str = "/generate-stream";
const GENERATE_PDF_PATH: &str = "/generate-pdf/";
const PREDICT_PATH: &str = "/predict/";

/// Talks to the diagnosis service over plain HTTP.
pub struct HttpBackend {
    config: BackendConfig,
    client: Client,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        ensure!(
            config.endpoint.starts_with("http://") || config.endpoint.starts_with("https://"),
            InvalidEndpointSnafu {
                stage: "http-backend-new",
                endpoint: config.endpoint.clone(),
            }
        );

        let client = Client::builder()
            .connect_timeout(config.request_timeout)
            .build()
            .context(HttpClientSnafu {
                stage: "build-client",
            })?;

        Ok(Self { config, client })
    }

    async fn send(
        &self,
        stage: &'static str,
        request: reqwest::RequestBuilder,
    ) -> BackendResult<Response> {
        bounded(stage, self.config.request_timeout, async {
            request.send().await.context(HttpClientSnafu { stage })
        })
        .await
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        stage: &'static str,
        response: Response,
        text_fallback: bool,
    ) -> BackendResult<T> {
        let status = response.status();
        let body = bounded(stage, self.config.request_timeout, async {
            response.text().await.context(HttpClientSnafu { stage })
        })
        .await?;

        if !status.is_success() {
            return StatusSnafu {
                stage,
                status: status.as_u16(),
                detail: failure_detail(status, &body, text_fallback),
            }
            .fail();
        }

        serde_json::from_str(&body).context(DecodePayloadSnafu { stage })
    }

    async fn analyze_inner(&self, request: AnalyzeRequest) -> BackendResult<Diagnosis> {
        let form = Form::new()
            .part("file", image_part(request.image)?)
            .text("language", request.language.clone());

        tracing::debug!(language = %request.language, "sending analyze request");
        let response = self
            .send(
                "send-analyze-request",
                self.client
                    .post(self.config.url(ANALYZE_PATH))
                    .multipart(form),
            )
            .await?;

        let payload: AnalyzeResponse = self
            .read_json("read-analyze-response", response, false)
            .await?;
        Ok(payload.into())
    }

    async fn open_stream_inner(&self, request: GenerateRequest) -> BackendResult<FragmentStream> {
        let response = self
            .send(
                "send-generate-stream-request",
                self.client
                    .post(self.config.url(GENERATE_STREAM_PATH))
                    .json(&request),
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = bounded(
                "read-generate-stream-error",
                self.config.request_timeout,
                async {
                    response.text().await.context(HttpClientSnafu {
                        stage: "read-generate-stream-error",
                    })
                },
            )
            .await
            .unwrap_or_else(|error| {
                tracing::debug!(error = %error, "generate-stream error body unavailable");
                String::new()
            });
            tracing::warn!(status = status.as_u16(), "generate-stream rejected the request");
            return StatusSnafu {
                stage: "generate-stream-status",
                status: status.as_u16(),
                detail: failure_detail(status, &body, true),
            }
            .fail();
        }

        let chunks = response.bytes_stream().map(|chunk| {
            chunk.context(HttpClientSnafu {
                stage: "read-stream-chunk",
            })
        });

        Ok(FragmentDecoder::new(Box::pin(chunks)).boxed())
    }

    async fn generate_pdf_inner(&self, request: PdfRequest) -> BackendResult<Document> {
        let response = self
            .send(
                "send-generate-pdf-request",
                self.client
                    .post(self.config.url(GENERATE_PDF_PATH))
                    .json(&request),
            )
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let bytes = bounded("read-pdf-response", self.config.request_timeout, async {
            response.bytes().await.context(HttpClientSnafu {
                stage: "read-pdf-response",
            })
        })
        .await?;

        if !status.is_success() {
            return StatusSnafu {
                stage: "generate-pdf-status",
                status: status.as_u16(),
                detail: failure_detail(status, &String::from_utf8_lossy(&bytes), true),
            }
            .fail();
        }

        if !is_pdf_content_type(&content_type) {
            return UnsupportedResponseSnafu {
                stage: "generate-pdf-content-type",
                content_type,
                detail: failure_detail(status, &String::from_utf8_lossy(&bytes), true),
            }
            .fail();
        }

        Ok(Document {
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    async fn predict_inner(&self, files: Vec<ImageUpload>) -> BackendResult<Vec<FilePrediction>> {
        let mut form = Form::new();
        for file in files {
            form = form.part("files", image_part(file)?);
        }

        let response = self
            .send(
                "send-predict-request",
                self.client.post(self.config.url(PREDICT_PATH)).multipart(form),
            )
            .await?;

        let payload: PredictResponse = self
            .read_json("read-predict-response", response, false)
            .await?;
        Ok(payload.predictions)
    }
}

impl DiagnosisBackend for HttpBackend {
    fn name(&self) -> &str {
        HTTP_BACKEND_NAME
    }

    fn analyze<'a>(&'a self, request: AnalyzeRequest) -> BoxFuture<'a, BackendResult<Diagnosis>> {
        Box::pin(self.analyze_inner(request))
    }

    fn open_stream<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> BoxFuture<'a, BackendResult<FragmentStream>> {
        Box::pin(self.open_stream_inner(request))
    }

    fn generate_pdf<'a>(&'a self, request: PdfRequest) -> BoxFuture<'a, BackendResult<Document>> {
        Box::pin(self.generate_pdf_inner(request))
    }

    fn predict<'a>(
        &'a self,
        files: Vec<ImageUpload>,
    ) -> BoxFuture<'a, BackendResult<Vec<FilePrediction>>> {
        Box::pin(self.predict_inner(files))
    }
}

async fn bounded<T>(
    stage: &'static str,
    limit: Duration,
    future: impl Future<Output = BackendResult<T>>,
) -> BackendResult<T> {
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => TimeoutSnafu {
            stage,
            elapsed: limit,
        }
        .fail(),
    }
}

fn image_part(image: ImageUpload) -> BackendResult<Part> {
    Part::bytes(image.bytes)
        .file_name(image.file_name)
        .mime_str(&image.mime_type)
        .context(HttpClientSnafu {
            stage: "build-image-part",
        })
}

fn is_pdf_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
}

/// Extracts the failure detail from an error response body.
///
/// Prefers a JSON `error` field, then `detail` (non-string details are kept as
/// JSON). Non-JSON bodies are surfaced as text only when `text_fallback` is set;
/// otherwise the status code is reported.
fn failure_detail(status: StatusCode, body: &str, text_fallback: bool) -> String {
    let status_only = || format!("status: {}", status.as_u16());

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) => {
            let field = object.get("error").or_else(|| object.get("detail"));
            match field {
                Some(Value::String(message)) => message.clone(),
                Some(other) => other.to_string(),
                None => status_only(),
            }
        }
        _ => {
            let text = body.trim();
            if text_fallback && !text.is_empty() {
                text.to_string()
            } else {
                status_only()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;
    use crate::backend::BackendError;
    use crate::wire::{PdfMessage, Speaker};

    #[test]
    fn error_field_wins_over_detail() {
        let detail = failure_detail(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"model unavailable","detail":"ignored"}"#,
            false,
        );
        assert_eq!(detail, "model unavailable");
    }

    #[test]
    fn structured_detail_is_serialized() {
        let detail = failure_detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":[{"loc":["body","files"],"msg":"field required"}]}"#,
            false,
        );
        assert!(detail.contains("field required"));
    }

    #[test]
    fn unparsable_body_reports_the_status() {
        let detail = failure_detail(StatusCode::BAD_GATEWAY, "<html>oops</html>", false);
        assert_eq!(detail, "status: 502");
    }

    #[test]
    fn text_body_is_kept_when_allowed() {
        let detail = failure_detail(StatusCode::BAD_GATEWAY, " upstream down \n", true);
        assert_eq!(detail, "upstream down");
        assert_eq!(
            failure_detail(StatusCode::BAD_GATEWAY, "   ", true),
            "status: 502"
        );
    }

    #[test]
    fn pdf_content_type_ignores_parameters() {
        assert!(is_pdf_content_type("application/pdf"));
        assert!(is_pdf_content_type("Application/PDF; charset=binary"));
        assert!(!is_pdf_content_type("application/json"));
        assert!(!is_pdf_content_type(""));
    }

    #[test]
    fn endpoint_must_be_http() {
        let result = HttpBackend::new(BackendConfig::new("ftp://plants"));
        assert!(matches!(result, Err(BackendError::InvalidEndpoint { .. })));
    }

    /// Serves one connection: reads the request, writes `parts` with a short
    /// pause between each, then holds the socket open for `linger`.
    async fn serve_once(parts: Vec<Vec<u8>>, linger: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            for part in parts {
                socket.write_all(&part).await.unwrap();
                socket.flush().await.unwrap();
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            tokio::time::sleep(linger).await;
        });

        format!("http://{address}")
    }

    async fn read_request(socket: &mut TcpStream) {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let read = socket.read(&mut chunk).await.unwrap();
            if read == 0 {
                return;
            }
            buffer.extend_from_slice(&chunk[..read]);

            let Some(end) = buffer.windows(4).position(|window| window == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buffer[..end]).to_ascii_lowercase();
            if head.contains("transfer-encoding: chunked") {
                if buffer.ends_with(b"0\r\n\r\n") {
                    return;
                }
                continue;
            }
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buffer.len() - end - 4 >= length {
                return;
            }
        }
    }

    fn head(status: &str, headers: &[&str]) -> Vec<u8> {
        let mut text = format!("HTTP/1.1 {status}\r\n");
        for header in headers {
            text.push_str(header);
            text.push_str("\r\n");
        }
        text.push_str("\r\n");
        text.into_bytes()
    }

    fn full(status: &str, content_type: &str, body: &str) -> Vec<u8> {
        let content_type = format!("content-type: {content_type}");
        let content_length = format!("content-length: {}", body.len());
        let mut bytes = head(status, &[content_type.as_str(), content_length.as_str()]);
        bytes.extend_from_slice(body.as_bytes());
        bytes
    }

    fn http_chunk(data: &[u8]) -> Vec<u8> {
        let mut bytes = format!("{:x}\r\n", data.len()).into_bytes();
        bytes.extend_from_slice(data);
        bytes.extend_from_slice(b"\r\n");
        bytes
    }

    fn http_backend(endpoint: String, request_timeout: Duration) -> HttpBackend {
        HttpBackend::new(BackendConfig::new(endpoint).with_request_timeout(request_timeout)).unwrap()
    }

    fn question() -> GenerateRequest {
        GenerateRequest {
            input: "context and question".to_string(),
            language: "en".to_string(),
        }
    }

    #[tokio::test]
    async fn analyze_failure_carries_the_server_error() {
        let endpoint = serve_once(
            vec![full(
                "500 Internal Server Error",
                "application/json",
                r#"{"error":"model unavailable"}"#,
            )],
            Duration::ZERO,
        )
        .await;

        let result = http_backend(endpoint, Duration::from_secs(5))
            .analyze(AnalyzeRequest {
                image: ImageUpload::new("leaf.jpg", vec![0xFF, 0xD8, 0xFF]),
                language: "hi".to_string(),
            })
            .await;

        match result {
            Err(BackendError::Status { status, detail, .. }) => {
                assert_eq!(status, 500);
                assert_eq!(detail, "model unavailable");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stalled_error_body_still_resolves_the_stream_request() {
        let mut response = head(
            "500 Internal Server Error",
            &["content-type: application/json", "content-length: 100"],
        );
        response.extend_from_slice(b"{\"err");
        let endpoint = serve_once(vec![response], Duration::from_secs(5)).await;

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            http_backend(endpoint, Duration::from_millis(200)).open_stream(question()),
        )
        .await
        .expect("open_stream must not wait on a stalled error body");

        let Err(error) = result else {
            panic!("a 500 response must not open a stream");
        };
        assert!(matches!(error, BackendError::Status { status: 500, .. }));
        assert_eq!(error.detail(), "status: 500");
    }

    #[tokio::test]
    async fn stream_reassembles_characters_split_across_http_chunks() {
        let mut parts = vec![head(
            "200 OK",
            &["content-type: text/plain; charset=utf-8", "transfer-encoding: chunked"],
        )];
        // "é🌿" split mid code point in both characters.
        parts.push(http_chunk(&[0xC3]));
        parts.push(http_chunk(&[0xA9, 0xF0, 0x9F]));
        parts.push(http_chunk(&[0x8C, 0xBF]));
        parts.push(b"0\r\n\r\n".to_vec());
        let endpoint = serve_once(parts, Duration::ZERO).await;

        let Ok(stream) = http_backend(endpoint, Duration::from_secs(5))
            .open_stream(question())
            .await
        else {
            panic!("stream should open");
        };
        let fragments: Vec<BackendResult<String>> = stream.collect().await;

        let mut text = String::new();
        for fragment in fragments {
            text.push_str(&fragment.unwrap());
        }
        assert_eq!(text, "é🌿");
    }

    #[tokio::test]
    async fn truncated_stream_ends_with_an_error_after_the_partial_text() {
        let mut response = head("200 OK", &["content-type: text/plain", "content-length: 100"]);
        response.extend_from_slice(b"Hello");
        let endpoint = serve_once(vec![response], Duration::ZERO).await;

        let Ok(stream) = http_backend(endpoint, Duration::from_secs(5))
            .open_stream(question())
            .await
        else {
            panic!("stream should open");
        };
        let fragments: Vec<BackendResult<String>> = stream.collect().await;

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].as_ref().unwrap(), "Hello");
        assert!(matches!(
            fragments[1],
            Err(BackendError::HttpClient {
                stage: "read-stream-chunk",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn report_with_a_non_pdf_content_type_is_unsupported() {
        let endpoint = serve_once(
            vec![full(
                "200 OK",
                "application/json",
                r#"{"detail":"renderer offline"}"#,
            )],
            Duration::ZERO,
        )
        .await;

        let result = http_backend(endpoint, Duration::from_secs(5))
            .generate_pdf(PdfRequest {
                messages: vec![PdfMessage {
                    from: Speaker::User,
                    text: "leaf.jpg".to_string(),
                }],
                language: "en".to_string(),
            })
            .await;

        match result {
            Err(BackendError::UnsupportedResponse {
                content_type,
                detail,
                ..
            }) => {
                assert_eq!(content_type, "application/json");
                assert_eq!(detail, "renderer offline");
            }
            other => panic!("expected an unsupported response, got {other:?}"),
        }
    }
}
