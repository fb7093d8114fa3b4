use std::path::Path;

use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::backend::{BackendResult, ReadImageSnafu};

/// Content type the report endpoint must answer with.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Raw image bytes plus the metadata needed for a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = guess_mime_type(&file_name).to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> BackendResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.context(ReadImageSnafu {
            stage: "read-image-file",
            path: path.display().to_string(),
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        Ok(Self::new(file_name, bytes))
    }
}

fn guess_mime_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeRequest {
    pub image: ImageUpload,
    pub language: String,
}

/// One class score as reported by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub class_index: Option<u32>,
    pub class_name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyzeResponse {
    pub prediction: Prediction,
    pub gemini_response: String,
}

/// Classifier verdict plus the generated explanation.
///
/// `label` is `None` when the classifier found no disease class.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub label: Option<String>,
    pub confidence: f64,
    pub narrative: String,
}

impl From<AnalyzeResponse> for Diagnosis {
    fn from(response: AnalyzeResponse) -> Self {
        let label = response
            .prediction
            .class_index
            .map(|_| response.prediction.class_name);
        Self {
            label,
            confidence: response.prediction.confidence,
            narrative: response.gemini_response,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    pub input: String,
    pub language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfMessage {
    pub from: Speaker,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfRequest {
    pub messages: Vec<PdfMessage>,
    pub language: String,
}

/// Binary document returned by the report endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilePrediction {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub top_predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictResponse {
    pub predictions: Vec<FilePrediction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_class_index_means_no_disease() {
        let payload = r#"{
            "prediction": {"class_index": null, "class_name": "Healthy image", "confidence": 0.42},
            "gemini_response": "Keep the soil well drained."
        }"#;
        let response: AnalyzeResponse = serde_json::from_str(payload).unwrap();
        let diagnosis = Diagnosis::from(response);

        assert_eq!(diagnosis.label, None);
        assert_eq!(diagnosis.narrative, "Keep the soil well drained.");
    }

    #[test]
    fn class_index_keeps_the_class_name() {
        let payload = r#"{
            "prediction": {"class_index": 5, "class_name": "Leaf Blight", "confidence": 0.87},
            "gemini_response": "Blight spreads in humid weather."
        }"#;
        let diagnosis = Diagnosis::from(serde_json::from_str::<AnalyzeResponse>(payload).unwrap());
        assert_eq!(diagnosis.label.as_deref(), Some("Leaf Blight"));
        assert!((diagnosis.confidence - 0.87).abs() < f64::EPSILON);
    }

    #[test]
    fn pdf_request_uses_bot_for_assistant_turns() {
        let request = PdfRequest {
            messages: vec![
                PdfMessage {
                    from: Speaker::User,
                    text: "why?".to_string(),
                },
                PdfMessage {
                    from: Speaker::Bot,
                    text: "because".to_string(),
                },
            ],
            language: "kn".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["from"], "user");
        assert_eq!(value["messages"][1]["from"], "bot");
        assert_eq!(value["language"], "kn");
    }

    #[test]
    fn mime_type_follows_extension() {
        assert_eq!(ImageUpload::new("leaf.JPG", vec![]).mime_type, "image/jpeg");
        assert_eq!(ImageUpload::new("leaf.png", vec![]).mime_type, "image/png");
        assert_eq!(
            ImageUpload::new("leaf", vec![]).mime_type,
            "application/octet-stream"
        );
    }
}
