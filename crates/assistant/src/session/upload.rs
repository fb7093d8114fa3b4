use std::sync::Arc;

use plantai_backend::{AnalyzeRequest, DiagnosisBackend, ImageUpload};

use crate::chat::{TimelineChange, TimelineResult, TimelineWriter, Turn, UploadEvent};
use crate::locale::LocaleProfile;
use crate::session::handle::EventSink;
use crate::session::{Applied, SessionEffect};

/// Drives one "submit image, receive diagnosis" run.
///
/// Templates come from the locale captured when the upload began, so a
/// language switch mid-flight does not change how the result is rendered.
#[derive(Debug)]
pub(crate) struct UploadOrchestrator {
    profile: &'static LocaleProfile,
}

impl UploadOrchestrator {
    pub(crate) fn new(profile: &'static LocaleProfile) -> Self {
        Self { profile }
    }

    /// Appends the user's upload turn followed by the pending placeholder.
    pub(crate) fn begin(
        &self,
        writer: &mut TimelineWriter<'_>,
        file_name: &str,
    ) -> TimelineResult<Vec<TimelineChange>> {
        Ok(vec![
            writer.append(Turn::user(self.profile.uploaded_image(file_name)))?,
            writer.append(Turn::placeholder())?,
        ])
    }

    /// Sends the single analyze request and reports its outcome.
    pub(crate) async fn run(
        backend: Arc<dyn DiagnosisBackend>,
        image: ImageUpload,
        language: String,
        sink: EventSink,
    ) {
        let file_name = image.file_name.clone();
        let event = match backend.analyze(AnalyzeRequest { image, language }).await {
            Ok(diagnosis) => {
                tracing::debug!(file = %file_name, label = ?diagnosis.label, "image analyzed");
                UploadEvent::Diagnosed(diagnosis)
            }
            Err(error) => {
                tracing::warn!(file = %file_name, error = %error, "image analysis failed");
                UploadEvent::Failed {
                    detail: error.detail(),
                }
            }
        };
        sink.emit(event);
    }

    /// Resolves the placeholder with the rendered diagnosis or an error line.
    pub(crate) fn apply(
        &self,
        writer: &mut TimelineWriter<'_>,
        event: UploadEvent,
    ) -> TimelineResult<Applied> {
        match event {
            UploadEvent::Diagnosed(diagnosis) => {
                let change = writer.replace_last(self.profile.diagnosis_report(&diagnosis))?;
                Ok(Applied {
                    change: Some(change),
                    effect: Some(SessionEffect::Diagnosed {
                        narrative: diagnosis.narrative,
                    }),
                })
            }
            UploadEvent::Failed { detail } => Ok(Applied {
                change: Some(writer.replace_last(self.profile.error(&detail))?),
                effect: None,
            }),
        }
    }
}
