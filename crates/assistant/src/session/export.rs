use std::sync::Arc;

use plantai_backend::{DiagnosisBackend, PdfMessage, PdfRequest, Speaker};

use crate::chat::{ExportEvent, Origin, ReportArtifact, TimelineResult, TimelineWriter, Turn};
use crate::locale::{LanguageCode, LocaleProfile};
use crate::session::handle::EventSink;
use crate::session::{Applied, SessionEffect};

pub const REPORT_FILE_NAME: &str = "PlantAI_Report.pdf";

/// Turns a timeline snapshot into a report document.
///
/// The exporter only reads turns; the confirmation or failure line is appended
/// once the outcome arrives.
#[derive(Debug)]
pub(crate) struct ReportExporter {
    profile: &'static LocaleProfile,
}

impl ReportExporter {
    pub(crate) fn new(profile: &'static LocaleProfile) -> Self {
        Self { profile }
    }

    pub(crate) fn request(turns: &[Turn], language: LanguageCode) -> PdfRequest {
        PdfRequest {
            messages: turns
                .iter()
                .map(|turn| PdfMessage {
                    from: match turn.origin {
                        Origin::User => Speaker::User,
                        Origin::Assistant => Speaker::Bot,
                    },
                    text: turn.body.clone(),
                })
                .collect(),
            language: language.as_str().to_string(),
        }
    }

    pub(crate) async fn run(
        backend: Arc<dyn DiagnosisBackend>,
        request: PdfRequest,
        sink: EventSink,
    ) {
        let turns = request.messages.len();
        let event = match backend.generate_pdf(request).await {
            Ok(document) => {
                tracing::debug!(turns, bytes = document.bytes.len(), "report generated");
                ExportEvent::Ready(ReportArtifact {
                    file_name: REPORT_FILE_NAME.to_string(),
                    content_type: document.content_type,
                    bytes: document.bytes,
                })
            }
            Err(error) => {
                tracing::warn!(turns, error = %error, "report export failed");
                ExportEvent::Failed {
                    detail: error.detail(),
                }
            }
        };
        sink.emit(event);
    }

    pub(crate) fn apply(
        &self,
        writer: &mut TimelineWriter<'_>,
        event: ExportEvent,
    ) -> TimelineResult<Applied> {
        match event {
            ExportEvent::Ready(artifact) => Ok(Applied {
                change: Some(writer.append(Turn::assistant(
                    self.profile.export_success(&artifact.file_name),
                ))?),
                effect: Some(SessionEffect::Exported(artifact)),
            }),
            ExportEvent::Failed { detail } => Ok(Applied {
                change: Some(
                    writer.append(Turn::assistant(self.profile.export_failure(&detail)))?,
                ),
                effect: None,
            }),
        }
    }
}
