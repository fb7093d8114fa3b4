use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use plantai_backend::{BackendError, DiagnosisBackend, GenerateRequest};

use crate::chat::{FollowUpEvent, TimelineChange, TimelineResult, TimelineWriter, Turn};
use crate::locale::LocaleProfile;
use crate::session::handle::EventSink;
use crate::session::{Applied, SessionEffect};

const EMPTY_ANSWER_DETAIL: &str = "the service returned an empty answer";

/// Wraps the grounding context and the verbatim question into one request field.
pub fn compose_prompt(context: &str, question: &str) -> String {
    format!("Previous diagnosis/response context: '{context}'. User asks: '{question}'")
}

/// Drives one "question plus context, streamed answer" run.
#[derive(Debug)]
pub(crate) struct FollowUpOrchestrator {
    profile: &'static LocaleProfile,
    answer: String,
}

impl FollowUpOrchestrator {
    pub(crate) fn new(profile: &'static LocaleProfile) -> Self {
        Self {
            profile,
            answer: String::new(),
        }
    }

    pub(crate) fn begin(
        &self,
        writer: &mut TimelineWriter<'_>,
        question: &str,
    ) -> TimelineResult<Vec<TimelineChange>> {
        Ok(vec![
            writer.append(Turn::user(question))?,
            writer.append(Turn::placeholder())?,
        ])
    }

    /// Opens the stream and forwards fragments in arrival order.
    ///
    /// Every wait for the next chunk is bounded by `chunk_timeout`; expiry
    /// counts as an interruption.
    pub(crate) async fn run(
        backend: Arc<dyn DiagnosisBackend>,
        request: GenerateRequest,
        chunk_timeout: Duration,
        sink: EventSink,
    ) {
        let mut stream = match backend.open_stream(request).await {
            Ok(stream) => stream,
            Err(error) => {
                tracing::warn!(error = %error, "follow-up request failed");
                sink.emit(FollowUpEvent::Failed {
                    detail: error.detail(),
                });
                return;
            }
        };

        if !sink.emit(FollowUpEvent::Opened) {
            return;
        }

        loop {
            let next = match tokio::time::timeout(chunk_timeout, stream.next()).await {
                Ok(next) => next,
                Err(_) => Some(Err(BackendError::Timeout {
                    stage: "await-stream-chunk",
                    elapsed: chunk_timeout,
                })),
            };

            match next {
                Some(Ok(fragment)) => {
                    if !sink.emit(FollowUpEvent::Fragment(fragment)) {
                        tracing::debug!("session dropped the follow-up stream");
                        return;
                    }
                }
                Some(Err(error)) => {
                    tracing::warn!(error = %error, "follow-up stream interrupted");
                    sink.emit(FollowUpEvent::Interrupted {
                        detail: error.detail(),
                    });
                    return;
                }
                None => {
                    sink.emit(FollowUpEvent::Completed);
                    return;
                }
            }
        }
    }

    pub(crate) fn apply(
        &mut self,
        writer: &mut TimelineWriter<'_>,
        event: FollowUpEvent,
    ) -> TimelineResult<Applied> {
        let change = match event {
            FollowUpEvent::Opened => Some(writer.settle_last()?),
            FollowUpEvent::Fragment(fragment) => {
                self.answer.push_str(&fragment);
                Some(writer.extend_last(&fragment)?)
            }
            FollowUpEvent::Completed if self.answer.is_empty() => {
                Some(self.fail(writer, EMPTY_ANSWER_DETAIL)?)
            }
            FollowUpEvent::Completed => {
                return Ok(Applied {
                    change: None,
                    effect: Some(SessionEffect::Answered {
                        text: std::mem::take(&mut self.answer),
                    }),
                });
            }
            FollowUpEvent::Failed { detail } | FollowUpEvent::Interrupted { detail } => {
                Some(self.fail(writer, &detail)?)
            }
        };

        Ok(Applied {
            change,
            effect: None,
        })
    }

    /// Errors before any text arrived take over the answer turn; afterwards
    /// they land in a new turn so partial text stays visible.
    fn fail(&self, writer: &mut TimelineWriter<'_>, detail: &str) -> TimelineResult<TimelineChange> {
        let message = self.profile.error(detail);
        if !self.answer.is_empty() {
            writer.append(Turn::assistant(message))
        } else {
            writer.replace_last(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_context_and_verbatim_question() {
        let prompt = compose_prompt("Leaf blight spreads fast.", "  how do I treat it? ");
        assert_eq!(
            prompt,
            "Previous diagnosis/response context: 'Leaf blight spreads fast.'. User asks: '  how do I treat it? '"
        );
    }
}
