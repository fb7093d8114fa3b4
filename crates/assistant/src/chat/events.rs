use std::fmt;

use plantai_backend::Diagnosis;

/// Identifier for one upload, follow-up or export run.
///
/// A fresh id is issued for every operation so late events from a superseded
/// run can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(pub u64);

impl OperationId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Upload,
    FollowUp,
    Export,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Upload => "upload",
            Self::FollowUp => "follow-up",
            Self::Export => "export",
        })
    }
}

/// Outcome of the analyze request.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    Diagnosed(Diagnosis),
    Failed { detail: String },
}

/// Progress of one streamed answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUpEvent {
    /// The service accepted the request and the body started.
    Opened,
    Fragment(String),
    Completed,
    /// The request failed before any text arrived.
    Failed { detail: String },
    /// The body broke off after it had started.
    Interrupted { detail: String },
}

/// Binary report ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEvent {
    Ready(ReportArtifact),
    Failed { detail: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEventPayload {
    Upload(UploadEvent),
    FollowUp(FollowUpEvent),
    Export(ExportEvent),
}

impl SessionEventPayload {
    /// Returns true for events after which the operation produces nothing more.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Upload(_) | Self::Export(_) => true,
            Self::FollowUp(event) => !matches!(
                event,
                FollowUpEvent::Opened | FollowUpEvent::Fragment(_)
            ),
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Upload(_) => OperationKind::Upload,
            Self::FollowUp(_) => OperationKind::FollowUp,
            Self::Export(_) => OperationKind::Export,
        }
    }

    /// Failure used when a worker ends without reporting an outcome.
    pub fn abandoned(kind: OperationKind, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match kind {
            OperationKind::Upload => UploadEvent::Failed { detail }.into(),
            OperationKind::FollowUp => FollowUpEvent::Interrupted { detail }.into(),
            OperationKind::Export => ExportEvent::Failed { detail }.into(),
        }
    }
}

impl From<UploadEvent> for SessionEventPayload {
    fn from(event: UploadEvent) -> Self {
        Self::Upload(event)
    }
}

impl From<FollowUpEvent> for SessionEventPayload {
    fn from(event: FollowUpEvent) -> Self {
        Self::FollowUp(event)
    }
}

impl From<ExportEvent> for SessionEventPayload {
    fn from(event: ExportEvent) -> Self {
        Self::Export(event)
    }
}

/// Event routed from an operation worker back to the session owner.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub operation: OperationId,
    pub payload: SessionEventPayload,
}

impl SessionEvent {
    pub fn new(operation: OperationId, payload: impl Into<SessionEventPayload>) -> Self {
        Self {
            operation,
            payload: payload.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_progress_is_not_terminal() {
        assert!(!SessionEventPayload::from(FollowUpEvent::Opened).is_terminal());
        assert!(!SessionEventPayload::from(FollowUpEvent::Fragment("a".into())).is_terminal());
        assert!(SessionEventPayload::from(FollowUpEvent::Completed).is_terminal());
        assert!(
            SessionEventPayload::from(UploadEvent::Failed {
                detail: "x".into()
            })
            .is_terminal()
        );
    }

    #[test]
    fn abandoned_events_match_their_operation() {
        for kind in [
            OperationKind::Upload,
            OperationKind::FollowUp,
            OperationKind::Export,
        ] {
            let payload = SessionEventPayload::abandoned(kind, "gone");
            assert_eq!(payload.kind(), kind);
            assert!(payload.is_terminal());
        }
    }
}
