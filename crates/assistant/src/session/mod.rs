use snafu::Snafu;

use crate::chat::{OperationKind, ReportArtifact, TimelineChange, TimelineError};
use crate::locale::LocaleError;

mod controller;
mod export;
mod follow_up;
mod handle;
mod state;
mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::SessionController;
pub use export::REPORT_FILE_NAME;
pub use follow_up::compose_prompt;
pub use handle::{OperationHandle, OperationWorker};
pub use state::{Activity, ActivityRejection, ActivityResult, ActivityTransition};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SessionError {
    #[snafu(display("cannot start {attempted} while {active} is in flight"))]
    Busy {
        stage: &'static str,
        active: OperationKind,
        attempted: OperationKind,
    },
    #[snafu(display("a diagnosis already exists; restart to upload another image"))]
    DiagnosisEstablished { stage: &'static str },
    #[snafu(display("upload an image before asking follow-up questions"))]
    NoDiagnosis { stage: &'static str },
    #[snafu(display("the conversation has nothing to export yet"))]
    NothingToExport { stage: &'static str },
    #[snafu(display("timeline rejected a mutation on `{stage}`: {source}"))]
    Timeline {
        stage: &'static str,
        source: TimelineError,
    },
    #[snafu(display("locale table is incomplete: {source}"))]
    Locale {
        stage: &'static str,
        source: LocaleError,
    },
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Session-level consequence of a successfully applied outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionEffect {
    Diagnosed { narrative: String },
    Answered { text: String },
    Exported(ReportArtifact),
}

/// What an orchestrator did with one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Applied {
    pub change: Option<TimelineChange>,
    pub effect: Option<SessionEffect>,
}
