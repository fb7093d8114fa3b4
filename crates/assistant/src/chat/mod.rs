/// Event contracts between operation workers and the session owner.
pub mod events;
/// Conversation turns and the timeline mutation contract.
pub mod message;

pub use events::{
    ExportEvent, FollowUpEvent, OperationId, OperationKind, ReportArtifact, SessionEvent,
    SessionEventPayload, UploadEvent,
};
pub use message::{
    Origin, Timeline, TimelineChange, TimelineError, TimelineResult, TimelineWriter, Turn,
};
