use std::fmt;
use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::chat::{OperationId, OperationKind, SessionEvent, SessionEventPayload, TimelineChange};

/// Background half of an operation; it owns no session state.
pub type OperationWorker = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A started operation.
///
/// `opening` lists the timeline changes applied synchronously when the
/// operation began. The worker must be polled (usually spawned) for `events`
/// to produce anything.
pub struct OperationHandle {
    pub operation: OperationId,
    pub kind: OperationKind,
    pub opening: Vec<TimelineChange>,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
    pub worker: OperationWorker,
}

impl fmt::Debug for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationHandle")
            .field("operation", &self.operation)
            .field("kind", &self.kind)
            .field("opening", &self.opening)
            .finish_non_exhaustive()
    }
}

/// Sending half handed to a worker; every event is tagged with the operation id.
#[derive(Debug, Clone)]
pub(crate) struct EventSink {
    operation: OperationId,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSink {
    pub(crate) fn channel(
        operation: OperationId,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { operation, tx }, rx)
    }

    /// Returns false once the session side has gone away.
    pub(crate) fn emit(&self, payload: impl Into<SessionEventPayload>) -> bool {
        self.tx
            .send(SessionEvent::new(self.operation, payload))
            .is_ok()
    }
}
