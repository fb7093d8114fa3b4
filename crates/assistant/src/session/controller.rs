use std::sync::Arc;
use std::time::Duration;

use plantai_backend::{DEFAULT_CHUNK_TIMEOUT, DiagnosisBackend, GenerateRequest, ImageUpload};
use snafu::{ResultExt, ensure};

use crate::chat::{
    OperationId, OperationKind, Origin, ReportArtifact, SessionEvent, SessionEventPayload,
    Timeline, TimelineChange, Turn,
};
use crate::locale::{self, LanguageCode, LocaleProfile};
use crate::session::export::ReportExporter;
use crate::session::follow_up::{FollowUpOrchestrator, compose_prompt};
use crate::session::handle::{EventSink, OperationHandle};
use crate::session::state::{Activity, ActivityTransition};
use crate::session::upload::UploadOrchestrator;
use crate::session::{
    BusySnafu, DiagnosisEstablishedSnafu, LocaleSnafu, NoDiagnosisSnafu, NothingToExportSnafu,
    SessionEffect, SessionResult, TimelineSnafu,
};

const ABANDONED_DETAIL: &str = "the operation ended before reporting a result";

#[derive(Debug)]
enum Orchestrator {
    Upload(UploadOrchestrator),
    FollowUp(FollowUpOrchestrator),
    Export(ReportExporter),
}

#[derive(Debug)]
struct ActiveOperation {
    id: OperationId,
    orchestrator: Orchestrator,
}

impl ActiveOperation {
    fn kind(&self) -> OperationKind {
        match self.orchestrator {
            Orchestrator::Upload(_) => OperationKind::Upload,
            Orchestrator::FollowUp(_) => OperationKind::FollowUp,
            Orchestrator::Export(_) => OperationKind::Export,
        }
    }
}

/// Sole owner of one conversation.
///
/// The controller holds the timeline, the diagnosis context, the active
/// language and the busy state. Operations are started synchronously and
/// return an [`OperationHandle`]; their outcomes come back as
/// [`SessionEvent`]s that only the controller applies.
pub struct SessionController {
    backend: Arc<dyn DiagnosisBackend>,
    timeline: Timeline,
    diagnosis_context: String,
    language: LanguageCode,
    activity: Activity,
    diagnosis_established: bool,
    active: Option<ActiveOperation>,
    next_operation: u64,
    chunk_timeout: Duration,
    artifact: Option<ReportArtifact>,
}

impl SessionController {
    /// Creates a session showing the greeting of `language`.
    ///
    /// Fails when any locale is missing a template.
    pub fn new(backend: Arc<dyn DiagnosisBackend>, language: LanguageCode) -> SessionResult<Self> {
        locale::validate_profiles().context(LocaleSnafu {
            stage: "session-new",
        })?;

        tracing::debug!(backend = backend.name(), language = %language, "session created");
        Ok(Self {
            backend,
            timeline: Timeline::new(greeting(language)),
            diagnosis_context: String::new(),
            language,
            activity: Activity::Idle,
            diagnosis_established: false,
            active: None,
            next_operation: 0,
            chunk_timeout: DEFAULT_CHUNK_TIMEOUT,
            artifact: None,
        })
    }

    pub fn with_chunk_timeout(mut self, chunk_timeout: Duration) -> Self {
        self.chunk_timeout = chunk_timeout;
        self
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn language(&self) -> LanguageCode {
        self.language
    }

    pub fn profile(&self) -> &'static LocaleProfile {
        self.language.profile()
    }

    pub fn diagnosis_context(&self) -> &str {
        &self.diagnosis_context
    }

    pub fn diagnosis_established(&self) -> bool {
        self.diagnosis_established
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.activity, Activity::Uploading(_))
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.activity, Activity::Streaming(_))
    }

    pub fn is_exporting(&self) -> bool {
        matches!(self.activity, Activity::Exporting(_))
    }

    pub fn can_upload(&self) -> bool {
        self.activity.is_idle() && !self.diagnosis_established
    }

    pub fn can_ask(&self) -> bool {
        self.activity.is_idle() && self.diagnosis_established
    }

    /// Hands out the last exported report, if any.
    pub fn take_artifact(&mut self) -> Option<ReportArtifact> {
        self.artifact.take()
    }

    /// Starts an upload: shows the user's image turn and a pending placeholder.
    pub fn diagnose(&mut self, image: ImageUpload) -> SessionResult<OperationHandle> {
        self.ensure_idle(OperationKind::Upload)?;
        ensure!(
            !self.diagnosis_established,
            DiagnosisEstablishedSnafu {
                stage: "session-diagnose",
            }
        );

        let upload = UploadOrchestrator::new(self.profile());
        let opening = upload
            .begin(&mut self.timeline.writer(), &image.file_name)
            .context(TimelineSnafu {
                stage: "session-diagnose",
            })?;
        let operation = self.claim(Orchestrator::Upload(upload));
        let (sink, events) = EventSink::channel(operation);

        tracing::info!(operation = %operation, file = %image.file_name, language = %self.language, "upload started");
        Ok(OperationHandle {
            operation,
            kind: OperationKind::Upload,
            opening,
            events,
            worker: Box::pin(UploadOrchestrator::run(
                Arc::clone(&self.backend),
                image,
                self.language.as_str().to_string(),
                sink,
            )),
        })
    }

    /// Starts a follow-up question.
    ///
    /// Blank input is ignored and returns `Ok(None)` without touching the
    /// session, even while another operation is running.
    pub fn ask(&mut self, question: &str) -> SessionResult<Option<OperationHandle>> {
        if question.trim().is_empty() {
            return Ok(None);
        }

        self.ensure_idle(OperationKind::FollowUp)?;
        ensure!(
            self.diagnosis_established,
            NoDiagnosisSnafu {
                stage: "session-ask",
            }
        );

        let follow_up = FollowUpOrchestrator::new(self.profile());
        let opening = follow_up
            .begin(&mut self.timeline.writer(), question)
            .context(TimelineSnafu {
                stage: "session-ask",
            })?;
        let request = GenerateRequest {
            input: compose_prompt(&self.diagnosis_context, question),
            language: self.language.as_str().to_string(),
        };
        let operation = self.claim(Orchestrator::FollowUp(follow_up));
        let (sink, events) = EventSink::channel(operation);

        tracing::info!(operation = %operation, language = %self.language, "follow-up started");
        Ok(Some(OperationHandle {
            operation,
            kind: OperationKind::FollowUp,
            opening,
            events,
            worker: Box::pin(FollowUpOrchestrator::run(
                Arc::clone(&self.backend),
                request,
                self.chunk_timeout,
                sink,
            )),
        }))
    }

    /// Sends the current transcript to the report service.
    pub fn export(&mut self) -> SessionResult<OperationHandle> {
        self.ensure_idle(OperationKind::Export)?;
        ensure!(
            self.timeline
                .turns()
                .iter()
                .any(|turn| turn.origin == Origin::User),
            NothingToExportSnafu {
                stage: "session-export",
            }
        );

        let request = ReportExporter::request(self.timeline.turns(), self.language);
        let operation = self.claim(Orchestrator::Export(ReportExporter::new(self.profile())));
        let (sink, events) = EventSink::channel(operation);

        tracing::info!(operation = %operation, turns = request.messages.len(), "export started");
        Ok(OperationHandle {
            operation,
            kind: OperationKind::Export,
            opening: Vec::new(),
            events,
            worker: Box::pin(ReportExporter::run(Arc::clone(&self.backend), request, sink)),
        })
    }

    /// Applies one worker event to the timeline.
    ///
    /// Events for anything other than the running operation are dropped.
    /// A terminal event releases the busy state.
    pub fn apply(&mut self, event: SessionEvent) -> Option<TimelineChange> {
        let SessionEvent { operation, payload } = event;
        let Some(active) = self
            .active
            .as_mut()
            .filter(|active| active.id == operation)
        else {
            tracing::debug!(operation = %operation, kind = %payload.kind(), "dropping stale session event");
            return None;
        };

        let terminal = payload.is_terminal();
        let mut writer = self.timeline.writer();
        let applied = match (&mut active.orchestrator, payload) {
            (Orchestrator::Upload(upload), SessionEventPayload::Upload(event)) => {
                upload.apply(&mut writer, event)
            }
            (Orchestrator::FollowUp(follow_up), SessionEventPayload::FollowUp(event)) => {
                follow_up.apply(&mut writer, event)
            }
            (Orchestrator::Export(exporter), SessionEventPayload::Export(event)) => {
                exporter.apply(&mut writer, event)
            }
            (_, payload) => {
                tracing::warn!(operation = %operation, kind = %payload.kind(), "event does not match the running operation");
                return None;
            }
        };

        let change = match applied {
            Ok(applied) => {
                if let Some(effect) = applied.effect {
                    self.apply_effect(effect);
                }
                applied.change
            }
            Err(error) => {
                tracing::error!(operation = %operation, error = %error, "timeline rejected an operation event");
                None
            }
        };

        if terminal {
            self.release(operation);
        }
        change
    }

    /// Releases `operation` after its worker is gone.
    ///
    /// If no terminal event arrived, the open placeholder is resolved with an
    /// error first. Calling this for an operation that already finished is a
    /// no-op.
    pub fn finish_operation(&mut self, operation: OperationId) -> Option<TimelineChange> {
        let kind = self
            .active
            .as_ref()
            .filter(|active| active.id == operation)
            .map(ActiveOperation::kind)?;

        tracing::warn!(operation = %operation, kind = %kind, "operation ended without an outcome");
        let change = self.apply(SessionEvent::new(
            operation,
            SessionEventPayload::abandoned(kind, ABANDONED_DETAIL),
        ));
        self.release(operation);
        change
    }

    /// Runs an operation to completion, reporting every timeline change.
    pub async fn drive<F>(&mut self, handle: OperationHandle, mut on_change: F)
    where
        F: FnMut(&Timeline, &TimelineChange),
    {
        let OperationHandle {
            operation,
            kind,
            opening,
            mut events,
            worker,
        } = handle;

        for change in &opening {
            on_change(&self.timeline, change);
        }

        let task = tokio::spawn(worker);
        while let Some(event) = events.recv().await {
            if let Some(change) = self.apply(event) {
                on_change(&self.timeline, &change);
            }
        }

        if let Err(error) = task.await {
            tracing::error!(operation = %operation, kind = %kind, error = %error, "operation worker failed");
        }

        if let Some(change) = self.finish_operation(operation) {
            on_change(&self.timeline, &change);
        }
    }

    /// Returns to a fresh conversation in the current language.
    ///
    /// An operation still in flight keeps running, but its events are stale
    /// from here on.
    pub fn restart(&mut self) -> TimelineChange {
        if let Some(active) = self.active.take() {
            tracing::info!(operation = %active.id, kind = %active.kind(), "restart abandons in-flight operation");
        }

        self.activity = self
            .activity
            .apply(ActivityTransition::Reset)
            .unwrap_or_default();
        self.diagnosis_established = false;
        self.diagnosis_context.clear();
        self.artifact = None;
        self.timeline.reset(greeting(self.language))
    }

    /// Switches the active language.
    ///
    /// Before a diagnosis exists the greeting is re-rendered in the new
    /// language. Generated content is never retranslated.
    pub fn set_language(&mut self, language: LanguageCode) -> Option<TimelineChange> {
        if language == self.language {
            return None;
        }

        tracing::info!(from = %self.language, to = %language, "language changed");
        self.language = language;
        if self.diagnosis_established || !self.activity.is_idle() {
            return None;
        }
        Some(self.timeline.reset(greeting(language)))
    }

    fn ensure_idle(&self, attempted: OperationKind) -> SessionResult<()> {
        match self.activity.kind() {
            Some(active) => BusySnafu {
                stage: "session-ensure-idle",
                active,
                attempted,
            }
            .fail(),
            None => Ok(()),
        }
    }

    fn claim(&mut self, orchestrator: Orchestrator) -> OperationId {
        self.next_operation += 1;
        let active = ActiveOperation {
            id: OperationId::new(self.next_operation),
            orchestrator,
        };
        let transition = ActivityTransition::Begin {
            kind: active.kind(),
            operation: active.id,
        };

        match self.activity.apply(transition) {
            Ok(next) => self.activity = next,
            Err(rejection) => {
                tracing::error!(?rejection, "activity refused a checked operation start");
            }
        }

        let id = active.id;
        self.active = Some(active);
        id
    }

    fn release(&mut self, operation: OperationId) {
        match self.activity.apply(ActivityTransition::Finish(operation)) {
            Ok(next) => {
                self.activity = next;
                self.active = None;
                tracing::debug!(operation = %operation, "operation released");
            }
            Err(rejection) => {
                tracing::debug!(operation = %operation, ?rejection, "operation already released");
            }
        }
    }

    fn apply_effect(&mut self, effect: SessionEffect) {
        match effect {
            SessionEffect::Diagnosed { narrative } => {
                self.diagnosis_context = narrative;
                self.diagnosis_established = true;
            }
            SessionEffect::Answered { text } => self.diagnosis_context = text,
            SessionEffect::Exported(artifact) => self.artifact = Some(artifact),
        }
    }
}

fn greeting(language: LanguageCode) -> Turn {
    Turn::assistant(language.profile().greeting)
}
