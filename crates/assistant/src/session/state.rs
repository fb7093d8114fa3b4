use crate::chat::{OperationId, OperationKind};

/// Busy state of a session; at most one operation runs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activity {
    #[default]
    Idle,
    Uploading(OperationId),
    Streaming(OperationId),
    Exporting(OperationId),
}

/// State transition input for the activity lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityTransition {
    Begin {
        kind: OperationKind,
        operation: OperationId,
    },
    Finish(OperationId),
    Reset,
}

/// Rejection reason for illegal activity transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityRejection {
    Busy {
        active: Activity,
        attempted: OperationKind,
    },
    NoActiveOperation,
    OperationMismatch {
        active: OperationId,
        attempted: OperationId,
    },
}

pub type ActivityResult = Result<Activity, ActivityRejection>;

impl Activity {
    pub fn active_operation(&self) -> Option<OperationId> {
        match self {
            Self::Idle => None,
            Self::Uploading(id) | Self::Streaming(id) | Self::Exporting(id) => Some(*id),
        }
    }

    pub fn kind(&self) -> Option<OperationKind> {
        match self {
            Self::Idle => None,
            Self::Uploading(_) => Some(OperationKind::Upload),
            Self::Streaming(_) => Some(OperationKind::FollowUp),
            Self::Exporting(_) => Some(OperationKind::Export),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Applies one transition deterministically.
    ///
    /// `Begin` is only legal from `Idle`; `Finish` must name the running operation.
    pub fn apply(&self, transition: ActivityTransition) -> ActivityResult {
        match transition {
            ActivityTransition::Begin { kind, operation } => self.apply_begin(kind, operation),
            ActivityTransition::Finish(operation) => self.apply_finish(operation),
            ActivityTransition::Reset => Ok(Self::Idle),
        }
    }

    fn apply_begin(&self, kind: OperationKind, operation: OperationId) -> ActivityResult {
        if !self.is_idle() {
            return Err(ActivityRejection::Busy {
                active: *self,
                attempted: kind,
            });
        }

        Ok(match kind {
            OperationKind::Upload => Self::Uploading(operation),
            OperationKind::FollowUp => Self::Streaming(operation),
            OperationKind::Export => Self::Exporting(operation),
        })
    }

    fn apply_finish(&self, operation: OperationId) -> ActivityResult {
        match self.active_operation() {
            Some(active) if active == operation => Ok(Self::Idle),
            Some(active) => Err(ActivityRejection::OperationMismatch {
                active,
                attempted: operation,
            }),
            None => Err(ActivityRejection::NoActiveOperation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn begin(kind: OperationKind, raw: u64) -> ActivityTransition {
        ActivityTransition::Begin {
            kind,
            operation: OperationId::new(raw),
        }
    }

    #[test]
    fn begin_from_idle_enters_the_matching_state() {
        let state = Activity::Idle
            .apply(begin(OperationKind::FollowUp, 3))
            .unwrap();
        assert_eq!(state, Activity::Streaming(OperationId::new(3)));
        assert_eq!(state.kind(), Some(OperationKind::FollowUp));
    }

    #[test]
    fn second_operation_is_rejected_while_busy() {
        let state = Activity::Uploading(OperationId::new(1));
        let rejection = state.apply(begin(OperationKind::FollowUp, 2)).unwrap_err();

        assert_eq!(
            rejection,
            ActivityRejection::Busy {
                active: state,
                attempted: OperationKind::FollowUp,
            }
        );
    }

    #[test]
    fn finish_requires_the_running_operation() {
        let state = Activity::Exporting(OperationId::new(4));

        assert_eq!(
            state.apply(ActivityTransition::Finish(OperationId::new(9))),
            Err(ActivityRejection::OperationMismatch {
                active: OperationId::new(4),
                attempted: OperationId::new(9),
            })
        );
        assert_eq!(
            state.apply(ActivityTransition::Finish(OperationId::new(4))),
            Ok(Activity::Idle)
        );
        assert_eq!(
            Activity::Idle.apply(ActivityTransition::Finish(OperationId::new(4))),
            Err(ActivityRejection::NoActiveOperation)
        );
    }

    #[test]
    fn reset_always_returns_to_idle() {
        let state = Activity::Streaming(OperationId::new(7));
        assert_eq!(state.apply(ActivityTransition::Reset), Ok(Activity::Idle));
        assert_eq!(Activity::Idle.active_operation(), None);
    }
}
