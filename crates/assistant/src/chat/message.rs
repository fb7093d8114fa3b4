use snafu::{OptionExt, Snafu, ensure};

/// Chat speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    User,
    Assistant,
}

/// One entry in the conversation.
///
/// `pending` marks an assistant placeholder whose body is still being produced.
/// Once cleared it is never set again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub origin: Origin,
    pub body: String,
    pending: bool,
}

impl Turn {
    pub fn user(body: impl Into<String>) -> Self {
        Self {
            origin: Origin::User,
            body: body.into(),
            pending: false,
        }
    }

    pub fn assistant(body: impl Into<String>) -> Self {
        Self {
            origin: Origin::Assistant,
            body: body.into(),
            pending: false,
        }
    }

    /// Creates an empty assistant placeholder shown while work is in flight.
    pub fn placeholder() -> Self {
        Self {
            origin: Origin::Assistant,
            body: String::new(),
            pending: true,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TimelineError {
    #[snafu(display("cannot mutate the last turn of an empty timeline"))]
    EmptyTimeline { stage: &'static str },
    #[snafu(display("cannot append while the last turn is still pending"))]
    PendingTurnOpen { stage: &'static str },
}

pub type TimelineResult<T> = Result<T, TimelineError>;

/// Describes one applied mutation so renderers can redraw incrementally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineChange {
    /// A turn was pushed at `index`.
    Appended { index: usize },
    /// The last turn's body was replaced and its pending flag cleared.
    Replaced { index: usize },
    /// The last turn's pending flag was cleared without touching its body.
    Settled { index: usize },
    /// `fragment` was appended to the last turn's body.
    Extended { index: usize, fragment: String },
    /// The whole timeline was replaced.
    Reset,
}

/// Ordered log of conversation turns.
///
/// Turns are never removed individually; only the last one may change, and at
/// most one turn (always the last) is pending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    turns: Vec<Turn>,
}

impl Timeline {
    pub fn new(initial: Turn) -> Self {
        Self {
            turns: vec![initial],
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn last_is_pending(&self) -> bool {
        self.turns.last().is_some_and(Turn::is_pending)
    }

    pub fn append(&mut self, turn: Turn) -> TimelineResult<TimelineChange> {
        ensure!(
            !self.last_is_pending(),
            PendingTurnOpenSnafu {
                stage: "timeline-append",
            }
        );
        self.turns.push(turn);
        Ok(TimelineChange::Appended {
            index: self.turns.len() - 1,
        })
    }

    /// Replaces the last turn's body and clears its pending flag.
    pub fn replace_last(&mut self, body: impl Into<String>) -> TimelineResult<TimelineChange> {
        let index = self.last_index("timeline-replace-last")?;
        let turn = &mut self.turns[index];
        turn.body = body.into();
        turn.pending = false;
        Ok(TimelineChange::Replaced { index })
    }

    /// Concatenates `fragment` onto the last turn's body.
    ///
    /// This is the accumulate path used while streaming; it never discards
    /// text that is already shown.
    pub fn extend_last(&mut self, fragment: &str) -> TimelineResult<TimelineChange> {
        let index = self.last_index("timeline-extend-last")?;
        let turn = &mut self.turns[index];
        turn.body.push_str(fragment);
        turn.pending = false;
        Ok(TimelineChange::Extended {
            index,
            fragment: fragment.to_string(),
        })
    }

    pub fn settle_last(&mut self) -> TimelineResult<TimelineChange> {
        let index = self.last_index("timeline-settle-last")?;
        self.turns[index].pending = false;
        Ok(TimelineChange::Settled { index })
    }

    pub fn reset(&mut self, initial: Turn) -> TimelineChange {
        self.turns = vec![initial];
        TimelineChange::Reset
    }

    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Borrows the narrow write capability handed to orchestrators.
    pub fn writer(&mut self) -> TimelineWriter<'_> {
        TimelineWriter { timeline: self }
    }

    fn last_index(&self, stage: &'static str) -> TimelineResult<usize> {
        self.turns
            .len()
            .checked_sub(1)
            .context(EmptyTimelineSnafu { stage })
    }
}

/// Write access to a timeline for the duration of one event.
///
/// It can append and mutate the last turn but cannot reset or read back
/// earlier turns.
pub struct TimelineWriter<'a> {
    timeline: &'a mut Timeline,
}

impl TimelineWriter<'_> {
    pub fn append(&mut self, turn: Turn) -> TimelineResult<TimelineChange> {
        self.timeline.append(turn)
    }

    pub fn replace_last(&mut self, body: impl Into<String>) -> TimelineResult<TimelineChange> {
        self.timeline.replace_last(body)
    }

    pub fn extend_last(&mut self, fragment: &str) -> TimelineResult<TimelineChange> {
        self.timeline.extend_last(fragment)
    }

    pub fn settle_last(&mut self) -> TimelineResult<TimelineChange> {
        self.timeline.settle_last()
    }
}
