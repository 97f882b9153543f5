use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DispatchError;
use crate::subject::Subject;

use super::definition::{Definition, MetadataTarget, Transition};
use super::marking::Marking;

/// Caller-supplied context forwarded with every event of an `apply` call.
pub type Context = Map<String, Value>;

/// The lifecycle phases of a transition, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Guard,
    Leave,
    Transition,
    Enter,
    Entered,
    Completed,
    Announce,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Guard,
        Phase::Leave,
        Phase::Transition,
        Phase::Enter,
        Phase::Entered,
        Phase::Completed,
        Phase::Announce,
    ];

    /// The canonical event-name token of this phase.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Guard => "guard",
            Phase::Leave => "leave",
            Phase::Transition => "transition",
            Phase::Enter => "enter",
            Phase::Entered => "entered",
            Phase::Completed => "completed",
            Phase::Announce => "announce",
        }
    }

    /// Case-insensitive match against the phase vocabulary.
    pub fn from_token(token: &str) -> Option<Phase> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a transition cannot fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockerCode {
    /// Some "from" place is not occupied.
    MarkingMismatch,
    /// The transition's configured guard denied it.
    GuardDenied,
    /// A guard-phase listener vetoed it during dispatch.
    Vetoed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionBlocker {
    pub code: BlockerCode,
    pub message: String,
}

impl TransitionBlocker {
    pub fn new(code: BlockerCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// One lifecycle event produced by the engine.
///
/// Borrows the subject and definition for the duration of the `apply` call
/// that produced it. The marking is a snapshot taken at emission time.
#[derive(Clone)]
pub struct Event<'a> {
    phase: Phase,
    subject: &'a dyn Subject,
    marking: Marking,
    transition: Option<&'a Transition>,
    place: Option<&'a str>,
    definition: &'a Definition,
    context: Context,
    blockers: Vec<TransitionBlocker>,
}

impl<'a> Event<'a> {
    pub fn new(
        phase: Phase,
        subject: &'a dyn Subject,
        marking: Marking,
        transition: Option<&'a Transition>,
        definition: &'a Definition,
        context: Context,
    ) -> Self {
        Self {
            phase,
            subject,
            marking,
            transition,
            place: None,
            definition,
            context,
            blockers: Vec::new(),
        }
    }

    pub fn with_place(mut self, place: &'a str) -> Self {
        self.place = Some(place);
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn subject(&self) -> &'a dyn Subject {
        self.subject
    }

    pub fn marking(&self) -> &Marking {
        &self.marking
    }

    pub fn transition(&self) -> Option<&'a Transition> {
        self.transition
    }

    /// The place being left or entered, for leave and enter events.
    pub fn place(&self) -> Option<&'a str> {
        self.place
    }

    pub fn workflow(&self) -> &'a Definition {
        self.definition
    }

    pub fn workflow_name(&self) -> &'a str {
        self.definition.name()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn metadata(&self, key: &str, target: MetadataTarget<'_>) -> Option<&'a Value> {
        self.definition.metadata(key, target)
    }

    /// The trailing name segment: the transition for guard, transition and
    /// announce events, the place for leave and enter events.
    pub fn qualifier(&self) -> Option<&'a str> {
        match self.phase {
            Phase::Guard | Phase::Transition | Phase::Announce => {
                self.transition.map(Transition::name)
            }
            Phase::Leave | Phase::Enter => self.place,
            Phase::Entered | Phase::Completed => None,
        }
    }

    pub fn blockers(&self) -> &[TransitionBlocker] {
        &self.blockers
    }

    pub fn is_blocked(&self) -> bool {
        !self.blockers.is_empty()
    }

    pub(crate) fn block(&mut self, message: impl Into<String>) {
        self.blockers
            .push(TransitionBlocker::new(BlockerCode::Vetoed, message));
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("phase", &self.phase)
            .field("workflow", &self.definition.name())
            .field("subject_type", &self.subject.subject_type())
            .field("marking", &self.marking)
            .field("transition", &self.transition.map(Transition::name))
            .field("place", &self.place)
            .field("blockers", &self.blockers)
            .finish()
    }
}

/// Receives every event the engine emits, once per structured name.
///
/// The event is handed over by value and must be handed back so that veto
/// state set by listeners reaches the engine.
pub trait Dispatcher: Send + Sync {
    fn dispatch<'a>(
        &self,
        event: Event<'a>,
        name: Option<&str>,
    ) -> Result<Event<'a>, DispatchError>;
}
