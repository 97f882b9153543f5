//! Phase-specific envelopes handed to external bus listeners.
//!
//! Every envelope owns the engine [`Event`] it was translated from and
//! forwards the fixed accessor set of [`WorkflowEventView`] to it, so nothing
//! the engine put on the event is lost in translation.

use serde_json::Value;

use crate::subject::Subject;
use crate::workflow::{
    Context, Definition, Event, Marking, MetadataTarget, Phase, Transition, TransitionBlocker,
};

/// Read access shared by every envelope type.
pub trait WorkflowEventView<'a> {
    fn event(&self) -> &Event<'a>;

    fn subject(&self) -> &'a dyn Subject {
        self.event().subject()
    }

    fn marking<'s>(&'s self) -> &'s Marking
    where
        'a: 's,
    {
        self.event().marking()
    }

    fn transition(&self) -> Option<&'a Transition> {
        self.event().transition()
    }

    fn workflow(&self) -> &'a Definition {
        self.event().workflow()
    }

    fn workflow_name(&self) -> &'a str {
        self.event().workflow_name()
    }

    fn context<'s>(&'s self) -> &'s Context
    where
        'a: 's,
    {
        self.event().context()
    }

    fn metadata(&self, key: &str, target: MetadataTarget<'_>) -> Option<&'a Value> {
        self.event().metadata(key, target)
    }
}

macro_rules! envelope {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name<'a> {
            event: Event<'a>,
        }

        impl<'a> $name<'a> {
            pub const TYPE_KEY: &'static str = stringify!($name);

            pub fn from_event(event: Event<'a>) -> Self {
                Self { event }
            }

            pub fn into_event(self) -> Event<'a> {
                self.event
            }
        }

        impl<'a> WorkflowEventView<'a> for $name<'a> {
            fn event(&self) -> &Event<'a> {
                &self.event
            }
        }
    };
}

envelope!(
    /// Raised before anything changes. Listeners may veto the transition.
    GuardEvent
);
envelope!(
    /// One per place being vacated.
    LeaveEvent
);
envelope!(TransitionEvent);
envelope!(
    /// One per place being occupied.
    EnterEvent
);
envelope!(EnteredEvent);
envelope!(CompletedEvent);
envelope!(
    /// Names a transition enabled by the marking just reached.
    AnnounceEvent
);
envelope!(
    /// Fallback for names outside the phase vocabulary.
    WorkflowEvent
);

impl GuardEvent<'_> {
    /// Vetoes the transition. The engine fails it with `TransitionBlocked`.
    pub fn set_blocked(&mut self, reason: impl Into<String>) {
        self.event.block(reason);
    }

    pub fn is_blocked(&self) -> bool {
        self.event.is_blocked()
    }

    pub fn blockers(&self) -> &[TransitionBlocker] {
        self.event.blockers()
    }
}

impl<'a> LeaveEvent<'a> {
    pub fn place(&self) -> Option<&'a str> {
        self.event.place()
    }
}

impl<'a> EnterEvent<'a> {
    pub fn place(&self) -> Option<&'a str> {
        self.event.place()
    }
}

/// An engine event translated for one dispatch.
#[derive(Debug, Clone)]
pub enum Envelope<'a> {
    Guard(GuardEvent<'a>),
    Leave(LeaveEvent<'a>),
    Transition(TransitionEvent<'a>),
    Enter(EnterEvent<'a>),
    Entered(EnteredEvent<'a>),
    Completed(CompletedEvent<'a>),
    Announce(AnnounceEvent<'a>),
    Generic(WorkflowEvent<'a>),
}

impl<'a> Envelope<'a> {
    /// Wraps `event` in the envelope of `kind`, or the generic one when `None`.
    pub fn translate(kind: Option<Phase>, event: Event<'a>) -> Self {
        match kind {
            Some(Phase::Guard) => Envelope::Guard(GuardEvent::from_event(event)),
            Some(Phase::Leave) => Envelope::Leave(LeaveEvent::from_event(event)),
            Some(Phase::Transition) => Envelope::Transition(TransitionEvent::from_event(event)),
            Some(Phase::Enter) => Envelope::Enter(EnterEvent::from_event(event)),
            Some(Phase::Entered) => Envelope::Entered(EnteredEvent::from_event(event)),
            Some(Phase::Completed) => Envelope::Completed(CompletedEvent::from_event(event)),
            Some(Phase::Announce) => Envelope::Announce(AnnounceEvent::from_event(event)),
            None => Envelope::Generic(WorkflowEvent::from_event(event)),
        }
    }

    /// The phase this envelope was translated for. `None` for the generic envelope.
    pub fn kind(&self) -> Option<Phase> {
        match self {
            Envelope::Guard(_) => Some(Phase::Guard),
            Envelope::Leave(_) => Some(Phase::Leave),
            Envelope::Transition(_) => Some(Phase::Transition),
            Envelope::Enter(_) => Some(Phase::Enter),
            Envelope::Entered(_) => Some(Phase::Entered),
            Envelope::Completed(_) => Some(Phase::Completed),
            Envelope::Announce(_) => Some(Phase::Announce),
            Envelope::Generic(_) => None,
        }
    }

    /// The key plain (type-addressed) listeners subscribe under.
    pub fn type_key(&self) -> &'static str {
        type_key_for(self.kind())
    }

    pub fn into_event(self) -> Event<'a> {
        match self {
            Envelope::Guard(e) => e.into_event(),
            Envelope::Leave(e) => e.into_event(),
            Envelope::Transition(e) => e.into_event(),
            Envelope::Enter(e) => e.into_event(),
            Envelope::Entered(e) => e.into_event(),
            Envelope::Completed(e) => e.into_event(),
            Envelope::Announce(e) => e.into_event(),
            Envelope::Generic(e) => e.into_event(),
        }
    }

    pub fn as_guard_mut(&mut self) -> Option<&mut GuardEvent<'a>> {
        match self {
            Envelope::Guard(guard) => Some(guard),
            _ => None,
        }
    }
}

impl<'a> WorkflowEventView<'a> for Envelope<'a> {
    fn event(&self) -> &Event<'a> {
        match self {
            Envelope::Guard(e) => e.event(),
            Envelope::Leave(e) => e.event(),
            Envelope::Transition(e) => e.event(),
            Envelope::Enter(e) => e.event(),
            Envelope::Entered(e) => e.event(),
            Envelope::Completed(e) => e.event(),
            Envelope::Announce(e) => e.event(),
            Envelope::Generic(e) => e.event(),
        }
    }
}

pub fn type_key_for(kind: Option<Phase>) -> &'static str {
    match kind {
        Some(Phase::Guard) => GuardEvent::TYPE_KEY,
        Some(Phase::Leave) => LeaveEvent::TYPE_KEY,
        Some(Phase::Transition) => TransitionEvent::TYPE_KEY,
        Some(Phase::Enter) => EnterEvent::TYPE_KEY,
        Some(Phase::Entered) => EnteredEvent::TYPE_KEY,
        Some(Phase::Completed) => CompletedEvent::TYPE_KEY,
        Some(Phase::Announce) => AnnounceEvent::TYPE_KEY,
        None => WorkflowEvent::TYPE_KEY,
    }
}

/// Inverse of [`type_key_for`]. Unknown keys map to the generic envelope.
pub fn kind_for_type_key(key: &str) -> Option<Phase> {
    Phase::ALL
        .into_iter()
        .find(|phase| type_key_for(Some(*phase)) == key)
}
