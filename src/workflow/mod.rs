mod definition;
mod engine;
mod event;
mod guard;
mod marking;

pub use definition::{
    Definition, DefinitionBuilder, Metadata, MetadataTarget, Transition, WorkflowKind,
};
pub use engine::{EnabledTransitions, Engine};
pub use event::{BlockerCode, Context, Dispatcher, Event, Phase, TransitionBlocker};
pub use guard::{AttributeGuard, Guard, GuardDecision, GuardRef, GuardTable};
pub use marking::Marking;
