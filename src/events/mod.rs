//! Translation of engine events onto a name-addressed external bus.

mod adapter;
mod bus;
mod envelope;
pub mod names;
mod record;

pub use adapter::{DispatcherAdapter, EventBus};
pub use bus::ListenerBus;
pub use envelope::{
    AnnounceEvent, CompletedEvent, EnterEvent, EnteredEvent, Envelope, GuardEvent, LeaveEvent,
    TransitionEvent, WorkflowEvent, WorkflowEventView, kind_for_type_key, type_key_for,
};
pub use record::{EventRecord, WorkflowRef};
