use tracing::trace;

use crate::error::DispatchError;
use crate::workflow::{Dispatcher, Event};

use super::envelope::Envelope;
use super::names;

/// An external bus addressing listeners by string name.
///
/// `name = None` is a plain dispatch: the bus keys it by
/// [`Envelope::type_key`]. Listeners may mutate the envelope (a guard veto);
/// the adapter hands the mutated event back to the engine.
pub trait EventBus: Send + Sync {
    fn publish(&self, event: &mut Envelope<'_>, name: Option<&str>) -> Result<(), DispatchError>;
}

/// Re-publishes engine events onto an [`EventBus`].
///
/// The engine dispatches each event under `workflow.{phase}`,
/// `workflow.{name}.{phase}` and, where a qualifier applies,
/// `workflow.{name}.{phase}.{qualifier}`. Only the first of those also
/// triggers the plain dispatch, so type-addressed listeners see each event
/// exactly once.
#[derive(Debug)]
pub struct DispatcherAdapter<B> {
    bus: B,
}

impl<B: EventBus> DispatcherAdapter<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Picks the envelope from the phase spelled in `name`, falling back to
    /// the generic envelope when there is no name or no known phase in it.
    pub fn translate<'a>(name: Option<&str>, event: Event<'a>) -> Envelope<'a> {
        Envelope::translate(name.and_then(names::parse_phase), event)
    }
}

impl<B: EventBus> Dispatcher for DispatcherAdapter<B> {
    fn dispatch<'a>(
        &self,
        event: Event<'a>,
        name: Option<&str>,
    ) -> Result<Event<'a>, DispatchError> {
        let mut envelope = Self::translate(name, event);

        if name.is_some_and(names::is_plain_name) {
            trace!(key = envelope.type_key(), "publishing plain event");
            self.bus.publish(&mut envelope, None)?;
        }

        trace!(name = name.unwrap_or(envelope.type_key()), "publishing event");
        self.bus.publish(&mut envelope, name)?;

        Ok(envelope.into_event())
    }
}
