use std::collections::HashMap;
use std::fmt;

use crate::error::DispatchError;
use crate::workflow::Phase;

use super::adapter::EventBus;
use super::envelope::{Envelope, type_key_for};

type Listener = Box<dyn Fn(&mut Envelope<'_>) -> anyhow::Result<()> + Send + Sync>;

/// In-process [`EventBus`]: listeners keyed by name, run in registration order.
///
/// Listeners are registered up front; the bus is read-only once handed to a
/// [`DispatcherAdapter`](super::DispatcherAdapter). The first failing listener
/// stops the dispatch.
#[derive(Default)]
pub struct ListenerBus {
    listeners: HashMap<String, Vec<Listener>>,
}

impl ListenerBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to a structured name such as `workflow.order.enter.paid`.
    pub fn listen<F>(&mut self, name: impl Into<String>, listener: F) -> &mut Self
    where
        F: Fn(&mut Envelope<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.listeners
            .entry(name.into())
            .or_default()
            .push(Box::new(listener));
        self
    }

    /// Subscribes to the plain dispatch of one envelope type (`None` = generic).
    pub fn listen_plain<F>(&mut self, kind: Option<Phase>, listener: F) -> &mut Self
    where
        F: Fn(&mut Envelope<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.listen(type_key_for(kind), listener)
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map_or(0, Vec::len)
    }
}

impl EventBus for ListenerBus {
    fn publish(&self, event: &mut Envelope<'_>, name: Option<&str>) -> Result<(), DispatchError> {
        let key = name.unwrap_or(event.type_key());
        let Some(listeners) = self.listeners.get(key) else {
            return Ok(());
        };
        for listener in listeners {
            listener(&mut *event).map_err(|err| DispatchError::Listener {
                event: key.to_string(),
                message: format!("{err:#}"),
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for ListenerBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self
            .listeners
            .iter()
            .map(|(name, listeners)| (name.as_str(), listeners.len()))
            .collect();
        names.sort_unstable();
        f.debug_struct("ListenerBus")
            .field("listeners", &names)
            .finish()
    }
}
