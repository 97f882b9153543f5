use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WorkflowError;
use crate::registry::Registry;
use crate::subject::Subject;
use crate::workflow::{Context, Event, Marking, Phase};

use super::envelope::{Envelope, WorkflowEventView, kind_for_type_key};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRef {
    pub name: String,
}

/// A serializable snapshot of a translated event.
///
/// The workflow is stored by name only; [`EventRecord::restore`] resolves it
/// again through a [`Registry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_type: String,
    pub phase: Phase,
    pub subject_type: String,
    pub subject: Value,
    pub marking: Marking,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(default)]
    pub context: Context,
    pub workflow: WorkflowRef,
    pub recorded_at: DateTime<Utc>,
}

impl EventRecord {
    pub fn capture(envelope: &Envelope<'_>) -> Self {
        let event = envelope.event();
        Self {
            event_type: envelope.type_key().to_string(),
            phase: event.phase(),
            subject_type: event.subject().subject_type().to_string(),
            subject: event.subject().snapshot(),
            marking: event.marking().clone(),
            transition: event.transition().map(|t| t.name().to_string()),
            place: event.place().map(str::to_string),
            context: event.context().clone(),
            workflow: WorkflowRef {
                name: event.workflow_name().to_string(),
            },
            recorded_at: Utc::now(),
        }
    }

    /// Rebuilds the envelope around `subject`, re-resolving the workflow by name.
    pub fn restore<'a>(
        &self,
        registry: &'a Registry,
        subject: &'a dyn Subject,
    ) -> Result<Envelope<'a>, WorkflowError> {
        let engine = registry.engine_for(subject, Some(&self.workflow.name))?;
        let definition = engine.definition();

        let transition = self
            .transition
            .as_deref()
            .map(|name| engine.transition(name))
            .transpose()?;
        engine.check_marking(&self.marking)?;

        let mut event = Event::new(
            self.phase,
            subject,
            self.marking.clone(),
            transition,
            definition,
            self.context.clone(),
        );
        if let Some(place) = &self.place {
            let place = definition
                .places()
                .iter()
                .find(|p| *p == place)
                .ok_or_else(|| WorkflowError::InvalidMarking {
                    workflow: definition.name().to_string(),
                    message: format!("place \"{place}\" is not defined"),
                })?;
            event = event.with_place(place);
        }

        let kind = kind_for_type_key(&self.event_type);
        Ok(Envelope::translate(kind, event))
    }
}
