use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DefinitionError;

use super::event::Phase;
use super::guard::GuardRef;
use super::marking::Marking;

/// Opaque key/value annotations attached to a workflow, place or transition.
pub type Metadata = BTreeMap<String, Value>;

/// Whether a definition is a state machine or a Petri-net style workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowKind {
    /// Exactly one place is occupied at a time.
    #[default]
    #[serde(alias = "state_machine")]
    SingleState,
    /// Any non-empty subset of places may be occupied.
    #[serde(alias = "workflow")]
    MultiState,
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowKind::SingleState => write!(f, "single-state"),
            WorkflowKind::MultiState => write!(f, "multi-state"),
        }
    }
}

/// Which element a metadata lookup addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataTarget<'a> {
    Workflow,
    Place(&'a str),
    Transition(&'a str),
}

/// A named move from one set of places to another.
#[derive(Debug, Clone)]
pub struct Transition {
    name: String,
    from: Vec<String>,
    to: Vec<String>,
    guard: Option<GuardRef>,
    metadata: Metadata,
}

impl Transition {
    pub fn new<F, T, S>(name: impl Into<String>, from: F, to: T) -> Self
    where
        F: IntoIterator<Item = S>,
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            from: from.into_iter().map(Into::into).collect(),
            to: to.into_iter().map(Into::into).collect(),
            guard: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_guard(mut self, guard: GuardRef) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn from(&self) -> &[String] {
        &self.from
    }

    pub fn to(&self) -> &[String] {
        &self.to
    }

    pub fn guard(&self) -> Option<&GuardRef> {
        self.guard.as_ref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// The immutable description of one named workflow.
///
/// Only constructed through [`DefinitionBuilder::build`], which rejects
/// transitions referencing undeclared places.
#[derive(Debug, Clone)]
pub struct Definition {
    name: String,
    kind: WorkflowKind,
    places: Vec<String>,
    transitions: Vec<Transition>,
    supports: Vec<String>,
    initial_marking: Marking,
    final_marking: Option<Marking>,
    events_to_dispatch: Option<BTreeSet<Phase>>,
    metadata: Metadata,
    place_metadata: BTreeMap<String, Metadata>,
}

impl Definition {
    pub fn builder(name: impl Into<String>, kind: WorkflowKind) -> DefinitionBuilder {
        DefinitionBuilder::new(name, kind)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> WorkflowKind {
        self.kind
    }

    /// Places in declaration order.
    pub fn places(&self) -> &[String] {
        &self.places
    }

    pub fn has_place(&self, place: &str) -> bool {
        self.places.iter().any(|p| p == place)
    }

    /// Transitions in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn transition(&self, name: &str) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.name == name)
    }

    pub fn supports(&self) -> &[String] {
        &self.supports
    }

    pub fn supports_type(&self, subject_type: &str) -> bool {
        self.supports.iter().any(|s| s == subject_type)
    }

    pub fn initial_marking(&self) -> &Marking {
        &self.initial_marking
    }

    pub fn final_marking(&self) -> Option<&Marking> {
        self.final_marking.as_ref()
    }

    /// Guard events are always dispatched; other phases follow `events_to_dispatch`.
    pub fn dispatches(&self, phase: Phase) -> bool {
        phase == Phase::Guard
            || self
                .events_to_dispatch
                .as_ref()
                .is_none_or(|phases| phases.contains(&phase))
    }

    pub fn metadata(&self, key: &str, target: MetadataTarget<'_>) -> Option<&Value> {
        match target {
            MetadataTarget::Workflow => self.metadata.get(key),
            MetadataTarget::Place(place) => self.place_metadata.get(place)?.get(key),
            MetadataTarget::Transition(name) => self.transition(name)?.metadata.get(key),
        }
    }
}

/// Collects a definition and validates it on [`build`](DefinitionBuilder::build).
#[derive(Debug, Clone)]
pub struct DefinitionBuilder {
    name: String,
    kind: WorkflowKind,
    places: Vec<String>,
    transitions: Vec<Transition>,
    supports: Vec<String>,
    initial_marking: Vec<String>,
    final_marking: Option<Vec<String>>,
    events_to_dispatch: Option<BTreeSet<Phase>>,
    metadata: Metadata,
    place_metadata: BTreeMap<String, Metadata>,
}

impl DefinitionBuilder {
    pub fn new(name: impl Into<String>, kind: WorkflowKind) -> Self {
        Self {
            name: name.into(),
            kind,
            places: Vec::new(),
            transitions: Vec::new(),
            supports: Vec::new(),
            initial_marking: Vec::new(),
            final_marking: None,
            events_to_dispatch: None,
            metadata: Metadata::new(),
            place_metadata: BTreeMap::new(),
        }
    }

    pub fn places<I, S>(mut self, places: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.places.extend(places.into_iter().map(Into::into));
        self
    }

    pub fn transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn supports<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supports.extend(types.into_iter().map(Into::into));
        self
    }

    /// Defaults to the first declared place when left empty.
    pub fn initial_marking<I, S>(mut self, places: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.initial_marking = places.into_iter().map(Into::into).collect();
        self
    }

    pub fn final_marking<I, S>(mut self, places: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.final_marking = Some(places.into_iter().map(Into::into).collect());
        self
    }

    pub fn events_to_dispatch(mut self, phases: impl IntoIterator<Item = Phase>) -> Self {
        self.events_to_dispatch = Some(phases.into_iter().collect());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn place_metadata(
        mut self,
        place: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.place_metadata
            .entry(place.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<Definition, DefinitionError> {
        let name = self.name;
        if name.trim().is_empty() {
            return Err(DefinitionError::EmptyName);
        }
        if self.places.is_empty() {
            return Err(DefinitionError::NoPlaces(name));
        }
        if self.supports.is_empty() {
            return Err(DefinitionError::NoSupportedTypes(name));
        }

        let mut known = HashSet::new();
        for place in &self.places {
            if !known.insert(place.as_str()) {
                return Err(DefinitionError::DuplicatePlace {
                    workflow: name,
                    place: place.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for transition in &self.transitions {
            if !seen.insert(transition.name.as_str()) {
                return Err(DefinitionError::DuplicateTransition {
                    workflow: name,
                    transition: transition.name.clone(),
                });
            }
            for (side, places) in [("from", &transition.from), ("to", &transition.to)] {
                if places.is_empty() {
                    return Err(DefinitionError::EmptyArc {
                        workflow: name,
                        transition: transition.name.clone(),
                        side,
                    });
                }
                if let Some(place) = places.iter().find(|p| !known.contains(p.as_str())) {
                    return Err(DefinitionError::UnknownPlace {
                        workflow: name,
                        transition: transition.name.clone(),
                        place: place.clone(),
                    });
                }
                let mut listed = HashSet::new();
                if let Some(place) = places.iter().find(|p| !listed.insert(p.as_str())) {
                    return Err(DefinitionError::DuplicateArcPlace {
                        workflow: name,
                        transition: transition.name.clone(),
                        side,
                        place: place.clone(),
                    });
                }
            }
            if self.kind == WorkflowKind::SingleState
                && (transition.from.len() != 1 || transition.to.len() != 1)
            {
                return Err(DefinitionError::SingleStateArity {
                    workflow: name,
                    transition: transition.name.clone(),
                });
            }
        }

        let initial = if self.initial_marking.is_empty() {
            vec![self.places[0].clone()]
        } else {
            self.initial_marking
        };
        let initial_marking = check_marking(&name, self.kind, "initial", &known, initial)?;
        let final_marking = self
            .final_marking
            .map(|p| check_marking(&name, self.kind, "final", &known, p))
            .transpose()?;

        let mut targets = self.place_metadata.keys();
        if let Some(place) = targets.find(|p| !known.contains(p.as_str())) {
            return Err(DefinitionError::UnknownMetadataPlace {
                workflow: name,
                place: place.clone(),
            });
        }

        Ok(Definition {
            name,
            kind: self.kind,
            places: self.places,
            transitions: self.transitions,
            supports: self.supports,
            initial_marking,
            final_marking,
            events_to_dispatch: self.events_to_dispatch,
            metadata: self.metadata,
            place_metadata: self.place_metadata,
        })
    }
}

fn check_marking(
    workflow: &str,
    kind: WorkflowKind,
    which: &'static str,
    known: &HashSet<&str>,
    places: Vec<String>,
) -> Result<Marking, DefinitionError> {
    if let Some(place) = places.iter().find(|p| !known.contains(p.as_str())) {
        return Err(DefinitionError::UnknownMarkingPlace {
            workflow: workflow.to_string(),
            which,
            place: place.clone(),
        });
    }
    let marking = Marking::with_places(places);
    if kind == WorkflowKind::SingleState && marking.len() != 1 {
        return Err(DefinitionError::SingleStateMarking {
            workflow: workflow.to_string(),
            which,
            count: marking.len(),
        });
    }
    Ok(marking)
}
