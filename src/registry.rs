use std::collections::HashSet;

use tracing::debug;

use crate::error::{DefinitionError, WorkflowError};
use crate::subject::Subject;
use crate::workflow::{Context, Definition, Engine, Marking, Transition, TransitionBlocker};

/// One registered workflow and its optional disambiguation priority.
#[derive(Debug)]
pub struct RegistryEntry {
    engine: Engine,
    priority: Option<i32>,
}

impl RegistryEntry {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            priority: None,
        }
    }

    /// When several workflows support a subject type, a single entry with the
    /// highest priority wins the unnamed lookup.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn priority(&self) -> Option<i32> {
        self.priority
    }
}

/// Resolves which workflow applies to a subject.
///
/// Built once and read-only afterwards; share it by reference (or `Arc`)
/// across threads.
#[derive(Debug)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

/// The engine chosen for a subject and the marking it starts from.
#[derive(Debug)]
pub struct Resolved<'r> {
    pub engine: &'r Engine,
    pub marking: Marking,
}

impl Resolved<'_> {
    pub fn definition(&self) -> &Definition {
        self.engine.definition()
    }
}

impl Registry {
    pub fn new(entries: Vec<RegistryEntry>) -> Result<Self, DefinitionError> {
        let mut names = HashSet::new();
        for entry in &entries {
            if !names.insert(entry.engine.name()) {
                let name = entry.engine.name().to_string();
                return Err(DefinitionError::DuplicateWorkflow(name));
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&Engine> {
        self.entries
            .iter()
            .map(RegistryEntry::engine)
            .find(|engine| engine.name() == name)
    }

    /// Workflow names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.engine.name())
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Every workflow supporting the subject's type.
    pub fn all_for<'r>(&'r self, subject: &dyn Subject) -> Vec<&'r Engine> {
        let subject_type = subject.subject_type();
        self.entries
            .iter()
            .map(RegistryEntry::engine)
            .filter(|engine| engine.definition().supports_type(subject_type))
            .collect()
    }

    pub fn has(&self, subject: &dyn Subject, name: Option<&str>) -> bool {
        self.engine_for(subject, name).is_ok()
    }

    /// Picks the engine responsible for `subject`.
    ///
    /// With a name, that workflow must exist and support the subject type.
    /// Without one, exactly one workflow may match, unless priorities single
    /// one out.
    pub fn engine_for(
        &self,
        subject: &dyn Subject,
        name: Option<&str>,
    ) -> Result<&Engine, WorkflowError> {
        let subject_type = subject.subject_type();

        if let Some(name) = name {
            let engine = self
                .get(name)
                .ok_or_else(|| WorkflowError::UnknownWorkflow(name.to_string()))?;
            if !engine.definition().supports_type(subject_type) {
                return Err(WorkflowError::UnsupportedSubjectType {
                    workflow: name.to_string(),
                    subject_type: subject_type.to_string(),
                });
            }
            return Ok(engine);
        }

        let matches: Vec<&RegistryEntry> = self
            .entries
            .iter()
            .filter(|e| e.engine.definition().supports_type(subject_type))
            .collect();

        match matches.as_slice() {
            [] => Err(WorkflowError::NoMatchingWorkflow(subject_type.to_string())),
            [only] => Ok(&only.engine),
            _ => {
                let top = matches.iter().filter_map(|entry| entry.priority).max();
                let winners: Vec<&&RegistryEntry> = matches
                    .iter()
                    .filter(|entry| top.is_some() && entry.priority == top)
                    .collect();
                if let [winner] = winners.as_slice() {
                    debug!(subject_type, workflow = %winner.engine.name(), "resolved by priority");
                    return Ok(&winner.engine);
                }
                Err(WorkflowError::AmbiguousWorkflow {
                    subject_type: subject_type.to_string(),
                    candidates: matches
                        .iter()
                        .map(|e| e.engine.name().to_string())
                        .collect(),
                })
            }
        }
    }

    /// The engine for `subject` plus the marking it carries (or the initial one).
    pub fn resolve(
        &self,
        subject: &dyn Subject,
        name: Option<&str>,
    ) -> Result<Resolved<'_>, WorkflowError> {
        let engine = self.engine_for(subject, name)?;
        let marking = engine.marking_for(subject)?;
        debug!(
            subject_type = subject.subject_type(),
            workflow = %engine.name(),
            marking = %marking,
            "resolved workflow"
        );
        Ok(Resolved { engine, marking })
    }

    /// A client bound to `subject` that writes markings back to it.
    pub fn client<'r, 's, S: Subject>(
        &'r self,
        subject: &'s mut S,
        name: Option<&str>,
    ) -> Result<WorkflowClient<'r, 's, S>, WorkflowError> {
        let Resolved { engine, marking } = self.resolve(&*subject, name)?;
        Ok(WorkflowClient {
            engine,
            subject,
            marking,
        })
    }
}

/// Workflow operations for one subject, obtained from [`Registry::client`].
#[derive(Debug)]
pub struct WorkflowClient<'r, 's, S> {
    engine: &'r Engine,
    subject: &'s mut S,
    marking: Marking,
}

impl<'r, S: Subject> WorkflowClient<'r, '_, S> {
    pub fn engine(&self) -> &'r Engine {
        self.engine
    }

    pub fn definition(&self) -> &'r Definition {
        self.engine.definition()
    }

    pub fn subject(&self) -> &S {
        &*self.subject
    }

    pub fn marking(&self) -> &Marking {
        &self.marking
    }

    pub fn can(&self, transition: &str) -> Result<bool, WorkflowError> {
        self.engine.can(&*self.subject, &self.marking, transition)
    }

    pub fn blockers(&self, transition: &str) -> Result<Vec<TransitionBlocker>, WorkflowError> {
        self.engine.blockers(&*self.subject, &self.marking, transition)
    }

    pub fn enabled_transitions(&self) -> Result<Vec<&'r Transition>, WorkflowError> {
        self.engine
            .enabled_transitions(&*self.subject, &self.marking)?
            .collect()
    }

    /// Applies `transition` and stores the new marking on the subject.
    ///
    /// The marking is stored even when a listener failed after the marking
    /// moved, so the subject never lags behind events already sent.
    pub fn apply(
        &mut self,
        transition: &str,
        context: &Context,
    ) -> Result<&Marking, WorkflowError> {
        let before = self.marking.clone();
        let result = self
            .engine
            .apply(&*self.subject, &mut self.marking, transition, context);
        if self.marking != before {
            self.subject.set_marking(self.marking.clone());
        }
        result.map(|_| &self.marking)
    }
}
