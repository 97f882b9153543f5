use thiserror::Error;

/// Errors surfaced by registry resolution and transition application.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Workflow \"{0}\" is not registered")]
    UnknownWorkflow(String),

    #[error("Workflow \"{workflow}\" does not support subject type \"{subject_type}\"")]
    UnsupportedSubjectType {
        workflow: String,
        subject_type: String,
    },

    #[error("No workflow supports subject type \"{0}\"")]
    NoMatchingWorkflow(String),

    #[error(
        "Subject type \"{subject_type}\" is supported by several workflows ({}), pass a workflow name",
        .candidates.join(", ")
    )]
    AmbiguousWorkflow {
        subject_type: String,
        candidates: Vec<String>,
    },

    #[error("Transition \"{transition}\" is not defined for workflow \"{workflow}\"")]
    UnknownTransition {
        workflow: String,
        transition: String,
    },

    #[error(
        "Transition \"{transition}\" is not enabled for workflow \"{workflow}\"{}",
        format_reason(.reason)
    )]
    TransitionNotEnabled {
        workflow: String,
        transition: String,
        reason: Option<String>,
    },

    #[error(
        "Transition \"{transition}\" was blocked by a guard listener in workflow \"{workflow}\": {}",
        .reasons.join("; ")
    )]
    TransitionBlocked {
        workflow: String,
        transition: String,
        reasons: Vec<String>,
    },

    #[error("Guard for transition \"{transition}\" failed: {source}")]
    GuardEvaluation {
        transition: String,
        #[source]
        source: GuardError,
    },

    #[error("Marking is invalid for workflow \"{workflow}\": {message}")]
    InvalidMarking { workflow: String, message: String },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

fn format_reason(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(": {reason}"),
        None => String::new(),
    }
}

/// Static validation failures raised while building a definition or registry.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Workflow name must not be empty")]
    EmptyName,

    #[error("Workflow \"{0}\" declares no places")]
    NoPlaces(String),

    #[error("Workflow \"{0}\" declares no supported subject types")]
    NoSupportedTypes(String),

    #[error("Place \"{place}\" is declared twice in workflow \"{workflow}\"")]
    DuplicatePlace { workflow: String, place: String },

    #[error("Transition \"{transition}\" is declared twice in workflow \"{workflow}\"")]
    DuplicateTransition {
        workflow: String,
        transition: String,
    },

    #[error("Transition \"{transition}\" in workflow \"{workflow}\" has an empty \"{side}\" list")]
    EmptyArc {
        workflow: String,
        transition: String,
        side: &'static str,
    },

    #[error(
        "Transition \"{transition}\" in workflow \"{workflow}\" lists place \"{place}\" twice in its \"{side}\" list"
    )]
    DuplicateArcPlace {
        workflow: String,
        transition: String,
        side: &'static str,
        place: String,
    },

    #[error(
        "Transition \"{transition}\" in workflow \"{workflow}\" references unknown place \"{place}\""
    )]
    UnknownPlace {
        workflow: String,
        transition: String,
        place: String,
    },

    #[error(
        "Transition \"{transition}\" in single-state workflow \"{workflow}\" must have exactly one \"from\" and one \"to\" place"
    )]
    SingleStateArity {
        workflow: String,
        transition: String,
    },

    #[error("The {which} marking of workflow \"{workflow}\" references unknown place \"{place}\"")]
    UnknownMarkingPlace {
        workflow: String,
        which: &'static str,
        place: String,
    },

    #[error(
        "Single-state workflow \"{workflow}\" must have exactly one {which} place, got {count}"
    )]
    SingleStateMarking {
        workflow: String,
        which: &'static str,
        count: usize,
    },

    #[error("Metadata of workflow \"{workflow}\" targets unknown place \"{place}\"")]
    UnknownMetadataPlace { workflow: String, place: String },

    #[error("Workflow \"{0}\" is registered twice")]
    DuplicateWorkflow(String),
}

/// A guard's own logic faulted. Distinct from a guard that denies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GuardError {
    message: String,
}

impl GuardError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The external bus rejected, or one of its listeners faulted on, a translated event.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Event bus rejected \"{event}\": {reason}")]
    Rejected { event: String, reason: String },

    #[error("Listener for \"{event}\" failed: {message}")]
    Listener { event: String, message: String },
}
