//! Structured event names: `workflow.{phase}`, `workflow.{name}.{phase}` and
//! `workflow.{name}.{phase}.{qualifier}`.

use crate::workflow::{Event, Phase};

pub const PREFIX: &str = "workflow";

/// `workflow.{phase}`
pub fn plain_name(phase: Phase) -> String {
    format!("{PREFIX}.{phase}")
}

/// `workflow.{workflow}.{phase}`
pub fn scoped_name(workflow: &str, phase: Phase) -> String {
    format!("{PREFIX}.{workflow}.{phase}")
}

/// `workflow.{workflow}.{phase}.{qualifier}`
pub fn qualified_name(workflow: &str, phase: Phase, qualifier: &str) -> String {
    format!("{PREFIX}.{workflow}.{phase}.{qualifier}")
}

/// Every name an event is dispatched under, from least to most specific.
pub fn event_names(event: &Event<'_>) -> Vec<String> {
    let phase = event.phase();
    let workflow = event.workflow_name();
    let mut names = vec![plain_name(phase), scoped_name(workflow, phase)];
    if let Some(qualifier) = event.qualifier() {
        names.push(qualified_name(workflow, phase, qualifier));
    }
    names
}

/// True for the bare `workflow.{phase}` names only.
pub fn is_plain_name(name: &str) -> bool {
    name.strip_prefix(PREFIX)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|token| Phase::ALL.iter().any(|p| p.as_str() == token))
}

/// Recovers the phase from a structured name.
///
/// The positional slot is tried first (`workflow.{phase}` or
/// `workflow.{name}.{phase}...`); otherwise the first segment after the
/// leading one that spells a phase wins.
pub fn parse_phase(name: &str) -> Option<Phase> {
    let segments: Vec<&str> = name.split('.').collect();
    if segments.first() == Some(&PREFIX) {
        let slot = if segments.len() == 2 { 1 } else { 2 };
        if let Some(phase) = segments.get(slot).and_then(|s| Phase::from_token(s)) {
            return Some(phase);
        }
    }
    segments.iter().skip(1).find_map(|s| Phase::from_token(s))
}
