use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::GuardError;
use crate::subject::Subject;

use super::marking::Marking;

/// The outcome of a guard that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Denied, with an optional human-readable reason.
    Deny(Option<String>),
}

impl GuardDecision {
    pub fn deny(reason: impl Into<String>) -> Self {
        GuardDecision::Deny(Some(reason.into()))
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

/// A side-effect-free predicate gating a transition.
///
/// `Err` means the guard itself faulted. It is reported to the caller as
/// [`WorkflowError::GuardEvaluation`](crate::error::WorkflowError::GuardEvaluation)
/// and never folded into a denial.
pub trait Guard: Send + Sync {
    fn check(&self, subject: &dyn Subject, marking: &Marking) -> Result<GuardDecision, GuardError>;
}

impl<F> Guard for F
where
    F: Fn(&dyn Subject, &Marking) -> Result<GuardDecision, GuardError> + Send + Sync,
{
    fn check(&self, subject: &dyn Subject, marking: &Marking) -> Result<GuardDecision, GuardError> {
        self(subject, marking)
    }
}

/// A guard together with the reference it was configured under.
#[derive(Clone)]
pub struct GuardRef {
    reference: String,
    guard: Arc<dyn Guard>,
}

impl GuardRef {
    pub fn new(reference: impl Into<String>, guard: Arc<dyn Guard>) -> Self {
        Self {
            reference: reference.into(),
            guard,
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn check(
        &self,
        subject: &dyn Subject,
        marking: &Marking,
    ) -> Result<GuardDecision, GuardError> {
        self.guard.check(subject, marking)
    }
}

impl fmt::Debug for GuardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GuardRef").field(&self.reference).finish()
    }
}

/// Allows the transition only when a subject attribute is truthy (or falsy, when negated).
///
/// Configured as `attr.<key>` or `!attr.<key>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeGuard {
    key: String,
    expect_truthy: bool,
}

impl AttributeGuard {
    pub fn truthy(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            expect_truthy: true,
        }
    }

    pub fn falsy(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            expect_truthy: false,
        }
    }

    /// Parses `attr.<key>` / `!attr.<key>`. Returns `None` for anything else.
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        let (negated, rest) = match reference.strip_prefix('!') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, reference),
        };
        let key = rest.strip_prefix("attr.")?;
        if key.is_empty() {
            return None;
        }
        Some(if negated {
            Self::falsy(key)
        } else {
            Self::truthy(key)
        })
    }
}

impl Guard for AttributeGuard {
    fn check(
        &self,
        subject: &dyn Subject,
        _marking: &Marking,
    ) -> Result<GuardDecision, GuardError> {
        let truthy = subject.attribute(&self.key).is_some_and(|v| is_truthy(&v));
        if truthy == self.expect_truthy {
            return Ok(GuardDecision::Allow);
        }
        let reason = if self.expect_truthy {
            format!("attribute \"{}\" must be set", self.key)
        } else {
            format!("attribute \"{}\" must not be set", self.key)
        };
        Ok(GuardDecision::deny(reason))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Named guards available to configuration-built definitions.
#[derive(Default, Clone)]
pub struct GuardTable {
    guards: HashMap<String, Arc<dyn Guard>>,
}

impl GuardTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, guard: impl Guard + 'static) -> &mut Self {
        self.guards.insert(name.into(), Arc::new(guard));
        self
    }

    /// Looks the reference up by name, falling back to the built-in attribute guards.
    pub fn resolve(&self, reference: &str) -> Option<GuardRef> {
        if let Some(guard) = self.guards.get(reference) {
            return Some(GuardRef::new(reference, Arc::clone(guard)));
        }
        AttributeGuard::parse(reference).map(|guard| GuardRef::new(reference, Arc::new(guard)))
    }
}

impl fmt::Debug for GuardTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.guards.keys().collect();
        names.sort();
        f.debug_struct("GuardTable")
            .field("guards", &names)
            .finish()
    }
}
