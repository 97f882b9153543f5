//! Subjects are the domain objects a workflow moves through its places.
//!
//! Domain types implement [`Subject`] to expose their type identifier, the
//! marking they carry and the attributes guards read. Workflow operations live
//! on [`WorkflowClient`](crate::registry::WorkflowClient), never on the subject.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::workflow::Marking;

/// A domain object tracked by a workflow.
pub trait Subject {
    /// Type identifier matched against a definition's `supports` list.
    fn subject_type(&self) -> &str;

    /// The marking persisted on the subject, if any.
    fn marking(&self) -> Option<Marking>;

    fn set_marking(&mut self, marking: Marking);

    /// Attribute lookup used by guards.
    fn attribute(&self, _key: &str) -> Option<Value> {
        None
    }

    /// Serializable view of the subject, used by event records.
    fn snapshot(&self) -> Value {
        Value::Null
    }
}

/// A loosely-typed subject: a type tag, an optional marking and a bag of attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub subject_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marking: Option<Marking>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Record {
    pub fn new(subject_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subject_type: subject_type.into(),
            marking: None,
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_marking(mut self, marking: Marking) -> Self {
        self.marking = Some(marking);
        self
    }
}

impl Subject for Record {
    fn subject_type(&self) -> &str {
        &self.subject_type
    }

    fn marking(&self) -> Option<Marking> {
        self.marking.clone()
    }

    fn set_marking(&mut self, marking: Marking) {
        self.marking = Some(marking);
    }

    fn attribute(&self, key: &str) -> Option<Value> {
        self.attributes.get(key).cloned()
    }

    fn snapshot(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_defaults() {
        let record = Record::new("Order");
        assert_eq!(record.subject_type(), "Order");
        assert!(record.marking().is_none());
        assert!(record.attribute("locked").is_none());
        assert!(Uuid::parse_str(&record.id).is_ok());
    }

    #[test]
    fn record_attributes_and_marking() {
        let mut record = Record::new("Order").with_attribute("locked", true);
        assert_eq!(record.attribute("locked"), Some(Value::Bool(true)));

        record.set_marking(Marking::with_places(["cart"]));
        assert_eq!(record.marking(), Some(Marking::with_places(["cart"])));
    }

    #[test]
    fn snapshot_roundtrip() {
        let record = Record::new("Order")
            .with_attribute("total", 42)
            .with_marking(Marking::with_places(["paid"]));
        let restored: Record = serde_json::from_value(record.snapshot()).unwrap();
        assert_eq!(restored, record);
    }
}
