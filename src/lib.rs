//! Configurable state machines and Petri-net workflows.
//!
//! A [`workflow::Definition`] is validated once and driven by an
//! [`workflow::Engine`], which emits phase events through an optional
//! [`workflow::Dispatcher`]. The [`events::DispatcherAdapter`] republishes
//! those events on a name-addressed bus, and the [`Registry`] picks the
//! workflow that applies to a subject.

pub mod cli;
pub mod config;
pub mod dumper;
pub mod error;
pub mod events;
pub mod registry;
pub mod subject;
pub mod ui;
pub mod workflow;

pub use error::{DefinitionError, DispatchError, GuardError, WorkflowError};
pub use registry::{Registry, RegistryEntry, Resolved, WorkflowClient};
pub use subject::{Record, Subject};
