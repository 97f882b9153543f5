use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::WorkflowError;
use crate::events::names;
use crate::subject::Subject;

use super::definition::{Definition, Transition, WorkflowKind};
use super::event::{BlockerCode, Context, Dispatcher, Event, Phase, TransitionBlocker};
use super::guard::GuardDecision;
use super::marking::Marking;

/// Applies transitions of one [`Definition`] to subject markings.
///
/// The engine holds no per-subject state: the marking is passed in by the
/// caller, who must serialize concurrent `apply` calls on the same subject.
pub struct Engine {
    definition: Definition,
    dispatcher: Option<Arc<dyn Dispatcher>>,
}

impl Engine {
    pub fn new(definition: Definition) -> Self {
        Self {
            definition,
            dispatcher: None,
        }
    }

    pub fn with_dispatcher(definition: Definition, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            definition,
            dispatcher: Some(dispatcher),
        }
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// The marking the subject carries, or the initial marking when it carries none.
    pub fn marking_for(&self, subject: &dyn Subject) -> Result<Marking, WorkflowError> {
        match subject.marking() {
            Some(marking) if !marking.is_empty() => {
                self.check_marking(&marking)?;
                Ok(marking)
            }
            _ => Ok(self.definition.initial_marking().clone()),
        }
    }

    /// Rejects markings naming undeclared places, and single-state markings
    /// that do not occupy exactly one place.
    pub fn check_marking(&self, marking: &Marking) -> Result<(), WorkflowError> {
        if let Some(place) = marking.places().find(|p| !self.definition.has_place(p)) {
            return Err(WorkflowError::InvalidMarking {
                workflow: self.name().to_string(),
                message: format!("place \"{place}\" is not defined"),
            });
        }
        if marking.is_empty() {
            return Err(WorkflowError::InvalidMarking {
                workflow: self.name().to_string(),
                message: "no place is occupied".to_string(),
            });
        }
        if self.definition.kind() == WorkflowKind::SingleState && marking.len() != 1 {
            return Err(WorkflowError::InvalidMarking {
                workflow: self.name().to_string(),
                message: format!(
                    "a state machine occupies exactly one place, found {marking}"
                ),
            });
        }
        Ok(())
    }

    pub fn transition(&self, name: &str) -> Result<&Transition, WorkflowError> {
        self.definition
            .transition(name)
            .ok_or_else(|| WorkflowError::UnknownTransition {
                workflow: self.name().to_string(),
                transition: name.to_string(),
            })
    }

    /// Every reason `name` cannot fire right now. Empty means enabled.
    pub fn blockers(
        &self,
        subject: &dyn Subject,
        marking: &Marking,
        name: &str,
    ) -> Result<Vec<TransitionBlocker>, WorkflowError> {
        let transition = self.transition(name)?;
        self.check_marking(marking)?;
        self.transition_blockers(transition, subject, marking)
    }

    /// Structural place check and guard only. Emits no events.
    pub fn can(
        &self,
        subject: &dyn Subject,
        marking: &Marking,
        name: &str,
    ) -> Result<bool, WorkflowError> {
        Ok(self.blockers(subject, marking, name)?.is_empty())
    }

    /// Lazily walks the definition's transitions in declaration order,
    /// yielding the enabled ones. Clone the iterator to walk it again.
    pub fn enabled_transitions<'e, 'q>(
        &'e self,
        subject: &'q dyn Subject,
        marking: &'q Marking,
    ) -> Result<EnabledTransitions<'e, 'q>, WorkflowError> {
        self.check_marking(marking)?;
        Ok(EnabledTransitions {
            engine: self,
            subject,
            marking,
            transitions: self.definition.transitions().iter(),
        })
    }

    /// Fires `name`, mutating `marking` and emitting the lifecycle events.
    ///
    /// The marking is changed before the transition, enter, entered,
    /// completed and announce events go out. A failure in any of those
    /// leaves the marking changed.
    pub fn apply(
        &self,
        subject: &dyn Subject,
        marking: &mut Marking,
        name: &str,
        context: &Context,
    ) -> Result<Marking, WorkflowError> {
        let definition = &self.definition;
        let transition = self.transition(name)?;
        self.check_marking(marking)?;

        let blockers = self.transition_blockers(transition, subject, marking)?;
        if let Some(blocker) = blockers.into_iter().next() {
            debug!(
                workflow = %self.name(),
                transition = name,
                reason = %blocker.message,
                "transition not enabled"
            );
            return Err(WorkflowError::TransitionNotEnabled {
                workflow: self.name().to_string(),
                transition: name.to_string(),
                reason: Some(blocker.message),
            });
        }

        let event = |phase: Phase, marking: &Marking| {
            Event::new(
                phase,
                subject,
                marking.clone(),
                Some(transition),
                definition,
                context.clone(),
            )
        };

        let guard = self.emit(event(Phase::Guard, marking))?;
        if guard.is_blocked() {
            let reasons: Vec<String> = guard
                .blockers()
                .iter()
                .map(|b| b.message.clone())
                .collect();
            warn!(
                workflow = %self.name(),
                transition = name,
                reasons = ?reasons,
                "transition vetoed by listener"
            );
            return Err(WorkflowError::TransitionBlocked {
                workflow: self.name().to_string(),
                transition: name.to_string(),
                reasons,
            });
        }

        for place in transition.from() {
            self.emit(event(Phase::Leave, marking).with_place(place))?;
        }

        for place in transition.from() {
            marking.unmark(place);
        }
        for place in transition.to() {
            marking.mark(place.as_str());
        }

        self.emit(event(Phase::Transition, marking))?;
        for place in transition.to() {
            self.emit(event(Phase::Enter, marking).with_place(place))?;
        }
        self.emit(event(Phase::Entered, marking))?;

        let reached_final = definition.final_marking().is_some_and(|f| f == &*marking);
        let completed = reached_final && definition.dispatches(Phase::Completed);
        let announce = definition.dispatches(Phase::Announce);
        if completed || announce {
            let enabled = self
                .enabled_transitions(subject, marking)?
                .collect::<Result<Vec<_>, _>>()?;
            if completed && enabled.is_empty() {
                self.emit(event(Phase::Completed, marking))?;
            }
            if announce {
                for next in enabled {
                    self.emit(Event::new(
                        Phase::Announce,
                        subject,
                        marking.clone(),
                        Some(next),
                        definition,
                        context.clone(),
                    ))?;
                }
            }
        }

        info!(
            workflow = %self.name(),
            transition = name,
            marking = %marking,
            "transition applied"
        );
        Ok(marking.clone())
    }

    fn transition_blockers(
        &self,
        transition: &Transition,
        subject: &dyn Subject,
        marking: &Marking,
    ) -> Result<Vec<TransitionBlocker>, WorkflowError> {
        if !marking.contains_all(transition.from().iter().map(String::as_str)) {
            return Ok(vec![TransitionBlocker::new(
                BlockerCode::MarkingMismatch,
                format!(
                    "marking {marking} does not contain every place of [{}]",
                    transition.from().join(", ")
                ),
            )]);
        }

        let Some(guard) = transition.guard() else {
            return Ok(Vec::new());
        };
        let decision = guard
            .check(subject, marking)
            .map_err(|source| WorkflowError::GuardEvaluation {
                transition: transition.name().to_string(),
                source,
            })?;
        Ok(match decision {
            GuardDecision::Allow => Vec::new(),
            GuardDecision::Deny(reason) => vec![TransitionBlocker::new(
                BlockerCode::GuardDenied,
                reason
                    .unwrap_or_else(|| format!("denied by guard \"{}\"", guard.reference())),
            )],
        })
    }

    fn emit<'a>(&self, event: Event<'a>) -> Result<Event<'a>, WorkflowError> {
        let phase = event.phase();
        if !self.definition.dispatches(phase) {
            return Ok(event);
        }
        let Some(dispatcher) = &self.dispatcher else {
            return Ok(event);
        };

        debug!(
            workflow = %self.name(),
            %phase,
            transition = ?event.transition().map(Transition::name),
            place = ?event.place(),
            "emitting event"
        );
        let mut event = event;
        for name in names::event_names(&event) {
            event = dispatcher.dispatch(event, Some(&name))?;
        }
        Ok(event)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("definition", &self.definition)
            .field("dispatcher", &self.dispatcher.is_some())
            .finish()
    }
}

/// Restartable, lazily-evaluated sequence of enabled transitions.
#[derive(Clone)]
pub struct EnabledTransitions<'e, 'q> {
    engine: &'e Engine,
    subject: &'q dyn Subject,
    marking: &'q Marking,
    transitions: std::slice::Iter<'e, Transition>,
}

impl<'e> Iterator for EnabledTransitions<'e, '_> {
    type Item = Result<&'e Transition, WorkflowError>;

    fn next(&mut self) -> Option<Self::Item> {
        for transition in self.transitions.by_ref() {
            match self.engine.transition_blockers(transition, self.subject, self.marking) {
                Ok(blockers) if blockers.is_empty() => return Some(Ok(transition)),
                Ok(_) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::{DispatchError, GuardError};
    use crate::subject::Record;
    use crate::workflow::{AttributeGuard, GuardRef};

    /// Records every dispatched name; optionally vetoes or fails on one name.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, Marking)>>,
        veto_on: Option<String>,
        fail_on: Option<String>,
    }

    impl Recorder {
        fn names(&self) -> Vec<String> {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .map(|(n, _)| n.clone())
                .collect()
        }

        fn plain_phases(&self) -> Vec<String> {
            self.names()
                .into_iter()
                .filter(|n| names::is_plain_name(n))
                .map(|n| n.trim_start_matches("workflow.").to_string())
                .collect()
        }
    }

    impl Dispatcher for Recorder {
        fn dispatch<'a>(
            &self,
            mut event: Event<'a>,
            name: Option<&str>,
        ) -> Result<Event<'a>, DispatchError> {
            let name = name.unwrap_or_default().to_string();
            if self.fail_on.as_deref() == Some(name.as_str()) {
                return Err(DispatchError::Listener {
                    event: name,
                    message: "listener crashed".into(),
                });
            }
            if self.veto_on.as_deref() == Some(name.as_str()) {
                event.block("closed");
            }
            self.seen
                .lock()
                .unwrap()
                .push((name, event.marking().clone()));
            Ok(event)
        }
    }

    fn straight() -> Definition {
        Definition::builder("straight", WorkflowKind::SingleState)
            .supports(["Order"])
            .places(["a", "b", "c"])
            .transition(Transition::new("t1", ["a"], ["b"]))
            .transition(Transition::new("t2", ["b"], ["c"]))
            .final_marking(["c"])
            .build()
            .unwrap()
    }

    fn engine_with(definition: Definition, recorder: Recorder) -> (Engine, Arc<Recorder>) {
        let recorder = Arc::new(recorder);
        let engine =
            Engine::with_dispatcher(definition, Arc::clone(&recorder) as Arc<dyn Dispatcher>);
        (engine, recorder)
    }

    #[test]
    fn linear_workflow_walks_to_completion() {
        let (engine, recorder) = engine_with(straight(), Recorder::default());
        let subject = Record::new("Order");
        let mut marking = engine.marking_for(&subject).unwrap();
        assert_eq!(marking, Marking::with_places(["a"]));

        assert!(engine.can(&subject, &marking, "t1").unwrap());
        assert!(!engine.can(&subject, &marking, "t2").unwrap());

        let updated = engine
            .apply(&subject, &mut marking, "t1", &Context::new())
            .unwrap();
        assert_eq!(updated, Marking::with_places(["b"]));
        assert_eq!(marking, updated);
        assert_eq!(
            recorder.plain_phases(),
            vec![
                "guard",
                "leave",
                "transition",
                "enter",
                "entered",
                "announce",
            ]
        );
        let names = recorder.names();
        assert!(names.contains(&"workflow.straight.announce.t2".to_string()));
        assert!(!names.iter().any(|n| n == "workflow.straight.announce.t1"));
        assert!(!names.iter().any(|n| n.contains("completed")));

        recorder.seen.lock().unwrap().clear();
        engine
            .apply(&subject, &mut marking, "t2", &Context::new())
            .unwrap();
        assert_eq!(marking, Marking::with_places(["c"]));
        assert_eq!(
            recorder.plain_phases(),
            vec![
                "guard",
                "leave",
                "transition",
                "enter",
                "entered",
                "completed",
            ]
        );
        let names = recorder.names();
        assert!(names.iter().any(|n| n == "workflow.straight.completed"));
    }

    #[test]
    fn final_marking_with_enabled_transition_is_not_completed() {
        let definition = Definition::builder("looped", WorkflowKind::SingleState)
            .supports(["Order"])
            .places(["a", "b", "c"])
            .transition(Transition::new("t1", ["a"], ["b"]))
            .transition(Transition::new("t2", ["b"], ["c"]))
            .transition(Transition::new("t3", ["c"], ["a"]))
            .final_marking(["c"])
            .build()
            .unwrap();
        let (engine, recorder) = engine_with(definition, Recorder::default());
        let subject = Record::new("Order");
        let mut marking = Marking::with_places(["b"]);

        engine
            .apply(&subject, &mut marking, "t2", &Context::new())
            .unwrap();
        assert_eq!(marking, Marking::with_places(["c"]));
        assert_eq!(
            recorder.plain_phases(),
            vec![
                "guard",
                "leave",
                "transition",
                "enter",
                "entered",
                "announce",
            ]
        );
        let names = recorder.names();
        assert!(names.contains(&"workflow.looped.announce.t3".to_string()));
        assert!(!names.iter().any(|n| n.contains("completed")));
    }

    #[test]
    fn place_on_both_sides_is_left_and_re_entered() {
        let definition = Definition::builder("retry", WorkflowKind::MultiState)
            .supports(["Order"])
            .places(["a", "b"])
            .transition(Transition::new("again", ["a"], ["a", "b"]))
            .build()
            .unwrap();
        let (engine, recorder) = engine_with(definition, Recorder::default());
        let subject = Record::new("Order");
        let mut marking = Marking::with_places(["a"]);

        engine
            .apply(&subject, &mut marking, "again", &Context::new())
            .unwrap();
        assert_eq!(marking, Marking::with_places(["a", "b"]));
        let names = recorder.names();
        assert!(names.iter().any(|n| n == "workflow.retry.leave.a"));
        assert!(names.iter().any(|n| n == "workflow.retry.enter.a"));
        assert!(names.iter().any(|n| n == "workflow.retry.enter.b"));
    }

    #[test]
    fn leave_sees_old_marking_and_enter_sees_new() {
        let (engine, recorder) = engine_with(straight(), Recorder::default());
        let subject = Record::new("Order");
        let mut marking = Marking::with_places(["a"]);
        engine
            .apply(&subject, &mut marking, "t1", &Context::new())
            .unwrap();

        let seen = recorder.seen.lock().unwrap();
        let leave = seen
            .iter()
            .find(|(n, _)| n == "workflow.straight.leave.a")
            .unwrap();
        assert_eq!(leave.1, Marking::with_places(["a"]));
        let enter = seen
            .iter()
            .find(|(n, _)| n == "workflow.straight.enter.b")
            .unwrap();
        assert_eq!(enter.1, Marking::with_places(["b"]));
    }

    #[test]
    fn unknown_transition_fails() {
        let engine = Engine::new(straight());
        let subject = Record::new("Order");
        let mut marking = Marking::with_places(["a"]);
        let err = engine
            .apply(&subject, &mut marking, "t9", &Context::new())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownTransition { .. }));
        assert!(matches!(
            engine.can(&subject, &marking, "t9"),
            Err(WorkflowError::UnknownTransition { .. })
        ));
    }

    #[test]
    fn structural_mismatch_emits_nothing() {
        let (engine, recorder) = engine_with(straight(), Recorder::default());
        let subject = Record::new("Order");
        let mut marking = Marking::with_places(["a"]);

        let err = engine
            .apply(&subject, &mut marking, "t2", &Context::new())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::TransitionNotEnabled { .. }));
        assert_eq!(marking, Marking::with_places(["a"]));
        assert!(recorder.names().is_empty());
    }

    fn guarded() -> Definition {
        let unlocked = GuardRef::new("!attr.locked", Arc::new(AttributeGuard::falsy("locked")));
        Definition::builder("article", WorkflowKind::SingleState)
            .supports(["Article"])
            .places(["draft", "published"])
            .transition(
                Transition::new("t1", ["draft"], ["published"])
                    .with_guard(unlocked),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn guard_denial_carries_reason_and_keeps_marking() {
        let (engine, recorder) = engine_with(guarded(), Recorder::default());
        let subject = Record::new("Article").with_attribute("locked", true);
        let mut marking = Marking::with_places(["draft"]);

        assert!(!engine.can(&subject, &marking, "t1").unwrap());
        let err = engine
            .apply(&subject, &mut marking, "t1", &Context::new())
            .unwrap_err();
        match err {
            WorkflowError::TransitionNotEnabled { reason, .. } => {
                assert_eq!(
                    reason.as_deref(),
                    Some("attribute \"locked\" must not be set")
                );
            }
            other => panic!("expected TransitionNotEnabled, got {other:?}"),
        }
        assert_eq!(marking, Marking::with_places(["draft"]));
        assert!(recorder.names().is_empty());

        let blockers = engine.blockers(&subject, &marking, "t1").unwrap();
        assert_eq!(blockers[0].code, BlockerCode::GuardDenied);
    }

    #[test]
    fn guard_fault_is_not_a_denial() {
        let exploding = |_: &dyn Subject, _: &Marking| -> Result<GuardDecision, GuardError> {
            Err(GuardError::new("attribute store offline"))
        };
        let definition = Definition::builder("article", WorkflowKind::SingleState)
            .supports(["Article"])
            .places(["draft", "published"])
            .transition(
                Transition::new("t1", ["draft"], ["published"])
                    .with_guard(GuardRef::new("exploding", Arc::new(exploding))),
            )
            .build()
            .unwrap();
        let engine = Engine::new(definition);
        let subject = Record::new("Article");
        let mut marking = Marking::with_places(["draft"]);

        assert!(matches!(
            engine.can(&subject, &marking, "t1"),
            Err(WorkflowError::GuardEvaluation { .. })
        ));
        assert!(matches!(
            engine.apply(&subject, &mut marking, "t1", &Context::new()),
            Err(WorkflowError::GuardEvaluation { .. })
        ));
        assert_eq!(marking, Marking::with_places(["draft"]));
    }

    #[test]
    fn guard_listener_veto_blocks_before_mutation() {
        let recorder = Recorder {
            veto_on: Some("workflow.straight.guard.t1".into()),
            ..Default::default()
        };
        let (engine, recorder) = engine_with(straight(), recorder);
        let subject = Record::new("Order");
        let mut marking = Marking::with_places(["a"]);

        assert!(engine.can(&subject, &marking, "t1").unwrap());
        let err = engine
            .apply(&subject, &mut marking, "t1", &Context::new())
            .unwrap_err();
        match err {
            WorkflowError::TransitionBlocked { reasons, .. } => assert_eq!(reasons, vec!["closed"]),
            other => panic!("expected TransitionBlocked, got {other:?}"),
        }
        assert_eq!(marking, Marking::with_places(["a"]));
        assert!(recorder.names().iter().all(|n| n.contains("guard")));
    }

    #[test]
    fn dispatch_failure_after_mutation_keeps_new_marking() {
        let recorder = Recorder {
            fail_on: Some("workflow.enter".into()),
            ..Default::default()
        };
        let (engine, _recorder) = engine_with(straight(), recorder);
        let subject = Record::new("Order");
        let mut marking = Marking::with_places(["a"]);

        let err = engine
            .apply(&subject, &mut marking, "t1", &Context::new())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Dispatch(_)));
        assert_eq!(marking, Marking::with_places(["b"]));
    }

    fn review() -> Definition {
        Definition::builder("review", WorkflowKind::MultiState)
            .supports(["Article"])
            .places(["draft", "spellchecked", "proofread", "published"])
            .transition(Transition::new(
                "start",
                vec!["draft"],
                vec!["spellchecked", "proofread"],
            ))
            .transition(Transition::new(
                "publish",
                vec!["spellchecked", "proofread"],
                vec!["published"],
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn multi_state_fork_and_join() {
        let (engine, recorder) = engine_with(review(), Recorder::default());
        let subject = Record::new("Article");
        let mut marking = Marking::with_places(["draft"]);

        engine
            .apply(&subject, &mut marking, "start", &Context::new())
            .unwrap();
        assert_eq!(marking, Marking::with_places(["spellchecked", "proofread"]));
        assert_eq!(
            recorder.plain_phases(),
            vec![
                "guard",
                "leave",
                "transition",
                "enter",
                "enter",
                "entered",
                "announce",
            ]
        );

        recorder.seen.lock().unwrap().clear();
        engine
            .apply(&subject, &mut marking, "publish", &Context::new())
            .unwrap();
        assert_eq!(marking, Marking::with_places(["published"]));
        assert_eq!(
            recorder.plain_phases(),
            vec!["guard", "leave", "leave", "transition", "enter", "entered"]
        );
    }

    #[test]
    fn join_needs_every_input_place() {
        let engine = Engine::new(review());
        let subject = Record::new("Article");
        let marking = Marking::with_places(["spellchecked"]);
        assert!(!engine.can(&subject, &marking, "publish").unwrap());
    }

    #[test]
    fn events_to_dispatch_filters_phases() {
        let definition = Definition::builder("straight", WorkflowKind::SingleState)
            .supports(["Order"])
            .places(["a", "b"])
            .transition(Transition::new("t1", ["a"], ["b"]))
            .events_to_dispatch([Phase::Entered])
            .build()
            .unwrap();
        let (engine, recorder) = engine_with(definition, Recorder::default());
        let subject = Record::new("Order");
        let mut marking = Marking::with_places(["a"]);

        engine
            .apply(&subject, &mut marking, "t1", &Context::new())
            .unwrap();
        assert_eq!(recorder.plain_phases(), vec!["guard", "entered"]);
    }

    #[test]
    fn enabled_transitions_are_restartable_and_fresh() {
        let engine = Engine::new(straight());
        let subject = Record::new("Order");
        let mut marking = Marking::with_places(["a"]);

        let enabled = engine.enabled_transitions(&subject, &marking).unwrap();
        let first: Vec<_> = enabled
            .clone()
            .map(|t| t.unwrap().name().to_string())
            .collect();
        let second: Vec<_> = enabled.map(|t| t.unwrap().name().to_string()).collect();
        assert_eq!(first, vec!["t1"]);
        assert_eq!(first, second);

        engine
            .apply(&subject, &mut marking, "t1", &Context::new())
            .unwrap();
        let names: Vec<_> = engine
            .enabled_transitions(&subject, &marking)
            .unwrap()
            .map(|t| t.unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["t2"]);
    }

    #[test]
    fn single_state_rejects_multi_place_marking() {
        let engine = Engine::new(straight());
        let subject = Record::new("Order");
        let marking = Marking::with_places(["a", "b"]);
        assert!(matches!(
            engine.can(&subject, &marking, "t1"),
            Err(WorkflowError::InvalidMarking { .. })
        ));
    }

    #[test]
    fn marking_for_reads_subject_or_initial() {
        let engine = Engine::new(straight());

        let fresh = Record::new("Order");
        assert_eq!(
            engine.marking_for(&fresh).unwrap(),
            Marking::with_places(["a"])
        );

        let persisted = Record::new("Order").with_marking(Marking::with_places(["b"]));
        assert_eq!(
            engine.marking_for(&persisted).unwrap(),
            Marking::with_places(["b"])
        );

        let corrupt = Record::new("Order").with_marking(Marking::with_places(["zz"]));
        assert!(matches!(
            engine.marking_for(&corrupt),
            Err(WorkflowError::InvalidMarking { .. })
        ));
    }

    #[test]
    fn can_is_repeatable() {
        let engine = Engine::new(straight());
        let subject = Record::new("Order");
        let marking = Marking::with_places(["b"]);
        let answers: Vec<bool> = (0..3)
            .map(|_| engine.can(&subject, &marking, "t2").unwrap())
            .collect();
        assert_eq!(answers, vec![true, true, true]);
    }
}
