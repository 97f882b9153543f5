//! Graphviz DOT export of workflow definitions.

use std::fmt;

use crate::workflow::{Definition, Marking, WorkflowKind};

const GRAPH_ATTRS: &str = r#"ratio="compress" rankdir="LR""#;
const NODE_ATTRS: &str = r##"fontsize="9" fontname="Arial" color="#333333" fillcolor="lightblue" fixedsize="false" width="1""##;
const EDGE_ATTRS: &str = r##"fontsize="9" fontname="Arial" color="#333333" arrowhead="normal" arrowsize="0.5""##;
const MARKED_COLOR: &str = "#FF0000";

/// How transitions are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpStrategy {
    /// Places are nodes and every transition is a labelled edge per from/to pair.
    StateMachine,
    /// Transitions are box nodes between their input and output places.
    Workflow,
}

impl DumpStrategy {
    pub fn for_kind(kind: WorkflowKind) -> Self {
        match kind {
            WorkflowKind::SingleState => DumpStrategy::StateMachine,
            WorkflowKind::MultiState => DumpStrategy::Workflow,
        }
    }

    /// Renders `definition`; places in `marking` are highlighted.
    pub fn dump(self, definition: &Definition, marking: Option<&Marking>) -> String {
        Dot {
            strategy: self,
            definition,
            marking,
        }
        .to_string()
    }
}

/// DOT source for one definition, written through [`fmt::Display`].
#[derive(Debug, Clone, Copy)]
pub struct Dot<'a> {
    pub strategy: DumpStrategy,
    pub definition: &'a Definition,
    pub marking: Option<&'a Marking>,
}

impl fmt::Display for Dot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let definition = self.definition;
        writeln!(f, "digraph workflow {{")?;
        let name = escape(definition.name());
        writeln!(f, "  {GRAPH_ATTRS} label=\"{name}\";")?;
        writeln!(f, "  node [{NODE_ATTRS}];")?;
        writeln!(f, "  edge [{EDGE_ATTRS}];")?;
        writeln!(f)?;

        let initial = definition.initial_marking();
        for place in definition.places() {
            let marked = self.marking.is_some_and(|m| m.has(place));
            let shape = if marked { "doublecircle" } else { "circle" };
            write!(
                f,
                "  {} [label=\"{}\", shape={shape}",
                place_id(place),
                escape(place)
            )?;
            if initial.has(place) {
                write!(f, r#", style="filled""#)?;
            }
            if marked {
                write!(f, r#", color="{MARKED_COLOR}""#)?;
            }
            writeln!(f, "];")?;
        }

        match self.strategy {
            DumpStrategy::Workflow => {
                for (index, transition) in definition.transitions().iter().enumerate() {
                    writeln!(
                        f,
                        "  transition_{index} [label=\"{}\", shape=\"box\", regular=\"1\"];",
                        escape(transition.name())
                    )?;
                }
                writeln!(f)?;
                for (index, transition) in definition.transitions().iter().enumerate() {
                    for from in transition.from() {
                        writeln!(
                            f,
                            "  {} -> transition_{index} [style=\"solid\"];",
                            place_id(from)
                        )?;
                    }
                    for to in transition.to() {
                        writeln!(
                            f,
                            "  transition_{index} -> {} [style=\"solid\"];",
                            place_id(to)
                        )?;
                    }
                }
            }
            DumpStrategy::StateMachine => {
                writeln!(f)?;
                for transition in definition.transitions() {
                    for from in transition.from() {
                        for to in transition.to() {
                            writeln!(
                                f,
                                "  {} -> {} [label=\"{}\" style=\"solid\"];",
                                place_id(from),
                                place_id(to),
                                escape(transition.name())
                            )?;
                        }
                    }
                }
            }
        }
        writeln!(f, "}}")
    }
}

/// Renders `definition` with the strategy matching its kind.
pub fn dump(definition: &Definition, marking: Option<&Marking>) -> String {
    DumpStrategy::for_kind(definition.kind()).dump(definition, marking)
}

fn place_id(place: &str) -> String {
    let mut id = String::from("place_");
    for c in place.chars() {
        if c.is_ascii_alphanumeric() {
            id.push(c);
        } else {
            id.push_str(&format!("_{:x}", u32::from(c)));
        }
    }
    id
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
