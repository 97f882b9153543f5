//! Saída de terminal do placeflow com estilização via `console`.
//!
//! O [`EventPrinter`] é um [`EventBus`] que imprime cada evento publicado
//! durante uma simulação; o [`Report`] formata os resultados dos comandos.

use console::Style;

use crate::error::DispatchError;
use crate::events::{Envelope, EventBus, EventRecord, WorkflowEventView};
use crate::registry::Registry;
use crate::workflow::{Marking, Transition};

/// Estilos compartilhados pela saída dos comandos.
#[derive(Debug, Clone)]
pub struct Report {
    // Verde para sucesso.
    green: Style,
    // Vermelho para falhas.
    red: Style,
    // Amarelo para vetos e avisos.
    yellow: Style,
    // Ciano para nomes de eventos.
    cyan: Style,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            cyan: Style::new().cyan(),
        }
    }
}

impl Report {
    /// Lista os workflows carregados com tipo, places e tipos suportados.
    pub fn workflows(&self, registry: &Registry) {
        for entry in registry.entries() {
            let definition = entry.engine().definition();
            let priority = entry
                .priority()
                .map(|p| format!(" priority={p}"))
                .unwrap_or_default();
            println!(
                "  {} {} ({}) supports [{}], {} places, {} transitions{priority}",
                self.green.apply_to("✓"),
                definition.name(),
                definition.kind(),
                definition.supports().join(", "),
                definition.places().len(),
                definition.transitions().len(),
            );
        }
    }

    pub fn enabled(&self, marking: &Marking, transitions: &[&Transition]) {
        println!("  marking {marking}");
        if transitions.is_empty() {
            println!("  {} no transition is enabled", self.yellow.apply_to("∅"));
        }
        for transition in transitions {
            println!(
                "  {} {} [{}] -> [{}]",
                self.green.apply_to("→"),
                transition.name(),
                transition.from().join(", "),
                transition.to().join(", "),
            );
        }
    }

    pub fn applied(&self, transition: &str, marking: &Marking) {
        println!("  {} {transition}: now {marking}", self.green.apply_to("✓"));
    }

    pub fn failed(&self, transition: &str, error: &dyn std::fmt::Display) {
        println!("  {} {transition}: {error}", self.red.apply_to("✗"));
    }
}

/// Bus que imprime cada publicação; com `records`, imprime também o
/// [`EventRecord`] em JSON.
#[derive(Debug, Clone, Default)]
pub struct EventPrinter {
    report: Report,
    records: bool,
}

impl EventPrinter {
    pub fn new(records: bool) -> Self {
        Self {
            report: Report::default(),
            records,
        }
    }
}

impl EventBus for EventPrinter {
    fn publish(&self, event: &mut Envelope<'_>, name: Option<&str>) -> Result<(), DispatchError> {
        let Some(name) = name else {
            println!("    {}", self.report.cyan.apply_to(event.type_key()));
            return Ok(());
        };
        let blocked = event.event().is_blocked();
        let marker = if blocked {
            self.report.yellow.apply_to("!")
        } else {
            self.report.cyan.apply_to("·")
        };
        println!("    {marker} {name}");

        if self.records {
            match serde_json::to_string_pretty(&EventRecord::capture(event)) {
                Ok(json) => println!("{json}"),
                Err(err) => println!("    {} {err}", self.report.red.apply_to("✗")),
            }
        }
        Ok(())
    }
}
