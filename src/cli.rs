//! Interface de linha de comando do placeflow baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (validate, dump,
//! transitions, simulate) e flags globais (--config, --verbose).

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

/// placeflow: máquinas de estado e workflows Petri configurados por arquivo.
#[derive(Debug, Parser)]
#[command(name = "placeflow", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Arquivo de configuração (TOML ou JSON). Padrão: `PLACEFLOW_CONFIG` ou `placeflow.toml`.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Valida todas as definições e lista os workflows carregados.
    Validate,

    /// Exporta um workflow como grafo Graphviz.
    Dump {
        /// Nome do workflow na configuração.
        workflow: String,

        /// Tipo de subject que o workflow deve suportar.
        #[arg(long)]
        subject_type: Option<String>,

        /// Formato de saída; qualquer valor diferente de `dot` passa pelo programa `dot`.
        #[arg(long, default_value = "dot")]
        format: String,

        /// Arquivo de saída. Sem ele, DOT vai para stdout e outros formatos para `<workflow>.<format>`.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Places a destacar no grafo, separados por vírgula.
        #[arg(long, value_delimiter = ',')]
        marking: Vec<String>,
    },

    /// Lista as transições habilitadas para um subject.
    Transitions(SubjectArgs),

    /// Aplica uma sequência de transições a um subject e imprime os eventos.
    Simulate {
        #[command(flatten)]
        subject: SubjectArgs,

        /// Transições a aplicar, em ordem.
        #[arg(required = true)]
        transitions: Vec<String>,
    },
}

/// Descrição do subject usado por `transitions` e `simulate`.
#[derive(Debug, Clone, Args)]
pub struct SubjectArgs {
    /// Tipo do subject (ex.: `Order`).
    #[arg(long)]
    pub subject_type: String,

    /// Workflow explícito; sem ele, a resolução usa o tipo do subject.
    #[arg(long, short)]
    pub workflow: Option<String>,

    /// Marking atual, separado por vírgula. Sem ele, usa o marking inicial.
    #[arg(long, value_delimiter = ',')]
    pub marking: Vec<String>,

    /// Atributo do subject no formato `chave=valor` (valor em JSON ou texto).
    #[arg(long = "attr", value_parser = parse_attr)]
    pub attrs: Vec<(String, Value)>,
}

// Converte `chave=valor`; valores que não são JSON válido viram strings.
fn parse_attr(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got \"{raw}\""))?;
    if key.is_empty() {
        return Err(format!("empty attribute name in \"{raw}\""));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_dump_subcommand() {
        let cli = Cli::parse_from([
            "placeflow",
            "dump",
            "order",
            "--format",
            "svg",
            "--marking",
            "cart,paid",
        ]);
        match cli.command {
            Command::Dump {
                workflow,
                subject_type,
                format,
                output,
                marking,
            } => {
                assert_eq!(workflow, "order");
                assert!(subject_type.is_none());
                assert_eq!(format, "svg");
                assert!(output.is_none());
                assert_eq!(marking, ["cart", "paid"]);
            }
            _ => panic!("expected Dump command"),
        }
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "placeflow",
            "--config",
            "flows.json",
            "--verbose",
            "validate",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("flows.json")));
        assert!(matches!(cli.command, Command::Validate));
    }

    #[test]
    fn cli_parses_simulate_subcommand() {
        let cli = Cli::parse_from([
            "placeflow",
            "simulate",
            "--subject-type",
            "Order",
            "--attr",
            "locked=false",
            "--attr",
            "owner=bob",
            "pay",
            "ship",
        ]);
        match cli.command {
            Command::Simulate { subject, transitions } => {
                assert_eq!(subject.subject_type, "Order");
                assert!(subject.workflow.is_none());
                assert!(subject.marking.is_empty());
                assert_eq!(
                    subject.attrs,
                    [
                        ("locked".to_string(), Value::Bool(false)),
                        ("owner".to_string(), Value::String("bob".into())),
                    ]
                );
                assert_eq!(transitions, ["pay", "ship"]);
            }
            _ => panic!("expected Simulate command"),
        }
    }

    #[test]
    fn simulate_requires_transitions() {
        let result = Cli::try_parse_from(["placeflow", "simulate", "--subject-type", "Order"]);
        assert!(result.is_err());
    }

    #[test]
    fn attr_parser_rejects_missing_separator() {
        assert!(parse_attr("locked").is_err());
        assert!(parse_attr("=true").is_err());
        assert_eq!(parse_attr("total=12").unwrap().1, Value::from(12));
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
