use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command as Process, Stdio};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use placeflow::cli::{Cli, Command, SubjectArgs};
use placeflow::config::WorkflowsConfig;
use placeflow::events::DispatcherAdapter;
use placeflow::ui::{EventPrinter, Report};
use placeflow::workflow::{Dispatcher, GuardTable, Marking};
use placeflow::{Record, dumper};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = WorkflowsConfig::load(cli.config.as_deref())?;
    let guards = GuardTable::new();
    let report = Report::default();

    match cli.command {
        Command::Validate => {
            let registry = config.build_registry(&guards, None)?;
            if registry.entries().is_empty() {
                println!("No workflows configured.");
            }
            report.workflows(&registry);
        }
        Command::Dump {
            workflow,
            subject_type,
            format,
            output,
            marking,
        } => {
            let registry = config.build_registry(&guards, None)?;
            let engine = registry
                .get(&workflow)
                .ok_or_else(|| anyhow!("workflow \"{workflow}\" is not configured"))?;
            if let Some(subject_type) = &subject_type
                && !engine.definition().supports_type(subject_type)
            {
                bail!(
                    "workflow \"{workflow}\" has no support for subject type \"{subject_type}\""
                );
            }
            let marking = (!marking.is_empty()).then(|| Marking::with_places(marking));
            if let Some(marking) = &marking {
                engine.check_marking(marking)?;
            }

            let dot = dumper::dump(engine.definition(), marking.as_ref());
            if format == "dot" {
                match output {
                    Some(path) => std::fs::write(&path, dot)
                        .with_context(|| format!("failed to write {}", path.display()))?,
                    None => print!("{dot}"),
                }
            } else {
                let path = output.unwrap_or_else(|| PathBuf::from(format!("{workflow}.{format}")));
                render(&dot, &format, &path)?;
                println!("Wrote {}", path.display());
            }
        }
        Command::Transitions(args) => {
            let registry = config.build_registry(&guards, None)?;
            let mut subject = subject_from(&args);
            let client = registry.client(&mut subject, args.workflow.as_deref())?;
            let enabled = client.enabled_transitions()?;
            report.enabled(client.marking(), &enabled);
        }
        Command::Simulate {
            subject: args,
            transitions,
        } => {
            let dispatcher: Arc<dyn Dispatcher> =
                Arc::new(DispatcherAdapter::new(EventPrinter::new(cli.verbose)));
            let registry = config.build_registry(&guards, Some(dispatcher))?;
            let mut subject = subject_from(&args);
            let mut client = registry.client(&mut subject, args.workflow.as_deref())?;
            let context = placeflow::workflow::Context::new();

            for name in &transitions {
                match client.apply(name, &context) {
                    Ok(marking) => report.applied(name, marking),
                    Err(err) => {
                        report.failed(name, &err);
                        bail!("simulation stopped at \"{name}\"");
                    }
                }
            }
        }
    }

    Ok(())
}

fn subject_from(args: &SubjectArgs) -> Record {
    let mut subject = args
        .attrs
        .iter()
        .fold(Record::new(args.subject_type.clone()), |record, (key, value)| {
            record.with_attribute(key.clone(), value.clone())
        });
    if !args.marking.is_empty() {
        subject = subject.with_marking(Marking::with_places(args.marking.iter().cloned()));
    }
    subject
}

// Pipes DOT source through Graphviz to produce `format` at `path`.
fn render(dot: &str, format: &str, path: &Path) -> Result<()> {
    let mut child = Process::new("dot")
        .arg(format!("-T{format}"))
        .arg("-o")
        .arg(path)
        .stdin(Stdio::piped())
        .spawn()
        .context("failed to run `dot`, is Graphviz installed?")?;
    child
        .stdin
        .take()
        .context("dot stdin is not available")?
        .write_all(dot.as_bytes())?;
    let status = child.wait()?;
    if !status.success() {
        bail!("dot exited with {status}");
    }
    Ok(())
}
