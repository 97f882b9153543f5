//! Configuração das definições de workflow carregada de `placeflow.toml`.
//!
//! A struct [`WorkflowsConfig`] descreve cada workflow (tipo, places,
//! transições, guards e metadados) e constrói o [`Registry`] correspondente.
//! O formato é escolhido pela extensão do arquivo: `.json` usa `serde_json`,
//! qualquer outra usa TOML. A variável de ambiente `PLACEFLOW_CONFIG` tem
//! precedência sobre o caminho padrão.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::registry::{Registry, RegistryEntry};
use crate::workflow::{
    Definition, Dispatcher, Engine, GuardTable, Metadata, Phase, Transition, WorkflowKind,
};

/// Caminho padrão do arquivo de configuração.
pub const DEFAULT_PATH: &str = "placeflow.toml";

/// Variável de ambiente que substitui o caminho padrão.
pub const CONFIG_ENV: &str = "PLACEFLOW_CONFIG";

/// Configuração de nível superior: um workflow por chave de `[workflows.<nome>]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowsConfig {
    #[serde(default)]
    pub workflows: BTreeMap<String, WorkflowConfig>,
}

/// Definição de um workflow individual.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// `single-state` (alias `state_machine`) ou `multi-state` (alias `workflow`).
    #[serde(rename = "type", default)]
    pub kind: WorkflowKind,

    /// Tipos de subject aceitos por este workflow.
    pub supports: Vec<String>,

    pub places: Vec<String>,

    /// Marking inicial; vazio significa o primeiro place declarado.
    #[serde(default)]
    pub initial_marking: OneOrMany,

    #[serde(default)]
    pub final_marking: Option<OneOrMany>,

    /// Desempate quando vários workflows aceitam o mesmo tipo de subject.
    #[serde(default)]
    pub priority: Option<i32>,

    /// Fases emitidas; ausente significa todas. `guard` é sempre emitida.
    #[serde(default)]
    pub events_to_dispatch: Option<Vec<Phase>>,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub place_metadata: BTreeMap<String, Metadata>,

    /// Transições na ordem de declaração.
    #[serde(default = "default_transitions")]
    pub transitions: Vec<TransitionConfig>,
}

/// Uma transição: `from`/`to` aceitam um place ou uma lista.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionConfig {
    pub name: String,
    pub from: OneOrMany,
    pub to: OneOrMany,

    /// Nome registrado na [`GuardTable`] ou uma referência `attr.<chave>` / `!attr.<chave>`.
    #[serde(default)]
    pub guard: Option<String>,

    #[serde(default)]
    pub metadata: Metadata,
}

/// Um valor único ou uma lista de places.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(place) => vec![place.clone()],
            OneOrMany::Many(places) => places.clone(),
        }
    }
}

// Valor padrão para transições: nenhuma.
fn default_transitions() -> Vec<TransitionConfig> {
    Vec::new()
}

/// Formato do arquivo, decidido pela extensão.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Toml,
        }
    }
}

/// Escolhe o caminho: explícito, depois `PLACEFLOW_CONFIG`, depois o padrão.
pub fn resolve_path(explicit: Option<&Path>, env: Option<String>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match env {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_PATH),
    }
}

impl WorkflowsConfig {
    /// Carrega a configuração do caminho resolvido por [`resolve_path`].
    /// Só o caminho padrão ausente resulta em configuração vazia.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, std::env::var(CONFIG_ENV).ok())
    }

    fn load_with(explicit: Option<&Path>, env: Option<String>) -> Result<Self> {
        let path = resolve_path(explicit, env);
        if path == Path::new(DEFAULT_PATH) && !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&contents, Format::from_path(path))
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn parse(contents: &str, format: Format) -> Result<Self> {
        let config = match format {
            Format::Toml => toml::from_str(contents)?,
            Format::Json => serde_json::from_str(contents)?,
        };
        Ok(config)
    }

    /// Constrói e valida todas as definições, anexando o dispatcher a cada engine.
    pub fn build_registry(
        &self,
        guards: &GuardTable,
        dispatcher: Option<Arc<dyn Dispatcher>>,
    ) -> Result<Registry> {
        let mut entries = Vec::with_capacity(self.workflows.len());
        for (name, workflow) in &self.workflows {
            let definition = workflow
                .definition(name, guards)
                .with_context(|| format!("invalid workflow \"{name}\""))?;
            let engine = match &dispatcher {
                Some(dispatcher) => Engine::with_dispatcher(definition, Arc::clone(dispatcher)),
                None => Engine::new(definition),
            };
            let mut entry = RegistryEntry::new(engine);
            if let Some(priority) = workflow.priority {
                entry = entry.with_priority(priority);
            }
            entries.push(entry);
        }
        Ok(Registry::new(entries)?)
    }
}

impl WorkflowConfig {
    pub fn definition(&self, name: &str, guards: &GuardTable) -> Result<Definition> {
        let mut builder = Definition::builder(name, self.kind)
            .supports(self.supports.iter().cloned())
            .places(self.places.iter().cloned());

        let initial = self.initial_marking.to_vec();
        if !initial.is_empty() {
            builder = builder.initial_marking(initial);
        }
        if let Some(final_marking) = &self.final_marking {
            builder = builder.final_marking(final_marking.to_vec());
        }
        if let Some(phases) = &self.events_to_dispatch {
            builder = builder.events_to_dispatch(phases.iter().copied());
        }
        for (key, value) in &self.metadata {
            builder = builder.metadata(key.clone(), value.clone());
        }
        for (place, entries) in &self.place_metadata {
            for (key, value) in entries {
                builder = builder.place_metadata(place.clone(), key.clone(), value.clone());
            }
        }

        for config in &self.transitions {
            let mut transition = Transition::new(
                config.name.clone(),
                config.from.to_vec(),
                config.to.to_vec(),
            );
            if let Some(reference) = &config.guard {
                let guard = guards.resolve(reference).ok_or_else(|| {
                    anyhow!(
                        "unknown guard \"{reference}\" on transition \"{}\"",
                        config.name
                    )
                })?;
                transition = transition.with_guard(guard);
            }
            for (key, value) in &config.metadata {
                transition = transition.with_metadata(key.clone(), value.clone());
            }
            builder = builder.transition(transition);
        }

        Ok(builder.build()?)
    }
}
