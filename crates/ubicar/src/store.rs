//! Page-object-facing locator store.
//!
//! Each page object or component owns one [`LocatorStore`]: it carries the
//! component name (prefixed to error messages and log context), the
//! append-only schema registry, the elementary resolver and the report
//! logger. Registration happens once during construction; everything after
//! that reads through `&self`.

use std::sync::Arc;

use crate::get_by::{GetBy, SelectorEngines};
use crate::handle::LocatorSchemaHandle;
use crate::nested::DocumentEvaluator;
use crate::path::sub_paths;
use crate::registry::SchemaRegistry;
use crate::report_logger::{LogLevel, ReportLogger};
use crate::result::{UbicarError, UbicarResult};
use crate::schema::{LocatorSchema, SchemaDef};

/// Name of the selector engine backing the `dataCy` strategy.
const DATA_CY_ENGINE: &str = "data-cy";

/// Owns the locator schemas of one page object or component.
pub struct LocatorStore {
    name: String,
    registry: SchemaRegistry,
    get_by: GetBy,
    log: ReportLogger,
    evaluator: Option<Arc<dyn DocumentEvaluator>>,
}

impl std::fmt::Debug for LocatorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocatorStore")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl LocatorStore {
    /// Create a store for the named component, logging at info level.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_log_level(name, LogLevel::Info)
    }

    /// Create a store with an explicit log level. Debug level enables
    /// per-step evaluation records during nested-locator resolution.
    #[must_use]
    pub fn with_log_level(name: impl Into<String>, level: LogLevel) -> Self {
        let name = name.into();
        let log = ReportLogger::new(level, &name);
        let get_by = GetBy::new(&log);
        if SelectorEngines::init(DATA_CY_ENGINE) {
            log.debug(&format!("registered selector engine '{DATA_CY_ENGINE}'"));
        }
        Self {
            name,
            registry: SchemaRegistry::new(),
            get_by,
            log,
            evaluator: None,
        }
    }

    /// The owning component's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register `def` under `path`. Fails on duplicate paths; never
    /// overwrites.
    pub fn add_schema(&mut self, path: &str, def: SchemaDef) -> UbicarResult<()> {
        self.registry.add(&self.name, path, def)
    }

    /// A fresh copy of the schema registered under `path`.
    pub fn schema(&self, path: &str) -> UbicarResult<LocatorSchema> {
        self.registry
            .get(path)
            .ok_or_else(|| UbicarError::SchemaNotFound {
                owner: self.name.clone(),
                path: path.to_string(),
            })
    }

    /// All registered paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.registry.paths()
    }

    /// Take an isolated snapshot of `path`'s schema chain.
    ///
    /// The full path must be registered; ancestor prefixes are included when
    /// they are and skipped when they are not. The returned handle owns deep
    /// copies and shares no mutable state with the registry or other handles.
    pub fn resolve(&self, path: &str) -> UbicarResult<LocatorSchemaHandle> {
        if !self.registry.contains(path) {
            let err = UbicarError::SchemaNotFound {
                owner: self.name.clone(),
                path: path.to_string(),
            };
            self.log.error(&err.to_string());
            return Err(err);
        }

        let schemas = sub_paths(path)
            .into_iter()
            .filter_map(|sub_path| {
                self.registry
                    .get(&sub_path)
                    .map(|schema| (sub_path, schema))
            })
            .collect();

        Ok(LocatorSchemaHandle::new(
            &self.name,
            path,
            schemas,
            self.get_by.clone(),
            self.log.clone(),
            self.evaluator.clone(),
        ))
    }

    /// Attach a document evaluator for debug-level resolution records.
    pub fn set_evaluator(&mut self, evaluator: Arc<dyn DocumentEvaluator>) {
        self.evaluator = Some(evaluator);
    }

    /// The store's report logger; children of it record everything the
    /// engine does for this component.
    #[must_use]
    pub fn logger(&self) -> &ReportLogger {
        &self.log
    }
}
