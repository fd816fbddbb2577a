//! Append-only schema registry.
//!
//! Maps each path to a factory producing a fresh [`LocatorSchema`] value.
//! Entries are created once during page-object construction and never
//! updated or removed; consumers customize per-resolution snapshots instead.

use std::collections::HashMap;

use crate::result::{UbicarError, UbicarResult};
use crate::schema::{LocatorSchema, SchemaDef};

type SchemaFactory = Box<dyn Fn() -> LocatorSchema + Send + Sync>;

/// Append-only mapping from path to schema factory.
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, SchemaFactory>,
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("paths", &self.paths())
            .finish()
    }
}

impl SchemaRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `def` under `path`.
    ///
    /// Fails with [`UbicarError::DuplicateRegistration`] if the path is
    /// taken; the error carries both the existing and the attempted
    /// definition so conflicts are debuggable. Never overwrites.
    pub fn add(&mut self, owner: &str, path: &str, def: SchemaDef) -> UbicarResult<()> {
        let schema = LocatorSchema::new(path, def);

        if let Some(existing) = self.get(path) {
            return Err(UbicarError::DuplicateRegistration {
                owner: owner.to_string(),
                path: path.to_string(),
                existing: serde_json::to_string_pretty(&existing)?,
                attempted: serde_json::to_string_pretty(&schema)?,
            });
        }

        let _ = self
            .schemas
            .insert(path.to_string(), Box::new(move || schema.clone()));
        Ok(())
    }

    /// A fresh copy of the schema registered under `path`, if any.
    /// Never fails by itself; callers decide how to react to `None`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<LocatorSchema> {
        self.schemas.get(path).map(|factory| factory())
    }

    /// Whether `path` is registered.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.schemas.contains_key(path)
    }

    /// All registered paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.schemas.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AriaRole, GetByMethod};

    #[test]
    fn test_add_and_get_returns_definition_plus_path() {
        let mut registry = SchemaRegistry::new();
        registry
            .add("HomePage", "main.button", SchemaDef::role(AriaRole::Button))
            .unwrap();

        let schema = registry.get("main.button").unwrap();
        assert_eq!(schema.path, "main.button");
        assert_eq!(schema.def.locator_method, GetByMethod::Role);
        assert_eq!(schema.def.role, Some(AriaRole::Button));
    }

    #[test]
    fn test_duplicate_registration_fails_with_both_definitions() {
        let mut registry = SchemaRegistry::new();
        registry
            .add("HomePage", "main", SchemaDef::css(".first"))
            .unwrap();

        let err = registry
            .add("HomePage", "main", SchemaDef::css(".second"))
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("[HomePage]"));
        assert!(text.contains("'main'"));
        assert!(text.contains(".first"));
        assert!(text.contains(".second"));

        // original registration untouched
        assert_eq!(registry.get("main").unwrap().def.locator, Some(".first".to_string()));
    }

    #[test]
    fn test_get_unknown_path_is_none() {
        let registry = SchemaRegistry::new();
        assert!(registry.get("nope").is_none());
        assert!(!registry.contains("nope"));
    }

    #[test]
    fn test_factories_return_fresh_values() {
        let mut registry = SchemaRegistry::new();
        registry
            .add("HomePage", "main", SchemaDef::css(".x"))
            .unwrap();

        let mut first = registry.get("main").unwrap();
        first.def.locator = Some(".mutated".to_string());
        let second = registry.get("main").unwrap();
        assert_eq!(second.def.locator, Some(".x".to_string()));
    }
}
