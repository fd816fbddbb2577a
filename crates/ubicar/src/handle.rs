//! Per-resolution schema snapshots.
//!
//! [`LocatorSchemaHandle`] is what [`crate::LocatorStore::resolve`]
//! hands out: deep copies of every registered prefix of the bound path, plus
//! an initially empty filter overlay. Customizing a handle never touches the
//! registry or any other handle.
//!
//! Mutating calls consume the handle and return it, so per-test adjustments
//! chain:
//!
//! ```ignore
//! let locator = store
//!     .resolve("main.form.button")?
//!     .update("main.form", SchemaUpdate::new().text("Sign in"))?
//!     .add_filter("main.form.button", LocatorFilter::new().has_text("Go"))?
//!     .get_nested_locator()?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::get_by::GetBy;
use crate::merge::{apply_update, SchemaUpdate};
use crate::nested::{DocumentEvaluator, NestedBuilder};
use crate::path::{segment_index_of, sub_paths};
use crate::query::{LocatorFilter, Query};
use crate::report_logger::ReportLogger;
use crate::result::{UbicarError, UbicarResult};
use crate::schema::LocatorSchema;

/// An isolated, customizable snapshot of one path's schema chain.
pub struct LocatorSchemaHandle {
    owner: String,
    path: String,
    /// Snapshot entries in chain order; unregistered prefixes are absent.
    schemas: Vec<(String, LocatorSchema)>,
    /// Overlay filters in insertion order.
    filters: Vec<(String, LocatorFilter)>,
    get_by: GetBy,
    log: ReportLogger,
    evaluator: Option<Arc<dyn DocumentEvaluator>>,
}

impl std::fmt::Debug for LocatorSchemaHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocatorSchemaHandle")
            .field("owner", &self.owner)
            .field("path", &self.path)
            .field("schemas", &self.schemas)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}

impl LocatorSchemaHandle {
    pub(crate) fn new(
        owner: impl Into<String>,
        path: impl Into<String>,
        schemas: Vec<(String, LocatorSchema)>,
        get_by: GetBy,
        log: ReportLogger,
        evaluator: Option<Arc<dyn DocumentEvaluator>>,
    ) -> Self {
        Self {
            owner: owner.into(),
            path: path.into(),
            schemas,
            filters: Vec::new(),
            get_by,
            log,
            evaluator,
        }
    }

    /// The bound path this handle resolves.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The sub-paths present in this snapshot, in chain order.
    #[must_use]
    pub fn allowed_sub_paths(&self) -> Vec<String> {
        self.schemas.iter().map(|(key, _)| key.clone()).collect()
    }

    /// The snapshot schema currently stored for `sub_path`.
    pub fn schema_for(&self, sub_path: &str) -> UbicarResult<&LocatorSchema> {
        self.validate_sub_path(sub_path)?;
        self.schemas
            .iter()
            .find(|(key, _)| key == sub_path)
            .map(|(_, schema)| schema)
            .ok_or_else(|| self.invalid_sub_path(sub_path))
    }

    /// Merge `update` into the snapshot entry for `sub_path`.
    ///
    /// Repeated calls apply in call order; later calls win on conflicting
    /// fields. Only this handle's copy changes.
    pub fn update(mut self, sub_path: &str, update: SchemaUpdate) -> UbicarResult<Self> {
        self.validate_sub_path(sub_path)?;
        self.apply_to(sub_path, &update)?;
        Ok(self)
    }

    /// Merge `update` into the bound path's own snapshot entry, the most
    /// common target.
    pub fn update_self(self, update: SchemaUpdate) -> UbicarResult<Self> {
        let path = self.path.clone();
        self.update(&path, update)
    }

    /// Merge updates addressed by chain position instead of sub-path.
    ///
    /// Position `n` targets the `n`th entry of the bound path's sub-path
    /// chain. Positions are applied in ascending order; an out-of-range
    /// position fails with [`UbicarError::InvalidIndex`].
    #[deprecated(note = "address updates by sub-path with `update` instead")]
    pub fn updates(mut self, updates: HashMap<usize, SchemaUpdate>) -> UbicarResult<Self> {
        let chain = sub_paths(&self.path);
        let mut positions: Vec<usize> = updates.keys().copied().collect();
        positions.sort_unstable();

        for position in positions {
            let Some(sub_path) = chain.get(position).cloned() else {
                return Err(UbicarError::InvalidIndex {
                    position,
                    path: self.path.clone(),
                    chain_len: chain.len(),
                });
            };
            self.validate_sub_path(&sub_path)?;
            if let Some(update) = updates.get(&position) {
                self.apply_to(&sub_path, update)?;
            }
        }
        Ok(self)
    }

    /// Append an overlay filter for `sub_path`.
    ///
    /// Filters accumulate in insertion order and are applied by the builder
    /// after the target schema's embedded filter.
    pub fn add_filter(mut self, sub_path: &str, filter: LocatorFilter) -> UbicarResult<Self> {
        self.validate_sub_path(sub_path)?;
        self.filters.push((sub_path.to_string(), filter));
        Ok(self)
    }

    /// Resolve the full nested query for the bound path.
    pub fn get_nested_locator(&self) -> UbicarResult<Query> {
        self.build(&HashMap::new())
    }

    /// Resolve the full nested query, selecting the given occurrence of each
    /// keyed sub-path's matches.
    pub fn get_nested_locator_with(
        &self,
        indices: &HashMap<&str, usize>,
    ) -> UbicarResult<Query> {
        let mut by_position = HashMap::new();
        for (&sub_path, &index) in indices {
            self.validate_sub_path(sub_path)?;
            if let Some(position) = segment_index_of(&self.path, sub_path) {
                let _ = by_position.insert(position, index);
            }
        }
        self.build(&by_position)
    }

    /// Resolve the full nested query with occurrence indices keyed by chain
    /// position instead of sub-path.
    #[deprecated(note = "address occurrences by sub-path with `get_nested_locator_with` instead")]
    pub fn get_nested_locator_nth(
        &self,
        indices: &HashMap<usize, usize>,
    ) -> UbicarResult<Query> {
        let chain_len = sub_paths(&self.path).len();
        for &position in indices.keys() {
            if position >= chain_len {
                return Err(UbicarError::InvalidIndex {
                    position,
                    path: self.path.clone(),
                    chain_len,
                });
            }
        }
        self.build(indices)
    }

    /// Resolve only the bound path's own elementary query, ignoring
    /// ancestors, filters and indices.
    pub fn get_locator(&self) -> UbicarResult<Query> {
        let (_, schema) = self
            .schemas
            .iter()
            .find(|(key, _)| key == &self.path)
            .ok_or_else(|| UbicarError::SchemaNotFound {
                owner: self.owner.clone(),
                path: self.path.clone(),
            })?;
        self.get_by.elementary(schema)
    }

    fn build(&self, indices: &HashMap<usize, usize>) -> UbicarResult<Query> {
        let builder = NestedBuilder::new(
            &self.log,
            &self.get_by,
            self.evaluator.as_deref(),
        );
        builder.build(&self.path, &self.schemas, &self.filters, indices)
    }

    fn apply_to(&mut self, sub_path: &str, update: &SchemaUpdate) -> UbicarResult<()> {
        let owner = self.owner.clone();
        let entry = self
            .schemas
            .iter_mut()
            .find(|(key, _)| key == sub_path)
            .ok_or_else(|| UbicarError::SchemaNotFound {
                owner: owner.clone(),
                path: sub_path.to_string(),
            })?;
        entry.1 = apply_update(&owner, &entry.1, update)?;
        Ok(())
    }

    /// A sub-path key is accepted only if it is a prefix of the bound path
    /// AND present in the snapshot.
    fn validate_sub_path(&self, sub_path: &str) -> UbicarResult<()> {
        if self.schemas.iter().any(|(key, _)| key == sub_path) {
            Ok(())
        } else {
            Err(self.invalid_sub_path(sub_path))
        }
    }

    fn invalid_sub_path(&self, sub_path: &str) -> UbicarError {
        let err = UbicarError::InvalidSubPath {
            sub_path: sub_path.to_string(),
            path: self.path.clone(),
            allowed: self.allowed_sub_paths().join(",\n"),
        };
        self.log.error(&err.to_string());
        err
    }
}
