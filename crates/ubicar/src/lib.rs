//! Ubicar: locator schema registry and nested-locator resolution for
//! page-object-model test suites.
//!
//! Test authors declare named, hierarchical locator schemas under
//! dot-delimited paths (`"main.form.button@submit"`); the engine resolves a
//! path into one composed [`Query`] by chaining every registered ancestor
//! schema, root to leaf.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  LocatorStore (one per page object)                          │
//! │    ├── SchemaRegistry      append-only path → schema         │
//! │    ├── GetBy               strategy → elementary query       │
//! │    └── ReportLogger        shared report/trace log           │
//! │                                                              │
//! │  resolve(path) ──► LocatorSchemaHandle (isolated snapshot)   │
//! │    ├── update / add_filter     per-test customization        │
//! │    └── get_nested_locator ──► Query (composed, renderable)   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handles own deep copies: customizing one resolution never leaks into the
//! registry or into other resolutions. Updates are validated recursively
//! against the schema field vocabulary, and the path identity of a schema
//! can never be changed after registration.
//!
//! # Example
//!
//! ```
//! use ubicar::{AriaRole, LocatorStore, RoleOptions, SchemaDef, SchemaUpdate};
//!
//! # fn main() -> ubicar::UbicarResult<()> {
//! let mut store = LocatorStore::new("LoginPage");
//! store.add_schema("body", SchemaDef::css(".login"))?;
//! store.add_schema(
//!     "body.button",
//!     SchemaDef::role(AriaRole::Button).with_role_options(RoleOptions::named("Login")),
//! )?;
//!
//! let query = store
//!     .resolve("body.button")?
//!     .update("body", SchemaUpdate::new().locator(".signin"))?
//!     .get_nested_locator()?;
//! assert_eq!(
//!     query.to_expression(),
//!     "page.locator('.signin').getByRole('button', { name: 'Login' })"
//! );
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod get_by;
mod handle;
mod merge;
mod nested;
mod path;
mod query;
mod registry;
mod report_logger;
mod result;
mod schema;
mod store;

pub use get_by::{GetBy, SelectorEngines};
pub use handle::LocatorSchemaHandle;
pub use merge::SchemaUpdate;
pub use nested::{DocumentEvaluator, ElementRecord, NestingStep, MAX_RECORDED_ELEMENTS};
pub use path::{is_valid_sub_path, segment_index_of, sub_paths};
pub use query::{LocatorFilter, Query};
pub use registry::SchemaRegistry;
pub use report_logger::{LogEntry, LogLevel, ReportLogger};
pub use result::{UbicarError, UbicarResult};
pub use schema::{
    AriaRole, ExactOptions, GetByMethod, LocatorSchema, Pattern, RoleOptions, SchemaDef,
    TextMatch,
};
pub use store::LocatorStore;
