//! Elementary query resolution.
//!
//! [`GetBy`] turns one [`LocatorSchema`] into the single primitive [`Query`]
//! for its strategy, before any nesting. It fails with
//! [`UbicarError::StrategyFieldMissing`] when the strategy's required field
//! is absent, logging a warning first.
//!
//! The `dataCy` strategy depends on a custom selector engine being installed
//! in the automation process; [`SelectorEngines`] tracks that one-time
//! registration explicitly instead of a bare mutable boolean.

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

use crate::query::Query;
use crate::report_logger::ReportLogger;
use crate::result::{UbicarError, UbicarResult};
use crate::schema::{GetByMethod, LocatorSchema, TextMatch};

/// Process-wide record of custom selector engines that have been installed.
///
/// Registration is idempotent: [`SelectorEngines::init`] returns `true` only
/// for the call that actually performed the registration. `reset` exists for
/// test isolation and process teardown.
#[derive(Debug)]
pub struct SelectorEngines;

fn engines() -> &'static Mutex<HashSet<String>> {
    static ENGINES: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();
    ENGINES.get_or_init(|| Mutex::new(HashSet::new()))
}

impl SelectorEngines {
    /// Mark `name` as installed. Returns `true` if this call performed the
    /// registration, `false` if it was already installed.
    pub fn init(name: &str) -> bool {
        engines()
            .lock()
            .map(|mut set| set.insert(name.to_string()))
            .unwrap_or(false)
    }

    /// Whether `name` has been installed.
    #[must_use]
    pub fn is_registered(name: &str) -> bool {
        engines()
            .lock()
            .map(|set| set.contains(name))
            .unwrap_or(false)
    }

    /// Forget all registrations (test/process teardown).
    pub fn reset() {
        if let Ok(mut set) = engines().lock() {
            set.clear();
        }
    }
}

/// Resolves elementary queries from locator schemas.
#[derive(Debug, Clone)]
pub struct GetBy {
    log: ReportLogger,
}

impl GetBy {
    /// Create a resolver logging under a child of `log`.
    #[must_use]
    pub fn new(log: &ReportLogger) -> Self {
        Self {
            log: log.child("GetBy"),
        }
    }

    /// Resolve the elementary query for `schema`'s strategy.
    pub fn elementary(&self, schema: &LocatorSchema) -> UbicarResult<Query> {
        match schema.def.locator_method {
            GetByMethod::Role => self.role(schema),
            GetByMethod::Text => self.text(schema),
            GetByMethod::Label => self.label(schema),
            GetByMethod::Placeholder => self.placeholder(schema),
            GetByMethod::AltText => self.alt_text(schema),
            GetByMethod::Title => self.title(schema),
            GetByMethod::Locator => self.locator(schema),
            GetByMethod::FrameLocator => self.frame_locator(schema),
            GetByMethod::TestId => self.test_id(schema),
            GetByMethod::DataCy => self.data_cy(schema),
            GetByMethod::Id => self.id(schema),
        }
    }

    fn missing(&self, schema: &LocatorSchema, field: &str) -> UbicarError {
        self.log.warn(&format!(
            "locator \"{}\" .{field} is not defined",
            schema.path
        ));
        UbicarError::StrategyFieldMissing {
            path: schema.path.clone(),
            method: schema.def.locator_method.as_str().to_string(),
            field: field.to_string(),
        }
    }

    fn role(&self, schema: &LocatorSchema) -> UbicarResult<Query> {
        let role = schema.def.role.ok_or_else(|| self.missing(schema, "role"))?;
        Ok(Query::Role {
            role,
            options: schema.def.role_options.clone(),
        })
    }

    fn text(&self, schema: &LocatorSchema) -> UbicarResult<Query> {
        let text = schema
            .def
            .text
            .clone()
            .ok_or_else(|| self.missing(schema, "text"))?;
        Ok(Query::Text {
            text,
            options: schema.def.text_options,
        })
    }

    fn label(&self, schema: &LocatorSchema) -> UbicarResult<Query> {
        let label = schema
            .def
            .label
            .clone()
            .ok_or_else(|| self.missing(schema, "label"))?;
        Ok(Query::Label {
            label,
            options: schema.def.label_options,
        })
    }

    fn placeholder(&self, schema: &LocatorSchema) -> UbicarResult<Query> {
        let placeholder = schema
            .def
            .placeholder
            .clone()
            .ok_or_else(|| self.missing(schema, "placeholder"))?;
        Ok(Query::Placeholder {
            placeholder,
            options: schema.def.placeholder_options,
        })
    }

    fn alt_text(&self, schema: &LocatorSchema) -> UbicarResult<Query> {
        let alt_text = schema
            .def
            .alt_text
            .clone()
            .ok_or_else(|| self.missing(schema, "altText"))?;
        Ok(Query::AltText {
            alt_text,
            options: schema.def.alt_text_options,
        })
    }

    fn title(&self, schema: &LocatorSchema) -> UbicarResult<Query> {
        let title = schema
            .def
            .title
            .clone()
            .ok_or_else(|| self.missing(schema, "title"))?;
        Ok(Query::Title {
            title,
            options: schema.def.title_options,
        })
    }

    fn locator(&self, schema: &LocatorSchema) -> UbicarResult<Query> {
        let selector = schema
            .def
            .locator
            .clone()
            .ok_or_else(|| self.missing(schema, "locator"))?;
        Ok(Query::Css {
            selector,
            options: schema.def.locator_options.clone(),
        })
    }

    fn frame_locator(&self, schema: &LocatorSchema) -> UbicarResult<Query> {
        let selector = schema
            .def
            .frame_locator
            .clone()
            .ok_or_else(|| self.missing(schema, "frameLocator"))?;
        Ok(Query::Frame { selector })
    }

    fn test_id(&self, schema: &LocatorSchema) -> UbicarResult<Query> {
        let test_id = schema
            .def
            .test_id
            .clone()
            .ok_or_else(|| self.missing(schema, "testId"))?;
        Ok(Query::TestId { test_id })
    }

    /// Backwards compatibility with Cypress test ids: the selector engine
    /// expects `data-cy=value`, with or without the prefix already present.
    fn data_cy(&self, schema: &LocatorSchema) -> UbicarResult<Query> {
        let data_cy = schema
            .def
            .data_cy
            .clone()
            .ok_or_else(|| self.missing(schema, "dataCy"))?;
        let selector = if data_cy.starts_with("data-cy=") {
            data_cy
        } else {
            format!("data-cy={data_cy}")
        };
        Ok(Query::Css {
            selector,
            options: None,
        })
    }

    fn id(&self, schema: &LocatorSchema) -> UbicarResult<Query> {
        let id = schema
            .def
            .id
            .clone()
            .ok_or_else(|| self.missing(schema, "id"))?;
        let selector = match id {
            TextMatch::Text(value) => {
                if value.starts_with('#') {
                    value
                } else if let Some(rest) = value.strip_prefix("id=") {
                    format!("#{rest}")
                } else {
                    format!("#{value}")
                }
            }
            // Pattern ids match on the id attribute prefix.
            TextMatch::Pattern(pattern) => format!("*[id^=\"{}\"]", pattern.source),
        };
        Ok(Query::Css {
            selector,
            options: None,
        })
    }
}
