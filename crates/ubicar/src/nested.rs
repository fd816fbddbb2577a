//! Nested-locator builder.
//!
//! Folds a snapshot of ancestor schemas into one composed [`Query`], root to
//! leaf: each registered prefix contributes its elementary query nested
//! inside the accumulated ancestor query, then its embedded filter (skipped
//! on iframe boundaries), then any overlay filters in insertion order, then
//! an occurrence index if one was requested for that chain position.
//!
//! When the logger is at debug level, each step additionally records what the
//! composed query matched through an attached [`DocumentEvaluator`]. That
//! instrumentation is best effort: evaluation failures are noted in the
//! record and never abort the fold. Once the chain crosses an iframe
//! boundary, that step and every step below it are recorded as unevaluated,
//! since the evaluator cannot reach into frame content.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::get_by::GetBy;
use crate::path::{path_index_pairs, PathIndexPair};
use crate::query::{LocatorFilter, Query};
use crate::report_logger::{LogLevel, ReportLogger};
use crate::result::{UbicarError, UbicarResult};
use crate::schema::LocatorSchema;

/// Upper bound on matched elements recorded per nesting step.
pub const MAX_RECORDED_ELEMENTS: usize = 25;

/// Best-effort window into a live document, used only for debug-level
/// evaluation records. Implementations adapt whatever automation library the
/// test suite drives; the engine itself never requires one.
pub trait DocumentEvaluator: Send + Sync {
    /// All elements currently matching `query`, in document order.
    fn find_all(&self, query: &Query) -> Result<Vec<ElementRecord>, Box<dyn std::error::Error>>;
}

/// A snapshot of one matched element, as recorded at debug level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementRecord {
    /// Lowercase tag name
    pub tag: String,
    /// Attribute name/value pairs, sorted by name
    pub attributes: BTreeMap<String, String>,
    /// Visible text content, possibly truncated by the evaluator
    pub text: String,
}

impl ElementRecord {
    /// A record with the given tag and no attributes or text
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            text: String::new(),
        }
    }

    /// Add one attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// Debug record of one fold step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NestingStep {
    /// The sub-path this step resolved
    pub sub_path: String,
    /// The composed query expression after this step
    pub expression: String,
    /// Elements matched at this step, capped at [`MAX_RECORDED_ELEMENTS`].
    /// `None` when evaluation was skipped or failed; see `note`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<Vec<ElementRecord>>,
    /// Why `matched` is absent, when it is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Folds snapshot schemas into a composed query.
pub(crate) struct NestedBuilder<'a> {
    log: ReportLogger,
    get_by: &'a GetBy,
    evaluator: Option<&'a dyn DocumentEvaluator>,
}

impl<'a> NestedBuilder<'a> {
    pub(crate) fn new(
        log: &ReportLogger,
        get_by: &'a GetBy,
        evaluator: Option<&'a dyn DocumentEvaluator>,
    ) -> Self {
        Self {
            log: log.child("NestedBuilder"),
            get_by,
            evaluator,
        }
    }

    /// Run the fold over `path`'s chain.
    ///
    /// `schemas` holds the snapshot entries in chain order; prefixes with no
    /// entry are skipped. `filters` holds overlay filters in insertion order.
    /// `indices` maps chain positions to occurrence indices.
    pub(crate) fn build(
        &self,
        path: &str,
        schemas: &[(String, LocatorSchema)],
        filters: &[(String, LocatorFilter)],
        indices: &HashMap<usize, usize>,
    ) -> UbicarResult<Query> {
        let mut accumulated: Option<Query> = None;
        let mut steps: Vec<NestingStep> = Vec::new();
        let mut in_frame = false;
        let debug = self.log.is_enabled(LogLevel::Debug);

        for (position, pair) in path_index_pairs(path, indices).iter().enumerate() {
            let Some((_, schema)) = schemas.iter().find(|(key, _)| key == &pair.path) else {
                continue;
            };

            let (composed, is_frame) =
                match self.compose_step(schema, pair, filters, accumulated.take()) {
                    Ok(step) => step,
                    Err(err) => {
                        self.log.error(&format!(
                            "failed to build nested locator for '{path}' at step '{}' (position {position}): {err}",
                            pair.path
                        ));
                        return Err(err);
                    }
                };
            in_frame = in_frame || is_frame;

            if debug {
                steps.push(self.record_step(&pair.path, &composed, in_frame));
            }
            accumulated = Some(composed);
        }

        if debug && !steps.is_empty() {
            if let Ok(report) = serde_json::to_string_pretty(&steps) {
                self.log
                    .debug(&format!("nested locator chain for '{path}':\n{report}"));
            }
        }

        accumulated.ok_or_else(|| UbicarError::BuildFailure {
            path: path.to_string(),
        })
    }

    /// Composes one step and reports whether its own schema is an iframe
    /// boundary (regardless of what the accumulated ancestor query is).
    fn compose_step(
        &self,
        schema: &LocatorSchema,
        pair: &PathIndexPair,
        filters: &[(String, LocatorFilter)],
        parent: Option<Query>,
    ) -> UbicarResult<(Query, bool)> {
        let elementary = self.get_by.elementary(schema)?;
        let is_frame = elementary.is_frame();

        let mut current = match parent {
            Some(parent) => parent.nest(elementary),
            None => elementary,
        };

        if is_frame {
            // Frame boundaries cannot be filtered; descendants resolve inside
            // the frame instead.
            if schema.def.filter.is_some()
                || filters.iter().any(|(key, _)| key == &pair.path)
            {
                self.log.warn(&format!(
                    "ignoring filters on frame boundary '{}'",
                    pair.path
                ));
            }
        } else {
            if let Some(filter) = &schema.def.filter {
                current = current.filter(filter.clone());
            }
            for (_, filter) in filters.iter().filter(|(key, _)| key == &pair.path) {
                current = current.filter(filter.clone());
            }
        }

        if let Some(index) = pair.index {
            current = current.nth(index);
        }

        Ok((current, is_frame))
    }

    /// `in_frame` is true from the iframe-boundary step onward; the
    /// evaluator is never consulted for those steps.
    fn record_step(&self, sub_path: &str, composed: &Query, in_frame: bool) -> NestingStep {
        let expression = composed.to_expression();

        let (matched, note) = if in_frame {
            (None, Some("iframe locators are not evaluated".to_string()))
        } else {
            match self.evaluator {
                Some(evaluator) => match evaluator.find_all(composed) {
                    Ok(mut elements) => {
                        elements.truncate(MAX_RECORDED_ELEMENTS);
                        (Some(elements), None)
                    }
                    Err(err) => {
                        self.log
                            .debug(&format!("evaluation failed for '{sub_path}': {err}"));
                        (None, Some(format!("evaluation failed: {err}")))
                    }
                },
                None => (None, Some("no evaluator attached".to_string())),
            }
        };

        NestingStep {
            sub_path: sub_path.to_string(),
            expression,
            matched,
            note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AriaRole, RoleOptions, SchemaDef};

    fn entry(path: &str, def: SchemaDef) -> (String, LocatorSchema) {
        (path.to_string(), LocatorSchema::new(path, def))
    }

    fn builder_parts(level: LogLevel) -> (ReportLogger, GetBy) {
        let log = ReportLogger::new(level, "test");
        let get_by = GetBy::new(&log);
        (log, get_by)
    }

    struct FixedEvaluator(Vec<ElementRecord>);

    impl DocumentEvaluator for FixedEvaluator {
        fn find_all(
            &self,
            _query: &Query,
        ) -> Result<Vec<ElementRecord>, Box<dyn std::error::Error>> {
            Ok(self.0.clone())
        }
    }

    struct FailingEvaluator;

    impl DocumentEvaluator for FailingEvaluator {
        fn find_all(
            &self,
            _query: &Query,
        ) -> Result<Vec<ElementRecord>, Box<dyn std::error::Error>> {
            Err("page closed".into())
        }
    }

    #[derive(Default)]
    struct CountingEvaluator {
        seen: std::sync::Mutex<Vec<String>>,
    }

    impl DocumentEvaluator for CountingEvaluator {
        fn find_all(
            &self,
            query: &Query,
        ) -> Result<Vec<ElementRecord>, Box<dyn std::error::Error>> {
            self.seen.lock().unwrap().push(query.to_expression());
            Ok(Vec::new())
        }
    }

    mod fold_tests {
        use super::*;

        #[test]
        fn test_full_chain_nests_root_to_leaf() {
            let (log, get_by) = builder_parts(LogLevel::Info);
            let builder = NestedBuilder::new(&log, &get_by, None);
            let schemas = vec![
                entry("body", SchemaDef::css(".login")),
                entry(
                    "body.button",
                    SchemaDef::role(AriaRole::Button)
                        .with_role_options(RoleOptions::named("Login")),
                ),
            ];

            let query = builder
                .build("body.button", &schemas, &[], &HashMap::new())
                .unwrap();
            assert_eq!(
                query.to_expression(),
                "page.locator('.login').getByRole('button', { name: 'Login' })"
            );
        }

        #[test]
        fn test_unregistered_prefixes_are_skipped() {
            let (log, get_by) = builder_parts(LogLevel::Info);
            let builder = NestedBuilder::new(&log, &get_by, None);
            // "a" and "a.b" have no snapshot entries
            let schemas = vec![entry("a.b.c", SchemaDef::css(".leaf"))];

            let query = builder
                .build("a.b.c", &schemas, &[], &HashMap::new())
                .unwrap();
            assert_eq!(query.to_expression(), "page.locator('.leaf')");
        }

        #[test]
        fn test_empty_chain_is_a_build_failure() {
            let (log, get_by) = builder_parts(LogLevel::Info);
            let builder = NestedBuilder::new(&log, &get_by, None);

            let err = builder
                .build("a.b", &[], &[], &HashMap::new())
                .unwrap_err();
            assert!(matches!(
                err,
                UbicarError::BuildFailure { ref path } if path == "a.b"
            ));
        }

        #[test]
        fn test_step_error_is_logged_then_raised() {
            let (log, get_by) = builder_parts(LogLevel::Info);
            let builder = NestedBuilder::new(&log, &get_by, None);
            // role strategy without a role fails at the first step
            let schemas = vec![entry("a", SchemaDef::new(crate::schema::GetByMethod::Role))];

            let err = builder.build("a", &schemas, &[], &HashMap::new()).unwrap_err();
            assert!(matches!(err, UbicarError::StrategyFieldMissing { .. }));
            assert!(log
                .export()
                .iter()
                .any(|e| e.level == LogLevel::Error && e.message.contains("at step 'a'")));
        }
    }

    mod filter_tests {
        use super::*;

        #[test]
        fn test_schema_filter_then_overlays_in_insertion_order() {
            let (log, get_by) = builder_parts(LogLevel::Info);
            let builder = NestedBuilder::new(&log, &get_by, None);
            let schemas = vec![entry(
                "list",
                SchemaDef::css("ul").with_filter(LocatorFilter::new().has_text("Inventory")),
            )];
            let filters = vec![
                ("list".to_string(), LocatorFilter::new().has_text("first")),
                ("list".to_string(), LocatorFilter::new().has_text("second")),
            ];

            let query = builder
                .build("list", &schemas, &filters, &HashMap::new())
                .unwrap();
            assert_eq!(
                query.to_expression(),
                "page.locator('ul').filter({ hasText: 'Inventory' })\
                 .filter({ hasText: 'first' }).filter({ hasText: 'second' })"
            );
        }

        #[test]
        fn test_frame_boundary_skips_filters() {
            let (log, get_by) = builder_parts(LogLevel::Info);
            let builder = NestedBuilder::new(&log, &get_by, None);
            let schemas = vec![
                entry(
                    "frame",
                    SchemaDef::frame("#checkout")
                        .with_filter(LocatorFilter::new().has_text("ignored")),
                ),
                entry("frame.button", SchemaDef::role(AriaRole::Button)),
            ];

            let query = builder
                .build("frame.button", &schemas, &[], &HashMap::new())
                .unwrap();
            assert_eq!(
                query.to_expression(),
                "page.frameLocator('#checkout').getByRole('button')"
            );
            assert!(log
                .export()
                .iter()
                .any(|e| e.message.contains("ignoring filters on frame boundary")));
        }

        #[test]
        fn test_nth_applies_after_filters() {
            let (log, get_by) = builder_parts(LogLevel::Info);
            let builder = NestedBuilder::new(&log, &get_by, None);
            let schemas = vec![entry(
                "row",
                SchemaDef::css("tr").with_filter(LocatorFilter::new().has_text("Total")),
            )];
            let indices = HashMap::from([(0usize, 2usize)]);

            let query = builder.build("row", &schemas, &[], &indices).unwrap();
            assert_eq!(
                query.to_expression(),
                "page.locator('tr').filter({ hasText: 'Total' }).nth(2)"
            );
        }
    }

    mod debug_record_tests {
        use super::*;

        #[test]
        fn test_debug_level_records_each_step() {
            let (log, get_by) = builder_parts(LogLevel::Debug);
            let evaluator = FixedEvaluator(vec![ElementRecord::new("button")
                .with_attribute("class", "primary")
                .with_text("Login")]);
            let builder = NestedBuilder::new(&log, &get_by, Some(&evaluator));
            let schemas = vec![
                entry("body", SchemaDef::css(".login")),
                entry("body.button", SchemaDef::role(AriaRole::Button)),
            ];

            builder
                .build("body.button", &schemas, &[], &HashMap::new())
                .unwrap();

            let report = log
                .export()
                .into_iter()
                .find(|e| e.message.contains("nested locator chain"))
                .expect("debug chain report");
            assert!(report.message.contains("page.locator('.login')"));
            assert!(report.message.contains("\"tag\": \"button\""));
        }

        #[test]
        fn test_evaluation_failure_degrades_but_build_succeeds() {
            let (log, get_by) = builder_parts(LogLevel::Debug);
            let builder = NestedBuilder::new(&log, &get_by, Some(&FailingEvaluator));
            let schemas = vec![entry("body", SchemaDef::css(".login"))];

            let query = builder
                .build("body", &schemas, &[], &HashMap::new())
                .unwrap();
            assert_eq!(query.to_expression(), "page.locator('.login')");
            assert!(log
                .export()
                .iter()
                .any(|e| e.message.contains("evaluation failed") && e.message.contains("page closed")));
        }

        #[test]
        fn test_recorded_elements_are_capped() {
            let (log, get_by) = builder_parts(LogLevel::Debug);
            let evaluator =
                FixedEvaluator(vec![ElementRecord::new("li"); MAX_RECORDED_ELEMENTS + 10]);
            let builder = NestedBuilder::new(&log, &get_by, Some(&evaluator));

            let step = builder.record_step(
                "list",
                &Query::Css {
                    selector: "li".to_string(),
                    options: None,
                },
                false,
            );
            assert_eq!(step.matched.unwrap().len(), MAX_RECORDED_ELEMENTS);
        }

        #[test]
        fn test_steps_from_frame_boundary_onward_are_not_evaluated() {
            let (log, get_by) = builder_parts(LogLevel::Debug);
            let evaluator = CountingEvaluator::default();
            let builder = NestedBuilder::new(&log, &get_by, Some(&evaluator));
            let schemas = vec![
                entry("body", SchemaDef::css(".login")),
                entry("body.consent", SchemaDef::frame("#consent")),
                entry("body.consent.accept", SchemaDef::role(AriaRole::Button)),
            ];

            builder
                .build("body.consent.accept", &schemas, &[], &HashMap::new())
                .unwrap();

            // only the step above the frame reaches the evaluator
            let seen = evaluator.seen.lock().unwrap();
            assert_eq!(seen.as_slice(), ["page.locator('.login')"]);

            let report = log
                .export()
                .into_iter()
                .find(|e| e.message.contains("nested locator chain"))
                .expect("debug chain report");
            assert_eq!(
                report
                    .message
                    .matches("iframe locators are not evaluated")
                    .count(),
                2
            );
        }

        #[test]
        fn test_info_level_skips_evaluation_entirely() {
            let (log, get_by) = builder_parts(LogLevel::Info);
            let builder = NestedBuilder::new(&log, &get_by, Some(&FailingEvaluator));
            let schemas = vec![entry("body", SchemaDef::css(".login"))];

            // failing evaluator is never consulted below debug level
            builder
                .build("body", &schemas, &[], &HashMap::new())
                .unwrap();
            assert!(log.export().is_empty());
        }
    }
}
