//! Composed query model.
//!
//! The engine never touches a live document; it computes *what to ask for*.
//! [`Query`] is the concrete value standing in for the automation library's
//! locator object: an elementary strategy lookup, or a tree built from the
//! composition primitives [`Query::nest`], [`Query::filter`] and
//! [`Query::nth`]. Every query renders to a Playwright-style expression
//! string, which is what tests and debug records assert on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;

use crate::schema::{AriaRole, ExactOptions, RoleOptions, TextMatch};

/// Filtering criteria applied to a query, equivalent to the automation
/// library's `filter({...})` call.
///
/// `has`/`has_not` narrow by a descendant query; `has_text`/`has_not_text`
/// narrow by text content (case-insensitive substring for literal strings).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatorFilter {
    /// Keep elements containing a match for this query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has: Option<Box<Query>>,
    /// Drop elements containing a match for this query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_not: Option<Box<Query>>,
    /// Keep elements whose text matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_text: Option<TextMatch>,
    /// Drop elements whose text matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_not_text: Option<TextMatch>,
}

impl LocatorFilter {
    /// An empty filter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep elements containing a match for `query`
    #[must_use]
    pub fn has(mut self, query: Query) -> Self {
        self.has = Some(Box::new(query));
        self
    }

    /// Drop elements containing a match for `query`
    #[must_use]
    pub fn has_not(mut self, query: Query) -> Self {
        self.has_not = Some(Box::new(query));
        self
    }

    /// Keep elements whose text matches
    #[must_use]
    pub fn has_text(mut self, text: impl Into<TextMatch>) -> Self {
        self.has_text = Some(text.into());
        self
    }

    /// Drop elements whose text matches
    #[must_use]
    pub fn has_not_text(mut self, text: impl Into<TextMatch>) -> Self {
        self.has_not_text = Some(text.into());
        self
    }

    fn render(&self) -> String {
        let mut parts = Vec::new();
        if let Some(has) = &self.has {
            parts.push(format!("has: {}", has.to_expression()));
        }
        if let Some(has_not) = &self.has_not {
            parts.push(format!("hasNot: {}", has_not.to_expression()));
        }
        if let Some(has_text) = &self.has_text {
            parts.push(format!("hasText: {has_text}"));
        }
        if let Some(has_not_text) = &self.has_not_text {
            parts.push(format!("hasNotText: {has_not_text}"));
        }
        format!("{{ {} }}", parts.join(", "))
    }
}

/// A composed query: the engine's output.
///
/// Elementary variants correspond one-to-one to the locator strategies of
/// [`crate::GetByMethod`]; the structural variants record nesting,
/// filtering and occurrence selection in the order they were applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Query {
    /// Lookup by ARIA role
    Role {
        /// The role to match
        role: AriaRole,
        /// Optional role options
        options: Option<RoleOptions>,
    },
    /// Lookup by text content
    Text {
        /// The text to match
        text: TextMatch,
        /// Optional exactness options
        options: Option<ExactOptions>,
    },
    /// Lookup by associated label
    Label {
        /// The label text to match
        label: TextMatch,
        /// Optional exactness options
        options: Option<ExactOptions>,
    },
    /// Lookup by placeholder text
    Placeholder {
        /// The placeholder text to match
        placeholder: TextMatch,
        /// Optional exactness options
        options: Option<ExactOptions>,
    },
    /// Lookup by image alt text
    AltText {
        /// The alt text to match
        alt_text: TextMatch,
        /// Optional exactness options
        options: Option<ExactOptions>,
    },
    /// Lookup by title attribute
    Title {
        /// The title to match
        title: TextMatch,
        /// Optional exactness options
        options: Option<ExactOptions>,
    },
    /// Lookup by raw selector
    Css {
        /// The selector
        selector: String,
        /// Optional filtering options applied at lookup time
        options: Option<LocatorFilter>,
    },
    /// An iframe boundary; descendant lookups resolve inside the frame
    Frame {
        /// The iframe selector
        selector: String,
    },
    /// Lookup by test id attribute
    TestId {
        /// The test id to match
        test_id: TextMatch,
    },
    /// A child query narrowed by its ancestor (descendant lookup)
    Nested {
        /// The ancestor query
        parent: Box<Query>,
        /// The descendant query resolved within the ancestor
        child: Box<Query>,
    },
    /// A query narrowed by a filter
    Filtered {
        /// The query being filtered
        base: Box<Query>,
        /// The filter criteria
        filter: LocatorFilter,
    },
    /// The nth occurrence (zero-based) of a query's matches
    Nth {
        /// The query being indexed
        base: Box<Query>,
        /// Zero-based occurrence index
        index: usize,
    },
}

impl Query {
    /// Compose `child` inside `self`: descendant lookup narrowed by ancestor.
    #[must_use]
    pub fn nest(self, child: Query) -> Query {
        Query::Nested {
            parent: Box::new(self),
            child: Box::new(child),
        }
    }

    /// Narrow this query by a filter.
    #[must_use]
    pub fn filter(self, filter: LocatorFilter) -> Query {
        Query::Filtered {
            base: Box::new(self),
            filter,
        }
    }

    /// Select the zero-based `index`th occurrence of this query's matches.
    #[must_use]
    pub fn nth(self, index: usize) -> Query {
        Query::Nth {
            base: Box::new(self),
            index,
        }
    }

    /// Whether the outermost step of this query is an iframe boundary.
    #[must_use]
    pub fn is_frame(&self) -> bool {
        matches!(self, Query::Frame { .. })
    }

    /// Render the full expression, anchored at the page.
    #[must_use]
    pub fn to_expression(&self) -> String {
        format!("page.{}", self.render())
    }

    fn render(&self) -> String {
        match self {
            Self::Role { role, options } => match options.as_ref().map(render_role_options) {
                Some(opts) if !opts.is_empty() => format!("getByRole('{role}', {opts})"),
                _ => format!("getByRole('{role}')"),
            },
            Self::Text { text, options } => render_text_method("getByText", text, options),
            Self::Label { label, options } => render_text_method("getByLabel", label, options),
            Self::Placeholder {
                placeholder,
                options,
            } => render_text_method("getByPlaceholder", placeholder, options),
            Self::AltText { alt_text, options } => {
                render_text_method("getByAltText", alt_text, options)
            }
            Self::Title { title, options } => render_text_method("getByTitle", title, options),
            Self::Css { selector, options } => match options {
                Some(filter) => format!("locator('{selector}', {})", filter.render()),
                None => format!("locator('{selector}')"),
            },
            Self::Frame { selector } => format!("frameLocator('{selector}')"),
            Self::TestId { test_id } => format!("getByTestId({test_id})"),
            Self::Nested { parent, child } => {
                format!("{}.{}", parent.render(), child.render())
            }
            Self::Filtered { base, filter } => {
                format!("{}.filter({})", base.render(), filter.render())
            }
            Self::Nth { base, index } => format!("{}.nth({index})", base.render()),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_expression())
    }
}

fn render_text_method(method: &str, text: &TextMatch, options: &Option<ExactOptions>) -> String {
    match options.as_ref().and_then(|o| o.exact) {
        Some(exact) => format!("{method}({text}, {{ exact: {exact} }})"),
        None => format!("{method}({text})"),
    }
}

fn render_role_options(options: &RoleOptions) -> String {
    let mut out = String::new();
    let mut push = |name: &str, value: String| {
        if !out.is_empty() {
            out.push_str(", ");
        }
        let _ = write!(out, "{name}: {value}");
    };
    if let Some(v) = options.checked {
        push("checked", v.to_string());
    }
    if let Some(v) = options.disabled {
        push("disabled", v.to_string());
    }
    if let Some(v) = options.exact {
        push("exact", v.to_string());
    }
    if let Some(v) = options.expanded {
        push("expanded", v.to_string());
    }
    if let Some(v) = options.include_hidden {
        push("includeHidden", v.to_string());
    }
    if let Some(v) = options.level {
        push("level", v.to_string());
    }
    if let Some(v) = &options.name {
        push("name", v.to_string());
    }
    if let Some(v) = options.pressed {
        push("pressed", v.to_string());
    }
    if let Some(v) = options.selected {
        push("selected", v.to_string());
    }
    if out.is_empty() {
        String::new()
    } else {
        format!("{{ {out} }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Pattern;

    mod elementary_tests {
        use super::*;

        #[test]
        fn test_role_with_name() {
            let query = Query::Role {
                role: AriaRole::Button,
                options: Some(RoleOptions::named("Login")),
            };
            assert_eq!(
                query.to_expression(),
                "page.getByRole('button', { name: 'Login' })"
            );
        }

        #[test]
        fn test_role_without_options() {
            let query = Query::Role {
                role: AriaRole::Navigation,
                options: None,
            };
            assert_eq!(query.to_expression(), "page.getByRole('navigation')");
        }

        #[test]
        fn test_text_with_pattern() {
            let query = Query::Text {
                text: Pattern::case_insensitive("user info").into(),
                options: None,
            };
            assert_eq!(query.to_expression(), "page.getByText(/user info/i)");
        }

        #[test]
        fn test_label_exact() {
            let query = Query::Label {
                label: "Username".into(),
                options: Some(ExactOptions::exact()),
            };
            assert_eq!(
                query.to_expression(),
                "page.getByLabel('Username', { exact: true })"
            );
        }

        #[test]
        fn test_css_and_frame() {
            let css = Query::Css {
                selector: ".login".to_string(),
                options: None,
            };
            assert_eq!(css.to_expression(), "page.locator('.login')");

            let frame = Query::Frame {
                selector: "#checkout".to_string(),
            };
            assert!(frame.is_frame());
            assert_eq!(frame.to_expression(), "page.frameLocator('#checkout')");
        }
    }

    mod composition_tests {
        use super::*;

        fn css(selector: &str) -> Query {
            Query::Css {
                selector: selector.to_string(),
                options: None,
            }
        }

        #[test]
        fn test_nesting_reads_root_to_leaf() {
            let query = css(".a").nest(css(".b")).nest(css(".c"));
            assert_eq!(
                query.to_expression(),
                "page.locator('.a').locator('.b').locator('.c')"
            );
        }

        #[test]
        fn test_filter_renders_all_predicates() {
            let query = css("section").filter(
                LocatorFilter::new()
                    .has(css(".badge"))
                    .has_text("User Info:"),
            );
            assert_eq!(
                query.to_expression(),
                "page.locator('section').filter({ has: page.locator('.badge'), hasText: 'User Info:' })"
            );
        }

        #[test]
        fn test_nth_selects_occurrence() {
            let query = css("li").nth(2);
            assert_eq!(query.to_expression(), "page.locator('li').nth(2)");
        }

        #[test]
        fn test_serde_round_trip() {
            let query = css(".a").nest(css(".b")).nth(1);
            let json = serde_json::to_string(&query).unwrap();
            let back: Query = serde_json::from_str(&json).unwrap();
            assert_eq!(back, query);
        }
    }
}
