//! Locator schema data model.
//!
//! A [`LocatorSchema`] is a named, strategy-tagged description of how to
//! locate one element: a [`GetByMethod`] discriminant, the strategy-specific
//! fields it points at, an optional embedded filter, and the immutable
//! registry path it was created under.
//!
//! To make tests resilient, prioritize user-facing attributes and explicit
//! contracts such as role locators (ARIA) over raw selectors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::query::LocatorFilter;

/// The locator strategy a schema selects.
///
/// Exactly one strategy is meaningful per schema; the corresponding strategy
/// field must be present or resolution fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GetByMethod {
    /// Locate by ARIA role (`role` + `roleOptions`)
    Role,
    /// Locate by text content (`text` + `textOptions`)
    Text,
    /// Locate by associated label text (`label` + `labelOptions`)
    Label,
    /// Locate by placeholder text (`placeholder` + `placeholderOptions`)
    Placeholder,
    /// Locate by image alt text (`altText` + `altTextOptions`)
    AltText,
    /// Locate by title attribute (`title` + `titleOptions`)
    Title,
    /// Locate by raw selector (`locator` + `locatorOptions`)
    Locator,
    /// Locate an iframe boundary (`frameLocator`)
    FrameLocator,
    /// Locate by test id attribute (`testId`)
    TestId,
    /// Locate by Cypress `data-cy` attribute (`dataCy`)
    DataCy,
    /// Locate by element id (`id`)
    Id,
}

impl GetByMethod {
    /// The strategy's camelCase wire name, as used in schema field names
    /// and error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::Text => "text",
            Self::Label => "label",
            Self::Placeholder => "placeholder",
            Self::AltText => "altText",
            Self::Title => "title",
            Self::Locator => "locator",
            Self::FrameLocator => "frameLocator",
            Self::TestId => "testId",
            Self::DataCy => "dataCy",
            Self::Id => "id",
        }
    }
}

impl fmt::Display for GetByMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ARIA roles accepted by the role strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum AriaRole {
    Alert,
    AlertDialog,
    Application,
    Article,
    Banner,
    Blockquote,
    Button,
    Caption,
    Cell,
    Checkbox,
    Code,
    ColumnHeader,
    Combobox,
    Complementary,
    ContentInfo,
    Definition,
    Deletion,
    Dialog,
    Directory,
    Document,
    Emphasis,
    Feed,
    Figure,
    Form,
    Generic,
    Grid,
    GridCell,
    Group,
    Heading,
    Img,
    Insertion,
    Link,
    List,
    ListBox,
    ListItem,
    Log,
    Main,
    Marquee,
    Math,
    Menu,
    MenuBar,
    MenuItem,
    MenuItemCheckbox,
    MenuItemRadio,
    Meter,
    Navigation,
    None,
    Note,
    Option,
    Paragraph,
    Presentation,
    ProgressBar,
    Radio,
    RadioGroup,
    Region,
    Row,
    RowGroup,
    RowHeader,
    ScrollBar,
    Search,
    SearchBox,
    Separator,
    Slider,
    SpinButton,
    Status,
    Strong,
    Subscript,
    Superscript,
    Switch,
    Tab,
    Table,
    TabList,
    TabPanel,
    Term,
    TextBox,
    Time,
    Timer,
    Toolbar,
    Tooltip,
    Tree,
    TreeGrid,
    TreeItem,
}

impl AriaRole {
    /// The lowercase role name as it appears on the page.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::AlertDialog => "alertdialog",
            Self::Application => "application",
            Self::Article => "article",
            Self::Banner => "banner",
            Self::Blockquote => "blockquote",
            Self::Button => "button",
            Self::Caption => "caption",
            Self::Cell => "cell",
            Self::Checkbox => "checkbox",
            Self::Code => "code",
            Self::ColumnHeader => "columnheader",
            Self::Combobox => "combobox",
            Self::Complementary => "complementary",
            Self::ContentInfo => "contentinfo",
            Self::Definition => "definition",
            Self::Deletion => "deletion",
            Self::Dialog => "dialog",
            Self::Directory => "directory",
            Self::Document => "document",
            Self::Emphasis => "emphasis",
            Self::Feed => "feed",
            Self::Figure => "figure",
            Self::Form => "form",
            Self::Generic => "generic",
            Self::Grid => "grid",
            Self::GridCell => "gridcell",
            Self::Group => "group",
            Self::Heading => "heading",
            Self::Img => "img",
            Self::Insertion => "insertion",
            Self::Link => "link",
            Self::List => "list",
            Self::ListBox => "listbox",
            Self::ListItem => "listitem",
            Self::Log => "log",
            Self::Main => "main",
            Self::Marquee => "marquee",
            Self::Math => "math",
            Self::Menu => "menu",
            Self::MenuBar => "menubar",
            Self::MenuItem => "menuitem",
            Self::MenuItemCheckbox => "menuitemcheckbox",
            Self::MenuItemRadio => "menuitemradio",
            Self::Meter => "meter",
            Self::Navigation => "navigation",
            Self::None => "none",
            Self::Note => "note",
            Self::Option => "option",
            Self::Paragraph => "paragraph",
            Self::Presentation => "presentation",
            Self::ProgressBar => "progressbar",
            Self::Radio => "radio",
            Self::RadioGroup => "radiogroup",
            Self::Region => "region",
            Self::Row => "row",
            Self::RowGroup => "rowgroup",
            Self::RowHeader => "rowheader",
            Self::ScrollBar => "scrollbar",
            Self::Search => "search",
            Self::SearchBox => "searchbox",
            Self::Separator => "separator",
            Self::Slider => "slider",
            Self::SpinButton => "spinbutton",
            Self::Status => "status",
            Self::Strong => "strong",
            Self::Subscript => "subscript",
            Self::Superscript => "superscript",
            Self::Switch => "switch",
            Self::Tab => "tab",
            Self::Table => "table",
            Self::TabList => "tablist",
            Self::TabPanel => "tabpanel",
            Self::Term => "term",
            Self::TextBox => "textbox",
            Self::Time => "time",
            Self::Timer => "timer",
            Self::Toolbar => "toolbar",
            Self::Tooltip => "tooltip",
            Self::Tree => "tree",
            Self::TreeGrid => "treegrid",
            Self::TreeItem => "treeitem",
        }
    }
}

impl fmt::Display for AriaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A regular-expression value: source plus JavaScript-style flags.
///
/// Stored structurally so deep copies duplicate source and flags rather than
/// aliasing a compiled engine object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// The pattern source
    pub source: String,
    /// Flags string; only `i`, `m`, `s` and `x` are honored when compiling
    #[serde(default)]
    pub flags: String,
}

impl Pattern {
    /// Create a pattern with no flags
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            flags: String::new(),
        }
    }

    /// Set the flags string
    #[must_use]
    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = flags.into();
        self
    }

    /// Create a case-insensitive pattern
    #[must_use]
    pub fn case_insensitive(source: impl Into<String>) -> Self {
        Self::new(source).with_flags("i")
    }

    /// Compile to a [`regex::Regex`], honoring the supported flags.
    pub fn to_regex(&self) -> Result<regex::Regex, regex::Error> {
        regex::RegexBuilder::new(&self.source)
            .case_insensitive(self.flags.contains('i'))
            .multi_line(self.flags.contains('m'))
            .dot_matches_new_line(self.flags.contains('s'))
            .ignore_whitespace(self.flags.contains('x'))
            .build()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

/// A text-valued schema field: either a literal string or a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextMatch {
    /// Literal text (substring match unless `exact` is set by options)
    Text(String),
    /// Regular-expression match
    Pattern(Pattern),
}

impl From<&str> for TextMatch {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TextMatch {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Pattern> for TextMatch {
    fn from(value: Pattern) -> Self {
        Self::Pattern(value)
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "'{}'", text.replace('\'', "\\'")),
            Self::Pattern(pattern) => pattern.fmt(f),
        }
    }
}

/// Options for the role strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleOptions {
    /// Whether the element is checked (aria-checked or native controls)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    /// Whether the element is disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    /// Whether the accessible name is matched exactly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact: Option<bool>,
    /// Whether the element is expanded (aria-expanded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
    /// Whether hidden elements are matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_hidden: Option<bool>,
    /// Accessibility hierarchy level (headings, list items, rows, tree items)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    /// The accessible name to match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<TextMatch>,
    /// Whether the element is pressed (aria-pressed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressed: Option<bool>,
    /// Whether the element is selected (aria-selected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl RoleOptions {
    /// Options matching an accessible name
    #[must_use]
    pub fn named(name: impl Into<TextMatch>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Options shared by the text-like strategies (text, label, placeholder,
/// altText, title): whether to match the value exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactOptions {
    /// Whether to match exactly (case-sensitive, whole string)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact: Option<bool>,
}

impl ExactOptions {
    /// Exact matching
    #[must_use]
    pub const fn exact() -> Self {
        Self { exact: Some(true) }
    }
}

/// A locator schema definition: everything except the registry path.
///
/// Construct with [`SchemaDef::new`] and the `with_*` builders, then register
/// it through the store, which fixes the path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDef {
    /// The preferred locator strategy for this schema
    pub locator_method: GetByMethod,
    /// The ARIA role of the element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<AriaRole>,
    /// Options for the role strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_options: Option<RoleOptions>,
    /// Text content to locate by
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextMatch>,
    /// Options for the text strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_options: Option<ExactOptions>,
    /// Label text to locate by
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<TextMatch>,
    /// Options for the label strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_options: Option<ExactOptions>,
    /// Placeholder text to locate by
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<TextMatch>,
    /// Options for the placeholder strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_options: Option<ExactOptions>,
    /// Image alt text to locate by
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<TextMatch>,
    /// Options for the altText strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text_options: Option<ExactOptions>,
    /// Title attribute to locate by
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<TextMatch>,
    /// Options for the title strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_options: Option<ExactOptions>,
    /// Raw selector for the locator strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
    /// Filtering options applied by the locator strategy itself
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator_options: Option<LocatorFilter>,
    /// Selector of an iframe boundary for the frameLocator strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_locator: Option<String>,
    /// Test id value for the testId strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_id: Option<TextMatch>,
    /// Cypress-style `data-cy` value, with or without the `data-cy=` prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_cy: Option<String>,
    /// Element id, literal or pattern, for the id strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<TextMatch>,
    /// Embedded filter applied by the builder at this schema's chain step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<LocatorFilter>,
}

impl SchemaDef {
    /// Create a definition for the given strategy with all fields unset
    #[must_use]
    pub fn new(locator_method: GetByMethod) -> Self {
        Self {
            locator_method,
            role: None,
            role_options: None,
            text: None,
            text_options: None,
            label: None,
            label_options: None,
            placeholder: None,
            placeholder_options: None,
            alt_text: None,
            alt_text_options: None,
            title: None,
            title_options: None,
            locator: None,
            locator_options: None,
            frame_locator: None,
            test_id: None,
            data_cy: None,
            id: None,
            filter: None,
        }
    }

    /// Shorthand for a role-strategy definition
    #[must_use]
    pub fn role(role: AriaRole) -> Self {
        Self::new(GetByMethod::Role).with_role(role)
    }

    /// Shorthand for a raw-selector definition
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(GetByMethod::Locator).with_locator(selector)
    }

    /// Shorthand for an iframe-boundary definition
    #[must_use]
    pub fn frame(selector: impl Into<String>) -> Self {
        Self::new(GetByMethod::FrameLocator).with_frame_locator(selector)
    }

    /// Set the ARIA role
    #[must_use]
    pub fn with_role(mut self, role: AriaRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the role options
    #[must_use]
    pub fn with_role_options(mut self, options: RoleOptions) -> Self {
        self.role_options = Some(options);
        self
    }

    /// Set the text to locate by
    #[must_use]
    pub fn with_text(mut self, text: impl Into<TextMatch>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the text options
    #[must_use]
    pub fn with_text_options(mut self, options: ExactOptions) -> Self {
        self.text_options = Some(options);
        self
    }

    /// Set the label to locate by
    #[must_use]
    pub fn with_label(mut self, label: impl Into<TextMatch>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the label options
    #[must_use]
    pub fn with_label_options(mut self, options: ExactOptions) -> Self {
        self.label_options = Some(options);
        self
    }

    /// Set the placeholder to locate by
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<TextMatch>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set the placeholder options
    #[must_use]
    pub fn with_placeholder_options(mut self, options: ExactOptions) -> Self {
        self.placeholder_options = Some(options);
        self
    }

    /// Set the alt text to locate by
    #[must_use]
    pub fn with_alt_text(mut self, alt_text: impl Into<TextMatch>) -> Self {
        self.alt_text = Some(alt_text.into());
        self
    }

    /// Set the altText options
    #[must_use]
    pub fn with_alt_text_options(mut self, options: ExactOptions) -> Self {
        self.alt_text_options = Some(options);
        self
    }

    /// Set the title to locate by
    #[must_use]
    pub fn with_title(mut self, title: impl Into<TextMatch>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the title options
    #[must_use]
    pub fn with_title_options(mut self, options: ExactOptions) -> Self {
        self.title_options = Some(options);
        self
    }

    /// Set the raw selector
    #[must_use]
    pub fn with_locator(mut self, selector: impl Into<String>) -> Self {
        self.locator = Some(selector.into());
        self
    }

    /// Set the locator-strategy filter options
    #[must_use]
    pub fn with_locator_options(mut self, options: LocatorFilter) -> Self {
        self.locator_options = Some(options);
        self
    }

    /// Set the iframe boundary selector
    #[must_use]
    pub fn with_frame_locator(mut self, selector: impl Into<String>) -> Self {
        self.frame_locator = Some(selector.into());
        self
    }

    /// Set the test id
    #[must_use]
    pub fn with_test_id(mut self, test_id: impl Into<TextMatch>) -> Self {
        self.test_id = Some(test_id.into());
        self
    }

    /// Set the `data-cy` value
    #[must_use]
    pub fn with_data_cy(mut self, data_cy: impl Into<String>) -> Self {
        self.data_cy = Some(data_cy.into());
        self
    }

    /// Set the element id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<TextMatch>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the embedded filter
    #[must_use]
    pub fn with_filter(mut self, filter: LocatorFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// A registered locator schema: a [`SchemaDef`] plus its immutable registry
/// path. The path is fixed at creation and may never be altered by updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatorSchema {
    /// The dot-delimited registry path of this schema
    #[serde(rename = "locatorSchemaPath")]
    pub path: String,
    /// The schema definition
    #[serde(flatten)]
    pub def: SchemaDef,
}

impl LocatorSchema {
    pub(crate) fn new(path: impl Into<String>, def: SchemaDef) -> Self {
        Self {
            path: path.into(),
            def,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod method_tests {
        use super::*;

        #[test]
        fn test_wire_names_are_camel_case() {
            assert_eq!(GetByMethod::FrameLocator.as_str(), "frameLocator");
            assert_eq!(GetByMethod::AltText.as_str(), "altText");
            assert_eq!(GetByMethod::DataCy.as_str(), "dataCy");
            assert_eq!(GetByMethod::Role.as_str(), "role");
        }

        #[test]
        fn test_serde_round_trip() {
            let json = serde_json::to_string(&GetByMethod::TestId).unwrap();
            assert_eq!(json, "\"testId\"");
            let back: GetByMethod = serde_json::from_str(&json).unwrap();
            assert_eq!(back, GetByMethod::TestId);
        }
    }

    mod pattern_tests {
        use super::*;

        #[test]
        fn test_clone_duplicates_source_and_flags() {
            let original = Pattern::case_insensitive("log.?in");
            let copy = original.clone();
            assert_eq!(copy.source, "log.?in");
            assert_eq!(copy.flags, "i");
        }

        #[test]
        fn test_case_insensitive_compilation() {
            let regex = Pattern::case_insensitive("login").to_regex().unwrap();
            assert!(regex.is_match("LOGIN"));
        }

        #[test]
        fn test_display() {
            assert_eq!(Pattern::case_insensitive("a.b").to_string(), "/a.b/i");
        }
    }

    mod text_match_tests {
        use super::*;

        #[test]
        fn test_untagged_serde() {
            let text: TextMatch = serde_json::from_str("\"Login\"").unwrap();
            assert_eq!(text, TextMatch::Text("Login".to_string()));

            let pattern: TextMatch =
                serde_json::from_str(r#"{"source":"log","flags":"i"}"#).unwrap();
            assert_eq!(pattern, TextMatch::Pattern(Pattern::case_insensitive("log")));
        }

        #[test]
        fn test_display_quotes_and_escapes() {
            let text: TextMatch = "it's".into();
            assert_eq!(text.to_string(), "'it\\'s'");
        }
    }

    mod schema_def_tests {
        use super::*;

        #[test]
        fn test_role_shorthand() {
            let def = SchemaDef::role(AriaRole::Button)
                .with_role_options(RoleOptions::named("Login"));
            assert_eq!(def.locator_method, GetByMethod::Role);
            assert_eq!(def.role, Some(AriaRole::Button));
        }

        #[test]
        fn test_serialization_is_camel_case_and_sparse() {
            let def = SchemaDef::frame("#checkout");
            let value = serde_json::to_value(&def).unwrap();
            assert_eq!(value["locatorMethod"], "frameLocator");
            assert_eq!(value["frameLocator"], "#checkout");
            assert!(value.get("roleOptions").is_none());
        }

        #[test]
        fn test_locator_schema_flattens_def() {
            let schema = LocatorSchema::new("a.b", SchemaDef::css(".x"));
            let value = serde_json::to_value(&schema).unwrap();
            assert_eq!(value["locatorSchemaPath"], "a.b");
            assert_eq!(value["locator"], ".x");
        }
    }

    mod aria_role_tests {
        use super::*;

        #[test]
        fn test_lowercase_names() {
            assert_eq!(AriaRole::Button.as_str(), "button");
            assert_eq!(AriaRole::MenuItemCheckbox.as_str(), "menuitemcheckbox");
            assert_eq!(AriaRole::TreeGrid.as_str(), "treegrid");
        }
    }
}
