//! Validated recursive merge of partial updates into snapshot schemas.
//!
//! Updates are JSON-shaped partials validated against [`SCHEMA_FIELDS`], the
//! runtime description of every legal schema field and how it merges. The
//! merge never touches the registry's originals; it produces a new schema
//! value for the snapshot slot.
//!
//! Merge semantics, applied field by field:
//! - the path identity field (`locatorSchemaPath`) may never be supplied;
//! - array values concatenate onto the existing array;
//! - pattern values (string-or-regex fields) are replaced wholesale, with
//!   source and flags carried by value;
//! - opaque query values (`has`/`hasNot` targets) are replaced wholesale and
//!   never merged structurally;
//! - nested option objects merge key by key, recursively;
//! - everything else is overwritten by the incoming value.

use serde::de::Error as _;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::query::LocatorFilter;
use crate::result::{UbicarError, UbicarResult};
use crate::schema::{
    AriaRole, ExactOptions, GetByMethod, LocatorSchema, RoleOptions, TextMatch,
};

/// How one schema field participates in a merge.
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    /// Overwritten by the incoming value (arrays concatenate)
    Scalar,
    /// String-or-regex value, replaced wholesale
    Pattern,
    /// Opaque query value, replaced wholesale, never merged structurally
    Opaque,
    /// Nested option object, merged key by key
    Object(&'static [Field]),
}

#[derive(Debug, Clone, Copy)]
struct Field {
    name: &'static str,
    kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> Field {
    Field { name, kind }
}

const EXACT_OPTION_FIELDS: &[Field] = &[field("exact", FieldKind::Scalar)];

const ROLE_OPTION_FIELDS: &[Field] = &[
    field("checked", FieldKind::Scalar),
    field("disabled", FieldKind::Scalar),
    field("exact", FieldKind::Scalar),
    field("expanded", FieldKind::Scalar),
    field("includeHidden", FieldKind::Scalar),
    field("level", FieldKind::Scalar),
    field("name", FieldKind::Pattern),
    field("pressed", FieldKind::Scalar),
    field("selected", FieldKind::Scalar),
];

const FILTER_FIELDS: &[Field] = &[
    field("has", FieldKind::Opaque),
    field("hasNot", FieldKind::Opaque),
    field("hasText", FieldKind::Pattern),
    field("hasNotText", FieldKind::Pattern),
];

/// The full legal field set of a locator schema. The immutable
/// `locatorSchemaPath` is deliberately absent; supplying it is an identity
/// mutation, not an unknown field.
const SCHEMA_FIELDS: &[Field] = &[
    field("locatorMethod", FieldKind::Scalar),
    field("role", FieldKind::Scalar),
    field("roleOptions", FieldKind::Object(ROLE_OPTION_FIELDS)),
    field("text", FieldKind::Pattern),
    field("textOptions", FieldKind::Object(EXACT_OPTION_FIELDS)),
    field("label", FieldKind::Pattern),
    field("labelOptions", FieldKind::Object(EXACT_OPTION_FIELDS)),
    field("placeholder", FieldKind::Pattern),
    field("placeholderOptions", FieldKind::Object(EXACT_OPTION_FIELDS)),
    field("altText", FieldKind::Pattern),
    field("altTextOptions", FieldKind::Object(EXACT_OPTION_FIELDS)),
    field("title", FieldKind::Pattern),
    field("titleOptions", FieldKind::Object(EXACT_OPTION_FIELDS)),
    field("locator", FieldKind::Scalar),
    field("locatorOptions", FieldKind::Object(FILTER_FIELDS)),
    field("frameLocator", FieldKind::Scalar),
    field("testId", FieldKind::Pattern),
    field("dataCy", FieldKind::Scalar),
    field("id", FieldKind::Pattern),
    field("filter", FieldKind::Object(FILTER_FIELDS)),
];

/// A partial update to one schema in a snapshot.
///
/// Build with the typed setters, or from dynamic input via
/// [`SchemaUpdate::from_value`]. Either way, the same validation applies
/// when the update is merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaUpdate {
    fields: Map<String, Value>,
}

impl SchemaUpdate {
    /// An empty update
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an update from a JSON object of field partials.
    pub fn from_value(value: Value) -> UbicarResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(UbicarError::Json(serde_json::Error::custom(format!(
                "schema update must be a JSON object, got: {other}"
            )))),
        }
    }

    fn with(mut self, name: &str, value: impl Serialize) -> Self {
        if let Ok(json) = serde_json::to_value(value) {
            let _ = self.fields.insert(name.to_string(), json);
        }
        self
    }

    /// Change the locator strategy
    #[must_use]
    pub fn locator_method(self, method: GetByMethod) -> Self {
        self.with("locatorMethod", method)
    }

    /// Change the ARIA role
    #[must_use]
    pub fn role(self, role: AriaRole) -> Self {
        self.with("role", role)
    }

    /// Merge fields into the role options (sibling keys are preserved)
    #[must_use]
    pub fn role_options(self, options: RoleOptions) -> Self {
        self.with("roleOptions", options)
    }

    /// Replace the text value
    #[must_use]
    pub fn text(self, text: impl Into<TextMatch>) -> Self {
        self.with("text", text.into())
    }

    /// Merge fields into the text options
    #[must_use]
    pub fn text_options(self, options: ExactOptions) -> Self {
        self.with("textOptions", options)
    }

    /// Replace the label value
    #[must_use]
    pub fn label(self, label: impl Into<TextMatch>) -> Self {
        self.with("label", label.into())
    }

    /// Merge fields into the label options
    #[must_use]
    pub fn label_options(self, options: ExactOptions) -> Self {
        self.with("labelOptions", options)
    }

    /// Replace the placeholder value
    #[must_use]
    pub fn placeholder(self, placeholder: impl Into<TextMatch>) -> Self {
        self.with("placeholder", placeholder.into())
    }

    /// Replace the alt text value
    #[must_use]
    pub fn alt_text(self, alt_text: impl Into<TextMatch>) -> Self {
        self.with("altText", alt_text.into())
    }

    /// Replace the title value
    #[must_use]
    pub fn title(self, title: impl Into<TextMatch>) -> Self {
        self.with("title", title.into())
    }

    /// Replace the raw selector
    #[must_use]
    pub fn locator(self, selector: impl Into<String>) -> Self {
        self.with("locator", selector.into())
    }

    /// Merge predicates into the locator-strategy filter options
    #[must_use]
    pub fn locator_options(self, options: LocatorFilter) -> Self {
        self.with("locatorOptions", options)
    }

    /// Replace the iframe boundary selector
    #[must_use]
    pub fn frame_locator(self, selector: impl Into<String>) -> Self {
        self.with("frameLocator", selector.into())
    }

    /// Replace the test id
    #[must_use]
    pub fn test_id(self, test_id: impl Into<TextMatch>) -> Self {
        self.with("testId", test_id.into())
    }

    /// Replace the `data-cy` value
    #[must_use]
    pub fn data_cy(self, data_cy: impl Into<String>) -> Self {
        self.with("dataCy", data_cy.into())
    }

    /// Replace the element id
    #[must_use]
    pub fn id(self, id: impl Into<TextMatch>) -> Self {
        self.with("id", id.into())
    }

    /// Merge predicates into the embedded filter
    #[must_use]
    pub fn filter(self, filter: LocatorFilter) -> Self {
        self.with("filter", filter)
    }

    /// Attempt to change the path identity. Always rejected when the update
    /// is applied; exists so the illegal transition surfaces as
    /// [`UbicarError::IllegalIdentityMutation`] instead of being silently
    /// unexpressible.
    #[must_use]
    pub fn path(self, path: impl Into<String>) -> Self {
        self.with("locatorSchemaPath", path.into())
    }

    /// Set a field by its camelCase wire name with a raw JSON value.
    /// Unknown names are rejected when the update is applied.
    #[must_use]
    pub fn set(self, name: &str, value: Value) -> Self {
        let mut update = self;
        let _ = update.fields.insert(name.to_string(), value);
        update
    }

    /// Combine two updates into one; on conflicting keys `other` wins.
    /// For disjoint field sets, applying the combination equals applying the
    /// two updates in sequence.
    #[must_use]
    pub fn merged(mut self, other: SchemaUpdate) -> Self {
        self.fields.extend(other.fields);
        self
    }

    /// Whether the update carries no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Merge `update` into `schema`, producing the new schema value.
pub(crate) fn apply_update(
    owner: &str,
    schema: &LocatorSchema,
    update: &SchemaUpdate,
) -> UbicarResult<LocatorSchema> {
    let target = match serde_json::to_value(schema)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let merged = merge_level(owner, &target, &update.fields, SCHEMA_FIELDS)?;
    Ok(serde_json::from_value(Value::Object(merged))?)
}

fn merge_level(
    owner: &str,
    target: &Map<String, Value>,
    source: &Map<String, Value>,
    fields: &[Field],
) -> UbicarResult<Map<String, Value>> {
    // New map rather than in-place mutation keeps the caller's value intact
    // if a later key fails validation.
    let mut merged = target.clone();

    for (key, source_value) in source {
        if key == "locatorSchemaPath" {
            return Err(UbicarError::IllegalIdentityMutation {
                owner: owner.to_string(),
                from: target
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                to: source_value
                    .as_str()
                    .map_or_else(|| source_value.to_string(), str::to_string),
            });
        }

        let Some(descriptor) = fields.iter().find(|f| f.name == key) else {
            return Err(UbicarError::InvalidProperty { field: key.clone() });
        };

        let new_value = match descriptor.kind {
            FieldKind::Object(sub_fields) => {
                if let Value::Object(source_obj) = source_value {
                    let target_obj = merged
                        .get(key)
                        .and_then(Value::as_object)
                        .cloned()
                        .unwrap_or_default();
                    Value::Object(merge_level(owner, &target_obj, source_obj, sub_fields)?)
                } else {
                    source_value.clone()
                }
            }
            FieldKind::Scalar if source_value.is_array() => {
                let mut combined = merged
                    .get(key)
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                combined.extend(source_value.as_array().into_iter().flatten().cloned());
                Value::Array(combined)
            }
            FieldKind::Scalar | FieldKind::Pattern | FieldKind::Opaque => source_value.clone(),
        };
        let _ = merged.insert(key.clone(), new_value);
    }

    Ok(merged)
}
