//! Model schemas
//!
//! An entity opts into the CRUD layer by registering a [`ModelSchema`]: its
//! route name, collection, field rules and references. The schema is strict:
//! keys it does not declare are dropped from incoming payloads.
//!
//! ```rust,ignore
//! let schema = ModelSchema::new("client", "Client", "clients")
//!     .field(FieldRule::new("name", FieldKind::String).required())
//!     .field(FieldRule::new("email", FieldKind::String))
//!     .search_fields(&["name", "email"]);
//! ```

use crate::core::document::{
    CREATED_KEY, Document, DocumentId, ENABLED_KEY, ID_KEY, REMOVED_KEY, UPDATED_KEY,
    now_timestamp,
};
use crate::core::error::{CrudError, FieldError};
use crate::core::validation::{filters, validators};
use serde_json::Value;

/// Storage type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    Date,
    /// Identifier of a document in another collection
    Reference,
    Array,
    Object,
    Any,
}

/// Declaration of one field
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
    pub allowed: Option<Vec<String>>,
    /// Rules applied to every element of an array of objects
    pub item_fields: Option<Vec<FieldRule>>,
}

impl FieldRule {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            allowed: None,
            item_fields: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn allowed(mut self, values: &[&str]) -> Self {
        self.allowed = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn items(mut self, rules: Vec<FieldRule>) -> Self {
        self.item_fields = Some(rules);
        self
    }

    /// Cast and check a provided value, recording failures under `path`
    fn check(&self, path: &str, value: Value, errors: &mut Vec<FieldError>) -> Option<Value> {
        let cast = match self.kind {
            FieldKind::String => match value {
                Value::Number(n) => Ok(Value::String(n.to_string())),
                Value::Bool(b) => Ok(Value::String(b.to_string())),
                Value::String(_) | Value::Null => {
                    filters::trim()(path, value).map_err(|e| e.to_string())
                }
                other => Err(format!(
                    "Cast to string failed for value \"{}\" at path \"{}\"",
                    other, path
                )),
            },
            FieldKind::Number => filters::to_number()(path, value).map_err(|e| e.to_string()),
            FieldKind::Boolean => filters::to_boolean()(path, value).map_err(|e| e.to_string()),
            FieldKind::Date => validators::date()(path, &value).map(|_| value),
            FieldKind::Reference => match value {
                Value::String(ref s) => DocumentId::parse(s)
                    .map(|id| Value::String(id.to_string()))
                    .map_err(|_| {
                        format!(
                            "Cast to ObjectId failed for value \"{}\" at path \"{}\"",
                            s, path
                        )
                    }),
                Value::Null => Ok(value),
                other => Err(format!(
                    "Cast to ObjectId failed for value \"{}\" at path \"{}\"",
                    other, path
                )),
            },
            FieldKind::Array => match value {
                Value::Array(elements) => Ok(Value::Array(self.check_elements(path, elements, errors))),
                Value::Null => Ok(Value::Null),
                other => Err(format!(
                    "Cast to Array failed for value \"{}\" at path \"{}\"",
                    other, path
                )),
            },
            FieldKind::Object => match value {
                Value::Object(_) | Value::Null => Ok(value),
                other => Err(format!(
                    "Cast to Object failed for value \"{}\" at path \"{}\"",
                    other, path
                )),
            },
            FieldKind::Any => Ok(value),
        };

        let value = match cast {
            Ok(v) => v,
            Err(message) => {
                errors.push(FieldError::new(path, message));
                return None;
            }
        };

        if self.required
            && let Err(message) = validators::required()(path, &value)
        {
            errors.push(FieldError::new(path, message));
            return None;
        }

        if let Some(allowed) = &self.allowed
            && let Err(message) = validators::in_list(allowed.clone())(path, &value)
        {
            errors.push(FieldError::new(path, message));
            return None;
        }

        Some(value)
    }

    fn check_elements(
        &self,
        path: &str,
        elements: Vec<Value>,
        errors: &mut Vec<FieldError>,
    ) -> Vec<Value> {
        let Some(rules) = &self.item_fields else {
            return elements;
        };

        elements
            .into_iter()
            .enumerate()
            .map(|(i, element)| {
                let element_path = format!("{}.{}", path, i);
                match element {
                    Value::Object(mut obj) => {
                        Value::Object(apply_rules(rules, &mut obj, &element_path, errors))
                    }
                    other => {
                        errors.push(FieldError::new(
                            &element_path,
                            format!(
                                "Cast to Embedded failed for value \"{}\" at path \"{}\"",
                                other, element_path
                            ),
                        ));
                        Value::Null
                    }
                }
            })
            .collect()
    }
}

/// Apply rules to every declared key of `input`, with defaults and required checks
fn apply_rules(
    rules: &[FieldRule],
    input: &mut Document,
    prefix: &str,
    errors: &mut Vec<FieldError>,
) -> Document {
    let mut out = Document::new();
    for rule in rules {
        let path = if prefix.is_empty() {
            rule.name.clone()
        } else {
            format!("{}.{}", prefix, rule.name)
        };

        let value = match input.remove(&rule.name) {
            Some(v) => v,
            None => match &rule.default {
                Some(default) => default.clone(),
                None if rule.required => {
                    errors.push(FieldError::new(
                        &path,
                        format!("Path `{}` is required.", path),
                    ));
                    continue;
                }
                None => continue,
            },
        };

        if let Some(checked) = rule.check(&path, value, errors) {
            out.insert(rule.name.clone(), checked);
        }
    }
    out
}

/// A reference from a field to a document in another collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub field: String,
    pub collection: String,
}

/// Declaration of an entity
#[derive(Debug, Clone)]
pub struct ModelSchema {
    /// Route name (e.g. "invoice", "paymentMode")
    pub entity: String,

    /// Display name (e.g. "Invoice")
    pub model: String,

    /// Storage collection (e.g. "invoices")
    pub collection: String,

    fields: Vec<FieldRule>,
    search_fields: Vec<String>,
    references: Vec<Reference>,
}

impl ModelSchema {
    /// Create a schema carrying the framework-managed fields
    /// (`removed`, `enabled`, `created`, `updated`)
    pub fn new(
        entity: impl Into<String>,
        model: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            model: model.into(),
            collection: collection.into(),
            fields: vec![
                FieldRule::new(ENABLED_KEY, FieldKind::Boolean).default(Value::Bool(true)),
            ],
            search_fields: vec!["name".to_string()],
            references: Vec::new(),
        }
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.fields.retain(|f| f.name != rule.name);
        self.fields.push(rule);
        self
    }

    /// Declare a reference field, auto-populated on reads
    pub fn reference(mut self, field: &str, collection: &str, required: bool) -> Self {
        let mut rule = FieldRule::new(field, FieldKind::Reference);
        if required {
            rule = rule.required();
        }
        self.references.push(Reference {
            field: field.to_string(),
            collection: collection.to_string(),
        });
        self.field(rule)
    }

    /// Fields searched by default when the client does not name any
    pub fn search_fields(mut self, fields: &[&str]) -> Self {
        self.search_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    pub fn default_search_fields(&self) -> &[String] {
        &self.search_fields
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    fn expect_object(&self, body: Value) -> Result<Document, CrudError> {
        match body {
            Value::Object(obj) => Ok(obj),
            _ => Err(CrudError::field(
                &self.entity,
                "body",
                "Expected a JSON object",
            )),
        }
    }

    /// Turn a create payload into a storable document
    ///
    /// Drops undeclared keys, applies defaults and casts, then stamps the
    /// framework fields. The new document is never born removed.
    pub fn prepare_create(&self, body: Value) -> Result<Document, CrudError> {
        let mut input = self.expect_object(body)?;
        let mut errors = Vec::new();
        let mut doc = apply_rules(&self.fields, &mut input, "", &mut errors);

        if !errors.is_empty() {
            return Err(CrudError::Validation {
                entity: self.entity.clone(),
                errors,
            });
        }

        let now = now_timestamp();
        doc.insert(ID_KEY.to_string(), Value::String(DocumentId::new().to_string()));
        doc.insert(REMOVED_KEY.to_string(), Value::Bool(false));
        doc.insert(CREATED_KEY.to_string(), Value::String(now.clone()));
        doc.insert(UPDATED_KEY.to_string(), Value::String(now));
        Ok(doc)
    }

    /// Turn an update payload into a patch
    ///
    /// Only provided keys are checked. `_id` and `created` cannot be changed
    /// and `removed` is pinned to `false`.
    pub fn prepare_update(&self, body: Value) -> Result<Document, CrudError> {
        let input = self.expect_object(body)?;
        let mut errors = Vec::new();
        let mut patch = Document::new();

        for (key, value) in input {
            let Some(rule) = self.fields.iter().find(|f| f.name == key) else {
                continue;
            };
            if let Some(checked) = rule.check(&key, value, &mut errors) {
                patch.insert(key, checked);
            }
        }

        if !errors.is_empty() {
            return Err(CrudError::Validation {
                entity: self.entity.clone(),
                errors,
            });
        }

        patch.insert(REMOVED_KEY.to_string(), Value::Bool(false));
        patch.insert(UPDATED_KEY.to_string(), Value::String(now_timestamp()));
        Ok(patch)
    }
}
