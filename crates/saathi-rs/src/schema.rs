//! Tagged schema descriptors and the single generic validator.
//!
//! Every flow declares its input and output as an [`ObjectSchema`]: an
//! ordered list of [`Field`]s, each carrying a [`FieldKind`]. Because the
//! kinds form a closed enum, every schema in the crate is statically
//! enumerable and one function ([`validate`]) checks all of them.
//!
//! The same descriptor renders to a JSON Schema document
//! ([`ObjectSchema::to_json_schema`]) that is sent to the model as the
//! requested response shape.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::collections::HashSet;

use crate::error::{Constraint, DefinitionError, ROOT_FIELD, ValidationError};

/// The kind of value a field holds, with its constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// A string. `non_empty` rejects empty and whitespace-only strings.
    Text { non_empty: bool },
    /// A JSON number within the inclusive bounds, when given.
    Number { min: Option<f64>, max: Option<f64> },
    Boolean,
    /// A string drawn from a fixed set. With `case_insensitive`, `"happy"`
    /// matches the option `"Happy"`; the value itself is kept as sent.
    Choice {
        options: Vec<String>,
        case_insensitive: bool,
    },
}

impl FieldKind {
    fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text { .. } | FieldKind::Choice { .. } => "string",
            FieldKind::Number { .. } => "number",
            FieldKind::Boolean => "boolean",
        }
    }
}

/// One named field of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub description: String,
}

/// An object with an ordered set of fields.
///
/// Properties not declared in the schema are dropped from the validated
/// value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    fields: Vec<Field>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Required, non-empty string.
    pub fn text(self, name: &str, description: &str) -> Self {
        self.field(Field {
            name: name.to_string(),
            kind: FieldKind::Text { non_empty: true },
            required: true,
            description: description.to_string(),
        })
    }

    /// Optional string; may be omitted or `null`.
    pub fn optional_text(self, name: &str, description: &str) -> Self {
        self.field(Field {
            name: name.to_string(),
            kind: FieldKind::Text { non_empty: false },
            required: false,
            description: description.to_string(),
        })
    }

    /// Required number in `[min, max]`.
    pub fn number(self, name: &str, min: f64, max: f64, description: &str) -> Self {
        self.field(Field {
            name: name.to_string(),
            kind: FieldKind::Number {
                min: Some(min),
                max: Some(max),
            },
            required: true,
            description: description.to_string(),
        })
    }

    /// Required boolean.
    pub fn boolean(self, name: &str, description: &str) -> Self {
        self.field(Field {
            name: name.to_string(),
            kind: FieldKind::Boolean,
            required: true,
            description: description.to_string(),
        })
    }

    /// Required string drawn from `options`, matched case-insensitively
    /// when `case_insensitive` is set.
    pub fn choice<S: AsRef<str>>(
        self,
        name: &str,
        options: &[S],
        case_insensitive: bool,
        description: &str,
    ) -> Self {
        self.field(Field {
            name: name.to_string(),
            kind: FieldKind::Choice {
                options: options.iter().map(|o| o.as_ref().to_string()).collect(),
                case_insensitive,
            },
            required: true,
            description: description.to_string(),
        })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether every declared field is required.
    pub fn all_required(&self) -> bool {
        self.fields.iter().all(|f| f.required)
    }

    /// Check the descriptor itself: unique non-empty names, ordered finite
    /// bounds, non-empty choice sets, and a JSON Schema rendering that
    /// compiles.
    pub fn check(&self) -> Result<(), DefinitionError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            let malformed = |reason: &str| DefinitionError::MalformedSchema {
                field: field.name.clone(),
                reason: reason.to_string(),
            };

            if field.name.trim().is_empty() {
                return Err(malformed("field name is empty"));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(malformed("field is declared twice"));
            }
            match &field.kind {
                FieldKind::Number { min, max } => {
                    if min.is_some_and(|m| !m.is_finite()) || max.is_some_and(|m| !m.is_finite())
                    {
                        return Err(malformed("numeric bounds must be finite"));
                    }
                    if let (Some(lo), Some(hi)) = (min, max)
                        && lo > hi
                    {
                        return Err(malformed("minimum is greater than maximum"));
                    }
                }
                FieldKind::Choice { options, .. } => {
                    if options.is_empty() {
                        return Err(malformed("choice has no options"));
                    }
                }
                FieldKind::Text { .. } | FieldKind::Boolean => {}
            }
        }

        jsonschema::validator_for(&self.to_json_schema()).map_err(|e| {
            DefinitionError::MalformedSchema {
                field: ROOT_FIELD.to_string(),
                reason: format!("rendered JSON Schema does not compile: {e}"),
            }
        })?;
        Ok(())
    }

    /// Render as a JSON Schema object, the shape requested from the model.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            let mut prop = match &field.kind {
                FieldKind::Text { non_empty } => {
                    let mut p = json!({"type": "string"});
                    if *non_empty {
                        p["minLength"] = json!(1);
                    }
                    p
                }
                FieldKind::Number { min, max } => {
                    let mut p = json!({"type": "number"});
                    if let Some(min) = min {
                        p["minimum"] = json!(min);
                    }
                    if let Some(max) = max {
                        p["maximum"] = json!(max);
                    }
                    p
                }
                FieldKind::Boolean => json!({"type": "boolean"}),
                FieldKind::Choice { options, .. } => json!({"type": "string", "enum": options}),
            };
            if !field.description.is_empty() {
                prop["description"] = json!(field.description);
            }
            properties.insert(field.name.clone(), prop);
            if field.required {
                required.push(Value::String(field.name.clone()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    /// Validate `value` against this schema. See [`validate`].
    pub fn validate(&self, value: &Value) -> Result<ValidatedValue, ValidationError> {
        let object = value.as_object().ok_or_else(|| {
            ValidationError::root(Constraint::Type {
                expected: "object",
                found: json_type_name(value),
            })
        })?;

        let mut out = Map::new();
        for field in &self.fields {
            match object.get(&field.name) {
                None | Some(Value::Null) => {
                    if field.required {
                        return Err(ValidationError::new(&field.name, Constraint::Required));
                    }
                }
                Some(v) => {
                    check_field(field, v)?;
                    out.insert(field.name.clone(), v.clone());
                }
            }
        }
        Ok(ValidatedValue(out))
    }
}

/// Confirm that `value` structurally conforms to `schema`.
///
/// Rejects missing required fields, wrong primitive types, numbers outside
/// the inclusive bounds, and strings outside a choice set. Optional fields
/// may be omitted. Fields are checked in declaration order and the first
/// failure is reported.
pub fn validate(schema: &ObjectSchema, value: &Value) -> Result<ValidatedValue, ValidationError> {
    schema.validate(value)
}

fn check_field(field: &Field, value: &Value) -> Result<(), ValidationError> {
    let type_mismatch = || {
        ValidationError::new(
            &field.name,
            Constraint::Type {
                expected: field.kind.type_name(),
                found: json_type_name(value),
            },
        )
    };

    match &field.kind {
        FieldKind::Text { non_empty } => {
            let s = value.as_str().ok_or_else(type_mismatch)?;
            if *non_empty && s.trim().is_empty() {
                return Err(ValidationError::new(&field.name, Constraint::NonEmpty));
            }
        }
        FieldKind::Number { min, max } => {
            let n = value.as_f64().ok_or_else(type_mismatch)?;
            let below = min.is_some_and(|m| n < m);
            let above = max.is_some_and(|m| n > m);
            if below || above {
                return Err(ValidationError::new(
                    &field.name,
                    Constraint::Range {
                        min: *min,
                        max: *max,
                        value: n,
                    },
                ));
            }
        }
        FieldKind::Boolean => {
            value.as_bool().ok_or_else(type_mismatch)?;
        }
        FieldKind::Choice {
            options,
            case_insensitive,
        } => {
            let s = value.as_str().ok_or_else(type_mismatch)?;
            let matched = options.iter().any(|o| {
                if *case_insensitive {
                    o.eq_ignore_ascii_case(s)
                } else {
                    o == s
                }
            });
            if !matched {
                return Err(ValidationError::new(
                    &field.name,
                    Constraint::OneOf {
                        allowed: options.clone(),
                        value: s.to_string(),
                    },
                ));
            }
        }
    }
    Ok(())
}

/// JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// An object that passed [`validate`]: only declared fields, all in bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedValue(Map<String, Value>);

impl ValidatedValue {
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Deserialize into the flow's typed output.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, ValidationError> {
        serde_json::from_value(self.into_value())
            .map_err(|e| ValidationError::root(Constraint::Malformed(e.to_string())))
    }
}
