//! Declarative argument schemas.
//!
//! Each tool describes its arguments as a static table of [`FieldSpec`]s. The
//! same table drives validation (with defaults filled in) and the JSON Schema
//! published through tool discovery.

use serde_json::{json, Map, Value};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Boolean,
    /// Inclusive bounds.
    Integer { min: i64, max: i64 },
    String { min_len: usize },
    Enum(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

impl DefaultValue {
    fn to_json(self) -> Value {
        match self {
            DefaultValue::Bool(b) => json!(b),
            DefaultValue::Int(n) => json!(n),
            DefaultValue::Str(s) => json!(s),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<DefaultValue>,
}

impl FieldSpec {
    pub const fn required(name: &'static str, description: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: true,
            default: None,
        }
    }

    pub const fn optional(
        name: &'static str,
        description: &'static str,
        kind: FieldKind,
        default: DefaultValue,
    ) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            default: Some(default),
        }
    }

    /// Check one supplied value, returning it in normalized form.
    fn check(&self, value: &Value) -> Result<Value, ValidationError> {
        let fail = |constraint: String| ValidationError::new(self.name, constraint);

        match self.kind {
            FieldKind::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                _ => Err(fail("expected a boolean".to_string())),
            },
            FieldKind::Integer { min, max } => {
                let Some(n) = as_integer(value) else {
                    return Err(fail("expected an integer".to_string()));
                };
                if n < min {
                    return Err(fail(format!("must be at least {}", min)));
                }
                if n > max {
                    return Err(fail(format!("must be at most {}", max)));
                }
                Ok(json!(n))
            }
            FieldKind::String { min_len } => {
                let Some(s) = value.as_str() else {
                    return Err(fail("expected a string".to_string()));
                };
                if s.chars().count() < min_len {
                    return Err(fail(format!(
                        "must contain at least {} character(s)",
                        min_len
                    )));
                }
                Ok(value.clone())
            }
            FieldKind::Enum(allowed) => {
                let Some(s) = value.as_str() else {
                    return Err(fail("expected a string".to_string()));
                };
                if !allowed.contains(&s) {
                    let options: Vec<String> =
                        allowed.iter().map(|a| format!("\"{}\"", a)).collect();
                    return Err(fail(format!("must be one of {}", options.join(", "))));
                }
                Ok(value.clone())
            }
        }
    }

    fn to_json_schema(&self) -> Value {
        let mut prop = match self.kind {
            FieldKind::Boolean => json!({ "type": "boolean" }),
            FieldKind::Integer { min, max } => json!({
                "type": "integer",
                "minimum": min,
                "maximum": max
            }),
            FieldKind::String { min_len } => json!({ "type": "string", "minLength": min_len }),
            FieldKind::Enum(allowed) => json!({ "type": "string", "enum": allowed }),
        };
        prop["description"] = json!(self.description);
        if let Some(default) = self.default {
            prop["default"] = default.to_json();
        }
        prop
    }
}

/// Integers arrive as JSON numbers; whole floats such as `5.0` are accepted.
fn as_integer(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    n.as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

/// The accepted argument shape of one tool.
#[derive(Debug, Clone, Copy)]
pub struct InputSchema {
    pub fields: &'static [FieldSpec],
}

impl InputSchema {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    /// Validate `args` and return the declared fields with defaults applied.
    /// Keys not declared by the schema are dropped.
    pub fn validate(&self, args: &Value) -> Result<Map<String, Value>, ValidationError> {
        let empty = Map::new();
        let supplied = match args {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => return Err(ValidationError::new("arguments", "expected an object")),
        };

        let mut validated = Map::new();
        for field in self.fields {
            match supplied.get(field.name) {
                Some(value) => {
                    validated.insert(field.name.to_string(), field.check(value)?);
                }
                None if field.required => {
                    return Err(ValidationError::new(field.name, "is required"));
                }
                None => {
                    if let Some(default) = field.default {
                        validated.insert(field.name.to_string(), default.to_json());
                    }
                }
            }
        }
        Ok(validated)
    }

    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in self.fields {
            properties.insert(field.name.to_string(), field.to_json_schema());
            if field.required {
                required.push(field.name);
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: InputSchema = InputSchema::new(&[
        FieldSpec::required("prompt", "Prompt", FieldKind::String { min_len: 1 }),
        FieldSpec::optional(
            "count",
            "How many",
            FieldKind::Integer { min: 1, max: 20 },
            DefaultValue::Int(5),
        ),
        FieldSpec::optional(
            "shape",
            "Shape",
            FieldKind::Enum(&["round", "square"]),
            DefaultValue::Str("round"),
        ),
        FieldSpec::optional("verbose", "Verbose", FieldKind::Boolean, DefaultValue::Bool(false)),
    ]);

    #[test]
    fn fills_defaults_for_missing_optional_fields() {
        let args = SAMPLE.validate(&json!({ "prompt": "hi" })).unwrap();
        assert_eq!(args["count"], json!(5));
        assert_eq!(args["shape"], json!("round"));
        assert_eq!(args["verbose"], json!(false));
    }

    #[test]
    fn missing_required_field_names_the_field() {
        let err = SAMPLE.validate(&json!({})).unwrap_err();
        assert_eq!(err.field, "prompt");
        assert_eq!(err.constraint, "is required");
    }

    #[test]
    fn null_arguments_behave_like_an_empty_object() {
        let err = SAMPLE.validate(&Value::Null).unwrap_err();
        assert_eq!(err.field, "prompt");
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        let err = SAMPLE.validate(&json!([1, 2])).unwrap_err();
        assert_eq!(err.field, "arguments");
    }

    #[test]
    fn integer_bounds_are_inclusive() {
        assert!(SAMPLE.validate(&json!({ "prompt": "x", "count": 1 })).is_ok());
        assert!(SAMPLE.validate(&json!({ "prompt": "x", "count": 20 })).is_ok());

        let err = SAMPLE.validate(&json!({ "prompt": "x", "count": 21 })).unwrap_err();
        assert_eq!(err.field, "count");
        assert_eq!(err.constraint, "must be at most 20");

        let err = SAMPLE.validate(&json!({ "prompt": "x", "count": 0 })).unwrap_err();
        assert_eq!(err.constraint, "must be at least 1");
    }

    #[test]
    fn whole_floats_count_as_integers() {
        let args = SAMPLE.validate(&json!({ "prompt": "x", "count": 3.0 })).unwrap();
        assert_eq!(args["count"], json!(3));

        let err = SAMPLE.validate(&json!({ "prompt": "x", "count": 2.5 })).unwrap_err();
        assert_eq!(err.constraint, "expected an integer");
    }

    #[test]
    fn enum_rejects_values_outside_the_list() {
        let err = SAMPLE
            .validate(&json!({ "prompt": "x", "shape": "oval" }))
            .unwrap_err();
        assert_eq!(err.field, "shape");
        assert_eq!(err.constraint, "must be one of \"round\", \"square\"");
    }

    #[test]
    fn empty_string_fails_min_length() {
        let err = SAMPLE.validate(&json!({ "prompt": "" })).unwrap_err();
        assert_eq!(err.field, "prompt");
    }

    #[test]
    fn wrong_type_is_rejected() {
        let err = SAMPLE
            .validate(&json!({ "prompt": "x", "verbose": "yes" }))
            .unwrap_err();
        assert_eq!(err.field, "verbose");
        assert_eq!(err.constraint, "expected a boolean");

        let err = SAMPLE
            .validate(&json!({ "prompt": "x", "count": null }))
            .unwrap_err();
        assert_eq!(err.field, "count");
    }

    #[test]
    fn undeclared_keys_are_dropped() {
        let args = SAMPLE
            .validate(&json!({ "prompt": "x", "extra": true }))
            .unwrap();
        assert!(!args.contains_key("extra"));
    }

    #[test]
    fn json_schema_lists_required_fields_and_bounds() {
        let schema = SAMPLE.to_json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["prompt"]));
        assert_eq!(schema["properties"]["count"]["maximum"], json!(20));
        assert_eq!(schema["properties"]["count"]["default"], json!(5));
        assert_eq!(schema["properties"]["shape"]["enum"], json!(["round", "square"]));
        assert_eq!(schema["properties"]["prompt"]["minLength"], json!(1));
    }
}
