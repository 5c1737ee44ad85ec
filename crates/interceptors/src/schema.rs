//! Declarative request schemas.
//!
//! Validation returns a normalized value containing only declared fields,
//! with query-string scalars coerced to their declared types. All failures
//! for a request are collected before reporting, so a client sees every bad
//! field at once.

use chrono::NaiveDate;
use fintrack_errors::prelude::FieldErrors;
use serde_json::{Map, Value};

#[derive(Clone, Debug)]
pub enum Schema {
    Object {
        fields: Vec<Field>,
        deny_unknown: bool,
    },
    Text {
        min: usize,
        max: usize,
    },
    Email,
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    Boolean,
    OneOf(Vec<&'static str>),
    Array {
        item: Box<Schema>,
        max: usize,
    },
    /// ISO calendar date, `YYYY-MM-DD`.
    Date,
}

#[derive(Clone, Debug)]
pub struct Field {
    pub name: &'static str,
    pub required: bool,
    pub schema: Schema,
}

impl Field {
    pub fn required(name: &'static str, schema: Schema) -> Self {
        Self {
            name,
            required: true,
            schema,
        }
    }

    pub fn optional(name: &'static str, schema: Schema) -> Self {
        Self {
            name,
            required: false,
            schema,
        }
    }
}

impl Schema {
    pub fn object(fields: Vec<Field>) -> Self {
        Schema::Object {
            fields,
            deny_unknown: false,
        }
    }

    pub fn strict_object(fields: Vec<Field>) -> Self {
        Schema::Object {
            fields,
            deny_unknown: true,
        }
    }

    pub fn text(min: usize, max: usize) -> Self {
        Schema::Text { min, max }
    }

    pub fn integer() -> Self {
        Schema::Integer {
            min: None,
            max: None,
        }
    }

    pub fn integer_in(min: i64, max: i64) -> Self {
        Schema::Integer {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Validates `value`, returning the normalized form or every violation.
    pub fn validate(&self, value: &Value) -> Result<Value, Vec<FieldError>> {
        let mut errors = Vec::new();
        let normalized = self.check(value, "", &mut errors);
        if errors.is_empty() {
            Ok(normalized)
        } else {
            Err(errors)
        }
    }

    fn check(&self, value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Value {
        match self {
            Schema::Object {
                fields,
                deny_unknown,
            } => {
                let Some(map) = value.as_object() else {
                    errors.push(FieldError::at(path, "must be an object"));
                    return Value::Null;
                };
                let mut out = Map::new();
                for field in fields {
                    let child_path = join(path, field.name);
                    match map.get(field.name) {
                        Some(Value::Null) | None if field.required => {
                            errors.push(FieldError::at(&child_path, "is required"));
                        }
                        Some(Value::Null) | None => {}
                        Some(child) => {
                            let normalized = field.schema.check(child, &child_path, errors);
                            out.insert(field.name.to_string(), normalized);
                        }
                    }
                }
                if *deny_unknown {
                    for key in map.keys() {
                        if !fields.iter().any(|f| f.name == key) {
                            errors.push(FieldError::at(&join(path, key), "is not a known field"));
                        }
                    }
                }
                Value::Object(out)
            }
            Schema::Text { min, max } => match value.as_str() {
                Some(s) if s.trim().len() < *min => {
                    errors.push(FieldError::at(
                        path,
                        &format!("must be at least {min} characters"),
                    ));
                    Value::Null
                }
                Some(s) if s.len() > *max => {
                    errors.push(FieldError::at(
                        path,
                        &format!("must be at most {max} characters"),
                    ));
                    Value::Null
                }
                Some(s) => Value::String(s.to_string()),
                None => {
                    errors.push(FieldError::at(path, "must be a string"));
                    Value::Null
                }
            },
            Schema::Email => match value.as_str() {
                Some(s) if looks_like_email(s) => Value::String(s.to_ascii_lowercase()),
                Some(_) => {
                    errors.push(FieldError::at(path, "must be a valid email address"));
                    Value::Null
                }
                None => {
                    errors.push(FieldError::at(path, "must be a string"));
                    Value::Null
                }
            },
            Schema::Integer { min, max } => {
                let parsed = match value {
                    Value::Number(n) => n.as_i64(),
                    // Query parameters arrive as strings.
                    Value::String(s) => s.parse::<i64>().ok(),
                    _ => None,
                };
                match parsed {
                    Some(n) if min.map_or(false, |m| n < m) || max.map_or(false, |m| n > m) => {
                        errors.push(FieldError::at(
                            path,
                            &format!(
                                "must be between {} and {}",
                                min.map_or("-inf".to_string(), |m| m.to_string()),
                                max.map_or("inf".to_string(), |m| m.to_string()),
                            ),
                        ));
                        Value::Null
                    }
                    Some(n) => Value::Number(n.into()),
                    None => {
                        errors.push(FieldError::at(path, "must be an integer"));
                        Value::Null
                    }
                }
            }
            Schema::Boolean => match value {
                Value::Bool(b) => Value::Bool(*b),
                Value::String(s) if s == "true" => Value::Bool(true),
                Value::String(s) if s == "false" => Value::Bool(false),
                _ => {
                    errors.push(FieldError::at(path, "must be a boolean"));
                    Value::Null
                }
            },
            Schema::OneOf(options) => match value.as_str() {
                Some(s) if options.contains(&s) => Value::String(s.to_string()),
                _ => {
                    errors.push(FieldError::at(
                        path,
                        &format!("must be one of: {}", options.join(", ")),
                    ));
                    Value::Null
                }
            },
            Schema::Array { item, max } => {
                let Some(items) = value.as_array() else {
                    errors.push(FieldError::at(path, "must be an array"));
                    return Value::Null;
                };
                if items.len() > *max {
                    errors.push(FieldError::at(
                        path,
                        &format!("must have at most {max} items"),
                    ));
                    return Value::Null;
                }
                let normalized = items
                    .iter()
                    .enumerate()
                    .map(|(i, child)| item.check(child, &join(path, &i.to_string()), errors))
                    .collect();
                Value::Array(normalized)
            }
            Schema::Date => match value.as_str() {
                Some(s) if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() => {
                    Value::String(s.to_string())
                }
                _ => {
                    errors.push(FieldError::at(path, "must be a date (YYYY-MM-DD)"));
                    Value::Null
                }
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    fn at(path: &str, message: &str) -> Self {
        Self {
            path: if path.is_empty() { "." } else { path }.to_string(),
            message: message.to_string(),
        }
    }
}

pub fn to_error_map(errors: Vec<FieldError>) -> FieldErrors {
    let mut map = FieldErrors::new();
    for err in errors {
        map.entry(err.path).or_default().push(err.message);
    }
    map
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

/// Decodes a query string into a JSON object of string values. Repeated keys
/// keep the last value.
pub fn query_to_value(query: &str) -> Value {
    let mut map = Map::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        map.insert(key.into_owned(), Value::String(value.into_owned()));
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account_schema() -> Schema {
        Schema::object(vec![
            Field::required("name", Schema::text(1, 80)),
            Field::required(
                "kind",
                Schema::OneOf(vec!["checking", "savings", "investment", "cash"]),
            ),
            Field::optional("balance_cents", Schema::integer()),
        ])
    }

    #[test]
    fn all_violations_are_collected_at_once() {
        let err = account_schema()
            .validate(&json!({"name": "", "kind": "retirement"}))
            .unwrap_err();
        let map = to_error_map(err);
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("name"));
        assert!(map.contains_key("kind"));
    }

    #[test]
    fn normalized_output_drops_undeclared_fields() {
        let out = account_schema()
            .validate(&json!({"name": "Main", "kind": "checking", "hacker": true}))
            .unwrap();
        assert!(out.get("hacker").is_none());
        assert_eq!(out["name"], "Main");
    }

    #[test]
    fn strict_object_rejects_undeclared_fields() {
        let schema = Schema::strict_object(vec![Field::required("name", Schema::text(1, 80))]);
        let err = schema
            .validate(&json!({"name": "x", "extra": 1}))
            .unwrap_err();
        assert_eq!(err[0].path, "extra");
    }

    #[test]
    fn query_scalars_are_coerced() {
        let schema = Schema::object(vec![
            Field::optional("paid", Schema::Boolean),
            Field::optional("limit", Schema::integer_in(1, 100)),
        ]);
        let out = schema
            .validate(&query_to_value("paid=true&limit=25"))
            .unwrap();
        assert_eq!(out["paid"], true);
        assert_eq!(out["limit"], 25);

        assert!(schema.validate(&query_to_value("limit=500")).is_err());
    }

    #[test]
    fn nested_paths_are_dot_joined() {
        let schema = Schema::object(vec![Field::required(
            "prefs",
            Schema::object(vec![Field::required("currency", Schema::text(3, 3))]),
        )]);
        let err = schema
            .validate(&json!({"prefs": {"currency": "USDX"}}))
            .unwrap_err();
        assert_eq!(err[0].path, "prefs.currency");
    }

    #[test]
    fn date_format_is_checked() {
        let schema = Schema::object(vec![Field::required("date", Schema::Date)]);
        assert!(schema.validate(&json!({"date": "2026-02-30"})).is_err());
        assert!(schema.validate(&json!({"date": "2026-02-28"})).is_ok());
    }

    #[test]
    fn email_is_lowercased() {
        let out = Schema::Email.validate(&json!("Ada@Example.COM")).unwrap();
        assert_eq!(out, "ada@example.com");
        assert!(Schema::Email.validate(&json!("not-an-email")).is_err());
    }
}
