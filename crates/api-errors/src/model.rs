use crate::{
    code::{spec_of, ErrorCode},
    kind::ErrorKind,
    severity::Severity,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field path (dot-joined) to the list of messages for that field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorObj {
    pub code: ErrorCode,
    pub kind: ErrorKind,
    pub message_user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_dev: Option<String>,
    pub http_status: u16,
    pub severity: Severity,
    #[serde(default)]
    pub meta: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

pub struct ErrorBuilder {
    code: ErrorCode,
    message_user: Option<String>,
    message_dev: Option<String>,
    meta: Map<String, Value>,
    field_errors: FieldErrors,
}

impl ErrorBuilder {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message_user: None,
            message_dev: None,
            meta: Map::new(),
            field_errors: FieldErrors::new(),
        }
    }

    pub fn user_msg(mut self, message: impl Into<String>) -> Self {
        self.message_user = Some(message.into());
        self
    }

    pub fn dev_msg(mut self, message: impl Into<String>) -> Self {
        self.message_dev = Some(message.into());
        self
    }

    pub fn meta_kv(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    pub fn field_error(mut self, path: impl Into<String>, message: impl Into<String>) -> Self {
        self.field_errors
            .entry(path.into())
            .or_default()
            .push(message.into());
        self
    }

    pub fn field_errors(mut self, errors: FieldErrors) -> Self {
        for (path, mut messages) in errors {
            self.field_errors
                .entry(path)
                .or_default()
                .append(&mut messages);
        }
        self
    }

    pub fn build(self) -> ErrorObj {
        let spec = spec_of(self.code);
        ErrorObj {
            code: self.code,
            kind: spec.kind,
            message_user: self
                .message_user
                .unwrap_or_else(|| spec.default_user_msg.to_string()),
            message_dev: self.message_dev,
            http_status: spec.http_status,
            severity: spec.severity,
            meta: self.meta,
            field_errors: if self.field_errors.is_empty() {
                None
            } else {
                Some(self.field_errors)
            },
        }
    }
}
