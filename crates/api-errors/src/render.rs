use crate::{
    kind::ErrorKind,
    model::{ErrorObj, FieldErrors},
    severity::Severity,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What the client is allowed to see. Developer detail is only included when
/// the server runs with debug errors enabled.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicErrorView {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

/// Full server-side view for audit logging.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuditErrorView {
    pub code: &'static str,
    pub kind: &'static str,
    pub http_status: u16,
    pub severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_dev: Option<String>,
    pub meta: Map<String, Value>,
}

impl ErrorObj {
    pub fn to_public(&self, debug: bool) -> PublicErrorView {
        let message = match (debug, self.message_dev.as_deref()) {
            (true, Some(dev)) => format!("{} ({})", self.message_user, dev),
            _ => self.message_user.clone(),
        };
        PublicErrorView {
            message,
            errors: self.field_errors.clone(),
        }
    }

    pub fn to_audit(&self) -> AuditErrorView {
        AuditErrorView {
            code: self.code.0,
            kind: ErrorKind::as_str(self.kind),
            http_status: self.http_status,
            severity: Severity::as_str(self.severity),
            message_dev: self.message_dev.clone(),
            meta: self.meta.clone(),
        }
    }
}
