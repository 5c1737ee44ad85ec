use crate::id::Id;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectKind {
    User,
    Service,
}

/// Resolved principal for one request. Built by the authentication gate from
/// a verified credential; never persisted; lives for the request only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub kind: SubjectKind,
    pub subject_id: Id,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub claims: serde_json::Map<String, serde_json::Value>,
}
