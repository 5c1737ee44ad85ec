use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Schema,
    Auth,
    PolicyDeny,
    NotFound,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(kind: ErrorKind) -> &'static str {
        match kind {
            ErrorKind::Schema => "Schema",
            ErrorKind::Auth => "Auth",
            ErrorKind::PolicyDeny => "PolicyDeny",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Unknown => "Unknown",
        }
    }
}
