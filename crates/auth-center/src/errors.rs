use fintrack_errors::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0:?}")]
pub struct AuthError(pub ErrorObj);

impl AuthError {
    pub fn into_inner(self) -> ErrorObj {
        self.0
    }
}

pub fn unauthenticated(msg: &str) -> AuthError {
    AuthError(
        ErrorBuilder::new(codes::AUTH_UNAUTHENTICATED)
            .user_msg("Please sign in.")
            .dev_msg(msg)
            .build(),
    )
}

pub fn forbidden(msg: &str) -> AuthError {
    AuthError(
        ErrorBuilder::new(codes::AUTH_FORBIDDEN)
            .user_msg("You don't have permission to perform this action.")
            .dev_msg(msg)
            .build(),
    )
}

pub fn unknown_identity(subject_id: &str) -> AuthError {
    AuthError(
        ErrorBuilder::new(codes::AUTH_UNAUTHENTICATED)
            .user_msg("Please sign in.")
            .dev_msg(&format!("no ability records for identity {subject_id}"))
            .build(),
    )
}

pub fn internal(msg: &str) -> AuthError {
    AuthError(
        ErrorBuilder::new(codes::UNKNOWN_INTERNAL)
            .user_msg("Internal error. Please retry later.")
            .dev_msg(msg)
            .build(),
    )
}
