use fintrack_auth::prelude::AuthError;
use fintrack_errors::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0:?}")]
pub struct InterceptError(pub ErrorObj);

impl InterceptError {
    pub fn into_inner(self) -> ErrorObj {
        self.0
    }

    pub fn status(&self) -> u16 {
        self.0.http_status
    }
}

impl From<AuthError> for InterceptError {
    fn from(err: AuthError) -> Self {
        Self(err.into_inner())
    }
}

pub fn schema(field_errors: FieldErrors) -> InterceptError {
    InterceptError(
        ErrorBuilder::new(codes::SCHEMA_VALIDATION)
            .field_errors(field_errors)
            .build(),
    )
}

pub fn schema_msg(msg: &str) -> InterceptError {
    InterceptError(
        ErrorBuilder::new(codes::SCHEMA_VALIDATION)
            .dev_msg(msg)
            .build(),
    )
}

pub fn unauthenticated(msg: &str) -> InterceptError {
    InterceptError(
        ErrorBuilder::new(codes::AUTH_UNAUTHENTICATED)
            .dev_msg(msg)
            .build(),
    )
}

pub fn forbidden(msg: &str) -> InterceptError {
    InterceptError(ErrorBuilder::new(codes::AUTH_FORBIDDEN).dev_msg(msg).build())
}

pub fn not_found(what: &str) -> InterceptError {
    InterceptError(
        ErrorBuilder::new(codes::RESOURCE_NOT_FOUND)
            .dev_msg(&format!("{what} not found"))
            .build(),
    )
}

pub fn internal(msg: &str) -> InterceptError {
    InterceptError(
        ErrorBuilder::new(codes::UNKNOWN_INTERNAL)
            .dev_msg(msg)
            .build(),
    )
}
