use thiserror::Error;

use crate::records::{Coupon, CreditCard};
use crate::subject::Subject;

#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("empty_field:{0}")]
    EmptyField(&'static str),
    #[error("out_of_range:{0}")]
    OutOfRange(&'static str),
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidateError>;
}

impl Validate for Subject {
    fn validate(&self) -> Result<(), ValidateError> {
        if self.subject_id.0.is_empty() {
            return Err(ValidateError::EmptyField("subject_id"));
        }
        if self.email.is_empty() {
            return Err(ValidateError::EmptyField("email"));
        }
        Ok(())
    }
}

impl Validate for Coupon {
    fn validate(&self) -> Result<(), ValidateError> {
        if self.code.is_empty() {
            return Err(ValidateError::EmptyField("code"));
        }
        if self.discount_percent == 0 || self.discount_percent > 100 {
            return Err(ValidateError::OutOfRange("discount_percent"));
        }
        Ok(())
    }
}

impl Validate for CreditCard {
    fn validate(&self) -> Result<(), ValidateError> {
        if self.name.is_empty() {
            return Err(ValidateError::EmptyField("name"));
        }
        if !(1..=28).contains(&self.closing_day) || !(1..=28).contains(&self.due_day) {
            return Err(ValidateError::OutOfRange("closing_day"));
        }
        Ok(())
    }
}
