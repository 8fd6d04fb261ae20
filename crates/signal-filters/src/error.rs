//! Filter Error Types

use thiserror::Error;

/// Errors raised when constructing a streaming filter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Parameter outside its allowed range
    #[error("Invalid filter parameter {parameter} = {value}: {reason}")]
    InvalidConfig {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl FilterError {
    pub(crate) fn invalid(parameter: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidConfig {
            parameter,
            value,
            reason,
        }
    }
}
