//! Caller-facing errors.
//!
//! Only precondition violations surface here. Data-quality outcomes such as
//! unresolved lookups, unscorable routes or infeasible legs are typed values
//! on the result structs.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid fleet configuration: {0}")]
    InvalidFleet(String),
    #[error("invalid operating rules: {0}")]
    InvalidRules(String),
    #[error("unknown equipment type `{0}`")]
    UnknownEquipment(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
