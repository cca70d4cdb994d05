use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown canonical field: {0}")]
    UnknownField(String),
    #[error("unknown compliance code: {0}")]
    UnknownComplianceCode(String),
    #[error("canonical field {field} is claimed by both '{first}' and '{second}'")]
    DuplicateClaim {
        field: String,
        first: String,
        second: String,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
