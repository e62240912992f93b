use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("unknown class: {0}")]
    UnknownClass(String),
    #[error("corrupt stored record: {0}")]
    Corrupt(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    pub fn invalid_field(field: &str, reason: impl std::fmt::Display) -> Self {
        Self::Validation(format!("invalid {field}: {reason}"))
    }
}
