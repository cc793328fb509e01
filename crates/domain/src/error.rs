use crate::NameError;

#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum CreateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum DeleteError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("no connection")]
    NoConnection,
    #[error("request timed out")]
    Timeout,
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("authentication failed, please log in again")]
    Auth,
    #[error("no session")]
    NoSession,
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl StorageError {
    /// Network failures never reached the server, so the data on screen is merely stale.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, StorageError::NoConnection | StorageError::Timeout)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{0} must be a positive whole number")]
    NotPositiveInteger(&'static str),
    #[error("{0} must be a non-negative decimal number")]
    NotNonNegativeDecimal(&'static str),
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("{field} must be {max} characters or fewer ({len} > {max})")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Password must contain a lower-case letter, an upper-case letter and a digit")]
    WeakPassword,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error(transparent)]
    Name(#[from] NameError),
}
