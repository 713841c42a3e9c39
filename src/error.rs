// Error taxonomy shared by the validator, the stores and the HTTP layer

use crate::priority::PriorityError;
use axum::http::StatusCode;

/// Why a record failed validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationCause {
    #[error("title is required")]
    EmptyTitle,

    #[error(transparent)]
    Priority(#[from] PriorityError),

    #[error("v1 todo api does not allow user_id")]
    UserIdNotAllowed,

    #[error("v2 todo api requires user_id")]
    UserIdRequired,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    /// Input failed a domain rule
    #[error("Validation error on field {field}: {cause}")]
    Validation { field: &'static str, cause: ValidationCause },

    /// Unknown (user, id) pair or unknown API version
    #[error("{0}")]
    NotFound(String),

    /// Request could not be decoded before reaching the store
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, TodoError>;

impl TodoError {
    pub fn not_found() -> Self {
        TodoError::NotFound("ToDo Not Found".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            TodoError::Validation { .. } => StatusCode::BAD_REQUEST,
            TodoError::NotFound(_) => StatusCode::NOT_FOUND,
            TodoError::BadRequest(_) => StatusCode::BAD_REQUEST,
            TodoError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
