// Per-API-version validation of inbound todo records

use crate::error::{Result, TodoError, ValidationCause};
use crate::priority::parse_priority;
use crate::record::{Todo, TodoPayload};
use std::fmt;
use std::str::FromStr;

/// API version taken from the first path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    /// Records are not scoped to a user
    V1,
    /// Every record belongs to a user
    V2,
}

impl ApiVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V2 => "v2",
        }
    }

    pub fn requires_user(self) -> bool {
        matches!(self, ApiVersion::V2)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "v1" => Ok(ApiVersion::V1),
            "v2" => Ok(ApiVersion::V2),
            other => Err(TodoError::NotFound(format!("{} not a valid version", other))),
        }
    }
}

/// Check a payload against the rules for `version` and produce a storable record
///
/// Title is checked first, then priority (normalized to its canonical form),
/// then the user scoping rule for the version.
pub fn validate(payload: TodoPayload, version: ApiVersion) -> Result<Todo> {
    if payload.title.is_empty() {
        return Err(TodoError::Validation {
            field: "title",
            cause: ValidationCause::EmptyTitle,
        });
    }

    let priority = parse_priority(&payload.priority).map_err(|e| TodoError::Validation {
        field: "priority",
        cause: e.into(),
    })?;

    match version {
        ApiVersion::V1 if !payload.user_id.is_empty() => {
            return Err(TodoError::Validation {
                field: "user_id",
                cause: ValidationCause::UserIdNotAllowed,
            });
        }
        ApiVersion::V2 if payload.user_id.is_empty() => {
            return Err(TodoError::Validation {
                field: "user_id",
                cause: ValidationCause::UserIdRequired,
            });
        }
        _ => {}
    }

    Ok(Todo {
        id: payload.id,
        title: payload.title,
        priority,
        complete: payload.complete,
        user_id: payload.user_id,
    })
}
