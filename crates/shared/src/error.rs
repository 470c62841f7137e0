use std::fmt;

use serde::{Deserialize, Serialize};

/// The single user-visible error slot kept by the todo list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    #[default]
    Default,
    UnableToLoad,
    EmptyTitle,
    AddFailed,
    DeleteFailed,
    UpdateFailed,
}

impl ErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::Default => "",
            ErrorKind::UnableToLoad => "Unable to load todos",
            ErrorKind::EmptyTitle => "Title should not be empty",
            ErrorKind::AddFailed => "Unable to add a todo",
            ErrorKind::DeleteFailed => "Unable to delete a todo",
            ErrorKind::UpdateFailed => "Unable to update a todo",
        }
    }

    pub fn is_set(self) -> bool {
        self != ErrorKind::Default
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    Internal,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Error body a todo store may return alongside a non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: ErrorCode,
    #[serde(default)]
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_kind_has_empty_message() {
        assert_eq!(ErrorKind::default().message(), "");
        assert!(!ErrorKind::Default.is_set());
        assert!(ErrorKind::AddFailed.is_set());
        assert_eq!(ErrorKind::EmptyTitle.to_string(), "Title should not be empty");
    }

    #[test]
    fn api_error_tolerates_unknown_codes_and_missing_fields() {
        let err: ApiError =
            serde_json::from_str(r#"{"code":"teapot","message":"nope"}"#).expect("decode");
        assert_eq!(err.code, ErrorCode::Unknown);
        assert_eq!(err.message, "nope");

        let err: ApiError = serde_json::from_str(r#"{"code":"not_found"}"#).expect("decode");
        assert_eq!(err, ApiError::new(ErrorCode::NotFound, ""));
    }
}
