use shared::{
    domain::TodoId,
    error::{ApiError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request {method} {url} failed: {source}")]
    Transport {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned status {status}{}", api_error_suffix(.body))]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: Option<ApiError>,
    },
    #[error("could not decode response from {method} {url}: {source}")]
    Decode {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("store returned a malformed todo: {0}")]
    MalformedTodo(String),
}

fn api_error_suffix(body: &Option<ApiError>) -> String {
    match body {
        Some(err) => format!(" ({err})"),
        None => String::new(),
    }
}

impl RemoteError {
    pub fn status(method: &'static str, url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            method,
            url: url.into(),
            status,
            body: None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { source, .. } | Self::Decode { source, .. } => {
                source.status().map(|status| status.as_u16())
            }
            Self::MalformedTodo(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("{}", ErrorKind::EmptyTitle)]
    EmptyTitle,
    #[error("{kind}: {source}")]
    Remote {
        kind: ErrorKind,
        #[source]
        source: RemoteError,
    },
    #[error("todo {0} is not in the list")]
    UnknownTodo(TodoId),
    #[error("another todo is still being created")]
    CreationPending,
    #[error("no todo is being edited")]
    NotEditing,
}

impl ControllerError {
    pub(crate) fn remote(kind: ErrorKind, source: RemoteError) -> Self {
        Self::Remote { kind, source }
    }

    /// The error kind this failure surfaces to the user, if it surfaces one.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyTitle => ErrorKind::EmptyTitle,
            Self::Remote { kind, .. } => *kind,
            Self::UnknownTodo(_) | Self::CreationPending | Self::NotEditing => ErrorKind::Default,
        }
    }
}
