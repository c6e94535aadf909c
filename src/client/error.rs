use reqwest::{Method, StatusCode};

/// Primary error type for the [`ApiClient`](super::ApiClient)
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("base URL error: {0}")]
    BaseUrl(#[source] reqwest::Error),

    #[error("request URL error: {0}")]
    RequestUrl(#[from] url::ParseError),

    #[error("failed to send {method} {path} request: {source}")]
    RequestSend {
        method: Method,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse JSON response: {0}")]
    Json(#[source] reqwest::Error),

    #[error("server responded with error [{code}]: {message}")]
    ApiError { code: StatusCode, message: String },

    #[error("no active session; log in first")]
    NotAuthenticated,

    #[error("session expired and could not be refreshed")]
    SessionExpired,
}

impl ClientError {
    pub(super) fn request_send(method: Method, path: impl Into<String>, source: reqwest::Error) -> Self {
        Self::RequestSend {
            method,
            path: path.into(),
            source,
        }
    }

    /// HTTP status reported by the server, if this error carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
