//! Request failures, each tagged with the API path that produced it.

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JiraError>;

#[derive(Debug, Error)]
pub enum JiraError {
    /// The server answered with a non-success status other than 401/403.
    #[error("GET {path} returned {status}: {body}")]
    Status {
        path: String,
        status: StatusCode,
        body: String,
    },
    #[error("GET {path} rejected the configured credentials ({status})")]
    Unauthorized { path: String, status: StatusCode },
    #[error("GET {path} timed out")]
    Timeout { path: String },
    /// Connection, TLS or body read failure.
    #[error("GET {path} failed: {message}")]
    Transport { path: String, message: String },
    /// The client could not be built from its configuration.
    #[error("invalid client setup: {0}")]
    Setup(String),
}

impl JiraError {
    /// Classifies a reqwest failure for the request to `path`.
    pub fn request(path: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            JiraError::Timeout {
                path: path.to_string(),
            }
        } else {
            JiraError::Transport {
                path: path.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Maps a non-success response status.
    pub fn from_status(path: &str, status: StatusCode, body: String) -> Self {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            JiraError::Unauthorized {
                path: path.to_string(),
                status,
            }
        } else {
            JiraError::Status {
                path: path.to_string(),
                status,
                body,
            }
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            JiraError::Status { path, .. }
            | JiraError::Unauthorized { path, .. }
            | JiraError::Timeout { path }
            | JiraError::Transport { path, .. } => Some(path),
            JiraError::Setup(_) => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            JiraError::Status { status, .. } | JiraError::Unauthorized { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_are_not_echoed() {
        let err = JiraError::from_status("search", StatusCode::FORBIDDEN, "secret page".into());
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(
            err.to_string(),
            "GET search rejected the configured credentials (403 Forbidden)"
        );
    }

    #[test]
    fn other_statuses_keep_the_body() {
        let err = JiraError::from_status("issue/CORE-1/worklog", StatusCode::BAD_GATEWAY, "down".into());
        assert_eq!(err.path(), Some("issue/CORE-1/worklog"));
        assert_eq!(err.to_string(), "GET issue/CORE-1/worklog returned 502 Bad Gateway: down");
        assert_eq!(JiraError::Setup("bad header".into()).path(), None);
    }
}
