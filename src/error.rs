use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HelperError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Authentication failed (status {status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("GitLab API error (status {status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl HelperError {
    /// Classifies a non-success HTTP status returned for `resource`.
    pub fn from_status(status: StatusCode, resource: &str, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Authentication {
                status: status.as_u16(),
                message: body,
            },
            StatusCode::NOT_FOUND => Self::NotFound(resource.to_string()),
            _ => Self::Remote {
                status: status.as_u16(),
                message: body,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, HelperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(
            HelperError::from_status(StatusCode::UNAUTHORIZED, "pipelines", String::new()),
            HelperError::Authentication { status: 401, .. }
        ));
        assert!(matches!(
            HelperError::from_status(StatusCode::FORBIDDEN, "pipelines", String::new()),
            HelperError::Authentication { status: 403, .. }
        ));
        assert!(matches!(
            HelperError::from_status(StatusCode::NOT_FOUND, "pipeline 9", String::new()),
            HelperError::NotFound(ref what) if what == "pipeline 9"
        ));
        assert!(matches!(
            HelperError::from_status(StatusCode::BAD_GATEWAY, "pipelines", "oops".into()),
            HelperError::Remote { status: 502, ref message } if message == "oops"
        ));
    }
}
