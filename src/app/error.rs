use thiserror::Error;

#[derive(Error, Debug)]
pub enum HatebError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Unknown error: [{status}] {body}")]
    Api { status: u16, body: String },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Failed to decode {target}: {reason}")]
    Decode { target: &'static str, reason: String },

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HatebError {
    pub(crate) fn decode(target: &'static str, err: impl std::fmt::Display) -> Self {
        HatebError::Decode {
            target,
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HatebError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_message_carries_body() {
        let err = HatebError::PermissionDenied("forbidden".into());
        assert_eq!(err.to_string(), "Permission denied: forbidden");
    }

    #[test]
    fn test_api_error_message_carries_status_and_body() {
        let err = HatebError::Api {
            status: 500,
            body: "oops".into(),
        };
        assert_eq!(err.to_string(), "Unknown error: [500] oops");
    }

    #[test]
    fn test_decode_error_names_target() {
        let err = HatebError::decode("bookmark", "missing field `user`");
        assert_eq!(
            err.to_string(),
            "Failed to decode bookmark: missing field `user`"
        );
    }
}
