use thiserror::Error;

/// Failure talking to the remote service.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("prediction service unreachable: {0}")]
    Unreachable(String),
    #[error("request timed out")]
    Timeout,
    #[error("{}", .detail.as_deref().unwrap_or("request failed"))]
    Status { status: u16, detail: Option<String> },
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Unreachable(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_prefers_detail() {
        let err = TransportError::Status {
            status: 401,
            detail: Some("Invalid credentials".into()),
        };
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.status_code(), Some(401));

        let bare = TransportError::Status {
            status: 502,
            detail: None,
        };
        assert_eq!(bare.to_string(), "request failed");
        assert_eq!(TransportError::Timeout.status_code(), None);
    }
}
