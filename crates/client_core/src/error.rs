use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("username must be at least {min} characters long (got {actual})")]
    UsernameTooShort { min: usize, actual: usize },
}

/// Failure talking to the chat service. Never escapes the controller; sends
/// turn it into the fallback message and status queries into a degraded
/// engine display.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("chat service answered with status {0}")]
    Status(u16),
    #[error("failed to reach chat service: {0}")]
    Network(String),
    #[error("malformed chat service response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn is_status(&self) -> bool {
        matches!(self, TransportError::Status(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            TransportError::Status(status.as_u16())
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}
