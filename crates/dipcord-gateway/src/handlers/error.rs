//! Handler error types

use dipcord_cache::SubscriberError;
use dipcord_core::DomainError;
use dipcord_service::ServiceError;
use thiserror::Error;

use crate::protocol::CloseCode;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Subscriber error: {0}")]
    Subscriber(#[from] SubscriberError),

    /// The socket writer went away
    #[error("Connection closed")]
    ConnectionClosed,
}

impl HandlerError {
    /// Close code sent to the client for this error
    pub fn to_close_code(&self) -> CloseCode {
        match self {
            Self::InvalidPayload(_) => CloseCode::DecodeError,
            Self::AuthenticationFailed(_) => CloseCode::AuthenticationFailed,
            Self::Service(_) | Self::Domain(_) | Self::Subscriber(_) | Self::ConnectionClosed => {
                CloseCode::UnknownError
            }
        }
    }
}

pub type HandlerResult<T> = Result<T, HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_codes() {
        assert_eq!(
            HandlerError::InvalidPayload("d".into()).to_close_code(),
            CloseCode::DecodeError
        );
        assert_eq!(
            HandlerError::AuthenticationFailed("expired".into()).to_close_code(),
            CloseCode::AuthenticationFailed
        );
        assert_eq!(
            HandlerError::ConnectionClosed.to_close_code(),
            CloseCode::UnknownError
        );
    }
}
