//! Sandbox SDK errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    #[error("SDK is not initialized, generate keys first")]
    NotInitialized,

    #[error("not authenticated, request a token first")]
    NotAuthenticated,

    #[error("unknown SDK mode: {0}")]
    UnknownMode(String),

    #[error("{endpoint} rejected with {status} ({code}): {message}")]
    Rejected {
        endpoint: String,
        status: u16,
        code: String,
        message: String,
    },
}
