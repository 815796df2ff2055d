//! Errors raised by a graph consumer (identification + estimation engine).

use super::error_code::{self, CausimErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ConsumerError {
    #[error("identification produced warnings and the caller did not opt in to continue: {warnings:?}")]
    IdentificationBlocked { warnings: Vec<String> },

    #[error("estimation failed: {message}")]
    Estimation { message: String },

    #[error("table has no column named {name}")]
    MissingColumn { name: String },
}

impl CausimErrorCode for ConsumerError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::IdentificationBlocked { .. } => error_code::IDENTIFICATION_BLOCKED,
            _ => error_code::ESTIMATION_ERROR,
        }
    }
}
