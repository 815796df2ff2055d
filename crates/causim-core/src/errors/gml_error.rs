//! Errors from reading or writing the GML interchange format.

use super::error_code::{self, CausimErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum GmlError {
    #[error("GML syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("GML {element} is missing required field {field}")]
    MissingField { element: String, field: String },

    #[error("GML field {field} has an invalid value: {message}")]
    InvalidValue { field: String, message: String },

    #[error("GML I/O error for {path}: {message}")]
    Io { path: String, message: String },
}

impl CausimErrorCode for GmlError {
    fn error_code(&self) -> &'static str {
        error_code::GML_ERROR
    }
}
