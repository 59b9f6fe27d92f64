//! Comprehensive error handling for Tilestream Engine
//!
//! This module provides a unified error type for the streaming core.
//! Asset integrity problems and lifecycle misuse both surface here so the
//! logic thread can stop with a diagnostic instead of panicking.

use std::error::Error as StdError;
use std::fmt;

/// Main error type for Tilestream Engine
#[derive(Debug)]
pub enum EngineError {
    // Asset Errors
    CorruptedData {
        reason: String,
    },
    ResourceNotFound {
        resource_type: String,
        id: String,
    },

    // Lifecycle Errors
    StateError {
        expected: String,
        actual: String,
    },
    ReferenceUnderflow {
        resource: String,
        id: String,
    },

    // Script Errors
    ScriptFault {
        obj: String,
        error: String,
    },

    // System Errors
    IoError {
        path: String,
        error: String,
    },
    ThreadError {
        thread: String,
        error: String,
    },

    // Generic fallback for unexpected errors
    Internal {
        message: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::CorruptedData { reason } => write!(f, "Data corrupted: {}", reason),
            EngineError::ResourceNotFound { resource_type, id } => {
                write!(f, "Resource not found: {} '{}'", resource_type, id)
            }

            EngineError::StateError { expected, actual } => {
                write!(f, "State error: expected {}, actual {}", expected, actual)
            }
            EngineError::ReferenceUnderflow { resource, id } => write!(
                f,
                "Reference underflow: {} '{}' dereferenced more times than referenced",
                resource, id
            ),

            EngineError::ScriptFault { obj, error } => {
                write!(f, "Script fault on obj {}: {}", obj, error)
            }

            EngineError::IoError { path, error } => write!(f, "IO error for {}: {}", path, error),
            EngineError::ThreadError { thread, error } => {
                write!(f, "Thread error in {}: {}", thread, error)
            }

            EngineError::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl StdError for EngineError {}

/// Type alias for Results in Tilestream Engine
pub type EngineResult<T> = Result<T, EngineError>;

// Conversion traits for common error types

impl From<std::io::Error> for EngineError {
    fn from(error: std::io::Error) -> Self {
        EngineError::IoError {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

impl From<crate::assets::AssetError> for EngineError {
    fn from(err: crate::assets::AssetError) -> Self {
        use crate::assets::AssetError;
        match err {
            // The bundle is static; a missing record means the data referencing it is broken.
            AssetError::NotFound { path } => EngineError::CorruptedData {
                reason: format!("missing asset '{}'", path),
            },
            AssetError::Io { path, error } => EngineError::IoError { path, error },
            other => EngineError::CorruptedData {
                reason: other.to_string(),
            },
        }
    }
}

impl From<crate::world::error::MovementError> for EngineError {
    fn from(err: crate::world::error::MovementError) -> Self {
        use crate::world::error::MovementError;
        let obj = match &err {
            MovementError::EmptyQueue { obj } => obj.to_string(),
            MovementError::UnknownCode { obj, .. } => obj.to_string(),
        };
        EngineError::ScriptFault {
            obj,
            error: err.to_string(),
        }
    }
}

// Helper functions for common error patterns

/// Convert Option to Result with context
pub trait OptionExt<T> {
    fn ok_or_engine<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> EngineError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_engine<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> EngineError,
    {
        self.ok_or_else(f)
    }
}

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> EngineResult<T>;
    fn with_context<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: Into<EngineError>,
{
    fn context(self, msg: &str) -> EngineResult<T> {
        self.map_err(|e| prefix_error(e.into(), msg))
    }

    fn with_context<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> String,
    {
        let msg = f();
        self.context(&msg)
    }
}

/// Same variant, with `msg` in front of its descriptive field
fn prefix_error(err: EngineError, msg: &str) -> EngineError {
    let prefixed = |text: String| format!("{}: {}", msg, text);
    match err {
        EngineError::CorruptedData { reason } => EngineError::CorruptedData {
            reason: prefixed(reason),
        },
        EngineError::ResourceNotFound { resource_type, id } => EngineError::ResourceNotFound {
            resource_type: prefixed(resource_type),
            id,
        },
        EngineError::StateError { expected, actual } => EngineError::StateError {
            expected: prefixed(expected),
            actual,
        },
        EngineError::ReferenceUnderflow { resource, id } => EngineError::ReferenceUnderflow {
            resource: prefixed(resource),
            id,
        },
        EngineError::ScriptFault { obj, error } => EngineError::ScriptFault {
            obj,
            error: prefixed(error),
        },
        EngineError::IoError { path, error } => EngineError::IoError {
            path,
            error: prefixed(error),
        },
        EngineError::ThreadError { thread, error } => EngineError::ThreadError {
            thread,
            error: prefixed(error),
        },
        EngineError::Internal { message } => EngineError::Internal {
            message: prefixed(message),
        },
    }
}
