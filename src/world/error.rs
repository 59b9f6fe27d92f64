/// World Error Handling
///
/// Provides error types and utilities for the streaming world.
use crate::error::{EngineError, EngineResult};
use crate::world::core::ObjId;

/// World-specific result type
pub type WorldResult<T> = EngineResult<T>;

/// Error context for world lookups
pub trait WorldErrorContext<T> {
    fn world_context(self, resource_type: &str, id: impl std::fmt::Display) -> WorldResult<T>;
}

impl<T> WorldErrorContext<T> for Option<T> {
    fn world_context(self, resource_type: &str, id: impl std::fmt::Display) -> WorldResult<T> {
        self.ok_or_else(|| EngineError::ResourceNotFound {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        })
    }
}

/// Lifecycle misuse: the caller asked for data the current state does not hold
pub fn state_error(expected: impl Into<String>, actual: impl Into<String>) -> EngineError {
    EngineError::StateError {
        expected: expected.into(),
        actual: actual.into(),
    }
}

/// Scripted movement faults. Either one means the script data is corrupt.
#[derive(Debug, thiserror::Error)]
pub enum MovementError {
    #[error("dequeued movement from an empty queue on {obj}")]
    EmptyQueue { obj: ObjId },

    #[error("unrecognized movement code {code} for {obj}")]
    UnknownCode { obj: ObjId, code: u8 },
}
