//! Convenience result type alias for KripStanx.

use crate::error::AppError;

/// A specialized `Result` type for KripStanx operations.
pub type AppResult<T> = Result<T, AppError>;
