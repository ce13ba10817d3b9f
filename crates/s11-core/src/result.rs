//! Convenience result type alias for S11.

use crate::error::AppError;

/// A specialized `Result` type for S11 operations.
pub type AppResult<T> = Result<T, AppError>;
