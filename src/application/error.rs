//! Failure taxonomy for the coordinator.
//!
//! Post searches report failures twice: the `ApiError` is returned to the
//! caller and its [`ApiError::toast_message`] lands in
//! `SearchState::toast_error`. Tag loading only returns [`TagLoadError`] and
//! logs it; it never writes the toast.

use thiserror::Error;

use crate::application::gateway::ApiError;

/// Aggregate failure of a `load_tags` call.
///
/// Batches that succeeded have already populated the tag store; nothing is
/// rolled back.
#[derive(Debug, Clone, Error)]
#[error("{failed_batches} of {total_batches} tag batches failed: {source}")]
pub struct TagLoadError {
    pub failed_batches: usize,
    pub total_batches: usize,
    /// First failure in batch order.
    pub source: ApiError,
}
