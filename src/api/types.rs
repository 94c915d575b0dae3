//! API response types.

use serde::Serialize;

use crate::engine::LoadProfile;
use crate::error::EngineError;

/// Successful `POST /getloadprofile` body.
#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub data: LoadProfile,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable, user-facing message.
    pub error: String,
    /// Error classification, e.g. `"InvalidWindowError"`.
    pub kind: String,
    /// Human-readable detail.
    pub detail: String,
}

impl From<&EngineError> for ErrorResponse {
    fn from(err: &EngineError) -> Self {
        Self {
            error: "Invalid parameters".to_string(),
            kind: err.kind().to_string(),
            detail: err.to_string(),
        }
    }
}
