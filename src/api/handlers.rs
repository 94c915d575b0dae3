//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::{error, warn};

use super::AppState;
use super::types::{DataResponse, ErrorResponse};
use crate::request::LoadProfileRequest;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Generates a load profile for the posted request.
///
/// `POST /getloadprofile` → 200 + `{"data": LoadProfile}`
/// Any engine error → 400 + `ErrorResponse`
pub async fn get_load_profile(
    State(state): State<Arc<AppState>>,
    body: String,
) -> ApiResult<DataResponse> {
    let request = LoadProfileRequest::from_json_str(&body).map_err(|e| {
        warn!(error = %e, "rejected load profile request");
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::from(&e)))
    })?;

    // Trace loading and resampling are blocking work.
    let joined =
        tokio::task::spawn_blocking(move || state.engine.load_profile(&request)).await;

    match joined {
        Ok(Ok(profile)) => Ok(Json(DataResponse { data: profile })),
        Ok(Err(e)) => {
            warn!(error = %e, kind = %e.kind(), "load profile generation failed");
            Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::from(&e))))
        }
        Err(join_err) => {
            error!(error = %join_err, "load profile worker panicked");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal error".to_string(),
                    kind: "InternalError".to_string(),
                    detail: join_err.to_string(),
                }),
            ))
        }
    }
}

/// `GET /health` → `ok`
pub async fn health() -> &'static str {
    "ok"
}

/// `GET /version` → `loadprofile-gen v<version>`
pub async fn version() -> String {
    format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
