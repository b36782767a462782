use axum::{extract::State, http::StatusCode, Json};

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::infrastructure::middleware::Vc;
use crate::services::auth_service::{SignInRequest, SignUpRequest};
use crate::services::AuthSession;

pub async fn sign_up_handler(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<AuthSession>)> {
    let session = state.auth.sign_up(req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn sign_in_handler(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> AppResult<Json<AuthSession>> {
    Ok(Json(state.auth.sign_in(req).await?))
}

pub async fn sign_out_handler(State(state): State<AppState>, vc: Vc) -> AppResult<StatusCode> {
    let token = vc
        .session_token
        .ok_or_else(|| AppError::Unauthorized("No active session".into()))?;
    state.auth.sign_out(token).await?;
    Ok(StatusCode::NO_CONTENT)
}
