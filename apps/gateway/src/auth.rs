use agrogate_application::LoginCredentials;
use agrogate_core::AppError;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tower_sessions::Session;

use crate::browser_session::session_cache;
use crate::dto::{LoginRequest, LoginResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let credentials = LoginCredentials {
        username: payload.username,
        password: payload.password,
    };

    let cache = session_cache(session.clone());
    let outcome = state.session_service.login(&cache, &credentials).await?;

    // New session id once a credential is bound to it.
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to rotate session id: {error}")))?;

    Ok(Json(LoginResponse::from(outcome)))
}

pub async fn logout_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<StatusCode> {
    state
        .session_service
        .logout(&session_cache(session.clone()))
        .await?;
    delete_session(&session).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Called by the client after the backend confirmed an account deletion.
pub async fn account_deleted_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<StatusCode> {
    state
        .session_service
        .end_deleted_account_session(&session_cache(session.clone()))
        .await?;
    delete_session(&session).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_session(session: &Session) -> Result<(), AppError> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))
}
