use axum::Json;
use axum::extract::State;
use tower_sessions::Session;

use crate::browser_session::session_cache;
use crate::dto::SessionResponse;
use crate::state::AppState;

pub async fn session_handler(
    State(state): State<AppState>,
    session: Session,
) -> Json<SessionResponse> {
    let cache = session_cache(session);
    let overview = state.navigation_service.overview(&cache).await;

    Json(SessionResponse::from(overview))
}
