use axum::Json;
use axum::extract::{Query, State};
use tower_sessions::Session;

use crate::browser_session::session_cache;
use crate::dto::{NavigationQuery, NavigationResponse};
use crate::state::AppState;

/// Decides render or redirect for a path without serving the page.
pub async fn navigation_handler(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<NavigationQuery>,
) -> Json<NavigationResponse> {
    let cache = session_cache(session);
    let decision = state
        .navigation_service
        .navigate(&query.path, &cache)
        .await;

    Json(NavigationResponse::from(decision))
}
