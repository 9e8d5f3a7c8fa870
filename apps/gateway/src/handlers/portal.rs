use agrogate_application::NavigationDecision;
use agrogate_domain::{RouteGuardResult, RouteMatch};
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use tower_sessions::Session;

use crate::browser_session::session_cache;
use crate::state::AppState;

/// Serves every portal path: a shell page for the client app, or a redirect.
pub async fn portal_page_handler(
    State(state): State<AppState>,
    session: Session,
    method: Method,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let cache = session_cache(session);
    let decision = state.navigation_service.navigate(uri.path(), &cache).await;

    match &decision.result {
        RouteGuardResult::Render => render_shell(&decision),
        RouteGuardResult::Loading => Html(shell("loading", "", "", "")).into_response(),
        RouteGuardResult::RedirectToLogin | RouteGuardResult::RedirectToPortal(_) => {
            match decision.result.redirect_target() {
                Some(target) => Redirect::to(target).into_response(),
                None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            }
        }
    }
}

fn render_shell(decision: &NavigationDecision) -> Response {
    match &decision.route {
        RouteMatch::Page { portal, page } => {
            Html(shell("page", portal.as_str(), portal.layout(), page)).into_response()
        }
        RouteMatch::Login => Html(shell("login", "", "", "login")).into_response(),
        RouteMatch::NotFound => {
            (StatusCode::NOT_FOUND, Html(shell("not_found", "", "", ""))).into_response()
        }
        // Root always redirects once resolved.
        RouteMatch::Root => Html(shell("loading", "", "", "")).into_response(),
    }
}

/// Minimal document the client app mounts into; every value is a static route name.
fn shell(view: &str, portal: &str, layout: &str, page: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Agrogate</title></head>\n\
         <body><div id=\"app\" data-view=\"{view}\" data-portal=\"{portal}\" \
         data-layout=\"{layout}\" data-page=\"{page}\"></div></body>\n</html>\n"
    )
}
