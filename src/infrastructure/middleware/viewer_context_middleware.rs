// ViewerContext middleware - resolves the session token into a request-scoped
// ViewerContext, and guards routes that need a signed-in viewer.

use axum::{
    extract::{OriginalUri, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};
use url::form_urlencoded;
use uuid::Uuid;

use crate::infrastructure::viewer::ViewerContext;
use crate::services::AuthService;

pub const LOGIN_PATH: &str = "/login";

/// Application state that can resolve session tokens
pub trait HasAuthService {
    fn auth_service(&self) -> &AuthService;
}

/// Attach an `Arc<ViewerContext>` to every request. Missing, malformed or
/// expired tokens produce an anonymous viewer rather than an error.
pub async fn viewer_context_middleware<T>(
    State(app_state): State<T>,
    mut request: Request,
    next: Next,
) -> Response
where
    T: HasAuthService + Clone + Send + Sync + 'static,
{
    let viewer_context = match extract_bearer_token(request.headers()) {
        Some(token) => match app_state.auth_service().resolve(token).await {
            Ok(Some(user_id)) => ViewerContext::authenticated(user_id, token),
            Ok(None) => {
                debug!("Session token did not resolve; continuing anonymously");
                ViewerContext::anonymous()
            }
            Err(e) => {
                warn!("Session lookup failed: {}", e);
                ViewerContext::anonymous()
            }
        },
        None => ViewerContext::anonymous(),
    };

    request.extensions_mut().insert(Arc::new(viewer_context));
    next.run(request).await
}

/// Answer `303 See Other` to the login page, carrying the original path and
/// query, when the request has no authenticated viewer.
pub async fn require_viewer(request: Request, next: Next) -> Response {
    let authenticated = request
        .extensions()
        .get::<Arc<ViewerContext>>()
        .is_some_and(|vc| vc.is_authenticated());
    if authenticated {
        return next.run(request).await;
    }

    // Nested routers see a stripped URI; the redirect needs the full one
    let uri = request
        .extensions()
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or_else(|| request.uri());
    let original = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    Redirect::to(&login_redirect(&original)).into_response()
}

pub fn login_redirect(original: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(original.as_bytes()).collect();
    format!("{}?redirect={}", LOGIN_PATH, encoded)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<Uuid> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    Uuid::parse_str(token.trim()).ok()
}
