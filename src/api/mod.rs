// HTTP API - /api/v1 routes over the application services

pub mod auth;
pub mod feed;
pub mod playlists;
pub mod search;
pub mod users;
pub mod videos;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::app_state::AppState;
use crate::infrastructure::middleware::{require_viewer, viewer_context_middleware};

/// Base64 inflates uploads by a third; leave room for that.
pub const MAX_UPLOAD_BODY_BYTES: usize = 512 * 1024 * 1024;

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        // Identity
        .route("/auth/signup", post(auth::sign_up_handler))
        .route("/auth/signin", post(auth::sign_in_handler))
        // Discovery
        .route("/categories", get(search::categories_handler))
        .route("/videos", get(search::search_videos_handler))
        .route("/search/suggestions", get(search::suggestions_handler))
        // Videos
        .route("/videos/{id}", get(videos::get_video_handler))
        .route("/videos/{id}/comments", get(videos::list_comments_handler))
        // Users
        .route("/users/{user}", get(users::get_profile_handler))
        .route("/users/{user}/followers", get(users::followers_handler))
        .route("/users/{user}/following", get(users::following_handler))
        // Playlists
        .route("/playlists/popular", get(playlists::popular_handler))
        .route("/playlists/{id}", get(playlists::get_playlist_handler))
}

fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signout", post(auth::sign_out_handler))
        // Videos
        .route(
            "/videos",
            post(videos::upload_video_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        .route("/videos/{id}/like", post(videos::toggle_like_handler))
        .route("/videos/{id}/save", post(videos::toggle_save_handler))
        .route("/videos/{id}/comments", post(videos::post_comment_handler))
        .route("/videos/{id}/playlists", get(playlists::memberships_handler))
        // Users
        .route("/users/{user}/follow", post(users::toggle_follow_handler))
        .route("/me", get(users::me_handler))
        .route("/me", patch(users::update_me_handler))
        .route("/me/videos", get(users::my_videos_handler))
        .route("/me/saved", get(users::my_saved_handler))
        // Feed
        .route("/feed", get(feed::feed_handler))
        .route("/feed/{section}", get(feed::feed_section_handler))
        // Playlists
        .route("/playlists", post(playlists::create_playlist_handler))
        .route("/playlists/mine", get(playlists::mine_handler))
        .route("/playlists/following", get(playlists::following_handler))
        .route("/playlists/{id}", delete(playlists::delete_playlist_handler))
        .route("/playlists/{id}/follow", post(playlists::toggle_follow_handler))
        .route(
            "/playlists/{id}/videos/{video_id}",
            post(playlists::toggle_video_handler),
        )
        .route_layer(middleware::from_fn(require_viewer))
}

/// The `/api/v1` router with viewer resolution on every route.
pub fn create_api_router(state: AppState) -> Router {
    public_routes()
        .merge(protected_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            viewer_context_middleware::<AppState>,
        ))
        .with_state(state)
}

/// Full application router: API, uploaded media and CORS.
pub fn create_router(state: AppState) -> Router {
    let media = ServeDir::new(&state.config.storage.media_root);
    Router::new()
        .nest("/api/v1", create_api_router(state))
        .nest_service("/media", media)
        .layer(CorsLayer::permissive())
}
