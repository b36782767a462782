use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::AppResult;
use crate::infrastructure::middleware::Vc;
use crate::models::Playlist;
use crate::services::playlist_service::{CreatePlaylistRequest, PlaylistDetail, PlaylistOption};
use crate::services::{MembershipOutcome, ToggleOutcome};

pub async fn create_playlist_handler(
    State(state): State<AppState>,
    vc: Vc,
    Json(req): Json<CreatePlaylistRequest>,
) -> AppResult<(StatusCode, Json<Playlist>)> {
    let owner = vc.require_user()?;
    let playlist = state.playlists.create(owner, req).await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

pub async fn get_playlist_handler(
    State(state): State<AppState>,
    vc: Vc,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PlaylistDetail>> {
    Ok(Json(state.playlists.detail(vc.user_id, id).await?))
}

pub async fn delete_playlist_handler(
    State(state): State<AppState>,
    vc: Vc,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.playlists.delete(vc.require_user()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_video_handler(
    State(state): State<AppState>,
    vc: Vc,
    Path((id, video_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<MembershipOutcome>> {
    let viewer = vc.require_user()?;
    Ok(Json(state.playlists.toggle_video(viewer, id, video_id).await?))
}

pub async fn toggle_follow_handler(
    State(state): State<AppState>,
    vc: Vc,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ToggleOutcome>> {
    let viewer = vc.require_user()?;
    Ok(Json(state.social.toggle_playlist_follow(viewer, id).await?))
}

/// The viewer's playlists for the add-to-playlist picker.
pub async fn memberships_handler(
    State(state): State<AppState>,
    vc: Vc,
    Path(video_id): Path<Uuid>,
) -> AppResult<Json<Vec<PlaylistOption>>> {
    let viewer = vc.require_user()?;
    Ok(Json(state.playlists.memberships(viewer, video_id).await?))
}

pub async fn mine_handler(State(state): State<AppState>, vc: Vc) -> AppResult<Json<Vec<Playlist>>> {
    Ok(Json(state.playlists.mine(vc.require_user()?).await?))
}

pub async fn following_handler(State(state): State<AppState>, vc: Vc) -> AppResult<Json<Vec<Playlist>>> {
    Ok(Json(state.playlists.from_followed(vc.require_user()?).await?))
}

pub async fn popular_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Playlist>>> {
    Ok(Json(state.playlists.popular().await?))
}
