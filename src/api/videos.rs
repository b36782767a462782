use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::AppResult;
use crate::infrastructure::middleware::Vc;
use crate::models::Video;
use crate::services::video_service::{CommentView, PostCommentRequest, UploadRequest, VideoDetail};
use crate::services::ToggleOutcome;

pub async fn upload_video_handler(
    State(state): State<AppState>,
    vc: Vc,
    Json(req): Json<UploadRequest>,
) -> AppResult<(StatusCode, Json<Video>)> {
    let uploader = vc.require_user()?;
    let video = state.videos.upload(uploader, req).await?;
    Ok((StatusCode::CREATED, Json(video)))
}

pub async fn get_video_handler(
    State(state): State<AppState>,
    vc: Vc,
    Path(id): Path<Uuid>,
) -> AppResult<Json<VideoDetail>> {
    Ok(Json(state.videos.detail(vc.user_id, id).await?))
}

pub async fn list_comments_handler(
    State(state): State<AppState>,
    vc: Vc,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<CommentView>>> {
    Ok(Json(state.videos.comments(vc.user_id, id).await?))
}

pub async fn post_comment_handler(
    State(state): State<AppState>,
    vc: Vc,
    Path(id): Path<Uuid>,
    Json(req): Json<PostCommentRequest>,
) -> AppResult<(StatusCode, Json<CommentView>)> {
    let author = vc.require_user()?;
    let comment = state.videos.post_comment(author, id, req).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn toggle_like_handler(
    State(state): State<AppState>,
    vc: Vc,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ToggleOutcome>> {
    let user_id = vc.require_user()?;
    Ok(Json(state.social.toggle_like(user_id, id).await?))
}

pub async fn toggle_save_handler(
    State(state): State<AppState>,
    vc: Vc,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ToggleOutcome>> {
    let user_id = vc.require_user()?;
    Ok(Json(state.social.toggle_save(user_id, id).await?))
}
