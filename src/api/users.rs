use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::AppResult;
use crate::infrastructure::middleware::Vc;
use crate::models::{ProfileUpdate, User, UserSummary};
use crate::services::profile_service::Profile;
use crate::services::{ToggleOutcome, VideoCard};

pub async fn get_profile_handler(
    State(state): State<AppState>,
    vc: Vc,
    Path(username): Path<String>,
) -> AppResult<Json<Profile>> {
    Ok(Json(state.profiles.profile(vc.user_id, &username).await?))
}

pub async fn followers_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.profiles.followers(user_id).await?))
}

pub async fn following_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.profiles.following(user_id).await?))
}

pub async fn toggle_follow_handler(
    State(state): State<AppState>,
    vc: Vc,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ToggleOutcome>> {
    let follower = vc.require_user()?;
    Ok(Json(state.social.toggle_follow(follower, user_id).await?))
}

pub async fn me_handler(State(state): State<AppState>, vc: Vc) -> AppResult<Json<User>> {
    Ok(Json(state.profiles.me(vc.require_user()?).await?))
}

pub async fn update_me_handler(
    State(state): State<AppState>,
    vc: Vc,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<User>> {
    Ok(Json(state.profiles.update(vc.require_user()?, update).await?))
}

pub async fn my_videos_handler(State(state): State<AppState>, vc: Vc) -> AppResult<Json<Vec<VideoCard>>> {
    Ok(Json(state.profiles.my_videos(vc.require_user()?).await?))
}

pub async fn my_saved_handler(State(state): State<AppState>, vc: Vc) -> AppResult<Json<Vec<VideoCard>>> {
    Ok(Json(state.profiles.my_saved(vc.require_user()?).await?))
}
