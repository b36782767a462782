use axum::{
    extract::{Path, State},
    Json,
};

use crate::app_state::AppState;
use crate::error::AppResult;
use crate::infrastructure::middleware::Vc;
use crate::services::{Feed, FeedSection, VideoCard};

pub async fn feed_handler(State(state): State<AppState>, vc: Vc) -> AppResult<Json<Feed>> {
    let user_id = vc.require_user()?;
    Ok(Json(state.feed.feed(user_id).await))
}

pub async fn feed_section_handler(
    State(state): State<AppState>,
    vc: Vc,
    Path(section): Path<String>,
) -> AppResult<Json<Vec<VideoCard>>> {
    let user_id = vc.require_user()?;
    let section: FeedSection = section.parse()?;
    Ok(Json(state.feed.section(user_id, section).await))
}
