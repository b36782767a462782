use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::warn;

use crate::app_state::AppState;
use crate::core::categories::{self, MainCategory};
use crate::services::{SearchFilters, Suggestion, VideoCard};

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    #[serde(default)]
    pub q: String,
}

pub async fn categories_handler() -> Json<&'static [MainCategory]> {
    Json(categories::all())
}

/// Search failures degrade to an empty result list.
pub async fn search_videos_handler(
    State(state): State<AppState>,
    Query(filters): Query<SearchFilters>,
) -> Json<Vec<VideoCard>> {
    let videos = state.search.search(&filters).await.unwrap_or_else(|e| {
        warn!("Error searching videos with {:?}: {}", filters, e);
        Vec::new()
    });
    Json(videos)
}

pub async fn suggestions_handler(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> Json<Vec<Suggestion>> {
    let suggestions = state.suggestions.fetch(&params.q).await.unwrap_or_else(|e| {
        warn!("Error fetching suggestions for {:?}: {}", params.q, e);
        Vec::new()
    });
    Json(suggestions)
}
