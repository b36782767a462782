// Application services - each one owns a slice of the app-specific logic
// and talks to the outside world only through the store/storage traits.

pub mod auth_service;
pub mod feed_service;
pub mod playlist_service;
pub mod profile_service;
pub mod search_service;
pub mod social_service;
pub mod video_service;

pub use auth_service::{AuthEvent, AuthService, AuthSession};
pub use feed_service::{Feed, FeedSection, FeedService};
pub use playlist_service::{MembershipOutcome, PlaylistService};
pub use profile_service::ProfileService;
pub use search_service::{SearchFilters, SearchService, Suggestion, SuggestionService, SuggestionSession};
pub use social_service::{SocialService, ToggleOutcome, ToggleState};
pub use video_service::VideoService;

use serde::Serialize;
use std::collections::HashMap;

use crate::error::AppResult;
use crate::infrastructure::database::DataStore;
use crate::models::{Timestamp, UserId, Video, VideoId};

pub const UNKNOWN_USER: &str = "Unknown User";

/// A video as listed in grids and feeds, with its uploader's username.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoCard {
    pub id: VideoId,
    pub user_id: UserId,
    pub username: String,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub duration: i64,
    pub main_category: String,
    pub sub_category: String,
    pub views: i64,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: Timestamp,
}

impl VideoCard {
    pub fn new(video: Video, username: String) -> Self {
        Self {
            id: video.id,
            user_id: video.user_id,
            username,
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            duration: video.duration,
            main_category: video.main_category,
            sub_category: video.sub_category,
            views: video.views,
            likes_count: video.likes_count,
            comments_count: video.comments_count,
            created_at: video.created_at,
        }
    }
}

/// Resolve uploader usernames with one batched lookup, keeping video order.
pub async fn with_usernames(store: &dyn DataStore, videos: Vec<Video>) -> AppResult<Vec<VideoCard>> {
    let mut user_ids: Vec<UserId> = videos.iter().map(|v| v.user_id).collect();
    user_ids.sort();
    user_ids.dedup();

    let usernames: HashMap<UserId, String> = store
        .get_users(&user_ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user.username))
        .collect();

    Ok(videos
        .into_iter()
        .map(|video| {
            let username = usernames
                .get(&video.user_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_USER.to_string());
            VideoCard::new(video, username)
        })
        .collect())
}
