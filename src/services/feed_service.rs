// Feed composition - following / saved / recommended sections for one user

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::database::{DataStore, VideoFilter, VideoOrder, VideoQuery};
use crate::models::{EdgeKind, UserId};
use crate::services::{with_usernames, VideoCard};

/// How many recent saves feed the category preference set
pub const PREFERENCE_SAMPLE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSection {
    Following,
    Saved,
    Recommended,
}

impl FromStr for FeedSection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "following" => Ok(FeedSection::Following),
            "saved" => Ok(FeedSection::Saved),
            "recommended" => Ok(FeedSection::Recommended),
            other => Err(AppError::NotFound(format!("Unknown feed section: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Feed {
    pub following: Vec<VideoCard>,
    pub saved: Vec<VideoCard>,
    pub recommended: Vec<VideoCard>,
}

#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn DataStore>,
    page_size: u32,
}

impl FeedService {
    pub fn new(store: Arc<dyn DataStore>, page_size: u32) -> Self {
        Self { store, page_size }
    }

    /// All three sections, fetched concurrently. A failing section is
    /// logged and comes back empty without affecting the others.
    pub async fn feed(&self, user_id: UserId) -> Feed {
        let (following, saved, recommended) = futures::join!(
            self.section(user_id, FeedSection::Following),
            self.section(user_id, FeedSection::Saved),
            self.section(user_id, FeedSection::Recommended),
        );
        Feed {
            following,
            saved,
            recommended,
        }
    }

    pub async fn section(&self, user_id: UserId, section: FeedSection) -> Vec<VideoCard> {
        let result = match section {
            FeedSection::Following => self.following(user_id).await,
            FeedSection::Saved => self.saved(user_id).await,
            FeedSection::Recommended => self.recommended(user_id).await,
        };
        result.unwrap_or_else(|e| {
            warn!("Error fetching {:?} feed for {}: {}", section, user_id, e);
            Vec::new()
        })
    }

    /// Newest public uploads of followed users.
    pub async fn following(&self, user_id: UserId) -> AppResult<Vec<VideoCard>> {
        let followee_ids: Vec<UserId> = self
            .store
            .outgoing_edges(user_id, EdgeKind::Follow, None)
            .await?
            .into_iter()
            .map(|edge| edge.object)
            .collect();

        if followee_ids.is_empty() {
            debug!("User {} follows nobody; skipping following feed query", user_id);
            return Ok(Vec::new());
        }

        let query = VideoQuery::new()
            .filter(VideoFilter::PublicOnly)
            .filter(VideoFilter::AuthorIn(followee_ids))
            .order_by(VideoOrder::Newest)
            .limit(self.page_size);

        let videos = self.store.find_videos(&query).await?;
        with_usernames(self.store.as_ref(), videos).await
    }

    /// Saved videos in save order; saves pointing at missing videos are dropped.
    pub async fn saved(&self, user_id: UserId) -> AppResult<Vec<VideoCard>> {
        let videos = self
            .store
            .saved_videos(user_id, Some(self.page_size))
            .await?
            .into_iter()
            .filter_map(|row| row.video)
            .collect();
        with_usernames(self.store.as_ref(), videos).await
    }

    /// Most-liked public videos by other users, restricted to the main
    /// categories of recent saves when there are any.
    pub async fn recommended(&self, user_id: UserId) -> AppResult<Vec<VideoCard>> {
        let preferred = self.preferred_categories(user_id).await?;

        let mut query = VideoQuery::new()
            .filter(VideoFilter::PublicOnly)
            .filter(VideoFilter::AuthorNot(user_id));
        if !preferred.is_empty() {
            query = query.filter(VideoFilter::MainCategoryIn(preferred));
        }
        let query = query.order_by(VideoOrder::MostLiked).limit(self.page_size);

        let videos = self.store.find_videos(&query).await?;
        with_usernames(self.store.as_ref(), videos).await
    }

    pub async fn preferred_categories(&self, user_id: UserId) -> AppResult<Vec<String>> {
        let mut categories: Vec<String> = Vec::new();
        for row in self.store.saved_videos(user_id, Some(PREFERENCE_SAMPLE)).await? {
            if let Some(video) = row.video {
                if !categories.contains(&video.main_category) {
                    categories.push(video.main_category);
                }
            }
        }
        Ok(categories)
    }
}
