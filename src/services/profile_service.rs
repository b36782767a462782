// User profiles and follow lists

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::infrastructure::database::{DataStore, VideoFilter, VideoOrder, VideoQuery};
use crate::models::{EdgeKind, ProfileUpdate, User, UserId, UserSummary};
use crate::services::{with_usernames, VideoCard};

const MAX_DISPLAY_NAME_LEN: usize = 50;
const MAX_BIO_LEN: usize = 500;

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: UserSummary,
    pub following_count: i64,
    pub videos_count: i64,
    pub is_self: bool,
    pub is_following: bool,
    pub videos: Vec<VideoCard>,
}

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn DataStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub async fn profile(&self, viewer: Option<UserId>, username: &str) -> AppResult<Profile> {
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))?;

        let is_self = viewer == Some(user.id);
        let is_following = match viewer {
            Some(viewer) if !is_self => self.store.edge_exists(viewer, EdgeKind::Follow, user.id).await?,
            _ => false,
        };

        let query = VideoQuery::new()
            .filter(VideoFilter::PublicOnly)
            .filter(VideoFilter::AuthorIs(user.id))
            .order_by(VideoOrder::Newest);
        let videos = self.store.find_videos(&query).await?;
        let videos = with_usernames(self.store.as_ref(), videos).await?;

        Ok(Profile {
            user: UserSummary::from(&user),
            following_count: user.following_count,
            videos_count: user.videos_count,
            is_self,
            is_following,
            videos,
        })
    }

    pub async fn me(&self, viewer: UserId) -> AppResult<User> {
        self.store
            .get_user(viewer)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", viewer)))
    }

    pub async fn update(&self, viewer: UserId, update: ProfileUpdate) -> AppResult<User> {
        let update = normalize_update(update)?;
        let user = self.store.update_profile(viewer, update).await?;
        info!("Updated profile for {}", viewer);
        Ok(user)
    }

    pub async fn followers(&self, user_id: UserId) -> AppResult<Vec<UserSummary>> {
        let ids: Vec<UserId> = self
            .store
            .incoming_edges(user_id, EdgeKind::Follow, None)
            .await?
            .into_iter()
            .map(|edge| edge.subject)
            .collect();
        self.summaries(&ids).await
    }

    pub async fn following(&self, user_id: UserId) -> AppResult<Vec<UserSummary>> {
        let ids: Vec<UserId> = self
            .store
            .outgoing_edges(user_id, EdgeKind::Follow, None)
            .await?
            .into_iter()
            .map(|edge| edge.object)
            .collect();
        self.summaries(&ids).await
    }

    /// Own uploads, private ones included.
    pub async fn my_videos(&self, viewer: UserId) -> AppResult<Vec<VideoCard>> {
        let query = VideoQuery::new()
            .filter(VideoFilter::AuthorIs(viewer))
            .order_by(VideoOrder::Newest);
        let videos = self.store.find_videos(&query).await?;
        with_usernames(self.store.as_ref(), videos).await
    }

    pub async fn my_saved(&self, viewer: UserId) -> AppResult<Vec<VideoCard>> {
        let videos = self
            .store
            .saved_videos(viewer, None)
            .await?
            .into_iter()
            .filter_map(|row| row.video)
            .collect();
        with_usernames(self.store.as_ref(), videos).await
    }

    /// Summaries in edge order; users that no longer exist are skipped.
    async fn summaries(&self, ids: &[UserId]) -> AppResult<Vec<UserSummary>> {
        let users = self.store.get_users(ids).await?;
        Ok(ids
            .iter()
            .filter_map(|id| users.iter().find(|u| u.id == *id))
            .map(UserSummary::from)
            .collect())
    }
}

fn normalize_update(update: ProfileUpdate) -> AppResult<ProfileUpdate> {
    let display_name = match update.display_name.map(|n| n.trim().to_string()) {
        Some(name) if name.is_empty() => {
            return Err(AppError::Validation("Display name cannot be empty".into()))
        }
        Some(name) if name.chars().count() > MAX_DISPLAY_NAME_LEN => {
            return Err(AppError::Validation("Display name is too long".into()))
        }
        other => other,
    };
    let bio = update.bio.map(|b| b.trim().to_string());
    if bio.as_ref().is_some_and(|b| b.chars().count() > MAX_BIO_LEN) {
        return Err(AppError::Validation("Bio is too long".into()));
    }
    Ok(ProfileUpdate {
        display_name,
        bio,
        avatar_url: update.avatar_url.map(|u| u.trim().to_string()),
    })
}
