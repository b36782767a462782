// Social graph toggles - follow, like, save and playlist follow
//
// Every relation uses the same check-then-insert-or-delete pattern against a
// unique edge key. Denormalized counters are adjusted afterwards by a
// separate best-effort write and are never recounted.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::infrastructure::database::DataStore;
use crate::models::{Counter, EdgeKind, UserId};

/// Caller-held view of a relation: the flag and the counter shown next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToggleState {
    pub active: bool,
    pub count: i64,
}

impl ToggleState {
    /// Reconcile local state with a successful toggle.
    pub fn apply(self, outcome: &ToggleOutcome) -> Self {
        let count = match (self.active, outcome.active) {
            (false, true) => self.count + 1,
            (true, false) => (self.count - 1).max(0),
            _ => self.count,
        };
        Self {
            active: outcome.active,
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub kind: EdgeKind,
    pub active: bool,
    /// Stored counter after adjustment; `None` when the relation has no
    /// counter or the counter write failed.
    pub count: Option<i64>,
}

#[derive(Clone)]
pub struct SocialService {
    store: Arc<dyn DataStore>,
}

impl SocialService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub async fn is_active(&self, subject: UserId, kind: EdgeKind, object: Uuid) -> AppResult<bool> {
        self.store.edge_exists(subject, kind, object).await
    }

    pub async fn toggle(&self, subject: UserId, kind: EdgeKind, object: Uuid) -> AppResult<ToggleOutcome> {
        self.validate_target(subject, kind, object).await?;

        let active = if self.store.edge_exists(subject, kind, object).await? {
            self.store.delete_edge(subject, kind, object).await?;
            false
        } else {
            self.store.insert_edge(subject, kind, object).await?;
            true
        };
        info!("{} {} -> {}: active={}", kind.as_str(), subject, object, active);

        let delta = if active { 1 } else { -1 };
        let mut count = None;
        for (i, counter) in counters_for(kind, subject, object).into_iter().enumerate() {
            match self.store.adjust_counter(counter, delta).await {
                Ok(value) if i == 0 => count = Some(value),
                Ok(_) => {}
                Err(e) => warn!("Failed to adjust {:?} after {} toggle: {}", counter, kind.as_str(), e),
            }
        }

        Ok(ToggleOutcome { kind, active, count })
    }

    pub async fn toggle_follow(&self, follower: UserId, followee: UserId) -> AppResult<ToggleOutcome> {
        self.toggle(follower, EdgeKind::Follow, followee).await
    }

    pub async fn toggle_like(&self, user_id: UserId, video_id: Uuid) -> AppResult<ToggleOutcome> {
        self.toggle(user_id, EdgeKind::Like, video_id).await
    }

    pub async fn toggle_save(&self, user_id: UserId, video_id: Uuid) -> AppResult<ToggleOutcome> {
        self.toggle(user_id, EdgeKind::Save, video_id).await
    }

    pub async fn toggle_playlist_follow(&self, user_id: UserId, playlist_id: Uuid) -> AppResult<ToggleOutcome> {
        self.toggle(user_id, EdgeKind::PlaylistFollow, playlist_id).await
    }

    async fn validate_target(&self, subject: UserId, kind: EdgeKind, object: Uuid) -> AppResult<()> {
        match kind {
            EdgeKind::Follow => {
                if subject == object {
                    return Err(AppError::Validation("You cannot follow yourself".into()));
                }
                if self.store.get_user(object).await?.is_none() {
                    return Err(AppError::NotFound(format!("User {} not found", object)));
                }
            }
            EdgeKind::Like | EdgeKind::Save => {
                let visible = self
                    .store
                    .get_video(object)
                    .await?
                    .is_some_and(|video| video.visible_to(Some(subject)));
                if !visible {
                    return Err(AppError::NotFound(format!("Video {} not found", object)));
                }
            }
            EdgeKind::PlaylistFollow => {
                let playlist = self
                    .store
                    .get_playlist(object)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Playlist {} not found", object)))?;
                if playlist.user_id == subject {
                    return Err(AppError::Validation("You cannot follow your own playlist".into()));
                }
            }
        }
        Ok(())
    }
}

/// Counters touched by a toggle; the first is the one reported back.
fn counters_for(kind: EdgeKind, subject: Uuid, object: Uuid) -> Vec<Counter> {
    match kind {
        EdgeKind::Follow => vec![Counter::UserFollowers(object), Counter::UserFollowing(subject)],
        EdgeKind::Like => vec![Counter::VideoLikes(object)],
        EdgeKind::Save => vec![],
        EdgeKind::PlaylistFollow => vec![Counter::PlaylistFollowers(object)],
    }
}
