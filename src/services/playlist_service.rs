// Playlists - creation, ordered membership and discovery

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::database::{DataStore, PlaylistOrder, PlaylistQuery, VideoFilter, VideoQuery};
use crate::models::{
    Counter, EdgeKind, NewPlaylist, Playlist, PlaylistId, Timestamp, UserId, UserSummary, Video,
    VideoId,
};
use crate::services::{with_usernames, VideoCard};

pub const POPULAR_PLAYLIST_LIMIT: u32 = 20;

fn default_public() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylistRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "default_public")]
    pub is_public: bool,
    /// Video to seed the playlist with at position 1
    pub video_id: Option<VideoId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipOutcome {
    pub playlist_id: PlaylistId,
    pub video_id: VideoId,
    pub member: bool,
    pub position: Option<i64>,
    pub video_count: i64,
}

/// One of the viewer's playlists, as offered when adding a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistOption {
    pub id: PlaylistId,
    pub title: String,
    pub video_count: i64,
    pub is_public: bool,
    pub already_added: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistItem {
    pub position: i64,
    pub added_at: Timestamp,
    pub video: VideoCard,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistDetail {
    pub playlist: Playlist,
    pub owner: Option<UserSummary>,
    pub items: Vec<PlaylistItem>,
    pub is_owner: bool,
    pub is_following: bool,
}

#[derive(Clone)]
pub struct PlaylistService {
    store: Arc<dyn DataStore>,
}

impl PlaylistService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, owner: UserId, request: CreatePlaylistRequest) -> AppResult<Playlist> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Playlist title is required".into()));
        }
        let description = request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let playlist = self
            .store
            .create_playlist(NewPlaylist {
                user_id: owner,
                title: title.to_string(),
                description,
                is_public: request.is_public,
            })
            .await?;
        info!("Created playlist {} for {}", playlist.id, owner);

        if let Some(video_id) = request.video_id {
            // The playlist exists either way; a failed seed is only logged
            match self.add_video(&playlist, video_id).await {
                Ok(_) => {}
                Err(e) => error!("Error adding video {} to new playlist {}: {}", video_id, playlist.id, e),
            }
            if let Some(refreshed) = self.store.get_playlist(playlist.id).await? {
                return Ok(refreshed);
            }
        }
        Ok(playlist)
    }

    /// Add the video if absent, remove it if present.
    pub async fn toggle_video(
        &self,
        viewer: UserId,
        playlist_id: PlaylistId,
        video_id: VideoId,
    ) -> AppResult<MembershipOutcome> {
        let playlist = self.owned_playlist(viewer, playlist_id).await?;
        if self.store.get_entry(playlist_id, video_id).await?.is_some() {
            self.remove_video(&playlist, video_id).await
        } else {
            self.add_video(&playlist, video_id).await
        }
    }

    /// Append at max position + 1 (1 for an empty playlist).
    async fn add_video(&self, playlist: &Playlist, video_id: VideoId) -> AppResult<MembershipOutcome> {
        let video = self
            .store
            .get_video(video_id)
            .await?
            .filter(|v| v.visible_to(Some(playlist.user_id)))
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

        let position = self
            .store
            .max_position(playlist.id)
            .await?
            .map_or(1, |max| max + 1);
        self.store.insert_entry(playlist.id, video_id, position).await?;

        let video_count = self
            .adjust(Counter::PlaylistVideos(playlist.id), 1)
            .await
            .unwrap_or(playlist.video_count + 1);
        self.adjust(Counter::PlaylistDuration(playlist.id), video.duration).await;
        self.touch(playlist.id).await;

        Ok(MembershipOutcome {
            playlist_id: playlist.id,
            video_id,
            member: true,
            position: Some(position),
            video_count,
        })
    }

    /// Remove without renumbering the remaining positions.
    async fn remove_video(&self, playlist: &Playlist, video_id: VideoId) -> AppResult<MembershipOutcome> {
        let removed = self.store.delete_entry(playlist.id, video_id).await?;
        if !removed {
            return Ok(MembershipOutcome {
                playlist_id: playlist.id,
                video_id,
                member: false,
                position: None,
                video_count: playlist.video_count,
            });
        }

        let video_count = self
            .adjust(Counter::PlaylistVideos(playlist.id), -1)
            .await
            .unwrap_or((playlist.video_count - 1).max(0));
        if let Some(video) = self.store.get_video(video_id).await? {
            self.adjust(Counter::PlaylistDuration(playlist.id), -video.duration).await;
        }
        self.touch(playlist.id).await;

        Ok(MembershipOutcome {
            playlist_id: playlist.id,
            video_id,
            member: false,
            position: None,
            video_count,
        })
    }

    /// The viewer's playlists, most recently updated first, flagged with
    /// whether they already contain `video_id`.
    pub async fn memberships(&self, viewer: UserId, video_id: VideoId) -> AppResult<Vec<PlaylistOption>> {
        let playlists = self.mine(viewer).await?;
        let ids: Vec<PlaylistId> = playlists.iter().map(|p| p.id).collect();
        let containing = self.store.playlists_containing(video_id, &ids).await?;

        Ok(playlists
            .into_iter()
            .map(|p| PlaylistOption {
                already_added: containing.contains(&p.id),
                id: p.id,
                title: p.title,
                video_count: p.video_count,
                is_public: p.is_public,
            })
            .collect())
    }

    pub async fn detail(&self, viewer: Option<UserId>, playlist_id: PlaylistId) -> AppResult<PlaylistDetail> {
        let playlist = self
            .store
            .get_playlist(playlist_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Playlist {} not found", playlist_id)))?;

        let is_owner = viewer == Some(playlist.user_id);
        if !playlist.is_public && !is_owner {
            return Err(AppError::NotFound(format!("Playlist {} not found", playlist_id)));
        }

        let entries = self.store.playlist_entries(playlist_id).await?;
        let video_ids: Vec<VideoId> = entries.iter().map(|e| e.video_id).collect();
        let videos = if video_ids.is_empty() {
            Vec::new()
        } else {
            self.store
                .find_videos(&VideoQuery::new().filter(VideoFilter::IdIn(video_ids)))
                .await?
        };
        let visible: Vec<Video> = videos
            .into_iter()
            .filter(|v| v.visible_to(viewer))
            .collect();
        let mut cards: HashMap<VideoId, VideoCard> = with_usernames(self.store.as_ref(), visible)
            .await?
            .into_iter()
            .map(|card| (card.id, card))
            .collect();

        let items = entries
            .into_iter()
            .filter_map(|entry| {
                cards.remove(&entry.video_id).map(|video| PlaylistItem {
                    position: entry.position,
                    added_at: entry.added_at,
                    video,
                })
            })
            .collect();

        let owner = self.store.get_user(playlist.user_id).await?.as_ref().map(UserSummary::from);
        let is_following = match viewer {
            Some(viewer) if !is_owner => {
                self.store
                    .edge_exists(viewer, EdgeKind::PlaylistFollow, playlist_id)
                    .await?
            }
            _ => false,
        };

        Ok(PlaylistDetail {
            playlist,
            owner,
            items,
            is_owner,
            is_following,
        })
    }

    pub async fn delete(&self, viewer: UserId, playlist_id: PlaylistId) -> AppResult<()> {
        self.owned_playlist(viewer, playlist_id).await?;
        self.store.delete_playlist(playlist_id).await?;
        info!("Deleted playlist {}", playlist_id);
        Ok(())
    }

    pub async fn mine(&self, viewer: UserId) -> AppResult<Vec<Playlist>> {
        self.store
            .find_playlists(&PlaylistQuery {
                owner: Some(viewer),
                order: PlaylistOrder::RecentlyUpdated,
                ..Default::default()
            })
            .await
    }

    /// Public playlists owned by users the viewer follows.
    pub async fn from_followed(&self, viewer: UserId) -> AppResult<Vec<Playlist>> {
        let followee_ids: Vec<UserId> = self
            .store
            .outgoing_edges(viewer, EdgeKind::Follow, None)
            .await?
            .into_iter()
            .map(|edge| edge.object)
            .collect();
        if followee_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.store
            .find_playlists(&PlaylistQuery {
                owners_in: Some(followee_ids),
                public_only: true,
                order: PlaylistOrder::RecentlyUpdated,
                ..Default::default()
            })
            .await
    }

    pub async fn popular(&self) -> AppResult<Vec<Playlist>> {
        self.store
            .find_playlists(&PlaylistQuery {
                public_only: true,
                order: PlaylistOrder::MostFollowed,
                limit: Some(POPULAR_PLAYLIST_LIMIT),
                ..Default::default()
            })
            .await
    }

    async fn owned_playlist(&self, viewer: UserId, playlist_id: PlaylistId) -> AppResult<Playlist> {
        let playlist = self
            .store
            .get_playlist(playlist_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Playlist {} not found", playlist_id)))?;
        if playlist.user_id != viewer {
            return Err(AppError::Forbidden("You do not own this playlist".into()));
        }
        Ok(playlist)
    }

    async fn adjust(&self, counter: Counter, delta: i64) -> Option<i64> {
        match self.store.adjust_counter(counter, delta).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to adjust {:?}: {}", counter, e);
                None
            }
        }
    }

    async fn touch(&self, playlist_id: PlaylistId) {
        if let Err(e) = self.store.touch_playlist(playlist_id).await {
            warn!("Failed to touch playlist {}: {}", playlist_id, e);
        }
    }
}
