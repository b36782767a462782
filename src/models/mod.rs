// Domain records held in the data store

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;
pub type VideoId = Uuid;
pub type PlaylistId = Uuid;
pub type CommentId = Uuid;

/// Milliseconds since the Unix epoch
pub type Timestamp = i64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub videos_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Public view of a user, without the email address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub followers_count: i64,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            avatar_url: user.avatar_url.clone(),
            bio: user.bio.clone(),
            followers_count: user.followers_count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub id: VideoId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub duration: i64,
    pub main_category: String,
    pub sub_category: String,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub views: i64,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Video {
    /// Private videos are visible to their uploader only.
    pub fn visible_to(&self, viewer: Option<UserId>) -> bool {
        self.is_public || viewer == Some(self.user_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewVideo {
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub duration: i64,
    pub main_category: String,
    pub sub_category: String,
    pub tags: Vec<String>,
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Playlist {
    pub id: PlaylistId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub video_count: i64,
    pub total_duration: i64,
    pub followers_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewPlaylist {
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistEntry {
    pub playlist_id: PlaylistId,
    pub video_id: VideoId,
    pub position: i64,
    pub added_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub video_id: VideoId,
    pub user_id: UserId,
    pub content: String,
    pub parent_comment_id: Option<CommentId>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: Uuid,
    pub user_id: UserId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

/// Join-row relation kinds. Each is unique per (subject, kind, object).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// user -> user
    Follow,
    /// user -> video
    Like,
    /// user -> video
    Save,
    /// user -> playlist
    PlaylistFollow,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Follow => "follow",
            EdgeKind::Like => "like",
            EdgeKind::Save => "save",
            EdgeKind::PlaylistFollow => "playlist_follow",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub subject: Uuid,
    pub kind: EdgeKind,
    pub object: Uuid,
    pub created_at: Timestamp,
}

/// A save edge joined to its video. `video` is `None` when the
/// referenced video row no longer exists or is now private to someone else.
#[derive(Debug, Clone)]
pub struct SavedVideoRow {
    pub saved_at: Timestamp,
    pub video_id: VideoId,
    pub video: Option<Video>,
}

/// Denormalized counter columns that are adjusted by delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    UserFollowers(UserId),
    UserFollowing(UserId),
    UserVideos(UserId),
    VideoViews(VideoId),
    VideoLikes(VideoId),
    VideoComments(VideoId),
    PlaylistVideos(PlaylistId),
    PlaylistDuration(PlaylistId),
    PlaylistFollowers(PlaylistId),
}

impl Counter {
    /// (table, column, row id)
    pub fn target(&self) -> (&'static str, &'static str, Uuid) {
        match *self {
            Counter::UserFollowers(id) => ("users", "followers_count", id),
            Counter::UserFollowing(id) => ("users", "following_count", id),
            Counter::UserVideos(id) => ("users", "videos_count", id),
            Counter::VideoViews(id) => ("videos", "views", id),
            Counter::VideoLikes(id) => ("videos", "likes_count", id),
            Counter::VideoComments(id) => ("videos", "comments_count", id),
            Counter::PlaylistVideos(id) => ("playlists", "video_count", id),
            Counter::PlaylistDuration(id) => ("playlists", "total_duration", id),
            Counter::PlaylistFollowers(id) => ("playlists", "followers_count", id),
        }
    }
}

pub fn current_time_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}
