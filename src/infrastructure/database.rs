// Data store interface - the relational collections the application reads and writes.
// Services only see this trait; concrete stores translate it into SQL.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    Comment, CommentId, Counter, Edge, EdgeKind, NewPlaylist, NewUser, NewVideo, Playlist,
    PlaylistEntry, PlaylistId, ProfileUpdate, SavedVideoRow, Session, User, UserId, Video,
    VideoId,
};

/// One clause of a video read. Clauses are AND-ed together.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoFilter {
    PublicOnly,
    /// Case-insensitive substring on title OR description
    TextMatch(String),
    /// Case-insensitive substring on title only
    TitleMatch(String),
    MainCategory(String),
    SubCategory(String),
    MainCategoryIn(Vec<String>),
    IdIn(Vec<VideoId>),
    AuthorIs(UserId),
    AuthorIn(Vec<UserId>),
    AuthorNot(UserId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoOrder {
    #[default]
    Newest,
    MostViewed,
    MostLiked,
}

/// A parameterized read against the video collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VideoQuery {
    pub filters: Vec<VideoFilter>,
    pub order: VideoOrder,
    pub limit: Option<u32>,
}

impl VideoQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: VideoFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, order: VideoOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn has_filter(&self, pred: impl Fn(&VideoFilter) -> bool) -> bool {
        self.filters.iter().any(pred)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaylistOrder {
    #[default]
    RecentlyUpdated,
    MostFollowed,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaylistQuery {
    pub owner: Option<UserId>,
    pub owners_in: Option<Vec<UserId>>,
    pub public_only: bool,
    pub order: PlaylistOrder,
    pub limit: Option<u32>,
}

/// Data store interface for all application collections
#[async_trait]
pub trait DataStore: Send + Sync {
    // User operations
    async fn create_user(&self, user: NewUser) -> AppResult<User>;
    async fn get_user(&self, id: UserId) -> AppResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
    /// Returns the user and its stored password hash.
    async fn get_credentials(&self, email: &str) -> AppResult<Option<(User, String)>>;
    async fn get_users(&self, ids: &[UserId]) -> AppResult<Vec<User>>;
    async fn search_users(&self, text: &str, limit: u32) -> AppResult<Vec<User>>;
    async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> AppResult<User>;

    // Video operations
    async fn create_video(&self, video: NewVideo) -> AppResult<Video>;
    async fn get_video(&self, id: VideoId) -> AppResult<Option<Video>>;
    async fn find_videos(&self, query: &VideoQuery) -> AppResult<Vec<Video>>;

    // Edge operations - follow/like/save/playlist_follow join rows
    async fn edge_exists(&self, subject: Uuid, kind: EdgeKind, object: Uuid) -> AppResult<bool>;
    async fn insert_edge(&self, subject: Uuid, kind: EdgeKind, object: Uuid) -> AppResult<Edge>;
    async fn delete_edge(&self, subject: Uuid, kind: EdgeKind, object: Uuid) -> AppResult<bool>;
    /// Edges leaving `subject`, newest first.
    async fn outgoing_edges(
        &self,
        subject: Uuid,
        kind: EdgeKind,
        limit: Option<u32>,
    ) -> AppResult<Vec<Edge>>;
    /// Edges arriving at `object`, newest first.
    async fn incoming_edges(
        &self,
        object: Uuid,
        kind: EdgeKind,
        limit: Option<u32>,
    ) -> AppResult<Vec<Edge>>;
    /// Save edges of `user_id` joined to their videos, newest save first.
    async fn saved_videos(&self, user_id: UserId, limit: Option<u32>)
        -> AppResult<Vec<SavedVideoRow>>;

    /// Add `delta` to a denormalized counter, clamped at zero. Returns the new value.
    async fn adjust_counter(&self, counter: Counter, delta: i64) -> AppResult<i64>;

    // Playlist operations
    async fn create_playlist(&self, playlist: NewPlaylist) -> AppResult<Playlist>;
    async fn get_playlist(&self, id: PlaylistId) -> AppResult<Option<Playlist>>;
    async fn find_playlists(&self, query: &PlaylistQuery) -> AppResult<Vec<Playlist>>;
    async fn delete_playlist(&self, id: PlaylistId) -> AppResult<bool>;
    async fn touch_playlist(&self, id: PlaylistId) -> AppResult<()>;

    // Playlist membership operations
    /// Entries ordered by position ascending.
    async fn playlist_entries(&self, playlist_id: PlaylistId) -> AppResult<Vec<PlaylistEntry>>;
    async fn get_entry(
        &self,
        playlist_id: PlaylistId,
        video_id: VideoId,
    ) -> AppResult<Option<PlaylistEntry>>;
    async fn max_position(&self, playlist_id: PlaylistId) -> AppResult<Option<i64>>;
    async fn insert_entry(
        &self,
        playlist_id: PlaylistId,
        video_id: VideoId,
        position: i64,
    ) -> AppResult<PlaylistEntry>;
    async fn delete_entry(&self, playlist_id: PlaylistId, video_id: VideoId) -> AppResult<bool>;
    /// Subset of `playlist_ids` that already contain `video_id`.
    async fn playlists_containing(
        &self,
        video_id: VideoId,
        playlist_ids: &[PlaylistId],
    ) -> AppResult<Vec<PlaylistId>>;

    // Comment operations
    async fn insert_comment(
        &self,
        video_id: VideoId,
        user_id: UserId,
        content: &str,
        parent_comment_id: Option<CommentId>,
    ) -> AppResult<Comment>;
    /// Comments newest first.
    async fn comments_for_video(&self, video_id: VideoId) -> AppResult<Vec<Comment>>;

    // Session operations
    async fn create_session(&self, user_id: UserId, ttl_millis: i64) -> AppResult<Session>;
    async fn get_session(&self, token: Uuid) -> AppResult<Option<Session>>;
    async fn delete_session(&self, token: Uuid) -> AppResult<bool>;
}
