#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use fitstream::infrastructure::database::{DataStore, PlaylistQuery, VideoQuery};
use fitstream::infrastructure::sqlite_database::SqliteStore;
use fitstream::models::{
    Comment, CommentId, Counter, Edge, EdgeKind, NewPlaylist, NewUser, NewVideo, Playlist,
    PlaylistEntry, PlaylistId, ProfileUpdate, SavedVideoRow, Session, User, UserId, Video,
    VideoId,
};
use fitstream::{AppError, AppResult};

/// SQLite store that counts the reads tests care about and can be told
/// to fail selected operations.
pub struct CountingStore {
    inner: SqliteStore,
    pub video_queries: AtomicUsize,
    pub user_searches: AtomicUsize,
    pub fail_edge_reads: AtomicBool,
    pub fail_edge_writes: AtomicBool,
    pub fail_video_writes: AtomicBool,
}

impl CountingStore {
    pub async fn new() -> Arc<Self> {
        let inner = SqliteStore::new_in_memory().await.expect("in-memory store");
        Arc::new(Self {
            inner,
            video_queries: AtomicUsize::new(0),
            user_searches: AtomicUsize::new(0),
            fail_edge_reads: AtomicBool::new(false),
            fail_edge_writes: AtomicBool::new(false),
            fail_video_writes: AtomicBool::new(false),
        })
    }

    /// Make `outgoing_edges` return a database error.
    pub fn break_edge_reads(&self) {
        self.fail_edge_reads.store(true, Ordering::SeqCst);
    }

    /// Make `insert_edge` and `delete_edge` return a database error.
    pub fn break_edge_writes(&self) {
        self.fail_edge_writes.store(true, Ordering::SeqCst);
    }

    /// Make `create_video` return a database error.
    pub fn break_video_writes(&self) {
        self.fail_video_writes.store(true, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, op: &str) -> AppResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(format!("{} unavailable", op)));
        }
        Ok(())
    }

    pub fn video_query_count(&self) -> usize {
        self.video_queries.load(Ordering::SeqCst)
    }

    pub fn user_search_count(&self) -> usize {
        self.user_searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataStore for CountingStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        self.inner.create_user(user).await
    }
    async fn get_user(&self, id: UserId) -> AppResult<Option<User>> {
        self.inner.get_user(id).await
    }
    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.inner.get_user_by_username(username).await
    }
    async fn get_credentials(&self, email: &str) -> AppResult<Option<(User, String)>> {
        self.inner.get_credentials(email).await
    }
    async fn get_users(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        self.inner.get_users(ids).await
    }
    async fn search_users(&self, text: &str, limit: u32) -> AppResult<Vec<User>> {
        self.user_searches.fetch_add(1, Ordering::SeqCst);
        self.inner.search_users(text, limit).await
    }
    async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> AppResult<User> {
        self.inner.update_profile(id, update).await
    }

    async fn create_video(&self, video: NewVideo) -> AppResult<Video> {
        Self::check(&self.fail_video_writes, "create_video")?;
        self.inner.create_video(video).await
    }
    async fn get_video(&self, id: VideoId) -> AppResult<Option<Video>> {
        self.inner.get_video(id).await
    }
    async fn find_videos(&self, query: &VideoQuery) -> AppResult<Vec<Video>> {
        self.video_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.find_videos(query).await
    }

    async fn edge_exists(&self, subject: Uuid, kind: EdgeKind, object: Uuid) -> AppResult<bool> {
        self.inner.edge_exists(subject, kind, object).await
    }
    async fn insert_edge(&self, subject: Uuid, kind: EdgeKind, object: Uuid) -> AppResult<Edge> {
        Self::check(&self.fail_edge_writes, "insert_edge")?;
        self.inner.insert_edge(subject, kind, object).await
    }
    async fn delete_edge(&self, subject: Uuid, kind: EdgeKind, object: Uuid) -> AppResult<bool> {
        Self::check(&self.fail_edge_writes, "delete_edge")?;
        self.inner.delete_edge(subject, kind, object).await
    }
    async fn outgoing_edges(&self, subject: Uuid, kind: EdgeKind, limit: Option<u32>) -> AppResult<Vec<Edge>> {
        Self::check(&self.fail_edge_reads, "outgoing_edges")?;
        self.inner.outgoing_edges(subject, kind, limit).await
    }
    async fn incoming_edges(&self, object: Uuid, kind: EdgeKind, limit: Option<u32>) -> AppResult<Vec<Edge>> {
        self.inner.incoming_edges(object, kind, limit).await
    }
    async fn saved_videos(&self, user_id: UserId, limit: Option<u32>) -> AppResult<Vec<SavedVideoRow>> {
        self.inner.saved_videos(user_id, limit).await
    }

    async fn adjust_counter(&self, counter: Counter, delta: i64) -> AppResult<i64> {
        self.inner.adjust_counter(counter, delta).await
    }

    async fn create_playlist(&self, playlist: NewPlaylist) -> AppResult<Playlist> {
        self.inner.create_playlist(playlist).await
    }
    async fn get_playlist(&self, id: PlaylistId) -> AppResult<Option<Playlist>> {
        self.inner.get_playlist(id).await
    }
    async fn find_playlists(&self, query: &PlaylistQuery) -> AppResult<Vec<Playlist>> {
        self.inner.find_playlists(query).await
    }
    async fn delete_playlist(&self, id: PlaylistId) -> AppResult<bool> {
        self.inner.delete_playlist(id).await
    }
    async fn touch_playlist(&self, id: PlaylistId) -> AppResult<()> {
        self.inner.touch_playlist(id).await
    }

    async fn playlist_entries(&self, playlist_id: PlaylistId) -> AppResult<Vec<PlaylistEntry>> {
        self.inner.playlist_entries(playlist_id).await
    }
    async fn get_entry(&self, playlist_id: PlaylistId, video_id: VideoId) -> AppResult<Option<PlaylistEntry>> {
        self.inner.get_entry(playlist_id, video_id).await
    }
    async fn max_position(&self, playlist_id: PlaylistId) -> AppResult<Option<i64>> {
        self.inner.max_position(playlist_id).await
    }
    async fn insert_entry(&self, playlist_id: PlaylistId, video_id: VideoId, position: i64) -> AppResult<PlaylistEntry> {
        self.inner.insert_entry(playlist_id, video_id, position).await
    }
    async fn delete_entry(&self, playlist_id: PlaylistId, video_id: VideoId) -> AppResult<bool> {
        self.inner.delete_entry(playlist_id, video_id).await
    }
    async fn playlists_containing(&self, video_id: VideoId, playlist_ids: &[PlaylistId]) -> AppResult<Vec<PlaylistId>> {
        self.inner.playlists_containing(video_id, playlist_ids).await
    }

    async fn insert_comment(
        &self,
        video_id: VideoId,
        user_id: UserId,
        content: &str,
        parent_comment_id: Option<CommentId>,
    ) -> AppResult<Comment> {
        self.inner.insert_comment(video_id, user_id, content, parent_comment_id).await
    }
    async fn comments_for_video(&self, video_id: VideoId) -> AppResult<Vec<Comment>> {
        self.inner.comments_for_video(video_id).await
    }

    async fn create_session(&self, user_id: UserId, ttl_millis: i64) -> AppResult<Session> {
        self.inner.create_session(user_id, ttl_millis).await
    }
    async fn get_session(&self, token: Uuid) -> AppResult<Option<Session>> {
        self.inner.get_session(token).await
    }
    async fn delete_session(&self, token: Uuid) -> AppResult<bool> {
        self.inner.delete_session(token).await
    }
}

pub async fn user(store: &dyn DataStore, username: &str) -> User {
    store
        .create_user(NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            display_name: username.to_string(),
            password_hash: "not-a-real-hash".to_string(),
        })
        .await
        .expect("create user")
}

pub async fn video(store: &dyn DataStore, owner: &User, title: &str, main: &str, sub: &str) -> Video {
    store
        .create_video(NewVideo {
            user_id: owner.id,
            title: title.to_string(),
            description: None,
            video_url: format!("http://localhost/media/{}.mp4", Uuid::new_v4()),
            thumbnail_url: None,
            duration: 60,
            main_category: main.to_string(),
            sub_category: sub.to_string(),
            tags: vec![],
            is_public: true,
        })
        .await
        .expect("create video")
}

pub async fn private_video(store: &dyn DataStore, owner: &User, title: &str) -> Video {
    store
        .create_video(NewVideo {
            user_id: owner.id,
            title: title.to_string(),
            description: None,
            video_url: "http://localhost/media/private.mp4".to_string(),
            thumbnail_url: None,
            duration: 30,
            main_category: "yoga_pilates".to_string(),
            sub_category: "vinyasa_yoga".to_string(),
            tags: vec![],
            is_public: false,
        })
        .await
        .expect("create private video")
}
