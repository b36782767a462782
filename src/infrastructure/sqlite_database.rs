use async_trait::async_trait;
use sqlx::{
    sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    QueryBuilder, Row,
};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::infrastructure::database::{
    DataStore, PlaylistOrder, PlaylistQuery, VideoFilter, VideoOrder, VideoQuery,
};
use crate::models::{
    current_time_millis, Comment, CommentId, Counter, Edge, EdgeKind, NewPlaylist, NewUser,
    NewVideo, Playlist, PlaylistEntry, PlaylistId, ProfileUpdate, SavedVideoRow, Session, User,
    UserId, Video, VideoId,
};

const USER_COLUMNS: &str = "id, username, email, display_name, bio, avatar_url, \
    followers_count, following_count, videos_count, created_at, updated_at";

const VIDEO_COLUMNS: &str = "id, user_id, title, description, video_url, thumbnail_url, \
    duration, main_category, sub_category, tags, is_public, views, likes_count, \
    comments_count, created_at, updated_at";

const PLAYLIST_COLUMNS: &str = "id, user_id, title, description, is_public, video_count, \
    total_duration, followers_count, created_at, updated_at";

/// SQLite implementation of the data store
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to `url` and create the schema if needed.
    /// In-memory databases are pinned to a single connection so every
    /// caller sees the same data.
    pub async fn connect(url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::ConfigurationError(format!("Invalid database URL {}: {}", url, e)))?
            .create_if_missing(true);

        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to connect to {}: {}", url, e))
        })?;

        let store = Self { pool };
        store.initialize().await?;
        info!("Connected to SQLite store at {}", url);
        Ok(store)
    }

    pub async fn new_in_memory() -> AppResult<Self> {
        Self::connect("sqlite::memory:").await
    }

    /// Create tables and indexes
    pub async fn initialize(&self) -> AppResult<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BLOB PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                display_name TEXT NOT NULL,
                username_folded TEXT NOT NULL DEFAULT '',
                display_name_folded TEXT NOT NULL DEFAULT '',
                bio TEXT,
                avatar_url TEXT,
                password_hash TEXT NOT NULL,
                followers_count INTEGER NOT NULL DEFAULT 0,
                following_count INTEGER NOT NULL DEFAULT 0,
                videos_count INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS videos (
                id BLOB PRIMARY KEY,
                user_id BLOB NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                title_folded TEXT NOT NULL DEFAULT '',
                description_folded TEXT NOT NULL DEFAULT '',
                video_url TEXT NOT NULL,
                thumbnail_url TEXT,
                duration INTEGER NOT NULL DEFAULT 0,
                main_category TEXT NOT NULL,
                sub_category TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                is_public INTEGER NOT NULL DEFAULT 1,
                views INTEGER NOT NULL DEFAULT 0,
                likes_count INTEGER NOT NULL DEFAULT 0,
                comments_count INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS edges (
                subject BLOB NOT NULL,
                kind TEXT NOT NULL,
                object BLOB NOT NULL,
                created_at INTEGER NOT NULL,
                PRIMARY KEY (subject, kind, object)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS playlists (
                id BLOB PRIMARY KEY,
                user_id BLOB NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                is_public INTEGER NOT NULL DEFAULT 1,
                video_count INTEGER NOT NULL DEFAULT 0,
                total_duration INTEGER NOT NULL DEFAULT 0,
                followers_count INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS playlist_videos (
                playlist_id BLOB NOT NULL,
                video_id BLOB NOT NULL,
                position INTEGER NOT NULL,
                added_at INTEGER NOT NULL,
                PRIMARY KEY (playlist_id, video_id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id BLOB PRIMARY KEY,
                video_id BLOB NOT NULL,
                user_id BLOB NOT NULL,
                content TEXT NOT NULL,
                parent_comment_id BLOB,
                created_at INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                token BLOB PRIMARY KEY,
                user_id BLOB NOT NULL,
                created_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_videos_public_created ON videos(is_public, created_at DESC)",
            "CREATE INDEX IF NOT EXISTS idx_videos_user ON videos(user_id)",
            "CREATE INDEX IF NOT EXISTS idx_edges_object ON edges(object, kind, created_at DESC)",
            "CREATE INDEX IF NOT EXISTS idx_playlists_user ON playlists(user_id, updated_at DESC)",
            "CREATE INDEX IF NOT EXISTS idx_comments_video ON comments(video_id, created_at DESC)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to initialize schema: {}", e)))?;
        }
        Ok(())
    }
}

fn db_error(context: &str, e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Conflict(format!("{}: already exists", context));
        }
    }
    AppError::DatabaseError(format!("{}: {}", context, e))
}

/// Unicode lowercase for the `*_folded` columns. SQLite's LIKE folds ASCII only.
fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Fold and escape LIKE wildcards so user text matches literally.
fn like_pattern(text: &str) -> String {
    let escaped = fold(text)
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn map_user(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        bio: row.get("bio"),
        avatar_url: row.get("avatar_url"),
        followers_count: row.get("followers_count"),
        following_count: row.get("following_count"),
        videos_count: row.get("videos_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn map_video(row: &SqliteRow) -> Video {
    let tags: String = row.get("tags");
    Video {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        video_url: row.get("video_url"),
        thumbnail_url: row.get("thumbnail_url"),
        duration: row.get("duration"),
        main_category: row.get("main_category"),
        sub_category: row.get("sub_category"),
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        is_public: row.get("is_public"),
        views: row.get("views"),
        likes_count: row.get("likes_count"),
        comments_count: row.get("comments_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn map_playlist(row: &SqliteRow) -> Playlist {
    Playlist {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        is_public: row.get("is_public"),
        video_count: row.get("video_count"),
        total_duration: row.get("total_duration"),
        followers_count: row.get("followers_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn map_entry(row: &SqliteRow) -> PlaylistEntry {
    PlaylistEntry {
        playlist_id: row.get("playlist_id"),
        video_id: row.get("video_id"),
        position: row.get("position"),
        added_at: row.get("added_at"),
    }
}

fn map_edge(row: &SqliteRow, kind: EdgeKind) -> Edge {
    Edge {
        subject: row.get("subject"),
        kind,
        object: row.get("object"),
        created_at: row.get("created_at"),
    }
}

fn map_comment(row: &SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        video_id: row.get("video_id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        parent_comment_id: row.get("parent_comment_id"),
        created_at: row.get("created_at"),
    }
}

fn push_uuid_list(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, ids: &[Uuid]) {
    if ids.is_empty() {
        // Empty membership never matches
        qb.push(" AND 0");
        return;
    }
    qb.push(format!(" AND {} IN (", column));
    let mut separated = qb.separated(",");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

#[async_trait]
impl DataStore for SqliteStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let id = Uuid::new_v4();
        let now = current_time_millis();
        sqlx::query(
            "INSERT INTO users (id, username, email, display_name, username_folded, display_name_folded, \
             password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(fold(&user.username))
        .bind(fold(&user.display_name))
        .bind(&user.password_hash)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create user", e))?;

        Ok(User {
            id,
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            bio: None,
            avatar_url: None,
            followers_count: 0,
            following_count: 0,
            videos_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(&format!("Failed to get user {}", id), e))?;
        Ok(row.as_ref().map(map_user))
    }

    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(&format!("Failed to get user {}", username), e))?;
        Ok(row.as_ref().map(map_user))
    }

    async fn get_credentials(&self, email: &str) -> AppResult<Option<(User, String)>> {
        let row = sqlx::query(&format!(
            "SELECT {}, password_hash FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load credentials", e))?;
        Ok(row.map(|row| (map_user(&row), row.get("password_hash"))))
    }

    async fn get_users(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM users WHERE 1 = 1", USER_COLUMNS));
        push_uuid_list(&mut qb, "id", ids);

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to get users", e))?;
        Ok(rows.iter().map(map_user).collect())
    }

    async fn search_users(&self, text: &str, limit: u32) -> AppResult<Vec<User>> {
        let pattern = like_pattern(text);
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users \
             WHERE username_folded LIKE ? ESCAPE '\\' OR display_name_folded LIKE ? ESCAPE '\\' \
             ORDER BY followers_count DESC, username ASC LIMIT ?",
            USER_COLUMNS
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to search users", e))?;
        Ok(rows.iter().map(map_user).collect())
    }

    async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> AppResult<User> {
        let display_name_folded = update.display_name.as_deref().map(fold);
        let result = sqlx::query(
            "UPDATE users SET display_name = COALESCE(?, display_name), \
             display_name_folded = COALESCE(?, display_name_folded), bio = COALESCE(?, bio), \
             avatar_url = COALESCE(?, avatar_url), updated_at = ? WHERE id = ?",
        )
        .bind(update.display_name)
        .bind(display_name_folded)
        .bind(update.bio)
        .bind(update.avatar_url)
        .bind(current_time_millis())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error(&format!("Failed to update user {}", id), e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        self.get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    async fn create_video(&self, video: NewVideo) -> AppResult<Video> {
        let id = Uuid::new_v4();
        let now = current_time_millis();
        let tags = serde_json::to_string(&video.tags)
            .map_err(|e| AppError::Internal(format!("Failed to encode tags: {}", e)))?;

        sqlx::query(
            "INSERT INTO videos (id, user_id, title, description, title_folded, description_folded, \
             video_url, thumbnail_url, duration, main_category, sub_category, tags, is_public, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(video.user_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(fold(&video.title))
        .bind(video.description.as_deref().map(fold).unwrap_or_default())
        .bind(&video.video_url)
        .bind(&video.thumbnail_url)
        .bind(video.duration)
        .bind(&video.main_category)
        .bind(&video.sub_category)
        .bind(tags)
        .bind(video.is_public)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create video", e))?;

        Ok(Video {
            id,
            user_id: video.user_id,
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            duration: video.duration,
            main_category: video.main_category,
            sub_category: video.sub_category,
            tags: video.tags,
            is_public: video.is_public,
            views: 0,
            likes_count: 0,
            comments_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_video(&self, id: VideoId) -> AppResult<Option<Video>> {
        let row = sqlx::query(&format!("SELECT {} FROM videos WHERE id = ?", VIDEO_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(&format!("Failed to get video {}", id), e))?;
        Ok(row.as_ref().map(map_video))
    }

    async fn find_videos(&self, query: &VideoQuery) -> AppResult<Vec<Video>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM videos WHERE 1 = 1", VIDEO_COLUMNS));

        for filter in &query.filters {
            match filter {
                VideoFilter::PublicOnly => {
                    qb.push(" AND is_public = 1");
                }
                VideoFilter::TextMatch(text) => {
                    let pattern = like_pattern(text);
                    qb.push(" AND (title_folded LIKE ");
                    qb.push_bind(pattern.clone());
                    qb.push(" ESCAPE '\\' OR description_folded LIKE ");
                    qb.push_bind(pattern);
                    qb.push(" ESCAPE '\\')");
                }
                VideoFilter::TitleMatch(text) => {
                    qb.push(" AND title_folded LIKE ");
                    qb.push_bind(like_pattern(text));
                    qb.push(" ESCAPE '\\'");
                }
                VideoFilter::MainCategory(category) => {
                    qb.push(" AND main_category = ");
                    qb.push_bind(category.clone());
                }
                VideoFilter::SubCategory(category) => {
                    qb.push(" AND sub_category = ");
                    qb.push_bind(category.clone());
                }
                VideoFilter::MainCategoryIn(categories) => {
                    if categories.is_empty() {
                        qb.push(" AND 0");
                    } else {
                        qb.push(" AND main_category IN (");
                        let mut separated = qb.separated(",");
                        for category in categories {
                            separated.push_bind(category.clone());
                        }
                        separated.push_unseparated(")");
                    }
                }
                VideoFilter::IdIn(video_ids) => {
                    push_uuid_list(&mut qb, "id", video_ids);
                }
                VideoFilter::AuthorIs(user_id) => {
                    qb.push(" AND user_id = ");
                    qb.push_bind(*user_id);
                }
                VideoFilter::AuthorIn(user_ids) => {
                    push_uuid_list(&mut qb, "user_id", user_ids);
                }
                VideoFilter::AuthorNot(user_id) => {
                    qb.push(" AND user_id != ");
                    qb.push_bind(*user_id);
                }
            }
        }

        qb.push(match query.order {
            VideoOrder::Newest => " ORDER BY created_at DESC, rowid DESC",
            VideoOrder::MostViewed => " ORDER BY views DESC, created_at DESC",
            VideoOrder::MostLiked => " ORDER BY likes_count DESC, created_at DESC",
        });

        if let Some(limit) = query.limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit as i64);
        }

        debug!("find_videos: {}", qb.sql());

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to query videos", e))?;
        Ok(rows.iter().map(map_video).collect())
    }

    async fn edge_exists(&self, subject: Uuid, kind: EdgeKind, object: Uuid) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM edges WHERE subject = ? AND kind = ? AND object = ?")
            .bind(subject)
            .bind(kind.as_str())
            .bind(object)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to check edge existence", e))?;
        Ok(row.is_some())
    }

    async fn insert_edge(&self, subject: Uuid, kind: EdgeKind, object: Uuid) -> AppResult<Edge> {
        let now = current_time_millis();
        sqlx::query("INSERT INTO edges (subject, kind, object, created_at) VALUES (?, ?, ?, ?)")
            .bind(subject)
            .bind(kind.as_str())
            .bind(object)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(&format!("Failed to create {} edge", kind.as_str()), e))?;

        Ok(Edge {
            subject,
            kind,
            object,
            created_at: now,
        })
    }

    async fn delete_edge(&self, subject: Uuid, kind: EdgeKind, object: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM edges WHERE subject = ? AND kind = ? AND object = ?")
            .bind(subject)
            .bind(kind.as_str())
            .bind(object)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(&format!("Failed to delete {} edge", kind.as_str()), e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn outgoing_edges(
        &self,
        subject: Uuid,
        kind: EdgeKind,
        limit: Option<u32>,
    ) -> AppResult<Vec<Edge>> {
        let rows = sqlx::query(
            "SELECT subject, object, created_at FROM edges WHERE subject = ? AND kind = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(subject)
        .bind(kind.as_str())
        .bind(limit.map_or(-1, |l| l as i64))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get outgoing edges", e))?;
        Ok(rows.iter().map(|row| map_edge(row, kind)).collect())
    }

    async fn incoming_edges(
        &self,
        object: Uuid,
        kind: EdgeKind,
        limit: Option<u32>,
    ) -> AppResult<Vec<Edge>> {
        let rows = sqlx::query(
            "SELECT subject, object, created_at FROM edges WHERE object = ? AND kind = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(object)
        .bind(kind.as_str())
        .bind(limit.map_or(-1, |l| l as i64))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get incoming edges", e))?;
        Ok(rows.iter().map(|row| map_edge(row, kind)).collect())
    }

    async fn saved_videos(
        &self,
        user_id: UserId,
        limit: Option<u32>,
    ) -> AppResult<Vec<SavedVideoRow>> {
        let columns = VIDEO_COLUMNS
            .split(", ")
            .map(|c| format!("v.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let rows = sqlx::query(&format!(
            "SELECT e.object AS saved_video_id, e.created_at AS saved_at, {} \
             FROM edges e LEFT JOIN videos v ON v.id = e.object \
             WHERE e.subject = ? AND e.kind = ? \
             ORDER BY e.created_at DESC, e.rowid DESC LIMIT ?",
            columns
        ))
        .bind(user_id)
        .bind(EdgeKind::Save.as_str())
        .bind(limit.map_or(-1, |l| l as i64))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get saved videos", e))?;

        Ok(rows
            .iter()
            .map(|row| {
                let joined: Option<Uuid> = row.get("id");
                SavedVideoRow {
                    saved_at: row.get("saved_at"),
                    video_id: row.get("saved_video_id"),
                    // Someone else's private video reads like a missing one
                    video: joined
                        .map(|_| map_video(row))
                        .filter(|video| video.visible_to(Some(user_id))),
                }
            })
            .collect())
    }

    async fn adjust_counter(&self, counter: Counter, delta: i64) -> AppResult<i64> {
        let (table, column, id) = counter.target();
        let row = sqlx::query(&format!(
            "UPDATE {table} SET {column} = MAX(0, {column} + ?) WHERE id = ? RETURNING {column}"
        ))
        .bind(delta)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(&format!("Failed to adjust {}.{}", table, column), e))?;

        row.map(|row| row.get::<i64, _>(0))
            .ok_or_else(|| AppError::NotFound(format!("{} row {} not found", table, id)))
    }

    async fn create_playlist(&self, playlist: NewPlaylist) -> AppResult<Playlist> {
        let id = Uuid::new_v4();
        let now = current_time_millis();
        sqlx::query(
            "INSERT INTO playlists (id, user_id, title, description, is_public, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(playlist.user_id)
        .bind(&playlist.title)
        .bind(&playlist.description)
        .bind(playlist.is_public)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create playlist", e))?;

        Ok(Playlist {
            id,
            user_id: playlist.user_id,
            title: playlist.title,
            description: playlist.description,
            is_public: playlist.is_public,
            video_count: 0,
            total_duration: 0,
            followers_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_playlist(&self, id: PlaylistId) -> AppResult<Option<Playlist>> {
        let row = sqlx::query(&format!("SELECT {} FROM playlists WHERE id = ?", PLAYLIST_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(&format!("Failed to get playlist {}", id), e))?;
        Ok(row.as_ref().map(map_playlist))
    }

    async fn find_playlists(&self, query: &PlaylistQuery) -> AppResult<Vec<Playlist>> {
        let mut qb =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM playlists WHERE 1 = 1", PLAYLIST_COLUMNS));

        if let Some(owner) = query.owner {
            qb.push(" AND user_id = ");
            qb.push_bind(owner);
        }
        if let Some(owners) = &query.owners_in {
            push_uuid_list(&mut qb, "user_id", owners);
        }
        if query.public_only {
            qb.push(" AND is_public = 1");
        }

        qb.push(match query.order {
            PlaylistOrder::RecentlyUpdated => " ORDER BY updated_at DESC, rowid DESC",
            PlaylistOrder::MostFollowed => " ORDER BY followers_count DESC, updated_at DESC",
        });

        if let Some(limit) = query.limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit as i64);
        }

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to query playlists", e))?;
        Ok(rows.iter().map(map_playlist).collect())
    }

    async fn delete_playlist(&self, id: PlaylistId) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to delete playlist entries", e))?;

        sqlx::query("DELETE FROM edges WHERE object = ? AND kind = ?")
            .bind(id)
            .bind(EdgeKind::PlaylistFollow.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to delete playlist follows", e))?;

        let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error(&format!("Failed to delete playlist {}", id), e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn touch_playlist(&self, id: PlaylistId) -> AppResult<()> {
        sqlx::query("UPDATE playlists SET updated_at = ? WHERE id = ?")
            .bind(current_time_millis())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(&format!("Failed to touch playlist {}", id), e))?;
        Ok(())
    }

    async fn playlist_entries(&self, playlist_id: PlaylistId) -> AppResult<Vec<PlaylistEntry>> {
        let rows = sqlx::query(
            "SELECT playlist_id, video_id, position, added_at FROM playlist_videos \
             WHERE playlist_id = ? ORDER BY position ASC",
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get playlist entries", e))?;
        Ok(rows.iter().map(map_entry).collect())
    }

    async fn get_entry(
        &self,
        playlist_id: PlaylistId,
        video_id: VideoId,
    ) -> AppResult<Option<PlaylistEntry>> {
        let row = sqlx::query(
            "SELECT playlist_id, video_id, position, added_at FROM playlist_videos \
             WHERE playlist_id = ? AND video_id = ?",
        )
        .bind(playlist_id)
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get playlist entry", e))?;
        Ok(row.as_ref().map(map_entry))
    }

    async fn max_position(&self, playlist_id: PlaylistId) -> AppResult<Option<i64>> {
        let row = sqlx::query("SELECT MAX(position) FROM playlist_videos WHERE playlist_id = ?")
            .bind(playlist_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to get max playlist position", e))?;
        Ok(row.get::<Option<i64>, _>(0))
    }

    async fn insert_entry(
        &self,
        playlist_id: PlaylistId,
        video_id: VideoId,
        position: i64,
    ) -> AppResult<PlaylistEntry> {
        let now = current_time_millis();
        sqlx::query(
            "INSERT INTO playlist_videos (playlist_id, video_id, position, added_at) VALUES (?, ?, ?, ?)",
        )
        .bind(playlist_id)
        .bind(video_id)
        .bind(position)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to add video to playlist", e))?;

        Ok(PlaylistEntry {
            playlist_id,
            video_id,
            position,
            added_at: now,
        })
    }

    async fn delete_entry(&self, playlist_id: PlaylistId, video_id: VideoId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = ? AND video_id = ?")
            .bind(playlist_id)
            .bind(video_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to remove video from playlist", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn playlists_containing(
        &self,
        video_id: VideoId,
        playlist_ids: &[PlaylistId],
    ) -> AppResult<Vec<PlaylistId>> {
        if playlist_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT playlist_id FROM playlist_videos WHERE video_id = ");
        qb.push_bind(video_id);
        push_uuid_list(&mut qb, "playlist_id", playlist_ids);

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to check playlist membership", e))?;
        Ok(rows.iter().map(|row| row.get("playlist_id")).collect())
    }

    async fn insert_comment(
        &self,
        video_id: VideoId,
        user_id: UserId,
        content: &str,
        parent_comment_id: Option<CommentId>,
    ) -> AppResult<Comment> {
        let id = Uuid::new_v4();
        let now = current_time_millis();
        sqlx::query(
            "INSERT INTO comments (id, video_id, user_id, content, parent_comment_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(video_id)
        .bind(user_id)
        .bind(content)
        .bind(parent_comment_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to post comment", e))?;

        Ok(Comment {
            id,
            video_id,
            user_id,
            content: content.to_string(),
            parent_comment_id,
            created_at: now,
        })
    }

    async fn comments_for_video(&self, video_id: VideoId) -> AppResult<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, video_id, user_id, content, parent_comment_id, created_at FROM comments \
             WHERE video_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(video_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get comments", e))?;
        Ok(rows.iter().map(map_comment).collect())
    }

    async fn create_session(&self, user_id: UserId, ttl_millis: i64) -> AppResult<Session> {
        let now = current_time_millis();
        let session = Session {
            token: Uuid::new_v4(),
            user_id,
            created_at: now,
            expires_at: now.saturating_add(ttl_millis),
        };
        sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
            .bind(session.token)
            .bind(session.user_id)
            .bind(session.created_at)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to create session", e))?;
        Ok(session)
    }

    async fn get_session(&self, token: Uuid) -> AppResult<Option<Session>> {
        let row = sqlx::query("SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to get session", e))?;
        Ok(row.map(|row| Session {
            token: row.get("token"),
            user_id: row.get("user_id"),
            created_at: row.get("created_at"),
            expires_at: row.get("expires_at"),
        }))
    }

    async fn delete_session(&self, token: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete session", e))?;
        Ok(result.rows_affected() > 0)
    }
}
