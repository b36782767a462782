// Video upload, detail and comments

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::categories;
use crate::error::{AppError, AppResult};
use crate::infrastructure::database::DataStore;
use crate::infrastructure::storage::ObjectStorage;
use crate::models::{
    current_time_millis, Comment, CommentId, Counter, EdgeKind, NewVideo, Timestamp, UserId,
    Video, VideoId,
};
use crate::services::UNKNOWN_USER;

const DEFAULT_EXTENSION: &str = "mp4";

/// Tags arrive either as a list or as one comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagInput {
    List(Vec<String>),
    Text(String),
}

impl Default for TagInput {
    fn default() -> Self {
        TagInput::List(Vec::new())
    }
}

impl TagInput {
    pub fn normalize(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            TagInput::List(tags) => tags,
            TagInput::Text(text) => text.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

fn default_public() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadRequest {
    pub title: String,
    pub description: Option<String>,
    pub main_category: String,
    pub sub_category: String,
    #[serde(default)]
    pub tags: TagInput,
    #[serde(default = "default_public")]
    pub is_public: bool,
    pub duration: Option<i64>,
    pub thumbnail_url: Option<String>,
    pub file_name: String,
    pub content_base64: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoDetail {
    pub video: Video,
    pub username: String,
    pub is_owner: bool,
    pub liked: bool,
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: CommentId,
    pub video_id: VideoId,
    pub user_id: UserId,
    pub username: String,
    pub content: String,
    pub parent_comment_id: Option<CommentId>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostCommentRequest {
    pub content: String,
    pub parent_comment_id: Option<CommentId>,
}

#[derive(Clone)]
pub struct VideoService {
    store: Arc<dyn DataStore>,
    storage: Arc<dyn ObjectStorage>,
}

impl VideoService {
    pub fn new(store: Arc<dyn DataStore>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { store, storage }
    }

    pub async fn upload(&self, uploader: UserId, request: UploadRequest) -> AppResult<Video> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Video title is required".into()));
        }
        if !categories::is_valid_pair(&request.main_category, &request.sub_category) {
            return Err(AppError::Validation(format!(
                "Unknown category pair: {}/{}",
                request.main_category, request.sub_category
            )));
        }
        let duration = request.duration.unwrap_or(0);
        if duration < 0 {
            return Err(AppError::Validation("Duration cannot be negative".into()));
        }

        let bytes = STANDARD
            .decode(request.content_base64.trim())
            .map_err(|e| AppError::BadRequest(format!("Invalid base64 content: {}", e)))?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Video file is empty".into()));
        }

        let path = object_path(uploader, &request.file_name, current_time_millis(), Uuid::new_v4());
        let video_url = self.storage.upload(&path, bytes).await?;

        let created = self
            .store
            .create_video(NewVideo {
                user_id: uploader,
                title,
                description: request
                    .description
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
                video_url,
                thumbnail_url: request.thumbnail_url,
                duration,
                main_category: request.main_category,
                sub_category: request.sub_category,
                tags: request.tags.normalize(),
                is_public: request.is_public,
            })
            .await;
        let video = match created {
            Ok(video) => video,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&path).await {
                    warn!("Failed to remove orphaned object {}: {}", path, cleanup);
                }
                return Err(e);
            }
        };
        info!("User {} uploaded video {}", uploader, video.id);

        if let Err(e) = self.store.adjust_counter(Counter::UserVideos(uploader), 1).await {
            warn!("Failed to bump videos_count for {}: {}", uploader, e);
        }
        Ok(video)
    }

    /// Private videos are only visible to their uploader; everyone else
    /// gets `NotFound`. Each read counts as a view.
    pub async fn detail(&self, viewer: Option<UserId>, video_id: VideoId) -> AppResult<VideoDetail> {
        let mut video = self.visible_video(viewer, video_id).await?;

        match self.store.adjust_counter(Counter::VideoViews(video_id), 1).await {
            Ok(views) => video.views = views,
            Err(e) => warn!("Failed to record view for {}: {}", video_id, e),
        }

        let username = self
            .store
            .get_user(video.user_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_else(|| UNKNOWN_USER.to_string());

        let (liked, saved) = match viewer {
            Some(viewer) => {
                let (liked, saved) = futures::try_join!(
                    self.store.edge_exists(viewer, EdgeKind::Like, video_id),
                    self.store.edge_exists(viewer, EdgeKind::Save, video_id),
                )?;
                (liked, saved)
            }
            None => (false, false),
        };

        Ok(VideoDetail {
            is_owner: viewer == Some(video.user_id),
            video,
            username,
            liked,
            saved,
        })
    }

    pub async fn comments(&self, viewer: Option<UserId>, video_id: VideoId) -> AppResult<Vec<CommentView>> {
        self.visible_video(viewer, video_id).await?;
        let comments = self.store.comments_for_video(video_id).await?;

        let mut user_ids: Vec<UserId> = comments.iter().map(|c| c.user_id).collect();
        user_ids.sort();
        user_ids.dedup();
        let usernames: HashMap<UserId, String> = self
            .store
            .get_users(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        Ok(comments
            .into_iter()
            .map(|c| {
                let username = usernames
                    .get(&c.user_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_USER.to_string());
                comment_view(c, username)
            })
            .collect())
    }

    pub async fn post_comment(
        &self,
        author: UserId,
        video_id: VideoId,
        request: PostCommentRequest,
    ) -> AppResult<CommentView> {
        let content = request.content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Comment cannot be empty".into()));
        }
        self.visible_video(Some(author), video_id).await?;

        let comment = self
            .store
            .insert_comment(video_id, author, content, request.parent_comment_id)
            .await?;
        if let Err(e) = self.store.adjust_counter(Counter::VideoComments(video_id), 1).await {
            warn!("Failed to bump comments_count for {}: {}", video_id, e);
        }

        let username = self
            .store
            .get_user(author)
            .await?
            .map(|u| u.username)
            .unwrap_or_else(|| UNKNOWN_USER.to_string());
        Ok(comment_view(comment, username))
    }

    async fn visible_video(&self, viewer: Option<UserId>, video_id: VideoId) -> AppResult<Video> {
        match self.store.get_video(video_id).await? {
            Some(video) if video.visible_to(viewer) => Ok(video),
            _ => Err(AppError::NotFound(format!("Video {} not found", video_id))),
        }
    }
}

/// `{user_id}/{millis}.{ext}`, keeping the uploaded file's extension.
/// `{uploader}/{millis}-{nonce}.{ext}`; the nonce keeps same-millisecond uploads apart.
fn object_path(uploader: UserId, file_name: &str, millis: Timestamp, nonce: Uuid) -> String {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    format!("{}/{}-{}.{}", uploader, millis, nonce, extension)
}

fn comment_view(comment: Comment, username: String) -> CommentView {
    CommentView {
        id: comment.id,
        video_id: comment.video_id,
        user_id: comment.user_id,
        username,
        content: comment.content,
        parent_comment_id: comment.parent_comment_id,
        created_at: comment.created_at,
    }
}
