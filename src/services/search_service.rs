// Search - filter composition, typeahead suggestions and debounced suggestion sessions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::categories;
use crate::error::AppResult;
use crate::infrastructure::database::{DataStore, VideoFilter, VideoOrder, VideoQuery};
use crate::services::{with_usernames, VideoCard};

pub const ALL: &str = "all";
pub const MIN_SUGGESTION_QUERY_LEN: usize = 2;
pub const SUGGESTIONS_PER_KIND: u32 = 3;
pub const DEFAULT_SUGGESTION_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub query: String,
    pub category: String,
    pub subcategory: String,
    pub duration: String,
    pub sort_by: String,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: ALL.to_string(),
            subcategory: ALL.to_string(),
            duration: ALL.to_string(),
            sort_by: "recent".to_string(),
        }
    }
}

impl SearchFilters {
    /// Switch category; a different category resets the subcategory.
    pub fn with_category(mut self, category: &str) -> Self {
        if category != self.category {
            self.subcategory = ALL.to_string();
        }
        self.category = category.to_string();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Recent,
    Popular,
    Trending,
}

impl SortBy {
    /// Unknown values sort by recency.
    pub fn parse(value: &str) -> Self {
        match value {
            "popular" => SortBy::Popular,
            "trending" => SortBy::Trending,
            _ => SortBy::Recent,
        }
    }

    pub fn order(&self) -> VideoOrder {
        match self {
            SortBy::Recent => VideoOrder::Newest,
            SortBy::Popular => VideoOrder::MostViewed,
            SortBy::Trending => VideoOrder::MostLiked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationBucket {
    All,
    Short,
    Medium,
    Long,
}

impl DurationBucket {
    pub fn parse(value: &str) -> Self {
        match value {
            "short" => DurationBucket::Short,
            "medium" => DurationBucket::Medium,
            "long" => DurationBucket::Long,
            _ => DurationBucket::All,
        }
    }
}

fn is_set(value: &str) -> bool {
    !value.is_empty() && value != ALL
}

/// Build the single video read for a set of filters.
/// The duration bucket is accepted but adds no clause.
pub fn compose_video_query(filters: &SearchFilters) -> VideoQuery {
    let mut query = VideoQuery::new().filter(VideoFilter::PublicOnly);

    let text = filters.query.trim();
    if !text.is_empty() {
        query = query.filter(VideoFilter::TextMatch(text.to_string()));
    }
    if is_set(&filters.category) {
        query = query.filter(VideoFilter::MainCategory(filters.category.clone()));
    }
    if is_set(&filters.subcategory) {
        query = query.filter(VideoFilter::SubCategory(filters.subcategory.clone()));
    }

    let bucket = DurationBucket::parse(&filters.duration);
    if bucket != DurationBucket::All {
        debug!("Duration bucket {:?} requested; duration filtering is not applied", bucket);
    }

    query.order_by(SortBy::parse(&filters.sort_by).order())
}

#[derive(Clone)]
pub struct SearchService {
    store: Arc<dyn DataStore>,
}

impl SearchService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub async fn search(&self, filters: &SearchFilters) -> AppResult<Vec<VideoCard>> {
        let query = compose_video_query(filters);
        let videos = self.store.find_videos(&query).await?;
        with_usernames(self.store.as_ref(), videos).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Video,
    User,
    Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub title: String,
    pub subtitle: Option<String>,
    pub id: String,
}

/// What selecting a suggestion does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionAction {
    Navigate(String),
    Filter(SearchFilters),
}

impl Suggestion {
    pub fn select(&self, current: &SearchFilters) -> SuggestionAction {
        match self.kind {
            SuggestionKind::Video => SuggestionAction::Navigate(format!("/video/{}", self.id)),
            SuggestionKind::User => {
                let username = self
                    .subtitle
                    .as_deref()
                    .and_then(|s| s.strip_prefix('@'))
                    .unwrap_or(&self.title);
                SuggestionAction::Navigate(format!("/profile/{}", username))
            }
            SuggestionKind::Category => {
                let mut filters = current.clone().with_category(&self.id);
                filters.query.clear();
                SuggestionAction::Filter(filters)
            }
        }
    }
}

pub fn is_lookup_eligible(query: &str) -> bool {
    query.trim().chars().count() >= MIN_SUGGESTION_QUERY_LEN
}

/// Source of suggestions for a partial query.
#[async_trait]
pub trait SuggestionLookup: Send + Sync {
    async fn lookup(&self, query: &str) -> AppResult<Vec<Suggestion>>;
}

#[derive(Clone)]
pub struct SuggestionService {
    store: Arc<dyn DataStore>,
    debounce: Duration,
}

impl SuggestionService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            store,
            debounce: DEFAULT_SUGGESTION_DEBOUNCE,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// A typeahead session over this service, quiet period included.
    pub fn session(&self) -> SuggestionSession {
        SuggestionSession::new(Arc::new(self.clone()), self.debounce)
    }

    /// Videos, then users, then categories. Short queries return nothing
    /// without touching the store.
    pub async fn fetch(&self, query: &str) -> AppResult<Vec<Suggestion>> {
        if !is_lookup_eligible(query) {
            return Ok(Vec::new());
        }
        let text = query.trim();

        let video_query = VideoQuery::new()
            .filter(VideoFilter::PublicOnly)
            .filter(VideoFilter::TitleMatch(text.to_string()))
            .limit(SUGGESTIONS_PER_KIND);

        let (videos, users) = futures::try_join!(
            self.store.find_videos(&video_query),
            self.store.search_users(text, SUGGESTIONS_PER_KIND),
        )?;

        let mut suggestions = Vec::with_capacity(videos.len() + users.len());
        suggestions.extend(videos.into_iter().map(|video| Suggestion {
            kind: SuggestionKind::Video,
            subtitle: Some(format!("{} workout", categories::humanize(&video.main_category))),
            title: video.title,
            id: video.id.to_string(),
        }));
        suggestions.extend(users.into_iter().map(|user| Suggestion {
            kind: SuggestionKind::User,
            title: if user.display_name.is_empty() {
                user.username.clone()
            } else {
                user.display_name.clone()
            },
            subtitle: Some(format!("@{}", user.username)),
            id: user.id.to_string(),
        }));
        suggestions.extend(categories::search(text).into_iter().map(|category| Suggestion {
            kind: SuggestionKind::Category,
            title: category.name.to_string(),
            subtitle: Some("Category".to_string()),
            id: category.key.to_string(),
        }));

        Ok(suggestions)
    }
}

#[async_trait]
impl SuggestionLookup for SuggestionService {
    async fn lookup(&self, query: &str) -> AppResult<Vec<Suggestion>> {
        self.fetch(query).await
    }
}

/// Debounced typeahead. Every input cancels the pending lookup; a lookup
/// runs once input has been quiet for `delay`, and only the newest input's
/// result is published.
pub struct SuggestionSession {
    lookup: Arc<dyn SuggestionLookup>,
    delay: Duration,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
    results: Arc<watch::Sender<Vec<Suggestion>>>,
}

impl SuggestionSession {
    pub fn new(lookup: Arc<dyn SuggestionLookup>, delay: Duration) -> Self {
        let (results, _) = watch::channel(Vec::new());
        Self {
            lookup,
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
            results: Arc::new(results),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Suggestion>> {
        self.results.subscribe()
    }

    pub fn current(&self) -> Vec<Suggestion> {
        self.results.borrow().clone()
    }

    pub async fn input(&self, query: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        if !is_lookup_eligible(query) {
            self.results.send_replace(Vec::new());
            return;
        }

        let lookup = self.lookup.clone();
        let latest = self.generation.clone();
        let results = self.results.clone();
        let delay = self.delay;
        let query = query.to_string();

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match lookup.lookup(&query).await {
                Ok(suggestions) => {
                    if latest.load(Ordering::SeqCst) == generation {
                        results.send_replace(suggestions);
                    }
                }
                Err(e) => warn!("Error fetching suggestions for {:?}: {}", query, e),
            }
        }));
    }
}

impl Drop for SuggestionSession {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}
