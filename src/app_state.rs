use std::sync::Arc;

use crate::{
    config::Config,
    infrastructure::{
        database::DataStore, middleware::HasAuthService, sqlite_database::SqliteStore,
        storage::{LocalObjectStorage, ObjectStorage},
    },
    services::{
        AuthService, FeedService, PlaylistService, ProfileService, SearchService, SocialService,
        SuggestionService, VideoService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub auth: AuthService,
    pub feed: FeedService,
    pub search: SearchService,
    pub suggestions: SuggestionService,
    pub social: SocialService,
    pub playlists: PlaylistService,
    pub videos: VideoService,
    pub profiles: ProfileService,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Initialize database
        let store: Arc<dyn DataStore> = Arc::new(SqliteStore::connect(&config.database.url).await?);

        // Uploaded media lives on local disk and is served under /media
        let storage: Arc<dyn ObjectStorage> = Arc::new(LocalObjectStorage::new(
            &config.storage.media_root,
            &config.storage.public_base_url,
        ));

        Ok(Self::with_backends(config, store, storage))
    }

    /// Wire every service onto the given store and storage.
    pub fn with_backends(
        config: Config,
        store: Arc<dyn DataStore>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            auth: AuthService::new(store.clone(), config.auth.session_ttl_hours),
            feed: FeedService::new(store.clone(), config.feed.page_size),
            search: SearchService::new(store.clone()),
            suggestions: SuggestionService::new(store.clone()).with_debounce(config.debounce()),
            social: SocialService::new(store.clone()),
            playlists: PlaylistService::new(store.clone()),
            videos: VideoService::new(store.clone(), storage.clone()),
            profiles: ProfileService::new(store.clone()),
            store,
            storage,
            config,
        }
    }
}

impl HasAuthService for AppState {
    fn auth_service(&self) -> &AuthService {
        &self.auth
    }
}
