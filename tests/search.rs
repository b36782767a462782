mod common;

use common::{private_video, user, video, CountingStore};
use fitstream::infrastructure::database::DataStore;
use fitstream::services::search_service::SuggestionKind;
use fitstream::services::{SearchFilters, SearchService, SuggestionService};

fn filters() -> SearchFilters {
    SearchFilters::default()
}

#[tokio::test]
async fn test_short_queries_never_hit_the_store() {
    let store = CountingStore::new().await;
    let service = SuggestionService::new(store.clone());

    for query in ["", "a", " b ", "   "] {
        assert!(service.fetch(query).await.unwrap().is_empty());
    }
    assert_eq!(store.video_query_count(), 0);
    assert_eq!(store.user_search_count(), 0);
}

#[tokio::test]
async fn test_suggestions_group_videos_users_then_categories() {
    let store = CountingStore::new().await;
    let runner = user(store.as_ref(), "cardio_kate").await;
    video(store.as_ref(), &runner, "Cardio blast", "cardio", "hiit").await;
    let service = SuggestionService::new(store.clone());

    let suggestions = service.fetch("cardio").await.unwrap();
    let kinds: Vec<_> = suggestions.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![SuggestionKind::Video, SuggestionKind::User, SuggestionKind::Category]
    );
    assert_eq!(suggestions[0].subtitle.as_deref(), Some("cardio workout"));
    assert_eq!(suggestions[1].subtitle.as_deref(), Some("@cardio_kate"));
    assert_eq!(suggestions[2].subtitle.as_deref(), Some("Category"));
    assert_eq!(store.video_query_count(), 1);
    assert_eq!(store.user_search_count(), 1);
}

#[tokio::test]
async fn test_suggestions_cap_each_kind_at_three() {
    let store = CountingStore::new().await;
    let creator = user(store.as_ref(), "boxer").await;
    for i in 0..5 {
        video(store.as_ref(), &creator, &format!("Boxing round {}", i), "combat_sports", "boxing").await;
    }
    let service = SuggestionService::new(store.clone());

    let suggestions = service.fetch("boxing").await.unwrap();
    let videos = suggestions.iter().filter(|s| s.kind == SuggestionKind::Video).count();
    assert_eq!(videos, 3);
}

#[tokio::test]
async fn test_search_matches_title_or_description_and_skips_private() {
    let store = CountingStore::new().await;
    let creator = user(store.as_ref(), "coach").await;
    let by_title = video(store.as_ref(), &creator, "Hill sprints", "cardio", "running").await;
    private_video(store.as_ref(), &creator, "Hill secrets").await;
    video(store.as_ref(), &creator, "Bench press", "strength_training", "powerlifting").await;
    let service = SearchService::new(store.clone());

    let mut query = filters();
    query.query = "  hill ".to_string();
    let results = service.search(&query).await.unwrap();

    assert_eq!(results.iter().map(|c| c.id).collect::<Vec<_>>(), vec![by_title.id]);
    assert_eq!(results[0].username, "coach");
}

#[tokio::test]
async fn test_search_category_all_matches_every_category() {
    let store = CountingStore::new().await;
    let creator = user(store.as_ref(), "mixer").await;
    video(store.as_ref(), &creator, "Salsa", "dance_fitness", "salsa").await;
    video(store.as_ref(), &creator, "Surf", "outdoor_sports", "surfing").await;
    let service = SearchService::new(store.clone());

    assert_eq!(service.search(&filters()).await.unwrap().len(), 2);

    let narrowed = filters().with_category("outdoor_sports");
    let results = service.search(&narrowed).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].main_category, "outdoor_sports");
}

#[tokio::test]
async fn test_search_sorts_by_views_when_popular() {
    let store = CountingStore::new().await;
    let creator = user(store.as_ref(), "host").await;
    let watched = video(store.as_ref(), &creator, "Watched", "cardio", "cycling").await;
    let _fresh = video(store.as_ref(), &creator, "Fresh", "cardio", "cycling").await;
    store
        .adjust_counter(fitstream::models::Counter::VideoViews(watched.id), 10)
        .await
        .unwrap();
    let service = SearchService::new(store.clone());

    let mut popular = filters();
    popular.sort_by = "popular".to_string();
    assert_eq!(service.search(&popular).await.unwrap()[0].id, watched.id);

    let recent = filters();
    assert_ne!(service.search(&recent).await.unwrap()[0].id, watched.id);
}

#[tokio::test]
async fn test_search_and_suggestions_fold_accented_case() {
    let store = CountingStore::new().await;
    let coach = user(store.as_ref(), "coach_elo").await;
    store
        .update_profile(
            coach.id,
            fitstream::models::ProfileUpdate {
                display_name: Some("ÉLODIE Étienne".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let stretch = video(store.as_ref(), &coach, "ÉTIREMENTS DU MATIN", "flexibility_mobility", "stretching").await;

    let mut query = filters();
    query.query = "étirements".to_string();
    let results = SearchService::new(store.clone()).search(&query).await.unwrap();
    assert_eq!(results.iter().map(|c| c.id).collect::<Vec<_>>(), vec![stretch.id]);

    let suggestions = SuggestionService::new(store.clone()).fetch("étir").await.unwrap();
    assert_eq!(suggestions[0].kind, SuggestionKind::Video);
    assert_eq!(suggestions[0].title, "ÉTIREMENTS DU MATIN");

    let people = SuggestionService::new(store.clone()).fetch("élodie").await.unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].kind, SuggestionKind::User);
    assert_eq!(people[0].subtitle.as_deref(), Some("@coach_elo"));
}

#[tokio::test]
async fn test_session_uses_configured_debounce() {
    let store = CountingStore::new().await;
    let runner = user(store.as_ref(), "trail_tom").await;
    video(store.as_ref(), &runner, "Trail running form", "outdoor_sports", "trail_running").await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = fitstream::config::Config::default();
    config.search.debounce_ms = 200;
    let storage = std::sync::Arc::new(
        fitstream::infrastructure::storage::LocalObjectStorage::new(dir.path(), "http://localhost:3000"),
    );
    let state = fitstream::app_state::AppState::with_backends(config, store.clone(), storage);

    let session = state.suggestions.session();
    assert_eq!(session.delay(), std::time::Duration::from_millis(200));

    let mut results = session.subscribe();
    session.input("tr").await;
    session.input("trail").await;
    tokio::time::timeout(std::time::Duration::from_secs(5), results.changed())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(session.current()[0].title, "Trail running form");
    assert_eq!(store.video_query_count(), 1);
}
