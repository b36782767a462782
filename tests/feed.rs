mod common;

use std::sync::Arc;

use common::{private_video, user, video, CountingStore};
use fitstream::infrastructure::database::DataStore;
use fitstream::models::EdgeKind;
use fitstream::services::{FeedSection, FeedService, ProfileService, SocialService};

#[tokio::test]
async fn test_following_with_no_followees_issues_no_video_query() {
    let store = CountingStore::new().await;
    let viewer = user(store.as_ref(), "lonely").await;
    let feed = FeedService::new(store.clone(), 12);

    let following = feed.following(viewer.id).await.unwrap();

    assert!(following.is_empty());
    assert_eq!(store.video_query_count(), 0);
}

#[tokio::test]
async fn test_following_returns_followee_videos_newest_first() {
    let store = CountingStore::new().await;
    let a = user(store.as_ref(), "athlete_a").await;
    let b = user(store.as_ref(), "athlete_b").await;
    let c = user(store.as_ref(), "athlete_c").await;
    let social = SocialService::new(store.clone());
    social.toggle_follow(a.id, b.id).await.unwrap();
    social.toggle_follow(a.id, c.id).await.unwrap();

    let first = video(store.as_ref(), &b, "Deadlift basics", "strength_training", "powerlifting").await;
    let second = video(store.as_ref(), &b, "Squat depth", "strength_training", "powerlifting").await;

    let feed = FeedService::new(store.clone(), 12);
    let following = feed.following(a.id).await.unwrap();

    let ids: Vec<_> = following.iter().map(|card| card.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert!(following.iter().all(|card| card.username == "athlete_b"));
}

#[tokio::test]
async fn test_following_respects_page_size() {
    let store = CountingStore::new().await;
    let a = user(store.as_ref(), "viewer").await;
    let b = user(store.as_ref(), "prolific").await;
    SocialService::new(store.clone()).toggle_follow(a.id, b.id).await.unwrap();
    for i in 0..5 {
        video(store.as_ref(), &b, &format!("Run {}", i), "cardio", "running").await;
    }

    let feed = FeedService::new(store.clone(), 3);
    assert_eq!(feed.following(a.id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_saved_drops_dangling_saves_and_keeps_save_order() {
    let store = CountingStore::new().await;
    let viewer = user(store.as_ref(), "saver").await;
    let creator = user(store.as_ref(), "creator").await;
    let early = video(store.as_ref(), &creator, "Jab cross", "combat_sports", "boxing").await;
    let late = video(store.as_ref(), &creator, "Hook drill", "combat_sports", "boxing").await;

    // Save the newer video first so save order differs from upload order
    store.insert_edge(viewer.id, EdgeKind::Save, late.id).await.unwrap();
    store.insert_edge(viewer.id, EdgeKind::Save, uuid::Uuid::new_v4()).await.unwrap();
    store.insert_edge(viewer.id, EdgeKind::Save, early.id).await.unwrap();

    let feed = FeedService::new(store.clone(), 12);
    let saved = feed.saved(viewer.id).await.unwrap();

    let ids: Vec<_> = saved.iter().map(|card| card.id).collect();
    assert_eq!(ids, vec![early.id, late.id]);
}

#[tokio::test]
async fn test_recommended_prefers_saved_categories_and_excludes_own_videos() {
    let store = CountingStore::new().await;
    let viewer = user(store.as_ref(), "yogi").await;
    let creator = user(store.as_ref(), "teacher").await;

    let saved = video(store.as_ref(), &creator, "Sun salutation", "yoga_pilates", "hatha_yoga").await;
    let match_ = video(store.as_ref(), &creator, "Yin evening", "yoga_pilates", "yin_yoga").await;
    let _other = video(store.as_ref(), &creator, "Sprint intervals", "cardio", "hiit").await;
    let _own = video(store.as_ref(), &viewer, "My flow", "yoga_pilates", "power_yoga").await;
    store.insert_edge(viewer.id, EdgeKind::Save, saved.id).await.unwrap();

    let feed = FeedService::new(store.clone(), 12);
    let recommended = feed.recommended(viewer.id).await.unwrap();

    let ids: Vec<_> = recommended.iter().map(|card| card.id).collect();
    assert!(ids.contains(&saved.id));
    assert!(ids.contains(&match_.id));
    assert_eq!(ids.len(), 2);
    assert!(recommended.iter().all(|card| card.user_id != viewer.id));
}

#[tokio::test]
async fn test_recommended_without_saves_ranks_by_likes() {
    let store = CountingStore::new().await;
    let viewer = user(store.as_ref(), "newcomer").await;
    let creator = user(store.as_ref(), "coach").await;
    let quiet = video(store.as_ref(), &creator, "Stretch", "flexibility_mobility", "stretching").await;
    let loved = video(store.as_ref(), &creator, "Climb", "outdoor_sports", "rock_climbing").await;

    let social = SocialService::new(store.clone());
    social.toggle_like(viewer.id, loved.id).await.unwrap();

    let feed = FeedService::new(store.clone(), 12);
    let ids: Vec<_> = feed
        .recommended(viewer.id)
        .await
        .unwrap()
        .iter()
        .map(|card| card.id)
        .collect();
    assert_eq!(ids, vec![loved.id, quiet.id]);
}

#[tokio::test]
async fn test_feed_joins_all_sections() {
    let store = CountingStore::new().await;
    let viewer = user(store.as_ref(), "member").await;
    let creator = user(store.as_ref(), "host").await;
    let clip = video(store.as_ref(), &creator, "Zumba party", "dance_fitness", "zumba").await;
    let social = SocialService::new(store.clone());
    social.toggle_follow(viewer.id, creator.id).await.unwrap();
    social.toggle_save(viewer.id, clip.id).await.unwrap();

    let service = FeedService::new(store.clone() as Arc<dyn DataStore>, 12);
    let feed = service.feed(viewer.id).await;

    assert_eq!(feed.following.len(), 1);
    assert_eq!(feed.saved.len(), 1);
    assert_eq!(feed.recommended.len(), 1);
    assert_eq!(
        service.section(viewer.id, FeedSection::Saved).await[0].id,
        clip.id
    );
}

#[tokio::test]
async fn test_saved_hides_other_users_private_videos() {
    let store = CountingStore::new().await;
    let viewer = user(store.as_ref(), "alice").await;
    let owner = user(store.as_ref(), "bob").await;
    let open = video(store.as_ref(), &owner, "Open drill", "cardio", "running").await;
    let secret = private_video(store.as_ref(), &owner, "secret").await;
    store.insert_edge(viewer.id, EdgeKind::Save, open.id).await.unwrap();
    store.insert_edge(viewer.id, EdgeKind::Save, secret.id).await.unwrap();
    store.insert_edge(owner.id, EdgeKind::Save, secret.id).await.unwrap();

    let feed = FeedService::new(store.clone(), 12);
    let ids: Vec<_> = feed.saved(viewer.id).await.unwrap().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![open.id]);

    let profiles = ProfileService::new(store.clone());
    let mine: Vec<_> = profiles.my_saved(viewer.id).await.unwrap().iter().map(|c| c.id).collect();
    assert_eq!(mine, vec![open.id]);

    let owners: Vec<_> = feed.saved(owner.id).await.unwrap().iter().map(|c| c.id).collect();
    assert_eq!(owners, vec![secret.id]);
}

#[tokio::test]
async fn test_failing_section_leaves_the_others_intact() {
    let store = CountingStore::new().await;
    let viewer = user(store.as_ref(), "member").await;
    let creator = user(store.as_ref(), "host").await;
    let clip = video(store.as_ref(), &creator, "Spin class", "cardio", "cycling").await;
    let social = SocialService::new(store.clone());
    social.toggle_follow(viewer.id, creator.id).await.unwrap();
    social.toggle_save(viewer.id, clip.id).await.unwrap();

    store.break_edge_reads();
    let service = FeedService::new(store.clone(), 12);
    assert!(service.following(viewer.id).await.is_err());

    let feed = service.feed(viewer.id).await;
    assert!(feed.following.is_empty());
    assert_eq!(feed.saved.iter().map(|c| c.id).collect::<Vec<_>>(), vec![clip.id]);
    assert_eq!(feed.recommended.iter().map(|c| c.id).collect::<Vec<_>>(), vec![clip.id]);
}
