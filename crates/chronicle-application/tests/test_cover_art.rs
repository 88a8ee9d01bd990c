mod common;

use chronicle_application::cover_art_service::COVER_FAILED_MESSAGE;
use chronicle_application::{CacheStore, CoverArtService, CoverOutcome};
use chronicle_core::cache::HERO_COVER_KEY;
use chronicle_core::comic::ImageRef;
use chronicle_core::error::ChronicleError;
use chronicle_core::generation::operation;
use chronicle_infrastructure::{InMemoryStorage, JsonFileStorage, SelectedCredential};
use common::{ManualClock, MockClient, credential_with_key};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tempfile::TempDir;

#[tokio::test]
async fn test_cache_miss_generates_and_caches() {
    let client = Arc::new(MockClient::new());
    let cache = CacheStore::new(Arc::new(InMemoryStorage::new()));
    let clock = Arc::new(ManualClock::at(2026, 10, 21));
    let cover = CoverArtService::new(
        client.clone(),
        credential_with_key().await,
        cache.clone(),
        clock,
    );

    assert_eq!(cover.load().await, CoverOutcome::Generated);

    let state = cover.state();
    assert!(state.loaded);
    assert!(!state.loading);
    assert_eq!(state.error, None);
    let cached: Option<ImageRef> = cache.get(HERO_COVER_KEY, "issue_2026_10_19").await;
    assert_eq!(cached, state.image);
    assert_eq!(client.cover_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cache_hit_within_week_skips_generation() {
    let temp_dir = TempDir::new().unwrap();
    let storage = Arc::new(JsonFileStorage::new(temp_dir.path().join("cache.json")));
    let clock = Arc::new(ManualClock::at(2026, 10, 20));
    let credential = credential_with_key().await;

    let first_client = Arc::new(MockClient::new());
    let first = CoverArtService::new(
        first_client,
        credential.clone(),
        CacheStore::new(storage.clone()),
        clock.clone(),
    );
    first.load().await;
    let image = first.state().image;

    // Sunday still belongs to the same issue window
    clock.set(2026, 10, 25);
    let second_client = Arc::new(MockClient::new());
    let second = CoverArtService::new(
        second_client.clone(),
        credential.clone(),
        CacheStore::new(storage.clone()),
        clock.clone(),
    );
    assert_eq!(second.load().await, CoverOutcome::FromCache);
    assert_eq!(second.state().image, image);
    assert_eq!(second_client.cover_calls.load(Ordering::SeqCst), 0);

    // Monday opens a new window
    clock.set(2026, 10, 26);
    let third_client = Arc::new(MockClient::new());
    let third = CoverArtService::new(
        third_client.clone(),
        credential,
        CacheStore::new(storage),
        clock,
    );
    assert_eq!(third.load().await, CoverOutcome::Generated);
    assert_eq!(third_client.cover_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failure_keeps_previous_image() {
    let client = Arc::new(MockClient::new());
    let cover = CoverArtService::new(
        client.clone(),
        credential_with_key().await,
        CacheStore::new(Arc::new(InMemoryStorage::new())),
        Arc::new(ManualClock::at(2026, 10, 21)),
    );
    cover.load().await;
    let before = cover.state().image;
    assert!(before.is_some());

    client.push_cover(Err(ChronicleError::generation(
        operation::COVER_ART,
        "HTTP 429: RESOURCE_EXHAUSTED: quota",
    )));
    assert_eq!(cover.redraw().await, CoverOutcome::Failed);

    let state = cover.state();
    assert_eq!(state.image, before);
    assert_eq!(state.error.as_deref(), Some(COVER_FAILED_MESSAGE));
    assert!(!state.loading);

    // A successful redraw clears the error
    assert_eq!(cover.redraw().await, CoverOutcome::Generated);
    assert_eq!(cover.state().error, None);
    assert_ne!(cover.state().image, before);
}

#[tokio::test]
async fn test_load_waits_for_credential() {
    let client = Arc::new(MockClient::new());
    let credential = Arc::new(SelectedCredential::new());
    let cover = CoverArtService::new(
        client.clone(),
        credential.clone(),
        CacheStore::new(Arc::new(InMemoryStorage::new())),
        Arc::new(ManualClock::at(2026, 10, 21)),
    );

    assert_eq!(cover.load().await, CoverOutcome::AwaitingCredential);
    assert_eq!(cover.redraw().await, CoverOutcome::AwaitingCredential);
    assert_eq!(client.cover_calls.load(Ordering::SeqCst), 0);

    credential.select("key").await;
    assert_eq!(cover.load().await, CoverOutcome::Generated);
}

#[tokio::test]
async fn test_missing_image_is_not_cached() {
    let client = Arc::new(MockClient::new());
    client.push_cover(Ok(None));
    let cache = CacheStore::new(Arc::new(InMemoryStorage::new()));
    let cover = CoverArtService::new(
        client.clone(),
        credential_with_key().await,
        cache.clone(),
        Arc::new(ManualClock::at(2026, 10, 21)),
    );

    assert_eq!(cover.load().await, CoverOutcome::NoImage);
    assert!(cover.state().loaded);
    let cached: Option<ImageRef> = cache.get(HERO_COVER_KEY, "issue_2026_10_19").await;
    assert_eq!(cached, None);

    // Loaded once already, so a plain load does not retry
    assert_eq!(cover.load().await, CoverOutcome::AlreadyLoaded);
    assert_eq!(client.cover_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_redraw_without_image_clears_cover() {
    let client = Arc::new(MockClient::new());
    let cache = CacheStore::new(Arc::new(InMemoryStorage::new()));
    let cover = CoverArtService::new(
        client.clone(),
        credential_with_key().await,
        cache.clone(),
        Arc::new(ManualClock::at(2026, 10, 21)),
    );
    assert_eq!(cover.load().await, CoverOutcome::Generated);
    let cached: Option<ImageRef> = cache.get(HERO_COVER_KEY, "issue_2026_10_19").await;
    assert!(cover.state().image.is_some());

    client.push_cover(Ok(None));
    assert_eq!(cover.redraw().await, CoverOutcome::NoImage);

    let state = cover.state();
    assert_eq!(state.image, None);
    assert_eq!(state.error, None);
    assert!(state.loaded);
    assert!(!state.loading);
    // The week's cached cover is left alone
    let still_cached: Option<ImageRef> = cache.get(HERO_COVER_KEY, "issue_2026_10_19").await;
    assert_eq!(still_cached, cached);
}
