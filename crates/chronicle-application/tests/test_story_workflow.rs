mod common;

use chronicle_application::story_workflow::STRIP_FAILED_MESSAGE;
use chronicle_application::{
    IssueBoard, IssueOrchestrator, PanelWorkflow, StoryError, StoryOutcome, StoryState,
    StoryWorkflow,
};
use chronicle_core::comic::Category;
use common::{ManualClock, MockClient, credential_with_key, image_for};
use std::sync::Arc;
use std::sync::atomic::Ordering;

struct Fixture {
    client: Arc<MockClient>,
    board: Arc<IssueBoard>,
    issue: IssueOrchestrator,
    stories: StoryWorkflow,
}

async fn fixture(client: MockClient) -> Fixture {
    let client = Arc::new(client);
    let board = Arc::new(IssueBoard::new());
    let clock = Arc::new(ManualClock::at(2026, 10, 21));
    let workflow = PanelWorkflow::new(client.clone(), board.clone(), clock);
    let issue = IssueOrchestrator::new(
        board.clone(),
        workflow,
        vec![Category::Politics, Category::Sports],
        credential_with_key().await,
    );
    let stories = StoryWorkflow::new(client.clone(), board.clone());
    issue.generate_issue().await;
    Fixture {
        client,
        board,
        issue,
        stories,
    }
}

async fn first_panel_id(board: &IssueBoard) -> String {
    board.panels().await[0].id.clone()
}

#[tokio::test]
async fn test_strip_has_frames_in_script_order() {
    let client = MockClient::new();
    client.fail_images_containing("frame 1");
    let fx = fixture(client).await;
    let panel_id = first_panel_id(&fx.board).await;

    let outcome = fx.stories.request(&panel_id).await.unwrap();
    assert_eq!(
        outcome,
        StoryOutcome::Expanded {
            frames: 3,
            images: 2
        }
    );

    let panel = fx.board.panel(&panel_id).await.unwrap();
    let strip = panel.strip.unwrap();
    assert_eq!(strip.len(), 3);
    for (position, frame) in strip.iter().enumerate() {
        assert_eq!(frame.position, position);
        assert_eq!(frame.id, format!("{panel_id}-frame-{position}"));
        assert_eq!(frame.caption, format!("Caption {position}"));
        assert!(!frame.loading);
    }
    assert_eq!(strip[0].image, Some(image_for(&strip[0].directive)));
    assert_eq!(strip[1].image, None);
    assert_eq!(strip[2].image, Some(image_for(&strip[2].directive)));
    assert_eq!(fx.stories.state(&panel_id).await, StoryState::Loaded);
}

#[tokio::test]
async fn test_strip_is_attached_and_settled_atomically() {
    let fx = fixture(MockClient::new()).await;
    let panel_id = first_panel_id(&fx.board).await;
    let mut updates = fx.board.subscribe();
    updates.borrow_and_update();

    let watcher = tokio::spawn({
        let panel_id = panel_id.clone();
        async move {
            let mut seen = Vec::new();
            while updates.changed().await.is_ok() {
                let snapshot = updates.borrow_and_update().clone();
                let Some(strip) = snapshot.panel(&panel_id).and_then(|p| p.strip.clone()) else {
                    continue;
                };
                let loading: Vec<bool> = strip.iter().map(|f| f.loading).collect();
                let settled = loading.iter().all(|l| !l);
                seen.push(loading);
                if settled {
                    break;
                }
            }
            seen
        }
    });

    fx.stories.request(&panel_id).await.unwrap();
    let seen = watcher.await.unwrap();

    assert!(!seen.is_empty());
    for loading in &seen {
        assert_eq!(loading.len(), 3);
        // Never a mix of loading and settled frames
        assert!(loading.iter().all(|l| *l) || loading.iter().all(|l| !l));
    }
    assert!(seen.last().unwrap().iter().all(|l| !l));
}

#[tokio::test]
async fn test_expanded_panel_is_not_regenerated() {
    let fx = fixture(MockClient::new()).await;
    let panel_id = first_panel_id(&fx.board).await;

    fx.stories.request(&panel_id).await.unwrap();
    let again = fx.stories.request(&panel_id).await.unwrap();

    assert_eq!(again, StoryOutcome::AlreadyExpanded);
    assert_eq!(fx.client.strip_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_script_failure_is_retryable() {
    let client = MockClient::new();
    client.failing_strip_scripts.store(1, Ordering::SeqCst);
    let fx = fixture(client).await;
    let panel_id = first_panel_id(&fx.board).await;

    let err = fx.stories.request(&panel_id).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.to_string(), STRIP_FAILED_MESSAGE);
    assert_eq!(
        fx.stories.state(&panel_id).await,
        StoryState::Failed {
            message: STRIP_FAILED_MESSAGE.to_string()
        }
    );
    // The panel itself is untouched
    let panel = fx.board.panel(&panel_id).await.unwrap();
    assert!(panel.strip.is_none());
    assert!(!panel.is_loading());

    let outcome = fx.stories.retry(&panel_id).await.unwrap();
    assert!(matches!(outcome, StoryOutcome::Expanded { frames: 3, .. }));
    assert_eq!(fx.stories.state(&panel_id).await, StoryState::Loaded);
}

#[tokio::test]
async fn test_retry_replaces_existing_strip() {
    let fx = fixture(MockClient::new()).await;
    let panel_id = first_panel_id(&fx.board).await;

    fx.stories.request(&panel_id).await.unwrap();
    fx.client.strip_frames.store(2, Ordering::SeqCst);
    fx.stories.retry(&panel_id).await.unwrap();

    let strip = fx.board.panel(&panel_id).await.unwrap().strip.unwrap();
    assert_eq!(strip.len(), 2);
}

#[tokio::test]
async fn test_concurrent_request_is_rejected() {
    let fx = fixture(MockClient::new()).await;
    let panel_id = first_panel_id(&fx.board).await;

    let (first, second) = tokio::join!(
        fx.stories.request(&panel_id),
        fx.stories.request(&panel_id)
    );

    assert!(first.is_ok());
    assert_eq!(second, Err(StoryError::AlreadyLoading(panel_id.clone())));
    assert_eq!(fx.client.strip_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unknown_panel_is_not_found() {
    let fx = fixture(MockClient::new()).await;
    let stale_id = first_panel_id(&fx.board).await;
    fx.issue.generate_issue().await;

    assert_eq!(
        fx.stories.request(&stale_id).await,
        Err(StoryError::NotFound(stale_id.clone()))
    );
    assert_eq!(fx.stories.state(&stale_id).await, StoryState::Idle);
}

#[tokio::test]
async fn test_new_issue_forgets_strip_state_of_discarded_panels() {
    let client = MockClient::new();
    let fx = fixture(client).await;
    let panels = fx.board.panels().await;
    let (loaded_id, failed_id) = (panels[0].id.clone(), panels[1].id.clone());

    fx.stories.request(&loaded_id).await.unwrap();
    fx.client.failing_strip_scripts.store(1, Ordering::SeqCst);
    fx.stories.request(&failed_id).await.unwrap_err();
    assert_eq!(fx.stories.state(&loaded_id).await, StoryState::Loaded);

    fx.issue.generate_issue().await;

    assert_eq!(fx.stories.state(&loaded_id).await, StoryState::Idle);
    assert_eq!(fx.stories.state(&failed_id).await, StoryState::Idle);

    // Panels of the new issue start from a clean slate
    let fresh_id = first_panel_id(&fx.board).await;
    assert_eq!(fx.stories.state(&fresh_id).await, StoryState::Idle);
    fx.stories.request(&fresh_id).await.unwrap();
    assert_eq!(fx.stories.state(&fresh_id).await, StoryState::Loaded);
    assert_eq!(fx.stories.state(&loaded_id).await, StoryState::Idle);
}
