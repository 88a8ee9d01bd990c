#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use chronicle_core::chat::ChatTurn;
use chronicle_core::clock::Clock;
use chronicle_core::comic::{Category, FrameScript, ImageRef, PanelScript, Resource};
use chronicle_core::error::{ChronicleError, Result};
use chronicle_core::generation::{GenerationClient, operation};
use chronicle_infrastructure::SelectedCredential;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Scriptable in-memory generation client.
///
/// Panel directives are `"<Category> illustration"` and strip directives
/// `"frame <n> of <title>"`, so image failures can be targeted by substring.
#[derive(Default)]
pub struct MockClient {
    pub failing_scripts: Mutex<HashSet<Category>>,
    pub failing_images: Mutex<Vec<String>>,
    pub strip_frames: AtomicUsize,
    pub failing_strip_scripts: AtomicUsize,
    pub cover_results: Mutex<VecDeque<Result<Option<ImageRef>>>>,
    pub chat_results: Mutex<VecDeque<Result<String>>>,
    /// History lengths seen by `send_chat_turn`.
    pub chat_history_lens: Mutex<Vec<usize>>,
    /// When set, every script call waits for a permit.
    pub script_gate: Option<Arc<Semaphore>>,
    pub script_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
    pub strip_calls: AtomicUsize,
    pub cover_calls: AtomicUsize,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            strip_frames: AtomicUsize::new(3),
            ..Default::default()
        }
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            script_gate: Some(gate),
            ..Self::new()
        }
    }

    pub fn fail_script_for(&self, category: Category) {
        self.failing_scripts.lock().unwrap().insert(category);
    }

    pub fn fail_images_containing(&self, needle: &str) {
        self.failing_images.lock().unwrap().push(needle.to_string());
    }

    pub fn push_cover(&self, result: Result<Option<ImageRef>>) {
        self.cover_results.lock().unwrap().push_back(result);
    }

    pub fn push_chat(&self, result: Result<String>) {
        self.chat_results.lock().unwrap().push_back(result);
    }
}

pub fn image_for(directive: &str) -> ImageRef {
    ImageRef::from_url(format!("https://img.test/{}", directive.replace(' ', "_")))
}

#[async_trait]
impl GenerationClient for MockClient {
    async fn generate_cover_art(&self) -> Result<Option<ImageRef>> {
        let call = self.cover_calls.fetch_add(1, Ordering::SeqCst);
        self.cover_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Some(ImageRef::from_url(format!("https://img.test/cover-{call}")))))
    }

    async fn generate_panel_image(&self, directive: &str) -> Option<ImageRef> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failing_images
            .lock()
            .unwrap()
            .iter()
            .any(|needle| directive.contains(needle.as_str()));
        tokio::task::yield_now().await;
        if failing { None } else { Some(image_for(directive)) }
    }

    async fn generate_panel_script(&self, category: Category) -> Result<PanelScript> {
        self.script_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.script_gate {
            let _permit = gate.acquire().await.unwrap();
        }
        tokio::task::yield_now().await;

        if self.failing_scripts.lock().unwrap().contains(&category) {
            return Err(ChronicleError::malformed(operation::PANEL_SCRIPT, "not json"));
        }
        Ok(PanelScript {
            title: format!("{category} headline"),
            body: format!("{category} story body"),
            directive: format!("{category} illustration"),
            resources: vec![Resource {
                name: format!("{category} source"),
                url: "https://example.com".to_string(),
                description: "Background reading".to_string(),
            }],
        })
    }

    async fn generate_strip_script(&self, title: &str, _body: &str) -> Result<Vec<FrameScript>> {
        self.strip_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let remaining_failures = self.failing_strip_scripts.load(Ordering::SeqCst);
        if remaining_failures > 0 {
            self.failing_strip_scripts
                .store(remaining_failures - 1, Ordering::SeqCst);
            return Err(ChronicleError::generation(
                operation::STRIP_SCRIPT,
                "HTTP 503: UNAVAILABLE: overloaded",
            ));
        }

        let frames = self.strip_frames.load(Ordering::SeqCst);
        Ok((0..frames)
            .map(|n| FrameScript {
                caption: format!("Caption {n}"),
                directive: format!("frame {n} of {title}"),
            })
            .collect())
    }

    async fn send_chat_turn(&self, history: &[ChatTurn], message: &str) -> Result<String> {
        self.chat_history_lens.lock().unwrap().push(history.len());
        tokio::task::yield_now().await;
        self.chat_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("Re: {message}")))
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Local>>,
}

impl ManualClock {
    pub fn at(year: i32, month: u32, day: u32) -> Self {
        let now = Local
            .with_ymd_and_hms(year, month, day, 9, 0, 0)
            .single()
            .unwrap();
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, year: i32, month: u32, day: u32) {
        *self.now.lock().unwrap() = Local
            .with_ymd_and_hms(year, month, day, 9, 0, 0)
            .single()
            .unwrap();
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap()
    }
}

pub async fn credential_with_key() -> Arc<SelectedCredential> {
    let credential = Arc::new(SelectedCredential::new());
    credential.select("test-key").await;
    credential
}
