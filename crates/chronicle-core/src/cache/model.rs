use serde::{Deserialize, Serialize};

/// Storage key of the weekly cover image.
pub const HERO_COVER_KEY: &str = "weekly_hero_image";
/// Storage key of the last settled issue.
pub const ISSUE_SNAPSHOT_KEY: &str = "weekly_comics_data";

/// A cached payload tagged with the issue window it was written in.
///
/// Serialized as `{"windowId": "...", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub window_id: String,
    pub data: T,
}

impl<T> CacheEntry<T> {
    pub fn new(window_id: impl Into<String>, data: T) -> Self {
        Self {
            window_id: window_id.into(),
            data,
        }
    }

    /// An entry is only valid inside the window it was written in.
    pub fn is_valid_for(&self, window_id: &str) -> bool {
        self.window_id == window_id
    }
}
