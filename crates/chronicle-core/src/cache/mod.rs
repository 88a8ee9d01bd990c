//! Weekly cache domain: entries, windows and the storage contract.

mod model;
mod storage;
mod window;

pub use model::{CacheEntry, HERO_COVER_KEY, ISSUE_SNAPSHOT_KEY};
pub use storage::KeyValueStorage;
pub use window::{current_window_id, issue_window_id, week_start};
