//! Transcript domain module.
//!
//! - `model`: chat entry types (`ChatEntry`, `EntryOrigin`, `EntryId`)
//! - `store`: the append-only `TranscriptStore`

mod model;
mod store;

pub use model::{ChatEntry, EntryId, EntryOrigin};
pub use store::TranscriptStore;
