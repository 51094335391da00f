//! Map view domain module.
//!
//! - `model`: viewport and marker-set state (`ViewState`, `ActiveMarkerSet`, `MapSnapshot`)
//! - `synchronizer`: the `ViewSynchronizer` that derives them from accepted location sets

mod model;
mod synchronizer;

pub use model::{ActiveMarkerSet, Generation, MapSnapshot, ViewState};
pub use synchronizer::ViewSynchronizer;
