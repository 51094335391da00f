//! Domain layer for MapChat.
//!
//! Holds the state containers that the application layer drives (the
//! transcript and the map view), the boundary traits for the assistant
//! backend and the map surface, and the configuration model.

pub mod backend;
pub mod config;
pub mod error;
pub mod geo;
pub mod markup;
pub mod surface;
pub mod transcript;
pub mod view;

// Re-export common types
pub use backend::{AssistantBackend, AssistantReply, ChatRequest, ExchangeId};
pub use error::{ExchangeError, MapChatError, Result, SurfaceError};
pub use geo::{CoordinatePayload, GeoLocation, LatLng};
pub use surface::{MapSurface, OverlayHandle};
pub use transcript::{ChatEntry, EntryId, EntryOrigin, TranscriptStore};
pub use view::{ActiveMarkerSet, Generation, MapSnapshot, ViewState, ViewSynchronizer};
