//! Application layer for MapChat.
//!
//! This crate turns user submissions into transcript entries and map state:
//! the exchange coordinator drives the backend round trip, the view
//! synchronizer (from the core crate) derives the viewport, and the marker
//! lifecycle manager reconciles overlays on the map surface.

pub mod exchange;
pub mod marker_lifecycle;
pub mod session;

pub use exchange::{ExchangeCoordinator, ExchangeOutcome, MapUpdate, Submission};
pub use marker_lifecycle::{MarkerLifecycleManager, MountedMarker, MountedSet, ReconcileOutcome};
pub use session::MapChatSession;
