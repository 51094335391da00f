//! Map surface boundary.
//!
//! The rendering engine is driven through these four commands. Handles are
//! opaque to the caller and only ever passed back to `unmount`.

use crate::error::SurfaceError;
use crate::geo::LatLng;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle of an overlay mounted on a map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayHandle(pub u64);

impl fmt::Display for OverlayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay-{}", self.0)
    }
}

/// A drawable map.
///
/// Mount operations may be slow (they are async); callers that need several
/// operations to appear as one change must serialize them themselves.
#[async_trait]
pub trait MapSurface: Send + Sync {
    /// Moves the viewport.
    async fn set_view(&self, center: LatLng, zoom: u8, animate: bool) -> Result<(), SurfaceError>;

    /// Mounts a persistent marker with a label popup, opened immediately.
    async fn mount_marker(
        &self,
        position: LatLng,
        popup_html: &str,
    ) -> Result<OverlayHandle, SurfaceError>;

    /// Mounts a decorative pulse overlay.
    async fn mount_pulse(&self, position: LatLng) -> Result<OverlayHandle, SurfaceError>;

    /// Removes an overlay. Unmounting an unknown handle is not an error.
    async fn unmount(&self, handle: OverlayHandle) -> Result<(), SurfaceError>;
}
