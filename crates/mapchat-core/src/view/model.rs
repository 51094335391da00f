//! Viewport and marker-set state.

use crate::config::{DEFAULT_CENTER, DEFAULT_ZOOM};
use crate::geo::{GeoLocation, LatLng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag of one replacement of the active marker set.
///
/// Generation 0 means no location set has been accepted yet.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Generation(pub u64);

impl Generation {
    pub const INITIAL: Self = Self(0);

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// Center and zoom level of the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub center: LatLng,
    pub zoom: u8,
}

impl ViewState {
    pub const fn new(center: LatLng, zoom: u8) -> Self {
        Self { center, zoom }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER, DEFAULT_ZOOM)
    }
}

/// The locations currently driving the map overlays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveMarkerSet {
    pub generation: Generation,
    pub locations: Vec<GeoLocation>,
}

/// Everything the marker lifecycle needs to bring the map surface in line
/// with one accepted location set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub generation: Generation,
    pub view: ViewState,
    pub locations: Vec<GeoLocation>,
}
