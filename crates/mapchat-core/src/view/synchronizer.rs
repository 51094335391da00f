use super::model::{ActiveMarkerSet, Generation, MapSnapshot, ViewState};
use crate::backend::ExchangeId;
use crate::config::FOCUS_ZOOM;
use crate::geo::GeoLocation;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct MapState {
    view: ViewState,
    markers: ActiveMarkerSet,
    /// Exchange that produced `markers`, if it came through `accept_from`.
    source: Option<ExchangeId>,
}

/// Owns the viewport and the active marker set.
///
/// Both change together, and only when a non-empty location set is accepted.
/// An empty set is not "clear the map"; it leaves everything untouched.
#[derive(Debug)]
pub struct ViewSynchronizer {
    state: Mutex<MapState>,
    focus_zoom: u8,
}

impl ViewSynchronizer {
    pub fn new(initial_view: ViewState, focus_zoom: u8) -> Self {
        Self {
            state: Mutex::new(MapState {
                view: initial_view,
                markers: ActiveMarkerSet::default(),
                source: None,
            }),
            focus_zoom,
        }
    }

    /// Replaces the active set with `locations` and centers on the first one.
    ///
    /// Returns the snapshot for the new generation, or `None` when `locations`
    /// is empty.
    pub fn accept(&self, locations: Vec<GeoLocation>) -> Option<MapSnapshot> {
        let mut state = self.lock();
        self.apply(&mut state, locations, None)
    }

    /// Like [`accept`](Self::accept), but refuses a set coming from an exchange
    /// older than the one that produced the current set.
    pub fn accept_from(
        &self,
        exchange: ExchangeId,
        locations: Vec<GeoLocation>,
    ) -> Option<MapSnapshot> {
        let mut state = self.lock();
        if let Some(current) = state.source {
            if exchange < current {
                tracing::warn!(
                    "[ViewSynchronizer] Discarding locations from {} (map already shows {})",
                    exchange,
                    current
                );
                return None;
            }
        }
        self.apply(&mut state, locations, Some(exchange))
    }

    fn apply(
        &self,
        state: &mut MapState,
        locations: Vec<GeoLocation>,
        source: Option<ExchangeId>,
    ) -> Option<MapSnapshot> {
        let first = locations.first()?;
        let view = ViewState::new(first.position(), self.focus_zoom);
        let generation = state.markers.generation.next();

        state.view = view;
        state.markers = ActiveMarkerSet {
            generation,
            locations: locations.clone(),
        };
        if source.is_some() {
            state.source = source;
        }

        tracing::debug!(
            "[ViewSynchronizer] {} accepted: {} location(s), center=({}, {}), zoom={}",
            generation,
            locations.len(),
            view.center.lat,
            view.center.lon,
            view.zoom
        );

        Some(MapSnapshot {
            generation,
            view,
            locations,
        })
    }

    pub fn view(&self) -> ViewState {
        self.lock().view
    }

    pub fn markers(&self) -> ActiveMarkerSet {
        self.lock().markers.clone()
    }

    pub fn generation(&self) -> Generation {
        self.lock().markers.generation
    }

    /// The current view and marker set as one consistent snapshot.
    pub fn snapshot(&self) -> MapSnapshot {
        let state = self.lock();
        MapSnapshot {
            generation: state.markers.generation,
            view: state.view,
            locations: state.markers.locations.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MapState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ViewSynchronizer {
    fn default() -> Self {
        Self::new(ViewState::default(), FOCUS_ZOOM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLng;

    fn cafes() -> Vec<GeoLocation> {
        vec![
            GeoLocation::new("Cafe A", 18.52, 73.85),
            GeoLocation::new("Cafe B", 18.53, 73.86),
        ]
    }

    #[test]
    fn test_initial_state() {
        let sync = ViewSynchronizer::default();
        assert_eq!(sync.view(), ViewState::default());
        assert_eq!(sync.generation(), Generation::INITIAL);
        assert!(sync.markers().locations.is_empty());
    }

    #[test]
    fn test_accept_centers_on_first_location() {
        let sync = ViewSynchronizer::default();
        let snapshot = sync.accept(cafes()).expect("non-empty set is accepted");

        assert_eq!(snapshot.generation, Generation(1));
        assert_eq!(snapshot.view.center, LatLng::new(18.52, 73.85));
        assert_eq!(snapshot.view.zoom, FOCUS_ZOOM);
        assert_eq!(sync.view(), snapshot.view);
        assert_eq!(sync.markers().locations, cafes());
        assert_eq!(sync.snapshot(), snapshot);
    }

    #[test]
    fn test_accept_empty_is_noop() {
        let sync = ViewSynchronizer::default();
        sync.accept(cafes());
        let before = sync.snapshot();

        assert!(sync.accept(Vec::new()).is_none());
        assert_eq!(sync.snapshot(), before);
    }

    #[test]
    fn test_each_accept_replaces_whole_set() {
        let sync = ViewSynchronizer::default();
        sync.accept(cafes());
        let museum = vec![GeoLocation::new("Museum", 48.86, 2.34)];
        let snapshot = sync.accept(museum.clone()).unwrap();

        assert_eq!(snapshot.generation, Generation(2));
        assert_eq!(sync.markers().locations, museum);
        assert_eq!(sync.view().center, LatLng::new(48.86, 2.34));
    }

    #[test]
    fn test_accept_from_discards_older_exchange() {
        let sync = ViewSynchronizer::default();
        let newer = vec![GeoLocation::new("Newer", 10.0, 10.0)];
        sync.accept_from(ExchangeId(2), newer.clone()).unwrap();

        assert!(sync.accept_from(ExchangeId(1), cafes()).is_none());
        assert_eq!(sync.markers().locations, newer);
        assert_eq!(sync.generation(), Generation(1));

        let latest = sync.accept_from(ExchangeId(3), cafes()).unwrap();
        assert_eq!(latest.generation, Generation(2));
    }
}
