//! Marker lifecycle management.
//!
//! `MarkerLifecycleManager` is the only component that mutates the map
//! surface. Each accepted location set arrives as a `MapSnapshot` tagged with
//! its generation; reconciling it replaces every persistent marker of the
//! previous generation and drops a short-lived pulse on each new location.

use mapchat_core::markup::popup_html;
use mapchat_core::{
    GeoLocation, Generation, MapSnapshot, MapSurface, OverlayHandle, SurfaceError, ViewState,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// A persistent marker currently mounted on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MountedMarker {
    pub location: GeoLocation,
    pub handle: OverlayHandle,
}

/// The persistent markers on the surface and the generation they belong to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MountedSet {
    pub generation: Generation,
    pub markers: Vec<MountedMarker>,
}

/// Result of one reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// The surface now shows exactly this generation.
    Applied { generation: Generation, markers: usize },
    /// A newer generation was already applied or requested; nothing of this
    /// generation remains on the surface.
    Stale {
        generation: Generation,
        latest: Generation,
    },
    /// The surface failed. Partial mounts were rolled back and the generation
    /// is recorded as mounted with no markers.
    Abandoned {
        generation: Generation,
        error: SurfaceError,
    },
}

impl ReconcileOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Keeps the overlays on a `MapSurface` in agreement with the active marker set.
///
/// # Ordering
///
/// Reconciliations are serialized by an async mutex held for the whole
/// unmount-then-mount transaction, so readers of [`mounted`](Self::mounted)
/// never see a mix of two generations. A reconciliation is discarded when its
/// generation is not newer than the applied one, or when a newer generation
/// is requested while its mounts are still in progress.
///
/// Pulse overlays are removed by a timer that is independent of later
/// reconciliations.
pub struct MarkerLifecycleManager {
    surface: Arc<dyn MapSurface>,
    pulse_lifetime: Duration,
    /// Highest generation ever passed to `reconcile`.
    latest_requested: AtomicU64,
    mounted: Mutex<MountedSet>,
    live_pulses: Arc<AtomicUsize>,
}

impl MarkerLifecycleManager {
    pub fn new(surface: Arc<dyn MapSurface>, pulse_lifetime: Duration) -> Self {
        Self {
            surface,
            pulse_lifetime,
            latest_requested: AtomicU64::new(Generation::INITIAL.0),
            mounted: Mutex::new(MountedSet::default()),
            live_pulses: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Moves the viewport without touching markers, e.g. for the initial view.
    pub async fn show_view(&self, view: ViewState, animate: bool) -> Result<(), SurfaceError> {
        let _guard = self.mounted.lock().await;
        self.surface.set_view(view.center, view.zoom, animate).await
    }

    /// Brings the surface in line with `snapshot`.
    pub async fn reconcile(&self, snapshot: MapSnapshot) -> ReconcileOutcome {
        let generation = snapshot.generation;
        self.latest_requested
            .fetch_max(generation.0, Ordering::SeqCst);

        let mut mounted = self.mounted.lock().await;

        if generation <= mounted.generation || self.is_superseded(generation) {
            let latest = self.latest().max(mounted.generation);
            tracing::debug!(
                "[MarkerLifecycle] {} is stale (latest {}), discarding",
                generation,
                latest
            );
            return ReconcileOutcome::Stale { generation, latest };
        }

        tracing::debug!(
            "[MarkerLifecycle] Reconciling {} -> {} ({} location(s))",
            mounted.generation,
            generation,
            snapshot.locations.len()
        );

        // Old markers go first so the surface never carries two generations.
        for marker in mounted.markers.drain(..) {
            if let Err(e) = self.surface.unmount(marker.handle).await {
                tracing::warn!(
                    "[MarkerLifecycle] Failed to unmount {} ({}): {}",
                    marker.handle,
                    marker.location.name,
                    e
                );
            }
        }

        let mut fresh = Vec::with_capacity(snapshot.locations.len());
        for location in &snapshot.locations {
            let mounted_marker = self
                .surface
                .mount_marker(location.position(), &popup_html(&location.name))
                .await;
            match mounted_marker {
                Ok(handle) => fresh.push(MountedMarker {
                    location: location.clone(),
                    handle,
                }),
                Err(error) => {
                    tracing::warn!(
                        "[MarkerLifecycle] Mount failed for '{}' in {}: {}",
                        location.name,
                        generation,
                        error
                    );
                    self.roll_back(fresh).await;
                    // The previous markers are already gone.
                    mounted.generation = generation;
                    return ReconcileOutcome::Abandoned { generation, error };
                }
            }

            if self.is_superseded(generation) {
                let latest = self.latest();
                tracing::debug!(
                    "[MarkerLifecycle] {} superseded by {} mid-mount, rolling back",
                    generation,
                    latest
                );
                self.roll_back(fresh).await;
                mounted.generation = generation;
                return ReconcileOutcome::Stale { generation, latest };
            }
        }

        let count = fresh.len();
        mounted.generation = generation;
        mounted.markers = fresh;

        if let Err(e) = self
            .surface
            .set_view(snapshot.view.center, snapshot.view.zoom, true)
            .await
        {
            tracing::warn!("[MarkerLifecycle] set_view failed for {}: {}", generation, e);
        }

        for location in &snapshot.locations {
            self.spawn_pulse(generation, location).await;
        }

        tracing::info!(
            "[MarkerLifecycle] Applied {} with {} marker(s)",
            generation,
            count
        );
        ReconcileOutcome::Applied {
            generation,
            markers: count,
        }
    }

    /// The persistent markers as of the last completed reconciliation.
    pub async fn mounted(&self) -> MountedSet {
        self.mounted.lock().await.clone()
    }

    /// Number of pulse overlays mounted and not yet expired.
    pub fn live_pulses(&self) -> usize {
        self.live_pulses.load(Ordering::SeqCst)
    }

    fn latest(&self) -> Generation {
        Generation(self.latest_requested.load(Ordering::SeqCst))
    }

    fn is_superseded(&self, generation: Generation) -> bool {
        self.latest() > generation
    }

    async fn roll_back(&self, markers: Vec<MountedMarker>) {
        for marker in markers {
            if let Err(e) = self.surface.unmount(marker.handle).await {
                tracing::warn!(
                    "[MarkerLifecycle] Rollback could not unmount {}: {}",
                    marker.handle,
                    e
                );
            }
        }
    }

    async fn spawn_pulse(&self, generation: Generation, location: &GeoLocation) {
        let handle = match self.surface.mount_pulse(location.position()).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::debug!(
                    "[MarkerLifecycle] Pulse for '{}' not shown: {}",
                    location.name,
                    e
                );
                return;
            }
        };
        self.live_pulses.fetch_add(1, Ordering::SeqCst);

        let surface = Arc::clone(&self.surface);
        let live_pulses = Arc::clone(&self.live_pulses);
        let lifetime = self.pulse_lifetime;
        tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            if let Err(e) = surface.unmount(handle).await {
                tracing::warn!(
                    "[MarkerLifecycle] Pulse {} of {} did not unmount: {}",
                    handle,
                    generation,
                    e
                );
            }
            live_pulses.fetch_sub(1, Ordering::SeqCst);
        });
    }
}
