//! Chat/map session composition.

use crate::exchange::{ExchangeCoordinator, Submission};
use crate::marker_lifecycle::{MarkerLifecycleManager, MountedSet};
use mapchat_core::config::MapChatConfig;
use mapchat_core::{
    AssistantBackend, EntryOrigin, MapSnapshot, MapSurface, SurfaceError, TranscriptStore,
    ViewState, ViewSynchronizer,
};
use std::sync::Arc;

/// Owns the state of one chat/map session and wires its components together.
///
/// Every piece of state (transcript, view, mounted markers) is held here and
/// injected into the components that mutate it; nothing is global.
pub struct MapChatSession {
    transcript: Arc<TranscriptStore>,
    view: Arc<ViewSynchronizer>,
    markers: Arc<MarkerLifecycleManager>,
    coordinator: Arc<ExchangeCoordinator>,
}

impl MapChatSession {
    /// Creates a session. A non-blank greeting in the config becomes the first
    /// transcript entry.
    pub fn new(
        config: &MapChatConfig,
        backend: Arc<dyn AssistantBackend>,
        surface: Arc<dyn MapSurface>,
    ) -> Self {
        let transcript = Arc::new(TranscriptStore::new());
        let greeting = config
            .chat
            .greeting
            .as_deref()
            .filter(|g| !g.trim().is_empty());
        if let Some(greeting) = greeting {
            transcript.append(EntryOrigin::Assistant, greeting);
        }

        let view = Arc::new(ViewSynchronizer::new(
            ViewState::new(config.map.initial_center, config.map.initial_zoom),
            config.map.focus_zoom,
        ));
        let markers = Arc::new(MarkerLifecycleManager::new(
            surface,
            config.map.pulse_lifetime(),
        ));
        let coordinator = Arc::new(ExchangeCoordinator::new(
            backend,
            Arc::clone(&transcript),
            Arc::clone(&view),
            Arc::clone(&markers),
            config.chat.submit_policy,
            config.chat.error_notice.as_str(),
        ));

        tracing::debug!(
            "[MapChatSession] Created (policy={:?}, greeting={})",
            config.chat.submit_policy,
            greeting.is_some()
        );

        Self {
            transcript,
            view,
            markers,
            coordinator,
        }
    }

    /// Pushes the current view to the surface without animation.
    pub async fn present(&self) -> Result<(), SurfaceError> {
        self.markers.show_view(self.view.view(), false).await
    }

    pub fn submit(&self, text: &str) -> Submission {
        self.coordinator.submit(text)
    }

    pub fn is_pending(&self) -> bool {
        self.coordinator.is_pending()
    }

    pub fn transcript(&self) -> &TranscriptStore {
        &self.transcript
    }

    pub fn map(&self) -> MapSnapshot {
        self.view.snapshot()
    }

    pub async fn mounted_markers(&self) -> MountedSet {
        self.markers.mounted().await
    }

    pub fn live_pulses(&self) -> usize {
        self.markers.live_pulses()
    }
}
