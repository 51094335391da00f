//! Exchange coordination.
//!
//! `ExchangeCoordinator` owns the request lifecycle: it appends the user's
//! entry optimistically, performs the backend round trip on a spawned task,
//! appends exactly one assistant entry (the reply or an error notice), and
//! forwards any well-formed location set to the map.

use crate::marker_lifecycle::{MarkerLifecycleManager, ReconcileOutcome};
use mapchat_core::config::SubmitPolicy;
use mapchat_core::{
    AssistantBackend, ChatEntry, ChatRequest, CoordinatePayload, EntryOrigin, ExchangeError,
    ExchangeId, TranscriptStore, ViewSynchronizer,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::task::JoinHandle;

/// What `submit` did with the input.
#[derive(Debug)]
pub enum Submission {
    /// The input was empty after trimming. Nothing happened.
    Rejected,
    /// Another exchange is outstanding and the policy refuses overlap.
    Busy,
    /// The user entry was appended and the exchange is running.
    Dispatched {
        exchange: ExchangeId,
        user_entry: ChatEntry,
        handle: JoinHandle<ExchangeOutcome>,
    },
}

impl Submission {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched { .. })
    }

    /// Waits for the exchange to finish. Returns `None` if nothing was
    /// dispatched or the exchange task was aborted.
    pub async fn outcome(self) -> Option<ExchangeOutcome> {
        match self {
            Self::Dispatched { handle, .. } => handle.await.ok(),
            Self::Rejected | Self::Busy => None,
        }
    }
}

/// Effect of a reply on the map.
#[derive(Debug, Clone, PartialEq)]
pub enum MapUpdate {
    /// The reply carried no usable locations; the map keeps its state.
    Unchanged,
    /// A newer exchange already moved the map; these locations were dropped.
    Discarded,
    /// The locations were accepted and handed to the marker lifecycle.
    Reconciled(ReconcileOutcome),
}

/// How one exchange ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeOutcome {
    Replied {
        exchange: ExchangeId,
        entry: ChatEntry,
        map: MapUpdate,
    },
    Failed {
        exchange: ExchangeId,
        entry: ChatEntry,
        error: ExchangeError,
    },
}

impl ExchangeOutcome {
    pub fn entry(&self) -> &ChatEntry {
        match self {
            Self::Replied { entry, .. } | Self::Failed { entry, .. } => entry,
        }
    }
}

pub struct ExchangeCoordinator {
    backend: Arc<dyn AssistantBackend>,
    transcript: Arc<TranscriptStore>,
    view: Arc<ViewSynchronizer>,
    markers: Arc<MarkerLifecycleManager>,
    policy: SubmitPolicy,
    error_notice: String,
    in_flight: AtomicUsize,
    last_exchange: AtomicU64,
}

impl ExchangeCoordinator {
    pub fn new(
        backend: Arc<dyn AssistantBackend>,
        transcript: Arc<TranscriptStore>,
        view: Arc<ViewSynchronizer>,
        markers: Arc<MarkerLifecycleManager>,
        policy: SubmitPolicy,
        error_notice: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            transcript,
            view,
            markers,
            policy,
            error_notice: error_notice.into(),
            in_flight: AtomicUsize::new(0),
            last_exchange: AtomicU64::new(0),
        }
    }

    /// True while at least one exchange is outstanding.
    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Submits user text.
    ///
    /// Returns as soon as the user entry is appended; the reply is handled on
    /// a spawned task whose handle is part of the returned `Submission`.
    /// Must be called from within a tokio runtime.
    pub fn submit(self: &Arc<Self>, text: &str) -> Submission {
        let message = text.trim();
        if message.is_empty() {
            tracing::debug!("[ExchangeCoordinator] Ignoring empty submission");
            return Submission::Rejected;
        }
        if !self.try_begin() {
            tracing::debug!("[ExchangeCoordinator] Exchange pending, submission refused");
            return Submission::Busy;
        }

        let exchange = ExchangeId(self.last_exchange.fetch_add(1, Ordering::SeqCst) + 1);
        let user_entry = self.transcript.append(EntryOrigin::User, message);
        tracing::info!(
            "[ExchangeCoordinator] {} dispatched (entry {})",
            exchange,
            user_entry.id
        );

        let coordinator = Arc::clone(self);
        let request = ChatRequest::new(message);
        let handle = tokio::spawn(async move { coordinator.run(exchange, request).await });

        Submission::Dispatched {
            exchange,
            user_entry,
            handle,
        }
    }

    fn try_begin(&self) -> bool {
        match self.policy {
            SubmitPolicy::RejectWhilePending => self
                .in_flight
                .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok(),
            SubmitPolicy::AllowOverlap => {
                self.in_flight.fetch_add(1, Ordering::SeqCst);
                true
            }
        }
    }

    fn finish(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    async fn run(&self, exchange: ExchangeId, request: ChatRequest) -> ExchangeOutcome {
        let result = self.backend.exchange(request).await;

        // The assistant entry is appended before the pending flag drops, so a
        // follow-up submission can never slip its user entry in between.
        match result {
            Ok(reply) => {
                let entry = self
                    .transcript
                    .append(EntryOrigin::Assistant, reply.response.as_str());
                self.finish();
                let map = self.forward_locations(exchange, reply.coordinate_payload()).await;
                tracing::info!("[ExchangeCoordinator] {} replied, map: {:?}", exchange, map);
                ExchangeOutcome::Replied {
                    exchange,
                    entry,
                    map,
                }
            }
            Err(error) => {
                tracing::warn!("[ExchangeCoordinator] {} failed: {}", exchange, error);
                let entry = self
                    .transcript
                    .append(EntryOrigin::Assistant, self.error_notice.as_str());
                self.finish();
                ExchangeOutcome::Failed {
                    exchange,
                    entry,
                    error,
                }
            }
        }
    }

    async fn forward_locations(
        &self,
        exchange: ExchangeId,
        payload: CoordinatePayload,
    ) -> MapUpdate {
        let locations = match payload {
            CoordinatePayload::Locations(locations) => locations,
            CoordinatePayload::Malformed(reason) => {
                tracing::debug!(
                    "[ExchangeCoordinator] {} coordinates ignored: {}",
                    exchange,
                    reason
                );
                return MapUpdate::Unchanged;
            }
            CoordinatePayload::Absent | CoordinatePayload::Empty => {
                tracing::debug!("[ExchangeCoordinator] {} has no coordinates", exchange);
                return MapUpdate::Unchanged;
            }
        };

        match self.view.accept_from(exchange, locations) {
            Some(snapshot) => MapUpdate::Reconciled(self.markers.reconcile(snapshot).await),
            None => MapUpdate::Discarded,
        }
    }
}
