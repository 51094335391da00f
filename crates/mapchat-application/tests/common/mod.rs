//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use mapchat_core::{
    AssistantBackend, AssistantReply, ChatRequest, ExchangeError, GeoLocation, LatLng, MapSurface,
    OverlayHandle, SurfaceError,
};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

pub fn cafes() -> Vec<GeoLocation> {
    vec![
        GeoLocation::new("Cafe A", 18.52, 73.85),
        GeoLocation::new("Cafe B", 18.53, 73.86),
    ]
}

pub fn museums() -> Vec<GeoLocation> {
    vec![GeoLocation::new("Louvre", 48.8606, 2.3376)]
}

pub fn reply_with(text: &str, locations: &[GeoLocation]) -> AssistantReply {
    AssistantReply {
        response: text.to_string(),
        coordinates: Some(json!(locations)),
    }
}

// ============================================================================
// Scripted backend
// ============================================================================

struct Script {
    delay: Duration,
    result: Result<AssistantReply, ExchangeError>,
}

/// Backend that answers each message from a script, optionally after a delay.
/// Unscripted messages fail with a transport error.
#[derive(Default)]
pub struct ScriptedBackend {
    scripts: Mutex<HashMap<String, Script>>,
    received: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, message: &str, reply: AssistantReply) -> Self {
        self.script(message, Duration::ZERO, Ok(reply))
    }

    pub fn reply_after(self, message: &str, delay: Duration, reply: AssistantReply) -> Self {
        self.script(message, delay, Ok(reply))
    }

    pub fn fail(self, message: &str, error: ExchangeError) -> Self {
        self.script(message, Duration::ZERO, Err(error))
    }

    fn script(
        self,
        message: &str,
        delay: Duration,
        result: Result<AssistantReply, ExchangeError>,
    ) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(message.to_string(), Script { delay, result });
        self
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssistantBackend for ScriptedBackend {
    async fn exchange(&self, request: ChatRequest) -> Result<AssistantReply, ExchangeError> {
        self.received.lock().unwrap().push(request.message.clone());
        let (delay, result) = {
            let scripts = self.scripts.lock().unwrap();
            match scripts.get(&request.message) {
                Some(script) => (script.delay, script.result.clone()),
                None => (
                    Duration::ZERO,
                    Err(ExchangeError::transport("connection refused")),
                ),
            }
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

// ============================================================================
// Recording map surface
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    SetView { center: LatLng, zoom: u8, animate: bool },
    MountMarker { handle: OverlayHandle, popup: String },
    MountPulse { handle: OverlayHandle },
    Unmount { handle: OverlayHandle },
}

#[derive(Default)]
struct SurfaceState {
    next_handle: u64,
    markers: HashMap<OverlayHandle, (LatLng, String)>,
    pulses: HashSet<OverlayHandle>,
    ops: Vec<SurfaceOp>,
    peak_markers: usize,
}

/// In-memory map surface that records every operation.
#[derive(Default)]
pub struct RecordingSurface {
    state: Mutex<SurfaceState>,
    mount_delay: Duration,
    failing_popup: Option<String>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every marker mount takes `delay` to complete.
    pub fn with_mount_delay(mut self, delay: Duration) -> Self {
        self.mount_delay = delay;
        self
    }

    /// Mounting a marker whose popup contains `name` fails.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing_popup = Some(name.to_string());
        self
    }

    /// Popups of the persistent markers currently mounted, sorted.
    pub fn marker_popups(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut popups: Vec<String> = state.markers.values().map(|(_, p)| p.clone()).collect();
        popups.sort();
        popups
    }

    pub fn marker_positions(&self) -> Vec<LatLng> {
        let state = self.state.lock().unwrap();
        state.markers.values().map(|(pos, _)| *pos).collect()
    }

    pub fn pulse_count(&self) -> usize {
        self.state.lock().unwrap().pulses.len()
    }

    /// Largest number of persistent markers mounted at the same time.
    pub fn peak_markers(&self) -> usize {
        self.state.lock().unwrap().peak_markers
    }

    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.state.lock().unwrap().ops.clone()
    }

    pub fn last_view(&self) -> Option<(LatLng, u8, bool)> {
        self.ops().into_iter().rev().find_map(|op| match op {
            SurfaceOp::SetView {
                center,
                zoom,
                animate,
            } => Some((center, zoom, animate)),
            _ => None,
        })
    }

    fn allocate(state: &mut SurfaceState) -> OverlayHandle {
        state.next_handle += 1;
        OverlayHandle(state.next_handle)
    }
}

#[async_trait]
impl MapSurface for RecordingSurface {
    async fn set_view(&self, center: LatLng, zoom: u8, animate: bool) -> Result<(), SurfaceError> {
        self.state.lock().unwrap().ops.push(SurfaceOp::SetView {
            center,
            zoom,
            animate,
        });
        Ok(())
    }

    async fn mount_marker(
        &self,
        position: LatLng,
        popup_html: &str,
    ) -> Result<OverlayHandle, SurfaceError> {
        if !self.mount_delay.is_zero() {
            tokio::time::sleep(self.mount_delay).await;
        }
        if let Some(name) = &self.failing_popup {
            if popup_html.contains(name.as_str()) {
                return Err(SurfaceError::new(format!("cannot draw {name}")));
            }
        }

        let mut state = self.state.lock().unwrap();
        let handle = Self::allocate(&mut state);
        state
            .markers
            .insert(handle, (position, popup_html.to_string()));
        state.peak_markers = state.peak_markers.max(state.markers.len());
        state.ops.push(SurfaceOp::MountMarker {
            handle,
            popup: popup_html.to_string(),
        });
        Ok(handle)
    }

    async fn mount_pulse(&self, _position: LatLng) -> Result<OverlayHandle, SurfaceError> {
        let mut state = self.state.lock().unwrap();
        let handle = Self::allocate(&mut state);
        state.pulses.insert(handle);
        state.ops.push(SurfaceOp::MountPulse { handle });
        Ok(handle)
    }

    async fn unmount(&self, handle: OverlayHandle) -> Result<(), SurfaceError> {
        let mut state = self.state.lock().unwrap();
        state.markers.remove(&handle);
        state.pulses.remove(&handle);
        state.ops.push(SurfaceOp::Unmount { handle });
        Ok(())
    }
}
