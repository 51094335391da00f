//! Configuration model.
//!
//! Every field has a default, so an empty document yields the built-in
//! behavior. Loading from disk lives in the infrastructure crate.

use crate::geo::LatLng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Initial map center (Pune).
pub const DEFAULT_CENTER: LatLng = LatLng::new(18.5204, 73.8567);
/// Initial zoom level.
pub const DEFAULT_ZOOM: u8 = 13;
/// Zoom level used when centering on an accepted location set.
pub const FOCUS_ZOOM: u8 = 12;
/// Lifetime of a pulse overlay.
pub const DEFAULT_PULSE_MILLIS: u64 = 2_000;
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/chat";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_GREETING: &str = "Hello! How can I help you find locations today?";
pub const DEFAULT_ERROR_NOTICE: &str = "Error occurred! Please check if the server is running.";

/// What to do with a submission while another exchange is still outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPolicy {
    /// Ignore it; the input stays disabled until the reply arrives.
    #[default]
    RejectWhilePending,
    /// Dispatch it anyway. Map updates from replies that arrive after a newer
    /// exchange already moved the map are discarded.
    AllowOverlap,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct MapChatConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BackendConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MapConfig {
    #[serde(default = "default_zoom")]
    pub initial_zoom: u8,
    #[serde(default = "default_focus_zoom")]
    pub focus_zoom: u8,
    #[serde(default = "default_pulse_millis")]
    pub pulse_millis: u64,
    #[serde(default = "default_center")]
    pub initial_center: LatLng,
}

impl MapConfig {
    pub fn pulse_lifetime(&self) -> Duration {
        Duration::from_millis(self.pulse_millis)
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_zoom: DEFAULT_ZOOM,
            focus_zoom: FOCUS_ZOOM,
            pulse_millis: DEFAULT_PULSE_MILLIS,
            initial_center: DEFAULT_CENTER,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Assistant entry seeded into a new transcript. `None` or a blank string
    /// starts with an empty transcript.
    #[serde(default = "default_greeting")]
    pub greeting: Option<String>,
    #[serde(default = "default_error_notice")]
    pub error_notice: String,
    #[serde(default)]
    pub submit_policy: SubmitPolicy,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            error_notice: default_error_notice(),
            submit_policy: SubmitPolicy::default(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_center() -> LatLng {
    DEFAULT_CENTER
}

fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}

fn default_focus_zoom() -> u8 {
    FOCUS_ZOOM
}

fn default_pulse_millis() -> u64 {
    DEFAULT_PULSE_MILLIS
}

fn default_greeting() -> Option<String> {
    Some(DEFAULT_GREETING.to_string())
}

fn default_error_notice() -> String {
    DEFAULT_ERROR_NOTICE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: MapChatConfig = toml::from_str("").unwrap();
        assert_eq!(config, MapChatConfig::default());
        assert_eq!(config.backend.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.map.pulse_lifetime(), Duration::from_secs(2));
        assert_eq!(config.chat.submit_policy, SubmitPolicy::RejectWhilePending);
    }

    #[test]
    fn test_partial_sections() {
        let config: MapChatConfig = toml::from_str(
            r#"
[backend]
endpoint = "http://10.0.0.5:8080/chat"

[map]
initial_center = { lat = 48.8566, lon = 2.3522 }
focus_zoom = 15

[chat]
submit_policy = "allow_overlap"
"#,
        )
        .unwrap();

        assert_eq!(config.backend.endpoint, "http://10.0.0.5:8080/chat");
        assert_eq!(config.backend.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.map.initial_center, LatLng::new(48.8566, 2.3522));
        assert_eq!(config.map.initial_zoom, DEFAULT_ZOOM);
        assert_eq!(config.map.focus_zoom, 15);
        assert_eq!(config.chat.submit_policy, SubmitPolicy::AllowOverlap);
        assert_eq!(config.chat.greeting.as_deref(), Some(DEFAULT_GREETING));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = MapChatConfig::default();
        let text = toml::to_string(&config).unwrap();
        let back: MapChatConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
