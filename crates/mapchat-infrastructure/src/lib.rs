//! Infrastructure adapters for MapChat: the HTTP assistant backend and
//! file-based configuration.

pub mod config_service;
pub mod http_backend;
pub mod paths;

pub use config_service::ConfigService;
pub use http_backend::HttpAssistantBackend;
pub use paths::{MapChatPaths, PathError};
