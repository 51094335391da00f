//! Assistant backend boundary.
//!
//! The backend is an opaque request/response service: one request per user
//! message, answered with reply text and optionally a list of named
//! coordinates.

use crate::error::ExchangeError;
use crate::geo::CoordinatePayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of one dispatched exchange. Strictly increasing per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExchangeId(pub u64);

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exchange-{}", self.0)
    }
}

/// Request body sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A successfully decoded backend reply.
///
/// `coordinates` is kept as raw JSON: a reply whose coordinates are missing or
/// malformed is still a valid reply, it just does not move the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Value>,
}

impl AssistantReply {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            coordinates: None,
        }
    }

    /// Decodes a reply from a raw response body.
    pub fn from_json(body: &str) -> Result<Self, ExchangeError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn coordinate_payload(&self) -> CoordinatePayload {
        CoordinatePayload::classify(self.coordinates.as_ref())
    }
}

/// An abstract assistant service.
///
/// Implementations perform exactly one round trip per call and report every
/// kind of failure as an `ExchangeError`; they never panic on bad input.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Sends `request` and waits for the reply.
    ///
    /// # Returns
    ///
    /// - `Ok(AssistantReply)`: the backend answered with a decodable body
    /// - `Err(ExchangeError)`: transport failure, non-success status or
    ///   malformed body
    async fn exchange(&self, request: ChatRequest) -> Result<AssistantReply, ExchangeError>;
}
