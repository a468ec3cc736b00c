//! Connection gateway abstraction
//!
//! The real-time channel itself (socket, reconnects) lives outside this
//! crate. The core only emits named events and consumes [`GatewayEvent`]s.

mod memory;

pub use memory::{MemoryGateway, ServerHandle};

use serde_json::Value;
use shared::message::ClientEvent;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Gateway error type
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Channel is down or the peer went away
    #[error("Gateway closed")]
    Closed,

    /// Event could not be encoded
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Transport-specific failure
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Outbound event stamped with a request id
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub request_id: Uuid,
    pub event: ClientEvent,
}

impl Envelope {
    pub fn new(event: ClientEvent) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event,
        }
    }

    /// Event name and JSON payload as put on the wire
    pub fn to_wire(&self) -> Result<(&'static str, Value), GatewayError> {
        Ok((self.event.name(), self.event.payload()?))
    }
}

/// Inbound gateway notification
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    Connected,
    Disconnected,
    /// Named event with its undecoded payload
    Raw { name: String, payload: Value },
}

impl GatewayEvent {
    pub fn raw(name: impl Into<String>, payload: Value) -> Self {
        Self::Raw {
            name: name.into(),
            payload,
        }
    }
}

/// Outbound side of the real-time channel
///
/// `emit` never blocks; replies arrive later as their own inbound events.
pub trait Gateway: Send + Sync {
    /// Send an event, returning its request id
    fn emit(&self, event: ClientEvent) -> Result<Uuid, GatewayError>;
}

impl<G: Gateway + ?Sized> Gateway for Arc<G> {
    fn emit(&self, event: ClientEvent) -> Result<Uuid, GatewayError> {
        (**self).emit(event)
    }
}

/// Reconnection policy handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Reconnect automatically after a drop
    pub reconnect: bool,
    /// Fixed delay between attempts
    pub reconnect_delay: Duration,
    /// Attempts before giving up (0 = unlimited)
    pub max_reconnect_attempts: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            reconnect: true,
            reconnect_delay: Duration::from_millis(1000),
            max_reconnect_attempts: 10,
        }
    }
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never reconnect
    pub fn no_reconnect() -> Self {
        Self {
            reconnect: false,
            ..Self::default()
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Delay before reconnect attempt `attempt` (1-based), `None` once
    /// the policy gives up
    ///
    /// Read by the socket transport's reconnect loop; the session itself
    /// only sees the resulting `Connected`/`Disconnected` events.
    pub fn retry_delay(&self, attempt: u32) -> Option<Duration> {
        if !self.reconnect || attempt == 0 {
            return None;
        }
        if self.max_reconnect_attempts != 0 && attempt > self.max_reconnect_attempts {
            return None;
        }
        Some(self.reconnect_delay)
    }
}
