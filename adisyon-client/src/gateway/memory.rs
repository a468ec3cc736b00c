use serde_json::Value;
use shared::message::{ClientEvent, ServerEvent, WireError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{Envelope, Gateway, GatewayError, GatewayEvent};

/// In-process gateway backed by tokio channels
///
/// Emitted events land in the paired [`ServerHandle`]; whatever the handle
/// pushes arrives on the inbound receiver returned by [`MemoryGateway::channel`].
#[derive(Debug, Clone)]
pub struct MemoryGateway {
    outbound_tx: mpsc::UnboundedSender<Envelope>,
    connected: Arc<AtomicBool>,
}

/// Server side of a [`MemoryGateway`]
#[derive(Debug)]
pub struct ServerHandle {
    inbound_tx: mpsc::UnboundedSender<GatewayEvent>,
    outbound_rx: mpsc::UnboundedReceiver<Envelope>,
    connected: Arc<AtomicBool>,
}

impl MemoryGateway {
    /// Create a connected gateway, its inbound stream and the server handle
    pub fn channel() -> (
        Self,
        mpsc::UnboundedReceiver<GatewayEvent>,
        ServerHandle,
    ) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(true));

        let gateway = Self {
            outbound_tx,
            connected: connected.clone(),
        };
        let server = ServerHandle {
            inbound_tx,
            outbound_rx,
            connected,
        };
        (gateway, inbound_rx, server)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Gateway for MemoryGateway {
    fn emit(&self, event: ClientEvent) -> Result<Uuid, GatewayError> {
        if !self.is_connected() {
            return Err(GatewayError::Closed);
        }
        let envelope = Envelope::new(event);
        let request_id = envelope.request_id;
        tracing::debug!(event = %envelope.event, request_id = %request_id, "Emit");
        self.outbound_tx
            .send(envelope)
            .map_err(|_| GatewayError::Closed)?;
        Ok(request_id)
    }
}

impl ServerHandle {
    /// Restore the link and notify the client
    pub fn connect(&self) -> Result<(), GatewayError> {
        self.connected.store(true, Ordering::SeqCst);
        self.send(GatewayEvent::Connected)
    }

    /// Drop the link; emits fail until `connect`
    pub fn disconnect(&self) -> Result<(), GatewayError> {
        self.connected.store(false, Ordering::SeqCst);
        self.send(GatewayEvent::Disconnected)
    }

    /// Push a typed server event
    pub fn push(&self, event: ServerEvent) -> Result<(), GatewayError> {
        let (name, payload) = event.encode().map_err(|e| match e {
            WireError::Payload { source, .. } => GatewayError::Encode(source),
            other => GatewayError::Transport(other.to_string()),
        })?;
        self.push_raw(name, payload)
    }

    /// Push a named event with an arbitrary payload
    pub fn push_raw(&self, name: &str, payload: Value) -> Result<(), GatewayError> {
        self.send(GatewayEvent::raw(name, payload))
    }

    /// Next emitted envelope, if one is queued
    pub fn try_next_emitted(&mut self) -> Option<Envelope> {
        self.outbound_rx.try_recv().ok()
    }

    /// Wait for the next emitted envelope
    pub async fn next_emitted(&mut self) -> Option<Envelope> {
        self.outbound_rx.recv().await
    }

    /// Drain everything emitted so far
    pub fn drain_emitted(&mut self) -> Vec<Envelope> {
        std::iter::from_fn(|| self.try_next_emitted()).collect()
    }

    fn send(&self, event: GatewayEvent) -> Result<(), GatewayError> {
        self.inbound_tx.send(event).map_err(|_| GatewayError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::MessagePayload;

    #[tokio::test]
    async fn test_emit_reaches_server() {
        let (gateway, _inbound, mut server) = MemoryGateway::channel();

        let request_id = gateway
            .emit(ClientEvent::SelectMasa {
                masa: "Masa 1".to_string(),
            })
            .unwrap();

        let envelope = server.next_emitted().await.unwrap();
        assert_eq!(envelope.request_id, request_id);
        assert_eq!(envelope.event.name(), "select_masa");
    }

    #[tokio::test]
    async fn test_push_reaches_client() {
        let (_gateway, mut inbound, server) = MemoryGateway::channel();

        server
            .push(ServerEvent::Error(MessagePayload::new("Masa dolu")))
            .unwrap();

        match inbound.recv().await.unwrap() {
            GatewayEvent::Raw { name, payload } => {
                assert_eq!(name, "error");
                assert_eq!(payload["message"], "Masa dolu");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_emit_fails_while_disconnected() {
        let (gateway, _inbound, mut server) = MemoryGateway::channel();
        server.disconnect().unwrap();

        let result = gateway.emit(ClientEvent::RemoveItem { index: 0 });
        assert!(matches!(result, Err(GatewayError::Closed)));
        assert!(server.drain_emitted().is_empty());

        server.connect().unwrap();
        assert!(gateway.emit(ClientEvent::RemoveItem { index: 0 }).is_ok());
        assert_eq!(server.drain_emitted().len(), 1);
    }
}
