//! Presentation events
//!
//! The core never touches the UI. It publishes [`UiEvent`]s on a broadcast
//! channel and the presentation layer subscribes.

use rust_decimal::Decimal;
use tokio::sync::broadcast;

use crate::payment::PaymentView;

const CHANNEL_CAPACITY: usize = 256;

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Something the presentation layer should re-render or show
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The active order's lines or total changed
    OrderChanged {
        order_id: String,
        total: Decimal,
        line_count: usize,
    },
    /// A table button indicator needs a refresh
    TableChanged {
        order_id: String,
        occupied: bool,
        total: Decimal,
    },
    /// Partial-payment selection changed
    SelectionChanged { indices: Vec<usize>, amount: Decimal },
    PaymentStateChanged(PaymentView),
    ConnectionChanged(bool),
    Notice { level: NoticeLevel, message: String },
}

/// Broadcast publisher for [`UiEvent`]s
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<UiEvent>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }

    /// Publish an event; nobody listening is fine
    pub fn publish(&self, event: UiEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("No subscribers for ui event: {:?}", e.0);
        }
    }

    pub fn notice(&self, level: NoticeLevel, message: impl Into<String>) {
        self.publish(UiEvent::Notice {
            level,
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.notice(NoticeLevel::Warning, "Lutfen masa secin");

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            UiEvent::Notice {
                level: NoticeLevel::Warning,
                message: "Lutfen masa secin".to_string(),
            }
        );
    }

    #[test]
    fn test_publish_without_subscribers() {
        let notifier = Notifier::new();
        notifier.publish(UiEvent::ConnectionChanged(true));
    }
}
