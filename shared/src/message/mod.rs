//! Real-time channel event types
//!
//! The server and its clients exchange named events, each carrying a JSON
//! payload. `ServerEvent` covers what the server pushes, `ClientEvent`
//! what a terminal emits. Both are adjacently tagged so a (name, payload)
//! pair maps onto a variant without hand-written matching.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::models::{Courier, SystemInfo};
use crate::order::OrderId;
use crate::payment::FinalizePaymentPayload;

pub mod payload;
pub use payload::*;

/// Wire decode/encode error
#[derive(Debug, Error)]
pub enum WireError {
    /// Event name not understood by this client
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Payload did not match the event's shape
    #[error("Invalid payload for {event}: {source}")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Event names the server pushes
pub const SERVER_EVENT_NAMES: [&str; 9] = [
    "initial_data",
    "system_info",
    "masa_selected",
    "masa_update",
    "adisyonlar_update",
    "payment_completed",
    "courier_assigned",
    "error",
    "success",
];

// ==================== Inbound ====================

/// Server -> client event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    InitialData(InitialDataPayload),
    SystemInfo(SystemInfo),
    MasaSelected(OrderPayload),
    MasaUpdate(OrderPayload),
    AdisyonlarUpdate(OrderMap),
    PaymentCompleted(PaymentCompletedPayload),
    CourierAssigned(CourierAssignedPayload),
    Error(MessagePayload),
    Success(MessagePayload),
}

impl ServerEvent {
    /// Decode a named channel event
    pub fn decode(name: &str, payload: Value) -> Result<Self, WireError> {
        if !SERVER_EVENT_NAMES.contains(&name) {
            return Err(WireError::UnknownEvent(name.to_string()));
        }

        // error/success may arrive without a body
        let payload = match payload {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        serde_json::from_value(serde_json::json!({ "event": name, "data": payload })).map_err(
            |source| WireError::Payload {
                event: name.to_string(),
                source,
            },
        )
    }

    /// Encode into a (name, payload) pair
    pub fn encode(&self) -> Result<(&'static str, Value), WireError> {
        let name = self.name();
        let payload = split_payload(self).map_err(|source| WireError::Payload {
            event: name.to_string(),
            source,
        })?;
        Ok((name, payload))
    }

    /// Channel event name
    pub fn name(&self) -> &'static str {
        match self {
            Self::InitialData(_) => "initial_data",
            Self::SystemInfo(_) => "system_info",
            Self::MasaSelected(_) => "masa_selected",
            Self::MasaUpdate(_) => "masa_update",
            Self::AdisyonlarUpdate(_) => "adisyonlar_update",
            Self::PaymentCompleted(_) => "payment_completed",
            Self::CourierAssigned(_) => "courier_assigned",
            Self::Error(_) => "error",
            Self::Success(_) => "success",
        }
    }
}

// ==================== Outbound ====================

/// Client -> server event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    SelectMasa {
        masa: OrderId,
    },
    AddItem {
        urun: String,
        fiyat: f64,
    },
    RemoveItem {
        index: usize,
    },
    CancelItem {
        masa: OrderId,
        uid: String,
    },
    FinalizePayment(FinalizePaymentPayload),
    TransferTable {
        source_masa: OrderId,
        target_masa: OrderId,
    },
    AssignCourier {
        masa: OrderId,
        #[serde(flatten)]
        courier: Courier,
    },
}

impl ClientEvent {
    /// Channel event name
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectMasa { .. } => "select_masa",
            Self::AddItem { .. } => "add_item",
            Self::RemoveItem { .. } => "remove_item",
            Self::CancelItem { .. } => "cancel_item",
            Self::FinalizePayment(_) => "finalize_payment",
            Self::TransferTable { .. } => "transfer_table",
            Self::AssignCourier { .. } => "assign_courier",
        }
    }

    /// JSON payload sent under `name()`
    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        split_payload(self)
    }
}

impl fmt::Display for ClientEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Strip the adjacent tag and keep the content
fn split_payload<T: Serialize>(event: &T) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(event)?;
    Ok(value
        .get_mut("data")
        .map(Value::take)
        .unwrap_or(Value::Null))
}
