use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Menu, SystemInfo};
use crate::order::{OrderId, OrderLine};

/// Every order's lines, keyed by order id
pub type OrderMap = HashMap<OrderId, Vec<OrderLine>>;

// ==================== Inbound Payloads ====================

/// `initial_data` payload (server -> client, sent on connect)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitialDataPayload {
    #[serde(default)]
    pub system: SystemInfo,
    #[serde(default)]
    pub menu: Menu,
    #[serde(default)]
    pub adisyonlar: OrderMap,
}

/// `masa_selected` / `masa_update` payload
///
/// `total` is informational only; clients recompute it from `items`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderPayload {
    pub masa: OrderId,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    /// Origin of the change ("terminal" for handheld pushes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// `payment_completed` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentCompletedPayload {
    pub masa: OrderId,
    /// Human-readable payment type
    #[serde(rename = "type", default)]
    pub payment_type: String,
    #[serde(default)]
    pub is_partial: bool,
}

/// `courier_assigned` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourierAssignedPayload {
    pub masa: OrderId,
    #[serde(default)]
    pub kurye_ad: String,
    #[serde(default)]
    pub kurye_tel: String,
}

/// Generic `error` / `success` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MessagePayload {
    #[serde(default)]
    pub message: String,
}

impl MessagePayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
