//! Shared types for order lines

use serde::{Deserialize, Serialize};

/// Table or package slot label ("Masa 3", "Paket 1")
pub type OrderId = String;

// ============================================================================
// Line Kind / Status
// ============================================================================

/// Line kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LineKind {
    /// Regular billed line
    #[default]
    #[serde(rename = "normal")]
    Normal,
    /// Complimentary line (ikram)
    #[serde(rename = "ikram")]
    Complimentary,
}

/// Kitchen status of a line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LineStatus {
    /// Waiting in the kitchen
    #[default]
    #[serde(rename = "bekliyor")]
    Pending,
    /// Prepared; the line can only be cancelled from now on
    #[serde(rename = "hazir")]
    Ready,
}

// ============================================================================
// Order Line
// ============================================================================

fn default_quantity() -> i32 {
    1
}

/// One product entry on an order
///
/// Field names follow the server's wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    /// Product name
    #[serde(rename = "urun")]
    pub product_name: String,
    /// Unit price
    #[serde(rename = "fiyat")]
    pub unit_price: f64,
    /// Quantity
    #[serde(rename = "adet", default = "default_quantity")]
    pub quantity: i32,
    /// Line kind
    #[serde(rename = "tip", default)]
    pub kind: LineKind,
    /// Kitchen status
    #[serde(rename = "durum", default)]
    pub status: LineStatus,
    /// Server-assigned line id (required for cancellation)
    #[serde(rename = "uid", default, skip_serializing_if = "Option::is_none")]
    pub server_assigned_id: Option<String>,
    /// Staff member who entered the line
    #[serde(rename = "garson", default)]
    pub staff_name: String,
    /// Entry time as sent by the server
    #[serde(rename = "saat", default)]
    pub timestamp: String,
}

impl OrderLine {
    /// Create a pending normal line
    pub fn new(product_name: impl Into<String>, unit_price: f64, quantity: i32) -> Self {
        Self {
            product_name: product_name.into(),
            unit_price,
            quantity,
            kind: LineKind::Normal,
            status: LineStatus::Pending,
            server_assigned_id: None,
            staff_name: String::new(),
            timestamp: String::new(),
        }
    }

    /// Set the server-assigned id
    pub fn with_id(mut self, uid: impl Into<String>) -> Self {
        self.server_assigned_id = Some(uid.into());
        self
    }

    /// Set the kitchen status
    pub fn with_status(mut self, status: LineStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the line kind
    pub fn with_kind(mut self, kind: LineKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if the kitchen marked this line ready
    pub fn is_ready(&self) -> bool {
        self.status == LineStatus::Ready
    }

    /// Check if this is a complimentary line
    pub fn is_complimentary(&self) -> bool {
        self.kind == LineKind::Complimentary
    }
}
