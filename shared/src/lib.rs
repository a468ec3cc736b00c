//! Shared types for the Adisyon POS client
//!
//! Wire types exchanged with the restaurant server over the real-time
//! channel: named inbound/outbound events, order lines, payment tenders
//! and the small reference models (menu, terminal info, customer ledgers).

pub mod message;
pub mod models;
pub mod order;
pub mod payment;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use message::{ClientEvent, ServerEvent, WireError};
pub use order::{LineKind, LineStatus, OrderId, OrderLine};
pub use payment::{FinalizePaymentPayload, PaymentTender, TenderMethod};
