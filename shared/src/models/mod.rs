//! Reference models
//!
//! Terminal/system information, the menu, customer ledgers and couriers.
//! Shared between the server payloads and the client session.

pub mod courier;
pub mod customer;
pub mod menu;
pub mod system_info;

// Re-exports
pub use courier::*;
pub use customer::*;
pub use menu::*;
pub use system_info::*;
