//! Order lines as the server sends them
//!
//! An order (adisyon) is keyed by the table or package slot label and
//! holds an ordered list of lines. The server is authoritative for the
//! lines; clients only derive totals from them.

pub mod types;

// Re-exports
pub use types::*;
