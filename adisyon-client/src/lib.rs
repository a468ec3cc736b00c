//! Adisyon Client - order and payment state for a POS terminal
//!
//! Keeps the terminal's view of every order in sync with server pushes and
//! runs the multi-tender payment flow. Transport and rendering live outside.

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod money;
pub mod notify;
pub mod payment;
pub mod selection;
pub mod session;
pub mod store;

pub use config::{ClientConfig, TerminalProfile};
pub use error::{ClientError, ClientResult};
pub use gateway::{Envelope, Gateway, GatewayConfig, GatewayError, GatewayEvent, MemoryGateway, ServerHandle};
pub use http::{CustomerLookup, HttpCustomerDirectory};
pub use notify::{NoticeLevel, Notifier, UiEvent};
pub use payment::{FinalizeOutcome, PaymentEngine, PaymentPhase, PaymentRequest, PaymentView, TenderField};
pub use selection::Selection;
pub use session::{PosSession, drive};
pub use store::{OrderSnapshot, OrderStore, TableIndicator};

// Re-export shared types for convenience
pub use shared::message::{ClientEvent, ServerEvent};
pub use shared::models::{Courier, CustomerAccount};
pub use shared::order::{LineKind, LineStatus, OrderLine};
pub use shared::payment::TenderMethod;
