//! Client error types

use rust_decimal::Decimal;
use shared::payment::TenderMethod;
use thiserror::Error;

use crate::gateway::GatewayError;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    // ========== Validation (handled locally, no network call) ==========
    /// No table/package is selected
    #[error("No order selected")]
    NoOrderSelected,

    /// The order (or the partial selection) has no lines
    #[error("Order is empty")]
    EmptyOrder,

    /// Equal split party count is not a positive integer
    #[error("Invalid party count: {0:?}")]
    InvalidPartyCount(String),

    /// On-account tender without a customer ledger
    #[error("On-account payment requires a customer")]
    MissingCustomer,

    /// Nothing entered in any tender field
    #[error("Payment amount is zero")]
    ZeroAmount,

    /// Line index outside the active order
    #[error("Invalid line index: {0}")]
    InvalidLineIndex(usize),

    /// Ready lines can only be cancelled
    #[error("Line {0} is ready and can only be cancelled")]
    LineLocked(usize),

    /// Line has no server id yet, so it cannot be cancelled
    #[error("Line {0} has no server id")]
    MissingLineId(usize),

    /// Transfer target equals the source
    #[error("Cannot transfer {0} onto itself")]
    SameTable(String),

    /// No payment modal is open
    #[error("No payment session is open")]
    NoPaymentSession,

    /// Finalize already sent, waiting for the server
    #[error("Payment is awaiting confirmation")]
    PaymentInProgress,

    // ========== Needs confirmation (user-overridable) ==========
    /// Entered tenders differ from the payable amount
    #[error("Entered {entered} differs from payable {target}")]
    TenderMismatch { entered: Decimal, target: Decimal },

    /// Single-tender payment waits for the user's confirmation
    #[error("Confirm {method} payment of {total}")]
    PaymentNotConfirmed { method: TenderMethod, total: Decimal },

    // ========== Remote / infrastructure ==========
    /// Gateway rejected an outbound event
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Local profile I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Local validation failure (shown as a warning, nothing was sent)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoOrderSelected
                | Self::EmptyOrder
                | Self::InvalidPartyCount(_)
                | Self::MissingCustomer
                | Self::ZeroAmount
                | Self::InvalidLineIndex(_)
                | Self::LineLocked(_)
                | Self::MissingLineId(_)
                | Self::SameTable(_)
                | Self::NoPaymentSession
                | Self::PaymentInProgress
        )
    }

    /// Needs an explicit user confirmation rather than a correction
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, Self::TenderMismatch { .. } | Self::PaymentNotConfirmed { .. })
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
