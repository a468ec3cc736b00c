//! Payment reconciliation engine
//!
//! One payment session per open payment modal:
//!
//! - `Idle` -> `Open` on [`PaymentEngine::open`]
//! - `Open` -> `Open` on tender edits, focus auto-fill, equal split
//! - `Open` -> `Idle` on [`PaymentEngine::close`]
//! - `Open` -> `Finalizing` on [`PaymentEngine::finalize`]; back to `Idle`
//!   right after the emit unless a card tender waits for the card
//!   terminal, in which case the session stays `Finalizing` until
//!   `payment_completed` (-> `Idle`) or a remote `error` (-> `Open`)

pub mod request;
pub mod tender;

pub use request::{PaymentRequest, Tender};
pub use tender::{RemainingClass, TenderField, TenderFields, parse_party_count, remaining};

use rust_decimal::Decimal;
use shared::message::ClientEvent;
use shared::payment::TenderMethod;

use crate::gateway::Gateway;
use crate::money::{MONEY_TOLERANCE, ZERO_THRESHOLD};
use crate::selection::Selection;
use crate::store::OrderSnapshot;
use crate::{ClientError, ClientResult};

/// Payment session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentPhase {
    /// No payment modal
    #[default]
    Idle,
    /// Modal open, tenders editable
    Open,
    /// Request emitted, finalize disabled until the server answers
    Finalizing,
}

/// Presentation state of the payment modal
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaymentView {
    pub phase: PaymentPhase,
    pub order_id: Option<String>,
    pub target: Decimal,
    pub cash: Decimal,
    pub card: Decimal,
    pub on_account: Decimal,
    pub remaining: Decimal,
    pub remaining_class: Option<RemainingClass>,
    pub is_partial: bool,
    pub customer: Option<String>,
    pub finalize_enabled: bool,
}

/// What happened after a successful finalize
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// Emitted and closed without waiting for the server
    Closed(PaymentRequest),
    /// Emitted; the modal stays disabled until the card terminal confirms
    AwaitingConfirmation(PaymentRequest),
}

impl FinalizeOutcome {
    pub fn request(&self) -> &PaymentRequest {
        match self {
            Self::Closed(request) | Self::AwaitingConfirmation(request) => request,
        }
    }
}

#[derive(Debug, Clone)]
struct PaymentSession {
    order_id: String,
    target: Decimal,
    is_partial: bool,
    selected_indices: Vec<usize>,
    fields: TenderFields,
    customer: Option<String>,
    phase: PaymentPhase,
}

/// Tender bookkeeping for the payment modal
#[derive(Debug, Clone, Default)]
pub struct PaymentEngine {
    session: Option<PaymentSession>,
    card_terminal_confirmation: bool,
}

impl PaymentEngine {
    pub fn new(card_terminal_confirmation: bool) -> Self {
        Self {
            session: None,
            card_terminal_confirmation,
        }
    }

    pub fn phase(&self) -> PaymentPhase {
        self.session
            .as_ref()
            .map(|s| s.phase)
            .unwrap_or(PaymentPhase::Idle)
    }

    pub fn order_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.order_id.as_str())
    }

    pub fn is_partial(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_partial)
    }

    /// Payable amount of the current session
    pub fn target(&self) -> Option<Decimal> {
        self.session.as_ref().map(|s| s.target)
    }

    pub fn fields(&self) -> Option<&TenderFields> {
        self.session.as_ref().map(|s| &s.fields)
    }

    /// Snapshot for rendering the modal
    pub fn view(&self) -> PaymentView {
        let Some(session) = self.session.as_ref() else {
            return PaymentView::default();
        };
        let (remaining, class) = remaining(session.target, session.fields.sum());
        PaymentView {
            phase: session.phase,
            order_id: Some(session.order_id.clone()),
            target: session.target,
            cash: session.fields.get(TenderField::Cash),
            card: session.fields.get(TenderField::Card),
            on_account: session.fields.get(TenderField::OnAccount),
            remaining,
            remaining_class: Some(class),
            is_partial: session.is_partial,
            customer: session.customer.clone(),
            finalize_enabled: session.phase == PaymentPhase::Open,
        }
    }

    /// Open the payment modal
    ///
    /// The target is the selected lines' amount when `is_partial`, the
    /// order total otherwise. `prefill` puts the whole target into one
    /// field. Returns the target.
    pub fn open(
        &mut self,
        order: Option<&OrderSnapshot>,
        selection: &Selection,
        prefill: Option<TenderField>,
        is_partial: bool,
    ) -> ClientResult<Decimal> {
        if self.phase() == PaymentPhase::Finalizing {
            return Err(ClientError::PaymentInProgress);
        }
        let order = order.ok_or(ClientError::NoOrderSelected)?;
        if order.is_empty() {
            return Err(ClientError::EmptyOrder);
        }

        let (target, selected_indices) = if is_partial {
            let indices = selection.indices_within(order.len());
            if indices.is_empty() {
                return Err(ClientError::EmptyOrder);
            }
            (selection.amount_for(order.lines()), indices)
        } else {
            (order.total(), Vec::new())
        };

        let mut fields = TenderFields::new();
        if let Some(field) = prefill {
            fields.set(field, target);
        }

        tracing::info!(
            order_id = %order.order_id(),
            target = %target,
            is_partial,
            "Payment session opened"
        );

        self.session = Some(PaymentSession {
            order_id: order.order_id().to_string(),
            target,
            is_partial,
            selected_indices,
            fields,
            customer: None,
            phase: PaymentPhase::Open,
        });
        Ok(target)
    }

    /// Set a tender field and rebalance the others
    pub fn edit(&mut self, field: TenderField, amount: Decimal) -> ClientResult<()> {
        let session = self.open_session_mut()?;
        session.fields.set(field, amount);
        session.fields.balance(field, session.target);
        Ok(())
    }

    /// Auto-fill a focused empty field; returns its amount
    pub fn focus(&mut self, field: TenderField) -> ClientResult<Decimal> {
        let session = self.open_session_mut()?;
        Ok(session.fields.autofill(field, session.target))
    }

    /// Put `target / n` into cash and clear the other fields
    ///
    /// Non-positive or non-numeric input leaves the fields untouched.
    pub fn split_equally(&mut self, input: &str) -> ClientResult<Decimal> {
        let session = self.open_session_mut()?;
        let parties =
            parse_party_count(input).ok_or_else(|| ClientError::InvalidPartyCount(input.to_string()))?;
        session.fields.split_equally(session.target, parties);
        Ok(session.fields.get(TenderField::Cash))
    }

    /// Pick or clear the customer ledger for the on-account tender
    pub fn set_customer(&mut self, customer: Option<String>) -> ClientResult<()> {
        let session = self.open_session_mut()?;
        session.customer = customer
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(())
    }

    /// Close the modal and drop uncommitted amounts
    ///
    /// Already emitted requests are not recalled.
    pub fn close(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                tracing::debug!(order_id = %session.order_id, phase = ?session.phase, "Payment session closed");
                true
            }
            None => false,
        }
    }

    /// Validate the tenders and emit `finalize_payment`
    ///
    /// A sum that misses the target by more than `MONEY_TOLERANCE` on a
    /// full payment needs `confirm_mismatch`. An on-account amount needs a
    /// customer. If the gateway refuses the event the session stays open.
    pub fn finalize<G: Gateway + ?Sized>(
        &mut self,
        gateway: &G,
        role: &str,
        confirm_mismatch: bool,
    ) -> ClientResult<FinalizeOutcome> {
        let card_terminal_confirmation = self.card_terminal_confirmation;
        let session = self.open_session_mut()?;

        let entered = session.fields.sum();
        if entered <= ZERO_THRESHOLD {
            return Err(ClientError::ZeroAmount);
        }
        if !session.is_partial
            && (entered - session.target).abs() > MONEY_TOLERANCE
            && !confirm_mismatch
        {
            return Err(ClientError::TenderMismatch {
                entered,
                target: session.target,
            });
        }
        if session.fields.get(TenderField::OnAccount) > ZERO_THRESHOLD && session.customer.is_none() {
            return Err(ClientError::MissingCustomer);
        }

        let request = build_request(session);
        session.phase = PaymentPhase::Finalizing;

        let event = ClientEvent::FinalizePayment(request.to_payload(role));
        if let Err(e) = gateway.emit(event) {
            tracing::warn!(order_id = %request.order_id, error = %e, "Finalize emit failed, re-armed");
            session.phase = PaymentPhase::Open;
            return Err(e.into());
        }

        tracing::info!(
            order_id = %request.order_id,
            amount = %request.tender_sum(),
            target = %request.target_total,
            tenders = request.tenders.len(),
            is_partial = request.is_partial,
            requested_at = request.requested_at,
            "Payment finalized"
        );

        if request.has_card() && card_terminal_confirmation {
            Ok(FinalizeOutcome::AwaitingConfirmation(request))
        } else {
            self.session = None;
            Ok(FinalizeOutcome::Closed(request))
        }
    }

    /// Server confirmed a payment; closes a session for that order
    pub fn on_payment_completed(&mut self, order_id: &str) -> bool {
        if self.order_id() == Some(order_id) {
            self.close()
        } else {
            false
        }
    }

    /// Remote error; re-arms a session waiting for confirmation
    pub fn on_remote_error(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) if session.phase == PaymentPhase::Finalizing => {
                session.phase = PaymentPhase::Open;
                tracing::info!(order_id = %session.order_id, "Payment session re-armed after error");
                true
            }
            _ => false,
        }
    }

    fn open_session_mut(&mut self) -> ClientResult<&mut PaymentSession> {
        match self.session.as_mut() {
            Some(session) if session.phase == PaymentPhase::Open => Ok(session),
            Some(_) => Err(ClientError::PaymentInProgress),
            None => Err(ClientError::NoPaymentSession),
        }
    }
}

fn build_request(session: &PaymentSession) -> PaymentRequest {
    let tenders = session
        .fields
        .entries()
        .map(|(field, amount)| {
            let method = field.method();
            Tender {
                method,
                amount,
                customer_reference: match method {
                    TenderMethod::OnAccount => session.customer.clone(),
                    _ => None,
                },
            }
        })
        .collect();

    PaymentRequest {
        order_id: session.order_id.clone(),
        tenders,
        target_total: session.target,
        is_partial: session.is_partial,
        selected_indices: session
            .is_partial
            .then(|| session.selected_indices.clone()),
        requested_at: chrono::Utc::now().timestamp_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayError, MemoryGateway};
    use shared::order::OrderLine;
    use shared::payment::FinalizePaymentPayload;

    fn d(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn order(total_kola: i32) -> OrderSnapshot {
        OrderSnapshot::with_lines(
            "Masa 3",
            vec![
                OrderLine::new("Kola", 15.0, total_kola),
                OrderLine::new("Doner", 20.0, 1),
            ],
        )
    }

    struct RefusingGateway;

    impl Gateway for RefusingGateway {
        fn emit(&self, _event: ClientEvent) -> Result<uuid::Uuid, GatewayError> {
            Err(GatewayError::Closed)
        }
    }

    #[test]
    fn test_open_requires_order() {
        let mut engine = PaymentEngine::default();
        let err = engine.open(None, &Selection::new(), None, false).unwrap_err();
        assert!(matches!(err, ClientError::NoOrderSelected));
        assert_eq!(engine.phase(), PaymentPhase::Idle);

        let empty = OrderSnapshot::new("Masa 1");
        let err = engine.open(Some(&empty), &Selection::new(), None, false).unwrap_err();
        assert!(matches!(err, ClientError::EmptyOrder));
        assert_eq!(engine.phase(), PaymentPhase::Idle);
    }

    #[test]
    fn test_open_partial_uses_selection() {
        let mut engine = PaymentEngine::default();
        let order = order(2);

        let err = engine.open(Some(&order), &Selection::new(), None, true).unwrap_err();
        assert!(matches!(err, ClientError::EmptyOrder));

        let mut selection = Selection::new();
        selection.toggle(1);
        let target = engine
            .open(Some(&order), &selection, Some(TenderField::Card), true)
            .unwrap();
        assert_eq!(target, d(20));

        let view = engine.view();
        assert_eq!(view.phase, PaymentPhase::Open);
        assert!(view.is_partial);
        assert_eq!(view.card, d(20));
        assert_eq!(view.remaining_class, Some(RemainingClass::Exact));
    }

    #[test]
    fn test_edit_balances() {
        let mut engine = PaymentEngine::default();
        engine
            .open(Some(&order(2)), &Selection::new(), Some(TenderField::Cash), false)
            .unwrap();

        engine.edit(TenderField::Card, d(20)).unwrap();
        let view = engine.view();
        assert_eq!(view.cash, d(30));
        assert_eq!(view.card, d(20));
        assert_eq!(view.remaining, Decimal::ZERO);
    }

    #[test]
    fn test_split_equally_rejects_bad_input() {
        let mut engine = PaymentEngine::default();
        engine
            .open(Some(&order(2)), &Selection::new(), Some(TenderField::Card), false)
            .unwrap();

        for input in ["0", "-2", "abc", ""] {
            let err = engine.split_equally(input).unwrap_err();
            assert!(matches!(err, ClientError::InvalidPartyCount(_)));
        }
        assert_eq!(engine.view().card, d(50));

        assert_eq!(engine.split_equally("2").unwrap(), d(25));
        assert_eq!(engine.view().card, Decimal::ZERO);
    }

    #[test]
    fn test_finalize_on_account_needs_customer() {
        let (gateway, _inbound, mut server) = MemoryGateway::channel();
        let mut engine = PaymentEngine::default();
        engine.open(Some(&order(2)), &Selection::new(), None, false).unwrap();
        engine.edit(TenderField::OnAccount, d(50)).unwrap();

        let err = engine.finalize(&gateway, "kasa", false).unwrap_err();
        assert!(matches!(err, ClientError::MissingCustomer));
        assert!(server.try_next_emitted().is_none());
        assert_eq!(engine.phase(), PaymentPhase::Open);

        engine.set_customer(Some("Ahmet Yilmaz".to_string())).unwrap();
        let outcome = engine.finalize(&gateway, "kasa", false).unwrap();
        let tender = &outcome.request().tenders[0];
        assert_eq!(tender.method, TenderMethod::OnAccount);
        assert_eq!(tender.customer_reference.as_deref(), Some("Ahmet Yilmaz"));
        assert!(server.try_next_emitted().is_some());
    }

    #[test]
    fn test_finalize_zero_amount() {
        let (gateway, _inbound, _server) = MemoryGateway::channel();
        let mut engine = PaymentEngine::default();
        engine.open(Some(&order(2)), &Selection::new(), None, false).unwrap();

        let err = engine.finalize(&gateway, "kasa", true).unwrap_err();
        assert!(matches!(err, ClientError::ZeroAmount));
    }

    #[test]
    fn test_partial_mismatch_needs_no_confirmation() {
        let (gateway, _inbound, mut server) = MemoryGateway::channel();
        let mut engine = PaymentEngine::default();
        let mut selection = Selection::new();
        selection.toggle(0);

        engine.open(Some(&order(2)), &selection, None, true).unwrap();
        engine.edit(TenderField::Cash, d(10)).unwrap();

        let before = chrono::Utc::now().timestamp_millis();
        let outcome = engine.finalize(&gateway, "kasa", false).unwrap();
        assert!(matches!(outcome, FinalizeOutcome::Closed(_)));
        assert_eq!(outcome.request().selected_indices, Some(vec![0]));
        assert!(outcome.request().requested_at >= before);
        assert_eq!(engine.phase(), PaymentPhase::Idle);

        let envelope = server.try_next_emitted().unwrap();
        match envelope.event {
            ClientEvent::FinalizePayment(FinalizePaymentPayload::MultiTender { item_indices, .. }) => {
                assert_eq!(item_indices, Some(vec![0]));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_card_waits_for_terminal() {
        let (gateway, _inbound, _server) = MemoryGateway::channel();
        let mut engine = PaymentEngine::new(true);
        engine
            .open(Some(&order(2)), &Selection::new(), Some(TenderField::Card), false)
            .unwrap();

        let outcome = engine.finalize(&gateway, "kasa", false).unwrap();
        assert!(matches!(outcome, FinalizeOutcome::AwaitingConfirmation(_)));
        assert_eq!(engine.phase(), PaymentPhase::Finalizing);
        assert!(!engine.view().finalize_enabled);

        // Disabled while waiting
        assert!(matches!(
            engine.edit(TenderField::Cash, d(1)),
            Err(ClientError::PaymentInProgress)
        ));

        assert!(engine.on_remote_error());
        assert_eq!(engine.phase(), PaymentPhase::Open);

        engine.finalize(&gateway, "kasa", false).unwrap();
        assert!(!engine.on_payment_completed("Masa 9"));
        assert!(engine.on_payment_completed("Masa 3"));
        assert_eq!(engine.phase(), PaymentPhase::Idle);
    }

    #[test]
    fn test_emit_failure_rearms() {
        let mut engine = PaymentEngine::default();
        engine
            .open(Some(&order(2)), &Selection::new(), Some(TenderField::Cash), false)
            .unwrap();

        let err = engine.finalize(&RefusingGateway, "kasa", false).unwrap_err();
        assert!(matches!(err, ClientError::Gateway(GatewayError::Closed)));
        assert_eq!(engine.phase(), PaymentPhase::Open);
        assert!(engine.view().finalize_enabled);
    }

    #[test]
    fn test_close_discards_amounts() {
        let mut engine = PaymentEngine::default();
        let mut selection = Selection::new();
        selection.toggle(0);
        engine
            .open(Some(&order(2)), &selection, Some(TenderField::Cash), true)
            .unwrap();

        assert!(engine.close());
        assert!(!engine.is_partial());
        assert!(engine.fields().is_none());
        assert_eq!(engine.view(), PaymentView::default());
        assert!(!engine.close());
    }
}
