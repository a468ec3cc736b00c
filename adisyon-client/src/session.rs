//! Session context
//!
//! One [`PosSession`] per connection lifetime. It owns the order store, the
//! partial-payment selection and the payment engine, validates user actions
//! before emitting them, and applies inbound server events in arrival order.

use rust_decimal::Decimal;
use shared::message::{
    ClientEvent, CourierAssignedPayload, OrderMap, OrderPayload, PaymentCompletedPayload,
    ServerEvent, WireError,
};
use shared::models::{Courier, CourierAssignment};
use shared::order::OrderLine;
use shared::payment::{FinalizePaymentPayload, TenderMethod};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::gateway::{Gateway, GatewayEvent};
use crate::money::{lines_total, parse_amount, to_decimal};
use crate::notify::{NoticeLevel, Notifier, UiEvent};
use crate::payment::{FinalizeOutcome, PaymentEngine, PaymentPhase, TenderField};
use crate::selection::Selection;
use crate::store::OrderStore;
use crate::{ClientError, ClientResult};

/// Terminal state for one connection lifetime
pub struct PosSession<G: Gateway> {
    gateway: G,
    config: ClientConfig,
    store: OrderStore,
    selection: Selection,
    payment: PaymentEngine,
    notifier: Notifier,
    connected: bool,
}

impl<G: Gateway> PosSession<G> {
    pub fn new(gateway: G, config: ClientConfig) -> Self {
        let payment = PaymentEngine::new(config.card_terminal_confirmation);
        Self {
            gateway,
            config,
            store: OrderStore::new(),
            selection: Selection::new(),
            payment,
            notifier: Notifier::new(),
            connected: true,
        }
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn payment(&self) -> &PaymentEngine {
        &self.payment
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.notifier.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    // ========== Connection lifecycle ==========

    /// Link (re-)established; re-request the active order
    pub fn on_connect(&mut self) {
        self.connected = true;
        tracing::info!(active = ?self.store.active_id(), "Connected");
        self.notifier.publish(UiEvent::ConnectionChanged(true));

        let Some(order_id) = self.store.active_id().map(str::to_string) else {
            return;
        };
        if let Err(e) = self.gateway.emit(ClientEvent::SelectMasa {
            masa: order_id.clone(),
        }) {
            tracing::warn!(order_id = %order_id, error = %e, "Failed to re-request active order");
        }
    }

    /// Link lost; the store is kept, an open payment modal is dropped
    pub fn on_disconnect(&mut self) {
        self.connected = false;
        tracing::warn!("Disconnected");
        if self.payment.close() {
            self.publish_payment();
        }
        self.notifier.publish(UiEvent::ConnectionChanged(false));
    }

    // ========== Order actions ==========

    /// Make an order active and ask the server for its lines
    ///
    /// An open payment modal is closed; a payment awaiting the card
    /// terminal blocks the switch.
    pub fn select_order(&mut self, order_id: &str) -> ClientResult<Uuid> {
        if self.payment.phase() == PaymentPhase::Finalizing {
            return self.report(Err(ClientError::PaymentInProgress));
        }
        if self.payment.close() {
            tracing::info!(order_id = %order_id, "Payment session closed by order switch");
            self.publish_payment();
        }

        self.store.select(order_id);
        self.selection.clear();
        tracing::info!(order_id = %order_id, "Order selected");

        self.publish_selection();
        self.publish_active_order();
        let result = self.emit(ClientEvent::SelectMasa {
            masa: order_id.to_string(),
        });
        self.report(result)
    }

    /// Toggle a line for partial payment; returns whether it is selected
    pub fn toggle_line(&mut self, index: usize) -> ClientResult<bool> {
        let result = self.require_active().map(|_| ());
        self.report(result)?;
        let selected = self.selection.toggle(index);
        self.publish_selection();
        Ok(selected)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.publish_selection();
    }

    pub fn add_item(&mut self, urun: &str, fiyat: f64) -> ClientResult<Uuid> {
        let result = self.require_active().and_then(|_| {
            self.emit(ClientEvent::AddItem {
                urun: urun.to_string(),
                fiyat,
            })
        });
        self.report(result)
    }

    /// Remove a pending line; ready lines can only be cancelled
    pub fn remove_item(&mut self, index: usize) -> ClientResult<Uuid> {
        let result = self.check_remove(index).and_then(|_| self.emit(ClientEvent::RemoveItem { index }));
        self.report(result)
    }

    /// Cancel a line the server already knows
    pub fn cancel_item(&mut self, index: usize) -> ClientResult<Uuid> {
        let result = self
            .check_cancel(index)
            .and_then(|(masa, uid)| self.emit(ClientEvent::CancelItem { masa, uid }));
        self.report(result)
    }

    /// Move the active order onto another table
    pub fn transfer_table(&mut self, target: &str) -> ClientResult<Uuid> {
        let result = self.check_transfer(target).and_then(|source| {
            self.emit(ClientEvent::TransferTable {
                source_masa: source,
                target_masa: target.to_string(),
            })
        });
        self.report(result)
    }

    pub fn assign_courier(&mut self, courier: Courier) -> ClientResult<Uuid> {
        let result = self
            .require_active()
            .map(str::to_string)
            .and_then(|masa| self.emit(ClientEvent::AssignCourier { masa, courier }));
        self.report(result)
    }

    // ========== Payment actions ==========

    /// Open the payment modal for the whole order or the selected lines
    pub fn open_payment(&mut self, prefill: Option<TenderField>, is_partial: bool) -> ClientResult<Decimal> {
        let result = self
            .payment
            .open(self.store.active_snapshot(), &self.selection, prefill, is_partial);
        let target = self.report(result)?;
        self.publish_payment();
        Ok(target)
    }

    pub fn edit_tender(&mut self, field: TenderField, amount: Decimal) -> ClientResult<()> {
        let result = self.payment.edit(field, amount);
        self.report(result)?;
        self.publish_payment();
        Ok(())
    }

    /// Edit a tender from the field's raw text
    pub fn edit_tender_text(&mut self, field: TenderField, text: &str) -> ClientResult<()> {
        self.edit_tender(field, parse_amount(text))
    }

    pub fn focus_tender(&mut self, field: TenderField) -> ClientResult<Decimal> {
        let result = self.payment.focus(field);
        let amount = self.report(result)?;
        self.publish_payment();
        Ok(amount)
    }

    pub fn split_equally(&mut self, parties: &str) -> ClientResult<Decimal> {
        let result = self.payment.split_equally(parties);
        let share = self.report(result)?;
        self.publish_payment();
        Ok(share)
    }

    pub fn set_customer(&mut self, customer: Option<String>) -> ClientResult<()> {
        let result = self.payment.set_customer(customer);
        self.report(result)?;
        self.publish_payment();
        Ok(())
    }

    pub fn close_payment(&mut self) {
        if self.payment.close() {
            self.publish_payment();
        }
    }

    /// Emit `finalize_payment`
    ///
    /// A [`ClientError::TenderMismatch`] asks the caller to confirm and call
    /// again with `confirm_mismatch`.
    pub fn finalize_payment(&mut self, confirm_mismatch: bool) -> ClientResult<FinalizeOutcome> {
        let result = self
            .payment
            .finalize(&self.gateway, &self.config.role, confirm_mismatch);
        let outcome = self.report(result)?;
        self.publish_payment();
        Ok(outcome)
    }

    /// Pay the whole active order with one method (`finalize_payment{type}`)
    ///
    /// Without `confirmed` nothing is sent and
    /// [`ClientError::PaymentNotConfirmed`] carries the amount to confirm.
    pub fn quick_pay(&mut self, method: TenderMethod, confirmed: bool) -> ClientResult<Uuid> {
        let result = self.check_quick_pay(method, confirmed).and_then(|order_id| {
            let request_id = self.emit(ClientEvent::FinalizePayment(FinalizePaymentPayload::legacy(method)))?;
            tracing::info!(order_id = %order_id, method = %method, "Quick payment sent");
            Ok(request_id)
        });
        self.report(result)
    }

    // ========== Inbound ==========

    /// Route a gateway notification
    pub fn dispatch(&mut self, event: GatewayEvent) {
        match event {
            GatewayEvent::Connected => self.on_connect(),
            GatewayEvent::Disconnected => self.on_disconnect(),
            GatewayEvent::Raw { name, payload } => match ServerEvent::decode(&name, payload) {
                Ok(event) => self.handle(event),
                Err(WireError::UnknownEvent(name)) => {
                    tracing::debug!(event = %name, "Ignoring unknown event");
                }
                Err(e) => {
                    tracing::warn!(event = %name, error = %e, "Dropping malformed event");
                }
            },
        }
    }

    /// Apply one server event
    pub fn handle(&mut self, event: ServerEvent) {
        tracing::debug!(event = event.name(), "Inbound");
        match event {
            ServerEvent::InitialData(data) => {
                self.store.set_catalog(data.system, data.menu);
                self.apply_global(data.adisyonlar);
            }
            ServerEvent::SystemInfo(system) => self.store.set_system_info(system),
            ServerEvent::MasaSelected(payload) | ServerEvent::MasaUpdate(payload) => {
                self.apply_order(payload);
            }
            ServerEvent::AdisyonlarUpdate(map) => self.apply_global(map),
            ServerEvent::PaymentCompleted(payload) => self.apply_payment_completed(payload),
            ServerEvent::CourierAssigned(payload) => self.apply_courier(payload),
            ServerEvent::Error(payload) => {
                tracing::error!(message = %payload.message, "Server error");
                if self.payment.on_remote_error() {
                    self.publish_payment();
                }
                self.notifier.notice(NoticeLevel::Error, payload.message);
            }
            ServerEvent::Success(payload) => {
                self.notifier.notice(NoticeLevel::Success, payload.message);
            }
        }
    }

    fn apply_order(&mut self, payload: OrderPayload) {
        let payment_basis = self.open_payment_basis();
        if let Some(sent) = payload.total {
            let sent = to_decimal(sent);
            let computed = lines_total(&payload.items);
            if sent != computed {
                tracing::debug!(order_id = %payload.masa, sent = %sent, computed = %computed, "Ignoring server total");
            }
        }
        if let Some(source) = payload.source.as_deref() {
            tracing::debug!(order_id = %payload.masa, source = %source, "Order pushed");
        }

        let applied = self.store.apply_remote_snapshot(&payload.masa, payload.items);
        if applied.is_active {
            self.publish_active_order();
        } else {
            tracing::debug!(order_id = %payload.masa, "Stored snapshot for inactive order");
        }
        self.publish_table(&payload.masa);
        self.drop_stale_payment(payment_basis);
    }

    fn apply_global(&mut self, map: OrderMap) {
        let payment_basis = self.open_payment_basis();
        let touched = self.store.apply_global_snapshot(map);
        let active_touched = self
            .store
            .active_id()
            .is_some_and(|active| touched.iter().any(|id| id == active));

        for order_id in &touched {
            self.publish_table(order_id);
        }
        if active_touched {
            self.publish_active_order();
        }
        self.drop_stale_payment(payment_basis);
    }

    /// Order and lines an open payment session was computed from
    fn open_payment_basis(&self) -> Option<(String, Vec<OrderLine>)> {
        if self.payment.phase() != PaymentPhase::Open {
            return None;
        }
        let order_id = self.payment.order_id()?;
        let lines = self
            .store
            .snapshot(order_id)
            .map(|order| order.lines().to_vec())
            .unwrap_or_default();
        Some((order_id.to_string(), lines))
    }

    /// Close an open payment session whose order lines were replaced
    fn drop_stale_payment(&mut self, basis: Option<(String, Vec<OrderLine>)>) {
        let Some((order_id, lines)) = basis else {
            return;
        };
        let unchanged = self
            .store
            .snapshot(&order_id)
            .is_some_and(|order| order.lines() == lines.as_slice());
        if unchanged || !self.payment.close() {
            return;
        }

        tracing::warn!(order_id = %order_id, "Order changed under an open payment, session closed");
        self.publish_payment();
        self.notifier.notice(
            NoticeLevel::Warning,
            format!("{} changed, payment cancelled", order_id),
        );
    }

    fn apply_payment_completed(&mut self, payload: PaymentCompletedPayload) {
        tracing::info!(
            order_id = %payload.masa,
            payment_type = %payload.payment_type,
            is_partial = payload.is_partial,
            "Payment completed"
        );

        let is_active = if payload.is_partial {
            self.store.is_active(&payload.masa)
        } else {
            self.store.clear_order(&payload.masa)
        };

        if is_active {
            self.selection.clear();
            self.publish_selection();
            self.publish_active_order();
        }
        self.publish_table(&payload.masa);

        if self.payment.on_payment_completed(&payload.masa) {
            self.publish_payment();
        }

        let message = if payload.payment_type.is_empty() {
            format!("{} payment received", payload.masa)
        } else {
            format!("{} payment received ({})", payload.masa, payload.payment_type)
        };
        self.notifier.notice(NoticeLevel::Success, message);
    }

    fn apply_courier(&mut self, payload: CourierAssignedPayload) {
        tracing::info!(order_id = %payload.masa, courier = %payload.kurye_ad, "Courier assigned");
        let message = format!("{}: {} ({})", payload.masa, payload.kurye_ad, payload.kurye_tel);
        self.store.record_courier(
            &payload.masa,
            CourierAssignment {
                kurye_ad: payload.kurye_ad,
                kurye_tel: payload.kurye_tel,
            },
        );
        self.notifier.notice(NoticeLevel::Info, message);
    }

    // ========== Validation ==========

    fn require_active(&self) -> ClientResult<&str> {
        self.store.active_id().ok_or(ClientError::NoOrderSelected)
    }

    fn check_remove(&self, index: usize) -> ClientResult<()> {
        let order = self.store.active_snapshot().ok_or(ClientError::NoOrderSelected)?;
        let line = order.line(index).ok_or(ClientError::InvalidLineIndex(index))?;
        if line.is_ready() {
            return Err(ClientError::LineLocked(index));
        }
        Ok(())
    }

    fn check_cancel(&self, index: usize) -> ClientResult<(String, String)> {
        let order = self.store.active_snapshot().ok_or(ClientError::NoOrderSelected)?;
        let line = order.line(index).ok_or(ClientError::InvalidLineIndex(index))?;
        let uid = line
            .server_assigned_id
            .clone()
            .ok_or(ClientError::MissingLineId(index))?;
        Ok((order.order_id().to_string(), uid))
    }

    fn check_quick_pay(&self, method: TenderMethod, confirmed: bool) -> ClientResult<String> {
        if self.payment.phase() != PaymentPhase::Idle {
            return Err(ClientError::PaymentInProgress);
        }
        let order = self.store.active_snapshot().ok_or(ClientError::NoOrderSelected)?;
        if order.is_empty() {
            return Err(ClientError::EmptyOrder);
        }
        // The single-tender form carries no customer ledger
        if method == TenderMethod::OnAccount {
            return Err(ClientError::MissingCustomer);
        }
        if !confirmed {
            return Err(ClientError::PaymentNotConfirmed {
                method,
                total: order.total(),
            });
        }
        Ok(order.order_id().to_string())
    }

    fn check_transfer(&self, target: &str) -> ClientResult<String> {
        let order = self.store.active_snapshot().ok_or(ClientError::NoOrderSelected)?;
        if order.is_empty() {
            return Err(ClientError::EmptyOrder);
        }
        if order.order_id() == target {
            return Err(ClientError::SameTable(target.to_string()));
        }
        Ok(order.order_id().to_string())
    }

    // ========== Helpers ==========

    fn emit(&self, event: ClientEvent) -> ClientResult<Uuid> {
        Ok(self.gateway.emit(event)?)
    }

    /// Surface a failed action as a notice
    fn report<T>(&self, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(e) = &result {
            if e.is_validation() {
                tracing::warn!(error = %e, "Action rejected");
                self.notifier.notice(NoticeLevel::Warning, e.to_string());
            } else if e.needs_confirmation() {
                tracing::info!(error = %e, "Confirmation required");
            } else {
                tracing::error!(error = %e, "Action failed");
                self.notifier.notice(NoticeLevel::Error, e.to_string());
            }
        }
        result
    }

    fn publish_active_order(&self) {
        if let Some(order) = self.store.active_snapshot() {
            self.notifier.publish(UiEvent::OrderChanged {
                order_id: order.order_id().to_string(),
                total: order.total(),
                line_count: order.len(),
            });
        }
    }

    fn publish_table(&self, order_id: &str) {
        let indicator = self.store.table_indicator(order_id);
        self.notifier.publish(UiEvent::TableChanged {
            order_id: order_id.to_string(),
            occupied: indicator.occupied,
            total: indicator.total,
        });
    }

    fn publish_selection(&self) {
        let amount = self
            .store
            .active_snapshot()
            .map(|order| self.selection.amount_for(order.lines()))
            .unwrap_or(Decimal::ZERO);
        self.notifier.publish(UiEvent::SelectionChanged {
            indices: self.selection.indices().collect(),
            amount,
        });
    }

    fn publish_payment(&self) {
        self.notifier
            .publish(UiEvent::PaymentStateChanged(self.payment.view()));
    }
}

/// Pump inbound gateway events into the session
///
/// Runs until the inbound channel closes or `shutdown` fires, then hands
/// the session back.
pub async fn drive<G: Gateway>(
    mut session: PosSession<G>,
    mut inbound: mpsc::UnboundedReceiver<GatewayEvent>,
    shutdown: CancellationToken,
) -> PosSession<G> {
    tracing::info!("Session loop started");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Session loop cancelled");
                break;
            }
            event = inbound.recv() => match event {
                Some(event) => session.dispatch(event),
                None => {
                    tracing::info!("Gateway closed, session loop stopped");
                    break;
                }
            },
        }
    }
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MemoryGateway, ServerHandle};
    use shared::order::{LineStatus, OrderLine};

    fn session() -> (PosSession<MemoryGateway>, ServerHandle) {
        let (gateway, _inbound, server) = MemoryGateway::channel();
        (PosSession::new(gateway, ClientConfig::default()), server)
    }

    fn masa_update(masa: &str, items: Vec<OrderLine>) -> ServerEvent {
        ServerEvent::MasaUpdate(OrderPayload {
            masa: masa.to_string(),
            items,
            total: None,
            source: None,
        })
    }

    fn lines() -> Vec<OrderLine> {
        vec![
            OrderLine::new("Kola", 15.0, 2).with_id("u-1"),
            OrderLine::new("Doner", 40.0, 1)
                .with_id("u-2")
                .with_status(LineStatus::Ready),
            OrderLine::new("Ayran", 10.0, 1),
        ]
    }

    #[test]
    fn test_selection_clears_on_order_switch() {
        let (mut session, _server) = session();
        session.select_order("Masa 1").unwrap();
        session.handle(masa_update("Masa 1", lines()));
        session.toggle_line(0).unwrap();
        session.toggle_line(1).unwrap();
        assert_eq!(session.selection().len(), 2);

        session.select_order("Masa 2").unwrap();
        assert!(session.selection().is_empty());
        assert_eq!(session.store().active_id(), Some("Masa 2"));
    }

    #[test]
    fn test_actions_need_active_order() {
        let (mut session, mut server) = session();
        let mut rx = session.subscribe();

        assert!(matches!(session.add_item("Kola", 15.0), Err(ClientError::NoOrderSelected)));
        assert!(matches!(session.remove_item(0), Err(ClientError::NoOrderSelected)));
        assert!(matches!(session.toggle_line(0), Err(ClientError::NoOrderSelected)));
        assert!(server.drain_emitted().is_empty());

        match rx.try_recv().unwrap() {
            UiEvent::Notice { level, .. } => assert_eq!(level, NoticeLevel::Warning),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_remove_and_cancel_rules() {
        let (mut session, mut server) = session();
        session.select_order("Masa 4").unwrap();
        session.handle(masa_update("Masa 4", lines()));
        server.drain_emitted();

        assert!(matches!(session.remove_item(7), Err(ClientError::InvalidLineIndex(7))));
        assert!(matches!(session.remove_item(1), Err(ClientError::LineLocked(1))));
        assert!(matches!(session.cancel_item(2), Err(ClientError::MissingLineId(2))));
        assert!(server.drain_emitted().is_empty());

        session.remove_item(0).unwrap();
        session.cancel_item(1).unwrap();

        let events: Vec<ClientEvent> = server.drain_emitted().into_iter().map(|e| e.event).collect();
        assert_eq!(
            events,
            vec![
                ClientEvent::RemoveItem { index: 0 },
                ClientEvent::CancelItem {
                    masa: "Masa 4".to_string(),
                    uid: "u-2".to_string(),
                },
            ]
        );

        // No optimistic mutation
        assert_eq!(session.store().active_snapshot().unwrap().len(), 3);
    }

    #[test]
    fn test_transfer_rules() {
        let (mut session, mut server) = session();
        session.select_order("Masa 1").unwrap();
        assert!(matches!(session.transfer_table("Masa 2"), Err(ClientError::EmptyOrder)));

        session.handle(masa_update("Masa 1", lines()));
        assert!(matches!(session.transfer_table("Masa 1"), Err(ClientError::SameTable(_))));

        server.drain_emitted();
        session.transfer_table("Masa 2").unwrap();
        assert_eq!(
            server.try_next_emitted().unwrap().event,
            ClientEvent::TransferTable {
                source_masa: "Masa 1".to_string(),
                target_masa: "Masa 2".to_string(),
            }
        );
    }

    #[test]
    fn test_courier_assignment() {
        let (mut session, mut server) = session();
        session.select_order("Paket 2").unwrap();
        server.drain_emitted();

        let courier = Courier {
            kurye_id: "3".to_string(),
            kurye_ad: "Mehmet".to_string(),
            kurye_tel: "5551234".to_string(),
        };
        session.assign_courier(courier.clone()).unwrap();
        assert_eq!(
            server.try_next_emitted().unwrap().event,
            ClientEvent::AssignCourier {
                masa: "Paket 2".to_string(),
                courier,
            }
        );

        session.handle(ServerEvent::CourierAssigned(CourierAssignedPayload {
            masa: "Paket 2".to_string(),
            kurye_ad: "Mehmet".to_string(),
            kurye_tel: "5551234".to_string(),
        }));
        assert_eq!(session.store().courier("Paket 2").unwrap().kurye_ad, "Mehmet");
    }

    #[test]
    fn test_stale_snapshot_keeps_active_order() {
        let (mut session, _server) = session();
        session.select_order("Masa 2").unwrap();
        session.handle(ServerEvent::MasaSelected(OrderPayload {
            masa: "Masa 1".to_string(),
            items: lines(),
            total: Some(999.0),
            source: None,
        }));

        assert_eq!(session.store().active_id(), Some("Masa 2"));
        assert_eq!(session.store().snapshot("Masa 1").unwrap().total(), Decimal::from(80));
    }

    #[test]
    fn test_reconnect_rerequests_active_order() {
        let (mut session, mut server) = session();
        session.select_order("Masa 5").unwrap();
        session.handle(masa_update("Masa 5", lines()));
        session.open_payment(Some(TenderField::Cash), false).unwrap();
        server.drain_emitted();

        session.on_disconnect();
        assert!(!session.is_connected());
        assert_eq!(session.payment().phase(), crate::payment::PaymentPhase::Idle);
        assert_eq!(session.store().active_snapshot().unwrap().len(), 3);

        session.on_connect();
        assert_eq!(
            server.try_next_emitted().unwrap().event,
            ClientEvent::SelectMasa {
                masa: "Masa 5".to_string()
            }
        );
    }

    #[test]
    fn test_oversized_tender_text_is_capped() {
        let (mut session, _server) = session();
        session.select_order("Masa 3").unwrap();
        session.handle(masa_update("Masa 3", vec![OrderLine::new("Cola", 15.0, 2)]));
        session.open_payment(Some(TenderField::Cash), false).unwrap();

        session
            .edit_tender_text(TenderField::Card, "79228162514264337593543950335")
            .unwrap();
        let view = session.payment().view();
        assert_eq!(view.card, Decimal::from(30));
        assert_eq!(view.cash, Decimal::ZERO);
        assert!(view.cash + view.card + view.on_account <= view.target);
    }

    #[test]
    fn test_order_switch_blocked_while_awaiting_terminal() {
        let (gateway, _inbound, _server) = MemoryGateway::channel();
        let config = ClientConfig::default().with_card_terminal_confirmation(true);
        let mut session = PosSession::new(gateway, config);
        session.select_order("Masa 1").unwrap();
        session.handle(masa_update("Masa 1", lines()));
        session.open_payment(Some(TenderField::Card), false).unwrap();
        session.finalize_payment(false).unwrap();

        assert!(matches!(session.select_order("Masa 2"), Err(ClientError::PaymentInProgress)));
        assert_eq!(session.store().active_id(), Some("Masa 1"));
        assert_eq!(session.payment().phase(), PaymentPhase::Finalizing);
    }

    #[test]
    fn test_malformed_event_is_dropped() {
        let (mut session, _server) = session();
        session.dispatch(GatewayEvent::raw("masa_update", serde_json::json!({ "items": 3 })));
        session.dispatch(GatewayEvent::raw("kitchen_print", serde_json::Value::Null));
        assert_eq!(session.store().order_ids().count(), 0);
    }
}
