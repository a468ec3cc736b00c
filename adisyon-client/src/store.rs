//! Order state store
//!
//! Single source of truth for what the terminal displays. Lines only ever
//! come from the server (`masa_selected`, `masa_update`, `initial_data`,
//! `adisyonlar_update`); the most recent snapshot for an order wins. Totals
//! are always recomputed from the lines, never taken from the payload.

use rust_decimal::Decimal;
use shared::message::OrderMap;
use shared::models::{CourierAssignment, Menu, SystemInfo};
use shared::order::{OrderId, OrderLine};
use std::collections::HashMap;

use crate::money::lines_total;

// ============================================================================
// Order Snapshot
// ============================================================================

/// Lines of one order plus their derived total
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSnapshot {
    order_id: OrderId,
    lines: Vec<OrderLine>,
    total: Decimal,
}

impl OrderSnapshot {
    /// Create an empty order
    pub fn new(order_id: impl Into<OrderId>) -> Self {
        Self {
            order_id: order_id.into(),
            lines: Vec::new(),
            total: Decimal::ZERO,
        }
    }

    /// Create an order from server lines
    pub fn with_lines(order_id: impl Into<OrderId>, lines: Vec<OrderLine>) -> Self {
        let mut snapshot = Self::new(order_id);
        snapshot.replace_lines(lines);
        snapshot
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&OrderLine> {
        self.lines.get(index)
    }

    /// Sum of `quantity * unit_price` over the lines
    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append a line
    pub fn push_line(&mut self, line: OrderLine) {
        self.lines.push(line);
        self.recompute();
    }

    /// Remove the line at `index`, if any
    pub fn remove_line(&mut self, index: usize) -> Option<OrderLine> {
        if index >= self.lines.len() {
            return None;
        }
        let line = self.lines.remove(index);
        self.recompute();
        Some(line)
    }

    /// Replace all lines
    pub fn replace_lines(&mut self, lines: Vec<OrderLine>) {
        self.lines = lines;
        self.recompute();
    }

    /// Empty the order
    pub fn clear(&mut self) {
        self.lines.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.total = lines_total(&self.lines);
    }
}

// ============================================================================
// Store
// ============================================================================

/// Occupancy indicator of one table button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableIndicator {
    pub occupied: bool,
    pub total: Decimal,
}

/// Result of applying a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotApplied {
    /// The snapshot belongs to the active order (render needed)
    pub is_active: bool,
    pub total: Decimal,
}

/// All known orders and the active selection
#[derive(Debug, Clone, Default)]
pub struct OrderStore {
    orders: HashMap<OrderId, OrderSnapshot>,
    active: Option<OrderId>,
    couriers: HashMap<OrderId, CourierAssignment>,
    system: Option<SystemInfo>,
    menu: Menu,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `order_id` the active order, creating it empty if unknown
    pub fn select(&mut self, order_id: &str) {
        self.orders
            .entry(order_id.to_string())
            .or_insert_with(|| OrderSnapshot::new(order_id));
        self.active = Some(order_id.to_string());
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_snapshot(&self) -> Option<&OrderSnapshot> {
        self.active.as_ref().and_then(|id| self.orders.get(id))
    }

    pub fn snapshot(&self, order_id: &str) -> Option<&OrderSnapshot> {
        self.orders.get(order_id)
    }

    pub fn is_active(&self, order_id: &str) -> bool {
        self.active.as_deref() == Some(order_id)
    }

    /// Replace the lines of one order (last write wins)
    ///
    /// Snapshots for orders nobody selected yet are stored as well.
    pub fn apply_remote_snapshot(&mut self, order_id: &str, lines: Vec<OrderLine>) -> SnapshotApplied {
        let snapshot = self
            .orders
            .entry(order_id.to_string())
            .or_insert_with(|| OrderSnapshot::new(order_id));
        snapshot.replace_lines(lines);
        let total = snapshot.total();

        tracing::debug!(order_id = %order_id, lines = snapshot.len(), total = %total, "Applied remote snapshot");

        SnapshotApplied {
            is_active: self.is_active(order_id),
            total,
        }
    }

    /// Reconcile every order at once
    ///
    /// Orders missing from `map` are emptied. Returns every order id whose
    /// indicator needs a refresh.
    pub fn apply_global_snapshot(&mut self, mut map: OrderMap) -> Vec<OrderId> {
        let mut touched: Vec<OrderId> = Vec::with_capacity(self.orders.len().max(map.len()));

        for (order_id, snapshot) in self.orders.iter_mut() {
            let lines = map.remove(order_id).unwrap_or_default();
            snapshot.replace_lines(lines);
            touched.push(order_id.clone());
        }
        for (order_id, lines) in map {
            self.orders
                .insert(order_id.clone(), OrderSnapshot::with_lines(order_id.clone(), lines));
            touched.push(order_id);
        }

        touched.sort();
        tracing::debug!(orders = touched.len(), "Applied global snapshot");
        touched
    }

    /// Empty an order after a full payment; returns whether it is active
    pub fn clear_order(&mut self, order_id: &str) -> bool {
        if let Some(snapshot) = self.orders.get_mut(order_id) {
            snapshot.clear();
        }
        self.couriers.remove(order_id);
        self.is_active(order_id)
    }

    /// Occupancy and total shown on the table button
    pub fn table_indicator(&self, order_id: &str) -> TableIndicator {
        let total = self
            .orders
            .get(order_id)
            .map(OrderSnapshot::total)
            .unwrap_or(Decimal::ZERO);
        TableIndicator {
            occupied: total > Decimal::ZERO,
            total,
        }
    }

    /// Remember the courier the server assigned to an order
    pub fn record_courier(&mut self, order_id: &str, courier: CourierAssignment) {
        self.couriers.insert(order_id.to_string(), courier);
    }

    pub fn courier(&self, order_id: &str) -> Option<&CourierAssignment> {
        self.couriers.get(order_id)
    }

    /// Replace terminal info and menu (from `initial_data`)
    pub fn set_catalog(&mut self, system: SystemInfo, menu: Menu) {
        tracing::debug!(categories = menu.len(), company = %system.company_name, "Catalog loaded");
        self.system = Some(system);
        self.menu = menu;
    }

    pub fn set_system_info(&mut self, system: SystemInfo) {
        self.system = Some(system);
    }

    pub fn system_info(&self) -> Option<&SystemInfo> {
        self.system.as_ref()
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Every order id the store knows
    pub fn order_ids(&self) -> impl Iterator<Item = &str> {
        self.orders.keys().map(String::as_str)
    }
}
