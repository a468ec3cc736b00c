//! Line selection for partial (split) payments

use rust_decimal::Decimal;
use shared::order::OrderLine;
use std::collections::BTreeSet;

use crate::money::{checked_sum, line_total};

/// Indices of the active order's lines picked for a partial payment
///
/// Indices are not checked against the live line count when toggled;
/// anything out of range is simply ignored by `amount_for` and
/// `indices_within`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    indices: BTreeSet<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the index if absent, remove it if present; returns whether it
    /// is selected afterwards
    pub fn toggle(&mut self, index: usize) -> bool {
        if self.indices.remove(&index) {
            false
        } else {
            self.indices.insert(index);
            true
        }
    }

    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// True iff at least one line is selected
    pub fn is_partial(&self) -> bool {
        !self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Selected indices in ascending order
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// Selected indices that address an existing line
    pub fn indices_within(&self, line_count: usize) -> Vec<usize> {
        self.indices.range(..line_count).copied().collect()
    }

    /// Payable amount of the selected lines
    pub fn amount_for(&self, lines: &[OrderLine]) -> Decimal {
        checked_sum(
            lines
                .iter()
                .enumerate()
                .filter(|(index, _)| self.indices.contains(index))
                .map(|(_, line)| line_total(line)),
        )
    }
}
