//! Tender field arithmetic
//!
//! Three amount fields (cash, card, on-account) are kept against one
//! payable target. Edits never let the sum exceed the target; focusing an
//! empty field proposes what is still missing.

use rust_decimal::Decimal;
use shared::payment::TenderMethod;

use crate::money::{MONEY_TOLERANCE, ZERO_THRESHOLD, clamp_amount, round_money};

/// One of the three tender input fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TenderField {
    Cash,
    Card,
    OnAccount,
}

impl TenderField {
    /// Field order, also the precedence used when reducing other fields
    pub const ALL: [TenderField; 3] = [TenderField::Cash, TenderField::Card, TenderField::OnAccount];

    pub fn method(self) -> TenderMethod {
        match self {
            Self::Cash => TenderMethod::Cash,
            Self::Card => TenderMethod::Card,
            Self::OnAccount => TenderMethod::OnAccount,
        }
    }
}

/// How the entered sum relates to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingClass {
    /// More entered than payable
    Over,
    /// Within `MONEY_TOLERANCE`
    Exact,
    /// Still something to collect
    Under,
}

/// `target - sum` and its classification
pub fn remaining(target: Decimal, sum: Decimal) -> (Decimal, RemainingClass) {
    let remaining = target - sum;
    let class = if remaining.abs() < MONEY_TOLERANCE {
        RemainingClass::Exact
    } else if remaining.is_sign_negative() {
        RemainingClass::Over
    } else {
        RemainingClass::Under
    };
    (remaining, class)
}

/// Current amounts of the three tender fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenderFields {
    cash: Decimal,
    card: Decimal,
    on_account: Decimal,
}

impl TenderFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: TenderField) -> Decimal {
        match field {
            TenderField::Cash => self.cash,
            TenderField::Card => self.card,
            TenderField::OnAccount => self.on_account,
        }
    }

    /// Set a field, clamped into `0..=MAX_PAYMENT_AMOUNT`
    pub fn set(&mut self, field: TenderField, amount: Decimal) {
        let amount = clamp_amount(amount);
        match field {
            TenderField::Cash => self.cash = amount,
            TenderField::Card => self.card = amount,
            TenderField::OnAccount => self.on_account = amount,
        }
    }

    pub fn sum(&self) -> Decimal {
        self.cash + self.card + self.on_account
    }

    /// Sum of the two fields other than `field`
    pub fn others_sum(&self, field: TenderField) -> Decimal {
        self.sum() - self.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.sum() <= ZERO_THRESHOLD
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Non-empty fields in field order
    pub fn entries(&self) -> impl Iterator<Item = (TenderField, Decimal)> + '_ {
        TenderField::ALL
            .into_iter()
            .map(|field| (field, self.get(field)))
            .filter(|(_, amount)| *amount > ZERO_THRESHOLD)
    }

    /// Pull the sum back under `target` after `edited` changed
    ///
    /// The other two fields are reduced in `TenderField::ALL` order,
    /// skipping `edited`; a field left at or below `ZERO_THRESHOLD` is
    /// zeroed. If that is still not enough the edited field itself is
    /// capped at what remains.
    pub fn balance(&mut self, edited: TenderField, target: Decimal) {
        let target = target.max(Decimal::ZERO);
        let mut excess = self.sum() - target;
        if excess <= Decimal::ZERO {
            return;
        }

        for field in TenderField::ALL.into_iter().filter(|f| *f != edited) {
            if excess <= Decimal::ZERO {
                break;
            }
            let current = self.get(field);
            if current <= Decimal::ZERO {
                continue;
            }
            let cut = excess.min(current);
            let reduced = current - cut;
            excess -= cut;
            self.set(
                field,
                if reduced <= ZERO_THRESHOLD {
                    Decimal::ZERO
                } else {
                    reduced
                },
            );
        }

        if self.sum() > target {
            let cap = (target - self.others_sum(edited)).max(Decimal::ZERO);
            tracing::debug!(field = ?edited, cap = %cap, "Edited tender capped at target");
            self.set(edited, cap);
        }
    }

    /// Propose an amount for a freshly focused field
    ///
    /// Only acts on an empty field. When the whole target sits in exactly
    /// one other field, that amount moves into the focused field; otherwise
    /// the field receives `max(0, target - others)`. Returns the field's
    /// amount afterwards.
    pub fn autofill(&mut self, focused: TenderField, target: Decimal) -> Decimal {
        if self.get(focused) > ZERO_THRESHOLD {
            return self.get(focused);
        }

        let others: Vec<(TenderField, Decimal)> =
            self.entries().filter(|(field, _)| *field != focused).collect();

        match others.as_slice() {
            [(holder, amount)] if (*amount - target).abs() < MONEY_TOLERANCE => {
                let amount = *amount;
                self.set(*holder, Decimal::ZERO);
                self.set(focused, amount);
            }
            _ => {
                let missing = (target - self.others_sum(focused)).max(Decimal::ZERO);
                self.set(focused, missing);
            }
        }
        self.get(focused)
    }

    /// Cash gets `target / parties`, the other fields are cleared
    pub fn split_equally(&mut self, target: Decimal, parties: u32) {
        self.clear();
        if parties == 0 {
            return;
        }
        self.cash = clamp_amount(round_money(target / Decimal::from(parties)));
    }
}

/// Parse a party count typed by the user
pub fn parse_party_count(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok().filter(|n| *n > 0)
}
