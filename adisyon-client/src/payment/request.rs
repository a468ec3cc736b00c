//! Finalized payment request

use rust_decimal::Decimal;
use shared::payment::{FinalizePaymentPayload, PaymentTender, TenderMethod};

use crate::money::to_f64;

/// One method's contribution to a payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tender {
    pub method: TenderMethod,
    pub amount: Decimal,
    /// Customer ledger, set iff `method` is `OnAccount`
    pub customer_reference: Option<String>,
}

/// Validated multi-tender payment, ready to emit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub order_id: String,
    /// Cash, card, on-account order; only positive amounts
    pub tenders: Vec<Tender>,
    pub target_total: Decimal,
    pub is_partial: bool,
    /// Present iff `is_partial`
    pub selected_indices: Option<Vec<usize>>,
    /// UTC milliseconds
    pub requested_at: i64,
}

impl PaymentRequest {
    pub fn tender_sum(&self) -> Decimal {
        self.tenders.iter().map(|t| t.amount).sum()
    }

    pub fn amount_for(&self, method: TenderMethod) -> Decimal {
        self.tenders
            .iter()
            .filter(|t| t.method == method)
            .map(|t| t.amount)
            .sum()
    }

    pub fn has_card(&self) -> bool {
        self.amount_for(TenderMethod::Card) > Decimal::ZERO
    }

    /// Wire payload for `finalize_payment`
    pub fn to_payload(&self, role: &str) -> FinalizePaymentPayload {
        FinalizePaymentPayload::MultiTender {
            payments: self
                .tenders
                .iter()
                .map(|t| PaymentTender {
                    method: t.method,
                    amount: to_f64(t.amount),
                    customer_reference: t.customer_reference.clone(),
                })
                .collect(),
            role: role.to_string(),
            item_indices: self.selected_indices.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_conversion() {
        let request = PaymentRequest {
            order_id: "Masa 5".to_string(),
            tenders: vec![
                Tender {
                    method: TenderMethod::Cash,
                    amount: Decimal::new(1250, 2),
                    customer_reference: None,
                },
                Tender {
                    method: TenderMethod::Card,
                    amount: Decimal::new(2750, 2),
                    customer_reference: None,
                },
            ],
            target_total: Decimal::from(40),
            is_partial: true,
            selected_indices: Some(vec![1, 3]),
            requested_at: 0,
        };

        assert_eq!(request.tender_sum(), Decimal::from(40));
        assert!(request.has_card());

        match request.to_payload("kasa") {
            FinalizePaymentPayload::MultiTender {
                payments,
                role,
                item_indices,
            } => {
                assert_eq!(role, "kasa");
                assert_eq!(payments.len(), 2);
                assert_eq!(payments[0].amount, 12.5);
                assert_eq!(payments[1].method, TenderMethod::Card);
                assert_eq!(item_indices, Some(vec![1, 3]));
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }
}
