//! Payment tender wire types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment method of a single tender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TenderMethod {
    /// Cash (nakit)
    Cash,
    /// Card (kredi karti)
    Card,
    /// Deferred payment on a customer ledger (cari)
    OnAccount,
}

impl TenderMethod {
    /// Label used by the legacy single-tender `finalize_payment{type}` form
    pub fn legacy_label(&self) -> &'static str {
        match self {
            Self::Cash => "Nakit",
            Self::Card => "Kredi Kartı",
            Self::OnAccount => "Cari",
        }
    }
}

impl fmt::Display for TenderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cash => write!(f, "cash"),
            Self::Card => write!(f, "card"),
            Self::OnAccount => write!(f, "on_account"),
        }
    }
}

/// One tender of a `finalize_payment` request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentTender {
    pub method: TenderMethod,
    pub amount: f64,
    /// Customer ledger name, present iff `method` is `OnAccount`
    #[serde(rename = "cari_isim", default, skip_serializing_if = "Option::is_none")]
    pub customer_reference: Option<String>,
}

/// `finalize_payment` payload
///
/// The server accepts both the multi-tender form and the older
/// single-tender `{type}` form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FinalizePaymentPayload {
    MultiTender {
        payments: Vec<PaymentTender>,
        role: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item_indices: Option<Vec<usize>>,
    },
    Legacy {
        #[serde(rename = "type")]
        payment_type: String,
    },
}

impl FinalizePaymentPayload {
    /// Build the legacy single-tender form
    pub fn legacy(method: TenderMethod) -> Self {
        Self::Legacy {
            payment_type: method.legacy_label().to_string(),
        }
    }

    /// Tenders carried by this payload (empty for the legacy form)
    pub fn tenders(&self) -> &[PaymentTender] {
        match self {
            Self::MultiTender { payments, .. } => payments,
            Self::Legacy { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_tender_shape() {
        let payload = FinalizePaymentPayload::MultiTender {
            payments: vec![
                PaymentTender {
                    method: TenderMethod::Cash,
                    amount: 20.0,
                    customer_reference: None,
                },
                PaymentTender {
                    method: TenderMethod::OnAccount,
                    amount: 10.0,
                    customer_reference: Some("Ahmet Yilmaz".to_string()),
                },
            ],
            role: "kasa".to_string(),
            item_indices: None,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["role"], "kasa");
        assert_eq!(value["payments"][0]["method"], "cash");
        assert!(value["payments"][0].get("cari_isim").is_none());
        assert_eq!(value["payments"][1]["method"], "on_account");
        assert_eq!(value["payments"][1]["cari_isim"], "Ahmet Yilmaz");
        assert!(value.get("item_indices").is_none());
    }

    #[test]
    fn test_legacy_shape() {
        let payload = FinalizePaymentPayload::legacy(TenderMethod::Card);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, serde_json::json!({ "type": "Kredi Kartı" }));
        assert!(payload.tenders().is_empty());

        let parsed: FinalizePaymentPayload = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, payload);
    }
}
