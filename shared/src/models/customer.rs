//! Customer Ledger Model (cari hesap)

use serde::{Deserialize, Serialize};

/// Customer ledger account as listed by `/api/cari/hesaplar`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerAccount {
    #[serde(default)]
    pub id: Option<i64>,
    pub cari_isim: String,
    /// Current balance
    #[serde(default)]
    pub bakiye: Option<f64>,
}

impl CustomerAccount {
    /// Case-insensitive substring match on the account name
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty() || self.cari_isim.to_lowercase().contains(&query.to_lowercase())
    }
}

/// `GET /api/cari/hesaplar` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerAccountsResponse {
    pub success: bool,
    #[serde(default)]
    pub hesaplar: Vec<CustomerAccount>,
    #[serde(default)]
    pub message: Option<String>,
}
