//! Courier Model (kurye)

use serde::{Deserialize, Serialize};

/// Courier picked for a package order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Courier {
    pub kurye_id: String,
    pub kurye_ad: String,
    pub kurye_tel: String,
}

/// Courier as confirmed by the server for one order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CourierAssignment {
    #[serde(default)]
    pub kurye_ad: String,
    #[serde(default)]
    pub kurye_tel: String,
}
