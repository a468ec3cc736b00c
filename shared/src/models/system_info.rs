//! System Info Model

use serde::{Deserialize, Serialize};

use crate::order::OrderId;

/// Terminal and floor layout information sent by the server
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SystemInfo {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub terminal_id: String,
    #[serde(default)]
    pub ip: String,
    /// Number of dine-in tables
    #[serde(default)]
    pub masa_sayisi: u32,
    /// Number of takeaway/package slots
    #[serde(default)]
    pub paket_sayisi: u32,
}

impl SystemInfo {
    /// All order slots the floor layout defines, packages first
    pub fn order_ids(&self) -> Vec<OrderId> {
        let packages = (1..=self.paket_sayisi).map(|i| format!("Paket {}", i));
        let tables = (1..=self.masa_sayisi).map(|i| format!("Masa {}", i));
        packages.chain(tables).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_ids_layout() {
        let info = SystemInfo {
            masa_sayisi: 2,
            paket_sayisi: 1,
            ..Default::default()
        };
        assert_eq!(info.order_ids(), vec!["Paket 1", "Masa 1", "Masa 2"]);
    }

    #[test]
    fn test_partial_payload() {
        let info: SystemInfo = serde_json::from_str(r#"{"company_name":"Lokanta"}"#).unwrap();
        assert_eq!(info.company_name, "Lokanta");
        assert!(info.order_ids().is_empty());
    }
}
