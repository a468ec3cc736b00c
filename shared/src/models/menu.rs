//! Menu Model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Menu entry, `[name, price]` on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem(pub String, pub f64);

impl MenuItem {
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn price(&self) -> f64 {
        self.1
    }
}

/// Category name -> entries
pub type Menu = BTreeMap<String, Vec<MenuItem>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_wire_shape() {
        let menu: Menu =
            serde_json::from_str(r#"{"Icecekler":[["Kola",15.0],["Ayran",10.0]]}"#).unwrap();
        let drinks = &menu["Icecekler"];
        assert_eq!(drinks.len(), 2);
        assert_eq!(drinks[0].name(), "Kola");
        assert_eq!(drinks[1].price(), 10.0);
    }
}
