//! Inventory stock items.

use serde::{Deserialize, Serialize};

use super::{require, unique_key, Resource};

/// An item held in the school store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    /// Item code, unique within the school
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: u32,
    pub unit_price: f64,
    /// Unit of measure, e.g. "pcs" or "kg"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Resource for StockItem {
    const KIND: &'static str = "stock-items";
    const LABEL: &'static str = "Stock item";

    fn validate(&self) -> Result<(), String> {
        require("Item code", &self.code)?;
        require("Item name", &self.name)?;
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err("Unit price must be a non-negative number".to_string());
        }
        Ok(())
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![unique_key("code", &self.code)]
    }
}
