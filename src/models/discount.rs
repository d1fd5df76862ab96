//! Fee discounts.

use serde::{Deserialize, Serialize};

use super::{require, unique_key, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

/// A named discount applied to fees, either a percentage or a fixed amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub name: String,
    pub discount_type: DiscountType,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for Discount {
    const KIND: &'static str = "discounts";
    const LABEL: &'static str = "Discount";

    fn validate(&self) -> Result<(), String> {
        require("Discount name", &self.name)?;
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err("Discount amount must be greater than zero".to_string());
        }
        if self.discount_type == DiscountType::Percentage && self.amount > 100.0 {
            return Err("Percentage discount cannot exceed 100".to_string());
        }
        Ok(())
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![unique_key("name", &self.name)]
    }
}
