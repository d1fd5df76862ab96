//! Visitor log entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{require, Resource};

/// Minimum number of digits in a visitor phone number.
const MIN_PHONE_DIGITS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    pub name: String,
    pub phone: String,
    pub purpose: String,
    pub visit_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_to_meet: Option<String>,
    /// Check-in time as entered, e.g. "09:30"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
}

impl Resource for Visitor {
    const KIND: &'static str = "visitors";
    const LABEL: &'static str = "Visitor";

    fn validate(&self) -> Result<(), String> {
        require("Visitor name", &self.name)?;
        require("Purpose of visit", &self.purpose)?;
        if !is_phone_number(&self.phone) {
            return Err(format!("Invalid phone number {:?}", self.phone));
        }
        Ok(())
    }
}

fn is_phone_number(phone: &str) -> bool {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    digits >= MIN_PHONE_DIGITS
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
}
