//! Result divisions, e.g. "First" for 60 to 100 percent.

use serde::{Deserialize, Serialize};

use super::{require, require_in_range, unique_key, Resource};

/// A grading band over a percentage range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Division {
    pub name: String,
    pub percent_from: f64,
    pub percent_upto: f64,
}

impl Resource for Division {
    const KIND: &'static str = "divisions";
    const LABEL: &'static str = "Division";

    fn validate(&self) -> Result<(), String> {
        require("Division name", &self.name)?;
        require_in_range("Percent from", self.percent_from, 0.0, 100.0)?;
        require_in_range("Percent upto", self.percent_upto, 0.0, 100.0)?;
        if self.percent_from > self.percent_upto {
            return Err("Percent from must not exceed percent upto".to_string());
        }
        Ok(())
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![unique_key("name", &self.name)]
    }
}
