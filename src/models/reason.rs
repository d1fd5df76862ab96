//! Reasons offered when recording leave, visits or stock movements.

use serde::{Deserialize, Serialize};

use super::{require, unique_key, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reason {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for Reason {
    const KIND: &'static str = "reasons";
    const LABEL: &'static str = "Reason";

    fn validate(&self) -> Result<(), String> {
        require("Reason title", &self.title)
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![unique_key("title", &self.title)]
    }
}
