//! Stock and expense categories.

use serde::{Deserialize, Serialize};

use super::{require, unique_key, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for Category {
    const KIND: &'static str = "categories";
    const LABEL: &'static str = "Category";

    fn validate(&self) -> Result<(), String> {
        require("Category name", &self.name)
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![unique_key("name", &self.name)]
    }
}
