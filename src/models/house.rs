//! Student houses.

use serde::{Deserialize, Serialize};

use super::{require, unique_key, Resource};

/// A house students are grouped into for competitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct House {
    pub name: String,
    /// Display color as `#RRGGBB`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Resource for House {
    const KIND: &'static str = "houses";
    const LABEL: &'static str = "House";

    fn validate(&self) -> Result<(), String> {
        require("House name", &self.name)?;
        if let Some(color) = &self.color {
            if !is_hex_color(color) {
                return Err(format!("Invalid house color {:?}, expected #RRGGBB", color));
            }
        }
        Ok(())
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![unique_key("name", &self.name)]
    }
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}
