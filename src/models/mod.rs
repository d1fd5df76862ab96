//! Data models for the school administration application.
//!
//! Every entity implements [`Resource`], which is all the generic request
//! handlers, repository and resource client need to serve it.

mod category;
mod discount;
mod division;
mod house;
mod reason;
mod record;
mod stock_item;
mod teacher;
mod visitor;

pub use category::*;
pub use discount::*;
pub use division::*;
pub use house::*;
pub use reason::*;
pub use record::*;
pub use stock_item::*;
pub use teacher::*;
pub use visitor::*;

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

/// Maximum accepted length of a scope key.
pub const MAX_SCOPE_ID_LEN: usize = 64;

/// Whether an entity's unique keys are enforced per scope or across all scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueScope {
    PerScope,
    Global,
}

/// A domain entity served through the generic CRUD lifecycle.
///
/// Implementors are the *field set* of a record; the identifier, scope key and
/// timestamps live in [`Record`].
pub trait Resource:
    Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync + 'static
{
    /// Path segment and storage kind, e.g. `divisions`.
    const KIND: &'static str;

    /// Singular name used in response messages, e.g. `Division`.
    const LABEL: &'static str;

    /// Check presence and format of the fields. The message is shown to users as-is.
    fn validate(&self) -> Result<(), String>;

    /// Field name and normalized value of every unique key of this record.
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Fill server-generated fields on create. `previous` is the most recently
    /// created record of the same kind in the same scope.
    fn assign_generated(&mut self, _previous: Option<&Self>) {}

    /// Keep server-generated fields of `existing` when its fields are replaced.
    fn carry_generated(&mut self, _existing: &Self) {}
}

/// Validate the format of a scope key (admin id).
pub fn validate_scope_id(scope_id: &str) -> Result<(), String> {
    if scope_id.is_empty() {
        return Err("Admin ID is required".to_string());
    }
    if scope_id.len() > MAX_SCOPE_ID_LEN
        || !scope_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(format!("Invalid admin ID format: {:?}", scope_id));
    }
    Ok(())
}

pub(crate) fn require(label: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", label));
    }
    Ok(())
}

pub(crate) fn require_in_range(label: &str, value: f64, min: f64, max: f64) -> Result<(), String> {
    if !value.is_finite() || value < min || value > max {
        return Err(format!("{} must be between {} and {}", label, min, max));
    }
    Ok(())
}

pub(crate) fn unique_key(field: &'static str, value: &str) -> (&'static str, String) {
    (field, value.trim().to_string())
}
