//! Persisted record envelope and scoped request bodies.

use serde::{Deserialize, Serialize};

/// A persisted instance of a resource: server-assigned identity around the
/// entity's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<R> {
    pub id: String,
    /// Scope key (owning admin) of the record
    #[serde(rename = "adminID")]
    pub admin_id: String,
    #[serde(flatten)]
    pub fields: R,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for create and update: the entity's fields plus the scope key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopedFields<R> {
    #[serde(rename = "adminID")]
    pub admin_id: String,
    #[serde(flatten)]
    pub fields: R,
}
