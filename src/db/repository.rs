//! Database repository for CRUD operations.
//!
//! One generic implementation serves every [`Resource`] kind. Each mutation
//! runs in a transaction covering the record row and its unique keys.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};

use super::GLOBAL_SCOPE_KEY;
use crate::errors::AppError;
use crate::models::{Record, Resource, UniqueScope};

const RECORD_COLUMNS: &str = "id, scope_id, data, created_at, updated_at";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a transaction holding the write lock from the start, so
    /// concurrent writers queue on the busy timeout instead of failing when
    /// a read snapshot goes stale.
    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, AppError> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    /// List all records of a kind under a scope, in creation order.
    pub async fn list<R: Resource>(&self, scope_id: &str) -> Result<Vec<Record<R>>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM records WHERE kind = ? AND scope_id = ? ORDER BY rowid"
        ))
        .bind(R::KIND)
        .bind(scope_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row::<R>).collect()
    }

    /// Create a record, assigning its id and any server-generated fields.
    pub async fn create<R: Resource>(
        &self,
        scope_id: &str,
        mut fields: R,
        uniqueness: UniqueScope,
    ) -> Result<Record<R>, AppError> {
        let mut tx = self.begin_write().await?;

        let previous = last_in_scope::<R>(&mut tx, scope_id).await?;
        fields.assign_generated(previous.as_ref().map(|r| &r.fields));

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let data = encode(&fields)?;

        sqlx::query(
            "INSERT INTO records (id, kind, scope_id, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(R::KIND)
        .bind(scope_id)
        .bind(&data)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        insert_unique_keys(&mut tx, &id, scope_id, &fields, uniqueness).await?;

        tx.commit().await?;

        tracing::info!(kind = R::KIND, scope = scope_id, id = %id, "Record created");

        Ok(Record {
            id,
            admin_id: scope_id.to_string(),
            fields,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Replace the fields of an existing record.
    pub async fn update<R: Resource>(
        &self,
        scope_id: &str,
        id: &str,
        mut fields: R,
        uniqueness: UniqueScope,
    ) -> Result<Record<R>, AppError> {
        let mut tx = self.begin_write().await?;

        let existing = find_in_scope::<R>(&mut tx, scope_id, id)
            .await?
            .ok_or_else(|| not_found::<R>(id))?;
        fields.carry_generated(&existing.fields);

        let now = Utc::now().to_rfc3339();
        let data = encode(&fields)?;

        sqlx::query("UPDATE records SET data = ?, updated_at = ? WHERE id = ?")
            .bind(&data)
            .bind(&now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM unique_keys WHERE record_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_unique_keys(&mut tx, id, scope_id, &fields, uniqueness).await?;

        tx.commit().await?;

        tracing::info!(kind = R::KIND, scope = scope_id, id = id, "Record updated");

        Ok(Record {
            id: existing.id,
            admin_id: existing.admin_id,
            fields,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a record. Deleting an absent record is `NotFound`.
    pub async fn delete<R: Resource>(&self, scope_id: &str, id: &str) -> Result<(), AppError> {
        let mut tx = self.begin_write().await?;

        let result = sqlx::query("DELETE FROM records WHERE id = ? AND kind = ? AND scope_id = ?")
            .bind(id)
            .bind(R::KIND)
            .bind(scope_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found::<R>(id));
        }

        sqlx::query("DELETE FROM unique_keys WHERE record_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(kind = R::KIND, scope = scope_id, id = id, "Record deleted");
        Ok(())
    }
}

async fn find_in_scope<R: Resource>(
    conn: &mut SqliteConnection,
    scope_id: &str,
    id: &str,
) -> Result<Option<Record<R>>, AppError> {
    let row = sqlx::query(&format!(
        "SELECT {RECORD_COLUMNS} FROM records WHERE id = ? AND kind = ? AND scope_id = ?"
    ))
    .bind(id)
    .bind(R::KIND)
    .bind(scope_id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(record_from_row::<R>).transpose()
}

async fn last_in_scope<R: Resource>(
    conn: &mut SqliteConnection,
    scope_id: &str,
) -> Result<Option<Record<R>>, AppError> {
    let row = sqlx::query(&format!(
        "SELECT {RECORD_COLUMNS} FROM records WHERE kind = ? AND scope_id = ? ORDER BY rowid DESC LIMIT 1"
    ))
    .bind(R::KIND)
    .bind(scope_id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(record_from_row::<R>).transpose()
}

async fn insert_unique_keys<R: Resource>(
    conn: &mut SqliteConnection,
    record_id: &str,
    scope_id: &str,
    fields: &R,
    uniqueness: UniqueScope,
) -> Result<(), AppError> {
    let scope_key = match uniqueness {
        UniqueScope::PerScope => scope_id,
        UniqueScope::Global => GLOBAL_SCOPE_KEY,
    };

    for (field, value) in fields.unique_keys() {
        sqlx::query(
            "INSERT INTO unique_keys (kind, scope_key, field, value, record_id) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(R::KIND)
        .bind(scope_key)
        .bind(field)
        .bind(&value)
        .bind(record_id)
        .execute(&mut *conn)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AppError::Conflict(format!("{} with this {} already exists", R::LABEL, field))
            } else {
                AppError::from(err)
            }
        })?;
    }

    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

fn not_found<R: Resource>(id: &str) -> AppError {
    AppError::NotFound(format!("{} {} not found", R::LABEL, id))
}

fn encode<R: Resource>(fields: &R) -> Result<String, AppError> {
    serde_json::to_string(fields)
        .map_err(|e| AppError::Internal(format!("Failed to encode {}: {}", R::LABEL, e)))
}

// Helper functions for row conversion

fn record_from_row<R: Resource>(row: &SqliteRow) -> Result<Record<R>, AppError> {
    let id: String = row.get("id");
    let data: String = row.get("data");
    let fields = serde_json::from_str(&data).map_err(|e| {
        AppError::Internal(format!("Stored {} {} is unreadable: {}", R::LABEL, id, e))
    })?;

    Ok(Record {
        id,
        admin_id: row.get("scope_id"),
        fields,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
