//! Sync Record Repository

use super::{RepoError, RepoResult, key_columns, key_from_columns};
use shared::models::{CompositeKey, SyncRecord, SyncStatus};
use sqlx::SqlitePool;
use std::collections::HashSet;

#[derive(sqlx::FromRow)]
struct Row {
    scope: String,
    item_id: i64,
    modifier_group_id: i64,
    modifier_option_id: i64,
    menu_group_id: i64,
    status: String,
    error_detail: Option<String>,
    last_synced_at: Option<i64>,
}

impl Row {
    fn into_record(self) -> RepoResult<SyncRecord> {
        Ok(SyncRecord {
            key: key_from_columns(
                &self.scope,
                self.item_id,
                self.modifier_group_id,
                self.modifier_option_id,
                self.menu_group_id,
            )?,
            status: self.status.parse::<SyncStatus>().map_err(RepoError::Database)?,
            error_detail: self.error_detail,
            last_synced_at: self.last_synced_at,
        })
    }
}

pub async fn find_for_menu(pool: &SqlitePool, menu_group_id: i64) -> RepoResult<Vec<SyncRecord>> {
    let rows = sqlx::query_as::<_, Row>(
        "SELECT scope, item_id, modifier_group_id, modifier_option_id, menu_group_id, status, error_detail, last_synced_at \
         FROM sync_record WHERE menu_group_id = ? ORDER BY scope, item_id, modifier_group_id, modifier_option_id",
    )
    .bind(menu_group_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Row::into_record).collect()
}

pub async fn upsert(pool: &SqlitePool, record: &SyncRecord) -> RepoResult<()> {
    let (scope, item, group, option, menu) = key_columns(&record.key);
    sqlx::query(
        "INSERT INTO sync_record (scope, item_id, modifier_group_id, modifier_option_id, menu_group_id, status, error_detail, last_synced_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT (scope, item_id, modifier_group_id, modifier_option_id, menu_group_id) \
         DO UPDATE SET status = excluded.status, error_detail = excluded.error_detail, last_synced_at = excluded.last_synced_at",
    )
    .bind(scope)
    .bind(item)
    .bind(group)
    .bind(option)
    .bind(menu)
    .bind(record.status.as_str())
    .bind(&record.error_detail)
    .bind(record.last_synced_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Mark every record of a menu group unsynced (after a clear)
pub async fn reset_for_menu(pool: &SqlitePool, menu_group_id: i64) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE sync_record SET status = 'unsynced', error_detail = NULL WHERE menu_group_id = ?",
    )
    .bind(menu_group_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Mark unsynced every record of a menu group whose key is not in `current`
///
/// Run after an accepted push: entities left out of the document are no
/// longer on the platform.
pub async fn reset_missing(
    pool: &SqlitePool,
    menu_group_id: i64,
    current: &HashSet<CompositeKey>,
) -> RepoResult<u64> {
    let stale: Vec<_> = find_for_menu(pool, menu_group_id)
        .await?
        .into_iter()
        .filter(|r| r.status != SyncStatus::Unsynced && !current.contains(&r.key))
        .collect();
    if stale.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut reset = 0;
    for record in &stale {
        let (scope, item, group, option, menu) = key_columns(&record.key);
        let result = sqlx::query(
            "UPDATE sync_record SET status = 'unsynced', error_detail = NULL \
             WHERE scope = ? AND item_id = ? AND modifier_group_id = ? AND modifier_option_id = ? AND menu_group_id = ?",
        )
        .bind(scope)
        .bind(item)
        .bind(group)
        .bind(option)
        .bind(menu)
        .execute(&mut *tx)
        .await?;
        reset += result.rows_affected();
    }
    tx.commit().await?;
    Ok(reset)
}
