//! Config Override Repository

use super::{RepoResult, key_columns, key_from_columns};
use shared::models::{CompositeKey, ConfigOverride, OverridePatch};
use sqlx::SqlitePool;

#[derive(sqlx::FromRow)]
struct Row {
    scope: String,
    item_id: i64,
    modifier_group_id: i64,
    modifier_option_id: i64,
    menu_group_id: i64,
    enabled: bool,
    price_override: Option<i64>,
    updated_at: i64,
}

impl Row {
    fn into_override(self) -> RepoResult<ConfigOverride> {
        Ok(ConfigOverride {
            key: key_from_columns(
                &self.scope,
                self.item_id,
                self.modifier_group_id,
                self.modifier_option_id,
                self.menu_group_id,
            )?,
            enabled: self.enabled,
            price_override: self.price_override,
            updated_at: self.updated_at,
        })
    }
}

const SELECT: &str = "SELECT scope, item_id, modifier_group_id, modifier_option_id, menu_group_id, enabled, price_override, updated_at FROM config_override";

pub async fn find(pool: &SqlitePool, key: &CompositeKey) -> RepoResult<Option<ConfigOverride>> {
    let (scope, item, group, option, menu) = key_columns(key);
    let row = sqlx::query_as::<_, Row>(&format!(
        "{SELECT} WHERE scope = ? AND item_id = ? AND modifier_group_id = ? AND modifier_option_id = ? AND menu_group_id = ?"
    ))
    .bind(scope)
    .bind(item)
    .bind(group)
    .bind(option)
    .bind(menu)
    .fetch_optional(pool)
    .await?;
    row.map(Row::into_override).transpose()
}

pub async fn find_for_menu(pool: &SqlitePool, menu_group_id: i64) -> RepoResult<Vec<ConfigOverride>> {
    let rows = sqlx::query_as::<_, Row>(&format!(
        "{SELECT} WHERE menu_group_id = ? ORDER BY scope, item_id, modifier_group_id, modifier_option_id"
    ))
    .bind(menu_group_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Row::into_override).collect()
}

/// Merge a patch into the stored override (or the default), in one transaction
///
/// Returns the stored value and whether the row was created.
pub async fn upsert(
    pool: &SqlitePool,
    key: &CompositeKey,
    patch: &OverridePatch,
    now: i64,
) -> RepoResult<(ConfigOverride, bool)> {
    let (scope, item, group, option, menu) = key_columns(key);
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, Row>(&format!(
        "{SELECT} WHERE scope = ? AND item_id = ? AND modifier_group_id = ? AND modifier_option_id = ? AND menu_group_id = ?"
    ))
    .bind(scope)
    .bind(item)
    .bind(group)
    .bind(option)
    .bind(menu)
    .fetch_optional(&mut *tx)
    .await?
    .map(Row::into_override)
    .transpose()?;

    let created = existing.is_none();
    let mut value = existing.unwrap_or_else(|| ConfigOverride::default_for(*key));
    value.apply(patch);
    value.updated_at = now;

    sqlx::query(
        "INSERT INTO config_override (scope, item_id, modifier_group_id, modifier_option_id, menu_group_id, enabled, price_override, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT (scope, item_id, modifier_group_id, modifier_option_id, menu_group_id) \
         DO UPDATE SET enabled = excluded.enabled, price_override = excluded.price_override, updated_at = excluded.updated_at",
    )
    .bind(scope)
    .bind(item)
    .bind(group)
    .bind(option)
    .bind(menu)
    .bind(value.enabled)
    .bind(value.price_override)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((value, created))
}

pub async fn delete_for_menu(pool: &SqlitePool, menu_group_id: i64) -> RepoResult<u64> {
    let result = sqlx::query("DELETE FROM config_override WHERE menu_group_id = ?")
        .bind(menu_group_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
