//! Menu Group Repository

use super::{RepoError, RepoResult};
use shared::models::{MenuGroup, ServiceAvailability};
use sqlx::SqlitePool;

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    name: String,
    display_order: i32,
    service_availability: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<Row> for MenuGroup {
    type Error = RepoError;

    fn try_from(r: Row) -> Result<Self, Self::Error> {
        let service_availability: ServiceAvailability =
            serde_json::from_str(&r.service_availability).map_err(|e| {
                RepoError::Database(format!(
                    "Corrupt service_availability for menu group {}: {e}",
                    r.id
                ))
            })?;
        Ok(MenuGroup {
            id: r.id,
            name: r.name,
            display_order: r.display_order,
            service_availability,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

const SELECT: &str =
    "SELECT id, name, display_order, service_availability, created_at, updated_at FROM menu_group";

/// All menu groups ordered by display_order
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<MenuGroup>> {
    let rows = sqlx::query_as::<_, Row>(&format!("{SELECT} ORDER BY display_order, id"))
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(MenuGroup::try_from).collect()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuGroup>> {
    let row = sqlx::query_as::<_, Row>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(MenuGroup::try_from).transpose()
}

pub async fn exists(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM menu_group WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Highest display_order in use, if any menu group exists
pub async fn max_display_order(pool: &SqlitePool) -> RepoResult<Option<i32>> {
    let (max,): (Option<i32>,) = sqlx::query_as("SELECT MAX(display_order) FROM menu_group")
        .fetch_one(pool)
        .await?;
    Ok(max)
}

pub async fn insert(pool: &SqlitePool, group: &MenuGroup) -> RepoResult<()> {
    let availability = serde_json::to_string(&group.service_availability)
        .map_err(|e| RepoError::Database(e.to_string()))?;
    sqlx::query(
        "INSERT INTO menu_group (id, name, display_order, service_availability, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(group.id)
    .bind(&group.name)
    .bind(group.display_order)
    .bind(availability)
    .bind(group.created_at)
    .bind(group.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update(pool: &SqlitePool, group: &MenuGroup) -> RepoResult<()> {
    let availability = serde_json::to_string(&group.service_availability)
        .map_err(|e| RepoError::Database(e.to_string()))?;
    let result = sqlx::query(
        "UPDATE menu_group SET name = ?, display_order = ?, service_availability = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&group.name)
    .bind(group.display_order)
    .bind(availability)
    .bind(group.updated_at)
    .bind(group.id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu group {} not found", group.id)));
    }
    Ok(())
}

/// Hard delete; memberships, overrides and sync records cascade
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM menu_group WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
