//! Registry Category Repository
//!
//! `menu_category` rows plus their `category_item` associations.

use super::{RepoError, RepoResult};
use shared::models::{CategoryOrigin, MenuCategory};
use sqlx::{SqliteConnection, SqlitePool};

#[derive(sqlx::FromRow)]
pub(crate) struct Row {
    pub id: i64,
    pub name: String,
    pub origin: String,
    pub source_category_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<Row> for MenuCategory {
    type Error = RepoError;

    fn try_from(r: Row) -> Result<Self, Self::Error> {
        let origin: CategoryOrigin = r.origin.parse().map_err(RepoError::Database)?;
        Ok(MenuCategory {
            id: r.id,
            name: r.name,
            origin,
            source_category_id: r.source_category_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

const SELECT: &str =
    "SELECT id, name, origin, source_category_id, created_at, updated_at FROM menu_category";

/// All registry categories, system first, then by name
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<MenuCategory>> {
    let rows = sqlx::query_as::<_, Row>(&format!(
        "{SELECT} ORDER BY origin DESC, name COLLATE NOCASE, id"
    ))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(MenuCategory::try_from).collect()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuCategory>> {
    let row = sqlx::query_as::<_, Row>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(MenuCategory::try_from).transpose()
}

/// System category linked to a POS category
pub async fn find_by_source(
    pool: &SqlitePool,
    source_category_id: i64,
) -> RepoResult<Option<MenuCategory>> {
    let row = sqlx::query_as::<_, Row>(&format!("{SELECT} WHERE source_category_id = ?"))
        .bind(source_category_id)
        .fetch_optional(pool)
        .await?;
    row.map(MenuCategory::try_from).transpose()
}

/// Case-insensitive name lookup across system and custom categories
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<MenuCategory>> {
    let row = sqlx::query_as::<_, Row>(&format!(
        "{SELECT} WHERE name = ? COLLATE NOCASE LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;
    row.map(MenuCategory::try_from).transpose()
}

pub async fn insert(conn: &mut SqliteConnection, category: &MenuCategory) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO menu_category (id, name, origin, source_category_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(category.id)
    .bind(&category.name)
    .bind(category.origin.as_str())
    .bind(category.source_category_id)
    .bind(category.created_at)
    .bind(category.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Follow a POS rename; origin and link are untouched
pub async fn rename(pool: &SqlitePool, id: i64, name: &str, now: i64) -> RepoResult<()> {
    sqlx::query("UPDATE menu_category SET name = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Hard delete; memberships and item associations cascade
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM menu_category WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ── Category items ──

/// Item ids associated with a category, ascending
pub async fn item_ids(pool: &SqlitePool, category_id: i64) -> RepoResult<Vec<i64>> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        "SELECT pos_item_id FROM category_item WHERE category_id = ? ORDER BY pos_item_id",
    )
    .bind(category_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Associate an item; returns false if it was already there
pub async fn add_item(
    conn: &mut SqliteConnection,
    category_id: i64,
    pos_item_id: i64,
    now: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO category_item (category_id, pos_item_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(category_id)
    .bind(pos_item_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn remove_item(pool: &SqlitePool, category_id: i64, pos_item_id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM category_item WHERE category_id = ? AND pos_item_id = ?")
        .bind(category_id)
        .bind(pos_item_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
