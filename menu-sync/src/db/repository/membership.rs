//! Category Membership Repository

use super::menu_category;
use super::{RepoError, RepoResult};
use shared::models::{CategoryMembership, MembershipDetail, MenuCategory};
use sqlx::{SqliteConnection, SqlitePool};

#[derive(sqlx::FromRow)]
struct DetailRow {
    menu_group_id: i64,
    sort_order: i32,
    item_count: i64,
    #[sqlx(flatten)]
    category: menu_category::Row,
}

/// Memberships of a menu group joined with their categories, in display order
pub async fn list_for_menu(pool: &SqlitePool, menu_group_id: i64) -> RepoResult<Vec<MembershipDetail>> {
    let rows = sqlx::query_as::<_, DetailRow>(
        "SELECT cm.menu_group_id, cm.sort_order, \
                (SELECT COUNT(*) FROM category_item ci WHERE ci.category_id = c.id) AS item_count, \
                c.id, c.name, c.origin, c.source_category_id, c.created_at, c.updated_at \
         FROM category_membership cm JOIN menu_category c ON c.id = cm.category_id \
         WHERE cm.menu_group_id = ? ORDER BY cm.sort_order, c.id",
    )
    .bind(menu_group_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| {
            Ok(MembershipDetail {
                menu_group_id: r.menu_group_id,
                sort_order: r.sort_order,
                item_count: r.item_count,
                category: MenuCategory::try_from(r.category)?,
            })
        })
        .collect()
}

/// Registry categories not yet in the menu group
pub async fn available_for_menu(pool: &SqlitePool, menu_group_id: i64) -> RepoResult<Vec<MenuCategory>> {
    let rows = sqlx::query_as::<_, menu_category::Row>(
        "SELECT id, name, origin, source_category_id, created_at, updated_at FROM menu_category \
         WHERE id NOT IN (SELECT category_id FROM category_membership WHERE menu_group_id = ?) \
         ORDER BY origin DESC, name COLLATE NOCASE, id",
    )
    .bind(menu_group_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(MenuCategory::try_from).collect()
}

pub async fn find(
    pool: &SqlitePool,
    menu_group_id: i64,
    category_id: i64,
) -> RepoResult<Option<CategoryMembership>> {
    let row: Option<(i64, i64, i32)> = sqlx::query_as(
        "SELECT menu_group_id, category_id, sort_order FROM category_membership WHERE menu_group_id = ? AND category_id = ?",
    )
    .bind(menu_group_id)
    .bind(category_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(menu_group_id, category_id, sort_order)| CategoryMembership {
        menu_group_id,
        category_id,
        sort_order,
    }))
}

/// Category ids of a menu group in display order
pub async fn category_ids(pool: &SqlitePool, menu_group_id: i64) -> RepoResult<Vec<i64>> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        "SELECT category_id FROM category_membership WHERE menu_group_id = ? ORDER BY sort_order, category_id",
    )
    .bind(menu_group_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Append a membership after the current last one
pub async fn append(
    conn: &mut SqliteConnection,
    menu_group_id: i64,
    category_id: i64,
) -> RepoResult<CategoryMembership> {
    let (sort_order,): (i32,) = sqlx::query_as(
        "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM category_membership WHERE menu_group_id = ?",
    )
    .bind(menu_group_id)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query(
        "INSERT INTO category_membership (menu_group_id, category_id, sort_order) VALUES (?, ?, ?)",
    )
    .bind(menu_group_id)
    .bind(category_id)
    .bind(sort_order)
    .execute(&mut *conn)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!(
            "Category {category_id} is already in menu group {menu_group_id}"
        )),
        other => other,
    })?;

    Ok(CategoryMembership {
        menu_group_id,
        category_id,
        sort_order,
    })
}

pub async fn delete(conn: &mut SqliteConnection, menu_group_id: i64, category_id: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        "DELETE FROM category_membership WHERE menu_group_id = ? AND category_id = ?",
    )
    .bind(menu_group_id)
    .bind(category_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Rewrite sort orders to match the position of each id, in one transaction
pub async fn reorder(pool: &SqlitePool, menu_group_id: i64, category_ids: &[i64]) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    for (position, category_id) in category_ids.iter().enumerate() {
        let result = sqlx::query(
            "UPDATE category_membership SET sort_order = ? WHERE menu_group_id = ? AND category_id = ?",
        )
        .bind(position as i32)
        .bind(menu_group_id)
        .bind(category_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            // Dropping the transaction rolls back the rows already written
            return Err(RepoError::NotFound(format!(
                "Category {category_id} is not in menu group {menu_group_id}"
            )));
        }
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{seed_menu_group, test_pool};
    use shared::models::CategoryOrigin;

    async fn seed_categories(pool: &SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        for (id, name, source) in [(1, "Mains", Some(10)), (2, "Drinks", Some(20)), (3, "Specials", None)] {
            menu_category::insert(
                &mut conn,
                &MenuCategory {
                    id,
                    name: name.to_string(),
                    origin: if source.is_some() {
                        CategoryOrigin::System
                    } else {
                        CategoryOrigin::Custom
                    },
                    source_category_id: source,
                    created_at: 1,
                    updated_at: 1,
                },
            )
            .await
            .unwrap();
        }
        menu_category::add_item(&mut conn, 1, 100, 1).await.unwrap();
        menu_category::add_item(&mut conn, 1, 101, 1).await.unwrap();
    }

    #[tokio::test]
    async fn test_append_orders_at_end() {
        let pool = test_pool().await;
        seed_menu_group(&pool, 1, "Lunch").await;
        seed_categories(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(append(&mut conn, 1, 2).await.unwrap().sort_order, 0);
        assert_eq!(append(&mut conn, 1, 1).await.unwrap().sort_order, 1);
        assert!(matches!(append(&mut conn, 1, 1).await, Err(RepoError::Duplicate(_))));
        drop(conn);

        let details = list_for_menu(&pool, 1).await.unwrap();
        let ids: Vec<_> = details.iter().map(|d| d.category.id).collect();
        assert_eq!(ids, [2, 1]);
        assert_eq!(details[1].item_count, 2);
        assert_eq!(category_ids(&pool, 1).await.unwrap(), [2, 1]);

        let available: Vec<_> = available_for_menu(&pool, 1)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(available, [3]);
    }

    #[tokio::test]
    async fn test_reorder_is_atomic() {
        let pool = test_pool().await;
        seed_menu_group(&pool, 1, "Lunch").await;
        seed_categories(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        append(&mut conn, 1, 1).await.unwrap();
        append(&mut conn, 1, 2).await.unwrap();
        drop(conn);

        reorder(&pool, 1, &[2, 1]).await.unwrap();
        assert_eq!(category_ids(&pool, 1).await.unwrap(), [2, 1]);

        // Category 3 is not a member: nothing may change
        assert!(reorder(&pool, 1, &[1, 3]).await.is_err());
        assert_eq!(category_ids(&pool, 1).await.unwrap(), [2, 1]);
    }

    #[tokio::test]
    async fn test_memberships_cascade_with_menu_group() {
        let pool = test_pool().await;
        seed_menu_group(&pool, 1, "Lunch").await;
        seed_categories(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        append(&mut conn, 1, 1).await.unwrap();
        drop(conn);

        crate::db::repository::menu_group::delete(&pool, 1).await.unwrap();
        assert!(find(&pool, 1, 1).await.unwrap().is_none());
        // Category survives
        assert!(menu_category::find_by_id(&pool, 1).await.unwrap().is_some());
    }
}
