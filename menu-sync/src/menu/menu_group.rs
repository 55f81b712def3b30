//! Menu Group Manager
//!
//! Local CRUD for menu groups. Deleting a group never contacts the
//! platform; memberships, overrides and sync records go with it locally.

use chrono::NaiveTime;
use shared::ErrorCode;
use shared::models::{MenuGroup, MenuGroupCreate, MenuGroupUpdate, ServiceAvailability, Weekday};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;
use std::sync::Arc;

use super::error::{MenuError, MenuResult};
use super::store::OverrideStore;
use crate::db::repository::menu_group;

const TIME_FORMAT: &str = "%H:%M";

#[derive(Clone)]
pub struct MenuGroupManager {
    pool: SqlitePool,
    store: Arc<dyn OverrideStore>,
}

impl MenuGroupManager {
    pub fn new(pool: SqlitePool, store: Arc<dyn OverrideStore>) -> Self {
        Self { pool, store }
    }

    /// All menu groups by display order
    pub async fn list(&self) -> MenuResult<Vec<MenuGroup>> {
        Ok(menu_group::find_all(&self.pool).await?)
    }

    pub async fn get(&self, id: i64) -> MenuResult<MenuGroup> {
        menu_group::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| MenuError::menu_group_not_found(id))
    }

    pub async fn create(&self, data: MenuGroupCreate) -> MenuResult<MenuGroup> {
        let name = validate_name(&data.name)?;
        let service_availability = data.service_availability.unwrap_or_default();
        validate_availability(&service_availability)?;

        let display_order = match data.display_order {
            Some(order) => order,
            None => menu_group::max_display_order(&self.pool)
                .await?
                .map_or(0, |max| max + 1),
        };

        let now = now_millis();
        let group = MenuGroup {
            id: snowflake_id(),
            name,
            display_order,
            service_availability,
            created_at: now,
            updated_at: now,
        };
        menu_group::insert(&self.pool, &group).await?;
        tracing::info!(menu_group_id = group.id, name = %group.name, "Menu group created");
        Ok(group)
    }

    pub async fn update(&self, id: i64, data: MenuGroupUpdate) -> MenuResult<MenuGroup> {
        let mut group = self.get(id).await?;
        if let Some(name) = data.name {
            group.name = validate_name(&name)?;
        }
        if let Some(availability) = data.service_availability {
            validate_availability(&availability)?;
            group.service_availability = availability;
        }
        if let Some(order) = data.display_order {
            group.display_order = order;
        }
        group.updated_at = now_millis();
        menu_group::update(&self.pool, &group).await?;
        Ok(group)
    }

    /// Delete locally; memberships and sync records cascade
    pub async fn delete(&self, id: i64) -> MenuResult<()> {
        if !menu_group::exists(&self.pool, id).await? {
            return Err(MenuError::menu_group_not_found(id));
        }
        let overrides = self.store.delete_for_menu(id).await?;
        menu_group::delete(&self.pool, id).await?;
        tracing::info!(menu_group_id = id, overrides, "Menu group deleted");
        Ok(())
    }
}

fn validate_name(name: &str) -> MenuResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MenuError::validation(
            ErrorCode::RequiredField,
            "Menu group name must not be empty",
        ));
    }
    Ok(name.to_string())
}

/// Every interval must be `HH:MM`-`HH:MM` with start before end
pub fn validate_availability(availability: &ServiceAvailability) -> MenuResult<()> {
    for (day, ranges) in availability.iter() {
        for range in ranges {
            let start = parse_time(&range.start_time, day)?;
            let end = parse_time(&range.end_time, day)?;
            if start >= end {
                return Err(MenuError::validation(
                    ErrorCode::InvalidServiceAvailability,
                    format!(
                        "{day}: start time {} must be before end time {}",
                        range.start_time, range.end_time
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn parse_time(value: &str, day: &Weekday) -> MenuResult<NaiveTime> {
    // chrono accepts single-digit hours; the stored format is strictly HH:MM
    if value.len() != 5 {
        return Err(invalid_time(value, day));
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|_| invalid_time(value, day))
}

fn invalid_time(value: &str, day: &Weekday) -> MenuError {
    MenuError::validation(
        ErrorCode::InvalidServiceAvailability,
        format!("{day}: '{value}' is not a valid HH:MM time"),
    )
}
