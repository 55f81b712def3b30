//! Menu Group Model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Day of week, Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opening interval, `HH:MM` local time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_time: String,
    pub end_time: String,
}

impl TimeRange {
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }
}

/// Weekly schedule: weekday -> ordered intervals
///
/// Multiple (even overlapping) intervals per day are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceAvailability(pub BTreeMap<Weekday, Vec<TimeRange>>);

impl ServiceAvailability {
    /// Open all day, every day
    pub fn all_day() -> Self {
        Self(
            Weekday::ALL
                .into_iter()
                .map(|day| (day, vec![TimeRange::new("00:00", "23:59")]))
                .collect(),
        )
    }

    pub fn day(&self, day: Weekday) -> &[TimeRange] {
        self.0.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Weekday, &Vec<TimeRange>)> {
        self.0.iter()
    }
}

impl Default for ServiceAvailability {
    fn default() -> Self {
        Self::all_day()
    }
}

/// Named, independently schedulable menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuGroup {
    pub id: i64,
    pub name: String,
    pub display_order: i32,
    pub service_availability: ServiceAvailability,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create menu group payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuGroupCreate {
    pub name: String,
    /// Defaults to every day 00:00-23:59
    #[serde(default)]
    pub service_availability: Option<ServiceAvailability>,
    /// Defaults to after the last menu group
    #[serde(default)]
    pub display_order: Option<i32>,
}

/// Update menu group payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuGroupUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub service_availability: Option<ServiceAvailability>,
    #[serde(default)]
    pub display_order: Option<i32>,
}
