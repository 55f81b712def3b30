//! Composite Key
//!
//! Canonical identity of a configurable entity (item, or item + modifier
//! option) inside one menu group's configuration scope.
//!
//! Keys are typed: two distinct `(scope, entity, menu_group_id)` triples are
//! never equal, and their canonical strings never collide because every
//! component is an integer and the separators cannot appear inside one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Override scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideScope {
    Item,
    ModifierOption,
}

impl OverrideScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::ModifierOption => "modifier_option",
        }
    }
}

impl FromStr for OverrideScope {
    type Err = InvalidKeyString;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "item" => Ok(Self::Item),
            "modifier_option" => Ok(Self::ModifierOption),
            other => Err(InvalidKeyString(format!("unknown scope '{other}'"))),
        }
    }
}

/// Entity part of a composite key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum EntityRef {
    Item {
        item_id: i64,
    },
    ModifierOption {
        item_id: i64,
        modifier_group_id: i64,
        modifier_option_id: i64,
    },
}

impl EntityRef {
    pub fn scope(&self) -> OverrideScope {
        match self {
            Self::Item { .. } => OverrideScope::Item,
            Self::ModifierOption { .. } => OverrideScope::ModifierOption,
        }
    }

    /// Owning catalog item
    pub fn item_id(&self) -> i64 {
        match self {
            Self::Item { item_id } | Self::ModifierOption { item_id, .. } => *item_id,
        }
    }

    pub fn in_menu(self, menu_group_id: i64) -> CompositeKey {
        CompositeKey {
            entity: self,
            menu_group_id,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item { item_id } => write!(f, "item:{item_id}"),
            Self::ModifierOption {
                item_id,
                modifier_group_id,
                modifier_option_id,
            } => write!(
                f,
                "modifier_option:{item_id}:{modifier_group_id}:{modifier_option_id}"
            ),
        }
    }
}

/// `(scope, entity, menu_group_id)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompositeKey {
    #[serde(flatten)]
    pub entity: EntityRef,
    pub menu_group_id: i64,
}

impl CompositeKey {
    pub fn item(item_id: i64, menu_group_id: i64) -> Self {
        EntityRef::Item { item_id }.in_menu(menu_group_id)
    }

    pub fn modifier(
        item_id: i64,
        modifier_group_id: i64,
        modifier_option_id: i64,
        menu_group_id: i64,
    ) -> Self {
        EntityRef::ModifierOption {
            item_id,
            modifier_group_id,
            modifier_option_id,
        }
        .in_menu(menu_group_id)
    }

    pub fn scope(&self) -> OverrideScope {
        self.entity.scope()
    }

    pub fn item_id(&self) -> i64 {
        self.entity.item_id()
    }

    /// Canonical string form: `item:<item>@<menu>` or
    /// `modifier_option:<item>:<group>:<option>@<menu>`
    pub fn key_string(&self) -> String {
        self.to_string()
    }

    /// Inverse of [`key_string`](Self::key_string)
    pub fn parse_key_string(s: &str) -> Result<Self, InvalidKeyString> {
        s.parse()
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.entity, self.menu_group_id)
    }
}

/// Malformed composite key string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid composite key: {0}")]
pub struct InvalidKeyString(pub String);

impl FromStr for CompositeKey {
    type Err = InvalidKeyString;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (entity, menu) = s
            .rsplit_once('@')
            .ok_or_else(|| InvalidKeyString(format!("missing menu group in '{s}'")))?;
        let menu_group_id = parse_id(menu, s)?;

        let mut parts = entity.split(':');
        let scope: OverrideScope = parts.next().unwrap_or_default().parse()?;
        let ids = parts.map(|p| parse_id(p, s)).collect::<Result<Vec<_>, _>>()?;

        match (scope, ids.as_slice()) {
            (OverrideScope::Item, [item_id]) => Ok(Self::item(*item_id, menu_group_id)),
            (OverrideScope::ModifierOption, [item_id, group_id, option_id]) => Ok(
                Self::modifier(*item_id, *group_id, *option_id, menu_group_id),
            ),
            _ => Err(InvalidKeyString(format!("wrong number of ids in '{s}'"))),
        }
    }
}

fn parse_id(part: &str, whole: &str) -> Result<i64, InvalidKeyString> {
    part.parse()
        .map_err(|_| InvalidKeyString(format!("'{part}' is not an id in '{whole}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_string_format() {
        assert_eq!(CompositeKey::item(12, 3).key_string(), "item:12@3");
        assert_eq!(
            CompositeKey::modifier(12, 4, 5, 3).key_string(),
            "modifier_option:12:4:5@3"
        );
    }

    #[test]
    fn test_key_string_parses_back() {
        let keys = [
            CompositeKey::item(1, 1),
            CompositeKey::item(-7, 42),
            CompositeKey::modifier(1, 2, 3, 4),
        ];
        for key in keys {
            assert_eq!(CompositeKey::parse_key_string(&key.key_string()).unwrap(), key);
        }
    }

    #[test]
    fn test_malformed_key_strings_rejected() {
        for bad in ["item:1", "item:1:2@3", "modifier_option:1:2@3", "thing:1@2", "item:x@1"] {
            assert!(bad.parse::<CompositeKey>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_distinct_triples_never_collide() {
        // Ids that would collide under naive "a-b" concatenation
        let mut keys = Vec::new();
        for menu in [1, 11, 111] {
            for item in [1, 11, 111] {
                keys.push(CompositeKey::item(item, menu));
                for group in [1, 11] {
                    for option in [1, 11] {
                        keys.push(CompositeKey::modifier(item, group, option, menu));
                    }
                }
            }
        }
        let distinct: HashSet<_> = keys.iter().copied().collect();
        let strings: HashSet<_> = keys.iter().map(|k| k.key_string()).collect();
        assert_eq!(distinct.len(), keys.len());
        assert_eq!(strings.len(), keys.len());
    }

    #[test]
    fn test_scope_separates_item_from_modifier() {
        let item = CompositeKey::item(5, 1);
        let modifier = CompositeKey::modifier(5, 0, 0, 1);
        assert_ne!(item, modifier);
        assert_eq!(item.scope(), OverrideScope::Item);
        assert_eq!(modifier.scope(), OverrideScope::ModifierOption);
        assert_eq!(modifier.item_id(), 5);
    }

    #[test]
    fn test_serde_flattens_entity() {
        let key = CompositeKey::modifier(1, 2, 3, 4);
        let json = serde_json::to_value(key).unwrap();
        assert_eq!(json["scope"], "modifier_option");
        assert_eq!(json["modifier_group_id"], 2);
        assert_eq!(json["menu_group_id"], 4);
        let back: CompositeKey = serde_json::from_value(json).unwrap();
        assert_eq!(back, key);
    }
}
