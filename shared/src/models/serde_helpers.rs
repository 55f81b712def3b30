//! Common serde helpers

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Deserialize bool that treats null as true
pub fn bool_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(true))
}

/// Tri-state patch field: absent (no change), `null` (clear), value (set)
///
/// Use with `#[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]`.
pub mod double_option {
    use super::*;

    pub fn serialize<S, T>(value: &Option<Option<T>>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        // Field present: either null or a value
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    struct Patch {
        #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
        price: Option<Option<i64>>,
        #[serde(default = "default_true", deserialize_with = "bool_true")]
        enabled: bool,
    }

    fn default_true() -> bool {
        true
    }

    #[test]
    fn test_double_option_distinguishes_absent_and_null() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.price, None);

        let null: Patch = serde_json::from_str(r#"{"price":null}"#).unwrap();
        assert_eq!(null.price, Some(None));

        let set: Patch = serde_json::from_str(r#"{"price":250}"#).unwrap();
        assert_eq!(set.price, Some(Some(250)));
    }

    #[test]
    fn test_double_option_serialize() {
        let patch = Patch {
            price: Some(None),
            enabled: true,
        };
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"price":null,"enabled":true}"#
        );
        let patch = Patch {
            price: None,
            enabled: false,
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"enabled":false}"#);
    }

    #[test]
    fn test_bool_true_null() {
        let patch: Patch = serde_json::from_str(r#"{"enabled":null}"#).unwrap();
        assert!(patch.enabled);
    }
}
