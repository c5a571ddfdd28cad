//! Serde helpers for query-string deserialization.
//!
//! The dashboard's filter controls send an empty string when a dropdown is
//! left on "all categories", which cannot be parsed as an integer. Treat an
//! empty string the same as an absent parameter.

use serde::{Deserialize, Deserializer};

pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Params {
        #[serde(default, deserialize_with = "super::deserialize_optional_i64")]
        category_id: Option<i64>,
    }

    #[test]
    fn test_empty_string_is_none() {
        let p: Params = serde_json::from_value(serde_json::json!({"category_id": ""})).unwrap();
        assert_eq!(p.category_id, None);

        let p: Params = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(p.category_id, None);
    }

    #[test]
    fn test_numeric_string_parses() {
        let p: Params = serde_json::from_value(serde_json::json!({"category_id": "7"})).unwrap();
        assert_eq!(p.category_id, Some(7));
    }

    #[test]
    fn test_garbage_is_an_error() {
        let result: Result<Params, _> =
            serde_json::from_value(serde_json::json!({"category_id": "abc"}));
        assert!(result.is_err());
    }
}
