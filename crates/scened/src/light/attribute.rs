use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use strum::AsRefStr;
use strum::Display;
use strum::EnumIter;
use strum::EnumString;

/// Attribute names a light state may carry.
///
/// Variants are declared in wire-name order so that `Attributes` iterates
/// (and serializes) alphabetically.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttributeKey {
    Brightness,
    BrightnessPct,
    ColorMode,
    ColorName,
    ColorTemp,
    Effect,
    Flash,
    HsColor,
    Kelvin,
    Profile,
    RgbColor,
    RgbwColor,
    RgbwwColor,
    Transition,
    White,
    WhiteValue,
    XyColor,
}

/// Attribute mapping of a light state.
pub type Attributes = BTreeMap<AttributeKey, serde_json::Value>;

/// Convert a loosely typed JSON object into `Attributes`.
///
/// Attribute names outside of `AttributeKey` (friendly names, supported
/// features and the like) are dropped.
pub fn attributes_from_json(map: serde_json::Map<String, serde_json::Value>) -> Attributes {
    map.into_iter()
        .filter_map(|(name, value)| match name.parse::<AttributeKey>() {
            Ok(key) => Some((key, value)),
            Err(_) => {
                tracing::debug!("Ignoring unsupported attribute: {}", name);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_wire_names_are_sorted() {
        let names: Vec<String> = AttributeKey::iter().map(|k| k.to_string()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_serde_and_strum_names_agree() {
        for key in AttributeKey::iter() {
            let via_serde = serde_json::to_value(key).unwrap();
            assert_eq!(via_serde, json!(key.as_ref()));
        }
    }

    #[test]
    fn test_unknown_attributes_are_dropped() {
        let raw = json!({
            "brightness": 180,
            "friendly_name": "Kitchen",
            "supported_features": 44,
        });
        let serde_json::Value::Object(map) = raw else {
            unreachable!()
        };

        let attrs = attributes_from_json(map);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[&AttributeKey::Brightness], json!(180));
    }
}
