use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use super::attribute::attributes_from_json;
use super::attribute::AttributeKey;
use super::attribute::Attributes;
use super::color_mode::ColorMode;

/// On/off state of a light, as reported or requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Activation {
    On,
    Off,
    /// Anything else; never reproduced.
    Unsupported(String),
}

impl Activation {
    pub fn as_str(&self) -> &str {
        match self {
            Activation::On => "on",
            Activation::Off => "off",
            Activation::Unsupported(other) => other,
        }
    }
}

impl From<&str> for Activation {
    fn from(value: &str) -> Self {
        match value {
            "on" => Activation::On,
            "off" => Activation::Off,
            other => Activation::Unsupported(other.to_string()),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Activation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Activation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Activation::from(raw.as_str()))
    }
}

/// Immutable snapshot of a light entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEntityState")]
pub struct EntityState {
    pub entity_id: String,
    pub state: Activation,
    pub attributes: Attributes,
}

/// Wire form of `EntityState`; attribute names are validated on conversion.
#[derive(Deserialize)]
struct RawEntityState {
    entity_id: String,
    state: Activation,
    #[serde(default)]
    attributes: serde_json::Map<String, serde_json::Value>,
}

impl From<RawEntityState> for EntityState {
    fn from(raw: RawEntityState) -> Self {
        Self {
            entity_id: raw.entity_id,
            state: raw.state,
            attributes: attributes_from_json(raw.attributes),
        }
    }
}

impl EntityState {
    pub fn new(entity_id: impl Into<String>, state: Activation) -> Self {
        Self {
            entity_id: entity_id.into(),
            state,
            attributes: Attributes::new(),
        }
    }

    /// The recorded color mode, `Unknown` if absent or unrecognised.
    pub fn color_mode(&self) -> ColorMode {
        self.attributes
            .get(&AttributeKey::ColorMode)
            .and_then(|v| v.as_str())
            .map(ColorMode::from_wire)
            .unwrap_or_default()
    }
}

/// Command handed to the dispatcher to bring a light into line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "service")]
pub enum Command {
    /// Turn the light on with the complete resolved attribute set.
    #[serde(rename = "turn_on")]
    Activate {
        entity_id: String,
        #[serde(flatten)]
        attributes: Attributes,
    },

    /// Turn the light off.
    #[serde(rename = "turn_off")]
    Deactivate { entity_id: String },
}

impl Command {
    pub fn entity_id(&self) -> &str {
        match self {
            Command::Activate { entity_id, .. } | Command::Deactivate { entity_id } => entity_id,
        }
    }
}
