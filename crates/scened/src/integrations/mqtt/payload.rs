//! JSON payloads exchanged with MQTT lights.
//!
//! State is published on `<base>/<object_id>` as e.g.
//! `{"state": "ON", "brightness": 128, "color_mode": "hs", "hs_color": [30, 80]}`
//! and commands go to `<base>/<object_id>/set` in the same shape.

use crate::light::attribute::attributes_from_json;
use crate::light::Activation;
use crate::light::Command;
use crate::light::EntityState;

const LIGHT_DOMAIN: &str = "light.";

#[derive(Debug, thiserror::Error)]
pub enum StateParseError {
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("payload has no \"state\" field")]
    MissingState,
}

/// Entity id for a light published under `object_id`.
pub fn entity_id(object_id: &str) -> String {
    format!("{}{}", LIGHT_DOMAIN, object_id)
}

/// Command topic for a light entity, `None` for non-light entity ids.
pub fn command_topic(base_topic: &str, entity_id: &str) -> Option<String> {
    let object_id = entity_id.strip_prefix(LIGHT_DOMAIN)?;
    if object_id.is_empty() {
        return None;
    }
    Some(format!("{}/{}/set", base_topic, object_id))
}

/// Object id of a state topic, `None` for anything else (including `/set`).
pub fn state_object_id<'a>(base_topic: &str, topic: &'a str) -> Option<&'a str> {
    let object_id = topic.strip_prefix(base_topic)?.strip_prefix('/')?;
    if object_id.is_empty() || object_id.contains('/') {
        return None;
    }
    Some(object_id)
}

/// Encode a command as a light payload.
pub fn command_payload(cmd: &Command) -> Result<Vec<u8>, serde_json::Error> {
    let payload = match cmd {
        Command::Activate { attributes, .. } => {
            let mut payload = serde_json::Map::new();
            payload.insert("state".to_string(), serde_json::json!("ON"));
            for (key, value) in attributes {
                payload.insert(key.to_string(), value.clone());
            }
            serde_json::Value::Object(payload)
        }
        Command::Deactivate { .. } => serde_json::json!({ "state": "OFF" }),
    };

    serde_json::to_vec(&payload)
}

/// Decode a light state payload.
pub fn parse_state(entity_id: String, payload: &[u8]) -> Result<EntityState, StateParseError> {
    let serde_json::Value::Object(mut map) = serde_json::from_slice(payload)? else {
        return Err(StateParseError::NotAnObject);
    };

    let state = map
        .remove("state")
        .and_then(|v| v.as_str().map(str::to_lowercase))
        .ok_or(StateParseError::MissingState)?;

    Ok(EntityState {
        entity_id,
        state: Activation::from(state.as_str()),
        attributes: attributes_from_json(map),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::light::AttributeKey;
    use crate::light::ColorMode;

    #[test]
    fn test_topics() {
        assert_eq!(
            command_topic("scened", "light.kitchen"),
            Some("scened/kitchen/set".to_string())
        );
        assert_eq!(command_topic("scened", "switch.kitchen"), None);
        assert_eq!(command_topic("scened", "light."), None);

        assert_eq!(state_object_id("scened", "scened/kitchen"), Some("kitchen"));
        assert_eq!(state_object_id("scened", "scened/kitchen/set"), None);
        assert_eq!(state_object_id("scened", "other/kitchen"), None);
        assert_eq!(state_object_id("scened", "scenedx/kitchen"), None);
    }

    #[test]
    fn test_command_payload() {
        let on = Command::Activate {
            entity_id: "light.kitchen".to_string(),
            attributes: [
                (AttributeKey::Brightness, json!(128)),
                (AttributeKey::HsColor, json!([30, 80])),
            ]
            .into(),
        };
        let payload: serde_json::Value =
            serde_json::from_slice(&command_payload(&on).unwrap()).unwrap();
        assert_eq!(
            payload,
            json!({"state": "ON", "brightness": 128, "hs_color": [30, 80]})
        );

        let off = Command::Deactivate {
            entity_id: "light.kitchen".to_string(),
        };
        let payload: serde_json::Value =
            serde_json::from_slice(&command_payload(&off).unwrap()).unwrap();
        assert_eq!(payload, json!({"state": "OFF"}));
    }

    #[test]
    fn test_parse_state() {
        let payload = br#"{"state": "ON", "brightness": 128, "color_mode": "hs", "linkquality": 90}"#;

        let state = parse_state(entity_id("kitchen"), payload).unwrap();

        assert_eq!(state.entity_id, "light.kitchen");
        assert_eq!(state.state, Activation::On);
        assert_eq!(state.color_mode(), ColorMode::Hs);
        assert_eq!(state.attributes[&AttributeKey::Brightness], json!(128));
        // linkquality is not a light attribute
        assert_eq!(state.attributes.len(), 2);
    }

    #[test]
    fn test_parse_state_errors() {
        assert!(matches!(
            parse_state(entity_id("a"), b"not json"),
            Err(StateParseError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_state(entity_id("a"), b"[1, 2]"),
            Err(StateParseError::NotAnObject)
        ));
        assert!(matches!(
            parse_state(entity_id("a"), br#"{"brightness": 1}"#),
            Err(StateParseError::MissingState)
        ));
    }
}
