use super::attribute::AttributeKey;
use super::attribute::Attributes;
use super::color_mode::ColorMode;
use super::tables::AttributeSpec;

/// Narrow `attributes` to the subset `mode` replays.
///
/// Expects normalized input. A scene's `white` level stands in for
/// `brightness` when the latter is missing, and whenever `white` is selected
/// it carries the resolved brightness, since that is how a light in white
/// mode reports its level. A mode color that cannot be supplied is left out.
pub fn select(spec: &AttributeSpec, mode: ColorMode, attributes: &Attributes) -> Attributes {
    let mut selected = Attributes::new();

    let level = attributes
        .get(&AttributeKey::Brightness)
        .or_else(|| attributes.get(&AttributeKey::White))
        .cloned();

    for key in &spec.common {
        if *key == AttributeKey::Brightness {
            if let Some(level) = &level {
                selected.insert(*key, level.clone());
            }
        } else if let Some(value) = attributes.get(key) {
            selected.insert(*key, value.clone());
        }
    }

    let color = if mode.is_known() {
        spec.mode_color_key(mode)
    } else {
        for key in &spec.legacy {
            if let Some(value) = attributes.get(key) {
                selected.insert(*key, value.clone());
            }
        }
        spec.color_group
            .members
            .iter()
            .copied()
            .find(|key| attributes.contains_key(key))
    };

    if let Some(key) = color {
        let value = if key == AttributeKey::White {
            level
        } else {
            attributes.get(&key).cloned()
        };

        if let Some(value) = value {
            selected.insert(key, value);
        }
    }

    selected
}
