//! Static attribute tables for light state reproduction.
//!
//! The tables are immutable configuration data: build them once with
//! [`AttributeSpec::standard`] at startup and pass them by reference into the
//! selector and differ.

use serde_json::Value;

use super::attribute::AttributeKey;
use super::color_mode::ColorMode;

/// Conversion applied when rewriting a deprecated key to its modern form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Percentage (0-100) to a 0-255 level.
    PercentToLevel,
    /// Kelvin to mireds.
    KelvinToMired,
}

impl Conversion {
    /// Convert a deprecated value. Returns `None` when the value has no
    /// sensible modern equivalent (non-numeric, zero kelvin, ...).
    pub fn apply(self, value: &Value) -> Option<Value> {
        let raw = value.as_f64()?;
        match self {
            Conversion::PercentToLevel => {
                let level = (raw * 255.0 / 100.0).round().clamp(0.0, 255.0);
                Some(Value::from(level as u64))
            }
            Conversion::KelvinToMired => {
                if raw <= 0.0 {
                    return None;
                }
                Some(Value::from((1_000_000.0 / raw).round() as u64))
            }
        }
    }
}

/// A deprecated attribute that can be expressed through a modern one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rewrite {
    pub deprecated: AttributeKey,
    pub modern: AttributeKey,
    pub conversion: Conversion,
}

/// Attribute keys of which at most one may be selected, highest priority first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusiveGroup {
    pub members: Vec<AttributeKey>,
}

impl ExclusiveGroup {
    pub fn contains(&self, key: AttributeKey) -> bool {
        self.members.contains(&key)
    }
}

#[derive(Debug, Clone)]
pub struct AttributeSpec {
    /// Keys valid regardless of color mode
    pub common: Vec<AttributeKey>,

    /// Keys only replayed when the color mode is unknown
    pub legacy: Vec<AttributeKey>,

    /// Color attribute candidates, used when the mode does not name one
    pub color_group: ExclusiveGroup,

    /// Deprecated keys with a modern equivalent
    pub rewrites: Vec<Rewrite>,

    /// Valid keys that lights do not report back; scenes using them are warned
    /// about, but they are replayed unchanged
    pub warn_only: Vec<AttributeKey>,
}

impl AttributeSpec {
    /// The standard light tables.
    pub fn standard() -> Self {
        use AttributeKey::*;

        Self {
            common: vec![Brightness, Effect, Flash, Transition],
            legacy: vec![WhiteValue],
            color_group: ExclusiveGroup {
                members: vec![
                    HsColor, ColorTemp, RgbColor, RgbwColor, RgbwwColor, XyColor, White, Profile,
                    ColorName,
                ],
            },
            rewrites: vec![
                Rewrite {
                    deprecated: BrightnessPct,
                    modern: Brightness,
                    conversion: Conversion::PercentToLevel,
                },
                Rewrite {
                    deprecated: Kelvin,
                    modern: ColorTemp,
                    conversion: Conversion::KelvinToMired,
                },
            ],
            warn_only: vec![ColorName, Flash, Profile, Transition],
        }
    }

    /// The color attribute a known mode replays, if any.
    pub fn mode_color_key(&self, mode: ColorMode) -> Option<AttributeKey> {
        match mode {
            ColorMode::ColorTemp => Some(AttributeKey::ColorTemp),
            ColorMode::Hs => Some(AttributeKey::HsColor),
            ColorMode::Rgb => Some(AttributeKey::RgbColor),
            ColorMode::Rgbw => Some(AttributeKey::RgbwColor),
            ColorMode::Rgbww => Some(AttributeKey::RgbwwColor),
            ColorMode::White => Some(AttributeKey::White),
            ColorMode::Xy => Some(AttributeKey::XyColor),
            ColorMode::Brightness | ColorMode::OnOff | ColorMode::Unknown => None,
        }
    }

    /// Every key `mode` may emit.
    pub fn allowed_keys(&self, mode: ColorMode) -> Vec<AttributeKey> {
        let mut keys = self.common.clone();
        if mode.is_known() {
            keys.extend(self.mode_color_key(mode));
        } else {
            keys.extend(self.legacy.iter().copied());
            keys.extend(self.color_group.members.iter().copied());
        }
        keys
    }

    pub fn rewrite_for(&self, key: AttributeKey) -> Option<&Rewrite> {
        self.rewrites.iter().find(|r| r.deprecated == key)
    }

    /// Deprecated keys are exactly the rewrite sources.
    pub fn is_deprecated(&self, key: AttributeKey) -> bool {
        self.rewrite_for(key).is_some()
    }

    pub fn is_warn_only(&self, key: AttributeKey) -> bool {
        self.warn_only.contains(&key)
    }
}

impl Default for AttributeSpec {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_percent_to_level() {
        let conv = Conversion::PercentToLevel;
        assert_eq!(conv.apply(&json!(80)), Some(json!(204)));
        assert_eq!(conv.apply(&json!(100)), Some(json!(255)));
        assert_eq!(conv.apply(&json!(0)), Some(json!(0)));
        assert_eq!(conv.apply(&json!(150)), Some(json!(255)));
        assert_eq!(conv.apply(&json!(50.5)), Some(json!(129)));
        assert_eq!(conv.apply(&json!("80")), None);
    }

    #[test]
    fn test_kelvin_to_mired() {
        let conv = Conversion::KelvinToMired;
        assert_eq!(conv.apply(&json!(4000)), Some(json!(250)));
        assert_eq!(conv.apply(&json!(2700)), Some(json!(370)));
        assert_eq!(conv.apply(&json!(0)), None);
    }

    #[test]
    fn test_allowed_keys_never_contain_rewrite_sources() {
        let spec = AttributeSpec::standard();
        for mode in ColorMode::iter() {
            let allowed = spec.allowed_keys(mode);
            for rewrite in &spec.rewrites {
                assert!(!allowed.contains(&rewrite.deprecated), "{mode}");
            }
            assert!(!allowed.contains(&AttributeKey::ColorMode));
        }
    }

    #[test]
    fn test_warn_only_keys_are_not_deprecated() {
        let spec = AttributeSpec::standard();
        for key in &spec.warn_only {
            assert!(!spec.is_deprecated(*key), "{key}");
        }
        assert!(spec.is_deprecated(AttributeKey::BrightnessPct));
        assert!(spec.is_deprecated(AttributeKey::Kelvin));
    }

    #[test]
    fn test_known_modes_have_at_most_one_color() {
        let spec = AttributeSpec::standard();
        for mode in ColorMode::iter().filter(|m| m.is_known()) {
            let colors = spec
                .allowed_keys(mode)
                .into_iter()
                .filter(|k| spec.color_group.contains(*k))
                .count();
            assert!(colors <= 1, "{mode} allows {colors} colors");
        }
    }
}
