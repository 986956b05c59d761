use super::attribute::AttributeKey;
use super::attribute::Attributes;
use super::tables::AttributeSpec;

/// Result of normalizing an attribute set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Normalized {
    pub attributes: Attributes,

    /// Rewrite sources found in the input, in key order
    pub deprecated: Vec<AttributeKey>,
}

/// Rewrite deprecated attribute names to their modern equivalents.
///
/// An explicitly supplied modern key wins over a rewritten one. Every other
/// key passes through unchanged, warn-only keys included.
/// Logging is left to the caller so current state can be normalized quietly.
pub fn normalize(spec: &AttributeSpec, attributes: &Attributes) -> Normalized {
    let mut out = Attributes::new();
    let mut deprecated = Vec::new();
    let mut rewritten = Vec::new();

    for (key, value) in attributes {
        if spec.is_deprecated(*key) {
            deprecated.push(*key);
        }

        match spec.rewrite_for(*key) {
            Some(rewrite) => rewritten.push((rewrite, value)),
            None => {
                out.insert(*key, value.clone());
            }
        }
    }

    for (rewrite, value) in rewritten {
        if out.contains_key(&rewrite.modern) {
            continue;
        }
        if let Some(modern) = rewrite.conversion.apply(value) {
            out.insert(rewrite.modern, modern);
        }
    }

    Normalized {
        attributes: out,
        deprecated,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn attrs(pairs: &[(AttributeKey, serde_json::Value)]) -> Attributes {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn test_brightness_pct_is_rewritten() {
        let spec = AttributeSpec::standard();
        let input = attrs(&[(AttributeKey::BrightnessPct, json!(80))]);

        let result = normalize(&spec, &input);

        assert_eq!(
            result.attributes,
            attrs(&[(AttributeKey::Brightness, json!(204))])
        );
        assert_eq!(result.deprecated, vec![AttributeKey::BrightnessPct]);
    }

    #[test]
    fn test_explicit_modern_key_wins() {
        let spec = AttributeSpec::standard();
        let input = attrs(&[
            (AttributeKey::Brightness, json!(10)),
            (AttributeKey::BrightnessPct, json!(80)),
            (AttributeKey::ColorTemp, json!(300)),
            (AttributeKey::Kelvin, json!(4000)),
        ]);

        let result = normalize(&spec, &input);

        assert_eq!(
            result.attributes,
            attrs(&[
                (AttributeKey::Brightness, json!(10)),
                (AttributeKey::ColorTemp, json!(300)),
            ])
        );
        assert_eq!(
            result.deprecated,
            vec![AttributeKey::BrightnessPct, AttributeKey::Kelvin]
        );
    }

    #[test]
    fn test_warn_only_keys_pass_through() {
        let spec = AttributeSpec::standard();
        let input = attrs(&[
            (AttributeKey::ColorName, json!("red")),
            (AttributeKey::Transition, json!(15)),
            (AttributeKey::Effect, json!("random")),
        ]);

        let result = normalize(&spec, &input);

        assert_eq!(result.attributes, input);
        assert!(result.deprecated.is_empty());
    }

    #[test]
    fn test_unconvertible_value_is_dropped() {
        let spec = AttributeSpec::standard();
        let input = attrs(&[(AttributeKey::Kelvin, json!("warm"))]);

        let result = normalize(&spec, &input);

        assert!(result.attributes.is_empty());
        assert_eq!(result.deprecated, vec![AttributeKey::Kelvin]);
    }
}
