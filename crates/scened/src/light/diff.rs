use tracing::warn;

use super::attribute::AttributeKey;
use super::attribute::Attributes;
use super::normalize::normalize;
use super::select::select;
use super::state::Activation;
use super::state::Command;
use super::state::EntityState;
use super::tables::AttributeSpec;

/// Outcome of comparing a desired light state with the observed one.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// The light already matches.
    NoOp,
    Command(Command),
    /// The desired state value is neither `on` nor `off`.
    Unsupported(String),
}

/// Decide which command, if any, brings `current` in line with `desired`.
///
/// Only the selected attributes are compared, never the reported color mode.
/// A missing `current` means the light's state is unknown, so any valid
/// desired state results in a command.
pub fn diff(
    spec: &AttributeSpec,
    current: Option<&EntityState>,
    desired: &EntityState,
) -> Decision {
    let entity_id = desired.entity_id.clone();

    match &desired.state {
        Activation::Off => match current {
            Some(cur) if cur.state == Activation::Off => Decision::NoOp,
            _ => Decision::Command(Command::Deactivate { entity_id }),
        },
        Activation::On => {
            let mode = desired.color_mode();
            let normalized = normalize(spec, &desired.attributes);
            let attributes = select(spec, mode, &normalized.attributes);

            if let Some(key) = spec.mode_color_key(mode) {
                if !attributes.contains_key(&key) {
                    warn!(
                        "Color mode {} specified but attribute {} missing for: {}",
                        mode, key, entity_id
                    );
                }
            }

            let satisfied = current.is_some_and(|cur| {
                cur.state == Activation::On && attributes_match(spec, cur, &attributes)
            });

            if satisfied {
                Decision::NoOp
            } else {
                Decision::Command(Command::Activate {
                    entity_id,
                    attributes,
                })
            }
        }
        Activation::Unsupported(value) => Decision::Unsupported(value.clone()),
    }
}

/// Whether every selected attribute already holds on `current`.
fn attributes_match(spec: &AttributeSpec, current: &EntityState, selected: &Attributes) -> bool {
    let observed = normalize(spec, &current.attributes).attributes;

    selected.iter().all(|(key, value)| {
        let actual = match key {
            AttributeKey::White => observed
                .get(&AttributeKey::White)
                .or_else(|| observed.get(&AttributeKey::Brightness)),
            _ => observed.get(key),
        };
        actual == Some(value)
    })
}
