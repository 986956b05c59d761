use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::light::EntityState;

/// Snapshot of every light's observed state, keyed by entity id.
pub type States = HashMap<String, EntityState>;

/// Store of observed light states.
///
/// Readers take a cheap `Arc` snapshot; writers swap in a whole new map, so a
/// snapshot never changes underneath a reproduction in progress.
#[derive(Debug, Default)]
pub struct StateStore {
    states: ArcSwap<States>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_states(states: impl IntoIterator<Item = EntityState>) -> Self {
        let map: States = states
            .into_iter()
            .map(|s| (s.entity_id.clone(), s))
            .collect();
        Self {
            states: ArcSwap::from_pointee(map),
        }
    }

    /// Get a snapshot of all observed states.
    pub fn snapshot(&self) -> Arc<States> {
        self.states.load_full()
    }

    pub fn get(&self, entity_id: &str) -> Option<EntityState> {
        self.states.load().get(entity_id).cloned()
    }

    /// Record the observed state of an entity, replacing any previous one.
    pub fn set(&self, state: EntityState) {
        self.states.rcu(|states| {
            let mut next = States::clone(states);
            next.insert(state.entity_id.clone(), state.clone());
            next
        });
    }

    pub fn remove(&self, entity_id: &str) -> Option<EntityState> {
        let previous = self.states.rcu(|states| {
            let mut next = States::clone(states);
            next.remove(entity_id);
            next
        });
        previous.get(entity_id).cloned()
    }
}
