use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::dispatch::Dispatcher;
use super::store::StateStore;
use crate::light::diff;
use crate::light::AttributeSpec;
use crate::light::Command;
use crate::light::Decision;
use crate::light::EntityState;

/// An entity whose desired state could not be reproduced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unsupported {
    pub entity_id: String,
    pub state: String,
}

/// An entity whose command could not be produced or dispatched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub entity_id: String,
    pub error: String,
}

/// Summary of one reproduction batch, each list sorted by entity id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReproduceReport {
    pub dispatched: Vec<Command>,
    pub unchanged: Vec<String>,
    pub unsupported: Vec<Unsupported>,
    pub failed: Vec<Failure>,
}

enum Outcome {
    Dispatched(Command),
    Unchanged,
    Unsupported(String),
    Failed(String),
}

/// Brings lights in line with a list of desired states.
///
/// Every entity is decided and dispatched in its own task: there is no
/// ordering between entities, and one entity failing does not affect others.
pub struct Reproducer {
    spec: Arc<AttributeSpec>,
    store: Arc<StateStore>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl Reproducer {
    pub fn new(
        spec: Arc<AttributeSpec>,
        store: Arc<StateStore>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            spec,
            store,
            dispatcher,
        }
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// Reproduce a batch of desired states.
    pub async fn reproduce(&self, desired: Vec<EntityState>) -> ReproduceReport {
        let desired = dedup_last_wins(desired);
        let current = self.store.snapshot();

        info!(
            "Reproducing {} state(s) via {} dispatcher",
            desired.len(),
            self.dispatcher.name()
        );

        let handles: Vec<(String, JoinHandle<Outcome>)> = desired
            .into_iter()
            .map(|state| {
                let entity_id = state.entity_id.clone();
                let spec = Arc::clone(&self.spec);
                let dispatcher = Arc::clone(&self.dispatcher);
                let current = current.get(&entity_id).cloned();

                let handle = tokio::spawn(async move {
                    reproduce_one(&spec, dispatcher.as_ref(), current.as_ref(), &state).await
                });
                (entity_id, handle)
            })
            .collect();

        let mut report = ReproduceReport::default();
        for (entity_id, handle) in handles {
            match handle.await {
                Ok(Outcome::Dispatched(cmd)) => report.dispatched.push(cmd),
                Ok(Outcome::Unchanged) => report.unchanged.push(entity_id),
                Ok(Outcome::Unsupported(state)) => {
                    report.unsupported.push(Unsupported { entity_id, state })
                }
                Ok(Outcome::Failed(error)) => report.failed.push(Failure { entity_id, error }),
                Err(e) => {
                    warn!("Reproduction task for {} failed: {}", entity_id, e);
                    report.failed.push(Failure {
                        entity_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        report
            .dispatched
            .sort_by(|a, b| a.entity_id().cmp(b.entity_id()));
        report.unchanged.sort();
        report
            .unsupported
            .sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        report.failed.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));

        info!(
            "Reproduction complete: {} dispatched, {} unchanged, {} unsupported, {} failed",
            report.dispatched.len(),
            report.unchanged.len(),
            report.unsupported.len(),
            report.failed.len()
        );

        report
    }
}

/// Decide and dispatch for a single entity.
async fn reproduce_one(
    spec: &AttributeSpec,
    dispatcher: &dyn Dispatcher,
    current: Option<&EntityState>,
    desired: &EntityState,
) -> Outcome {
    let entity_id = &desired.entity_id;

    for key in desired.attributes.keys() {
        if spec.is_deprecated(*key) {
            warn!(
                "Attribute {} used for {} is deprecated in scenes",
                key, entity_id
            );
        } else if spec.is_warn_only(*key) {
            warn!(
                "Attribute {} used for {} is not part of the reported light state",
                key, entity_id
            );
        }
    }

    if current.is_none() {
        debug!("No current state for {}, treating as changed", entity_id);
    }

    match diff(spec, current, desired) {
        Decision::NoOp => {
            debug!("{} already in desired state", entity_id);
            Outcome::Unchanged
        }
        Decision::Unsupported(value) => {
            warn!("Invalid state specified for {}: {}", entity_id, value);
            Outcome::Unsupported(value)
        }
        Decision::Command(cmd) => {
            debug!("Dispatching {:?}", cmd);
            match dispatcher.dispatch(cmd.clone()).await {
                Ok(()) => Outcome::Dispatched(cmd),
                Err(e) => {
                    warn!("Failed to dispatch command for {}: {}", entity_id, e);
                    Outcome::Failed(e.to_string())
                }
            }
        }
    }
}

/// Keep one desired state per entity, the last one given.
fn dedup_last_wins(desired: Vec<EntityState>) -> Vec<EntityState> {
    let mut order: Vec<String> = Vec::with_capacity(desired.len());
    let mut by_id: HashMap<String, EntityState> = HashMap::with_capacity(desired.len());

    for state in desired {
        let entity_id = state.entity_id.clone();
        if by_id.insert(entity_id.clone(), state).is_some() {
            warn!(
                "Duplicate desired state for {}, using the last one",
                entity_id
            );
        } else {
            order.push(entity_id);
        }
    }

    order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect()
}
