use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::client::ClientError;
use super::client::MqttClient;
use super::client::MqttMessage;
use super::payload;
use super::MqttConfig;
use crate::engine::DispatchError;
use crate::engine::Dispatcher;
use crate::engine::StateStore;

/// MQTT bridge for scened
///
/// Keeps the state store current from light state topics and publishes
/// reproduction commands to the lights' command topics.
pub struct MqttBridge<C: MqttClient> {
    client: Arc<Mutex<C>>,
    config: MqttConfig,
}

impl<C: MqttClient + 'static> MqttBridge<C> {
    pub fn new(client: C, config: &MqttConfig) -> Self {
        Self {
            client: Arc::new(Mutex::new(client)),
            config: config.clone(),
        }
    }

    /// Connect to the broker and subscribe to light state topics.
    pub async fn connect(&self) -> Result<(), ClientError> {
        info!(
            "Connecting to MQTT broker at {}:{}",
            self.config.broker, self.config.port
        );

        let state_topics = format!("{}/+", self.config.base_topic);
        self.client.lock().await.connect(&state_topics).await?;

        info!("Connected to MQTT broker, watching {}", state_topics);
        Ok(())
    }

    /// Process incoming state messages until the task is aborted.
    pub async fn run(self: Arc<Self>, store: Arc<StateStore>) {
        loop {
            // Short lock hold time so dispatches can publish in between
            let msg = {
                let mut client = self.client.lock().await;
                tokio::time::timeout(Duration::from_millis(100), client.next_message())
                    .await
                    .unwrap_or_default()
            };

            match msg {
                Some(msg) => self.handle_message(&msg, &store),
                None => tokio::task::yield_now().await,
            }
        }
    }

    /// Record the light state carried by `msg`, if it is a state message.
    fn handle_message(&self, msg: &MqttMessage, store: &StateStore) {
        let Some(object_id) = payload::state_object_id(&self.config.base_topic, &msg.topic) else {
            debug!("Ignoring message on topic: {}", msg.topic);
            return;
        };

        match payload::parse_state(payload::entity_id(object_id), &msg.payload) {
            Ok(state) => {
                debug!("State update for {}: {}", state.entity_id, state.state);
                store.set(state);
            }
            Err(e) => warn!("Error handling state update on {}: {}", msg.topic, e),
        }
    }
}

#[async_trait]
impl<C: MqttClient + 'static> Dispatcher for MqttBridge<C> {
    fn name(&self) -> &str {
        "mqtt"
    }

    async fn dispatch(&self, cmd: crate::light::Command) -> Result<(), DispatchError> {
        let topic = payload::command_topic(&self.config.base_topic, cmd.entity_id())
            .ok_or_else(|| {
                DispatchError::Transport(format!("not a light entity: {}", cmd.entity_id()))
            })?;
        let body = payload::command_payload(&cmd)?;

        {
            let mut client = self.client.lock().await;
            client
                .publish(&topic, &body)
                .await
                .map_err(|e| DispatchError::Transport(e.to_string()))?;
        }

        info!("Sent command to {}: {:?}", cmd.entity_id(), cmd);
        Ok(())
    }
}
