#[cfg(test)]
use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use rumqttc::AsyncClient;
use rumqttc::Event;
use rumqttc::MqttOptions;
use rumqttc::Packet;
use rumqttc::QoS;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::MqttConfig;

/// Depth of the request queue between `AsyncClient` and its event loop
const REQUEST_CAPACITY: usize = 10;

/// Message received on a subscribed topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("MQTT client not connected")]
    NotConnected,

    #[error("MQTT request failed: {0}")]
    Request(#[from] rumqttc::ClientError),
}

/// The broker operations the bridge relies on.
#[async_trait]
pub trait MqttClient: Send + Sync {
    /// Connect and keep `topic_filter` subscribed, including across reconnects.
    async fn connect(&mut self, topic_filter: &str) -> Result<(), ClientError>;

    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ClientError>;

    /// Next message on the subscription, `None` once the connection is gone.
    async fn next_message(&mut self) -> Option<MqttMessage>;
}

/// In-memory client; messages queued in `inbox` are delivered in order.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockMqttClient {
    pub inbox: VecDeque<MqttMessage>,
    pub topic_filter: Option<String>,
    pub published: Vec<(String, Vec<u8>)>,
    pub fail_publish: bool,
}

#[cfg(test)]
impl MockMqttClient {
    pub fn queue(&mut self, topic: &str, payload: &[u8]) {
        self.inbox.push_back(MqttMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        });
    }
}

#[cfg(test)]
#[async_trait]
impl MqttClient for MockMqttClient {
    async fn connect(&mut self, topic_filter: &str) -> Result<(), ClientError> {
        self.topic_filter = Some(topic_filter.to_string());
        Ok(())
    }

    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ClientError> {
        if self.fail_publish || self.topic_filter.is_none() {
            return Err(ClientError::NotConnected);
        }
        self.published.push((topic.to_string(), payload.to_vec()));
        Ok(())
    }

    async fn next_message(&mut self) -> Option<MqttMessage> {
        self.inbox.pop_front()
    }
}

/// Live connection to the broker.
pub struct RumqttcClient {
    options: MqttOptions,
    client: Option<AsyncClient>,
    incoming: Option<mpsc::UnboundedReceiver<MqttMessage>>,
    event_loop: Option<JoinHandle<()>>,
}

impl RumqttcClient {
    pub fn new(config: &MqttConfig) -> Self {
        let mut options =
            MqttOptions::new(config.client_id.clone(), config.broker.clone(), config.port);
        options.set_keep_alive(Duration::from_secs(30));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username, password);
        }

        Self {
            options,
            client: None,
            incoming: None,
            event_loop: None,
        }
    }
}

#[async_trait]
impl MqttClient for RumqttcClient {
    async fn connect(&mut self, topic_filter: &str) -> Result<(), ClientError> {
        let (client, mut event_loop) = AsyncClient::new(self.options.clone(), REQUEST_CAPACITY);
        let (tx, rx) = mpsc::unbounded_channel();

        let resubscriber = client.clone();
        let topic_filter = topic_filter.to_string();
        let task = tokio::spawn(async move {
            loop {
                match event_loop.poll().await {
                    // Clean sessions drop subscriptions on reconnect
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        tracing::debug!("MQTT connected, subscribing to {}", topic_filter);
                        // Non-blocking: this task is the one draining the request queue
                        if let Err(e) =
                            resubscriber.try_subscribe(topic_filter.as_str(), QoS::AtMostOnce)
                        {
                            tracing::warn!("Failed to subscribe to {}: {}", topic_filter, e);
                        }
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let msg = MqttMessage {
                            topic: publish.topic.to_string(),
                            payload: publish.payload.to_vec(),
                        };
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("MQTT connection error: {}", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
            tracing::info!("MQTT event loop stopped");
        });

        self.client = Some(client);
        self.incoming = Some(rx);
        self.event_loop = Some(task);
        Ok(())
    }

    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ClientError> {
        let client = self.client.as_ref().ok_or(ClientError::NotConnected)?;
        client
            .publish(topic, QoS::AtLeastOnce, false, payload.to_vec())
            .await?;
        Ok(())
    }

    async fn next_message(&mut self) -> Option<MqttMessage> {
        self.incoming.as_mut()?.recv().await
    }
}

impl Drop for RumqttcClient {
    fn drop(&mut self) {
        if let Some(task) = self.event_loop.take() {
            task.abort();
        }
    }
}
