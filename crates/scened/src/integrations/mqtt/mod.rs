mod bridge;
mod client;
mod config;
pub mod payload;

use std::sync::Arc;

use anyhow::Context;
pub use bridge::MqttBridge;
pub use client::ClientError;
pub use client::MqttClient;
pub use client::MqttMessage;
pub use client::RumqttcClient;
pub use config::Config as MqttConfig;

/// Create a bridge backed by rumqttc and connect it to the broker.
pub async fn connect(config: &MqttConfig) -> anyhow::Result<Arc<MqttBridge<RumqttcClient>>> {
    let bridge = MqttBridge::new(RumqttcClient::new(config), config);
    bridge
        .connect()
        .await
        .context("Failed to connect to MQTT broker")?;
    Ok(Arc::new(bridge))
}
