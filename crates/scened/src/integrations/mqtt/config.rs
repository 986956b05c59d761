use serde::Deserialize;

fn default_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "scened".to_string()
}

fn default_base_topic() -> String {
    "scened".to_string()
}

/// Configuration for the MQTT bridge
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// MQTT broker hostname or IP address
    pub broker: String,

    /// MQTT broker port
    #[serde(default = "default_port")]
    pub port: u16,

    /// MQTT client ID
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Topic prefix for light state (`<base>/<object_id>`) and commands
    /// (`<base>/<object_id>/set`), default "scened"
    #[serde(default = "default_base_topic")]
    pub base_topic: String,

    /// Optional username for authentication
    #[serde(default)]
    pub username: Option<String>,

    /// Optional password for authentication
    #[serde(default)]
    pub password: Option<String>,
}
