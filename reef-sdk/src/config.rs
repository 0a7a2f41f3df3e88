use serde::{Deserialize, Serialize};

/// Top-level configuration for the SDK's data-access core.
///
/// Typically deserialized from an embedding service's configuration file;
/// every section has usable localhost defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SdkConfig {
    #[serde(default)]
    pub socket: SocketConfig,
    #[serde(default)]
    pub channels: ChannelConfig,
}

/// Connection settings for the push-notification socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SocketConfig {
    pub ws_url: String,
}

/// Buffer capacities for the channels inside the listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChannelConfig {
    /// Capacity of the raw inbound frame queue fed by the socket read pump.
    pub inbound_buffer: usize,
    /// Capacity of each individual subscription stream.
    pub subscription_buffer: usize,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://127.0.0.1:3000/ws".to_string(),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            inbound_buffer: 256,
            subscription_buffer: 128,
        }
    }
}
