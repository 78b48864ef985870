use config::{ConfigBuilder, builder::DefaultState};
use serde::{Deserialize, Serialize};
use std::{num::NonZeroUsize, path::PathBuf, time::Duration};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub keep_alive_seconds: u64,
    /// A random suffix is appended so several servers can share a broker.
    pub client_id_prefix: String,
    pub vibration_topic: String,
    pub status_topic: String,
    /// Whether broker-sourced samples are also served by `GET /telemetry`.
    pub feed_buffer: bool,
    pub reconnect: ReconnectConfig,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            keep_alive_seconds: 60,
            client_id_prefix: "vibration-api".to_string(),
            vibration_topic: "factory/+/vibration".to_string(),
            status_topic: "factory/+/status".to_string(),
            feed_buffer: true,
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl MqttConfig {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_seconds)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ReconnectConfig {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    pub jitter: bool,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            multiplier: 2.0,
            jitter: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub firmware_path: PathBuf,
    pub max_firmware_bytes: usize,
    pub write_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            firmware_path: PathBuf::from("firmware.bin"),
            max_firmware_bytes: 16 * 1024 * 1024,
            write_attempts: 3,
            retry_delay_ms: 50,
        }
    }
}

impl StorageConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct BufferConfig {
    pub capacity: NonZeroUsize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(1000).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DevicesConfig {
    /// Most devices tracked at once; the least recently seen is evicted.
    pub capacity: NonZeroUsize,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(1000).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct QueryConfig {
    pub default_n: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { default_n: 20 }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub mqtt: MqttConfig,
    pub storage: StorageConfig,
    pub buffer: BufferConfig,
    pub devices: DevicesConfig,
    pub query: QueryConfig,
}

impl Config {
    /// Loads `config.toml` (optional) from the working directory, then
    /// applies `VIBRATION__SECTION__KEY` environment overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("VIBRATION")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::build(builder)
    }

    pub fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, config::ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        for (key, filter) in [
            ("mqtt.vibration_topic", &self.mqtt.vibration_topic),
            ("mqtt.status_topic", &self.mqtt.status_topic),
        ] {
            if !rumqttc::valid_filter(filter) {
                return Err(config::ConfigError::Message(format!(
                    "{} is not a valid MQTT topic filter: {:?}",
                    key, filter
                )));
            }
        }
        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    #[test]
    fn empty_sources_yield_defaults() {
        let config = Config::build(config::Config::builder()).unwrap();

        assert_eq!(config.server_address(), "0.0.0.0:8000");
        assert_eq!(config.mqtt.vibration_topic, "factory/+/vibration");
        assert_eq!(config.buffer.capacity.get(), 1000);
        assert_eq!(config.query.default_n, 20);
        assert_eq!(config.devices.capacity.get(), 1000);
        assert!(config.mqtt.feed_buffer);
    }

    #[test]
    fn file_overrides_selected_keys() {
        let toml = r#"
            [server]
            port = 9100

            [mqtt]
            host = "broker.plant.local"
            feed_buffer = false

            [mqtt.reconnect]
            max_delay_ms = 5000

            [buffer]
            capacity = 64
        "#;
        let builder = config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
        let config = Config::build(builder).unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.mqtt.host, "broker.plant.local");
        assert!(!config.mqtt.feed_buffer);
        assert_eq!(config.mqtt.reconnect.max_delay_ms, 5000);
        assert_eq!(config.mqtt.reconnect.initial_delay_ms, 500);
        assert_eq!(config.buffer.capacity.get(), 64);
    }

    #[test]
    fn invalid_topic_filters_are_rejected() {
        for toml in [
            "[mqtt]\nvibration_topic = \"factory/#/vibration\"",
            "[mqtt]\nstatus_topic = \"\"",
            "[mqtt]\nvibration_topic = \"factory/press+/vibration\"",
        ] {
            let builder =
                config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
            assert!(Config::build(builder).is_err(), "accepted {}", toml);
        }
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let builder = config::Config::builder()
            .add_source(File::from_str("[buffer]\ncapacity = 0", FileFormat::Toml));

        assert!(Config::build(builder).is_err());
    }
}
