use config::{Config, ConfigError};
use serde::Deserialize;

pub mod domain;
pub mod infrastructure;
pub mod service;

#[derive(Clone, Debug, Deserialize)]
pub struct YadoyaConfig {
    pub logger: Logger,
    pub exchange: Exchange,
}

impl YadoyaConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("logger.level", "INFO")?
            .set_default("exchange.usd_to_inr", 83.0)?
            .add_source(config::File::with_name("yadoya").required(false))
            .add_source(config::Environment::with_prefix("YADOYA").separator("_"))
            .build()?
            .try_deserialize::<YadoyaConfig>()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Logger {
    pub level: Level,
}

/// 為替設定（表示用。レートは固定値で、正確性は保証しない）
#[derive(Clone, Debug, Deserialize)]
pub struct Exchange {
    pub usd_to_inr: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub enum Level {
    TRACE,
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

impl From<&Level> for tracing::Level {
    fn from(value: &Level) -> Self {
        match value {
            Level::TRACE => tracing::Level::TRACE,
            Level::DEBUG => tracing::Level::DEBUG,
            Level::INFO => tracing::Level::INFO,
            Level::WARN => tracing::Level::WARN,
            Level::ERROR => tracing::Level::ERROR,
        }
    }
}
