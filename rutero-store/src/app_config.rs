use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub kafka: KafkaConfig,
    pub email: EmailConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    /// Topic carrying validated creation payloads to the worker.
    pub intake_topic: String,
    /// Topic carrying status announcements to the event handlers.
    pub events_topic: String,
    pub intake_group: String,
    pub events_group: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub server_address: String,
    pub username: String,
    pub password: String,
    pub port: u16,
    /// Address quoted in every customer notice.
    pub customer_support: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of RUTERO)
            // Eg.. `RUTERO_SERVER__PORT=8084` would set `server.port`
            .add_source(config::Environment::with_prefix("RUTERO").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
