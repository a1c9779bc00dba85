use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Agenda";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn default_log_filter() -> &'static str {
    "agenda=info"
}

const DEFAULT_PORT: u16 = 3333;
const DEFAULT_DATABASE_PATH: &str = "agenda.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value} ({reason})")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration, read from the environment (`.env` supported).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            env::var("HOST").ok(),
            env::var("PORT").ok(),
            env::var("DATABASE_PATH").ok(),
        )
    }

    fn from_vars(
        host: Option<String>,
        port: Option<String>,
        database_path: Option<String>,
    ) -> Result<Self, ConfigError> {
        let host = match host {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidVar {
                name: "HOST",
                value,
                reason: "must be an IP address".into(),
            })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = match port {
            Some(value) => match value.parse::<u16>() {
                Ok(parsed) if parsed > 0 => parsed,
                _ => {
                    return Err(ConfigError::InvalidVar {
                        name: "PORT",
                        value,
                        reason: "must be a positive integer below 65536".into(),
                    })
                }
            },
            None => DEFAULT_PORT,
        };

        let database_path = PathBuf::from(
            database_path.unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
        );

        Ok(Self {
            host,
            port,
            database_path,
        })
    }
}
