use std::env;
use std::fmt;
use std::str::FromStr;

use chrono::Duration;

use crate::auth::token::TokenPolicy;

/// Default bcrypt work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Runtime configuration read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub register_token_ttl_secs: i64,
    pub login_token_ttl_secs: i64,
    pub bcrypt_cost: u32,
}

/// A missing or unparsable environment variable.
#[derive(Debug)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "configuration error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

fn required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError(format!("{} must be set", key)))
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError(format!("{} has an invalid value: {:?}", key, raw))),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 10)?,
            server_port: parsed_or("SERVER_PORT", 8080)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            jwt_secret: required("JWT_SECRET")?,
            register_token_ttl_secs: parsed_or("REGISTER_TOKEN_TTL_SECS", 60 * 60)?,
            login_token_ttl_secs: parsed_or("LOGIN_TOKEN_TTL_SECS", 23 * 60 * 60)?,
            bcrypt_cost: parsed_or("BCRYPT_COST", DEFAULT_BCRYPT_COST)?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    /// Token lifetimes per issuing flow.
    pub fn token_policy(&self) -> TokenPolicy {
        TokenPolicy {
            register_ttl: Duration::seconds(self.register_token_ttl_secs),
            login_ttl: Duration::seconds(self.login_token_ttl_secs),
        }
    }
}
