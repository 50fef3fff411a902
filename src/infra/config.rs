//! For reading application configuration.

use serde::Deserialize;
use std::time::Duration;

/// Application configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Greeting configuration.
    pub greeting: GreetingConfig,
    /// Fault handling configuration.
    pub fault: FaultConfig,
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// Server address.
    pub http_address: String,
    /// Server http port.
    pub http_port: u16,
    /// How long a whole request may take.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// How many requests may be handled at once. Requests beyond this are shed.
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
}

fn default_concurrency_limit() -> usize {
    500
}

/// Greeting configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct GreetingConfig {
    /// The deadline for producing a single greeting.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

/// Fault handling configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct FaultConfig {
    /// What to do with faults raised by handlers.
    pub policy: FaultPolicy,
}

/// How a fault raised by a handler reaches the client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Turn the fault into an internal error response.
    #[default]
    Recover,
    /// Panic in the handler and let the panic layer deal with it.
    Unwind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                http_address: "0.0.0.0".to_string(),
                http_port: 4000,
                request_timeout: Duration::from_secs(10),
                concurrency_limit: default_concurrency_limit(),
            },
            greeting: GreetingConfig {
                timeout: Duration::from_secs(10),
            },
            fault: FaultConfig {
                policy: FaultPolicy::Recover,
            },
        }
    }
}

/// Retrieve [`Config`] from the default configuration file.
///
/// The file is optional. Values can be overridden with environment variables
/// such as `APP__SERVER__HTTP_PORT=8080`.
#[tracing::instrument]
pub fn load_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .set_default("server.http_address", "0.0.0.0")?
        .set_default("server.http_port", 4000i64)?
        .set_default("server.request_timeout", "10s")?
        .set_default("server.concurrency_limit", 500i64)?
        .set_default("greeting.timeout", "10s")?
        .set_default("fault.policy", "recover")?
        .add_source(config::File::with_name("config").required(false))
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Result<Config, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn parses_full_config() {
        let config = parse(
            r#"
            [server]
            http_address = "127.0.0.1"
            http_port = 8080
            request_timeout = "30s"
            concurrency_limit = 16

            [greeting]
            timeout = "250ms"

            [fault]
            policy = "unwind"
            "#,
        )
        .unwrap();
        assert_eq!("127.0.0.1", config.server.http_address);
        assert_eq!(8080, config.server.http_port);
        assert_eq!(Duration::from_secs(30), config.server.request_timeout);
        assert_eq!(16, config.server.concurrency_limit);
        assert_eq!(Duration::from_millis(250), config.greeting.timeout);
        assert_eq!(FaultPolicy::Unwind, config.fault.policy);
    }

    #[test]
    fn rejects_unknown_fault_policy() {
        let result = parse(
            r#"
            [server]
            http_address = "127.0.0.1"
            http_port = 8080
            request_timeout = "30s"

            [greeting]
            timeout = "1s"

            [fault]
            policy = "explode"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn concurrency_limit_is_optional() {
        let config = parse(
            r#"
            [server]
            http_address = "127.0.0.1"
            http_port = 8080
            request_timeout = "30s"

            [greeting]
            timeout = "1s"

            [fault]
            policy = "recover"
            "#,
        )
        .unwrap();
        assert_eq!(500, config.server.concurrency_limit);
    }

    #[test]
    fn loads_with_defaults() {
        let config = load_config().unwrap();
        assert!(config.server.http_port > 0);
        assert!(!config.greeting.timeout.is_zero());
    }

    #[test]
    fn default_matches_documented_values() {
        let config = Config::default();
        assert_eq!(4000, config.server.http_port);
        assert_eq!(500, config.server.concurrency_limit);
        assert_eq!(Duration::from_secs(10), config.greeting.timeout);
        assert_eq!(FaultPolicy::Recover, config.fault.policy);
    }
}
