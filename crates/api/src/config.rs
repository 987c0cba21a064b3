use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// JWT authentication configuration
    pub jwt: JwtAuthConfig,
    /// Payment provider configuration
    #[serde(default)]
    pub payments: PaymentsConfig,
    #[serde(default)]
    pub pins: PinsConfig,
    #[serde(default)]
    pub upkeep: UpkeepConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Requests per minute allowed for each authenticated user. 0 disables limiting.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    /// Send Strict-Transport-Security. Enable only behind TLS termination.
    #[serde(default)]
    pub hsts_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// Shared HMAC secret used to sign and verify tokens
    pub secret: String,

    /// Access token expiration in seconds (default: 604800 = 7 days)
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: i64,

    /// Leeway in seconds for clock skew tolerance (default: 30)
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

/// Stripe settings. An empty secret key selects the in-process mock provider.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentsConfig {
    #[serde(default)]
    pub stripe_secret_key: String,

    /// Signing secret for incoming webhooks (`whsec_...`)
    #[serde(default)]
    pub webhook_secret: String,

    #[serde(default = "default_stripe_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_payment_timeout")]
    pub timeout_secs: u64,

    /// Maximum age of a webhook signature timestamp
    #[serde(default = "default_signature_tolerance")]
    pub signature_tolerance_secs: i64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            stripe_secret_key: String::new(),
            webhook_secret: String::new(),
            api_base_url: default_stripe_api_base_url(),
            currency: default_currency(),
            timeout_secs: default_payment_timeout(),
            signature_tolerance_secs: default_signature_tolerance(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PinsConfig {
    /// Social pins granted to every new account
    #[serde(default = "default_initial_social_pins")]
    pub initial_social_pins: i32,
}

impl Default for PinsConfig {
    fn default() -> Self {
        Self {
            initial_social_pins: default_initial_social_pins(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpkeepConfig {
    /// Run the expiry sweep on a timer in addition to the inline triggers
    #[serde(default)]
    pub scheduled_enabled: bool,

    #[serde(default = "default_upkeep_interval")]
    pub interval_secs: u64,
}

impl Default for UpkeepConfig {
    fn default() -> Self {
        Self {
            scheduled_enabled: false,
            interval_secs: default_upkeep_interval(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_rate_limit() -> u32 {
    100
}
fn default_access_token_expiry() -> i64 {
    604_800 // 7 days
}
fn default_jwt_leeway() -> u64 {
    30
}
fn default_stripe_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}
fn default_currency() -> String {
    "usd".to_string()
}
fn default_payment_timeout() -> u64 {
    20
}
fn default_signature_tolerance() -> i64 {
    300
}
fn default_initial_social_pins() -> i32 {
    200
}
fn default_upkeep_interval() -> u64 {
    300
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with PB__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("PB")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("security.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds entirely from embedded defaults so tests do not depend on the
    /// working directory.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            rate_limit_per_minute = 100
            hsts_enabled = false

            [jwt]
            secret = "test-secret-that-is-at-least-32-bytes-long"
            access_token_expiry_secs = 3600
            leeway_secs = 30

            [payments]
            stripe_secret_key = ""
            webhook_secret = "whsec_test"
            currency = "usd"
            timeout_secs = 5
            signature_tolerance_secs = 300

            [pins]
            initial_social_pins = 200

            [upkeep]
            scheduled_enabled = false
            interval_secs = 300
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "PB__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "PB__JWT__SECRET environment variable must be set".to_string(),
            ));
        }

        if self.jwt.secret.len() < shared::jwt::MIN_SECRET_LEN {
            return Err(ConfigValidationError::InvalidValue(format!(
                "jwt secret must be at least {} bytes",
                shared::jwt::MIN_SECRET_LEN
            )));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.pins.initial_social_pins < 0 {
            return Err(ConfigValidationError::InvalidValue(
                "initial_social_pins cannot be negative".to_string(),
            ));
        }

        if self.upkeep.scheduled_enabled && self.upkeep.interval_secs == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "upkeep interval_secs must be positive when scheduled upkeep is enabled"
                    .to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }

    /// Whether a real Stripe account is configured.
    pub fn stripe_enabled(&self) -> bool {
        !self.payments.stripe_secret_key.trim().is_empty()
    }
}
