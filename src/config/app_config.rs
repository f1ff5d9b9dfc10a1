use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::auth::EndpointPolicyConfig;
use crate::domain::client::{
    ClientProfile, ClientProfiles, ClientType, ClientValidationError, Permission, PermissionSet,
    RateLimitRule,
};
use crate::infrastructure::llm::DEFAULT_SEA_LION_BASE_URL;
use crate::infrastructure::observability::ObservabilityConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub clients: ClientsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    /// Replaces the built-in endpoint policy table when present
    #[serde(default)]
    pub policies: Option<Vec<EndpointPolicyConfig>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_expiry_hours")]
    pub token_expiry_hours: u64,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default = "default_api_key_prefix")]
    pub api_key_prefix: String,
    /// Admin key registered with exactly this secret at startup
    #[serde(default)]
    pub bootstrap_admin_key: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_expiry_hours", &self.token_expiry_hours)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("api_key_prefix", &self.api_key_prefix)
            .field(
                "bootstrap_admin_key",
                &self.bootstrap_admin_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientProfileConfig {
    pub rate_limit: u32,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl ClientProfileConfig {
    fn new(rate_limit: u32, permissions: &[&str]) -> Self {
        Self {
            rate_limit,
            window_secs: default_window_secs(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn to_profile(&self) -> Result<ClientProfile, ClientValidationError> {
        Ok(ClientProfile::new(
            RateLimitRule::new(self.rate_limit, Duration::from_secs(self.window_secs)),
            PermissionSet::from_names(self.permissions.iter().cloned())?,
        ))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientsConfig {
    #[serde(default = "default_web_extension")]
    pub web_extension: ClientProfileConfig,
    #[serde(default = "default_chatbot")]
    pub chatbot: ClientProfileConfig,
    #[serde(default = "default_mobile_app")]
    pub mobile_app: ClientProfileConfig,
    #[serde(default = "default_admin")]
    pub admin: ClientProfileConfig,
}

impl ClientsConfig {
    pub fn get(&self, client_type: ClientType) -> &ClientProfileConfig {
        match client_type {
            ClientType::WebExtension => &self.web_extension,
            ClientType::Chatbot => &self.chatbot,
            ClientType::MobileApp => &self.mobile_app,
            ClientType::Admin => &self.admin,
        }
    }

    /// Validated profile registry
    pub fn to_profiles(&self) -> Result<ClientProfiles, ClientValidationError> {
        let profiles = ClientType::ALL
            .into_iter()
            .map(|client_type| Ok((client_type, self.get(client_type).to_profile()?)))
            .collect::<Result<Vec<_>, ClientValidationError>>()?;

        ClientProfiles::new(profiles)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default)]
    pub backend: RateLimitBackend,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// How often the in-memory store drops expired windows
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

#[derive(Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_v1_model")]
    pub v1_model: String,
    #[serde(default = "default_v2_model")]
    pub v2_model: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("v1_model", &self.v1_model)
            .field("v2_model", &self.v2_model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .finish()
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_token_expiry_hours() -> u64 {
    24
}

fn default_issuer() -> String {
    "mai-scam-detection".to_string()
}

fn default_audience() -> String {
    "mai-clients".to_string()
}

fn default_api_key_prefix() -> String {
    "mai_".to_string()
}

fn default_window_secs() -> u64 {
    3600
}

fn default_web_extension() -> ClientProfileConfig {
    ClientProfileConfig::new(
        100,
        &[
            Permission::EMAIL_ANALYSIS,
            Permission::WEBSITE_ANALYSIS,
            Permission::SOCIAL_MEDIA_ANALYSIS,
        ],
    )
}

fn default_chatbot() -> ClientProfileConfig {
    ClientProfileConfig::new(
        1000,
        &[Permission::EMAIL_ANALYSIS, Permission::SOCIAL_MEDIA_ANALYSIS],
    )
}

fn default_mobile_app() -> ClientProfileConfig {
    ClientProfileConfig::new(
        200,
        &[
            Permission::EMAIL_ANALYSIS,
            Permission::WEBSITE_ANALYSIS,
            Permission::SOCIAL_MEDIA_ANALYSIS,
        ],
    )
}

fn default_admin() -> ClientProfileConfig {
    ClientProfileConfig::new(10_000, &["*"])
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_key_prefix() -> String {
    "mai:ratelimit".to_string()
}

fn default_cleanup_interval_secs() -> u64 {
    300
}

fn default_llm_base_url() -> String {
    DEFAULT_SEA_LION_BASE_URL.to_string()
}

fn default_v1_model() -> String {
    "aisingapore/Llama-SEA-LION-v3.5-70B-R".to_string()
}

fn default_v2_model() -> String {
    "aisingapore/Gemma-SEA-LION-v4-27B-IT".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_hours: default_token_expiry_hours(),
            issuer: default_issuer(),
            audience: default_audience(),
            api_key_prefix: default_api_key_prefix(),
            bootstrap_admin_key: None,
        }
    }
}

impl Default for ClientsConfig {
    fn default() -> Self {
        Self {
            web_extension: default_web_extension(),
            chatbot: default_chatbot(),
            mobile_app: default_mobile_app(),
            admin: default_admin(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            backend: RateLimitBackend::default(),
            redis_url: default_redis_url(),
            key_prefix: default_key_prefix(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: String::new(),
            v1_model: default_v1_model(),
            v2_model: default_v2_model(),
            timeout_secs: default_llm_timeout_secs(),
            temperature: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_clients_match_builtin_profiles() {
        let profiles = ClientsConfig::default().to_profiles().unwrap();
        let builtin = ClientProfiles::builtin();

        for client_type in ClientType::ALL {
            assert_eq!(profiles.get(client_type), builtin.get(client_type));
        }
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let mut clients = ClientsConfig::default();
        clients.mobile_app.rate_limit = 0;

        assert!(clients.to_profiles().is_err());
    }

    #[test]
    fn test_deserialize_partial_sections() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "server": {"port": 9000},
            "clients": {"mobile_app": {"rate_limit": 50}},
            "rate_limit": {"backend": "redis"},
            "policies": [{"path": "/", "level": "public"}]
        }))
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.clients.mobile_app.rate_limit, 50);
        assert_eq!(config.clients.mobile_app.window_secs, 3600);
        assert!(config.clients.mobile_app.permissions.is_empty());
        assert_eq!(config.clients.chatbot.rate_limit, 1000);
        assert_eq!(config.rate_limit.backend, RateLimitBackend::Redis);
        assert_eq!(config.policies.unwrap().len(), 1);
        assert_eq!(config.auth.token_expiry_hours, 24);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let auth = AuthConfig {
            jwt_secret: "super-secret-value".to_string(),
            bootstrap_admin_key: Some("mai_abc".to_string()),
            ..AuthConfig::default()
        };

        let debug = format!("{:?}", auth);
        assert!(!debug.contains("super-secret-value"));
        assert!(!debug.contains("mai_abc"));
    }
}
