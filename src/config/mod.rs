//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, ClientProfileConfig, ClientsConfig, LlmConfig, LogFormat,
    LoggingConfig, RateLimitBackend, RateLimitConfig, ServerConfig,
};
