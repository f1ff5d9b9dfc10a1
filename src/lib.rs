//! MAI Scam Gateway
//!
//! Authorization gate and analysis API for the MAI scam detection service:
//! - API key and JWT credentials per client type
//! - Endpoint protection policies with wildcard permissions
//! - Fixed-window rate limits per client, in memory or in Redis
//! - Email, social media and website analysis through an OpenAI-compatible model

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use config::RateLimitBackend;
use domain::auth::{AuthError, PolicyTable};
use domain::client::{ClientId, ClientProfiles, ClientType, PermissionSet};
use domain::rate_limit::RateLimitStore;
use infrastructure::{
    analysis::InMemoryAnalysisRepository,
    api_key::{ApiKeyGenerator, ApiKeyService, InMemoryApiKeyRepository},
    auth::{AuthGate, CredentialValidator, JwtConfig, JwtTokenService, TokenService},
    llm::{HttpClient, OpenAiCompatibleProvider},
    rate_limit::{InMemoryRateLimitStore, RedisRateLimitConfig, RedisRateLimitStore},
    services::{AnalysisModels, AnalysisService},
};
use tracing::{info, warn};

const BOOTSTRAP_ADMIN_CLIENT_ID: &str = "bootstrap-admin";

/// Client profiles from the `clients` section
pub fn build_profiles(config: &AppConfig) -> Result<ClientProfiles, AuthError> {
    config
        .clients
        .to_profiles()
        .map_err(|e| AuthError::misconfigured(e.to_string()))
}

/// Endpoint policies from the `policies` section, or the built-in table
pub fn build_policies(config: &AppConfig) -> Result<PolicyTable, AuthError> {
    match &config.policies {
        Some(entries) => PolicyTable::from_config(entries.clone()),
        None => PolicyTable::builtin(),
    }
}

pub fn jwt_config(config: &AppConfig) -> JwtConfig {
    JwtConfig {
        secret: config.auth.jwt_secret.clone(),
        expiry_hours: config.auth.token_expiry_hours,
        issuer: config.auth.issuer.clone(),
        audience: config.auth.audience.clone(),
    }
}

/// Everything that must hold before the server may start. Returns the
/// first misconfiguration found.
pub fn check_config(config: &AppConfig) -> Result<(), AuthError> {
    let profiles = build_profiles(config)?;
    let policies = build_policies(config)?;
    JwtTokenService::new(jwt_config(config))?;
    config.observability.validate()?;

    let registry = api::routes(None);
    let metrics = &config.observability.metrics;
    let metrics_path = metrics.enabled.then_some(metrics.path.as_str());
    policies.ensure_covers(registry.paths().chain(metrics_path))?;
    policies.ensure_grantable(&profiles.granted_permissions())?;

    if config.llm.api_key.trim().is_empty() {
        warn!("llm.api_key is empty; analysis requests will be rejected upstream");
    }

    Ok(())
}

/// Wire every service from configuration
pub async fn build_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    check_config(config)?;

    let profiles = Arc::new(build_profiles(config)?);
    let policies = Arc::new(build_policies(config)?);

    let rate_limits = build_rate_limit_store(config).await?;
    info!(backend = rate_limits.backend(), "Rate limit store ready");

    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(jwt_config(config))?);
    let api_keys = Arc::new(ApiKeyService::new(
        Arc::new(InMemoryApiKeyRepository::new()),
        rate_limits.clone(),
        ApiKeyGenerator::new(config.auth.api_key_prefix.clone()),
    ));

    let bootstrap_key = config.auth.bootstrap_admin_key.as_deref().map(str::trim);
    if let Some(secret) = bootstrap_key.filter(|key| !key.is_empty()) {
        register_bootstrap_admin(&api_keys, secret).await?;
    }

    let gate = Arc::new(AuthGate::new(
        policies,
        profiles.clone(),
        CredentialValidator::new(api_keys.clone(), tokens.clone()),
        rate_limits,
    ));

    let analysis = Arc::new(build_analysis_service(config)?);

    Ok(AppState::new(gate, api_keys, tokens, profiles, analysis))
}

async fn build_rate_limit_store(config: &AppConfig) -> anyhow::Result<Arc<dyn RateLimitStore>> {
    let settings = &config.rate_limit;

    match settings.backend {
        RateLimitBackend::Memory => {
            let store = Arc::new(InMemoryRateLimitStore::new());
            if settings.cleanup_interval_secs > 0 {
                store.spawn_cleanup(Duration::from_secs(settings.cleanup_interval_secs));
            }
            Ok(store)
        }
        RateLimitBackend::Redis => {
            info!("Connecting to Redis rate limit store...");
            let store = RedisRateLimitStore::new(RedisRateLimitConfig {
                url: settings.redis_url.clone(),
                key_prefix: settings.key_prefix.clone(),
            })
            .await?;
            Ok(Arc::new(store))
        }
    }
}

async fn register_bootstrap_admin(api_keys: &ApiKeyService, secret: &str) -> anyhow::Result<()> {
    let issued = api_keys
        .issue_with_secret(
            secret,
            ClientId::new(BOOTSTRAP_ADMIN_CLIENT_ID)?,
            ClientType::Admin,
            PermissionSet::wildcard(),
            Some("Bootstrap admin key".to_string()),
        )
        .await?;

    info!(key_id = %issued.record.id(), "Bootstrap admin key registered");
    Ok(())
}

fn build_analysis_service(config: &AppConfig) -> anyhow::Result<AnalysisService> {
    let llm = &config.llm;
    let client = HttpClient::with_timeout(Duration::from_secs(llm.timeout_secs))?;
    let provider =
        OpenAiCompatibleProvider::with_base_url(client, llm.api_key.clone(), llm.base_url.clone());

    Ok(AnalysisService::new(
        Arc::new(InMemoryAnalysisRepository::new()),
        Arc::new(provider),
        AnalysisModels {
            v1: llm.v1_model.clone(),
            v2: llm.v2_model.clone(),
            temperature: llm.temperature,
        },
    ))
}
