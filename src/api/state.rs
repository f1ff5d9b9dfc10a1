//! Application state for shared services

use std::sync::Arc;

use crate::domain::client::ClientProfiles;
use crate::infrastructure::api_key::ApiKeyService;
use crate::infrastructure::auth::{AuthGate, TokenService};
use crate::infrastructure::services::AnalysisService;

/// Services shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub gate: Arc<AuthGate>,
    pub api_keys: Arc<ApiKeyService>,
    pub tokens: Arc<dyn TokenService>,
    pub profiles: Arc<ClientProfiles>,
    pub analysis: Arc<AnalysisService>,
}

impl AppState {
    pub fn new(
        gate: Arc<AuthGate>,
        api_keys: Arc<ApiKeyService>,
        tokens: Arc<dyn TokenService>,
        profiles: Arc<ClientProfiles>,
        analysis: Arc<AnalysisService>,
    ) -> Self {
        Self {
            gate,
            api_keys,
            tokens,
            profiles,
            analysis,
        }
    }
}
