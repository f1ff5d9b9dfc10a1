//! Email, social media and website analysis endpoints

use axum::{
    extract::State,
    routing::{get, post},
};
use serde::Serialize;

use crate::api::router::RouteRegistry;
use crate::api::state::AppState;
use crate::api::types::analysis::{
    AnalyzeRequest, EmailAnalyzeRequest, SocialMediaAnalyzeRequest, TranslateRequest,
    WebsiteAnalyzeRequest,
};
use crate::api::types::{ApiError, ApiResponse, Json};
use crate::domain::analysis::{AnalysisId, ContentType};
use crate::infrastructure::services::{AnalysisOutcome, ModelVersion};

type AnalysisResult = Result<ApiResponse<AnalysisOutcome>, ApiError>;

#[derive(Debug, Serialize)]
pub struct GroupStatus {
    pub status: &'static str,
}

pub fn register_routes(registry: RouteRegistry) -> RouteRegistry {
    registry
        .route("/email/", get(group_status))
        .route("/email/v1/analyze", post(analyze_email_v1))
        .route("/email/v1/translate", post(translate_email))
        .route("/email/v2/analyze", post(analyze_email_v2))
        .route("/socialmedia/", get(group_status))
        .route("/socialmedia/v1/analyze", post(analyze_social_media))
        .route("/socialmedia/v1/translate", post(translate_social_media))
        .route("/website/", get(group_status))
        .route("/website/v1/analyze", post(analyze_website_v1))
        .route("/website/v1/translate", post(translate_website))
        .route("/website/v2/analyze", post(analyze_website_v2))
}

/// GET /{group}/
pub async fn group_status() -> axum::Json<GroupStatus> {
    axum::Json(GroupStatus { status: "OK" })
}

async fn analyze_email_v1(
    State(state): State<AppState>,
    Json(request): Json<EmailAnalyzeRequest>,
) -> AnalysisResult {
    analyze(&state, request, ModelVersion::V1).await
}

async fn analyze_email_v2(
    State(state): State<AppState>,
    Json(request): Json<EmailAnalyzeRequest>,
) -> AnalysisResult {
    analyze(&state, request, ModelVersion::V2).await
}

async fn analyze_social_media(
    State(state): State<AppState>,
    Json(request): Json<SocialMediaAnalyzeRequest>,
) -> AnalysisResult {
    analyze(&state, request, ModelVersion::V1).await
}

async fn analyze_website_v1(
    State(state): State<AppState>,
    Json(request): Json<WebsiteAnalyzeRequest>,
) -> AnalysisResult {
    analyze(&state, request, ModelVersion::V1).await
}

async fn analyze_website_v2(
    State(state): State<AppState>,
    Json(request): Json<WebsiteAnalyzeRequest>,
) -> AnalysisResult {
    analyze(&state, request, ModelVersion::V2).await
}

async fn translate_email(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> AnalysisResult {
    translate(&state, ContentType::Email, request).await
}

async fn translate_social_media(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> AnalysisResult {
    translate(&state, ContentType::SocialMedia, request).await
}

async fn translate_website(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> AnalysisResult {
    translate(&state, ContentType::Website, request).await
}

async fn analyze<R: AnalyzeRequest>(
    state: &AppState,
    request: R,
    version: ModelVersion,
) -> AnalysisResult {
    let (submission, language) = request.into_parts()?;
    let content_type = submission.content_type();
    let outcome = state.analysis.analyze(submission, language, version).await?;

    let message = if outcome.reused {
        format!("Existing {} analysis retrieved", content_type)
    } else {
        format!("{} analysis completed", content_type)
    };
    Ok(ApiResponse::ok(message, outcome))
}

async fn translate(
    state: &AppState,
    content_type: ContentType,
    request: TranslateRequest,
) -> AnalysisResult {
    let language = request.language()?;
    let id = AnalysisId::parse(&request.analysis_id)?;
    let outcome = state.analysis.translate(content_type, &id, language).await?;

    Ok(ApiResponse::ok(
        format!("{} analysis translated", content_type),
        outcome,
    ))
}
