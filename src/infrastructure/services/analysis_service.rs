//! Analysis service - classify submissions and translate stored verdicts

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::domain::analysis::{
    AnalysisId, AnalysisRecord, AnalysisRepository, AnalysisVerdict, ContentType, Language,
    RiskLevel, Submission,
};
use crate::domain::prompt::{PromptLibrary, PromptTemplate};
use crate::domain::{DomainError, LlmProvider, LlmRequest};
use crate::infrastructure::llm::extract_json_object;
use crate::infrastructure::observability::record_analysis;

/// Which hosted model generation handles an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVersion {
    V1,
    V2,
}

/// Model names and sampling settings
#[derive(Debug, Clone)]
pub struct AnalysisModels {
    pub v1: String,
    pub v2: String,
    pub temperature: Option<f32>,
}

impl AnalysisModels {
    fn name(&self, version: ModelVersion) -> &str {
        match version {
            ModelVersion::V1 => &self.v1,
            ModelVersion::V2 => &self.v2,
        }
    }
}

/// Verdict returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub analysis_id: AnalysisId,
    pub risk_level: RiskLevel,
    pub reasons: String,
    pub recommended_action: String,
    pub detected_language: String,
    pub reused: bool,
}

impl AnalysisOutcome {
    fn from_record(record: &AnalysisRecord, verdict: &AnalysisVerdict, reused: bool) -> Self {
        Self {
            analysis_id: record.id,
            risk_level: verdict.risk_level,
            reasons: verdict.analysis.clone(),
            recommended_action: verdict.recommended_action.clone(),
            detected_language: record.detected_language.clone(),
            reused,
        }
    }
}

#[derive(Debug)]
pub struct AnalysisService {
    repository: Arc<dyn AnalysisRepository>,
    provider: Arc<dyn LlmProvider>,
    prompts: PromptLibrary,
    models: AnalysisModels,
}

impl AnalysisService {
    pub fn new(
        repository: Arc<dyn AnalysisRepository>,
        provider: Arc<dyn LlmProvider>,
        models: AnalysisModels,
    ) -> Self {
        Self {
            repository,
            provider,
            prompts: PromptLibrary::builtin(),
            models,
        }
    }

    pub fn repository(&self) -> &Arc<dyn AnalysisRepository> {
        &self.repository
    }

    /// Classify a submission, reusing a stored verdict for identical content
    #[instrument(skip(self, submission), fields(content_type = %submission.content_type()))]
    pub async fn analyze(
        &self,
        submission: Submission,
        target_language: Language,
        version: ModelVersion,
    ) -> Result<AnalysisOutcome, DomainError> {
        submission.validate()?;

        let content_type = submission.content_type();
        let content_hash = submission.content_hash();
        let existing = self
            .repository
            .find_by_hash(content_type, &content_hash)
            .await?;

        if let Some(record) = &existing {
            if let Some(verdict) = record.verdict(&target_language) {
                debug!(analysis_id = %record.id, "Reusing stored verdict");
                record_analysis(content_type.as_str(), risk_level_name(verdict.risk_level), "stored");
                return Ok(AnalysisOutcome::from_record(record, verdict, true));
            }
        }

        let signals = submission.signals();
        let prompt = render(
            self.prompts.analysis(content_type),
            analysis_values(&submission, &target_language, &signals)?,
        )?;

        let reply = self.complete(version, prompt).await?;
        let detected_language = reply
            .get("detected_language")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(target_language.as_str())
            .to_lowercase();
        let verdict = parse_verdict(&reply)?;

        let record = match existing {
            Some(mut record) => {
                record.add_verdict(target_language, verdict.clone());
                self.repository.update(record).await?
            }
            None => {
                let record = AnalysisRecord::new(
                    content_type,
                    content_hash,
                    detected_language,
                    target_language,
                    verdict.clone(),
                    submission.to_document(),
                    signals,
                );
                self.repository.create(record).await?
            }
        };

        info!(analysis_id = %record.id, risk_level = ?verdict.risk_level, "Analysis stored");
        record_analysis(content_type.as_str(), risk_level_name(verdict.risk_level), "model");
        Ok(AnalysisOutcome::from_record(&record, &verdict, false))
    }

    /// Express a stored verdict in another language
    #[instrument(skip(self))]
    pub async fn translate(
        &self,
        content_type: ContentType,
        id: &AnalysisId,
        target_language: Language,
    ) -> Result<AnalysisOutcome, DomainError> {
        let mut record = self
            .repository
            .get(id)
            .await?
            .filter(|record| record.content_type == content_type)
            .ok_or_else(|| {
                DomainError::not_found(format!("{} analysis '{}' not found", content_type, id))
            })?;

        if let Some(verdict) = record.verdict(&target_language) {
            return Ok(AnalysisOutcome::from_record(&record, verdict, true));
        }

        let base = record.primary_verdict().cloned().ok_or_else(|| {
            DomainError::internal(format!("Analysis '{}' has no primary verdict", id))
        })?;

        let values = HashMap::from([
            ("content_type", content_type.to_string()),
            ("base_language", record.primary_language.to_string()),
            ("target_language", target_language.to_string()),
            ("risk_level", risk_level_name(base.risk_level).to_string()),
            ("analysis", base.analysis.clone()),
            ("recommended_action", base.recommended_action.clone()),
        ]);
        let prompt = render(self.prompts.translation(), values)?;

        let reply = self.complete(ModelVersion::V1, prompt).await?;
        // The level is a fact about the content, never something to translate
        let verdict = AnalysisVerdict {
            risk_level: base.risk_level,
            ..parse_verdict(&reply)?
        };

        record.add_verdict(target_language, verdict.clone());
        let record = self.repository.update(record).await?;

        Ok(AnalysisOutcome::from_record(&record, &verdict, false))
    }

    async fn complete(
        &self,
        version: ModelVersion,
        prompt: String,
    ) -> Result<Map<String, Value>, DomainError> {
        let mut builder = LlmRequest::builder().user(prompt);
        if let Some(temperature) = self.models.temperature {
            builder = builder.temperature(temperature);
        }

        let response = self
            .provider
            .chat(self.models.name(version), builder.build())
            .await?;

        extract_json_object(response.content()).ok_or_else(|| {
            DomainError::provider(
                self.provider.provider_name(),
                "Model reply did not contain a JSON object",
            )
        })
    }
}

fn render(template: &PromptTemplate, values: HashMap<&str, String>) -> Result<String, DomainError> {
    template
        .render(&values)
        .map_err(|e| DomainError::internal(format!("Failed to render prompt: {}", e)))
}

fn analysis_values(
    submission: &Submission,
    target_language: &Language,
    signals: &Value,
) -> Result<HashMap<&'static str, String>, DomainError> {
    let signals = serde_json::to_string_pretty(signals)
        .map_err(|e| DomainError::internal(format!("Failed to encode signals: {}", e)))?;

    let mut values = HashMap::from([
        ("target_language", target_language.to_string()),
        ("signals", signals),
    ]);

    match submission {
        Submission::Email(email) => {
            values.insert("subject", email.subject.clone());
            values.insert("from_email", email.from_email.clone());
            values.insert("content", email.content.clone());
            if let Some(reply_to) = &email.reply_to_email {
                values.insert("reply_to_email", reply_to.clone());
            }
        }
        Submission::SocialMedia(post) => {
            values.insert("platform", post.platform.clone());
            values.insert("author_username", post.author_username.clone());
            values.insert("content", post.content.clone());
        }
        Submission::Website(site) => {
            values.insert("url", site.url.clone());
            if let Some(title) = &site.title {
                values.insert("title", title.clone());
            }
            if let Some(content) = &site.content {
                values.insert("content", content.clone());
            }
        }
    }

    Ok(values)
}

fn parse_verdict(reply: &Map<String, Value>) -> Result<AnalysisVerdict, DomainError> {
    let field = |name: &str| {
        reply
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                DomainError::provider("model", format!("Model reply is missing '{}'", name))
            })
    };

    let risk_level = field("risk_level")?
        .parse::<RiskLevel>()
        .map_err(|e| DomainError::provider("model", e.to_string()))?;

    Ok(AnalysisVerdict {
        risk_level,
        analysis: field("analysis")?,
        recommended_action: field("recommended_action")?,
    })
}

fn risk_level_name(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => "high",
        RiskLevel::Medium => "medium",
        RiskLevel::Low => "low",
    }
}
