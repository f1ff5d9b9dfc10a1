//! Stored analyses and verdicts

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::language::Language;
use crate::domain::DomainError;

/// Kind of content submitted for analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "socialmedia")]
    SocialMedia,
    #[serde(rename = "website")]
    Website,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::SocialMedia => "socialmedia",
            Self::Website => "website",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl FromStr for RiskLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(DomainError::validation(format!(
                "Unknown risk level '{}'",
                other
            ))),
        }
    }
}

/// Classification of one piece of content, expressed in one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisVerdict {
    pub risk_level: RiskLevel,
    pub analysis: String,
    pub recommended_action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisId(Uuid);

impl AnalysisId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| DomainError::invalid_id(format!("Invalid analysis id '{}'", value)))
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted analysis of one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: AnalysisId,
    pub content_type: ContentType,
    pub content_hash: String,
    /// Language the model detected in the submitted content
    pub detected_language: String,
    /// Language of the first verdict, used as the translation source
    pub primary_language: Language,
    pub verdicts: BTreeMap<Language, AnalysisVerdict>,
    pub submission: serde_json::Value,
    pub signals: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(
        content_type: ContentType,
        content_hash: impl Into<String>,
        detected_language: impl Into<String>,
        language: Language,
        verdict: AnalysisVerdict,
        submission: serde_json::Value,
        signals: serde_json::Value,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: AnalysisId::generate(),
            content_type,
            content_hash: content_hash.into(),
            detected_language: detected_language.into(),
            primary_language: language.clone(),
            verdicts: BTreeMap::from([(language, verdict)]),
            submission,
            signals,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn verdict(&self, language: &Language) -> Option<&AnalysisVerdict> {
        self.verdicts.get(language)
    }

    pub fn primary_verdict(&self) -> Option<&AnalysisVerdict> {
        self.verdicts.get(&self.primary_language)
    }

    pub fn add_verdict(&mut self, language: Language, verdict: AnalysisVerdict) {
        self.verdicts.insert(language, verdict);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(level: RiskLevel) -> AnalysisVerdict {
        AnalysisVerdict {
            risk_level: level,
            analysis: "Sender domain does not match the brand".to_string(),
            recommended_action: "Do not click the link".to_string(),
        }
    }

    #[test]
    fn test_risk_level_parsing() {
        assert_eq!("High".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert_eq!(" low ".parse::<RiskLevel>().unwrap(), RiskLevel::Low);
        assert!("critical".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn test_content_type_names() {
        assert_eq!(
            serde_json::to_string(&ContentType::SocialMedia).unwrap(),
            "\"socialmedia\""
        );
        assert_eq!(ContentType::Email.to_string(), "email");
    }

    #[test]
    fn test_analysis_id_parse() {
        let id = AnalysisId::generate();
        assert_eq!(AnalysisId::parse(&id.to_string()).unwrap(), id);
        assert!(matches!(
            AnalysisId::parse("nope"),
            Err(DomainError::InvalidId { .. })
        ));
    }

    #[test]
    fn test_record_verdicts() {
        let mut record = AnalysisRecord::new(
            ContentType::Email,
            "0123456789abcdef",
            "en",
            Language::english(),
            verdict(RiskLevel::High),
            serde_json::json!({}),
            serde_json::json!({}),
        );

        let zh = Language::new("zh").unwrap();
        assert!(record.verdict(&zh).is_none());
        assert_eq!(record.primary_verdict().unwrap().risk_level, RiskLevel::High);

        record.add_verdict(zh.clone(), verdict(RiskLevel::High));
        assert!(record.verdict(&zh).is_some());
        assert_eq!(record.primary_language, Language::english());
        assert_eq!(record.verdicts.len(), 2);
    }
}
