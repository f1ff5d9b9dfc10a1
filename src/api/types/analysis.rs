//! Analysis request bodies

use serde::Deserialize;

use crate::domain::analysis::{
    EmailSubmission, Language, SocialMediaSubmission, Submission, WebsiteSubmission,
};
use crate::domain::DomainError;

#[derive(Debug, Clone, Deserialize)]
pub struct EmailAnalyzeRequest {
    #[serde(flatten)]
    pub email: EmailSubmission,
    pub target_language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SocialMediaAnalyzeRequest {
    #[serde(flatten)]
    pub post: SocialMediaSubmission,
    pub target_language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebsiteAnalyzeRequest {
    #[serde(flatten)]
    pub site: WebsiteSubmission,
    pub target_language: String,
}

/// Body of every translate endpoint. The per-type id names are accepted too.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslateRequest {
    #[serde(alias = "email_id", alias = "post_id", alias = "website_id")]
    pub analysis_id: String,
    pub target_language: String,
}

impl TranslateRequest {
    pub fn language(&self) -> Result<Language, DomainError> {
        Language::new(&self.target_language)
    }
}

/// Split an analyze body into the submission and its validated language
pub trait AnalyzeRequest {
    fn into_parts(self) -> Result<(Submission, Language), DomainError>;
}

impl AnalyzeRequest for EmailAnalyzeRequest {
    fn into_parts(self) -> Result<(Submission, Language), DomainError> {
        Ok((Submission::Email(self.email), Language::new(&self.target_language)?))
    }
}

impl AnalyzeRequest for SocialMediaAnalyzeRequest {
    fn into_parts(self) -> Result<(Submission, Language), DomainError> {
        Ok((
            Submission::SocialMedia(self.post),
            Language::new(&self.target_language)?,
        ))
    }
}

impl AnalyzeRequest for WebsiteAnalyzeRequest {
    fn into_parts(self) -> Result<(Submission, Language), DomainError> {
        Ok((Submission::Website(self.site), Language::new(&self.target_language)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_request_flattens_submission() {
        let request: EmailAnalyzeRequest = serde_json::from_value(serde_json::json!({
            "subject": "Prize",
            "content": "You won",
            "from_email": "a@b.example",
            "target_language": "ms"
        }))
        .unwrap();

        let (submission, language) = request.into_parts().unwrap();
        assert!(matches!(submission, Submission::Email(ref e) if e.reply_to_email.is_none()));
        assert_eq!(language.as_str(), "ms");
    }

    #[test]
    fn test_unsupported_language() {
        let request: WebsiteAnalyzeRequest = serde_json::from_value(serde_json::json!({
            "url": "https://example.com",
            "target_language": "fr"
        }))
        .unwrap();

        assert!(matches!(
            request.into_parts(),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn test_translate_id_aliases() {
        for field in ["analysis_id", "email_id", "post_id", "website_id"] {
            let request: TranslateRequest = serde_json::from_value(serde_json::json!({
                field: "abc",
                "target_language": "zh"
            }))
            .unwrap();
            assert_eq!(request.analysis_id, "abc");
        }
    }
}
