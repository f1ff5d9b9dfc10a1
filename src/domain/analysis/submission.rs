//! Content submitted for analysis

use serde::{Deserialize, Serialize};

use super::entity::ContentType;
use super::hashing::{content_hash, normalize_text, normalize_url};
use super::signals::{email_signals, social_media_signals, website_signals};
use super::url::ParsedUrl;
use crate::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSubmission {
    pub subject: String,
    pub content: String,
    pub from_email: String,
    #[serde(default)]
    pub reply_to_email: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementMetrics {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub views: u64,
}

impl EngagementMetrics {
    pub fn total_interactions(&self) -> u64 {
        self.likes
            .saturating_add(self.comments)
            .saturating_add(self.shares)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialMediaSubmission {
    pub platform: String,
    pub content: String,
    pub author_username: String,
    #[serde(default)]
    pub post_url: Option<String>,
    #[serde(default)]
    pub author_followers_count: Option<u64>,
    #[serde(default)]
    pub engagement_metrics: Option<EngagementMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteSubmission {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Free-form page facts such as `ssl_valid` or `domain_age_days`
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Any submission the analysis service accepts
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Email(EmailSubmission),
    SocialMedia(SocialMediaSubmission),
    Website(WebsiteSubmission),
}

impl Submission {
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Email(_) => ContentType::Email,
            Self::SocialMedia(_) => ContentType::SocialMedia,
            Self::Website(_) => ContentType::Website,
        }
    }

    /// Reject submissions missing the fields the model needs
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Self::Email(email) => {
                require("subject", &email.subject)?;
                require("content", &email.content)?;
                require("from_email", &email.from_email)
            }
            Self::SocialMedia(post) => {
                require("platform", &post.platform)?;
                require("content", &post.content)?;
                require("author_username", &post.author_username)
            }
            Self::Website(site) => {
                require("url", &site.url)?;
                match ParsedUrl::parse(&site.url) {
                    Some(url) if matches!(url.scheme.to_lowercase().as_str(), "http" | "https") => {
                        Ok(())
                    }
                    _ => Err(DomainError::validation(format!(
                        "Field 'url' must be an absolute http(s) URL, got '{}'",
                        site.url
                    ))),
                }
            }
        }
    }

    /// Fingerprint of the normalized content
    pub fn content_hash(&self) -> String {
        let fingerprint = match self {
            Self::Email(email) => format!(
                "email:{}|{}|{}",
                normalize_text(&email.subject),
                normalize_text(&email.content),
                normalize_text(&email.from_email)
            ),
            Self::Website(site) => format!(
                "website:{}|{}|{}",
                normalize_url(&site.url),
                normalize_text(site.title.as_deref().unwrap_or_default()),
                normalize_text(site.content.as_deref().unwrap_or_default())
            ),
            Self::SocialMedia(post) => format!(
                "socialmedia:{}|{}|{}|{}",
                post.platform.to_lowercase(),
                normalize_text(&post.content),
                normalize_text(&post.author_username),
                normalize_url(post.post_url.as_deref().unwrap_or_default())
            ),
        };

        content_hash(&fingerprint)
    }

    /// Heuristic signals passed to the model alongside the content
    pub fn signals(&self) -> serde_json::Value {
        match self {
            Self::Email(email) => email_signals(email),
            Self::SocialMedia(post) => social_media_signals(post),
            Self::Website(site) => website_signals(site),
        }
    }

    /// Submission as stored next to the verdicts
    pub fn to_document(&self) -> serde_json::Value {
        let document = match self {
            Self::Email(email) => serde_json::to_value(email),
            Self::SocialMedia(post) => serde_json::to_value(post),
            Self::Website(site) => serde_json::to_value(site),
        };
        document.unwrap_or(serde_json::Value::Null)
    }
}

fn require(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        Err(DomainError::validation(format!("Field '{}' is required", field)))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(subject: &str, content: &str) -> Submission {
        Submission::Email(EmailSubmission {
            subject: subject.to_string(),
            content: content.to_string(),
            from_email: "support@bank.example".to_string(),
            reply_to_email: None,
        })
    }

    fn website(url: &str) -> Submission {
        Submission::Website(WebsiteSubmission {
            url: url.to_string(),
            title: Some("Login".to_string()),
            content: None,
            metadata: None,
        })
    }

    #[test]
    fn test_validate_required_fields() {
        assert!(email("Hi", "Body").validate().is_ok());

        let err = email("  ", "Body").validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Field 'subject' is required");
    }

    #[test]
    fn test_validate_website_url() {
        assert!(website("https://example.com/login").validate().is_ok());
        assert!(website("ftp://example.com").validate().is_err());
        assert!(website("example.com").validate().is_err());
    }

    #[test]
    fn test_hash_ignores_case_and_whitespace() {
        let a = email("Urgent  Notice", "Your account\nis suspended");
        let b = email("urgent notice", "  your ACCOUNT is suspended ");

        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), email("Other", "Body").content_hash());
    }

    #[test]
    fn test_website_hash_ignores_query() {
        assert_eq!(
            website("https://example.com/login?ref=mail").content_hash(),
            website("https://EXAMPLE.com/login/").content_hash()
        );
    }

    #[test]
    fn test_hash_differs_per_content_type() {
        let post = Submission::SocialMedia(SocialMediaSubmission {
            platform: "Facebook".to_string(),
            content: "Body".to_string(),
            author_username: "support@bank.example".to_string(),
            post_url: None,
            author_followers_count: None,
            engagement_metrics: None,
        });

        assert_ne!(post.content_hash(), email("Hi", "Body").content_hash());
        assert_eq!(post.content_type(), ContentType::SocialMedia);
    }

    #[test]
    fn test_submission_deserializes_with_optional_fields() {
        let post: SocialMediaSubmission = serde_json::from_value(serde_json::json!({
            "platform": "tiktok",
            "content": "Win a prize",
            "author_username": "lucky_draw",
            "engagement_metrics": {"likes": 3}
        }))
        .unwrap();

        assert_eq!(post.engagement_metrics.unwrap().total_interactions(), 3);
        assert!(post.post_url.is_none());
    }

    #[test]
    fn test_total_interactions_saturates() {
        let metrics = EngagementMetrics {
            likes: u64::MAX,
            comments: 1,
            shares: 1,
            views: 0,
        };

        assert_eq!(metrics.total_interactions(), u64::MAX);
    }
}
