//! Scam analysis domain
//!
//! Submissions of three content types are fingerprinted, enriched with
//! heuristic signals and classified by a hosted model. Verdicts are stored per
//! language so identical content and repeated translations are reused.

mod entity;
mod hashing;
mod language;
mod repository;
mod signals;
mod submission;
mod url;

pub use entity::{AnalysisId, AnalysisRecord, AnalysisVerdict, ContentType, RiskLevel};
pub use hashing::{content_hash, normalize_text, normalize_url};
pub use language::{Language, SUPPORTED_LANGUAGES};
pub use repository::AnalysisRepository;
pub use signals::{email_signals, social_media_signals, website_signals};
pub use submission::{
    EmailSubmission, EngagementMetrics, SocialMediaSubmission, Submission, WebsiteSubmission,
};
pub use url::ParsedUrl;
