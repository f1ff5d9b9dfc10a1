//! Built-in analysis and translation prompts

use super::template::PromptTemplate;
use crate::domain::analysis::ContentType;

const OUTPUT_RULES: &str = r#"[OUTPUT FORMAT]
Return EXACTLY one minified JSON object with these keys and nothing else.
No prose, no markdown, no code fences.
{"detected_language":"<iso-639-1 code of the content>","risk_level":"<low|medium|high>","analysis":"<1-2 sentences in TARGET_LANGUAGE>","recommended_action":"<1-2 sentences in TARGET_LANGUAGE>"}
"risk_level" is always one of the English words low, medium or high."#;

const SCORING_RULES: &str = r#"[SCORING RULES]
- "high": clear scam indicators such as credential, OTP or payment requests, malicious-looking links, explicit urgency with a consequence.
- "medium": suspicious cues that are not conclusive.
- "low": normal content with no meaningful red flags."#;

const EMAIL_ANALYSIS: &str = r#"[ROLE]
You are an email fraud-analysis module for Southeast Asian users.

[INPUTS]
TARGET_LANGUAGE: ${var:target_language}
SUBJECT: ${var:subject}
FROM: ${var:from_email}
REPLY-TO: ${var:reply_to_email:}
CONTENT:
```
${var:content}
```

[AUXILIARY SIGNALS]
Machine-extracted artifacts and heuristics. Reconcile them with the content, do not trust them blindly.
${var:signals}

[HOW TO EVALUATE]
Consider urgent or threatening tone, credential or payment requests, suspicious or look-alike domains, from and reply-to mismatch, unexpected attachments, gift-card or cryptocurrency requests and shortened URLs.

${var:scoring_rules}

${var:output_rules}"#;

const SOCIAL_MEDIA_ANALYSIS: &str = r#"[ROLE]
You are a social media fraud-analysis module for Southeast Asian users.

[INPUTS]
TARGET_LANGUAGE: ${var:target_language}
PLATFORM: ${var:platform}
AUTHOR: ${var:author_username}
CONTENT:
```
${var:content}
```

[AUXILIARY SIGNALS]
Machine-extracted artifacts, engagement data and platform risks. Reconcile them with the content, do not trust them blindly.
${var:signals}

[HOW TO EVALUATE]
Consider fake giveaways, investment or crypto promises, impersonation of brands or celebrities, romance scams, requests to move to private messaging and engagement that does not match the follower count.

${var:scoring_rules}

${var:output_rules}"#;

const WEBSITE_ANALYSIS: &str = r#"[ROLE]
You are a website fraud-analysis module for Southeast Asian users.

[INPUTS]
TARGET_LANGUAGE: ${var:target_language}
URL: ${var:url}
TITLE: ${var:title:}
CONTENT:
```
${var:content:}
```

[AUXILIARY SIGNALS]
Machine-extracted domain analysis, TLS facts, form indicators and heuristics. Reconcile them with the page, do not trust them blindly.
${var:signals}

[HOW TO EVALUATE]
Consider look-alike domains, suspicious TLDs, missing HTTPS, very new domains, login or payment forms on unrelated domains, urgency tactics and authority impersonation.

${var:scoring_rules}

${var:output_rules}"#;

const TRANSLATION: &str = r#"[ROLE]
You are a precise translator for ${var:content_type} security risk assessments.

[INPUT]
BASE_LANGUAGE: ${var:base_language}
TARGET_LANGUAGE: ${var:target_language}
risk_level: ${var:risk_level}
analysis (BASE_LANGUAGE): ${var:analysis}
recommended_action (BASE_LANGUAGE): ${var:recommended_action}

[GUIDELINES]
- Translate "analysis" and "recommended_action" into TARGET_LANGUAGE, preserving meaning and tone.
- Keep "risk_level" as the English word low, medium or high.
- No explanations, no markdown, no extra keys.

[OUTPUT FORMAT]
Return EXACTLY one minified JSON object:
{"risk_level":"<low|medium|high>","analysis":"...","recommended_action":"..."}"#;

/// Prompt set used by the analysis service
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    email: PromptTemplate,
    social_media: PromptTemplate,
    website: PromptTemplate,
    translation: PromptTemplate,
}

impl PromptLibrary {
    pub fn builtin() -> Self {
        let assemble = |body: &str| {
            PromptTemplate::new(
                body.replace("${var:scoring_rules}", SCORING_RULES)
                    .replace("${var:output_rules}", OUTPUT_RULES),
            )
        };

        Self {
            email: assemble(EMAIL_ANALYSIS),
            social_media: assemble(SOCIAL_MEDIA_ANALYSIS),
            website: assemble(WEBSITE_ANALYSIS),
            translation: PromptTemplate::new(TRANSLATION),
        }
    }

    pub fn analysis(&self, content_type: ContentType) -> &PromptTemplate {
        match content_type {
            ContentType::Email => &self.email,
            ContentType::SocialMedia => &self.social_media,
            ContentType::Website => &self.website,
        }
    }

    pub fn translation(&self) -> &PromptTemplate {
        &self.translation
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}
