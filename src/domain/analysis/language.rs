use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// ISO-639 codes the analysis endpoints accept
pub const SUPPORTED_LANGUAGES: [&str; 13] = [
    "en", "ms", "zh", "vi", "th", "fil", "id", "jv", "su", "km", "lo", "my", "ta",
];

/// Supported output language
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Language(String);

impl Language {
    pub fn new(code: impl AsRef<str>) -> Result<Self, DomainError> {
        let code = code.as_ref().trim().to_lowercase();

        if SUPPORTED_LANGUAGES.contains(&code.as_str()) {
            Ok(Self(code))
        } else {
            Err(DomainError::validation(format!(
                "Unsupported language '{}'. Supported: {}",
                code,
                SUPPORTED_LANGUAGES.join(", ")
            )))
        }
    }

    pub fn english() -> Self {
        Self("en".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Language {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.0
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
