//! Prompt templates with `${var:name}` placeholders

mod library;
mod template;

pub use library::PromptLibrary;
pub use template::{PromptTemplate, TemplateError};
