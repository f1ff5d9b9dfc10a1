//! Chat model provider implementations

mod http_client;
mod json_extract;
mod openai;

pub use http_client::{HttpClient, HttpClientTrait, TransportError};
pub use json_extract::extract_json_object;
pub use openai::{OpenAiCompatibleProvider, DEFAULT_SEA_LION_BASE_URL};
