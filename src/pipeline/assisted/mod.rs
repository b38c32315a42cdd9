pub mod client;
pub mod parser;
pub mod prompt;

pub use client::*;
pub use parser::*;
pub use prompt::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistedError {
    #[error("No API key configured")]
    NotConfigured,

    #[error("API key must start with \"gsk_\"")]
    InvalidKeyFormat,

    #[error("Cannot reach chat endpoint at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Chat API returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Completion contained no content")]
    EmptyCompletion,

    #[error("Completion is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Completion does not match the draft schema: {0}")]
    SchemaMismatch(String),
}
