//! AI-powered rewrite generation
//!
//! Turns a finding into an LLM rewrite of the affected passage, with
//! support for multiple backends. Uses BYOK (bring your own key) model -
//! API keys are read from environment variables.
//!
//! # Environment Variables
//!
//! - `ANTHROPIC_API_KEY`: Required for the Anthropic backend
//! - `OPENAI_API_KEY`: Required for the OpenAI backend
//! - `OPENROUTER_API_KEY`: Required for the OpenRouter backend
//! - `OLLAMA_MODEL`: Optional model override for local Ollama
//!
//! # Example
//!
//! ```rust,ignore
//! use stylometer::ai::{AiClient, LlmBackend, RewriteGenerator};
//!
//! let client = AiClient::from_env(LlmBackend::Anthropic)?;
//! let generator = RewriteGenerator::new(client);
//! let proposal = generator.generate(&finding, &doc, register)?;
//! ```

mod client;
mod prompts;
mod rewriter;

pub use client::{AiClient, AiConfig, LlmBackend, Message, Role};
pub use prompts::RewritePromptBuilder;
pub use rewriter::{PassageChange, RewriteGenerator, RewriteProposal};

use thiserror::Error;

/// Errors that can occur in the AI module
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Missing API key: {env_var} not set. Get your key at {signup_url}")]
    MissingApiKey { env_var: String, signup_url: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Rewrite validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type AiResult<T> = Result<T, AiError>;
