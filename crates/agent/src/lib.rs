//! Suggestion oracle - the LLM-backed half of the recommendation pipeline
//!
//! This crate turns a prompt built by `kiosk-core` into catalog suggestions:
//! - `llm` - pluggable text-completion trait
//! - `gemini` - HTTPS client for the Gemini `generateContent` endpoint
//! - `reply` - tolerant extraction of a JSON array from free-form model text
//! - `oracle` - `SuggestionOracle` implementations wired from configuration
//!
//! # Failure Model
//!
//! The model is strictly advisory. Transport errors, non-success statuses and
//! unparsable replies are logged and collapse into an empty suggestion list;
//! they never fail a recommendation request.

pub mod gemini;
pub mod llm;
pub mod oracle;
pub mod reply;

pub use gemini::{GeminiClient, GeminiError};
pub use llm::LlmClient;
pub use oracle::{build_oracle, DisabledOracle, LlmSuggestionOracle};
pub use reply::parse_reply;
