//! LLM provider gateway.
//!
//! A gateway wraps exactly one outbound call to a configured generative-text
//! provider: a system instruction and a user prompt go in, generated text or
//! a typed [`GatewayError`] comes out. Two providers are supported behind the
//! one [`LlmGateway`] contract, an OpenAI-style chat-completions API and the
//! Gemini generateContent API, selected at configuration time.
//!
//! Gateways never retry and never block beyond their configured timeout;
//! fallback behavior on failure belongs to the caller.

pub mod error;
pub mod gemini;
pub mod openai;

pub use error::GatewayError;
pub use gemini::GeminiGateway;
pub use openai::OpenAiGateway;

use async_trait::async_trait;

/// Per-call generation tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,
}

impl GenerateOptions {
    /// Creates options with the given token bound and temperature.
    #[must_use]
    pub const fn new(max_output_tokens: u32, temperature: f32) -> Self {
        Self {
            max_output_tokens,
            temperature,
        }
    }
}

/// A single text-in/text-out call to a generative-text provider.
///
/// Implementors encapsulate transport, serialization, and vendor-specific
/// API details; consumers stay decoupled from any particular provider. Each
/// call sends exactly one request; retries, if desired, are the caller's
/// responsibility.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Sends the system instruction and user prompt, returning generated text.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport failure, timeout, non-success
    /// HTTP status, or an unparsable response body. Expected failure modes
    /// never panic across this boundary.
    async fn generate(
        &self,
        system: &str,
        user: &str,
        options: &GenerateOptions,
    ) -> Result<String, GatewayError>;
}
