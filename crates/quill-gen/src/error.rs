//! Error types for the generation module.

use thiserror::Error;

/// Convenience type for functions that can fail during generation.
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Things that can go wrong when talking to the generation service.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// No API key in the environment.
    #[error("GEMINI_API_KEY not set")]
    MissingApiKey,

    /// Transport-level failure: connection refused, DNS, timeout.
    #[error("request to generation service failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("generation service returned {status}: {body}")]
    Service { status: u16, body: String },

    /// The service answered 200 but with an error payload.
    #[error("generation service error: {0}")]
    Api(String),

    /// A well-formed response with nothing usable in it.
    #[error("generation service returned no candidates")]
    EmptyResponse,
}
