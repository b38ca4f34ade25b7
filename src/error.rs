//! Error types for the deckgen library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DeckGenError`]: **Fatal**: the operation cannot produce a result
//!   (missing project, unparseable model output, upstream rate limit).
//!   Converted into a tagged [`crate::output::ActionResponse`] at the public
//!   boundary, with [`DeckGenError::status_code`] choosing the status.
//!
//! * [`ImageError`]: **Non-fatal**: a single image could not be resolved
//!   (alt-text call failed, candidate URL unreachable). The image falls back to
//!   [`crate::pipeline::images::FALLBACK_IMAGE_URL`] and the error is only
//!   recorded on the [`crate::pipeline::images::ResolvedImage`], so one broken
//!   image degrades a slide instead of failing the deck.

use thiserror::Error;

/// User-facing message for upstream rate limiting.
pub const RATE_LIMIT_MESSAGE: &str = "API rate limit exceeded. Please try again later.";

/// All fatal errors returned by the deckgen library.
#[derive(Debug, Error)]
pub enum DeckGenError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A required input (prompt, project id) was empty.
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// The project exists but has nothing to expand (e.g. no outlines).
    #[error("Validation failed: {0}")]
    ValidationFailure(String),

    // ── Identity errors ───────────────────────────────────────────────────
    /// No authenticated user is attached to the current session.
    #[error("User not authenticated")]
    Unauthorized,

    /// The user is unknown or has no active subscription.
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// The project does not exist or has been soft-deleted.
    #[error("Project '{project_id}' not found")]
    NotFound { project_id: String },

    // ── Model errors ──────────────────────────────────────────────────────
    /// The model answered with empty text.
    #[error("No content generated")]
    NoContent,

    /// The model answer could not be extracted or did not match the schema.
    ///
    /// `raw` keeps the untouched model text for diagnostics.
    #[error("Invalid JSON received from model: {reason}")]
    InvalidJson { reason: String, raw: String },

    /// The model provider signalled rate exhaustion. Never retried here.
    #[error("Rate limit exceeded: {detail}")]
    RateLimited { detail: String },

    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Network errors ────────────────────────────────────────────────────
    /// A reachability probe could not complete.
    #[error("Reachability probe for '{url}' failed: {detail}")]
    NetworkFailure { url: String, detail: String },

    // ── Collaborator errors ───────────────────────────────────────────────
    /// The persistence collaborator rejected a read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeckGenError {
    /// HTTP-style status code reported by the public operations.
    pub fn status_code(&self) -> u16 {
        match self {
            DeckGenError::MissingInput(_)
            | DeckGenError::ValidationFailure(_)
            | DeckGenError::NoContent => 400,
            DeckGenError::Unauthorized | DeckGenError::Forbidden(_) => 403,
            DeckGenError::NotFound { .. } => 404,
            DeckGenError::RateLimited { .. } => 429,
            DeckGenError::InvalidJson { .. }
            | DeckGenError::ProviderNotConfigured { .. }
            | DeckGenError::NetworkFailure { .. }
            | DeckGenError::Storage(_)
            | DeckGenError::InvalidConfig(_)
            | DeckGenError::Internal(_) => 500,
        }
    }

    /// Message safe to show to an end user.
    ///
    /// Rate limits get a dedicated "try again later" text so callers can tell
    /// them apart from generic failures.
    pub fn user_message(&self) -> String {
        match self {
            DeckGenError::MissingInput(what) => what.clone(),
            DeckGenError::ValidationFailure(what) => what.clone(),
            DeckGenError::Unauthorized => "User not authenticated".to_string(),
            DeckGenError::Forbidden(why) => why.clone(),
            DeckGenError::NotFound { .. } => "Project not found".to_string(),
            DeckGenError::NoContent => "No content generated".to_string(),
            DeckGenError::InvalidJson { .. } => "Invalid JSON format received from AI".to_string(),
            DeckGenError::RateLimited { .. } => RATE_LIMIT_MESSAGE.to_string(),
            _ => "Internal Server Error".to_string(),
        }
    }

    /// True for the upstream rate-limit kind.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, DeckGenError::RateLimited { .. })
    }
}

/// Failure of a single model call, before it is mapped onto [`DeckGenError`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationFailure {
    /// Upstream rate exhaustion (HTTP 429 or equivalent wording).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other provider failure.
    #[error("generation failed: {0}")]
    Failed(String),
}

impl GenerationFailure {
    /// Classify a provider error message.
    ///
    /// Providers surface rate limits with different wording, so the message
    /// is matched against the known markers rather than a status code.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        let rate_limited = lower.contains("429")
            || lower.contains("rate limit")
            || lower.contains("rate_limit")
            || lower.contains("too many requests")
            || lower.contains("resource exhausted")
            || lower.contains("resource_exhausted");
        if rate_limited {
            GenerationFailure::RateLimited(message)
        } else {
            GenerationFailure::Failed(message)
        }
    }
}

/// A non-fatal error for a single image node.
///
/// Stored on [`crate::pipeline::images::ResolvedImage`]; the node itself still
/// receives the fallback URL and a non-empty alt text.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ImageError {
    /// The alt-text generation call failed or returned nothing usable.
    #[error("Image {node_id}: alt text generation failed: {detail}")]
    AltTextFailed { node_id: String, detail: String },

    /// The candidate URL answered with a non-success status.
    #[error("Image {node_id}: candidate '{url}' is unreachable")]
    Unreachable { node_id: String, url: String },

    /// The probe itself errored (DNS, TLS, timeout).
    #[error("Image {node_id}: probe failed: {detail}")]
    ProbeFailed { node_id: String, detail: String },
}
