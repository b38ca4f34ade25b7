//! # deckgen
//!
//! Generate presentation outlines and slide layouts with a generative model.
//!
//! A topic becomes an outline (six or more short points). A project's outline
//! becomes a deck: an array of slides, each a layout type plus a recursive
//! tree of typed content nodes, with every image node given a reachable URL
//! and descriptive alt text.
//!
//! ## Pipeline Overview
//!
//! ```text
//! topic ──▶ outline prompt ──▶ model ──▶ repair ──▶ {"outlines": [...]}
//!
//! project ─┬─ 0. Checks   session, subscription, project, outlines
//!          ├─ 1. Compose  layout prompt with catalog + examples
//!          ├─ 2. Model    gemini / openai / … via edgequake-llm
//!          ├─ 3. Repair   fences, prose, schema, duplicate ids
//!          ├─ 4. Images   alt text + seeded URL + probe, bounded fan-out
//!          └─ 5. Persist  slides + theme name to the project store
//! ```
//!
//! Model output is never trusted: it is repaired into typed
//! [`LayoutNode`]/[`ContentNode`] values that cannot represent a leaf with
//! children or a container with text. A broken image never fails a deck; it
//! falls back to [`FALLBACK_IMAGE_URL`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deckgen::{generate_layouts, generate_outline, DeckContext, GenerationConfig};
//! use deckgen::{MemoryStore, StaticSession};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Provider auto-detected from GEMINI_API_KEY / EDGEQUAKE_LLM_PROVIDER / …
//!     let config = GenerationConfig::default();
//!
//!     let outline = generate_outline("The history of the bicycle", &config).await;
//!     let points = outline.data.map(|o| o.outlines).unwrap_or_default();
//!
//!     let store = MemoryStore::new()
//!         .with_user("user-1", true)
//!         .with_project("deck-1", points);
//!     let ctx = DeckContext::new(Arc::new(store), Arc::new(StaticSession::signed_in("user-1")));
//!
//!     let deck = generate_layouts("deck-1", "Midnight", &ctx, &config).await;
//!     println!("{}", serde_json::to_string_pretty(&deck).unwrap());
//! }
//! ```
//!
//! ## Status Codes
//!
//! | Status | Meaning |
//! |--------|---------|
//! | 200 | success |
//! | 400 | missing prompt or project id, empty outline set, no content generated |
//! | 403 | not signed in, unknown user, inactive subscription |
//! | 404 | project missing or soft-deleted |
//! | 429 | upstream rate limit ([`RATE_LIMIT_MESSAGE`]) |
//! | 500 | unrepairable model output, provider or storage failure |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod catalog;
pub mod config;
pub mod error;
pub mod generate;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{CallSettings, GenerationConfig, GenerationConfigBuilder};
pub use error::{DeckGenError, GenerationFailure, ImageError, RATE_LIMIT_MESSAGE};
pub use generate::{
    generate_layouts, generate_outline, try_generate_layouts, try_generate_outline, DeckContext,
};
pub use model::{
    ContentNode, ContentType, LayoutNode, LayoutType, NodeContent, NodeKind, OutlineCard,
    OutlineSet, SchemaError,
};
pub use output::ActionResponse;
pub use pipeline::images::{ResolvedImage, FALLBACK_IMAGE_URL};
pub use pipeline::llm::{LlmGenerator, TextGenerator};
pub use pipeline::probe::{HttpProbe, ReachabilityProbe};
pub use progress::{
    GenerationProgressCallback, NoopProgressCallback, PipelineStage, ProgressCallback,
};
pub use prompts::{Prompt, PromptKind, PromptMessage, Role};
pub use store::{
    MemoryStore, ProjectStatus, ProjectStore, SessionProvider, SlideDeck, StaticSession,
    UserStatus,
};
