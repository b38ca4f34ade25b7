//! Pipeline stages for outline and layout generation.
//!
//! Each submodule implements exactly one step. The orchestrator in
//! [`crate::generate`] sequences them; none of them knows about projects,
//! users or persistence.
//!
//! ## Data Flow
//!
//! ```text
//! prompt ──▶ llm ──▶ repair ──▶ walker ──▶ images ──▶ slides
//!           (model)  (JSON)    (targets)  (alt + URL, fan-out)
//!                                           │
//!                                         probe
//! ```
//!
//! 1. [`llm`]: run one model call with retry; rate limits surface at once
//! 2. [`repair`]: strip fences and prose, parse, check the expected shape
//! 3. [`walker`]: pre-order traversal; collects image targets and repairs
//!    duplicate ids
//! 4. [`images`]: per-image alt text and candidate URL, falling back on any
//!    failure
//! 5. [`probe`]: reachability check used by `images`

pub mod images;
pub mod llm;
pub mod probe;
pub mod repair;
pub mod walker;
