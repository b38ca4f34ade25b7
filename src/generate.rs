//! Public entry points: outline generation and layout generation.
//!
//! Both operations come in two flavours. [`generate_outline`] and
//! [`generate_layouts`] never fail; they return an [`ActionResponse`] with a
//! status code and either data or a user-facing message. The `try_*`
//! variants return `Result<_, DeckGenError>` for Rust callers that want the
//! typed error.
//!
//! ## Layout generation
//!
//! ```text
//! preconditions (project id, session, subscription, project, outlines)
//!  │  any failure returns here, before the model is called
//!  ├─ 1. Compose   layout prompt from the project's outlines
//!  ├─ 2. Model     one call, retried on generic failure, never on 429
//!  ├─ 3. Repair    fences/prose stripped, schema checked, ids made unique
//!  ├─ 4. Images    every image node across all slides, bounded fan-out
//!  └─ 5. Persist   slides + theme handed to the store
//! ```

use crate::config::GenerationConfig;
use crate::error::DeckGenError;
use crate::model::{LayoutNode, OutlineSet};
use crate::output::ActionResponse;
use crate::pipeline::images::{self, ResolvedImage};
use crate::pipeline::llm::{self, LlmGenerator, TextGenerator};
use crate::pipeline::probe::{HttpProbe, ReachabilityProbe};
use crate::pipeline::{repair, walker};
use crate::progress::{PipelineStage, ProgressCallback};
use crate::prompts::{layout_prompt, outline_prompt};
use crate::store::{ProjectStore, SessionProvider, SlideDeck};
use edgequake_llm::{LLMProvider, ProviderFactory};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Model used when only an API key is available.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Collaborators needed by layout generation.
#[derive(Clone)]
pub struct DeckContext {
    pub store: Arc<dyn ProjectStore>,
    pub session: Arc<dyn SessionProvider>,
}

impl DeckContext {
    pub fn new(store: Arc<dyn ProjectStore>, session: Arc<dyn SessionProvider>) -> Self {
        Self { store, session }
    }
}

// ── Outline ──────────────────────────────────────────────────────────────────

/// Generate a presentation outline for `prompt`.
///
/// Status codes: 200, 400 (blank prompt, no content), 429, 500.
pub async fn generate_outline(prompt: &str, config: &GenerationConfig) -> ActionResponse<OutlineSet> {
    respond("outline", try_generate_outline(prompt, config).await)
}

/// [`generate_outline`] with the typed error.
pub async fn try_generate_outline(
    prompt: &str,
    config: &GenerationConfig,
) -> Result<OutlineSet, DeckGenError> {
    let start = Instant::now();
    let topic = prompt.trim();
    if topic.is_empty() {
        return Err(DeckGenError::MissingInput("Prompt is required".into()));
    }
    let generator = resolve_generator(config)?;

    let stages = StageTracker::new("outline", config);
    stages.enter(PipelineStage::ComposingPrompt);
    let prompt = outline_prompt(topic);

    stages.enter(PipelineStage::AwaitingModelResponse);
    let raw = llm::complete(generator.as_ref(), &prompt, config.outline_call, config)
        .await
        .map_err(|e| stages.fail(e))?;

    stages.enter(PipelineStage::Parsing);
    let outlines = repair::parse_outlines(&raw).map_err(|e| stages.fail(e))?;

    stages.enter(PipelineStage::Done);
    info!(
        "Outline complete: {} points in {}ms",
        outlines.len(),
        start.elapsed().as_millis()
    );
    Ok(outlines)
}

// ── Layouts ──────────────────────────────────────────────────────────────────

/// Generate, illustrate and persist the slides of a project.
///
/// Status codes: 200, 400 (no project id, no outlines, no content),
/// 403 (not signed in, no active subscription), 404 (missing or deleted
/// project), 429, 500.
pub async fn generate_layouts(
    project_id: &str,
    theme: &str,
    ctx: &DeckContext,
    config: &GenerationConfig,
) -> ActionResponse<Vec<LayoutNode>> {
    respond(
        "layouts",
        try_generate_layouts(project_id, theme, ctx, config).await,
    )
}

/// [`generate_layouts`] with the typed error.
pub async fn try_generate_layouts(
    project_id: &str,
    theme: &str,
    ctx: &DeckContext,
    config: &GenerationConfig,
) -> Result<Vec<LayoutNode>, DeckGenError> {
    let start = Instant::now();
    let project_id = project_id.trim();
    info!("Starting layout generation for project {}", project_id);

    // ── Preconditions ────────────────────────────────────────────────────
    let outlines = load_outlines(project_id, ctx).await?;
    let generator = resolve_generator(config)?;
    let probe = resolve_probe(config)?;

    // ── Step 1: Compose ──────────────────────────────────────────────────
    let stages = StageTracker::new("layouts", config);
    stages.enter(PipelineStage::ComposingPrompt);
    let prompt = layout_prompt(&outlines);

    // ── Step 2: Model ────────────────────────────────────────────────────
    stages.enter(PipelineStage::AwaitingModelResponse);
    let llm_start = Instant::now();
    let raw = llm::complete(generator.as_ref(), &prompt, config.layout_call, config)
        .await
        .map_err(|e| stages.fail(e))?;
    debug!("Layout call answered in {}ms", llm_start.elapsed().as_millis());

    // ── Step 3: Repair ───────────────────────────────────────────────────
    stages.enter(PipelineStage::Parsing);
    let mut slides = repair::parse_layouts(&raw).map_err(|e| stages.fail(e))?;
    let replaced = walker::ensure_unique_ids(&mut slides);
    if replaced > 0 {
        warn!("Replaced {} duplicate ids in model output", replaced);
    }

    // ── Step 4: Images ───────────────────────────────────────────────────
    stages.enter(PipelineStage::ImageResolution);
    resolve_images(&mut slides, generator.as_ref(), probe.as_ref(), config).await;

    // ── Step 5: Persist ──────────────────────────────────────────────────
    let deck = SlideDeck {
        slides: slides.clone(),
        theme_name: theme.to_string(),
    };
    ctx.store
        .save_slides(project_id, deck)
        .await
        .map_err(|e| stages.fail(e))?;

    stages.enter(PipelineStage::Done);
    info!(
        "Layouts complete: {} slides for project {} in {}ms",
        slides.len(),
        project_id,
        start.elapsed().as_millis()
    );
    Ok(slides)
}

/// Check identity and project state, then return the non-blank outlines.
///
/// Runs entirely before the model is touched.
async fn load_outlines(project_id: &str, ctx: &DeckContext) -> Result<Vec<String>, DeckGenError> {
    if project_id.is_empty() {
        return Err(DeckGenError::MissingInput("Project ID is required".into()));
    }

    let user_id = ctx
        .session
        .current_user()
        .await
        .ok_or(DeckGenError::Unauthorized)?;
    let user = ctx.store.user_status(&user_id).await?;
    if !user.exists {
        return Err(DeckGenError::Forbidden("User not found".into()));
    }
    if !user.subscription_active {
        return Err(DeckGenError::Forbidden(
            "User does not have an active subscription".into(),
        ));
    }

    let project = ctx.store.project_status(project_id).await?;
    if !project.is_live() {
        return Err(DeckGenError::NotFound {
            project_id: project_id.to_string(),
        });
    }

    let outlines: Vec<String> = ctx
        .store
        .project_outlines(project_id)
        .await?
        .into_iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect();
    if outlines.is_empty() {
        return Err(DeckGenError::ValidationFailure(
            "No outlines found for this project".into(),
        ));
    }
    Ok(outlines)
}

/// Resolve every image node across `slides` and write the results back.
///
/// Resolutions run concurrently in the calling task, at most
/// `image_concurrency` at a time. The tree is only touched after all of them
/// have finished. Returns the number of images that fell back.
async fn resolve_images(
    slides: &mut [LayoutNode],
    generator: &dyn TextGenerator,
    probe: &dyn ReachabilityProbe,
    config: &GenerationConfig,
) -> usize {
    let targets = walker::image_targets(slides);
    let total = targets.len();
    info!("Resolving {} images", total);
    if let Some(ref cb) = config.progress_callback {
        cb.on_images_start(total);
    }

    let resolved: Vec<ResolvedImage> = stream::iter(targets.into_iter().map(|target| async move {
        let resolved = images::resolve_image(target, generator, probe, config).await;
        if let Some(ref cb) = config.progress_callback {
            cb.on_image_complete(&resolved.node_id, resolved.is_fallback());
        }
        resolved
    }))
    .buffer_unordered(config.image_concurrency)
    .collect()
    .await;

    let mut fallbacks = 0;
    for image in &resolved {
        if image.is_fallback() {
            fallbacks += 1;
        }
        if !images::apply_resolution(slides, image) {
            warn!("Image {} could not be written back", image.node_id);
        }
    }

    info!("Images resolved: {}/{} used the fallback", fallbacks, total);
    if let Some(ref cb) = config.progress_callback {
        cb.on_images_complete(total, fallbacks);
    }
    fallbacks
}

// ── Internal helpers ─────────────────────────────────────────────────────────

/// Convert a result into the tagged response, logging failures.
fn respond<T>(operation: &str, result: Result<T, DeckGenError>) -> ActionResponse<T> {
    if let Err(ref e) = result {
        if e.status_code() >= 500 {
            error!("{} failed: {}", operation, e);
        } else {
            warn!("{} rejected: {}", operation, e);
        }
    }
    result.into()
}

/// Reports stage transitions to the log and the progress callback.
struct StageTracker<'a> {
    operation: &'static str,
    callback: Option<&'a ProgressCallback>,
}

impl<'a> StageTracker<'a> {
    fn new(operation: &'static str, config: &'a GenerationConfig) -> Self {
        let tracker = Self {
            operation,
            callback: config.progress_callback.as_ref(),
        };
        tracker.enter(PipelineStage::Idle);
        tracker
    }

    fn enter(&self, stage: PipelineStage) {
        debug!("{}: {}", self.operation, stage);
        if let Some(cb) = self.callback {
            cb.on_stage(stage);
        }
    }

    /// Enter the terminal stage matching `err` and hand it back.
    fn fail(&self, err: DeckGenError) -> DeckGenError {
        let stage = match err {
            DeckGenError::InvalidJson { .. } => PipelineStage::RepairFailed,
            DeckGenError::RateLimited { .. } => PipelineStage::RateLimited,
            _ => PipelineStage::Failed,
        };
        self.enter(stage);
        err
    }
}

/// Pick the text generator: explicit generator first, then a provider.
pub fn resolve_generator(config: &GenerationConfig) -> Result<Arc<dyn TextGenerator>, DeckGenError> {
    if let Some(ref generator) = config.generator {
        return Ok(Arc::clone(generator));
    }
    let provider = resolve_provider(config)?;
    Ok(Arc::new(LlmGenerator::new(provider)))
}

/// Resolve the LLM provider, from most-specific to least-specific:
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model` or a
///    default model for that provider.
/// 3. **Environment pair** `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, when
///    both are set.
/// 4. **Gemini key** `GEMINI_API_KEY`, with [`DEFAULT_MODEL`] unless
///    `config.model` says otherwise.
/// 5. **Auto-detection** via [`ProviderFactory::from_env`].
fn resolve_provider(config: &GenerationConfig) -> Result<Arc<dyn LLMProvider>, DeckGenError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config
            .model
            .as_deref()
            .unwrap_or_else(|| default_model_for(name));
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("gemini", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| DeckGenError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;
    Ok(llm_provider)
}

fn default_model_for(provider_name: &str) -> &'static str {
    match provider_name {
        "openai" => "gpt-4.1-nano",
        _ => DEFAULT_MODEL,
    }
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, DeckGenError> {
    debug!("Creating provider {} with model {}", provider_name, model);
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        DeckGenError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

fn resolve_probe(config: &GenerationConfig) -> Result<Arc<dyn ReachabilityProbe>, DeckGenError> {
    match config.probe {
        Some(ref probe) => Ok(Arc::clone(probe)),
        None => Ok(Arc::new(HttpProbe::new(config.probe_timeout_secs)?)),
    }
}
