//! Configuration types for deck generation.
//!
//! All generation behaviour is controlled through [`GenerationConfig`], built
//! via its [`GenerationConfigBuilder`]. One struct holds every knob so a
//! config can be shared across tasks and logged as a whole.

use crate::error::DeckGenError;
use crate::pipeline::llm::TextGenerator;
use crate::pipeline::probe::ReachabilityProbe;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Output budget and sampling temperature for one kind of model call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CallSettings {
    pub max_tokens: usize,
    pub temperature: f32,
}

impl CallSettings {
    pub const fn new(max_tokens: usize, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

/// Configuration for outline and layout generation.
///
/// Built via [`GenerationConfig::builder()`] or using
/// [`GenerationConfig::default()`].
///
/// # Example
/// ```rust
/// use deckgen::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .image_concurrency(4)
///     .model("gemini-1.5-flash")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// LLM model identifier, e.g. "gemini-1.5-flash", "gpt-4.1-mini".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Pre-constructed text generator. Takes precedence over every provider
    /// setting; used for custom middleware and offline tests.
    pub generator: Option<Arc<dyn TextGenerator>>,

    /// Outline call. Default: 1000 tokens, temperature 0.0.
    ///
    /// The outline is a short JSON object; a zero temperature keeps it
    /// close to the requested shape.
    pub outline_call: CallSettings,

    /// Layout call. Default: 5000 tokens, temperature 0.7.
    ///
    /// A deck of six to ten slides with nested columns serialises to several
    /// thousand tokens. Too low a budget truncates the JSON array, which then
    /// fails repair.
    pub layout_call: CallSettings,

    /// Alt-text call, once per image. Default: 200 tokens, temperature 0.7.
    pub alt_text_call: CallSettings,

    /// Retry attempts for generic model failures. Default: 2.
    ///
    /// Rate-limit failures are never retried here; they surface as
    /// [`DeckGenError::RateLimited`] so the caller owns the retry policy.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,

    /// Maximum number of images resolved at once. Default: 8.
    ///
    /// Each image costs one model call plus one probe. An unbounded fan-out
    /// over a large deck triggers the very rate limit the pipeline has to
    /// report, so the fan-out is capped.
    pub image_concurrency: usize,

    /// Width of candidate images in pixels. Default: 1024.
    pub image_width: u32,

    /// Height of candidate images in pixels. Default: 768.
    pub image_height: u32,

    /// Upper bound of the random seed used for candidate images. Default: 1000.
    pub seed_range_max: u32,

    /// Pre-constructed reachability probe. If None, an HTTP probe is built.
    pub probe: Option<Arc<dyn ReachabilityProbe>>,

    /// Per-probe timeout in seconds. Default: 10.
    pub probe_timeout_secs: u64,

    /// Receives stage and per-image events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            generator: None,
            outline_call: CallSettings::new(1000, 0.0),
            layout_call: CallSettings::new(5000, 0.7),
            alt_text_call: CallSettings::new(200, 0.7),
            max_retries: 2,
            retry_backoff_ms: 500,
            image_concurrency: 8,
            image_width: 1024,
            image_height: 768,
            seed_range_max: 1000,
            probe: None,
            probe_timeout_secs: 10,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("generator", &self.generator.as_ref().map(|_| "<dyn TextGenerator>"))
            .field("outline_call", &self.outline_call)
            .field("layout_call", &self.layout_call)
            .field("alt_text_call", &self.alt_text_call)
            .field("max_retries", &self.max_retries)
            .field("image_concurrency", &self.image_concurrency)
            .field("image_width", &self.image_width)
            .field("image_height", &self.image_height)
            .field("seed_range_max", &self.seed_range_max)
            .field("probe", &self.probe.as_ref().map(|_| "<dyn ReachabilityProbe>"))
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn outline_call(mut self, settings: CallSettings) -> Self {
        self.config.outline_call = clamp_settings(settings);
        self
    }

    pub fn layout_call(mut self, settings: CallSettings) -> Self {
        self.config.layout_call = clamp_settings(settings);
        self
    }

    pub fn alt_text_call(mut self, settings: CallSettings) -> Self {
        self.config.alt_text_call = clamp_settings(settings);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn image_concurrency(mut self, n: usize) -> Self {
        self.config.image_concurrency = n.max(1);
        self
    }

    pub fn image_size(mut self, width: u32, height: u32) -> Self {
        self.config.image_width = width.max(1);
        self.config.image_height = height.max(1);
        self
    }

    pub fn seed_range_max(mut self, max: u32) -> Self {
        self.config.seed_range_max = max.max(1);
        self
    }

    pub fn probe(mut self, probe: Arc<dyn ReachabilityProbe>) -> Self {
        self.config.probe = Some(probe);
        self
    }

    pub fn probe_timeout_secs(mut self, secs: u64) -> Self {
        self.config.probe_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, DeckGenError> {
        let c = &self.config;
        for (name, call) in [
            ("outline", c.outline_call),
            ("layout", c.layout_call),
            ("alt text", c.alt_text_call),
        ] {
            if call.max_tokens == 0 {
                return Err(DeckGenError::InvalidConfig(format!(
                    "{name} call needs max_tokens ≥ 1"
                )));
            }
        }
        if c.image_concurrency == 0 {
            return Err(DeckGenError::InvalidConfig(
                "Image concurrency must be ≥ 1".into(),
            ));
        }
        if c.probe_timeout_secs == 0 {
            return Err(DeckGenError::InvalidConfig(
                "Probe timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

fn clamp_settings(settings: CallSettings) -> CallSettings {
    CallSettings {
        max_tokens: settings.max_tokens,
        temperature: settings.temperature.clamp(0.0, 2.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = GenerationConfig::default();
        assert_eq!(c.outline_call, CallSettings::new(1000, 0.0));
        assert_eq!(c.layout_call.max_tokens, 5000);
        assert_eq!(c.image_concurrency, 8);
        assert_eq!((c.image_width, c.image_height), (1024, 768));
        assert_eq!(c.max_retries, 2);
    }

    #[test]
    fn builder_clamps_values() {
        let c = GenerationConfig::builder()
            .image_concurrency(0)
            .seed_range_max(0)
            .layout_call(CallSettings::new(4000, 9.0))
            .build()
            .unwrap();
        assert_eq!(c.image_concurrency, 1);
        assert_eq!(c.seed_range_max, 1);
        assert_eq!(c.layout_call.temperature, 2.0);
    }

    #[test]
    fn build_rejects_zero_token_budget() {
        let err = GenerationConfig::builder()
            .outline_call(CallSettings::new(0, 0.0))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("outline"), "got: {err}");
    }

    #[test]
    fn build_rejects_zero_probe_timeout() {
        assert!(GenerationConfig::builder()
            .probe_timeout_secs(0)
            .build()
            .is_err());
    }

    #[test]
    fn debug_hides_trait_objects() {
        let dbg = format!("{:?}", GenerationConfig::default());
        assert!(dbg.contains("GenerationConfig"));
        assert!(dbg.contains("image_concurrency"));
    }
}
