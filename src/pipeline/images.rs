//! Image resolution: give one image node a working URL and a description.
//!
//! For each [`ImageTarget`]:
//!
//! 1. ask the model for alt text, using the node's current alt as a hint
//! 2. draw a seeded candidate URL from the placeholder-image provider
//! 3. probe the candidate
//! 4. commit the candidate and the generated alt, or fall back to
//!    [`FALLBACK_IMAGE_URL`] with whatever alt text is available
//!
//! [`resolve_image`] never fails: every error path ends in the fallback and
//! is recorded as an [`ImageError`] on the returned [`ResolvedImage`]. The
//! result is keyed by slide index and node id and written back with
//! [`apply_resolution`] once all concurrent resolutions have finished.

use crate::config::GenerationConfig;
use crate::error::ImageError;
use crate::model::LayoutNode;
use crate::pipeline::llm::{self, TextGenerator};
use crate::pipeline::probe::ReachabilityProbe;
use crate::pipeline::walker::{self, ImageTarget};
use crate::prompts::{alt_text_prompt, ALT_TEXT_MAX_WORDS};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use tracing::{debug, warn};

/// Always-available substitute for images that could not be resolved.
pub const FALLBACK_IMAGE_URL: &str = "https://placehold.co/1024x768/png";

/// Outcome of resolving one image node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub slide_index: usize,
    pub node_id: String,
    pub url: String,
    pub alt: String,
    /// Why the fallback was used, if it was.
    pub error: Option<ImageError>,
}

impl ResolvedImage {
    pub fn is_fallback(&self) -> bool {
        self.url == FALLBACK_IMAGE_URL
    }
}

/// Resolve one image target. Never fails; see the module docs.
pub async fn resolve_image(
    target: ImageTarget,
    generator: &dyn TextGenerator,
    probe: &dyn ReachabilityProbe,
    config: &GenerationConfig,
) -> ResolvedImage {
    let prompt = alt_text_prompt(&target.hint);
    let alt = match llm::complete(generator, &prompt, config.alt_text_call, config).await {
        Ok(text) => clean_alt_text(&text).ok_or_else(|| "model returned no usable description".to_string()),
        Err(e) => Err(e.to_string()),
    };

    let alt = match alt {
        Ok(alt) => alt,
        Err(detail) => {
            warn!("Image {}: alt text failed, using fallback: {}", target.node_id, detail);
            let alt = generic_alt(&target.hint);
            return ResolvedImage {
                slide_index: target.slide_index,
                error: Some(ImageError::AltTextFailed {
                    node_id: target.node_id.clone(),
                    detail,
                }),
                node_id: target.node_id,
                url: FALLBACK_IMAGE_URL.to_string(),
                alt,
            };
        }
    };

    let candidate = candidate_url(config);
    let error = match probe.is_reachable(&candidate).await {
        Ok(true) if is_valid_url(&candidate) => None,
        Ok(_) => Some(ImageError::Unreachable {
            node_id: target.node_id.clone(),
            url: candidate.clone(),
        }),
        Err(e) => Some(ImageError::ProbeFailed {
            node_id: target.node_id.clone(),
            detail: e.to_string(),
        }),
    };

    let url = match &error {
        None => {
            debug!("Image {}: resolved to {}", target.node_id, candidate);
            candidate
        }
        Some(e) => {
            warn!("{}; using fallback", e);
            FALLBACK_IMAGE_URL.to_string()
        }
    };

    ResolvedImage {
        slide_index: target.slide_index,
        node_id: target.node_id,
        url,
        alt,
        error,
    }
}

/// Write a resolution onto its node. Returns false if the node is gone.
pub fn apply_resolution(slides: &mut [LayoutNode], resolved: &ResolvedImage) -> bool {
    let Some(slide) = slides.get_mut(resolved.slide_index) else {
        warn!(
            "Image {}: slide {} does not exist",
            resolved.node_id, resolved.slide_index
        );
        return false;
    };
    let Some(node) = walker::find_node_mut(slide.content_mut(), &resolved.node_id) else {
        warn!("Image {}: node not found in slide", resolved.node_id);
        return false;
    };
    if node.set_text(resolved.url.clone()).is_err() {
        return false;
    }
    node.alt = Some(resolved.alt.clone());
    true
}

/// Seeded placeholder URL at a fixed resolution.
pub fn seeded_url(seed: u32, width: u32, height: u32) -> String {
    format!("https://picsum.photos/seed/{seed}/{width}/{height}")
}

/// Candidate URL with a seed drawn from `1..=seed_range_max`.
pub fn candidate_url(config: &GenerationConfig) -> String {
    let seed = rand::thread_rng().gen_range(1..=config.seed_range_max.max(1));
    seeded_url(seed, config.image_width, config.image_height)
}

/// Absolute `http`/`https` URL check.
pub fn is_valid_url(s: &str) -> bool {
    reqwest::Url::parse(s)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// Alt text used when no description could be generated.
pub fn generic_alt(hint: &str) -> String {
    let hint = hint.trim();
    if hint.is_empty() {
        "Presentation image".to_string()
    } else {
        format!("Image related to {hint}")
    }
}

static RE_REDUNDANT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:an?\s+|the\s+)?(?:image|picture|photo|photograph)\s+of\s+(?:an?\s+|the\s+)?")
        .unwrap()
});

/// Normalise generated alt text.
///
/// Trims whitespace and wrapping quotes, drops an "image of"-style opener,
/// caps the text at [`ALT_TEXT_MAX_WORDS`] words and capitalises the first
/// letter. Returns `None` when nothing is left.
pub fn clean_alt_text(raw: &str) -> Option<String> {
    let trimmed = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim();
    let without_prefix = RE_REDUNDANT_PREFIX.replace(trimmed, "");

    let words: Vec<&str> = without_prefix
        .split_whitespace()
        .take(ALT_TEXT_MAX_WORDS)
        .collect();
    if words.is_empty() {
        return None;
    }
    let joined = words.join(" ");

    let mut chars = joined.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CallSettings;
    use crate::error::{DeckGenError, GenerationFailure};
    use crate::model::{ContentNode, ContentType, LayoutType};
    use crate::prompts::Prompt;
    use futures::future::BoxFuture;

    struct FixedGenerator(Result<String, GenerationFailure>);

    impl TextGenerator for FixedGenerator {
        fn generate<'a>(
            &'a self,
            _prompt: &'a Prompt,
            _settings: CallSettings,
        ) -> BoxFuture<'a, Result<String, GenerationFailure>> {
            let answer = self.0.clone();
            Box::pin(async move { answer })
        }
    }

    enum FixedProbe {
        Up,
        Down,
        Broken,
    }

    impl ReachabilityProbe for FixedProbe {
        fn is_reachable<'a>(
            &'a self,
            url: &'a str,
        ) -> BoxFuture<'a, Result<bool, DeckGenError>> {
            Box::pin(async move {
                match self {
                    FixedProbe::Up => Ok(true),
                    FixedProbe::Down => Ok(false),
                    FixedProbe::Broken => Err(DeckGenError::NetworkFailure {
                        url: url.to_string(),
                        detail: "connection refused".into(),
                    }),
                }
            })
        }
    }

    fn config() -> GenerationConfig {
        GenerationConfig::builder()
            .max_retries(0)
            .build()
            .unwrap()
    }

    fn target() -> ImageTarget {
        ImageTarget {
            slide_index: 0,
            node_id: "img-1".into(),
            hint: "wind turbines on a ridge".into(),
        }
    }

    fn assert_postcondition(r: &ResolvedImage) {
        assert!(is_valid_url(&r.url), "not a URL: {}", r.url);
        assert!(!r.alt.trim().is_empty());
    }

    #[tokio::test]
    async fn reachable_candidate_is_committed() {
        let gen = FixedGenerator(Ok("Wind turbines on a grassy ridge at sunset".into()));
        let r = resolve_image(target(), &gen, &FixedProbe::Up, &config()).await;
        assert_postcondition(&r);
        assert!(r.url.starts_with("https://picsum.photos/seed/"));
        assert!(r.url.ends_with("/1024/768"));
        assert_eq!(r.alt, "Wind turbines on a grassy ridge at sunset");
        assert!(r.error.is_none());
        assert!(!r.is_fallback());
    }

    #[tokio::test]
    async fn unreachable_candidate_uses_fallback() {
        let gen = FixedGenerator(Ok("Turbines in fog".into()));
        let r = resolve_image(target(), &gen, &FixedProbe::Down, &config()).await;
        assert_postcondition(&r);
        assert_eq!(r.url, FALLBACK_IMAGE_URL);
        assert_eq!(r.alt, "Turbines in fog");
        assert!(matches!(r.error, Some(ImageError::Unreachable { .. })));
    }

    #[tokio::test]
    async fn probe_error_uses_fallback() {
        let gen = FixedGenerator(Ok("Turbines in fog".into()));
        let r = resolve_image(target(), &gen, &FixedProbe::Broken, &config()).await;
        assert_postcondition(&r);
        assert_eq!(r.url, FALLBACK_IMAGE_URL);
        assert!(matches!(r.error, Some(ImageError::ProbeFailed { .. })));
    }

    #[tokio::test]
    async fn alt_text_failure_uses_generic_alt() {
        let gen = FixedGenerator(Err(GenerationFailure::Failed("500".into())));
        let r = resolve_image(target(), &gen, &FixedProbe::Up, &config()).await;
        assert_postcondition(&r);
        assert_eq!(r.url, FALLBACK_IMAGE_URL);
        assert_eq!(r.alt, "Image related to wind turbines on a ridge");
        assert!(matches!(r.error, Some(ImageError::AltTextFailed { .. })));
    }

    #[tokio::test]
    async fn rate_limited_alt_text_still_falls_back() {
        let gen = FixedGenerator(Err(GenerationFailure::RateLimited("429".into())));
        let mut t = target();
        t.hint = String::new();
        let r = resolve_image(t, &gen, &FixedProbe::Up, &config()).await;
        assert_postcondition(&r);
        assert_eq!(r.alt, "Presentation image");
    }

    #[test]
    fn candidate_url_respects_config() {
        let c = GenerationConfig::builder()
            .image_size(800, 600)
            .seed_range_max(3)
            .build()
            .unwrap();
        for _ in 0..20 {
            let url = candidate_url(&c);
            assert!(url.ends_with("/800/600"));
            let seed: u32 = url
                .trim_start_matches("https://picsum.photos/seed/")
                .split('/')
                .next()
                .unwrap()
                .parse()
                .unwrap();
            assert!((1..=3).contains(&seed));
        }
    }

    #[test]
    fn fallback_is_a_valid_url() {
        assert!(is_valid_url(FALLBACK_IMAGE_URL));
        assert!(!is_valid_url("chart.png"));
        assert!(!is_valid_url("ftp://example.org/x.png"));
    }

    #[test]
    fn clean_alt_text_rules() {
        assert_eq!(
            clean_alt_text("  \"An image of a red barn in snow\"  ").as_deref(),
            Some("Red barn in snow")
        );
        assert_eq!(
            clean_alt_text("picture of the harbour at dawn").as_deref(),
            Some("Harbour at dawn")
        );
        assert_eq!(clean_alt_text("   ").as_deref(), None);
        assert_eq!(clean_alt_text("\"\"").as_deref(), None);

        let long = vec!["word"; 80].join(" ");
        let cleaned = clean_alt_text(&long).unwrap();
        assert_eq!(cleaned.split_whitespace().count(), ALT_TEXT_MAX_WORDS);
    }

    #[test]
    fn apply_resolution_updates_only_target() {
        let img_a = ContentNode::leaf("a", ContentType::Image, "old-a").unwrap().with_alt("hint a");
        let img_b = ContentNode::leaf("b", ContentType::Image, "old-b").unwrap().with_alt("hint b");
        let root = ContentNode::container("root", ContentType::Column, vec![img_a, img_b]).unwrap();
        let mut slides = vec![LayoutNode::new("s", LayoutType::TwoImageColumns, root).unwrap()];

        let resolved = ResolvedImage {
            slide_index: 0,
            node_id: "b".into(),
            url: FALLBACK_IMAGE_URL.into(),
            alt: "Harbour".into(),
            error: None,
        };
        assert!(apply_resolution(&mut slides, &resolved));

        let images = walker::find_images(slides[0].content());
        assert_eq!(images[0].text(), Some("old-a"));
        assert_eq!(images[0].alt.as_deref(), Some("hint a"));
        assert_eq!(images[1].text(), Some(FALLBACK_IMAGE_URL));
        assert_eq!(images[1].alt.as_deref(), Some("Harbour"));

        let missing = ResolvedImage {
            slide_index: 3,
            ..resolved
        };
        assert!(!apply_resolution(&mut slides, &missing));
    }
}
