//! Scripted collaborators shared by the integration tests.

#![allow(dead_code)]

use deckgen::{
    CallSettings, DeckContext, DeckGenError, GenerationConfig, GenerationFailure,
    GenerationProgressCallback, MemoryStore, PipelineStage, Prompt, PromptKind,
    ReachabilityProbe, StaticSession, TextGenerator,
};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const OUTLINES: [&str; 6] = [
    "Intro",
    "History",
    "Design",
    "Tradeoffs",
    "Use cases",
    "Conclusion",
];

/// How the scripted model answers one kind of prompt.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    RateLimited,
    Fail,
}

impl Reply {
    fn to_result(&self) -> Result<String, GenerationFailure> {
        match self {
            Reply::Text(t) => Ok(t.clone()),
            Reply::RateLimited => Err(GenerationFailure::classify(
                "429 Too Many Requests: resource exhausted",
            )),
            Reply::Fail => Err(GenerationFailure::classify("503 Service Unavailable")),
        }
    }
}

/// Answers by prompt kind and records every call.
pub struct ScriptedModel {
    pub outline: Reply,
    pub layout: Reply,
    pub alt_text: Reply,
    calls: Mutex<Vec<PromptKind>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            outline: Reply::Text(outline_answer()),
            layout: Reply::Text(layout_answer()),
            alt_text: Reply::Text("A bright lecture hall with a speaker at a podium".into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_outline(mut self, reply: Reply) -> Self {
        self.outline = reply;
        self
    }

    pub fn with_layout(mut self, reply: Reply) -> Self {
        self.layout = reply;
        self
    }

    pub fn with_alt_text(mut self, reply: Reply) -> Self {
        self.alt_text = reply;
        self
    }

    pub fn calls(&self) -> Vec<PromptKind> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, kind: PromptKind) -> usize {
        self.calls().iter().filter(|k| **k == kind).count()
    }
}

impl TextGenerator for ScriptedModel {
    fn generate<'a>(
        &'a self,
        prompt: &'a Prompt,
        _settings: CallSettings,
    ) -> BoxFuture<'a, Result<String, GenerationFailure>> {
        self.calls.lock().unwrap().push(prompt.kind);
        let reply = match prompt.kind {
            PromptKind::Outline => &self.outline,
            PromptKind::Layout => &self.layout,
            PromptKind::AltText => &self.alt_text,
        };
        let result = reply.to_result();
        Box::pin(async move { result })
    }
}

/// Probe with a fixed verdict.
pub struct ScriptedProbe {
    pub reachable: Option<bool>,
    pub probes: AtomicUsize,
}

impl ScriptedProbe {
    pub fn up() -> Self {
        Self::with(Some(true))
    }

    pub fn down() -> Self {
        Self::with(Some(false))
    }

    /// Every probe errors out.
    pub fn broken() -> Self {
        Self::with(None)
    }

    fn with(reachable: Option<bool>) -> Self {
        Self {
            reachable,
            probes: AtomicUsize::new(0),
        }
    }
}

impl ReachabilityProbe for ScriptedProbe {
    fn is_reachable<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<bool, DeckGenError>> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            self.reachable.ok_or_else(|| DeckGenError::NetworkFailure {
                url: url.to_string(),
                detail: "connection reset".into(),
            })
        })
    }
}

/// Records stage transitions and image events.
#[derive(Default)]
pub struct Recorder {
    pub stages: Mutex<Vec<PipelineStage>>,
    pub images_started: Mutex<Option<usize>>,
    pub image_events: AtomicUsize,
    pub images_completed: Mutex<Option<(usize, usize)>>,
}

impl GenerationProgressCallback for Recorder {
    fn on_stage(&self, stage: PipelineStage) {
        self.stages.lock().unwrap().push(stage);
    }

    fn on_images_start(&self, total_images: usize) {
        *self.images_started.lock().unwrap() = Some(total_images);
    }

    fn on_image_complete(&self, _node_id: &str, _fallback: bool) {
        self.image_events.fetch_add(1, Ordering::SeqCst);
    }

    fn on_images_complete(&self, total_images: usize, fallback_count: usize) {
        *self.images_completed.lock().unwrap() = Some((total_images, fallback_count));
    }
}

/// Fast, offline config around the given collaborators.
pub fn config(model: Arc<ScriptedModel>, probe: Arc<ScriptedProbe>) -> GenerationConfig {
    GenerationConfig::builder()
        .generator(model)
        .probe(probe)
        .max_retries(1)
        .retry_backoff_ms(1)
        .image_concurrency(3)
        .build()
        .unwrap()
}

/// A signed-in subscriber owning project "p1" with [`OUTLINES`].
pub fn store() -> MemoryStore {
    MemoryStore::new()
        .with_user("u1", true)
        .with_user("lapsed", false)
        .with_project("p1", OUTLINES)
        .with_project("empty", Vec::<String>::new())
        .with_deleted_project("gone")
}

pub fn context(store: Arc<MemoryStore>, user: Option<&str>) -> DeckContext {
    let session = match user {
        Some(id) => StaticSession::signed_in(id),
        None => StaticSession::anonymous(),
    };
    DeckContext::new(store, Arc::new(session))
}

pub fn outline_answer() -> String {
    format!(
        "```json\n{}\n```",
        serde_json::json!({ "outlines": OUTLINES })
    )
}

/// Three slides, wrapped in prose and fences.
///
/// Slide ids and one image id are deliberately reused. Four image nodes in
/// total, one of them nested two containers deep.
pub fn layout_answer() -> String {
    let slides = serde_json::json!([
        {
            "id": "slide", "slideName": "Intro", "type": "accentLeft", "className": "min-h-[300px]",
            "content": {
                "id": "root-1", "type": "column", "name": "Column",
                "content": [{
                    "id": "split-1", "type": "resizable-column", "name": "Split",
                    "content": [
                        {"id": "img", "type": "image", "name": "Image",
                         "content": "placeholder", "alt": "A city skyline at dusk"},
                        {"id": "col-1", "type": "column", "name": "Column", "content": [
                            {"id": "h-1", "type": "heading1", "name": "Heading", "content": "Intro"},
                            {"id": "p-1", "type": "paragraph", "name": "Paragraph", "content": "Why this matters."}
                        ]}
                    ]
                }]
            }
        },
        {
            "id": "slide", "slideName": "History", "type": "twoImageColumns", "className": "p-4",
            "content": {
                "id": "root-2", "type": "column", "name": "Column",
                "content": [
                    {"id": "t-2", "type": "title", "name": "Title", "content": "History"},
                    {"id": "row-2", "type": "resizable-column", "name": "Row", "content": [
                        {"id": "img", "type": "image", "name": "Image",
                         "content": "placeholder", "alt": "An old printing press"},
                        {"id": "img-3", "type": "image", "name": "Image",
                         "content": "placeholder", "alt": ""}
                    ]}
                ]
            }
        },
        {
            "id": "slide-3", "slideName": "Design", "type": "imageAndText", "className": "",
            "content": {
                "id": "root-3", "type": "column", "name": "Column",
                "content": {
                    "id": "inner-3", "type": "column", "name": "Column",
                    "content": [
                        {"id": "img-4", "type": "image", "name": "Blueprint",
                         "content": "placeholder", "alt": "Architectural blueprint"},
                        {"id": "b-3", "type": "bulletList", "name": "List", "content": "Modular\nTyped"}
                    ]
                }
            }
        }
    ]);
    format!(
        "Here are the slides you asked for:\n```json\n{}\n```\nLet me know if you need changes.",
        serde_json::to_string_pretty(&slides).unwrap()
    )
}

pub const IMAGES_IN_LAYOUT: usize = 4;

/// Reachable after a short delay; tracks how many checks overlap.
pub struct SlowProbe {
    delay: std::time::Duration,
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
}

impl SlowProbe {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: std::time::Duration::from_millis(delay_ms),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

impl ReachabilityProbe for SlowProbe {
    fn is_reachable<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<bool, DeckGenError>> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(true)
        })
    }
}
