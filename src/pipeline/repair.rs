//! Response repair: extract a JSON payload from free-form model text.
//!
//! Even well-prompted models wrap their answer in ` ```json ` fences, add a
//! sentence of preamble, or trail off with an explanation. Repair runs three
//! deterministic steps, each independently testable:
//!
//! 1. [`strip_fences`]: drop Markdown fence lines and surrounding whitespace
//! 2. [`extract_payload`]: slice from the first opening delimiter to the last
//!    matching closing delimiter, discarding prose on either side
//! 3. parse the slice and check it against the expected shape
//!    ([`parse_outlines`], [`parse_layouts`])
//!
//! Every failure is a [`RepairError`]; at the module boundary it becomes
//! [`DeckGenError::InvalidJson`] carrying the untouched model text.

use crate::error::DeckGenError;
use crate::model::{LayoutNode, OutlineSet, MIN_OUTLINES};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Structural delimiter pair expected around the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `{ … }`
    Object,
    /// `[ … ]`
    Array,
}

impl Delimiter {
    pub fn open(&self) -> char {
        match self {
            Delimiter::Object => '{',
            Delimiter::Array => '[',
        }
    }

    pub fn close(&self) -> char {
        match self {
            Delimiter::Object => '}',
            Delimiter::Array => ']',
        }
    }
}

/// Why a model answer could not be repaired.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepairError {
    #[error("no opening '{0}' found")]
    MissingOpen(char),

    #[error("no closing '{0}' found after the opening delimiter")]
    MissingClose(char),

    #[error("payload is not valid JSON: {0}")]
    Syntax(String),

    #[error("payload does not match the expected shape: {0}")]
    Shape(String),
}

impl RepairError {
    /// Attach the raw model text and convert to the public error.
    pub fn with_raw(self, raw: &str) -> DeckGenError {
        DeckGenError::InvalidJson {
            reason: self.to_string(),
            raw: raw.to_string(),
        }
    }
}

// ── Step 1: Strip fences ─────────────────────────────────────────────────────

static RE_FENCE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*```[A-Za-z0-9_-]*[ \t]*\r?$").unwrap());

/// Remove Markdown fence lines (` ``` `, ` ```json `) and trim.
///
/// Only whole fence lines are removed; a fence sequence inside a JSON string
/// never sits on its own line, so string content is left untouched.
pub fn strip_fences(input: &str) -> String {
    RE_FENCE_LINE.replace_all(input, "").trim().to_string()
}

// ── Step 2: Locate the payload ───────────────────────────────────────────────

/// Slice `text` from the first `open` to the last `close` delimiter, inclusive.
pub fn extract_payload(text: &str, delimiter: Delimiter) -> Result<&str, RepairError> {
    let start = text
        .find(delimiter.open())
        .ok_or(RepairError::MissingOpen(delimiter.open()))?;
    let end = text
        .rfind(delimiter.close())
        .filter(|&end| end > start)
        .ok_or(RepairError::MissingClose(delimiter.close()))?;
    Ok(&text[start..=end])
}

/// Strip, extract and parse into an untyped JSON value.
pub fn repair(raw: &str, delimiter: Delimiter) -> Result<Value, RepairError> {
    let stripped = strip_fences(raw);
    let payload = extract_payload(&stripped, delimiter)?;
    serde_json::from_str(payload).map_err(|e| RepairError::Syntax(e.to_string()))
}

// ── Step 3: Shape checks ─────────────────────────────────────────────────────

/// Repair an outline answer: `{"outlines": [string, …]}` with at least
/// [`MIN_OUTLINES`] non-blank points.
pub fn parse_outlines(raw: &str) -> Result<OutlineSet, DeckGenError> {
    outlines_from_value(repair(raw, Delimiter::Object).map_err(|e| e.with_raw(raw))?)
        .map_err(|e| e.with_raw(raw))
}

fn outlines_from_value(value: Value) -> Result<OutlineSet, RepairError> {
    let items = value
        .get("outlines")
        .and_then(Value::as_array)
        .ok_or_else(|| RepairError::Shape("expected an \"outlines\" array".into()))?;

    let mut outlines = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let point = item
            .as_str()
            .ok_or_else(|| RepairError::Shape(format!("outline {} is not a string", i + 1)))?
            .trim();
        if !point.is_empty() {
            outlines.push(point.to_string());
        }
    }

    if outlines.len() < MIN_OUTLINES {
        return Err(RepairError::Shape(format!(
            "expected at least {MIN_OUTLINES} outlines, got {}",
            outlines.len()
        )));
    }
    Ok(OutlineSet { outlines })
}

/// Repair a layout answer: a non-empty array of slides whose roots are columns.
pub fn parse_layouts(raw: &str) -> Result<Vec<LayoutNode>, DeckGenError> {
    layouts_from_value(repair(raw, Delimiter::Array).map_err(|e| e.with_raw(raw))?)
        .map_err(|e| e.with_raw(raw))
}

fn layouts_from_value(value: Value) -> Result<Vec<LayoutNode>, RepairError> {
    let slides: Vec<LayoutNode> =
        serde_json::from_value(value).map_err(|e| RepairError::Shape(e.to_string()))?;
    if slides.is_empty() {
        return Err(RepairError::Shape("layout array is empty".into()));
    }
    Ok(slides)
}

// ── Tests ────────────────────────────────────────────────────────────────────
