//! What the user sees for one request.
//!
//! A [`RenderState`] holds every display zone at once. The orchestrator
//! builds a new one for each transition and hands it to a [`Renderer`];
//! nothing is ever appended to a previous state.

use serde::Serialize;
use std::sync::Arc;

use crate::caption::Caption;

/// Caption text shown when the model could not be loaded.
pub const MODEL_UNAVAILABLE_TEXT: &str = "Model not loaded, cannot generate caption.";

/// Per-request lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// GET in flight
    Fetching,
    /// Fetch or decode failed (terminal)
    FetchError,
    /// Image decoded and shown, caption not started
    Displaying,
    /// Backend call in flight
    Captioning,
    /// Caption shown (terminal)
    Captioned,
    /// Model could not be loaded, fallback text shown (terminal)
    ModelUnavailable,
    /// Backend call failed (terminal)
    CaptionError,
}

impl Phase {
    /// Whether the request is finished in this phase.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Phase::FetchError | Phase::Captioned | Phase::ModelUnavailable | Phase::CaptionError
        )
    }
}

/// The fetched image as presented to the user.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedImage {
    /// URL the bytes came from (after redirects)
    pub source_url: String,
    pub width: u32,
    pub height: u32,
    /// Detected format ("jpeg", "png", ...)
    pub format: String,
    /// Encoded size in bytes
    pub byte_len: u64,
    /// Base64 WebP preview
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Original encoded bytes, for saving or opening elsewhere
    #[serde(skip)]
    pub bytes: Arc<[u8]>,
}

/// Caption zone contents.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaptionZone {
    /// Caption produced by the model
    Generated(Caption),
    /// Model unavailable; carries [`MODEL_UNAVAILABLE_TEXT`]
    Fallback { text: String },
}

impl CaptionZone {
    pub fn fallback() -> Self {
        CaptionZone::Fallback {
            text: MODEL_UNAVAILABLE_TEXT.to_string(),
        }
    }

    /// The text to display.
    pub fn text(&self) -> &str {
        match self {
            CaptionZone::Generated(caption) => &caption.text,
            CaptionZone::Fallback { text } => text,
        }
    }
}

/// Every display zone for the current request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderState {
    /// Increments with each submitted URL; 0 before the first
    pub request_id: u64,
    /// The submitted URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<RenderedImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<CaptionZone>,
    /// Fetch, decode or caption failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Model load diagnostic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl RenderState {
    /// The state before any URL has been entered.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn caption_text(&self) -> Option<&str> {
        self.caption.as_ref().map(CaptionZone::text)
    }
}

/// Presents render states to the user.
pub trait Renderer {
    /// Show `state`, replacing whatever was shown before.
    fn render(&mut self, state: &RenderState);

    /// Progress hint for long-running phases; does not change any zone.
    fn progress(&mut self, _phase: Phase, _url: &str) {}
}

/// Keeps every state it is given. Useful for tests and JSON output.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub states: Vec<RenderState>,
    pub progress: Vec<Phase>,
}

impl RecordingRenderer {
    pub fn last(&self) -> Option<&RenderState> {
        self.states.last()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, state: &RenderState) {
        self.states.push(state.clone());
    }

    fn progress(&mut self, phase: Phase, _url: &str) {
        self.progress.push(phase);
    }
}
