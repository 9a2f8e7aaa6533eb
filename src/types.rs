//! Common types and data structures

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// One of the four mutually exclusive panels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tab {
    Caption,
    Txt2Img,
    Summarize,
    Elaborate,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Caption, Tab::Txt2Img, Tab::Summarize, Tab::Elaborate];

    /// Short name, also used as the `action` field in logs
    pub fn key(self) -> &'static str {
        match self {
            Tab::Caption => "caption",
            Tab::Txt2Img => "txt2img",
            Tab::Summarize => "summarize",
            Tab::Elaborate => "elaborate",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Caption => "Caption",
            Tab::Txt2Img => "Text to Image",
            Tab::Summarize => "Summarize",
            Tab::Elaborate => "Elaborate",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Tab::Caption => egui_phosphor::regular::IMAGE,
            Tab::Txt2Img => egui_phosphor::regular::MAGIC_WAND,
            Tab::Summarize => egui_phosphor::regular::LIST_BULLETS,
            Tab::Elaborate => egui_phosphor::regular::TEXT_AA,
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Tab::Caption => CAPTION_PATH,
            Tab::Txt2Img => TXT2IMG_PATH,
            Tab::Summarize => SUMMARIZE_PATH,
            Tab::Elaborate => ELABORATE_PATH,
        }
    }
}

// ============================================================================
// REQUEST PAYLOADS
// ============================================================================
// Values are kept as typed by the user and forwarded untouched; the server
// does its own coercion.

/// Caption generation parameters (the image itself travels separately)
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionParams {
    pub max_new_tokens: String,
    pub temperature: String,
    pub top_p: String,
    pub repetition_penalty: String,
    pub num_beams: String,
    pub prefix: String,
    pub suffix: String,
}

impl Default for CaptionParams {
    fn default() -> Self {
        Self {
            max_new_tokens: "32".into(),
            temperature: "1.0".into(),
            top_p: "0.9".into(),
            repetition_penalty: "1.0".into(),
            num_beams: "1".into(),
            prefix: String::new(),
            suffix: String::new(),
        }
    }
}

impl CaptionParams {
    /// Multipart text fields in the order the server expects them
    pub fn form_fields(&self) -> [(&'static str, String); 7] {
        [
            ("max_new_tokens", self.max_new_tokens.clone()),
            ("temperature", self.temperature.clone()),
            ("top_p", self.top_p.clone()),
            ("repetition_penalty", self.repetition_penalty.clone()),
            ("num_beams", self.num_beams.clone()),
            ("prefix", self.prefix.clone()),
            ("suffix", self.suffix.clone()),
        ]
    }
}

/// Image upload plus parameters for `/api/caption`
#[derive(Clone, Debug)]
pub struct CaptionRequest {
    pub file_name: String,
    pub image: Vec<u8>,
    pub params: CaptionParams,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Txt2ImgParams {
    pub prompt: String,
    pub negative_prompt: String,
    pub style: String,
    pub steps: String,
    pub guidance: String,
    pub width: String,
    pub height: String,
    pub seed: String,
}

impl Default for Txt2ImgParams {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            negative_prompt: String::new(),
            style: "photographic".into(),
            steps: "30".into(),
            guidance: "8.0".into(),
            width: "512".into(),
            height: "512".into(),
            seed: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummarizeParams {
    pub text: String,
    pub min_length: String,
    pub max_length: String,
}

impl Default for SummarizeParams {
    fn default() -> Self {
        Self {
            text: String::new(),
            min_length: "30".into(),
            max_length: "130".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ElaborateParams {
    pub text: String,
    pub tone: String,
    pub length: String,
    pub creativity: String,
}

impl Default for ElaborateParams {
    fn default() -> Self {
        Self {
            text: String::new(),
            tone: "neutral".into(),
            length: "medium".into(),
            creativity: "0.7".into(),
        }
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CaptionResponse {
    pub caption: String,
}

#[derive(Debug, Deserialize)]
pub struct Txt2ImgResponse {
    pub image_base64: String,
    #[serde(default)]
    pub seed: serde_json::Value,
}

impl Txt2ImgResponse {
    /// Seed as shown in the status line; numbers and strings print bare
    pub fn seed_label(&self) -> String {
        match &self.seed {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => "unknown".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct ElaborateResponse {
    pub elaboration: String,
}

// ============================================================================
// OUTPUT SLOTS
// ============================================================================

/// Output shared between the UI thread and one action's request tasks
pub type Shared<T> = Arc<Mutex<T>>;

/// Lock a slot, recovering the value if a task panicked while holding it
pub fn lock<T>(slot: &Shared<T>) -> MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Text of one output box, flagged when it is a rendered request failure
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextOutput {
    pub text: String,
    pub failed: bool,
}

impl TextOutput {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            failed: false,
        }
    }

    pub fn failed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            failed: true,
        }
    }
}

/// Texture URI of one text-to-image generation
pub fn generation_uri(generation: u64) -> String {
    format!("bytes://txt2img-{}.png", generation)
}

/// Rendered state of the text-to-image panel
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Txt2ImgView {
    pub status: TextOutput,
    /// `data:image/png;base64,...` of the last successful generation
    pub image_src: Option<String>,
    /// Bumped on every new image so texture URIs stay unique
    pub generation: u64,
}

/// One slot per action; actions never write into each other's slot
#[derive(Default)]
pub struct Outputs {
    pub caption: Shared<TextOutput>,
    pub txt2img: Shared<Txt2ImgView>,
    pub summary: Shared<TextOutput>,
    pub elaboration: Shared<TextOutput>,
}
