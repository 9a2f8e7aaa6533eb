//! Application constants and configuration

pub const APP_NAME: &str = "Vision Studio";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server used when neither the environment nor settings.json name one
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
/// Environment override for the server base URL
pub const SERVER_URL_ENV: &str = "VISION_STUDIO_SERVER";

pub const CAPTION_PATH: &str = "/api/caption";
pub const TXT2IMG_PATH: &str = "/api/txt2img";
pub const SUMMARIZE_PATH: &str = "/api/summarize";
pub const ELABORATE_PATH: &str = "/api/elaborate";

// Placeholder text shown while a request is in flight
pub const CAPTION_BUSY: &str = "Generating...";
pub const TXT2IMG_BUSY: &str = "Generating image... first run may take a while.";
pub const SUMMARIZE_BUSY: &str = "Summarizing...";
pub const ELABORATE_BUSY: &str = "Elaborating...";

// Blocking alerts for missing required input
pub const ALERT_NO_IMAGE: &str = "Choose an image first";
pub const ALERT_NO_PROMPT: &str = "Enter a prompt";

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Extensions offered by the caption file picker
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "gif"];

/// Text-to-image style presets understood by the server
pub const STYLES: &[&str] = &[
    "none",
    "photographic",
    "cinematic",
    "anime",
    "watercolor",
    "3d",
    "pixel",
];

pub const TONES: &[&str] = &[
    "neutral",
    "friendly",
    "professional",
    "persuasive",
    "playful",
    "academic",
];

pub const LENGTHS: &[&str] = &["short", "medium", "long"];
