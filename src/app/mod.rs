//! App module - contains the main application state and logic

mod actions;
mod modals;
mod views;

use crate::api::{HttpStudioClient, StudioClient};
use crate::settings::Settings;
use crate::theme;
use crate::types::*;
use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Wakes the UI thread after a background task wrote a result
pub type Repaint = Arc<dyn Fn() + Send + Sync>;

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    // Tabs
    pub(crate) active_tab: Tab,
    // Forms
    pub(crate) caption_file: Option<PathBuf>,
    pub(crate) caption_preview: Option<String>,
    pub(crate) caption: CaptionParams,
    pub(crate) txt2img: Txt2ImgParams,
    pub(crate) summarize: SummarizeParams,
    pub(crate) elaborate: ElaborateParams,
    // Results written by request tasks
    pub(crate) outputs: Outputs,
    // Decoded bytes of the shown generation, keyed by its generation counter.
    // `None` bytes mark a generation whose image could not be decoded.
    pub(crate) generated_png: Option<(u64, Option<Arc<[u8]>>)>,
    // Image URIs no longer shown, released from egui's loaders next frame
    pub(crate) stale_images: Vec<String>,
    // Blocking alert for missing required input
    pub(crate) alert: Option<String>,
    // Networking
    pub(crate) client: Arc<dyn StudioClient>,
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) repaint: Repaint,
    // Settings dialog. `server_url` is what the client talks to (env override
    // applied); `configured_server_url` is what settings.json holds.
    pub(crate) server_url: String,
    pub(crate) configured_server_url: String,
    pub(crate) server_url_draft: String,
    pub(crate) server_url_error: Option<String>,
    pub(crate) show_settings: bool,
    // Toast notification
    pub(crate) toast_message: Option<String>,
    pub(crate) toast_start: Option<std::time::Instant>,
    // Window / persistence
    pub(crate) logo_texture: Option<egui::TextureHandle>,
    pub(crate) save_dir: PathBuf,
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
    pub(crate) data_dir: PathBuf,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings, data_dir: PathBuf) -> Self {
        // Force dark theme
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Add Phosphor icons font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        // file:// previews and bytes:// generations
        egui_extras::install_image_loaders(&cc.egui_ctx);

        // Apply theme from theme.rs
        theme::apply_visuals(&cc.egui_ctx);

        let requested_url = settings.effective_server_url();
        let http_client = match HttpStudioClient::new(&requested_url) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, url = %requested_url, "Bad server URL, falling back to default");
                Self::default_client()
            }
        };
        let server_url = http_client.base_url().to_string();
        info!(url = %server_url, "Using model server");
        let client: Arc<dyn StudioClient> = Arc::new(http_client);

        let ctx = cc.egui_ctx.clone();
        let repaint: Repaint = Arc::new(move || ctx.request_repaint());

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap_or_else(|e| panic!("Failed to start async runtime: {}", e));

        let mut app = Self::with_parts(client, runtime, repaint, &settings, data_dir);
        app.server_url = server_url.clone();
        app.server_url_draft = server_url;
        app
    }

    /// Build the app around an explicit client, runtime and repaint hook.
    pub(crate) fn with_parts(
        client: Arc<dyn StudioClient>,
        runtime: tokio::runtime::Runtime,
        repaint: Repaint,
        settings: &Settings,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            active_tab: Tab::Caption,
            caption_file: None,
            caption_preview: None,
            caption: CaptionParams::default(),
            txt2img: Txt2ImgParams::default(),
            summarize: SummarizeParams::default(),
            elaborate: ElaborateParams::default(),
            outputs: Outputs::default(),
            generated_png: None,
            stale_images: Vec::new(),
            alert: None,
            client,
            runtime,
            repaint,
            server_url: settings.server_url.clone(),
            configured_server_url: settings.server_url.clone(),
            server_url_draft: settings.server_url.clone(),
            server_url_error: None,
            show_settings: false,
            toast_message: None,
            toast_start: None,
            logo_texture: None,
            save_dir: settings.save_dir_or_default(),
            window_pos: None,
            window_size: None,
            needs_center: false,
            data_dir,
        }
    }

    fn default_client() -> HttpStudioClient {
        // The built-in URL is a valid http:// URL, so only a TLS backend failure could land here
        HttpStudioClient::new(crate::constants::DEFAULT_SERVER_URL)
            .unwrap_or_else(|e| panic!("Failed to build HTTP client: {}", e))
    }

    pub fn save_settings(&self) {
        let settings = Settings {
            window_x: self.window_pos.map(|p| p.x),
            window_y: self.window_pos.map(|p| p.y),
            window_w: self.window_size.map(|s| s.x),
            window_h: self.window_size.map(|s| s.y),
            server_url: self.configured_server_url.clone(),
            save_dir: Some(self.save_dir.to_string_lossy().to_string()),
        };
        settings.save(&self.data_dir);
    }

    // ========================================================================
    // TABS
    // ========================================================================

    /// Show `tab` and hide the others. Idempotent.
    pub fn select_tab(&mut self, tab: Tab) {
        if self.active_tab != tab {
            debug!(tab = tab.key(), "Tab selected");
        }
        self.active_tab = tab;
    }

    /// Whether the panel for `tab` is rendered this frame
    pub fn is_tab_visible(&self, tab: Tab) -> bool {
        self.active_tab == tab
    }

    /// Whether the button for `tab` is drawn in the selected style
    pub fn is_tab_highlighted(&self, tab: Tab) -> bool {
        self.active_tab == tab
    }

    // ========================================================================
    // NOTIFICATIONS
    // ========================================================================

    pub(crate) fn show_alert(&mut self, message: &str) {
        debug!(message, "Alert shown");
        self.alert = Some(message.to_string());
    }

    /// Drop textures and bytes of images that are no longer on screen
    pub(crate) fn release_stale_images(&mut self, ctx: &egui::Context) {
        for uri in self.stale_images.drain(..) {
            debug!(uri = %uri, "Releasing image");
            ctx.forget_image(&uri);
        }
    }

    pub(crate) fn show_toast(&mut self, message: impl Into<String>) {
        self.toast_message = Some(message.into());
        self.toast_start = Some(std::time::Instant::now());
    }

    /// Point the client at a new server. Invalid URLs keep the current client.
    pub(crate) fn apply_server_url(&mut self) -> bool {
        let url = self.server_url_draft.trim().to_string();
        match HttpStudioClient::new(&url) {
            Ok(client) => {
                info!(url = %client.base_url(), "Server URL changed");
                self.server_url = client.base_url().to_string();
                self.configured_server_url = self.server_url.clone();
                self.server_url_draft = self.server_url.clone();
                self.client = Arc::new(client);
                self.server_url_error = None;
                true
            }
            Err(e) => {
                warn!(error = %e, "Rejected server URL");
                self.server_url_error = Some(e.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::api::{decode_body, ApiError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned reply for every endpoint of a `MockClient`
    #[derive(Clone)]
    pub enum MockReply {
        /// Body run through the real response decoding
        Json(&'static str),
        /// Transport failure with this message
        Network(&'static str),
    }

    pub struct MockClient {
        reply: MockReply,
        pub calls: AtomicUsize,
    }

    impl MockClient {
        pub fn new(reply: MockReply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn respond<T: serde::de::DeserializeOwned>(&self) -> Result<T, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                MockReply::Json(body) => decode_body(body.as_bytes()),
                MockReply::Network(msg) => Err(ApiError::Network(msg.to_string())),
            }
        }
    }

    #[async_trait]
    impl StudioClient for MockClient {
        async fn caption(&self, _: CaptionRequest) -> Result<CaptionResponse, ApiError> {
            self.respond()
        }
        async fn txt2img(&self, _: Txt2ImgParams) -> Result<Txt2ImgResponse, ApiError> {
            self.respond()
        }
        async fn summarize(&self, _: SummarizeParams) -> Result<SummarizeResponse, ApiError> {
            self.respond()
        }
        async fn elaborate(&self, _: ElaborateParams) -> Result<ElaborateResponse, ApiError> {
            self.respond()
        }
    }

    pub fn test_app(client: Arc<MockClient>) -> App {
        test_app_with(client, &Settings::default(), std::env::temp_dir())
    }

    pub fn test_app_with(client: Arc<MockClient>, settings: &Settings, data_dir: PathBuf) -> App {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        App::with_parts(
            client,
            runtime,
            Arc::new(|| {}),
            settings,
            data_dir,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_caption_tab_selected_on_startup() {
        let app = test_app(MockClient::new(MockReply::Json("{}")));
        assert_eq!(app.active_tab, Tab::Caption);
        assert!(app.is_tab_visible(Tab::Caption));
    }

    #[test]
    fn test_exactly_one_tab_visible_and_highlighted() {
        let mut app = test_app(MockClient::new(MockReply::Json("{}")));
        for tab in Tab::ALL {
            app.select_tab(tab);
            let visible: Vec<_> = Tab::ALL.iter().filter(|t| app.is_tab_visible(**t)).collect();
            let highlighted: Vec<_> =
                Tab::ALL.iter().filter(|t| app.is_tab_highlighted(**t)).collect();
            assert_eq!(visible, [&tab]);
            assert_eq!(highlighted, [&tab]);
        }
    }

    #[test]
    fn test_select_tab_is_idempotent_and_leaves_outputs_alone() {
        let mut app = test_app(MockClient::new(MockReply::Json("{}")));
        *lock(&app.outputs.summary) = TextOutput::ok("kept");
        app.select_tab(Tab::Summarize);
        app.select_tab(Tab::Summarize);
        app.select_tab(Tab::Caption);
        assert!(app.is_tab_visible(Tab::Caption));
        assert_eq!(lock(&app.outputs.summary).text, "kept");
    }

    #[test]
    fn test_apply_server_url() {
        let mut app = test_app(MockClient::new(MockReply::Json("{}")));
        app.server_url_draft = "ftp://nope".into();
        assert!(!app.apply_server_url());
        assert!(app.server_url_error.is_some());
        assert_eq!(app.server_url, crate::constants::DEFAULT_SERVER_URL);

        app.server_url_draft = " http://gpu-box:9000/ ".into();
        assert!(app.apply_server_url());
        assert_eq!(app.server_url, "http://gpu-box:9000");
        assert!(app.server_url_error.is_none());
    }

    #[test]
    fn test_env_server_url_is_not_written_to_settings() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            server_url: "http://file-host:2".into(),
            ..Default::default()
        };
        settings.save(dir.path());

        let loaded = Settings::load(dir.path());
        let mut app = test_app_with(
            MockClient::new(MockReply::Json("{}")),
            &loaded,
            dir.path().to_path_buf(),
        );
        // What App::new does when the environment overrides the server
        app.server_url = "http://env-host:1".into();
        app.save_settings();

        assert_eq!(Settings::load(dir.path()).server_url, "http://file-host:2");
    }

    #[test]
    fn test_applied_server_url_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app_with(
            MockClient::new(MockReply::Json("{}")),
            &Settings::default(),
            dir.path().to_path_buf(),
        );
        app.server_url_draft = "http://gpu-box:9000".into();
        assert!(app.apply_server_url());
        app.save_settings();

        assert_eq!(Settings::load(dir.path()).server_url, "http://gpu-box:9000");
    }
}
