//! Request handlers for the four server-backed actions
//!
//! Each handler checks its required input, writes the busy placeholder into
//! its own output slot, and spawns exactly one request task. The task writes
//! the result (or `Error: <message>`) back into that slot and asks for a
//! repaint. Nothing guards against a second click while a request is in
//! flight; whichever response lands last is what stays on screen.

use super::App;
use crate::api::{error_text, ApiError};
use crate::constants::*;
use crate::types::*;
use crate::utils::{default_image_name, file_uri, is_image_path, png_data_uri};
use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

impl App {
    /// Run `request` on the runtime, log how it went, then hand the result to `render`.
    fn spawn_request<T, F, R>(&self, action: Tab, request: F, render: R) -> JoinHandle<()>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
        R: FnOnce(Result<T, ApiError>) + Send + 'static,
    {
        let repaint = self.repaint.clone();
        info!(action = action.key(), endpoint = action.endpoint(), "Request started");

        self.runtime.spawn(async move {
            let started = Instant::now();
            let result = request.await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &result {
                Ok(_) => info!(action = action.key(), elapsed_ms, "Request completed"),
                Err(e) => warn!(action = action.key(), elapsed_ms, error = %e, "Request failed"),
            }
            render(result);
            (*repaint)();
        })
    }

    // ========================================================================
    // CAPTION
    // ========================================================================

    /// Remember the chosen image and show it locally. Nothing is uploaded yet.
    pub fn set_caption_file(&mut self, path: PathBuf) {
        debug!(path = %path.display(), "Caption image selected");
        let preview = file_uri(&path);
        if let Some(old) = self.caption_preview.replace(preview) {
            self.stale_images.push(old);
        }
        self.caption_file = Some(path);
    }

    pub fn pick_caption_file(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Choose an image")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file();
        if let Some(path) = picked {
            self.set_caption_file(path);
        }
    }

    /// Accept an image dropped onto the window while the caption tab is open
    pub fn handle_dropped_files(&mut self, paths: Vec<PathBuf>) {
        if self.active_tab != Tab::Caption {
            return;
        }
        if let Some(path) = paths.into_iter().find(|p| is_image_path(p)) {
            self.set_caption_file(path);
        }
    }

    pub fn run_caption(&mut self) -> Option<JoinHandle<()>> {
        let Some(path) = self.caption_file.clone() else {
            self.show_alert(ALERT_NO_IMAGE);
            return None;
        };
        let params = self.caption.clone();
        let slot = self.outputs.caption.clone();
        *lock(&slot) = TextOutput::ok(CAPTION_BUSY);

        let client = self.client.clone();
        let request = async move {
            let image = tokio::fs::read(&path).await?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "image".to_string());
            client
                .caption(CaptionRequest {
                    file_name,
                    image,
                    params,
                })
                .await
        };

        Some(self.spawn_request(Tab::Caption, request, move |result| {
            *lock(&slot) = match result {
                Ok(response) => TextOutput::ok(response.caption),
                Err(e) => TextOutput::failed(error_text(&e)),
            };
        }))
    }

    // ========================================================================
    // TEXT TO IMAGE
    // ========================================================================

    pub fn run_txt2img(&mut self) -> Option<JoinHandle<()>> {
        let params = self.txt2img.clone();
        if params.prompt.is_empty() {
            self.show_alert(ALERT_NO_PROMPT);
            return None;
        }
        let slot = self.outputs.txt2img.clone();
        lock(&slot).status = TextOutput::ok(TXT2IMG_BUSY);

        let client = self.client.clone();
        let request = async move { client.txt2img(params).await };

        Some(self.spawn_request(Tab::Txt2Img, request, move |result| {
            let mut view = lock(&slot);
            match result {
                Ok(response) => {
                    view.image_src = Some(png_data_uri(&response.image_base64));
                    view.generation += 1;
                    view.status = TextOutput::ok(format!("Done (seed: {})", response.seed_label()));
                }
                // Previous image stays; only the status changes
                Err(e) => view.status = TextOutput::failed(error_text(&e)),
            }
        }))
    }

    /// Bytes of the currently shown generation, decoded once per generation.
    /// The previous generation's texture is queued for release.
    pub(crate) fn generated_image(&mut self) -> Option<(u64, std::sync::Arc<[u8]>)> {
        let view = lock(&self.outputs.txt2img).clone();
        let src = view.image_src?;
        if let Some((generation, bytes)) = &self.generated_png {
            if *generation == view.generation {
                return bytes.clone().map(|b| (*generation, b));
            }
        }

        let bytes: Option<std::sync::Arc<[u8]>> =
            crate::utils::decode_png_data_uri(&src).map(Into::into);
        if bytes.is_none() {
            warn!(generation = view.generation, "Generated image is not valid base64");
        }
        if let Some((old, Some(_))) = self.generated_png.replace((view.generation, bytes.clone())) {
            self.stale_images.push(generation_uri(old));
        }
        bytes.map(|b| (view.generation, b))
    }

    /// Ask where to save the current generation and write it there
    pub fn save_generated_image(&mut self) {
        let Some((_, bytes)) = self.generated_image() else {
            return;
        };
        let picked = rfd::FileDialog::new()
            .set_title("Save image")
            .set_directory(&self.save_dir)
            .set_file_name(default_image_name(chrono::Local::now()))
            .add_filter("PNG image", &["png"])
            .save_file();
        let Some(path) = picked else {
            return;
        };

        match std::fs::write(&path, &bytes[..]) {
            Ok(()) => {
                info!(path = %path.display(), bytes = bytes.len(), "Image saved");
                if let Some(parent) = path.parent() {
                    self.save_dir = parent.to_path_buf();
                }
                self.show_toast(format!("Saved {}", path.display()));
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to save image");
                self.show_toast(format!("Could not save image: {}", e));
            }
        }
    }

    // ========================================================================
    // SUMMARIZE / ELABORATE
    // ========================================================================
    // No client-side validation: empty text goes to the server as-is.

    pub fn run_summarize(&mut self) -> JoinHandle<()> {
        let slot = self.outputs.summary.clone();
        *lock(&slot) = TextOutput::ok(SUMMARIZE_BUSY);

        let params = self.summarize.clone();
        let client = self.client.clone();
        let request = async move { client.summarize(params).await };

        self.spawn_request(Tab::Summarize, request, move |result| {
            *lock(&slot) = match result {
                Ok(response) => TextOutput::ok(response.summary),
                Err(e) => TextOutput::failed(error_text(&e)),
            };
        })
    }

    pub fn run_elaborate(&mut self) -> JoinHandle<()> {
        let slot = self.outputs.elaboration.clone();
        *lock(&slot) = TextOutput::ok(ELABORATE_BUSY);

        let params = self.elaborate.clone();
        let client = self.client.clone();
        let request = async move { client.elaborate(params).await };

        self.spawn_request(Tab::Elaborate, request, move |result| {
            *lock(&slot) = match result {
                Ok(response) => TextOutput::ok(response.elaboration),
                Err(e) => TextOutput::failed(error_text(&e)),
            };
        })
    }

    /// Run whichever action belongs to the visible tab (Ctrl+Enter)
    pub fn run_active_action(&mut self) {
        match self.active_tab {
            Tab::Caption => {
                self.run_caption();
            }
            Tab::Txt2Img => {
                self.run_txt2img();
            }
            Tab::Summarize => {
                self.run_summarize();
            }
            Tab::Elaborate => {
                self.run_elaborate();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use std::io::Write;

    fn finish(app: &App, handle: JoinHandle<()>) {
        app.runtime.block_on(handle).unwrap();
    }

    fn image_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"not-really-a-png").unwrap();
        file
    }

    #[test]
    fn test_caption_without_file_alerts_and_sends_nothing() {
        let client = MockClient::new(MockReply::Json(r#"{"caption": "a cat"}"#));
        let mut app = test_app(client.clone());

        assert!(app.run_caption().is_none());
        assert_eq!(app.alert.as_deref(), Some("Choose an image first"));
        assert_eq!(client.call_count(), 0);
        assert_eq!(lock(&app.outputs.caption).text, "");
    }

    #[test]
    fn test_caption_success_renders_caption() {
        let client = MockClient::new(MockReply::Json(r#"{"caption": "a cat"}"#));
        let mut app = test_app(client.clone());
        let file = image_file();
        app.set_caption_file(file.path().to_path_buf());
        assert!(app.caption_preview.as_deref().unwrap().starts_with("file://"));

        let handle = app.run_caption().unwrap();
        finish(&app, handle);

        assert_eq!(lock(&app.outputs.caption).text, "a cat");
        assert_eq!(client.call_count(), 1);
        assert!(app.alert.is_none());
    }

    #[test]
    fn test_caption_unreadable_file_renders_error() {
        let client = MockClient::new(MockReply::Json(r#"{"caption": "a cat"}"#));
        let mut app = test_app(client.clone());
        app.set_caption_file(std::env::temp_dir().join("vision-studio-missing-image.png"));

        let handle = app.run_caption().unwrap();
        finish(&app, handle);

        assert!(lock(&app.outputs.caption).text.starts_with("Error: "));
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn test_placeholder_is_shown_while_in_flight() {
        let client = MockClient::new(MockReply::Json(r#"{"summary": "short"}"#));
        let mut app = test_app(client);

        let handle = app.run_summarize();
        // The placeholder is written before the task is spawned
        let shown = lock(&app.outputs.summary).text.clone();
        assert!(shown == "Summarizing..." || shown == "short");
        finish(&app, handle);
        assert_eq!(lock(&app.outputs.summary).text, "short");
    }

    #[test]
    fn test_txt2img_empty_prompt_alerts_and_sends_nothing() {
        let client = MockClient::new(MockReply::Json(r#"{"image_base64": "AAA", "seed": 1}"#));
        let mut app = test_app(client.clone());

        assert!(app.run_txt2img().is_none());
        assert_eq!(app.alert.as_deref(), Some("Enter a prompt"));
        assert_eq!(client.call_count(), 0);
        assert_eq!(*lock(&app.outputs.txt2img), Txt2ImgView::default());
    }

    #[test]
    fn test_txt2img_success_sets_image_and_status() {
        let client = MockClient::new(MockReply::Json(r#"{"image_base64": "AAA", "seed": 42}"#));
        let mut app = test_app(client);
        app.txt2img.prompt = "a red fox".into();

        let handle = app.run_txt2img().unwrap();
        finish(&app, handle);

        let view = lock(&app.outputs.txt2img).clone();
        assert_eq!(view.image_src.as_deref(), Some("data:image/png;base64,AAA"));
        assert_eq!(view.status.text, "Done (seed: 42)");
        assert_eq!(view.generation, 1);
    }

    #[test]
    fn test_txt2img_failure_keeps_previous_image() {
        let mut app = test_app(MockClient::new(MockReply::Json(r#"{"error": "bad input"}"#)));
        app.txt2img.prompt = "a red fox".into();
        lock(&app.outputs.txt2img).image_src = Some("data:image/png;base64,OLD".into());

        let handle = app.run_txt2img().unwrap();
        finish(&app, handle);

        let view = lock(&app.outputs.txt2img).clone();
        assert_eq!(view.status.text, "Error: bad input");
        assert_eq!(view.image_src.as_deref(), Some("data:image/png;base64,OLD"));
    }

    #[test]
    fn test_generated_image_is_decoded_once_per_generation() {
        let mut app = test_app(MockClient::new(MockReply::Json(
            r#"{"image_base64": "iVBORw0KGgo=", "seed": 3}"#,
        )));
        app.txt2img.prompt = "x".into();
        assert!(app.generated_image().is_none());

        let handle = app.run_txt2img().unwrap();
        finish(&app, handle);

        let (generation, bytes) = app.generated_image().unwrap();
        assert_eq!(generation, 1);
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
        let (_, again) = app.generated_image().unwrap();
        assert!(std::sync::Arc::ptr_eq(&bytes, &again));
    }

    #[test]
    fn test_server_error_from_every_endpoint() {
        let body = r#"{"error": "bad input"}"#;

        let mut app = test_app(MockClient::new(MockReply::Json(body)));
        let file = image_file();
        app.set_caption_file(file.path().to_path_buf());
        app.txt2img.prompt = "prompt".into();

        let handles = vec![
            app.run_caption().unwrap(),
            app.run_txt2img().unwrap(),
            app.run_summarize(),
            app.run_elaborate(),
        ];
        for handle in handles {
            finish(&app, handle);
        }

        assert_eq!(lock(&app.outputs.caption).text, "Error: bad input");
        assert_eq!(lock(&app.outputs.txt2img).status.text, "Error: bad input");
        assert_eq!(lock(&app.outputs.summary).text, "Error: bad input");
        assert_eq!(lock(&app.outputs.elaboration).text, "Error: bad input");
        assert!(lock(&app.outputs.caption).failed);
        assert!(lock(&app.outputs.txt2img).status.failed);
        assert!(lock(&app.outputs.summary).failed);
        assert!(lock(&app.outputs.elaboration).failed);
    }

    #[test]
    fn test_summarize_sends_empty_text_without_alert() {
        let client = MockClient::new(MockReply::Json(r#"{"error": "Text is required"}"#));
        let mut app = test_app(client.clone());

        let handle = app.run_summarize();
        finish(&app, handle);

        assert!(app.alert.is_none());
        assert_eq!(client.call_count(), 1);
        assert_eq!(lock(&app.outputs.summary).text, "Error: Text is required");
    }

    #[test]
    fn test_elaborate_success() {
        let mut app = test_app(MockClient::new(MockReply::Json(
            r#"{"elaboration": "A much longer text."}"#,
        )));
        app.elaborate.text = "short text".into();

        let handle = app.run_elaborate();
        finish(&app, handle);

        assert_eq!(lock(&app.outputs.elaboration).text, "A much longer text.");
    }

    #[test]
    fn test_network_failure_only_touches_its_own_action() {
        let mut app = test_app(MockClient::new(MockReply::Network("timeout")));
        *lock(&app.outputs.summary) = TextOutput::ok("earlier summary");
        *lock(&app.outputs.caption) = TextOutput::ok("earlier caption");

        let handle = app.run_elaborate();
        finish(&app, handle);

        assert_eq!(lock(&app.outputs.elaboration).text, "Error: timeout");
        assert_eq!(lock(&app.outputs.summary).text, "earlier summary");
        assert_eq!(lock(&app.outputs.caption).text, "earlier caption");
    }

    #[test]
    fn test_overlapping_requests_are_not_deduplicated() {
        let client = MockClient::new(MockReply::Json(r#"{"summary": "same"}"#));
        let mut app = test_app(client.clone());

        let first = app.run_summarize();
        let second = app.run_summarize();
        finish(&app, first);
        finish(&app, second);

        assert_eq!(client.call_count(), 2);
        assert_eq!(lock(&app.outputs.summary).text, "same");
    }

    #[test]
    fn test_dropped_files_only_accepted_on_caption_tab() {
        let mut app = test_app(MockClient::new(MockReply::Json("{}")));

        app.select_tab(Tab::Summarize);
        app.handle_dropped_files(vec![PathBuf::from("/tmp/cat.png")]);
        assert!(app.caption_file.is_none());

        app.select_tab(Tab::Caption);
        app.handle_dropped_files(vec![
            PathBuf::from("/tmp/notes.txt"),
            PathBuf::from("/tmp/cat.png"),
        ]);
        assert_eq!(app.caption_file, Some(PathBuf::from("/tmp/cat.png")));
        assert_eq!(app.caption_preview.as_deref(), Some("file:///tmp/cat.png"));
    }

    #[test]
    fn test_success_text_that_looks_like_an_error_is_not_flagged() {
        let mut app = test_app(MockClient::new(MockReply::Json(
            r#"{"summary": "Error: the sign on the door was misspelled."}"#,
        )));

        let handle = app.run_summarize();
        finish(&app, handle);

        let output = lock(&app.outputs.summary).clone();
        assert_eq!(output.text, "Error: the sign on the door was misspelled.");
        assert!(!output.failed);
    }

    #[test]
    fn test_previous_generation_is_released() {
        let mut app = test_app(MockClient::new(MockReply::Json(
            r#"{"image_base64": "iVBORw0KGgo=", "seed": 3}"#,
        )));
        app.txt2img.prompt = "x".into();

        let handle = app.run_txt2img().unwrap();
        finish(&app, handle);
        app.generated_image().unwrap();
        assert!(app.stale_images.is_empty());

        let handle = app.run_txt2img().unwrap();
        finish(&app, handle);
        let (generation, _) = app.generated_image().unwrap();
        assert_eq!(generation, 2);
        assert_eq!(app.stale_images, ["bytes://txt2img-1.png"]);
    }

    #[test]
    fn test_undecodable_generation_is_remembered() {
        let mut app = test_app(MockClient::new(MockReply::Json(
            r#"{"image_base64": "%%% not base64 %%%", "seed": 3}"#,
        )));
        app.txt2img.prompt = "x".into();

        let handle = app.run_txt2img().unwrap();
        finish(&app, handle);

        assert!(app.generated_image().is_none());
        assert!(matches!(app.generated_png, Some((1, None))));
        assert!(app.generated_image().is_none());
        assert!(app.stale_images.is_empty());
    }

    #[test]
    fn test_replaced_caption_preview_is_released() {
        let mut app = test_app(MockClient::new(MockReply::Json("{}")));
        app.set_caption_file(PathBuf::from("/tmp/cat.png"));
        assert!(app.stale_images.is_empty());

        app.set_caption_file(PathBuf::from("/tmp/dog.png"));
        assert_eq!(app.stale_images, ["file:///tmp/cat.png"]);
        assert_eq!(app.caption_preview.as_deref(), Some("file:///tmp/dog.png"));
    }
}
