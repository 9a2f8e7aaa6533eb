//! HTTP client for the Vision Studio model server
//!
//! Every endpoint answers with a JSON object. A truthy `error` field wins over
//! everything else (including a 2xx status); otherwise the endpoint's success
//! field is extracted. The status code itself is never consulted.

use crate::constants::*;
use crate::types::*;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Connection refused, reset, DNS failure and friends
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Body was not JSON, or lacked the success field
    #[error("{0}")]
    Decode(#[from] serde_json::Error),
    /// Message from the response's `error` field
    #[error("{0}")]
    Server(String),
    #[error("invalid server URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

/// Text rendered into an action's output when it fails
pub fn error_text(err: &ApiError) -> String {
    format!("Error: {}", err)
}

/// The four server-backed actions. Held as `Arc<dyn StudioClient>` so the
/// controller can run against a mock.
#[async_trait]
pub trait StudioClient: Send + Sync {
    async fn caption(&self, request: CaptionRequest) -> Result<CaptionResponse, ApiError>;
    async fn txt2img(&self, params: Txt2ImgParams) -> Result<Txt2ImgResponse, ApiError>;
    async fn summarize(&self, params: SummarizeParams) -> Result<SummarizeResponse, ApiError>;
    async fn elaborate(&self, params: ElaborateParams) -> Result<ElaborateResponse, ApiError>;
}

/// Decode a response body, giving the `error` field precedence.
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let value: Value = serde_json::from_slice(body)?;
    if let Some(message) = error_message(&value) {
        return Err(ApiError::Server(message));
    }
    Ok(serde_json::from_value(value)?)
}

/// `error` counts only when truthy: absent, null, false, 0 and "" are ignored.
fn error_message(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Guess a content type for the uploaded image from its extension
fn image_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

pub struct HttpStudioClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStudioClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidUrl(base_url));
        }
        // No timeout: a slow first model load can legitimately take minutes
        let client = reqwest::Client::builder()
            .user_agent(format!("vision-studio/{}", APP_VERSION))
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<P, T>(&self, path: &str, payload: &P) -> Result<T, ApiError>
    where
        P: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let response = self.client.post(&url).json(payload).send().await?;
        debug!(url = %url, status = %response.status(), "Response received");
        let body = response.bytes().await?;
        decode_body(&body)
    }
}

#[async_trait]
impl StudioClient for HttpStudioClient {
    async fn caption(&self, request: CaptionRequest) -> Result<CaptionResponse, ApiError> {
        let mime = image_mime(&request.file_name);
        let file = reqwest::multipart::Part::bytes(request.image)
            .file_name(request.file_name)
            .mime_str(mime)?;
        let mut form = reqwest::multipart::Form::new().part("file", file);
        for (name, value) in request.params.form_fields() {
            form = form.text(name, value);
        }

        let url = self.url(CAPTION_PATH);
        let response = self.client.post(&url).multipart(form).send().await?;
        debug!(url = %url, status = %response.status(), "Response received");
        let body = response.bytes().await?;
        decode_body(&body)
    }

    async fn txt2img(&self, params: Txt2ImgParams) -> Result<Txt2ImgResponse, ApiError> {
        self.post_json(TXT2IMG_PATH, &params).await
    }

    async fn summarize(&self, params: SummarizeParams) -> Result<SummarizeResponse, ApiError> {
        self.post_json(SUMMARIZE_PATH, &params).await
    }

    async fn elaborate(&self, params: ElaborateParams) -> Result<ElaborateResponse, ApiError> {
        self.post_json(ELABORATE_PATH, &params).await
    }
}
