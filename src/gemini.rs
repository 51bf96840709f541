use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::collaborator::{FileState, MediaHandle, VideoModel};
use crate::config::GeminiConfig;
use crate::error::{GradeError, GradeResult};

const USER_AGENT_VALUE: &str = concat!("clipgrade/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    upload_timeout: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    name: String,
    #[serde(default)]
    uri: String,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: FileResource,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> GradeResult<Self> {
        let api_key = config.require_api_key()?.to_string();

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| GradeError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            upload_timeout: Duration::from_secs(config.upload_timeout_secs),
        })
    }

    async fn start_upload(
        &self,
        display_name: &str,
        mime_type: &str,
        length: usize,
    ) -> Result<String, String> {
        let url = format!("{}/upload/v1beta/files", self.base_url);
        debug!(url = %url, display_name, length, "starting resumable upload");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", length.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await
            .map_err(|e| format!("upload request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("upload rejected ({status}): {}", snippet(&body)));
        }

        response
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| format!("response is missing the {UPLOAD_URL_HEADER} header"))
    }

    async fn finish_upload(&self, session_url: &str, bytes: Vec<u8>) -> Result<FileResource, String> {
        let response = self
            .client
            .post(session_url)
            .timeout(self.upload_timeout)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await
            .map_err(|e| format!("upload transfer failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("upload transfer rejected ({status}): {}", snippet(&body)));
        }

        response
            .json::<UploadResponse>()
            .await
            .map(|r| r.file)
            .map_err(|e| format!("unexpected upload response: {e}"))
    }
}

#[async_trait]
impl VideoModel for GeminiClient {
    async fn upload(&self, path: &Path) -> GradeResult<MediaHandle> {
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_for_path(path);
        let bytes = tokio::fs::read(path).await?;

        let failed = |message: String| GradeError::UploadFailed {
            name: display_name.clone(),
            message,
        };

        let session_url = self
            .start_upload(&display_name, mime_type, bytes.len())
            .await
            .map_err(failed)?;
        let file = self
            .finish_upload(&session_url, bytes)
            .await
            .map_err(failed)?;

        debug!(name = %file.name, state = ?file.state, "upload finished");
        Ok(MediaHandle {
            name: file.name,
            uri: file.uri,
            mime_type: file.mime_type.unwrap_or_else(|| mime_type.to_string()),
        })
    }

    async fn file_state(&self, handle: &MediaHandle) -> GradeResult<FileState> {
        let url = format!("{}/v1beta/{}", self.base_url, handle.name);
        let failed = |message: String| GradeError::UploadFailed {
            name: handle.name.clone(),
            message,
        };

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| failed(format!("state request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(failed(format!(
                "state request rejected ({status}): {}",
                snippet(&body)
            )));
        }

        let file: FileResource = response
            .json()
            .await
            .map_err(|e| failed(format!("unexpected state response: {e}")))?;
        Ok(FileState::parse(file.state.as_deref().unwrap_or_default()))
    }

    async fn generate(
        &self,
        model: &str,
        handle: &MediaHandle,
        prompt: &str,
    ) -> GradeResult<String> {
        let model = model.trim_start_matches("models/");
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        debug!(url = %url, file = %handle.name, "invoking model");

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "file_data": { "mime_type": handle.mime_type, "file_uri": handle.uri } },
                    { "text": prompt }
                ]
            }]
        });

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GradeError::invocation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GradeError::invocation(format!("{status}: {}", snippet(&text))));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GradeError::invocation(format!("unexpected response body: {e}")))?;

        response_text(parsed)
    }
}

fn response_text(response: GenerateResponse) -> GradeResult<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!(" (blocked: {r})"))
            .unwrap_or_default();
        return Err(GradeError::invocation(format!(
            "response contained no text{reason}"
        )));
    }
    Ok(text)
}

/// Content type for a video file, from its extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "3gp" => "video/3gpp",
        _ => "application/octet-stream",
    }
}

fn snippet(body: &str) -> String {
    const LIMIT: usize = 300;
    let body = body.trim();
    match body.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
