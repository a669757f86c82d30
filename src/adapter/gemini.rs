//! Gemini interaction: the [`GenerationClient`] seam and its production
//! implementation over the Gemini REST API.
//!
//! This module is intentionally thin — all prompt engineering lives in
//! [`crate::prompts`] so wording can change without touching transport or
//! error handling here. The trait is object-safe (`BoxFuture` returns) so
//! the session can hold an `Arc<dyn GenerationClient>` and tests can swap
//! in a scripted stub.
//!
//! ## Streaming
//!
//! `streamGenerateContent?alt=sse` answers with one `data: {json}` line
//! per chunk. [`GeminiClient::chat_stream`] turns the response body into a
//! [`FragmentStream`]: raw bytes are buffered until a complete line is
//! available (a UTF-8 sequence can straddle chunk boundaries, a line
//! cannot), each `data:` payload is decoded, and its text becomes one
//! fragment. Chunks without text (finish metadata, safety annotations)
//! are skipped. The stream is finite and not restartable; dropping it
//! drops the underlying response body, which closes the connection — that
//! drop is the cancellation story.
//!
//! ## No retry
//!
//! Every call is made exactly once per user-triggered action. Failures
//! surface as [`LecturaError::GenerationFailed`] and are converted to
//! user-facing state by the session; the raw cause goes to the log only.

use crate::error::LecturaError;
use crate::state::{Role, Turn};
use futures::future::BoxFuture;
use futures::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::{debug, error};

/// Default model identifier. Fixed at configuration time, never per call.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// A boxed stream of text fragments from one streaming generation call.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, LecturaError>> + Send>>;

/// The generation seam between the session and the remote model.
///
/// Implementations must be cheap to call from an `Arc<dyn …>`: each method
/// returns an owned future so the session can await it without borrowing
/// the client across suspension points.
pub trait GenerationClient: Send + Sync {
    /// One-shot generation: prompt in, complete text out.
    fn generate(&self, prompt: String) -> BoxFuture<'static, Result<String, LecturaError>>;

    /// Streaming chat: system-level document context plus the turn
    /// history in, a lazy sequence of text fragments out.
    fn chat_stream(
        &self,
        system_instruction: String,
        history: Vec<Turn>,
    ) -> BoxFuture<'static, Result<FragmentStream, LecturaError>>;
}

/// Production [`GenerationClient`] over the Gemini REST API.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a client. A missing key does not fail here — startup must
    /// succeed without one; the first call reports [`LecturaError::ApiKeyMissing`].
    pub fn new(api_key: Option<String>, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    fn key(&self) -> Result<String, LecturaError> {
        self.api_key.clone().ok_or(LecturaError::ApiKeyMissing)
    }

    fn endpoint(&self, verb: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.base_url.trim_end_matches('/'),
            self.model,
            verb
        )
    }
}

impl GenerationClient for GeminiClient {
    fn generate(&self, prompt: String) -> BoxFuture<'static, Result<String, LecturaError>> {
        let client = self.clone();
        Box::pin(async move {
            let key = client.key()?;
            let url = client.endpoint("generateContent");
            debug!(model = %client.model, "sending generateContent request");

            let resp = client
                .http
                .post(&url)
                .header("x-goog-api-key", key)
                .json(&GenerateContentRequest::single_turn(prompt))
                .send()
                .await
                .map_err(|e| LecturaError::GenerationFailed {
                    detail: e.to_string(),
                })?;
            let resp = check_status(resp).await?;

            let body: GenerateContentResponse =
                resp.json().await.map_err(|e| LecturaError::GenerationFailed {
                    detail: format!("bad response body: {e}"),
                })?;

            let text = body.text();
            if text.is_empty() {
                return Err(LecturaError::GenerationFailed {
                    detail: "response contained no text".into(),
                });
            }
            Ok(text)
        })
    }

    fn chat_stream(
        &self,
        system_instruction: String,
        history: Vec<Turn>,
    ) -> BoxFuture<'static, Result<FragmentStream, LecturaError>> {
        let client = self.clone();
        Box::pin(async move {
            let key = client.key()?;
            let url = format!("{}?alt=sse", client.endpoint("streamGenerateContent"));
            debug!(model = %client.model, turns = history.len(), "opening chat stream");

            let resp = client
                .http
                .post(&url)
                .header("x-goog-api-key", key)
                .json(&GenerateContentRequest::chat(system_instruction, &history))
                .send()
                .await
                .map_err(|e| LecturaError::GenerationFailed {
                    detail: e.to_string(),
                })?;
            let resp = check_status(resp).await?;

            let body = resp
                .bytes_stream()
                .map(|chunk| {
                    chunk
                        .map(|b| b.to_vec())
                        .map_err(|e| LecturaError::GenerationFailed {
                            detail: format!("stream transport error: {e}"),
                        })
                })
                .boxed();

            Ok(sse_fragments(body))
        })
    }
}

/// Map a non-success HTTP status to `GenerationFailed`, logging the body.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, LecturaError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    error!(%status, %body, "Gemini API returned an error");
    let mut detail = format!("HTTP {status}");
    if !body.is_empty() {
        let snippet: String = body.chars().take(300).collect();
        detail = format!("{detail}: {snippet}");
    }
    Err(LecturaError::GenerationFailed { detail })
}

// ── Wire format ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    contents: Vec<WireContent>,
}

impl GenerateContentRequest {
    fn single_turn(prompt: String) -> Self {
        Self {
            system_instruction: None,
            contents: vec![WireContent::new(Some("user"), prompt)],
        }
    }

    /// Build a chat request from the conversation.
    ///
    /// The trailing streaming placeholder (and any other empty turn) is a
    /// store-protocol artefact, not content — it never goes on the wire.
    fn chat(system_instruction: String, history: &[Turn]) -> Self {
        Self {
            system_instruction: Some(WireContent::new(None, system_instruction)),
            contents: history
                .iter()
                .filter(|turn| !turn.text.is_empty())
                .map(|turn| {
                    let role = match turn.role {
                        Role::User => "user",
                        Role::Model => "model",
                    };
                    WireContent::new(Some(role), turn.text.clone())
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

impl WireContent {
    fn new(role: Option<&str>, text: String) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![WirePart { text }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WirePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<WireContent>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

// ── SSE decoding ─────────────────────────────────────────────────────────

struct SseDecoder {
    body: BoxStream<'static, Result<Vec<u8>, LecturaError>>,
    buf: Vec<u8>,
    failed: bool,
}

enum SseLine {
    Fragment(String),
    Skip,
    Malformed(String),
}

/// Decode one raw SSE line.
///
/// Empty lines (event separators) and non-`data:` fields are skipped, as
/// are data payloads whose response carries no text.
fn decode_sse_line(raw: &[u8]) -> SseLine {
    let Ok(line) = std::str::from_utf8(raw) else {
        return SseLine::Malformed("non-UTF-8 SSE line".into());
    };
    let line = line.trim_end_matches(['\n', '\r']);
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let data = data.trim_start();
    if data.is_empty() {
        return SseLine::Skip;
    }
    match serde_json::from_str::<GenerateContentResponse>(data) {
        Ok(resp) => {
            let text = resp.text();
            if text.is_empty() {
                SseLine::Skip
            } else {
                SseLine::Fragment(text)
            }
        }
        Err(e) => SseLine::Malformed(format!("bad SSE payload: {e}")),
    }
}

/// Turn a raw byte stream into a [`FragmentStream`].
///
/// After the first error the stream ends: a broken transport or a
/// malformed payload cannot be resumed mid-response.
fn sse_fragments(body: BoxStream<'static, Result<Vec<u8>, LecturaError>>) -> FragmentStream {
    let decoder = SseDecoder {
        body,
        buf: Vec::new(),
        failed: false,
    };

    Box::pin(futures::stream::unfold(decoder, |mut st| async move {
        if st.failed {
            return None;
        }
        loop {
            if let Some(idx) = st.buf.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = st.buf.drain(..=idx).collect();
                match decode_sse_line(&line) {
                    SseLine::Fragment(text) => return Some((Ok(text), st)),
                    SseLine::Skip => continue,
                    SseLine::Malformed(detail) => {
                        st.failed = true;
                        return Some((Err(LecturaError::GenerationFailed { detail }), st));
                    }
                }
            }
            match st.body.next().await {
                Some(Ok(chunk)) => st.buf.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    st.failed = true;
                    return Some((Err(e), st));
                }
                None => {
                    if st.buf.is_empty() {
                        return None;
                    }
                    // Flush a trailing line that arrived without a newline.
                    let line = std::mem::take(&mut st.buf);
                    match decode_sse_line(&line) {
                        SseLine::Fragment(text) => return Some((Ok(text), st)),
                        SseLine::Skip => return None,
                        SseLine::Malformed(detail) => {
                            st.failed = true;
                            return Some((Err(LecturaError::GenerationFailed { detail }), st));
                        }
                    }
                }
            }
        }
    }))
}
