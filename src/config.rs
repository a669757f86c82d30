//! Configuration for a reading session.
//!
//! All behaviour is controlled through [`SessionConfig`], built via its
//! [`SessionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs, log them, and diff two runs to understand why
//! their outputs differ.
//!
//! # Design choice: builder over constructor
//! A many-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest.

use crate::adapter::gemini::{GenerationClient, DEFAULT_API_BASE_URL, DEFAULT_MODEL};
use crate::error::LecturaError;
use crate::observer::SessionObserver;
use std::fmt;
use std::sync::Arc;
use tracing::error;

/// Default character budget for the summary and translation prompts.
pub const DEFAULT_SUMMARY_CONTEXT_CHARS: usize = 100_000;

/// Default character budget for the document excerpt in a refinement prompt.
///
/// Smaller than the summary budget: the previous summary carries most of
/// the signal, the excerpt is only reference material.
pub const DEFAULT_REFINE_CONTEXT_CHARS: usize = 50_000;

/// Default character budget for the chat system instruction.
pub const DEFAULT_CHAT_CONTEXT_CHARS: usize = 200_000;

/// Configuration for a [`crate::session::Session`].
///
/// Built via [`SessionConfig::builder()`] or [`SessionConfig::from_env()`].
///
/// # Example
/// ```rust
/// use lectura::SessionConfig;
///
/// let config = SessionConfig::builder()
///     .model("gemini-2.5-flash")
///     .target_language("French")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct SessionConfig {
    /// Model identifier. Fixed for the session, not user-selectable per
    /// call. Default: `gemini-2.5-flash`.
    pub model: String,

    /// API credential. `None` is allowed: startup proceeds and every
    /// generation call fails with [`LecturaError::ApiKeyMissing`] instead.
    pub api_key: Option<String>,

    /// Base URL of the Gemini REST API. Overridable for tests and proxies.
    pub api_base_url: String,

    /// Language the translate operation targets. Default: Spanish.
    pub target_language: String,

    /// Max document characters embedded in a summary or translation prompt.
    ///
    /// The cut is silent toward the user (logged at WARN): it is a
    /// cost/latency bound, and long documents are summarised only up to
    /// this point. Default: 100 000.
    pub summary_context_chars: usize,

    /// Max document characters embedded in a refinement prompt. Default: 50 000.
    pub refine_context_chars: usize,

    /// Max document characters embedded in the chat system instruction.
    /// Default: 200 000.
    pub chat_context_chars: usize,

    /// Pre-constructed generation client. Takes precedence over the
    /// Gemini client the session would otherwise build — the seam tests
    /// use to inject a scripted stub.
    pub client: Option<Arc<dyn GenerationClient>>,

    /// Observer notified after every state mutation.
    pub observer: Option<Arc<dyn SessionObserver>>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            target_language: "Spanish".to_string(),
            summary_context_chars: DEFAULT_SUMMARY_CONTEXT_CHARS,
            refine_context_chars: DEFAULT_REFINE_CONTEXT_CHARS,
            chat_context_chars: DEFAULT_CHAT_CONTEXT_CHARS,
            client: None,
            observer: None,
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("target_language", &self.target_language)
            .field("summary_context_chars", &self.summary_context_chars)
            .field("refine_context_chars", &self.refine_context_chars)
            .field("chat_context_chars", &self.chat_context_chars)
            .field("client", &self.client.as_ref().map(|_| "<dyn GenerationClient>"))
            .field("observer", &self.observer.as_ref().map(|_| "<dyn SessionObserver>"))
            .finish()
    }
}

impl SessionConfig {
    /// Create a new builder.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults plus the API key from `GEMINI_API_KEY`.
    ///
    /// A missing or empty key is logged but does not fail; the session
    /// starts, and generation calls report the missing key when they run.
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        if api_key.is_none() {
            error!("GEMINI_API_KEY is not set; generation calls will fail");
        }
        Self {
            api_key,
            ..Self::default()
        }
    }
}

/// Builder for [`SessionConfig`].
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn target_language(mut self, language: impl Into<String>) -> Self {
        self.config.target_language = language.into();
        self
    }

    pub fn summary_context_chars(mut self, chars: usize) -> Self {
        self.config.summary_context_chars = chars;
        self
    }

    pub fn refine_context_chars(mut self, chars: usize) -> Self {
        self.config.refine_context_chars = chars;
        self
    }

    pub fn chat_context_chars(mut self, chars: usize) -> Self {
        self.config.chat_context_chars = chars;
        self
    }

    pub fn client(mut self, client: Arc<dyn GenerationClient>) -> Self {
        self.config.client = Some(client);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.config.observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SessionConfig, LecturaError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(LecturaError::InvalidConfig("model must not be empty".into()));
        }
        if c.summary_context_chars == 0
            || c.refine_context_chars == 0
            || c.chat_context_chars == 0
        {
            return Err(LecturaError::InvalidConfig(
                "context budgets must be ≥ 1 character".into(),
            ));
        }
        if c.target_language.trim().is_empty() {
            return Err(LecturaError::InvalidConfig(
                "target language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
