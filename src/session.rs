//! Session orchestration: async actions binding the adapters to the store.
//!
//! A [`Session`] owns the [`AppState`], a [`GenerationClient`] and an
//! observer, and exposes one method per user action. Each action follows
//! the same shape: check the guard, dispatch the start event, await the
//! adapter, dispatch the outcome event. The store is only ever mutated
//! from these methods, so exclusion is structural; no locks are needed.
//!
//! ## Error policy
//!
//! Upload validation and extraction failures are returned to the caller
//! for alert-style reporting (extraction failure also resets the session
//! to the upload screen). Generation failures never propagate: the raw
//! cause is logged and a fixed user-facing message lands in the relevant
//! result field or chat turn. Every path leaves the session usable.

use crate::adapter::extract;
use crate::adapter::gemini::{GeminiClient, GenerationClient};
use crate::chat;
use crate::config::SessionConfig;
use crate::error::LecturaError;
use crate::observer::{NoopObserver, SessionObserver};
use crate::prompts;
use crate::state::{AppState, Event, View};
use std::sync::Arc;
use tracing::{error, info};

/// One reading session: a document and the three operations on it.
pub struct Session {
    state: AppState,
    config: SessionConfig,
    client: Arc<dyn GenerationClient>,
    observer: Arc<dyn SessionObserver>,
}

impl Session {
    /// Create a session. The config's `client` override (if any) wins;
    /// otherwise a [`GeminiClient`] is built from the config. A missing
    /// API key does not fail here; generation calls report it instead.
    pub fn new(config: SessionConfig) -> Self {
        let client: Arc<dyn GenerationClient> = config.client.clone().unwrap_or_else(|| {
            Arc::new(GeminiClient::new(
                config.api_key.clone(),
                config.model.clone(),
                config.api_base_url.clone(),
            ))
        });
        let observer: Arc<dyn SessionObserver> = config
            .observer
            .clone()
            .unwrap_or_else(|| Arc::new(NoopObserver));

        Self {
            state: AppState::default(),
            config,
            client,
            observer,
        }
    }

    /// The current state snapshot.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    fn dispatch(&mut self, event: Event) {
        self.state.apply(event);
        self.observer.state_changed(&self.state);
    }

    // ── Upload ────────────────────────────────────────────────────────────

    /// Accept an uploaded file and extract its text.
    ///
    /// The view switches to `Summary` as soon as the MIME check passes,
    /// before extraction completes, so the summary screen renders the
    /// extraction-in-progress state.
    ///
    /// # Errors
    /// - [`LecturaError::NotAPdf`]: state untouched, still on upload
    /// - extraction errors: session reset to the upload screen
    pub async fn handle_upload(
        &mut self,
        bytes: Vec<u8>,
        file_name: &str,
        declared_mime: &str,
    ) -> Result<(), LecturaError> {
        if declared_mime != extract::PDF_MIME_TYPE {
            return Err(LecturaError::NotAPdf {
                mime: declared_mime.to_string(),
            });
        }
        if self.state.is_parsing {
            return Ok(());
        }

        self.dispatch(Event::UploadAccepted {
            file_name: file_name.to_string(),
        });

        match extract::extract_text(bytes, file_name, declared_mime).await {
            Ok(text) => {
                info!(file_name, chars = text.len(), "extraction complete");
                self.dispatch(Event::ExtractionCompleted { text });
                Ok(())
            }
            Err(e) => {
                error!(file_name, error = %e, "extraction failed");
                self.dispatch(Event::ExtractionAborted);
                Err(e)
            }
        }
    }

    // ── Navigation and input ──────────────────────────────────────────────

    pub fn select_view(&mut self, view: View) {
        self.dispatch(Event::ViewSelected(view));
    }

    pub fn set_drag_over(&mut self, drag_over: bool) {
        self.dispatch(Event::DragOverChanged(drag_over));
    }

    pub fn set_summary_question(&mut self, question: impl Into<String>) {
        self.dispatch(Event::SummaryQuestionEdited(question.into()));
    }

    pub fn set_refine_request(&mut self, request: impl Into<String>) {
        self.dispatch(Event::RefineRequestEdited(request.into()));
    }

    pub fn set_chat_input(&mut self, input: impl Into<String>) {
        self.dispatch(Event::ChatInputEdited(input.into()));
    }

    /// Clear everything and return to the upload screen.
    pub fn reset(&mut self) {
        self.dispatch(Event::Reset);
    }

    // ── Summary ───────────────────────────────────────────────────────────

    /// Generate a summary of the document, focused on the current summary
    /// question when one is set. Re-entrant calls and calls without a
    /// document are silent no-ops. Failures land in the summary field.
    pub async fn generate_summary(&mut self) {
        if !self.state.can_start_generation() {
            return;
        }
        let Some(doc) = self.state.document.as_ref() else {
            return;
        };
        let prompt = prompts::summary_prompt(
            &doc.text,
            &self.state.summary_question,
            self.config.summary_context_chars,
        );

        self.dispatch(Event::SummaryRequested);
        let outcome = self.client.generate(prompt).await;
        match outcome {
            Ok(text) => self.dispatch(Event::SummaryCompleted { text }),
            Err(e) => {
                error!(error = %e, "summary generation failed");
                self.dispatch(Event::SummaryFailed);
            }
        }
    }

    /// Replace the current summary with one refined per the pending
    /// refinement request. No-op without a summary or a request. On
    /// failure the previous summary is kept.
    pub async fn refine_summary(&mut self) {
        if !self.state.can_start_generation()
            || self.state.summary_raw.is_empty()
            || self.state.refine_request.trim().is_empty()
        {
            return;
        }
        let Some(doc) = self.state.document.as_ref() else {
            return;
        };
        let prompt = prompts::refine_prompt(
            &doc.text,
            &self.state.summary_raw,
            &self.state.refine_request,
            self.config.refine_context_chars,
        );

        self.dispatch(Event::RefineRequested);
        let outcome = self.client.generate(prompt).await;
        match outcome {
            Ok(text) => self.dispatch(Event::RefineCompleted { text }),
            Err(e) => {
                error!(error = %e, "summary refinement failed");
                self.dispatch(Event::RefineFailed);
            }
        }
    }

    // ── Translation ───────────────────────────────────────────────────────

    /// Translate the whole document into the configured target language.
    /// Failures land in the translation result field.
    pub async fn translate_document(&mut self) {
        if !self.state.can_start_generation() {
            return;
        }
        let Some(doc) = self.state.document.as_ref() else {
            return;
        };
        let prompt = prompts::translate_prompt(
            &doc.text,
            &self.config.target_language,
            self.config.summary_context_chars,
        );

        self.dispatch(Event::TranslationRequested);
        let outcome = self.client.generate(prompt).await;
        match outcome {
            Ok(text) => self.dispatch(Event::TranslationCompleted { text }),
            Err(e) => {
                error!(error = %e, "translation failed");
                self.dispatch(Event::TranslationFailed);
            }
        }
    }

    // ── Chat ──────────────────────────────────────────────────────────────

    /// Send one chat message and stream the reply into the conversation.
    ///
    /// Empty input and sends while a stream is active are silent no-ops.
    /// The user turn and an empty model placeholder are appended before
    /// the stream is requested; the aggregation loop fills the placeholder
    /// fragment by fragment.
    pub async fn send_chat_message(&mut self, message: &str) {
        if !self.state.can_send_chat(message) {
            return;
        }

        self.dispatch(Event::ChatTurnStarted {
            message: message.to_string(),
        });

        let doc_text = self
            .state
            .document
            .as_ref()
            .map(|d| d.text.clone())
            .unwrap_or_default();
        let system_instruction =
            prompts::chat_system_instruction(&doc_text, self.config.chat_context_chars);
        let history = self.state.conversation.clone();

        let opened = self.client.chat_stream(system_instruction, history).await;
        match opened {
            Ok(stream) => {
                chat::drive_stream(&mut self.state, &*self.observer, stream).await;
            }
            Err(e) => {
                error!(error = %e, "failed to open chat stream");
                self.dispatch(Event::ChatFailed);
            }
        }
    }
}
