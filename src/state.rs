//! The application state store: one struct, one mutation point.
//!
//! Every entity the UI can observe lives in [`AppState`], and the only way
//! to change it is [`AppState::apply`] with an [`Event`]. The reducer owns
//! all the guards — a rejected event is a silent no-op, never an error —
//! so asynchronous drivers (the session, the chat loop) can dispatch
//! without re-checking invariants, and tests can exercise every transition
//! without any UI runtime or network.
//!
//! Invariants enforced here:
//!
//! * the view is never `Summary`/`Chat`/`Translate` without a document,
//!   except during the extraction window opened by an accepted upload;
//! * at most one action per flag is in flight (`is_parsing`, `is_loading`,
//!   `is_streaming`) — re-entrant triggers are dropped, not queued;
//! * the conversation is append-only, except the trailing model turn while
//!   a response streams;
//! * translation status moves `Idle → Translating → Done` and returns to
//!   `Idle` only on reset.

use serde::{Deserialize, Serialize};

/// Fixed message written into the chat when a stream fails mid-flight.
pub const CHAT_ERROR_MESSAGE: &str = "Sorry, something went wrong. Please try again.";

/// Fixed message shown in place of a summary when generation fails.
pub const SUMMARY_ERROR_MESSAGE: &str = "Sorry, the summary could not be generated.";

/// Fixed message shown in place of a translation when generation fails.
pub const TRANSLATION_ERROR_MESSAGE: &str = "Sorry, something went wrong during translation.";

/// The active screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Upload,
    Summary,
    Chat,
    Translate,
}

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
}

/// One message in the chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// The extracted text of one uploaded PDF.
///
/// Created only on successful extraction, replaced wholesale on a new
/// upload or reset, never partially mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub file_name: String,
}

/// Translation progress. Monotonic per run; reset returns it to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStatus {
    #[default]
    Idle,
    Translating,
    Done,
}

/// Everything the UI can observe, in one place.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AppState {
    pub view: View,
    pub document: Option<Document>,
    /// File name of an upload whose extraction has not finished yet.
    pub pending_upload: Option<String>,

    pub is_parsing: bool,
    pub is_loading: bool,
    pub is_streaming: bool,
    pub drag_over: bool,

    pub summary_question: String,
    pub summary_raw: String,
    /// Derived from `summary_raw` via the newline→`<br>` transform.
    pub summary_formatted: String,
    pub refine_request: String,

    pub conversation: Vec<Turn>,
    pub chat_input: String,

    pub translation_status: TranslationStatus,
    pub translation_result: String,
}

/// A state transition request. Guards live in [`AppState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    DragOverChanged(bool),

    /// A PDF passed the MIME check and extraction is starting. The view
    /// switches to `Summary` immediately; the summary screen renders the
    /// extraction-in-progress state until the document arrives.
    UploadAccepted { file_name: String },
    ExtractionCompleted { text: String },
    /// Extraction failed; everything is cleared back to the upload screen.
    ExtractionAborted,

    ViewSelected(View),

    SummaryQuestionEdited(String),
    RefineRequestEdited(String),
    ChatInputEdited(String),

    SummaryRequested,
    SummaryCompleted { text: String },
    SummaryFailed,

    RefineRequested,
    RefineCompleted { text: String },
    RefineFailed,

    TranslationRequested,
    TranslationCompleted { text: String },
    TranslationFailed,

    /// A chat send passed its guards: append the user turn, clear the
    /// input, raise the streaming flag, and append the empty model turn
    /// that the stream will fill in.
    ChatTurnStarted { message: String },
    /// Overwrite the trailing model turn with the full accumulated text.
    ChatFragmentApplied { accumulated: String },
    ChatCompleted,
    ChatFailed,

    Reset,
}

impl AppState {
    /// True when a chat send with `input` would be accepted right now.
    pub fn can_send_chat(&self, input: &str) -> bool {
        self.document.is_some() && !self.is_streaming && !input.trim().is_empty()
    }

    /// True when a summary/refine/translate action may start.
    pub fn can_start_generation(&self) -> bool {
        self.document.is_some() && !self.is_loading
    }

    /// Apply one event. Guarded events that do not hold are silent no-ops.
    pub fn apply(&mut self, event: Event) {
        match event {
            Event::DragOverChanged(v) => self.drag_over = v,

            Event::UploadAccepted { file_name } => {
                if self.is_parsing {
                    return;
                }
                // A new upload replaces the previous document and all of
                // its derived entities.
                *self = AppState {
                    view: View::Summary,
                    pending_upload: Some(file_name),
                    is_parsing: true,
                    ..AppState::default()
                };
            }
            Event::ExtractionCompleted { text } => {
                if !self.is_parsing {
                    return;
                }
                let file_name = self.pending_upload.take().unwrap_or_default();
                self.document = Some(Document { text, file_name });
                self.is_parsing = false;
            }
            Event::ExtractionAborted => *self = AppState::default(),

            Event::ViewSelected(view) => {
                // Tabs are only reachable with a document; the way back to
                // the upload screen is a reset.
                if view != View::Upload && self.document.is_some() {
                    self.view = view;
                }
            }

            Event::SummaryQuestionEdited(q) => self.summary_question = q,
            Event::RefineRequestEdited(r) => self.refine_request = r,
            Event::ChatInputEdited(i) => self.chat_input = i,

            Event::SummaryRequested => {
                if !self.can_start_generation() {
                    return;
                }
                self.is_loading = true;
                self.summary_raw.clear();
                self.summary_formatted.clear();
            }
            Event::SummaryCompleted { text } => {
                self.summary_formatted = crate::format::line_breaks_to_html(&text);
                self.summary_raw = text;
                self.is_loading = false;
            }
            Event::SummaryFailed => {
                self.summary_raw = SUMMARY_ERROR_MESSAGE.to_string();
                self.summary_formatted = SUMMARY_ERROR_MESSAGE.to_string();
                self.is_loading = false;
            }

            Event::RefineRequested => {
                if !self.can_start_generation()
                    || self.summary_raw.is_empty()
                    || self.refine_request.trim().is_empty()
                {
                    return;
                }
                self.is_loading = true;
            }
            Event::RefineCompleted { text } => {
                self.summary_formatted = crate::format::line_breaks_to_html(&text);
                self.summary_raw = text;
                self.refine_request.clear();
                self.is_loading = false;
            }
            Event::RefineFailed => {
                // The previous summary is kept; only the flag drops.
                self.is_loading = false;
            }

            Event::TranslationRequested => {
                if !self.can_start_generation() {
                    return;
                }
                self.is_loading = true;
                self.translation_status = TranslationStatus::Translating;
                self.translation_result.clear();
            }
            Event::TranslationCompleted { text } => {
                self.translation_result = text;
                self.translation_status = TranslationStatus::Done;
                self.is_loading = false;
            }
            Event::TranslationFailed => {
                // Status stays `Translating`: it is monotonic per run and
                // only a reset returns it to `Idle`.
                self.translation_result = TRANSLATION_ERROR_MESSAGE.to_string();
                self.is_loading = false;
            }

            Event::ChatTurnStarted { message } => {
                if !self.can_send_chat(&message) {
                    return;
                }
                self.conversation.push(Turn::user(message.trim()));
                self.chat_input.clear();
                self.is_streaming = true;
                self.conversation.push(Turn::model(""));
            }
            Event::ChatFragmentApplied { accumulated } => {
                if !self.is_streaming {
                    return;
                }
                if let Some(last) = self.conversation.last_mut() {
                    if last.role == Role::Model {
                        last.text = accumulated;
                    }
                }
            }
            Event::ChatCompleted => self.is_streaming = false,
            Event::ChatFailed => {
                if let Some(last) = self.conversation.last_mut() {
                    if last.role == Role::Model {
                        last.text = CHAT_ERROR_MESSAGE.to_string();
                    }
                }
                self.is_streaming = false;
            }

            Event::Reset => *self = AppState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_document() -> AppState {
        let mut s = AppState::default();
        s.apply(Event::UploadAccepted {
            file_name: "novel.pdf".into(),
        });
        s.apply(Event::ExtractionCompleted {
            text: "chapter one".into(),
        });
        s
    }

    #[test]
    fn upload_switches_to_summary_before_extraction_finishes() {
        let mut s = AppState::default();
        s.apply(Event::UploadAccepted {
            file_name: "novel.pdf".into(),
        });
        assert_eq!(s.view, View::Summary);
        assert!(s.is_parsing);
        assert!(s.document.is_none());
        assert_eq!(s.pending_upload.as_deref(), Some("novel.pdf"));
    }

    #[test]
    fn extraction_completion_creates_the_document() {
        let s = with_document();
        assert!(!s.is_parsing);
        let doc = s.document.expect("document");
        assert_eq!(doc.text, "chapter one");
        assert_eq!(doc.file_name, "novel.pdf");
        assert!(s.pending_upload.is_none());
    }

    #[test]
    fn extraction_abort_returns_to_upload() {
        let mut s = AppState::default();
        s.apply(Event::UploadAccepted {
            file_name: "bad.pdf".into(),
        });
        s.apply(Event::ExtractionAborted);
        assert_eq!(s, AppState::default());
    }

    #[test]
    fn view_selection_requires_a_document() {
        let mut s = AppState::default();
        s.apply(Event::ViewSelected(View::Chat));
        assert_eq!(s.view, View::Upload);

        let mut s = with_document();
        s.apply(Event::ViewSelected(View::Chat));
        assert_eq!(s.view, View::Chat);
        s.apply(Event::ViewSelected(View::Translate));
        assert_eq!(s.view, View::Translate);
    }

    #[test]
    fn upload_replaces_previous_document_wholesale() {
        let mut s = with_document();
        s.apply(Event::ChatTurnStarted {
            message: "hola".into(),
        });
        s.apply(Event::ChatCompleted);
        s.apply(Event::UploadAccepted {
            file_name: "other.pdf".into(),
        });
        assert!(s.document.is_none());
        assert!(s.conversation.is_empty());
        assert_eq!(s.pending_upload.as_deref(), Some("other.pdf"));
    }

    #[test]
    fn summary_request_is_rejected_while_loading() {
        let mut s = with_document();
        s.apply(Event::SummaryRequested);
        assert!(s.is_loading);
        let before = s.clone();
        s.apply(Event::SummaryRequested);
        assert_eq!(s, before);
    }

    #[test]
    fn summary_completion_formats_line_breaks() {
        let mut s = with_document();
        s.apply(Event::SummaryRequested);
        s.apply(Event::SummaryCompleted {
            text: "first\nsecond".into(),
        });
        assert_eq!(s.summary_raw, "first\nsecond");
        assert_eq!(s.summary_formatted, "first<br>second");
        assert!(!s.is_loading);
    }

    #[test]
    fn refine_requires_a_summary_and_a_request() {
        let mut s = with_document();
        s.apply(Event::RefineRequested);
        assert!(!s.is_loading, "no summary yet");

        s.apply(Event::SummaryRequested);
        s.apply(Event::SummaryCompleted { text: "sum".into() });
        s.apply(Event::RefineRequested);
        assert!(!s.is_loading, "no refine request yet");

        s.apply(Event::RefineRequestEdited("more detail".into()));
        s.apply(Event::RefineRequested);
        assert!(s.is_loading);
        s.apply(Event::RefineCompleted {
            text: "better sum".into(),
        });
        assert_eq!(s.summary_raw, "better sum");
        assert!(s.refine_request.is_empty());
    }

    #[test]
    fn refine_failure_keeps_the_previous_summary() {
        let mut s = with_document();
        s.apply(Event::SummaryRequested);
        s.apply(Event::SummaryCompleted { text: "sum".into() });
        s.apply(Event::RefineRequestEdited("expand".into()));
        s.apply(Event::RefineRequested);
        s.apply(Event::RefineFailed);
        assert_eq!(s.summary_raw, "sum");
        assert!(!s.is_loading);
    }

    #[test]
    fn translation_status_is_monotonic() {
        let mut s = with_document();
        assert_eq!(s.translation_status, TranslationStatus::Idle);
        s.apply(Event::TranslationRequested);
        assert_eq!(s.translation_status, TranslationStatus::Translating);
        s.apply(Event::TranslationCompleted {
            text: "hola mundo".into(),
        });
        assert_eq!(s.translation_status, TranslationStatus::Done);
    }

    #[test]
    fn translation_failure_keeps_translating_status() {
        let mut s = with_document();
        s.apply(Event::TranslationRequested);
        s.apply(Event::TranslationFailed);
        assert_eq!(s.translation_status, TranslationStatus::Translating);
        assert_eq!(s.translation_result, TRANSLATION_ERROR_MESSAGE);
        assert!(!s.is_loading);
    }

    #[test]
    fn chat_send_appends_user_turn_and_placeholder() {
        let mut s = with_document();
        s.apply(Event::ChatInputEdited("  who dies?  ".into()));
        s.apply(Event::ChatTurnStarted {
            message: s.chat_input.clone(),
        });
        assert!(s.is_streaming);
        assert!(s.chat_input.is_empty());
        assert_eq!(s.conversation.len(), 2);
        assert_eq!(s.conversation[0], Turn::user("who dies?"));
        assert_eq!(s.conversation[1], Turn::model(""));
    }

    #[test]
    fn empty_chat_send_is_a_no_op() {
        let mut s = with_document();
        s.apply(Event::ChatTurnStarted {
            message: "   ".into(),
        });
        assert!(s.conversation.is_empty());
        assert!(!s.is_streaming);
    }

    #[test]
    fn chat_send_while_streaming_is_a_no_op() {
        let mut s = with_document();
        s.apply(Event::ChatTurnStarted {
            message: "first".into(),
        });
        assert_eq!(s.conversation.len(), 2);
        s.apply(Event::ChatTurnStarted {
            message: "second".into(),
        });
        assert_eq!(s.conversation.len(), 2);
    }

    #[test]
    fn chat_fragments_replace_the_trailing_turn() {
        let mut s = with_document();
        s.apply(Event::ChatTurnStarted {
            message: "hola".into(),
        });
        s.apply(Event::ChatFragmentApplied {
            accumulated: "Hola".into(),
        });
        assert_eq!(s.conversation[1].text, "Hola");
        s.apply(Event::ChatFragmentApplied {
            accumulated: "Hola, mundo".into(),
        });
        assert_eq!(s.conversation[1].text, "Hola, mundo");
        s.apply(Event::ChatCompleted);
        assert!(!s.is_streaming);
        assert_eq!(s.conversation[1].text, "Hola, mundo");
    }

    #[test]
    fn chat_failure_discards_partial_text() {
        let mut s = with_document();
        s.apply(Event::ChatTurnStarted {
            message: "hola".into(),
        });
        s.apply(Event::ChatFragmentApplied {
            accumulated: "Hol".into(),
        });
        s.apply(Event::ChatFailed);
        assert_eq!(s.conversation[1].text, CHAT_ERROR_MESSAGE);
        assert!(!s.is_streaming);
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = with_document();
        s.apply(Event::SummaryQuestionEdited("why?".into()));
        s.apply(Event::SummaryRequested);
        s.apply(Event::SummaryCompleted { text: "sum".into() });
        s.apply(Event::TranslationRequested);
        s.apply(Event::TranslationCompleted { text: "tr".into() });
        s.apply(Event::ChatTurnStarted {
            message: "hola".into(),
        });
        s.apply(Event::ChatCompleted);

        s.apply(Event::Reset);
        assert_eq!(s.view, View::Upload);
        assert!(s.document.is_none());
        assert!(s.conversation.is_empty());
        assert!(s.summary_raw.is_empty());
        assert!(s.translation_result.is_empty());
        assert_eq!(s.translation_status, TranslationStatus::Idle);
        assert_eq!(s, AppState::default());
    }
}
