//! View routing: a pure function from state to a screen description.
//!
//! [`render`] selects one of four screens from [`AppState::view`] and
//! projects only the entities that screen needs. It never mutates, never
//! performs I/O, and the result is serialisable — hosts can print it, diff
//! it, or ship it to a front end, and tests can assert on it without any
//! UI runtime.

use crate::state::{AppState, TranslationStatus, Turn, View};
use serde::Serialize;

/// A complete description of what the active screen shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Upload(UploadScreen),
    Summary(SummaryScreen),
    Chat(ChatScreen),
    Translate(TranslateScreen),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadScreen {
    pub drag_over: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryScreen {
    pub file_name: String,
    /// True while extraction is still running — the upload transition
    /// lands here before the document exists.
    pub extracting: bool,
    pub question: String,
    /// Summary with `<br>` line breaks, ready for markup hosts.
    pub summary_html: String,
    pub refine_request: String,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatScreen {
    pub file_name: String,
    pub turns: Vec<Turn>,
    pub input: String,
    pub streaming: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslateScreen {
    pub file_name: String,
    pub status: TranslationStatus,
    pub result: String,
}

/// The tabs a user may select right now. Empty until a document exists.
pub fn available_views(state: &AppState) -> Vec<View> {
    if state.document.is_some() {
        vec![View::Summary, View::Chat, View::Translate]
    } else {
        Vec::new()
    }
}

/// Project the state onto the active screen.
pub fn render(state: &AppState) -> Screen {
    let file_name = state
        .document
        .as_ref()
        .map(|d| d.file_name.clone())
        .or_else(|| state.pending_upload.clone())
        .unwrap_or_default();

    match state.view {
        View::Upload => Screen::Upload(UploadScreen {
            drag_over: state.drag_over,
        }),
        View::Summary => Screen::Summary(SummaryScreen {
            file_name,
            extracting: state.is_parsing,
            question: state.summary_question.clone(),
            summary_html: state.summary_formatted.clone(),
            refine_request: state.refine_request.clone(),
            loading: state.is_loading,
        }),
        View::Chat => Screen::Chat(ChatScreen {
            file_name,
            turns: state.conversation.clone(),
            input: state.chat_input.clone(),
            streaming: state.is_streaming,
        }),
        View::Translate => Screen::Translate(TranslateScreen {
            file_name,
            status: state.translation_status,
            result: state.translation_result.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Event;

    fn with_document() -> AppState {
        let mut s = AppState::default();
        s.apply(Event::UploadAccepted {
            file_name: "novel.pdf".into(),
        });
        s.apply(Event::ExtractionCompleted {
            text: "texto".into(),
        });
        s
    }

    #[test]
    fn fresh_state_renders_the_upload_screen() {
        let screen = render(&AppState::default());
        assert_eq!(screen, Screen::Upload(UploadScreen { drag_over: false }));
        assert!(available_views(&AppState::default()).is_empty());
    }

    #[test]
    fn summary_screen_shows_extraction_in_progress() {
        let mut s = AppState::default();
        s.apply(Event::UploadAccepted {
            file_name: "novel.pdf".into(),
        });
        match render(&s) {
            Screen::Summary(summary) => {
                assert!(summary.extracting);
                assert_eq!(summary.file_name, "novel.pdf");
            }
            other => panic!("expected summary screen, got {other:?}"),
        }
    }

    #[test]
    fn summary_screen_carries_the_formatted_summary() {
        let mut s = with_document();
        s.apply(Event::SummaryRequested);
        s.apply(Event::SummaryCompleted {
            text: "uno\ndos".into(),
        });
        match render(&s) {
            Screen::Summary(summary) => assert_eq!(summary.summary_html, "uno<br>dos"),
            other => panic!("expected summary screen, got {other:?}"),
        }
    }

    #[test]
    fn chat_screen_lists_turns_and_streaming_flag() {
        let mut s = with_document();
        s.apply(Event::ViewSelected(View::Chat));
        s.apply(Event::ChatTurnStarted {
            message: "hola".into(),
        });
        match render(&s) {
            Screen::Chat(chat) => {
                assert_eq!(chat.turns.len(), 2);
                assert!(chat.streaming);
            }
            other => panic!("expected chat screen, got {other:?}"),
        }
    }

    #[test]
    fn tabs_appear_once_a_document_exists() {
        let s = with_document();
        assert_eq!(
            available_views(&s),
            vec![View::Summary, View::Chat, View::Translate]
        );
    }

    #[test]
    fn screens_serialise() {
        let s = with_document();
        let json = serde_json::to_string(&render(&s)).unwrap();
        assert!(json.contains("\"screen\":\"summary\""));
    }
}
