//! Prompt construction for every Gemini-backed operation.
//!
//! Centralising the prompts here serves two purposes:
//!
//! 1. **Single source of truth** — the register of the summaries, the chat
//!    grounding rule, and the translation instructions each live in exactly
//!    one place.
//!
//! 2. **Testability** — unit tests can build and inspect prompts directly
//!    without a remote model, which is how the truncation budgets are
//!    verified.
//!
//! Each builder embeds at most a fixed number of characters of document
//! text. The cut is a deliberate cost/latency bound, not a correctness
//! guarantee: anything past the budget simply never reaches the model. The
//! cut is silent toward the user but logged at WARN level.

use tracing::warn;

/// Cut `text` to at most `max_chars` characters.
///
/// Counts characters (not bytes), so the cut never lands inside a UTF-8
/// sequence. Logs a warning when anything is dropped.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            warn!(
                budget = max_chars,
                dropped = text.chars().count() - max_chars,
                "document exceeds prompt budget; embedding a prefix only"
            );
            &text[..byte_idx]
        }
        None => text,
    }
}

/// Build the one-shot summary prompt.
///
/// When `question` is empty the model is told explicitly that no question
/// was asked, so it produces a general summary rather than inventing one.
pub fn summary_prompt(document: &str, question: &str, budget: usize) -> String {
    let question = if question.trim().is_empty() {
        "No specific question was provided."
    } else {
        question.trim()
    };
    format!(
        "You are an expert literary critic. Write a summary of the following text \
         in an eloquent, literary register. If the reader has asked a question, \
         focus the summary on answering it.\n\n\
         Reader's question: \"{question}\"\n\n\
         Text to summarise:\n\
         ---\n\
         {document}\n\
         ---\n\n\
         Summary:",
        question = question,
        document = truncate_chars(document, budget),
    )
}

/// Build the refinement prompt.
///
/// The previous summary is embedded whole; only the original document is
/// cut (to a smaller budget than the one-shot summary, since the summary
/// itself now carries most of the signal). The reply is a complete
/// replacement summary, not a diff.
pub fn refine_prompt(
    document: &str,
    previous_summary: &str,
    request: &str,
    budget: usize,
) -> String {
    format!(
        "You are an expert literary critic. Your task is to refine an existing \
         summary of a novel according to the reader's request.\n\n\
         Reader's refinement request: \"{request}\"\n\n\
         Previous summary:\n\
         ---\n\
         {previous}\n\
         ---\n\n\
         Excerpt of the original text (for reference):\n\
         ---\n\
         {document}\n\
         ---\n\n\
         Produce a new, improved summary that incorporates the request while \
         keeping the eloquent, literary register. Do not add any preamble; \
         output only the refined summary.\n\n\
         Refined summary:",
        request = request.trim(),
        previous = previous_summary,
        document = truncate_chars(document, budget),
    )
}

/// Build the full-document translation prompt.
pub fn translate_prompt(document: &str, target_language: &str, budget: usize) -> String {
    format!(
        "Translate the following text into {language} fluently, accurately, and \
         with cultural resonance. Keep the author's voice and tone. Preserve \
         paragraph breaks and the basic structure.\n\n\
         Original text:\n\
         ---\n\
         {document}\n\
         ---\n\n\
         Translation:",
        language = target_language,
        document = truncate_chars(document, budget),
    )
}

/// Build the system instruction that grounds the chat in the document.
///
/// Sent separately from the turn history (as a system-level instruction),
/// so the document is not repeated on every turn.
pub fn chat_system_instruction(document: &str, budget: usize) -> String {
    format!(
        "You are a chatbot that is an expert on the novel provided below. Your \
         only context is the text of this novel. Answer the reader's questions \
         using this text exclusively. If the answer cannot be found in the \
         text, say politely that you do not have that information.\n\
         ---\n\
         NOVEL CONTEXT:\n\
         {document}\n\
         ---",
        document = truncate_chars(document, budget),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_is_exact_at_the_boundary() {
        let text = "abcdefghij";
        assert_eq!(truncate_chars(text, 4), "abcd");
        assert_eq!(truncate_chars(text, 10), text);
        assert_eq!(truncate_chars(text, 11), text);
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        let text = "ñandú";
        assert_eq!(truncate_chars(text, 3), "ñan");
    }

    #[test]
    fn summary_prompt_embeds_question() {
        let p = summary_prompt("some text", "who is the narrator?", 1000);
        assert!(p.contains("who is the narrator?"));
        assert!(p.contains("some text"));
    }

    #[test]
    fn summary_prompt_without_question_uses_fallback() {
        let p = summary_prompt("some text", "   ", 1000);
        assert!(p.contains("No specific question was provided."));
    }

    #[test]
    fn summary_prompt_respects_budget() {
        let doc = "a".repeat(50);
        let p = summary_prompt(&doc, "", 10);
        assert!(p.contains(&"a".repeat(10)));
        assert!(!p.contains(&"a".repeat(11)));
    }

    #[test]
    fn refine_prompt_embeds_previous_summary_whole() {
        let prev = "x".repeat(200);
        let p = refine_prompt("doc", &prev, "shorter please", 50);
        assert!(p.contains(&prev));
        assert!(p.contains("shorter please"));
    }

    #[test]
    fn translate_prompt_names_the_language() {
        let p = translate_prompt("hello", "Spanish", 100);
        assert!(p.contains("into Spanish"));
    }

    #[test]
    fn chat_instruction_grounds_in_document() {
        let p = chat_system_instruction("the plot of the novel", 1000);
        assert!(p.contains("NOVEL CONTEXT"));
        assert!(p.contains("the plot of the novel"));
    }
}
