//! Chat aggregation: drive one fragment stream into the store.
//!
//! ## Why full-replace per fragment?
//!
//! Each fragment extends a local accumulator, and the trailing model turn
//! is overwritten with the accumulator's complete value, not patched with
//! a delta. The write is idempotent, and any observer that samples the
//! conversation between fragments always sees a syntactically complete
//! prefix of the final answer, never a torn write across two fields.
//!
//! Fragments are applied strictly in arrival order; the only buffering is
//! the single in-flight accumulator. On any failure the partial content is
//! discarded and the turn is overwritten with the fixed error message.

use crate::adapter::gemini::FragmentStream;
use crate::observer::SessionObserver;
use crate::state::{AppState, Event};
use futures::StreamExt;
use tracing::{debug, error};

/// Consume `stream` to completion, updating `state` once per fragment.
///
/// Expects the store to already hold the user turn and the empty model
/// placeholder (the send protocol appends both before the stream is
/// requested). Clears the streaming flag on every exit path.
pub(crate) async fn drive_stream(
    state: &mut AppState,
    observer: &dyn SessionObserver,
    mut stream: FragmentStream,
) {
    let mut accumulated = String::new();

    while let Some(item) = stream.next().await {
        match item {
            Ok(fragment) => {
                accumulated.push_str(&fragment);
                state.apply(Event::ChatFragmentApplied {
                    accumulated: accumulated.clone(),
                });
                observer.state_changed(state);
            }
            Err(e) => {
                error!(error = %e, "chat stream failed; discarding partial response");
                state.apply(Event::ChatFailed);
                observer.state_changed(state);
                return;
            }
        }
    }

    debug!(chars = accumulated.len(), "chat stream complete");
    state.apply(Event::ChatCompleted);
    observer.state_changed(state);
}
