//! Observer callback for state changes.
//!
//! Inject an [`std::sync::Arc`]`<dyn SessionObserver>` via
//! [`crate::config::SessionConfigBuilder::observer`] to be notified after
//! every applied event, including once per streamed chat fragment, which
//! is what makes incremental rendering possible: each fragment is visible
//! in the store before the next one is requested.
//!
//! A callback is the least-invasive integration point: callers can forward
//! snapshots to a terminal renderer, a channel, or a test recorder without
//! the library knowing how the host application communicates.

use crate::state::AppState;

/// Called by the session after every state mutation.
///
/// Implementations must be `Send + Sync`; the state snapshot borrow ends
/// when the call returns, so implementations that need to keep data must
/// clone what they care about.
pub trait SessionObserver: Send + Sync {
    /// The store changed; `state` is the complete new value.
    fn state_changed(&self, state: &AppState) {
        let _ = state;
    }
}

/// A no-op implementation for callers that don't need notifications.
///
/// This is the default when no observer is configured.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Recorder {
        views: Arc<Mutex<Vec<crate::state::View>>>,
    }

    impl SessionObserver for Recorder {
        fn state_changed(&self, state: &AppState) {
            self.views.lock().unwrap().push(state.view);
        }
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let obs = NoopObserver;
        obs.state_changed(&AppState::default());
    }

    #[test]
    fn arc_dyn_observer_receives_snapshots() {
        let views = Arc::new(Mutex::new(Vec::new()));
        let obs: Arc<dyn SessionObserver> = Arc::new(Recorder {
            views: Arc::clone(&views),
        });

        let mut state = AppState::default();
        obs.state_changed(&state);
        state.apply(crate::state::Event::UploadAccepted {
            file_name: "a.pdf".into(),
        });
        obs.state_changed(&state);

        let seen = views.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![crate::state::View::Upload, crate::state::View::Summary]
        );
    }
}
