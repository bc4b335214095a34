//! Progress reporting for the generation state machine.
//!
//! A request walks
//!
//! ```text
//! Idle → Fetching → Extracting → Bounding → Prompting → AwaitingModel
//!      → Parsing → Normalizing → Done
//! ```
//!
//! and any active stage may jump straight to `Failed(stage)`. `Done` and
//! `Failed` are terminal.
//!
//! Inject an [`Arc<dyn QuizProgressCallback>`] via
//! [`crate::config::QuizConfigBuilder::progress_callback`] to observe the
//! transitions, e.g. to drive a spinner or forward events over a websocket.
//!
//! # Example
//!
//! ```rust
//! use pdf2quiz::{PipelineState, QuizConfig, QuizProgressCallback};
//! use std::sync::Arc;
//!
//! struct PrintState;
//!
//! impl QuizProgressCallback for PrintState {
//!     fn on_state(&self, state: PipelineState) {
//!         eprintln!("→ {state}");
//!     }
//! }
//!
//! let config = QuizConfig::builder()
//!     .progress_callback(Arc::new(PrintState))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::Stage;
use std::fmt;
use std::sync::Arc;

/// Where a single request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Active(Stage),
    Done,
    Failed(Stage),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed(_))
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => f.write_str("idle"),
            PipelineState::Active(stage) => write!(f, "{stage}"),
            PipelineState::Done => f.write_str("done"),
            PipelineState::Failed(stage) => write!(f, "failed while {stage}"),
        }
    }
}

/// Called by the pipeline as a request moves through its stages.
///
/// Implementations must be `Send + Sync`: concurrent requests share one
/// configuration and therefore one callback. All methods default to no-ops.
pub trait QuizProgressCallback: Send + Sync {
    /// Called on every state transition, including the terminal one.
    fn on_state(&self, state: PipelineState) {
        let _ = state;
    }

    /// Called once the model has answered, with the provider's token counts.
    fn on_model_usage(&self, prompt_tokens: usize, completion_tokens: usize) {
        let _ = (prompt_tokens, completion_tokens);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl QuizProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::QuizConfig`].
pub type ProgressCallback = Arc<dyn QuizProgressCallback>;

/// Per-request state holder that forwards transitions to the callback.
pub(crate) struct StateTracker {
    state: PipelineState,
    callback: Option<ProgressCallback>,
}

impl StateTracker {
    pub(crate) fn new(callback: Option<ProgressCallback>) -> Self {
        Self {
            state: PipelineState::Idle,
            callback,
        }
    }

    pub(crate) fn state(&self) -> PipelineState {
        self.state
    }

    /// The stage currently running, if any.
    pub(crate) fn current_stage(&self) -> Option<Stage> {
        match self.state {
            PipelineState::Active(stage) => Some(stage),
            _ => None,
        }
    }

    pub(crate) fn enter(&mut self, stage: Stage) {
        self.transition(PipelineState::Active(stage));
    }

    pub(crate) fn done(&mut self) {
        self.transition(PipelineState::Done);
    }

    pub(crate) fn fail(&mut self, stage: Stage) {
        self.transition(PipelineState::Failed(stage));
    }

    pub(crate) fn model_usage(&self, prompt_tokens: usize, completion_tokens: usize) {
        if let Some(ref cb) = self.callback {
            cb.on_model_usage(prompt_tokens, completion_tokens);
        }
    }

    fn transition(&mut self, next: PipelineState) {
        if self.state.is_terminal() {
            return;
        }
        self.state = next;
        if let Some(ref cb) = self.callback {
            cb.on_state(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        states: Mutex<Vec<PipelineState>>,
    }

    impl QuizProgressCallback for Recording {
        fn on_state(&self, state: PipelineState) {
            self.states.lock().unwrap().push(state);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_state(PipelineState::Active(Stage::Fetching));
        cb.on_model_usage(120, 40);
    }

    #[test]
    fn tracker_forwards_transitions_in_order() {
        let rec = Arc::new(Recording::default());
        let mut tracker = StateTracker::new(Some(rec.clone() as ProgressCallback));
        assert_eq!(tracker.state(), PipelineState::Idle);

        tracker.enter(Stage::Fetching);
        assert_eq!(tracker.current_stage(), Some(Stage::Fetching));
        tracker.enter(Stage::Extracting);
        tracker.fail(Stage::Extracting);

        let states = rec.states.lock().unwrap().clone();
        assert_eq!(
            states,
            vec![
                PipelineState::Active(Stage::Fetching),
                PipelineState::Active(Stage::Extracting),
                PipelineState::Failed(Stage::Extracting),
            ]
        );
    }

    #[test]
    fn terminal_states_are_sticky() {
        let rec = Arc::new(Recording::default());
        let mut tracker = StateTracker::new(Some(rec.clone() as ProgressCallback));
        tracker.enter(Stage::Normalizing);
        tracker.done();
        tracker.enter(Stage::Fetching);
        tracker.fail(Stage::Fetching);

        assert_eq!(tracker.state(), PipelineState::Done);
        assert_eq!(rec.states.lock().unwrap().len(), 2);
    }

    #[test]
    fn display_names_failed_stage() {
        assert_eq!(
            PipelineState::Failed(Stage::Parsing).to_string(),
            "failed while parsing"
        );
        assert_eq!(PipelineState::Active(Stage::AwaitingModel).to_string(), "awaiting model");
    }
}
