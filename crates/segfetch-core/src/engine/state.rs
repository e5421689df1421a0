//! Download engine lifecycle.

use std::fmt;

/// Phase of one `download` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Probing,
    WholeFetch,
    ChunkedFetch,
    Reassembling,
    Storing,
    Done,
    Errored,
}

impl EngineState {
    /// Whether `self → next` is a legal step.
    pub fn can_transition_to(self, next: EngineState) -> bool {
        use EngineState::*;
        match (self, next) {
            (Done, _) | (Errored, _) => false,
            (_, Errored) => true,
            (Idle, Probing) | (Idle, WholeFetch) => true,
            (Probing, WholeFetch) | (Probing, ChunkedFetch) => true,
            (WholeFetch, Reassembling) | (ChunkedFetch, Reassembling) => true,
            (Reassembling, Storing) => true,
            (Storing, Done) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, EngineState::Done | EngineState::Errored)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tracks the state of one invocation and traces every transition.
#[derive(Debug)]
pub(crate) struct StateTracker {
    state: EngineState,
}

impl StateTracker {
    pub(crate) fn new() -> Self {
        Self {
            state: EngineState::Idle,
        }
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> EngineState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: EngineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "engine state");
        self.state = next;
    }
}
