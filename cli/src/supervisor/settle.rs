//! Single-settlement guard for one supervised invocation.
//!
//! An invocation walks `Created → Validated → Launched → Running` and ends in
//! exactly one of `Resolved` or `Rejected`. The first outcome recorded wins;
//! any later attempt (a stderr rejection racing an exit, an exit arriving after
//! a timeout) is ignored and logged.

use crate::core::error::{Invocation, SupervisorError};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Created,
    Validated,
    Launched,
    Running,
    Resolved,
    Rejected,
}

impl InvocationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, InvocationState::Resolved | InvocationState::Rejected)
    }

    /// Legal transitions. Rejection is reachable from every live state;
    /// resolution only from `Running`.
    pub fn can_advance_to(self, next: InvocationState) -> bool {
        use InvocationState::*;
        match (self, next) {
            (Created, Validated) | (Validated, Launched) | (Launched, Running) => true,
            (Running, Resolved) => true,
            (from, Rejected) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Holds the state machine and the one outcome of an invocation.
#[derive(Debug)]
pub struct Settlement<T> {
    state: InvocationState,
    outcome: Option<Result<T, SupervisorError>>,
}

impl<T> Default for Settlement<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Settlement<T> {
    pub fn new() -> Self {
        Self {
            state: InvocationState::Created,
            outcome: None,
        }
    }

    /// Start from an invocation whose input already passed validation.
    pub fn validated() -> Self {
        Self {
            state: InvocationState::Validated,
            outcome: None,
        }
    }

    pub fn state(&self) -> InvocationState {
        self.state
    }

    pub fn is_settled(&self) -> bool {
        self.outcome.is_some()
    }

    /// Move to a non-terminal state. Returns false (and changes nothing) for
    /// an illegal transition.
    pub fn advance(&mut self, next: InvocationState) -> bool {
        if next.is_terminal() || !self.state.can_advance_to(next) {
            trace!("Ignoring transition {:?} -> {:?}", self.state, next);
            return false;
        }
        self.state = next;
        true
    }

    pub fn resolve(&mut self, value: T) -> bool {
        self.settle(InvocationState::Resolved, Ok(value))
    }

    pub fn reject(&mut self, error: SupervisorError) -> bool {
        self.settle(InvocationState::Rejected, Err(error))
    }

    fn settle(&mut self, terminal: InvocationState, outcome: Result<T, SupervisorError>) -> bool {
        if self.outcome.is_some() || !self.state.can_advance_to(terminal) {
            match &outcome {
                Err(e) => debug!("Dropping rejection in state {:?}: {}", self.state, e),
                Ok(_) => debug!("Dropping resolution in state {:?}", self.state),
            }
            return false;
        }
        self.state = terminal;
        self.outcome = Some(outcome);
        true
    }

    /// Take the settled outcome. An unsettled invocation is reported as a
    /// process error rather than left pending.
    pub fn finish(self, invocation: &Invocation) -> Result<T, SupervisorError> {
        self.outcome.unwrap_or_else(|| {
            Err(SupervisorError::Process {
                invocation: invocation.clone(),
                detail: "supervision ended without an outcome".to_string(),
            })
        })
    }
}
