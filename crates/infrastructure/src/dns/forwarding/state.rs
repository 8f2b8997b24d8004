//! Attempt bookkeeping for one upstream forward.
//!
//! ```text
//! Idle ──start──▶ Attempting(0) ──timeout──▶ Attempting(1) ── … ──▶ Exhausted
//!                      │                          │
//!                      └──────reply───────────────┴──▶ Succeeded
//!                      └──────transport error─────────▶ Failed
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Idle,
    Attempting(usize),
    Succeeded { attempt: usize },
    Exhausted,
    Failed { attempt: usize },
}

/// Strictly sequential walk over `total` nameservers.
#[derive(Debug)]
pub struct AttemptStateMachine {
    state: AttemptState,
    total: usize,
}

impl AttemptStateMachine {
    pub fn new(total: usize) -> Self {
        Self {
            state: AttemptState::Idle,
            total,
        }
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            AttemptState::Succeeded { .. } | AttemptState::Exhausted | AttemptState::Failed { .. }
        )
    }

    /// Leave `Idle`. Returns the first attempt index, or `None` when there
    /// is nothing to try.
    pub fn start(&mut self) -> Option<usize> {
        if self.state != AttemptState::Idle {
            return None;
        }
        self.enter_attempt(0)
    }

    /// The current attempt's timer fired. Returns the next attempt index.
    pub fn timed_out(&mut self) -> Option<usize> {
        match self.state {
            AttemptState::Attempting(i) => self.enter_attempt(i + 1),
            _ => None,
        }
    }

    pub fn succeed(&mut self) {
        if let AttemptState::Attempting(attempt) = self.state {
            self.state = AttemptState::Succeeded { attempt };
        }
    }

    /// A send or receive failed; no further attempts are made.
    pub fn fail(&mut self) {
        if let AttemptState::Attempting(attempt) = self.state {
            self.state = AttemptState::Failed { attempt };
        }
    }

    /// Number of attempts started so far.
    pub fn attempts_made(&self) -> usize {
        match self.state {
            AttemptState::Idle => 0,
            AttemptState::Attempting(i)
            | AttemptState::Succeeded { attempt: i }
            | AttemptState::Failed { attempt: i } => i + 1,
            AttemptState::Exhausted => self.total,
        }
    }

    fn enter_attempt(&mut self, index: usize) -> Option<usize> {
        if index < self.total {
            self.state = AttemptState::Attempting(index);
            Some(index)
        } else {
            self.state = AttemptState::Exhausted;
            None
        }
    }
}
