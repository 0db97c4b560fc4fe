use std::iter::FusedIterator;

use crate::engine::{DpllEngine, Engine};
use crate::error::SessionError;
use crate::session::{Assignment, Session, SolveOutcome, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumeratorState {
    Ready,
    Producing,
    Exhausted,
}

/// Why an enumeration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No assignment outside the blocked ones exists.
    Unsatisfiable,
    /// The engine hit a propagation or decision limit; more may exist.
    ResourceLimitReached,
    /// A session error was yielded.
    Failed,
}

/// Lazily walks the satisfying assignments of a session.
///
/// After each model a blocking clause forbidding it is added to the
/// session, so the sequence cannot be restarted: enumerating again needs a
/// fresh session loaded with the original clauses.
pub struct Enumerator<E: Engine = DpllEngine> {
    session: Session<E>,
    nvars: u32,
    // blocking clause under construction
    scratch: Vec<i64>,
    state: EnumeratorState,
    stop: Option<StopReason>,
    produced: usize,
}

impl<E: Engine> Enumerator<E> {
    /// Takes over a configured session.
    pub fn new(session: Session<E>) -> Result<Self, SessionError> {
        let nvars = session.nvars()?;
        Ok(Self {
            session,
            nvars,
            scratch: Vec::with_capacity(nvars as usize + 1),
            state: EnumeratorState::Ready,
            stop: None,
            produced: 0,
        })
    }

    pub fn state(&self) -> EnumeratorState {
        self.state
    }

    /// `None` until the sequence has ended.
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }

    pub fn produced(&self) -> usize {
        self.produced
    }

    pub fn into_session(self) -> Session<E> {
        self.session
    }

    fn finish(&mut self, reason: StopReason) {
        log::debug!(
            "enumeration finished after {} assignments: {:?}",
            self.produced,
            reason
        );
        self.state = EnumeratorState::Exhausted;
        self.stop = Some(reason);
    }

    fn step(&mut self) -> Result<Option<Assignment>, SessionError> {
        match self.session.solve(std::iter::empty())? {
            SolveOutcome::Satisfiable(assignment) => {
                self.block(&assignment)?;
                self.state = EnumeratorState::Producing;
                self.produced += 1;
                Ok(Some(assignment))
            }
            SolveOutcome::Unsatisfiable => {
                self.finish(StopReason::Unsatisfiable);
                Ok(None)
            }
            SolveOutcome::ResourceLimitReached => {
                self.finish(StopReason::ResourceLimitReached);
                Ok(None)
            }
        }
    }

    /// Adds the clause that rules `assignment` out.
    fn block(&mut self, assignment: &Assignment) -> Result<(), SessionError> {
        self.scratch.clear();
        for (var, value) in (1..=i64::from(self.nvars)).zip(assignment.values()) {
            match value {
                Value::True => self.scratch.push(-var),
                Value::False => self.scratch.push(var),
                Value::Unknown => {}
            }
        }
        self.session.add_clause(&self.scratch)
    }
}

impl<E: Engine> Iterator for Enumerator<E> {
    type Item = Result<Assignment, SessionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == EnumeratorState::Exhausted {
            return None;
        }
        match self.step() {
            Ok(Some(assignment)) => Some(Ok(assignment)),
            Ok(None) => None,
            Err(err) => {
                self.finish(StopReason::Failed);
                Some(Err(err))
            }
        }
    }
}

impl<E: Engine> FusedIterator for Enumerator<E> {}

impl<E: Engine> std::fmt::Debug for Enumerator<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enumerator")
            .field("state", &self.state)
            .field("stop", &self.stop)
            .field("produced", &self.produced)
            .finish()
    }
}
