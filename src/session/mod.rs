pub mod config;
pub mod solution;

use std::sync::{Mutex, MutexGuard, TryLockError};

use crate::cnf::validate::{validate_assumptions, validate_clause};
use crate::engine::{DpllEngine, Engine, EngineStats, SATISFIABLE, UNSATISFIABLE};
use crate::error::SessionError;

pub use config::{EngineSettings, SessionConfig};
pub use solution::{Assignment, SolveOutcome, Value, read_assignment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Configured,
    Solving,
    Idle,
    Destroyed,
}

/// Exclusive owner of one engine handle.
///
/// Every operation takes the session lock without waiting, so a second
/// call arriving while a solve is running fails with
/// [`SessionError::ConcurrentSolve`] instead of queueing behind it. The
/// lock is private to this session; solves on different sessions never
/// contend.
///
/// The engine is released exactly once: by [`Session::destroy`], by a
/// failed configuration or clause load, or on drop.
pub struct Session<E: Engine = DpllEngine> {
    inner: Mutex<Inner<E>>,
}

struct Inner<E: Engine> {
    state: SessionState,
    engine: Option<E>,
    settings: Option<EngineSettings>,
}

impl<E: Engine> Inner<E> {
    fn settings(&self) -> Result<EngineSettings, SessionError> {
        match self.state {
            SessionState::Destroyed => Err(SessionError::SessionClosed),
            SessionState::Created => Err(SessionError::InvalidConfiguration(
                "session is not configured".to_string(),
            )),
            _ => self.settings.ok_or(SessionError::SessionClosed),
        }
    }

    fn release(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            log::debug!(
                "releasing {} engine after {} solve calls",
                engine.backend_name(),
                engine.stats().solve_calls
            );
            engine.reset();
        }
        self.state = SessionState::Destroyed;
    }
}

impl<E: Engine> Session<E> {
    /// Creates the engine handle. The session still needs [`Session::configure`].
    pub fn new() -> Result<Self, SessionError> {
        let engine = E::init().map_err(|e| SessionError::EngineInitFailed(e.to_string()))?;
        log::debug!("created {} session", engine.backend_name());
        Ok(Self {
            inner: Mutex::new(Inner {
                state: SessionState::Created,
                engine: Some(engine),
                settings: None,
            }),
        })
    }

    /// [`Session::new`] followed by [`Session::configure`].
    pub fn with_config(config: &SessionConfig) -> Result<Self, SessionError> {
        let session = Self::new()?;
        session.configure(config)?;
        Ok(session)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner<E>>, SessionError> {
        match self.inner.try_lock() {
            Ok(guard) => Ok(guard),
            Err(TryLockError::WouldBlock) => Err(SessionError::ConcurrentSolve),
            Err(TryLockError::Poisoned(poisoned)) => {
                // an engine call panicked; its state cannot be trusted
                let mut guard = poisoned.into_inner();
                guard.release();
                Err(SessionError::SessionClosed)
            }
        }
    }

    /// Validates `config` and applies it to the engine. Allowed once.
    ///
    /// On failure the engine is released and the session is closed.
    pub fn configure(&self, config: &SessionConfig) -> Result<(), SessionError> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        match inner.state {
            SessionState::Created => {}
            SessionState::Destroyed => return Err(SessionError::SessionClosed),
            _ => {
                return Err(SessionError::InvalidConfiguration(
                    "session is already configured".to_string(),
                ));
            }
        }

        let settings = match EngineSettings::try_from(config) {
            Ok(s) => s,
            Err(err) => {
                inner.release();
                return Err(err);
            }
        };
        let Some(engine) = inner.engine.as_mut() else {
            return Err(SessionError::SessionClosed);
        };
        if let Err(err) = engine.adjust(settings.nvars) {
            inner.release();
            return Err(SessionError::EngineInitFailed(err.to_string()));
        }
        engine.set_verbosity(settings.verbosity);
        engine.set_default_phase(settings.phase);
        engine.set_propagation_limit(settings.propagation_limit);
        engine.set_seed(settings.seed);

        log::debug!(
            "configured session: nvars={} phase={} propagation_limit={:?} decision_limit={:?}",
            settings.nvars,
            settings.phase,
            settings.propagation_limit,
            settings.decision_limit
        );
        inner.settings = Some(settings);
        inner.state = SessionState::Configured;
        Ok(())
    }

    /// Validates and submits clauses in order. Returns how many were loaded.
    ///
    /// Each clause is checked in full before any of its literals reach the
    /// engine. A bad literal still leaves earlier clauses loaded, so the
    /// session is closed and the validation error returned.
    pub fn load_clauses<I, C>(&self, clauses: I) -> Result<usize, SessionError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[i64]>,
    {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let settings = inner.settings()?;
        let Some(engine) = inner.engine.as_mut() else {
            return Err(SessionError::SessionClosed);
        };

        let mut loaded = 0usize;
        let mut failure = None;
        for clause in clauses {
            match validate_clause(clause.as_ref(), settings.nvars) {
                Ok(lits) => {
                    for lit in lits {
                        engine.add(lit);
                    }
                    engine.add(0);
                    loaded += 1;
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        if let Some(err) = failure {
            log::warn!("clause {} rejected ({}), closing session", loaded, err);
            inner.release();
            return Err(err);
        }
        log::debug!("loaded {} clauses", loaded);
        Ok(loaded)
    }

    pub fn add_clause(&self, clause: &[i64]) -> Result<(), SessionError> {
        self.load_clauses(std::iter::once(clause)).map(|_| ())
    }

    /// Solves under `assumptions` with the configured decision limit.
    pub fn solve<I>(&self, assumptions: I) -> Result<SolveOutcome, SessionError>
    where
        I: IntoIterator<Item = i64>,
    {
        self.solve_inner(assumptions, None)
    }

    /// Solves with an explicit decision limit for this call; negative is unbounded.
    pub fn solve_with_limit<I>(
        &self,
        assumptions: I,
        decision_limit: i64,
    ) -> Result<SolveOutcome, SessionError>
    where
        I: IntoIterator<Item = i64>,
    {
        self.solve_inner(assumptions, Some(config::limit(decision_limit)))
    }

    fn solve_inner<I>(
        &self,
        assumptions: I,
        decision_limit: Option<Option<u64>>,
    ) -> Result<SolveOutcome, SessionError>
    where
        I: IntoIterator<Item = i64>,
    {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let settings = inner.settings()?;
        // nothing reaches the engine unless every assumption is valid
        let lits = validate_assumptions(assumptions, settings.nvars)?;
        let limit = decision_limit.unwrap_or(settings.decision_limit);
        let Some(engine) = inner.engine.as_mut() else {
            return Err(SessionError::SessionClosed);
        };

        inner.state = SessionState::Solving;
        for &lit in &lits {
            engine.assume(lit);
        }
        let code = engine.solve(limit);
        let outcome = match code {
            SATISFIABLE => SolveOutcome::Satisfiable(read_assignment(&*engine, settings.nvars)),
            UNSATISFIABLE => SolveOutcome::Unsatisfiable,
            _ => SolveOutcome::ResourceLimitReached,
        };
        inner.state = SessionState::Idle;

        log::debug!(
            "solve with {} assumptions: code={} ({})",
            lits.len(),
            code,
            match outcome {
                SolveOutcome::Satisfiable(_) => "sat",
                SolveOutcome::Unsatisfiable => "unsat",
                SolveOutcome::ResourceLimitReached => "limit",
            }
        );
        Ok(outcome)
    }

    /// Releases the engine. Later operations fail with `SessionClosed`.
    pub fn destroy(&self) -> Result<(), SessionError> {
        let mut guard = self.lock()?;
        if guard.state == SessionState::Destroyed {
            return Err(SessionError::SessionClosed);
        }
        guard.release();
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        match self.inner.try_lock() {
            Ok(guard) => guard.state,
            Err(TryLockError::WouldBlock) => SessionState::Solving,
            Err(TryLockError::Poisoned(_)) => SessionState::Destroyed,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state() == SessionState::Destroyed
    }

    /// Variable count fixed by [`Session::configure`].
    pub fn nvars(&self) -> Result<u32, SessionError> {
        Ok(self.lock()?.settings()?.nvars)
    }

    pub fn stats(&self) -> Result<EngineStats, SessionError> {
        let guard = self.lock()?;
        guard
            .engine
            .as_ref()
            .map(|e| e.stats())
            .ok_or(SessionError::SessionClosed)
    }

    pub fn backend_name(&self) -> Result<&'static str, SessionError> {
        let guard = self.lock()?;
        guard
            .engine
            .as_ref()
            .map(|e| e.backend_name())
            .ok_or(SessionError::SessionClosed)
    }
}

impl<E: Engine> Drop for Session<E> {
    fn drop(&mut self) {
        let inner = match self.inner.get_mut() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.release();
    }
}

impl<E: Engine> std::fmt::Debug for Session<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .finish()
    }
}
