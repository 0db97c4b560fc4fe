//! The two host-facing entry points.
//!
//! Both build a fresh [`Session`], configure it from a parameter struct,
//! and load the clause set. [`single_answer`] solves once and releases the
//! session; [`enumerate_answers`] hands the session to an [`Enumerator`].

use crate::engine::{DpllEngine, Engine};
use crate::enumerate::{BoundedCount, Enumerator, count_models_bounded};
use crate::error::SessionError;
use crate::session::config::{DEFAULT_PHASE, DEFAULT_VERBOSITY, UNBOUNDED};
use crate::session::{Assignment, Session, SessionConfig, SolveOutcome};

/// Parameters for [`single_answer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveParams {
    pub nvars: i64,
    pub clauses: Vec<Vec<i64>>,
    /// Default `0`.
    pub verbosity: u32,
    /// Default `2` (Jeroslow-Wang).
    pub default_phase: i64,
    /// Default `-1` (unbounded).
    pub propagation_limit: i64,
    /// Default `-1` (unbounded).
    pub decision_limit: i64,
    pub seed: u64,
    /// Default empty.
    pub assumptions: Vec<i64>,
}

impl SolveParams {
    pub fn new(nvars: i64, clauses: Vec<Vec<i64>>) -> Self {
        Self {
            nvars,
            clauses,
            verbosity: DEFAULT_VERBOSITY,
            default_phase: DEFAULT_PHASE,
            propagation_limit: UNBOUNDED,
            decision_limit: UNBOUNDED,
            seed: 0,
            assumptions: Vec::new(),
        }
    }

    /// Takes the variable count from the largest literal magnitude.
    pub fn from_clauses(clauses: Vec<Vec<i64>>) -> Self {
        let nvars = infer_nvars(&clauses);
        Self::new(nvars, clauses)
    }

    pub fn verbosity(mut self, verbosity: u32) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn default_phase(mut self, phase: i64) -> Self {
        self.default_phase = phase;
        self
    }

    pub fn propagation_limit(mut self, limit: i64) -> Self {
        self.propagation_limit = limit;
        self
    }

    pub fn decision_limit(mut self, limit: i64) -> Self {
        self.decision_limit = limit;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn assumptions(mut self, assumptions: Vec<i64>) -> Self {
        self.assumptions = assumptions;
        self
    }

    pub fn config(&self) -> SessionConfig {
        SessionConfig {
            nvars: self.nvars,
            verbosity: self.verbosity,
            default_phase: self.default_phase,
            propagation_limit: self.propagation_limit,
            decision_limit: self.decision_limit,
            seed: self.seed,
        }
    }
}

/// Parameters for [`enumerate_answers`]. Same defaults as [`SolveParams`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerateParams {
    pub nvars: i64,
    pub clauses: Vec<Vec<i64>>,
    pub verbosity: u32,
    pub default_phase: i64,
    pub propagation_limit: i64,
    pub decision_limit: i64,
    pub seed: u64,
}

impl EnumerateParams {
    pub fn new(nvars: i64, clauses: Vec<Vec<i64>>) -> Self {
        Self {
            nvars,
            clauses,
            verbosity: DEFAULT_VERBOSITY,
            default_phase: DEFAULT_PHASE,
            propagation_limit: UNBOUNDED,
            decision_limit: UNBOUNDED,
            seed: 0,
        }
    }

    pub fn from_clauses(clauses: Vec<Vec<i64>>) -> Self {
        let nvars = infer_nvars(&clauses);
        Self::new(nvars, clauses)
    }

    pub fn verbosity(mut self, verbosity: u32) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn default_phase(mut self, phase: i64) -> Self {
        self.default_phase = phase;
        self
    }

    pub fn propagation_limit(mut self, limit: i64) -> Self {
        self.propagation_limit = limit;
        self
    }

    pub fn decision_limit(mut self, limit: i64) -> Self {
        self.decision_limit = limit;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn config(&self) -> SessionConfig {
        SessionConfig {
            nvars: self.nvars,
            verbosity: self.verbosity,
            default_phase: self.default_phase,
            propagation_limit: self.propagation_limit,
            decision_limit: self.decision_limit,
            seed: self.seed,
        }
    }
}

impl From<SolveParams> for EnumerateParams {
    fn from(p: SolveParams) -> Self {
        Self {
            nvars: p.nvars,
            clauses: p.clauses,
            verbosity: p.verbosity,
            default_phase: p.default_phase,
            propagation_limit: p.propagation_limit,
            decision_limit: p.decision_limit,
            seed: p.seed,
        }
    }
}

fn infer_nvars(clauses: &[Vec<i64>]) -> i64 {
    let top = clauses
        .iter()
        .flatten()
        .map(|lit| lit.unsigned_abs())
        .max()
        .unwrap_or(0);
    i64::try_from(top).unwrap_or(i64::MAX)
}

/// Solves once with the default engine.
///
/// `Ok(None)` means unsatisfiable. Hitting a resource limit is an error
/// here since the caller asked for a decisive answer.
pub fn single_answer(params: &SolveParams) -> Result<Option<Assignment>, SessionError> {
    single_answer_with::<DpllEngine>(params)
}

pub fn single_answer_with<E: Engine>(
    params: &SolveParams,
) -> Result<Option<Assignment>, SessionError> {
    let session = Session::<E>::with_config(&params.config())?;
    session.load_clauses(&params.clauses)?;
    let outcome = session.solve(params.assumptions.iter().copied())?;
    session.destroy()?;

    match outcome {
        SolveOutcome::Satisfiable(assignment) => Ok(Some(assignment)),
        SolveOutcome::Unsatisfiable => Ok(None),
        SolveOutcome::ResourceLimitReached => Err(SessionError::ResourceLimitReached),
    }
}

/// Lazy sequence of every satisfying assignment, using the default engine.
///
/// The sequence ends quietly on unsatisfiability and on a resource limit;
/// [`Enumerator::stop_reason`] tells the two apart.
pub fn enumerate_answers(params: &EnumerateParams) -> Result<Enumerator, SessionError> {
    enumerate_answers_with::<DpllEngine>(params)
}

pub fn enumerate_answers_with<E: Engine>(
    params: &EnumerateParams,
) -> Result<Enumerator<E>, SessionError> {
    let session = Session::<E>::with_config(&params.config())?;
    session.load_clauses(&params.clauses)?;
    Enumerator::new(session)
}

/// Counts satisfying assignments, giving up after `cap`.
pub fn count_bounded(params: &EnumerateParams, cap: usize) -> Result<BoundedCount, SessionError> {
    let mut enumerator = enumerate_answers(params)?;
    count_models_bounded(&mut enumerator, cap)
}

#[cfg(test)]
mod tests {
    use super::{EnumerateParams, SolveParams};

    #[test]
    fn defaults_follow_the_documented_values() {
        let p = SolveParams::new(3, vec![]);
        assert_eq!(p.verbosity, 0);
        assert_eq!(p.default_phase, 2);
        assert_eq!(p.propagation_limit, -1);
        assert_eq!(p.decision_limit, -1);
        assert!(p.assumptions.is_empty());
    }

    #[test]
    fn nvars_inferred_from_largest_literal() {
        assert_eq!(SolveParams::from_clauses(vec![vec![1, -4], vec![2]]).nvars, 4);
        assert_eq!(EnumerateParams::from_clauses(vec![]).nvars, 0);
        assert_eq!(EnumerateParams::from_clauses(vec![vec![]]).nvars, 0);
    }
}
