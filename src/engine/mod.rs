pub mod dpll_backend;
pub mod varisat;

use thiserror::Error;

pub use self::dpll_backend::DpllEngine;
pub use self::varisat::VarisatEngine;

/// Raw `solve` code for a satisfiable result.
pub const SATISFIABLE: i32 = 10;
/// Raw `solve` code for a proven unsatisfiable result.
pub const UNSATISFIABLE: i32 = 20;
/// Raw `solve` code when the engine gave up before reaching an answer.
pub const UNKNOWN: i32 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("out of memory reserving {0} variables")]
    OutOfMemory(u32),
    #[error("{0}")]
    Backend(String),
}

/// Polarity tried first when the engine branches on a variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    False = 0,
    True = 1,
    #[default]
    JeroslowWang = 2,
    Random = 3,
}

impl TryFrom<i64> for Phase {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::False),
            1 => Ok(Self::True),
            2 => Ok(Self::JeroslowWang),
            3 => Ok(Self::Random),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::False => write!(f, "false"),
            Self::True => write!(f, "true"),
            Self::JeroslowWang => write!(f, "jeroslow-wang"),
            Self::Random => write!(f, "random"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub solve_calls: usize,
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
}

/// An incremental SAT engine driven through signed-integer literals.
///
/// Clauses are streamed with [`Engine::add`], `0` closing the current
/// clause. Assumptions only live until the next [`Engine::solve`].
pub trait Engine {
    fn init() -> Result<Self, EngineError>
    where
        Self: Sized;
    fn adjust(&mut self, nvars: u32) -> Result<(), EngineError>;
    fn set_verbosity(&mut self, level: u32);
    fn set_default_phase(&mut self, phase: Phase);
    fn set_propagation_limit(&mut self, limit: Option<u64>);
    fn set_seed(&mut self, seed: u64);
    fn add(&mut self, lit: i32);
    fn assume(&mut self, lit: i32);
    /// Returns [`SATISFIABLE`], [`UNSATISFIABLE`] or [`UNKNOWN`].
    fn solve(&mut self, decision_limit: Option<u64>) -> i32;
    /// `1` if `lit` is true in the last model, `-1` if false, `0` if unknown.
    fn deref(&self, lit: i32) -> i32;
    fn variables(&self) -> u32;
    fn reset(&mut self);
    fn stats(&self) -> EngineStats;
    fn backend_name(&self) -> &'static str;
}
