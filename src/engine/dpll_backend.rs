use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::cnf::cnf::{Cnf, Lit};
use crate::engine::{Engine, EngineError, EngineStats, Phase, SATISFIABLE, UNKNOWN, UNSATISFIABLE};
use crate::sat::dpll::{Budget, Polarity, SatResult, SearchCounters, jeroslow_wang_scores, solve};

/// In-crate DPLL engine.
///
/// The propagation limit counts over the lifetime of the engine; the
/// decision limit passed to [`Engine::solve`] applies to that call only.
#[derive(Debug, Clone)]
pub struct DpllEngine {
    cnf: Cnf,
    pending: Vec<Lit>,
    assumptions: Vec<Lit>,
    last_model: Option<Vec<bool>>,
    phase: Phase,
    rng: ChaCha8Rng,
    verbosity: u32,
    propagation_limit: Option<u64>,
    stats: EngineStats,
}

impl DpllEngine {
    pub fn new() -> Self {
        Self {
            cnf: Cnf::new(0),
            pending: Vec::new(),
            assumptions: Vec::new(),
            last_model: None,
            phase: Phase::default(),
            rng: ChaCha8Rng::seed_from_u64(0),
            verbosity: 0,
            propagation_limit: None,
            stats: EngineStats::default(),
        }
    }

    fn remaining_propagations(&self) -> Option<u64> {
        self.propagation_limit
            .map(|limit| limit.saturating_sub(self.stats.propagations))
    }
}

impl Default for DpllEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for DpllEngine {
    fn init() -> Result<Self, EngineError> {
        Ok(Self::new())
    }

    fn adjust(&mut self, nvars: u32) -> Result<(), EngineError> {
        // the search allocates one slot per variable on every call
        let mut probe = Vec::<Option<bool>>::new();
        probe
            .try_reserve_exact(nvars as usize + 1)
            .map_err(|_| EngineError::OutOfMemory(nvars))?;
        self.cnf.num_vars = self.cnf.num_vars.max(nvars);
        Ok(())
    }

    fn set_verbosity(&mut self, level: u32) {
        self.verbosity = level;
    }

    fn set_default_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    fn set_propagation_limit(&mut self, limit: Option<u64>) {
        self.propagation_limit = limit;
    }

    fn set_seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    fn add(&mut self, lit: i32) {
        if lit == 0 {
            let clause = std::mem::take(&mut self.pending);
            self.cnf.add_clause(clause);
        } else {
            self.pending.push(Lit::from_dimacs(lit));
        }
    }

    fn assume(&mut self, lit: i32) {
        self.assumptions.push(Lit::from_dimacs(lit));
    }

    fn solve(&mut self, decision_limit: Option<u64>) -> i32 {
        self.stats.solve_calls += 1;
        if !self.pending.is_empty() {
            log::warn!(
                "solve with an unterminated clause of {} literals; ignoring it",
                self.pending.len()
            );
        }

        let mut work = self.cnf.clone();
        for a in std::mem::take(&mut self.assumptions) {
            work.add_clause(vec![a]);
        }

        let budget = Budget {
            decisions: decision_limit,
            propagations: self.remaining_propagations(),
        };
        let trace = self.verbosity > 1;
        let mut counters = SearchCounters::default();
        let mut polarity = match self.phase {
            Phase::False => Polarity::Fixed(false),
            Phase::True => Polarity::Fixed(true),
            Phase::JeroslowWang => Polarity::Scored(jeroslow_wang_scores(&work)),
            Phase::Random => Polarity::Random(&mut self.rng),
        };
        let result = solve(&work, &mut polarity, budget, &mut counters, trace);

        self.stats.decisions += counters.decisions;
        self.stats.propagations += counters.propagations;
        self.stats.conflicts += counters.conflicts;

        let code = match result {
            SatResult::Sat(model) => {
                self.last_model = Some(model);
                SATISFIABLE
            }
            SatResult::Unsat => {
                self.last_model = None;
                UNSATISFIABLE
            }
            SatResult::Unknown => {
                self.last_model = None;
                UNKNOWN
            }
        };
        if self.verbosity > 0 {
            log::info!(
                "dpll: code={} vars={} clauses={} decisions={} propagations={} conflicts={}",
                code,
                work.num_vars,
                work.clauses.len(),
                counters.decisions,
                counters.propagations,
                counters.conflicts
            );
        }
        code
    }

    fn deref(&self, lit: i32) -> i32 {
        let lit = Lit::from_dimacs(lit);
        let Some(model) = self.last_model.as_ref() else {
            return 0;
        };
        match model.get(lit.var as usize) {
            Some(&v) if lit.var != 0 => {
                if v == lit.sign {
                    1
                } else {
                    -1
                }
            }
            _ => 0,
        }
    }

    fn variables(&self) -> u32 {
        self.cnf.num_vars
    }

    fn reset(&mut self) {
        self.cnf = Cnf::new(0);
        self.pending.clear();
        self.assumptions.clear();
        self.last_model = None;
    }

    fn stats(&self) -> EngineStats {
        self.stats
    }

    fn backend_name(&self) -> &'static str {
        "dpll"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(engine: &mut DpllEngine, clauses: &[&[i32]]) {
        for clause in clauses {
            for &lit in *clause {
                engine.add(lit);
            }
            engine.add(0);
        }
    }

    #[test]
    fn assumptions_are_forgotten_after_solve() {
        let mut engine = DpllEngine::new();
        engine.adjust(2).expect("adjust");
        load(&mut engine, &[&[1, 2]]);

        engine.assume(-1);
        engine.assume(-2);
        assert_eq!(engine.solve(None), UNSATISFIABLE);
        assert_eq!(engine.solve(None), SATISFIABLE);
    }

    #[test]
    fn deref_reports_literal_truth() {
        let mut engine = DpllEngine::new();
        engine.adjust(2).expect("adjust");
        load(&mut engine, &[&[1], &[-2]]);
        assert_eq!(engine.solve(None), SATISFIABLE);
        assert_eq!(engine.deref(1), 1);
        assert_eq!(engine.deref(-1), -1);
        assert_eq!(engine.deref(2), -1);
        assert_eq!(engine.deref(-2), 1);
        assert_eq!(engine.deref(3), 0);
    }

    #[test]
    fn propagation_limit_is_cumulative() {
        let mut engine = DpllEngine::new();
        engine.adjust(2).expect("adjust");
        engine.set_propagation_limit(Some(1));
        load(&mut engine, &[&[1]]);
        assert_eq!(engine.solve(None), SATISFIABLE);
        assert_eq!(engine.stats().propagations, 1);
        assert_eq!(engine.solve(None), UNKNOWN);
    }

    #[test]
    fn adjust_grows_variable_count() {
        let mut engine = DpllEngine::new();
        engine.adjust(5).expect("adjust");
        assert_eq!(engine.variables(), 5);
        load(&mut engine, &[&[-7]]);
        assert_eq!(engine.variables(), 7);
        engine.reset();
        assert_eq!(engine.variables(), 0);
    }
}
