use varisat::ExtendFormula;

use crate::engine::{Engine, EngineError, EngineStats, Phase, SATISFIABLE, UNKNOWN, UNSATISFIABLE};

/// Engine backed by the `varisat` CDCL solver.
///
/// varisat exposes no phase or limit controls, so those settings are
/// accepted and ignored.
pub struct VarisatEngine {
    inner: varisat::Solver<'static>,
    num_vars: u32,
    pending: Vec<varisat::Lit>,
    assumptions: Vec<varisat::Lit>,
    // per-variable value of the last model, index 0 unused
    last_model: Option<Vec<i8>>,
    stats: EngineStats,
}

impl VarisatEngine {
    pub fn new() -> Self {
        Self {
            inner: varisat::Solver::new(),
            num_vars: 0,
            pending: Vec::new(),
            assumptions: Vec::new(),
            last_model: None,
            stats: EngineStats::default(),
        }
    }

    fn to_lit(&mut self, lit: i32) -> varisat::Lit {
        self.grow(lit.unsigned_abs());
        varisat::Lit::from_dimacs(lit as isize)
    }

    fn grow(&mut self, nvars: u32) {
        while self.num_vars < nvars {
            self.inner.new_var();
            self.num_vars += 1;
        }
    }
}

impl Default for VarisatEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for VarisatEngine {
    fn init() -> Result<Self, EngineError> {
        Ok(Self::new())
    }

    fn adjust(&mut self, nvars: u32) -> Result<(), EngineError> {
        self.grow(nvars);
        Ok(())
    }

    fn set_verbosity(&mut self, level: u32) {
        if level > 0 {
            log::debug!("varisat: verbosity {} has no effect", level);
        }
    }

    fn set_default_phase(&mut self, phase: Phase) {
        if phase != Phase::default() {
            log::warn!("varisat: default phase {} is not supported, ignoring", phase);
        }
    }

    fn set_propagation_limit(&mut self, limit: Option<u64>) {
        if let Some(limit) = limit {
            log::warn!("varisat: propagation limit {} is not supported, ignoring", limit);
        }
    }

    fn set_seed(&mut self, _seed: u64) {}

    fn add(&mut self, lit: i32) {
        if lit == 0 {
            let clause = std::mem::take(&mut self.pending);
            self.inner.add_clause(&clause);
        } else {
            let l = self.to_lit(lit);
            self.pending.push(l);
        }
    }

    fn assume(&mut self, lit: i32) {
        let l = self.to_lit(lit);
        self.assumptions.push(l);
    }

    fn solve(&mut self, decision_limit: Option<u64>) -> i32 {
        self.stats.solve_calls += 1;
        if let Some(limit) = decision_limit {
            log::warn!("varisat: decision limit {} is not supported, ignoring", limit);
        }
        let assumps = std::mem::take(&mut self.assumptions);
        self.inner.assume(&assumps);
        match self.inner.solve() {
            Ok(true) => {
                let mut values = vec![0i8; self.num_vars as usize + 1];
                for lit in self.inner.model().unwrap_or_default() {
                    let idx = lit.var().to_dimacs() as usize;
                    if let Some(slot) = values.get_mut(idx) {
                        *slot = if lit.is_positive() { 1 } else { -1 };
                    }
                }
                self.last_model = Some(values);
                SATISFIABLE
            }
            Ok(false) => {
                self.last_model = None;
                UNSATISFIABLE
            }
            Err(err) => {
                log::warn!("varisat: solve failed: {:?}", err);
                self.last_model = None;
                UNKNOWN
            }
        }
    }

    fn deref(&self, lit: i32) -> i32 {
        let Some(model) = self.last_model.as_ref() else {
            return 0;
        };
        let value = model
            .get(lit.unsigned_abs() as usize)
            .copied()
            .map_or(0, i32::from);
        if lit < 0 { -value } else { value }
    }

    fn variables(&self) -> u32 {
        self.num_vars
    }

    fn reset(&mut self) {
        self.inner = varisat::Solver::new();
        self.num_vars = 0;
        self.pending.clear();
        self.assumptions.clear();
        self.last_model = None;
    }

    fn stats(&self) -> EngineStats {
        self.stats
    }

    fn backend_name(&self) -> &'static str {
        "varisat"
    }
}
