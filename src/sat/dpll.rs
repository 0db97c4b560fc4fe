use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::cnf::cnf::{Cnf, Lit};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatResult {
    /// Total model, index 0 unused.
    Sat(Vec<bool>),
    Unsat,
    Unknown,
}

/// Remaining search budget for one call. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Budget {
    pub decisions: Option<u64>,
    pub propagations: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchCounters {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
}

/// Chooses the value tried first for a branching variable.
pub enum Polarity<'a> {
    Fixed(bool),
    /// Jeroslow-Wang literal weights, positive literal at `2v`, negative at `2v + 1`.
    Scored(Vec<f64>),
    Random(&'a mut ChaCha8Rng),
}

impl Polarity<'_> {
    fn pick(&mut self, var: usize) -> bool {
        match self {
            Self::Fixed(v) => *v,
            Self::Scored(scores) => {
                let pos = scores.get(2 * var).copied().unwrap_or(0.0);
                let neg = scores.get(2 * var + 1).copied().unwrap_or(0.0);
                pos >= neg
            }
            Self::Random(rng) => rng.random::<bool>(),
        }
    }
}

pub fn jeroslow_wang_scores(cnf: &Cnf) -> Vec<f64> {
    let mut scores = vec![0.0; 2 * (cnf.num_vars as usize + 1)];
    for clause in &cnf.clauses {
        let weight = 2f64.powi(-(clause.len().min(1024) as i32));
        for &lit in clause {
            let slot = 2 * lit.var as usize + usize::from(!lit.sign);
            if let Some(s) = scores.get_mut(slot) {
                *s += weight;
            }
        }
    }
    scores
}

pub fn solve(
    cnf: &Cnf,
    polarity: &mut Polarity<'_>,
    budget: Budget,
    counters: &mut SearchCounters,
    trace: bool,
) -> SatResult {
    let mut search = Search {
        cnf,
        polarity,
        budget,
        counters,
        trace,
        assignment: vec![None; cnf.num_vars as usize + 1],
        trail: Vec::new(),
        decisions: Vec::new(),
    };
    match search.run() {
        Step::Found => SatResult::Sat(search.model()),
        Step::Conflict => SatResult::Unsat,
        Step::Stopped => SatResult::Unknown,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Found,
    Conflict,
    Stopped,
}

/// One decision level. `trail_len` is the trail length before the decision.
#[derive(Debug, Clone, Copy)]
struct Decision {
    var: usize,
    value: bool,
    trail_len: usize,
    flipped: bool,
}

struct Search<'c, 'p, 'r> {
    cnf: &'c Cnf,
    polarity: &'p mut Polarity<'r>,
    budget: Budget,
    counters: &'c mut SearchCounters,
    trace: bool,
    assignment: Vec<Option<bool>>,
    // assigned variables in assignment order
    trail: Vec<usize>,
    decisions: Vec<Decision>,
}

impl Search<'_, '_, '_> {
    fn run(&mut self) -> Step {
        loop {
            let conflict = match self.unit_propagate() {
                Step::Stopped => return Step::Stopped,
                Step::Conflict => true,
                Step::Found => match self.cnf.eval_formula_partial(&self.assignment) {
                    Some(true) => return Step::Found,
                    Some(false) => {
                        self.counters.conflicts += 1;
                        true
                    }
                    None => false,
                },
            };
            if conflict {
                if !self.backtrack() {
                    return Step::Conflict;
                }
                continue;
            }

            let Some(var) = first_unassigned(&self.assignment) else {
                if !self.backtrack() {
                    return Step::Conflict;
                }
                continue;
            };
            if self
                .budget
                .decisions
                .is_some_and(|limit| self.counters.decisions >= limit)
            {
                return Step::Stopped;
            }
            self.counters.decisions += 1;

            let value = self.polarity.pick(var);
            self.decisions.push(Decision {
                var,
                value,
                trail_len: self.trail.len(),
                flipped: false,
            });
            self.decide(var, value);
        }
    }

    /// Undoes levels until one can take its second value. `false` once none is left.
    fn backtrack(&mut self) -> bool {
        while let Some(decision) = self.decisions.pop() {
            for var in self.trail.drain(decision.trail_len..) {
                self.assignment[var] = None;
            }
            if !decision.flipped {
                let value = !decision.value;
                self.decisions.push(Decision {
                    value,
                    flipped: true,
                    ..decision
                });
                self.decide(decision.var, value);
                return true;
            }
        }
        false
    }

    fn decide(&mut self, var: usize, value: bool) {
        if self.trace {
            log::trace!("decide {} = {} at level {}", var, value, self.decisions.len());
        }
        self.assign(var, value);
    }

    fn assign(&mut self, var: usize, value: bool) {
        self.assignment[var] = Some(value);
        self.trail.push(var);
    }

    /// Clauses are all satisfied; free vars take the preferred phase.
    fn model(&mut self) -> Vec<bool> {
        let mut model = Vec::with_capacity(self.assignment.len());
        for (var, value) in self.assignment.iter().enumerate() {
            model.push(match value {
                Some(b) => *b,
                None if var == 0 => false,
                None => self.polarity.pick(var),
            });
        }
        model
    }

    /// `Found` here means propagation reached a fixpoint without conflict.
    fn unit_propagate(&mut self) -> Step {
        let cnf = self.cnf;
        loop {
            let mut changed = false;

            for clause in &cnf.clauses {
                let mut open_count = 0usize;
                let mut last_open = Lit::new(0, true);
                let mut has_true = false;

                for &lit in clause {
                    match Cnf::eval_lit_partial(lit, &self.assignment) {
                        Some(true) => {
                            has_true = true;
                            break;
                        }
                        Some(false) => {}
                        None => {
                            open_count += 1;
                            last_open = lit;
                        }
                    }
                }

                if has_true {
                    continue;
                }
                if open_count == 0 {
                    self.counters.conflicts += 1;
                    return Step::Conflict;
                }
                if open_count == 1 {
                    let var = last_open.var as usize;
                    if var >= self.assignment.len() {
                        continue;
                    }
                    let need = last_open.sign;
                    match self.assignment[var] {
                        Some(v) if v != need => {
                            self.counters.conflicts += 1;
                            return Step::Conflict;
                        }
                        Some(_) => {}
                        None => {
                            if self
                                .budget
                                .propagations
                                .is_some_and(|limit| self.counters.propagations >= limit)
                            {
                                return Step::Stopped;
                            }
                            self.counters.propagations += 1;
                            self.assign(var, need);
                            changed = true;
                        }
                    }
                }
            }

            if !changed {
                return Step::Found;
            }
        }
    }
}

fn first_unassigned(assignment: &[Option<bool>]) -> Option<usize> {
    (1..assignment.len()).find(|&i| assignment[i].is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cnf_of(num_vars: u32, clauses: &[&[i32]]) -> Cnf {
        let mut cnf = Cnf::new(num_vars);
        for clause in clauses {
            cnf.add_clause(clause.iter().map(|&l| Lit::from_dimacs(l)).collect());
        }
        cnf
    }

    fn run_unbounded(cnf: &Cnf) -> (SatResult, SearchCounters) {
        let mut counters = SearchCounters::default();
        let result = solve(
            cnf,
            &mut Polarity::Fixed(false),
            Budget::default(),
            &mut counters,
            false,
        );
        (result, counters)
    }

    #[test]
    fn finds_total_model_for_exclusive_or() {
        let cnf = cnf_of(2, &[&[1, 2], &[-1, -2]]);
        let SatResult::Sat(model) = run_unbounded(&cnf).0 else {
            panic!("expected a model");
        };
        assert_eq!(model.len(), 3);
        assert_ne!(model[1], model[2]);
    }

    #[test]
    fn contradictory_units_are_unsat() {
        let cnf = cnf_of(1, &[&[1], &[-1]]);
        assert_eq!(run_unbounded(&cnf).0, SatResult::Unsat);
    }

    #[test]
    fn backtracking_undoes_propagated_values() {
        // x1 = false forces x2 and x3 into a clash, so x1 must flip
        let cnf = cnf_of(3, &[&[1, 2], &[1, 3], &[-2, -3]]);
        let (result, counters) = run_unbounded(&cnf);
        let SatResult::Sat(model) = result else {
            panic!("expected a model");
        };
        assert!(model[1]);
        assert!(!(model[2] && model[3]));
        assert!(counters.conflicts >= 1);
    }

    #[test]
    fn exhausting_both_branches_is_unsat() {
        let cnf = cnf_of(2, &[&[1, 2], &[1, -2], &[-1, 2], &[-1, -2]]);
        let (result, counters) = run_unbounded(&cnf);
        assert_eq!(result, SatResult::Unsat);
        assert_eq!(counters.decisions, 1);
    }

    #[test]
    fn long_decision_chain_does_not_grow_the_stack() {
        let n = 4000i32;
        let clauses = (1..=n).map(|i| vec![2 * i - 1, 2 * i]).collect::<Vec<_>>();
        let mut cnf = Cnf::new(2 * n as u32);
        for clause in &clauses {
            cnf.add_clause(clause.iter().map(|&l| Lit::from_dimacs(l)).collect());
        }
        let SatResult::Sat(model) = run_unbounded(&cnf).0 else {
            panic!("expected a model");
        };
        for clause in &clauses {
            assert!(clause.iter().any(|&l| model[l as usize]));
        }
    }

    #[test]
    fn fixed_phase_fills_free_variables() {
        let cnf = cnf_of(3, &[&[2]]);
        let mut counters = SearchCounters::default();
        let result = solve(
            &cnf,
            &mut Polarity::Fixed(true),
            Budget::default(),
            &mut counters,
            false,
        );
        assert_eq!(result, SatResult::Sat(vec![false, true, true, true]));
    }

    #[test]
    fn zero_decision_budget_stops_when_branching_is_needed() {
        let cnf = cnf_of(2, &[&[1, 2]]);
        let mut counters = SearchCounters::default();
        let result = solve(
            &cnf,
            &mut Polarity::Fixed(false),
            Budget {
                decisions: Some(0),
                propagations: None,
            },
            &mut counters,
            false,
        );
        assert_eq!(result, SatResult::Unknown);
        assert_eq!(counters.decisions, 0);
    }

    #[test]
    fn propagation_budget_is_enforced() {
        let cnf = cnf_of(3, &[&[1], &[-1, 2], &[-2, 3]]);
        let mut counters = SearchCounters::default();
        let result = solve(
            &cnf,
            &mut Polarity::Fixed(false),
            Budget {
                decisions: None,
                propagations: Some(2),
            },
            &mut counters,
            false,
        );
        assert_eq!(result, SatResult::Unknown);
        assert_eq!(counters.propagations, 2);
    }

    #[test]
    fn jeroslow_wang_prefers_the_heavier_literal() {
        let cnf = cnf_of(2, &[&[-1], &[-1, 2], &[1, 2]]);
        let scores = jeroslow_wang_scores(&cnf);
        assert!(scores[3] > scores[2]);
        let mut polarity = Polarity::Scored(scores);
        assert!(!polarity.pick(1));
        assert!(polarity.pick(2));
    }
}
