use crate::engine::Engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    False = -1,
    Unknown = 0,
    True = 1,
}

impl Value {
    /// Maps an engine `deref` result; anything other than `±1` is unknown.
    pub fn from_deref(code: i32) -> Self {
        match code {
            1 => Self::True,
            -1 => Self::False,
            _ => Self::Unknown,
        }
    }

    pub fn to_bool(self) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            Self::Unknown => None,
        }
    }
}

/// Truth values for variables `1..=nvars`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assignment {
    values: Vec<Value>,
}

impl Assignment {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of variable `var`, 1-indexed.
    pub fn get(&self, var: u32) -> Option<Value> {
        let idx = (var as usize).checked_sub(1)?;
        self.values.get(idx).copied()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// `-1`/`0`/`1` per variable.
    pub fn to_wire(&self) -> Vec<i8> {
        self.values.iter().map(|&v| v as i8).collect()
    }

    /// Signed literals for every determined variable.
    pub fn literals(&self) -> Vec<i64> {
        self.values
            .iter()
            .zip(1i64..)
            .filter_map(|(value, var)| match value {
                Value::True => Some(var),
                Value::False => Some(-var),
                Value::Unknown => None,
            })
            .collect()
    }

    pub fn satisfies_clause(&self, clause: &[i64]) -> bool {
        clause.iter().any(|&lit| {
            let Ok(var) = u32::try_from(lit.unsigned_abs()) else {
                return false;
            };
            match self.get(var).and_then(Value::to_bool) {
                Some(v) => v == (lit > 0),
                None => false,
            }
        })
    }

    pub fn satisfies<C: AsRef<[i64]>>(&self, clauses: &[C]) -> bool {
        clauses.iter().all(|c| self.satisfies_clause(c.as_ref()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Satisfiable(Assignment),
    Unsatisfiable,
    ResourceLimitReached,
}

/// Reads variables `1..=nvars` from an engine holding a satisfiable result.
pub fn read_assignment<E: Engine + ?Sized>(engine: &E, nvars: u32) -> Assignment {
    let values = (1..=nvars)
        .map(|var| Value::from_deref(engine.deref(var as i32)))
        .collect();
    Assignment::new(values)
}

#[cfg(test)]
mod tests {
    use super::{Assignment, Value};

    #[test]
    fn wire_and_literal_forms() {
        let a = Assignment::new(vec![Value::True, Value::Unknown, Value::False]);
        assert_eq!(a.to_wire(), vec![1, 0, -1]);
        assert_eq!(a.literals(), vec![1, -3]);
        assert_eq!(a.get(0), None);
        assert_eq!(a.get(3), Some(Value::False));
        assert_eq!(a.get(4), None);
    }

    #[test]
    fn unknown_values_do_not_satisfy_literals() {
        let a = Assignment::new(vec![Value::True, Value::Unknown]);
        assert!(a.satisfies(&[vec![1], vec![-2, 1]]));
        assert!(!a.satisfies(&[vec![2]]));
        assert!(!a.satisfies(&[vec![-2]]));
        assert!(!a.satisfies_clause(&[]));
    }
}
