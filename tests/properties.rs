use std::collections::HashSet;

use proptest::prelude::*;

use satsession::cnf::validate::validate_literal;
use satsession::{EnumerateParams, SolveParams, enumerate_answers, single_answer};

fn brute_force_count(nvars: u32, clauses: &[Vec<i64>]) -> usize {
    (0u32..(1 << nvars))
        .filter(|mask| {
            clauses.iter().all(|clause| {
                clause.iter().any(|&lit| {
                    let bit = (mask >> (lit.unsigned_abs() - 1)) & 1 == 1;
                    bit == (lit > 0)
                })
            })
        })
        .count()
}

fn cnf_strategy() -> impl Strategy<Value = (u32, Vec<Vec<i64>>)> {
    (1u32..=5).prop_flat_map(|n| {
        let lit = (1..=i64::from(n), any::<bool>()).prop_map(|(v, pos)| if pos { v } else { -v });
        let clauses = prop::collection::vec(prop::collection::vec(lit, 1..=3), 0..=7);
        (Just(n), clauses)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn literal_is_invalid_iff_zero_or_out_of_range(l in -64i64..64, n in 0u32..48) {
        let invalid = l == 0 || l.unsigned_abs() > u64::from(n);
        prop_assert_eq!(validate_literal(l, n).is_err(), invalid);
        // no hidden state between calls
        prop_assert_eq!(validate_literal(l, n), validate_literal(l, n));
    }

    #[test]
    fn enumeration_finds_each_model_once(
        (nvars, clauses) in cnf_strategy(),
        phase in 0i64..=3,
    ) {
        let params = EnumerateParams::new(i64::from(nvars), clauses.clone())
            .default_phase(phase)
            .seed(u64::from(nvars));
        let mut seen = HashSet::new();
        for model in enumerate_answers(&params).expect("enumerator") {
            let model = model.expect("assignment");
            prop_assert_eq!(model.len(), nvars as usize);
            prop_assert!(model.satisfies(&clauses));
            prop_assert!(seen.insert(model.to_wire()), "duplicate model {:?}", model);
        }
        prop_assert!(seen.len() <= 1 << nvars);
        prop_assert_eq!(seen.len(), brute_force_count(nvars, &clauses));
    }

    #[test]
    fn single_answer_agrees_with_brute_force((nvars, clauses) in cnf_strategy()) {
        let answer = single_answer(&SolveParams::new(i64::from(nvars), clauses.clone()))
            .expect("solve");
        match answer {
            Some(model) => prop_assert!(model.satisfies(&clauses)),
            None => prop_assert_eq!(brute_force_count(nvars, &clauses), 0),
        }
    }
}
