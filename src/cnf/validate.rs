//! Literal, clause and assumption validation.
//!
//! Everything here is pure: the same input always produces the same
//! verdict, and nothing touches an engine.

use crate::error::{LiteralFault, SessionError};

/// Checks that `value` is a literal over `nvars` variables.
///
/// Rejects zero, magnitudes above `nvars`, and anything that does not fit
/// the engine's 32-bit literal encoding.
pub fn validate_literal(value: i64, nvars: u32) -> Result<i32, SessionError> {
    if value == 0 {
        return Err(SessionError::invalid_literal(value, LiteralFault::Zero));
    }
    let Ok(lit) = i32::try_from(value) else {
        return Err(SessionError::invalid_literal(
            value,
            LiteralFault::OutOfRange { nvars },
        ));
    };
    if lit == i32::MIN || lit.unsigned_abs() > nvars {
        return Err(SessionError::invalid_literal(
            value,
            LiteralFault::OutOfRange { nvars },
        ));
    }
    Ok(lit)
}

/// Same as [`validate_literal`] for untrusted text such as DIMACS tokens.
pub fn validate_literal_token(token: &str, nvars: u32) -> Result<i32, SessionError> {
    let value = token
        .trim()
        .parse::<i64>()
        .map_err(|_| SessionError::invalid_literal(token, LiteralFault::NotAnInteger))?;
    validate_literal(value, nvars)
}

/// Validates a whole clause, stopping at the first bad literal.
pub fn validate_clause(clause: &[i64], nvars: u32) -> Result<Vec<i32>, SessionError> {
    clause
        .iter()
        .map(|&value| validate_literal(value, nvars))
        .collect()
}

/// Validates a flat assumption sequence.
pub fn validate_assumptions<I>(assumptions: I, nvars: u32) -> Result<Vec<i32>, SessionError>
where
    I: IntoIterator<Item = i64>,
{
    assumptions
        .into_iter()
        .map(|value| validate_literal(value, nvars))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_polarities_in_range() {
        assert_eq!(validate_literal(3, 3), Ok(3));
        assert_eq!(validate_literal(-3, 3), Ok(-3));
        assert_eq!(validate_literal(1, 1), Ok(1));
    }

    #[test]
    fn rejects_zero_and_out_of_range() {
        let zero = validate_literal(0, 5).expect_err("zero");
        assert_eq!(
            zero,
            SessionError::invalid_literal(0, LiteralFault::Zero)
        );

        let big = validate_literal(-6, 5).expect_err("range");
        assert!(matches!(
            big,
            SessionError::InvalidLiteral {
                fault: LiteralFault::OutOfRange { nvars: 5 },
                ..
            }
        ));

        // no variables at all: nothing is a valid literal
        assert!(validate_literal(1, 0).is_err());
    }

    #[test]
    fn rejects_values_wider_than_the_engine_encoding() {
        let err = validate_literal(i64::from(i32::MIN), u32::MAX).expect_err("i32::MIN");
        assert!(err.is_invalid_literal());
        assert!(validate_literal(1 << 40, u32::MAX).is_err());
    }

    #[test]
    fn tokens_must_be_integers() {
        assert_eq!(validate_literal_token(" -2 ", 2), Ok(-2));
        let err = validate_literal_token("1.5", 2).expect_err("float");
        assert!(matches!(
            err,
            SessionError::InvalidLiteral {
                fault: LiteralFault::NotAnInteger,
                ..
            }
        ));
        assert!(validate_literal_token("x1", 2).is_err());
    }

    #[test]
    fn repeated_validation_gives_the_same_error() {
        let first = validate_literal(9, 2);
        let second = validate_literal(9, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn clause_validation_stops_at_first_bad_literal() {
        assert_eq!(validate_clause(&[1, -2], 2), Ok(vec![1, -2]));
        assert_eq!(validate_clause(&[], 0), Ok(vec![]));
        let err = validate_clause(&[1, 0, 7], 2).expect_err("bad clause");
        assert_eq!(err, SessionError::invalid_literal(0, LiteralFault::Zero));
    }
}
