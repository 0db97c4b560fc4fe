use std::io::BufRead;

use anyhow::{Context, Result, bail};

use super::validate::validate_literal_token;

/// A parsed `p cnf` problem in wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimacsProblem {
    pub nvars: u32,
    pub clauses: Vec<Vec<i64>>,
}

pub fn parse_dimacs_str(s: &str) -> Result<DimacsProblem> {
    parse_dimacs_reader(std::io::Cursor::new(s.as_bytes()))
}

pub fn parse_dimacs_reader<R: BufRead>(r: R) -> Result<DimacsProblem> {
    let mut header: Option<(u32, usize)> = None;
    let mut clauses = Vec::new();
    let mut current = Vec::new();

    for (idx, line) in r.lines().enumerate() {
        let line = line.context("failed to read dimacs input")?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('c') {
            continue;
        }
        // SATLIB end marker
        if trimmed.starts_with('%') {
            break;
        }

        if trimmed.starts_with('p') {
            if header.is_some() {
                bail!("duplicate problem line on line {}", line_no);
            }
            header = Some(parse_header(trimmed, line_no)?);
            continue;
        }

        let Some((nvars, _)) = header else {
            bail!("clause on line {} before 'p cnf' header", line_no);
        };

        for token in trimmed.split_whitespace() {
            if token == "0" {
                clauses.push(std::mem::take(&mut current));
                continue;
            }
            let lit = validate_literal_token(token, nvars)
                .with_context(|| format!("bad literal on line {}", line_no))?;
            current.push(i64::from(lit));
        }
    }

    let Some((nvars, declared)) = header else {
        bail!("missing 'p cnf' header");
    };
    // tolerate a final clause without its terminator
    if !current.is_empty() {
        clauses.push(current);
    }
    if clauses.len() != declared {
        log::warn!(
            "header declares {} clauses, found {}",
            declared,
            clauses.len()
        );
    }

    Ok(DimacsProblem { nvars, clauses })
}

fn parse_header(line: &str, line_no: usize) -> Result<(u32, usize)> {
    let parts = line.split_whitespace().collect::<Vec<_>>();
    if parts.len() != 4 || parts[0] != "p" || parts[1] != "cnf" {
        bail!("invalid header on line {}, expected: p cnf V C", line_no);
    }
    let nvars = parts[2]
        .parse::<u32>()
        .with_context(|| format!("invalid variable count: {}", parts[2]))?;
    if nvars > i32::MAX as u32 {
        bail!("variable count {} is too large", nvars);
    }
    let nclauses = parts[3]
        .parse::<usize>()
        .with_context(|| format!("invalid clause count: {}", parts[3]))?;
    Ok((nvars, nclauses))
}

pub fn to_dimacs(nvars: u32, clauses: &[Vec<i64>]) -> String {
    let mut out = String::new();
    out.push_str(&format!("p cnf {} {}\n", nvars, clauses.len()));
    for clause in clauses {
        for &lit in clause {
            out.push_str(&format!("{} ", lit));
        }
        out.push_str("0\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{parse_dimacs_str, to_dimacs};
    use crate::error::{LiteralFault, SessionError};

    #[test]
    fn parse_small_problem() {
        let src = "\
c two exclusive variables
p cnf 2 2
1 2 0
-1 -2 0
";
        let problem = parse_dimacs_str(src).expect("parse");
        assert_eq!(problem.nvars, 2);
        assert_eq!(problem.clauses, vec![vec![1, 2], vec![-1, -2]]);
        assert_eq!(parse_dimacs_str(&to_dimacs(2, &problem.clauses)).expect("reparse"), problem);
    }

    #[test]
    fn clauses_may_span_lines_and_be_empty() {
        let src = "p cnf 3 3\n1\n-3 0 0\n2";
        let problem = parse_dimacs_str(src).expect("parse");
        assert_eq!(problem.clauses, vec![vec![1, -3], vec![], vec![2]]);
    }

    #[test]
    fn rejects_missing_header_and_bad_tokens() {
        assert!(parse_dimacs_str("1 2 0\n").is_err());
        assert!(parse_dimacs_str("c only comments\n").is_err());

        let err = parse_dimacs_str("p cnf 2 1\n1 x 0\n").expect_err("token");
        let cause = err.downcast_ref::<SessionError>().expect("session error");
        assert!(matches!(
            cause,
            SessionError::InvalidLiteral {
                fault: LiteralFault::NotAnInteger,
                ..
            }
        ));

        assert!(parse_dimacs_str("p cnf 2 1\n1 3 0\n").is_err());
    }
}
