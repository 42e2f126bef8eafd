//! Text readers for the conekit front-end
//!
//! Both formats are plain whitespace-separated integers; line breaks
//! carry no meaning. A constraint file starts with the dimension `n`
//! and continues with one row `tag a1 .. an` per constraint, where the
//! tag is `eq` or `ge`. A generator file starts with `n` and continues
//! with one generator of `n` entries each. The path `-` names stdin.

use std::fs;
use std::io::Read;
use std::path::Path;

use conekit_core::{ConstraintSign, Integer, Matrix, Vector};

/// A parsed constraint system for vertex enumeration.
#[derive(Debug, Clone)]
pub struct ConeProblem {
    pub dim: usize,
    pub matrix: Matrix<Integer>,
    pub signs: Vec<ConstraintSign>,
}

/// A parsed generator list for a Hilbert basis run.
#[derive(Debug, Clone)]
pub struct GeneratorProblem {
    pub dim: usize,
    pub generators: Vec<Vector>,
}

/// Read the whole input, with `-` standing for stdin.
pub fn read_source(path: &Path) -> Result<String, String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|error| format!("failed to read stdin: {error}"))?;
        return Ok(text);
    }
    fs::read_to_string(path)
        .map_err(|error| format!("failed to read {}: {error}", path.display()))
}

/// Parse a constraint file: `n`, then rows `tag a1 .. an`.
pub fn parse_cone(text: &str) -> Result<ConeProblem, String> {
    let mut tokens = text.split_whitespace();
    let dim = parse_dimension(tokens.next())?;

    let mut data = Vec::new();
    let mut signs = Vec::new();
    while let Some(tag) = tokens.next() {
        let sign = match tag {
            "eq" => ConstraintSign::Equality,
            "ge" => ConstraintSign::GreaterEqual,
            other => {
                return Err(format!(
                    "row {}: unknown tag '{}', expected 'eq' or 'ge'",
                    signs.len() + 1,
                    other
                ))
            }
        };
        for entry in 0..dim {
            let token = tokens.next().ok_or_else(|| {
                format!("row {} ends after {} of {} entries", signs.len() + 1, entry, dim)
            })?;
            data.push(parse_entry(token)?);
        }
        signs.push(sign);
    }

    let rows = signs.len();
    Ok(ConeProblem { dim, matrix: Matrix::from_flat(data, rows, dim), signs })
}

/// Parse a generator file: `n`, then one generator of `n` entries each.
pub fn parse_generators(text: &str) -> Result<GeneratorProblem, String> {
    let mut tokens = text.split_whitespace();
    let dim = parse_dimension(tokens.next())?;

    let mut generators = Vec::new();
    while let Some(first) = tokens.next() {
        let mut coords = Vec::with_capacity(dim);
        coords.push(parse_entry(first)?);
        while coords.len() < dim {
            let token = tokens.next().ok_or_else(|| {
                format!(
                    "generator {} ends after {} of {} entries",
                    generators.len() + 1,
                    coords.len(),
                    dim
                )
            })?;
            coords.push(parse_entry(token)?);
        }
        generators.push(Vector::from_coords(coords));
    }

    Ok(GeneratorProblem { dim, generators })
}

fn parse_dimension(token: Option<&str>) -> Result<usize, String> {
    let token = token.ok_or_else(|| "empty input, expected the dimension first".to_string())?;
    match token.parse::<usize>() {
        Ok(dim) if dim > 0 => Ok(dim),
        _ => Err(format!("invalid dimension '{token}'")),
    }
}

fn parse_entry(token: &str) -> Result<Integer, String> {
    let value: Integer = token.parse().map_err(|_| format!("invalid integer '{token}'"))?;
    if value.is_infinite() {
        return Err(format!("invalid integer '{token}'"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_constraint_rows() {
        let problem = parse_cone("3\neq 1 -1 0\nge 0 1 -1\n").unwrap();
        assert_eq!(problem.dim, 3);
        assert_eq!(problem.signs, vec![ConstraintSign::Equality, ConstraintSign::GreaterEqual]);
        assert_eq!(problem.matrix.dims(), (2, 3));
        assert_eq!(problem.matrix.get(0, 1), &Integer::from(-1));
        assert_eq!(problem.matrix.get(1, 2), &Integer::from(-1));
    }

    #[test]
    fn test_line_breaks_carry_no_meaning() {
        let split = parse_cone("2 ge 1\n-1").unwrap();
        assert_eq!(split.dim, 2);
        assert_eq!(split.signs, vec![ConstraintSign::GreaterEqual]);
        assert_eq!(split.matrix.get(0, 1), &Integer::from(-1));
    }

    #[test]
    fn test_constraint_file_may_have_no_rows() {
        let problem = parse_cone("4\n").unwrap();
        assert_eq!(problem.dim, 4);
        assert!(problem.signs.is_empty());
        assert_eq!(problem.matrix.dims(), (0, 4));
    }

    #[test]
    fn test_rejects_unknown_tag() {
        let err = parse_cone("2\nle 1 1").unwrap_err();
        assert!(err.contains("unknown tag 'le'"), "{err}");
    }

    #[test]
    fn test_rejects_truncated_row() {
        let err = parse_cone("3\nge 1 2").unwrap_err();
        assert_eq!(err, "row 1 ends after 2 of 3 entries");
    }

    #[test]
    fn test_rejects_bad_dimension() {
        assert!(parse_cone("").unwrap_err().contains("empty input"));
        assert!(parse_cone("0 ge 1").unwrap_err().contains("invalid dimension '0'"));
        assert!(parse_cone("x").unwrap_err().contains("invalid dimension 'x'"));
    }

    #[test]
    fn test_rejects_non_integer_entry() {
        let err = parse_cone("2\nge 1 x").unwrap_err();
        assert_eq!(err, "invalid integer 'x'");
        let err = parse_generators("2\n1 inf").unwrap_err();
        assert_eq!(err, "invalid integer 'inf'");
    }

    #[test]
    fn test_parses_generators() {
        let problem = parse_generators("2\n1 0\n1 2\n").unwrap();
        assert_eq!(problem.dim, 2);
        assert_eq!(problem.generators.len(), 2);
        assert_eq!(problem.generators[1].get(0), &Integer::from(1));
        assert_eq!(problem.generators[1].get(1), &Integer::from(2));
    }

    #[test]
    fn test_rejects_truncated_generator() {
        let err = parse_generators("3\n1 2").unwrap_err();
        assert_eq!(err, "generator 1 ends after 2 of 3 entries");
    }

    #[test]
    fn test_huge_entries_survive_parsing() {
        let digits = "123456789012345678901234567890";
        let problem = parse_generators(&format!("1\n{digits}\n")).unwrap();
        assert_eq!(problem.generators[0].get(0).to_string(), digits);
    }
}
