use itertools::Itertools;
use std::str::{Lines, SplitWhitespace};
use thiserror::Error;

/// Errors raised while decoding an input record. All variants describe a
/// malformed record; none of them leave any device-visible state behind.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("line {line}: missing record line tagged '{expected}'")]
    MissingLine { line: usize, expected: &'static str },
    #[error("line {line}: expected tag '{expected}', found '{found}'")]
    UnexpectedTag {
        line: usize,
        expected: &'static str,
        found: String,
    },
    #[error("line {line}: cannot parse '{token}' as a number")]
    BadValue { line: usize, token: String },
    #[error("matrix {tag} carries {found} values, dimensions require {expected}")]
    LengthMismatch {
        tag: &'static str,
        found: usize,
        expected: usize,
    },
    #[error("matrix {tag} dimensions overflow ({rows} x {cols})")]
    DimensionOverflow {
        tag: &'static str,
        rows: usize,
        cols: usize,
    },
    #[error("line {line}: blank line, expected a record line tagged '{expected}'")]
    UntaggedLine { line: usize, expected: &'static str },
}

/// Matrix dimensions for one run: A is `m x k`, B is `k x n`, C is `m x n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    pub m: usize,
    pub k: usize,
    pub n: usize,
}

impl Dims {
    pub fn a_len(&self) -> usize {
        self.m * self.k
    }

    pub fn b_len(&self) -> usize {
        self.k * self.n
    }

    pub fn c_len(&self) -> usize {
        self.m * self.n
    }
}

/// One parsed test vector: dimensions plus the two row-major input matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRecord {
    pub dims: Dims,
    pub a: Vec<f64>,
    pub b: Vec<f64>,
}

impl InputRecord {
    /// Parses the five fixed-order tagged lines `M`, `K`, `N`, `A`, `B`.
    ///
    /// The `A` and `B` sequences must carry exactly `m*k` and `k*n` values.
    /// All three dimension products are checked here, so dimensions a record
    /// can express but the harness cannot address are rejected at parse time.
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        let mut lines = text.lines();
        let m = dim_line(&mut lines, 1, "M")?;
        let k = dim_line(&mut lines, 2, "K")?;
        let n = dim_line(&mut lines, 3, "N")?;
        let a_len = dim_product("A", m, k)?;
        let b_len = dim_product("B", k, n)?;
        dim_product("C", m, n)?;
        let a = matrix_line(&mut lines, 4, "A", a_len)?;
        let b = matrix_line(&mut lines, 5, "B", b_len)?;
        Ok(Self {
            dims: Dims { m, k, n },
            a,
            b,
        })
    }
}

/// Serializes a result matrix as a single `C`-tagged line.
pub fn write_result(c: &[i64]) -> String {
    if c.is_empty() {
        return "C\n".to_string();
    }
    format!("C {}\n", c.iter().join(" "))
}

/// Consumes one line, checks its tag, and returns the remaining tokens.
fn values<'a>(
    lines: &mut Lines<'a>,
    line: usize,
    expected: &'static str,
) -> Result<SplitWhitespace<'a>, CodecError> {
    let raw = lines
        .next()
        .ok_or(CodecError::MissingLine { line, expected })?;
    let mut tokens = raw.split_whitespace();
    match tokens.next() {
        Some(tag) if tag == expected => Ok(tokens),
        Some(tag) => Err(CodecError::UnexpectedTag {
            line,
            expected,
            found: tag.to_string(),
        }),
        None => Err(CodecError::UntaggedLine { line, expected }),
    }
}

fn dim_product(tag: &'static str, rows: usize, cols: usize) -> Result<usize, CodecError> {
    rows.checked_mul(cols)
        .ok_or(CodecError::DimensionOverflow { tag, rows, cols })
}

fn dim_line(lines: &mut Lines<'_>, line: usize, expected: &'static str) -> Result<usize, CodecError> {
    let mut tokens = values(lines, line, expected)?;
    let token = tokens
        .next()
        .ok_or(CodecError::MissingLine { line, expected })?;
    token.parse().map_err(|_| CodecError::BadValue {
        line,
        token: token.to_string(),
    })
}

fn matrix_line(
    lines: &mut Lines<'_>,
    line: usize,
    tag: &'static str,
    expected_len: usize,
) -> Result<Vec<f64>, CodecError> {
    let tokens = values(lines, line, tag)?;
    let parsed: Result<Vec<f64>, CodecError> = tokens
        .map(|token| {
            token.parse().map_err(|_| CodecError::BadValue {
                line,
                token: token.to_string(),
            })
        })
        .collect();
    let parsed = parsed?;
    if parsed.len() != expected_len {
        return Err(CodecError::LengthMismatch {
            tag,
            found: parsed.len(),
            expected: expected_len,
        });
    }
    Ok(parsed)
}
