//! DIMACS CNF reader and writer.
//!
//! Line 1 of the format is `p cnf <max_var_id> <num_clauses>`; each following line is a
//! whitespace-separated list of signed integer literals terminated by `0`. This crate implements
//! both directions: an incremental byte-at-a-time parser (so large instances need not be held as
//! a single string) and a writer.
use std::{borrow::Borrow, io, mem::replace};

use anyhow::Error;
use thiserror::Error;

use circeq_formula::{cnf::CnfFormula, lit::Lit, lit::Var};

/// Possible errors while parsing a DIMACS CNF formula.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {line}: unexpected character in DIMACS CNF input: '{unexpected}'")]
    UnexpectedInput { line: usize, unexpected: char },
    #[error("line {line}: literal index is too large: {index}{final_digit}...")]
    LiteralTooLarge {
        line: usize,
        index: usize,
        final_digit: usize,
    },
    #[error("line {line}: invalid header syntax: {header}")]
    InvalidHeader { line: usize, header: String },
    #[error("line {line}: unterminated clause")]
    UnterminatedClause { line: usize },
    #[error("formula has {var_count} variables while the header specifies {header_var_count}")]
    VarCount {
        var_count: usize,
        header_var_count: usize,
    },
    #[error("formula has {clause_count} clauses while the header specifies {header_clause_count}")]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
    #[error("parser invoked after a previous error")]
    PreviousError,
}

/// Variable and clause count present in a DIMACS CNF header.
#[derive(Copy, Clone, Debug)]
pub struct DimacsHeader {
    pub max_var_id: usize,
    pub clause_count: usize,
}

/// Incremental parser for DIMACS CNF input.
#[derive(Default)]
pub struct DimacsParser {
    formula: CnfFormula,
    partial_clause: Vec<Lit>,
    header: Option<DimacsHeader>,

    line_number: usize,
    clause_count: usize,
    partial_lit: usize,
    negate_next_lit: bool,

    in_lit: bool,
    in_comment_or_header: bool,
    in_header: bool,
    start_of_line: bool,
    error: bool,

    header_line: Vec<u8>,
}

impl DimacsParser {
    /// Creates a new parser.
    pub fn new() -> DimacsParser {
        DimacsParser {
            line_number: 1,
            start_of_line: true,
            ..DimacsParser::default()
        }
    }

    /// Parses the given input in one call, checking the header if present.
    pub fn parse(input: impl io::Read) -> Result<CnfFormula, Error> {
        Ok(Self::parse_incremental(input, |_| Ok(()))?.take_formula())
    }

    /// Parses the given input incrementally, invoking `callback` after each chunk.
    ///
    /// The callback can drain the formula built so far by calling
    /// [`take_formula`](DimacsParser::take_formula).
    pub fn parse_incremental(
        input: impl io::Read,
        mut callback: impl FnMut(&mut DimacsParser) -> Result<(), Error>,
    ) -> Result<DimacsParser, Error> {
        use io::BufRead;

        let mut buffer = io::BufReader::new(input);
        let mut parser = Self::new();

        loop {
            let data = buffer.fill_buf()?;
            if data.is_empty() {
                break;
            }
            parser.parse_chunk(data)?;
            let len = data.len();
            buffer.consume(len);

            callback(&mut parser)?;
        }
        parser.eof()?;
        callback(&mut parser)?;
        parser.check_header()?;

        Ok(parser)
    }

    /// Parses a chunk of input. Call [`eof`](DimacsParser::eof) after the last chunk.
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), ParserError> {
        if self.error {
            return Err(ParserError::PreviousError);
        }
        for &byte in chunk {
            if byte == b'\n' {
                self.line_number += 1;
            }
            match byte {
                b'\n' | b'\r' if self.in_comment_or_header => {
                    if self.in_header {
                        self.in_header = false;
                        self.parse_header_line()?;
                    }
                    self.in_comment_or_header = false;
                    self.start_of_line = true;
                }
                _ if self.in_comment_or_header => {
                    if self.in_header {
                        self.header_line.push(byte);
                    }
                }
                b'0'..=b'9' => {
                    self.in_lit = true;
                    let digit = (byte - b'0') as usize;

                    const CAN_OVERFLOW: usize = Var::max_count() / 10;
                    const OVERFLOW_DIGIT: usize = Var::max_count() % 10;

                    if CAN_OVERFLOW <= self.partial_lit {
                        let carry = (digit <= OVERFLOW_DIGIT) as usize;
                        if CAN_OVERFLOW + carry <= self.partial_lit {
                            self.error = true;
                            return Err(ParserError::LiteralTooLarge {
                                line: self.line_number,
                                index: self.partial_lit,
                                final_digit: digit,
                            });
                        }
                    }

                    self.partial_lit = self.partial_lit * 10 + digit;
                    self.start_of_line = false;
                }
                b'-' if !self.negate_next_lit && !self.in_lit => {
                    self.negate_next_lit = true;
                    self.start_of_line = false;
                }
                b' ' | b'\n' | b'\r' if !self.negate_next_lit || self.in_lit => {
                    self.finish_literal();
                    self.negate_next_lit = false;
                    self.in_lit = false;
                    self.partial_lit = 0;
                    self.start_of_line = byte != b' ';
                }
                b'c' if self.start_of_line => {
                    self.in_comment_or_header = true;
                }
                b'p' if self.start_of_line && self.header.is_none() => {
                    self.in_comment_or_header = true;
                    self.in_header = true;
                    self.header_line.push(b'p');
                }
                _ => {
                    self.error = true;
                    return Err(ParserError::UnexpectedInput {
                        line: self.line_number,
                        unexpected: byte as char,
                    });
                }
            }
        }
        Ok(())
    }

    /// Finishes parsing; does not check the header, call [`check_header`](Self::check_header) too.
    pub fn eof(&mut self) -> Result<(), ParserError> {
        if self.in_header {
            self.parse_header_line()?;
        }
        self.finish_literal();

        if !self.partial_clause.is_empty() {
            return Err(ParserError::UnterminatedClause {
                line: self.line_number,
            });
        }
        Ok(())
    }

    /// Verifies the header against what was actually parsed, if a header was present.
    pub fn check_header(&self) -> Result<(), ParserError> {
        if let Some(header) = self.header {
            let var_count = self.formula.max_var_id();
            if var_count != header.max_var_id {
                return Err(ParserError::VarCount {
                    var_count,
                    header_var_count: header.max_var_id,
                });
            }
            if self.clause_count != header.clause_count {
                return Err(ParserError::ClauseCount {
                    clause_count: self.clause_count,
                    header_clause_count: header.clause_count,
                });
            }
        }
        Ok(())
    }

    /// Drains everything parsed since the last call to this method into a fresh `CnfFormula`.
    pub fn take_formula(&mut self) -> CnfFormula {
        replace(&mut self.formula, CnfFormula::new())
    }

    pub fn header(&self) -> Option<DimacsHeader> {
        self.header
    }

    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    fn finish_literal(&mut self) {
        if self.in_lit {
            if self.partial_lit == 0 {
                self.formula.add_clause(self.partial_clause.drain(..));
                self.clause_count += 1;
            } else {
                self.partial_clause
                    .push(Var::from_dimacs(self.partial_lit as isize).lit(!self.negate_next_lit));
            }
        }
    }

    fn parse_header_line(&mut self) -> Result<(), ParserError> {
        let header_line = String::from_utf8_lossy(&self.header_line).into_owned();

        if !header_line.starts_with("p ") {
            return self.invalid_header(header_line);
        }

        let mut header_values = header_line[2..].split_whitespace();

        if header_values.next() != Some("cnf") {
            return self.invalid_header(header_line);
        }

        let max_var_id: usize = match header_values.next().and_then(|v| v.parse().ok()) {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if max_var_id > Var::max_count() {
            self.error = true;
            return Err(ParserError::LiteralTooLarge {
                line: self.line_number,
                index: max_var_id / 10,
                final_digit: max_var_id % 10,
            });
        }

        let clause_count: usize = match header_values.next().and_then(|v| v.parse().ok()) {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if header_values.next().is_some() {
            return self.invalid_header(header_line);
        }

        self.header = Some(DimacsHeader {
            max_var_id,
            clause_count,
        });

        Ok(())
    }

    fn invalid_header(&mut self, header_line: String) -> Result<(), ParserError> {
        self.error = true;
        Err(ParserError::InvalidHeader {
            line: self.line_number,
            header: header_line,
        })
    }
}

/// Writes a DIMACS CNF header.
pub fn write_dimacs_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {max_var_id} {clause_count}",
        max_var_id = header.max_var_id,
        clause_count = header.clause_count,
    )
}

/// Writes an iterator of clauses as headerless DIMACS CNF.
pub fn write_dimacs_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses {
        for lit in clause {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Writes a whole formula as DIMACS CNF, header included.
pub fn write_dimacs(target: &mut impl io::Write, formula: &CnfFormula) -> io::Result<()> {
    write_dimacs_header(
        &mut *target,
        DimacsHeader {
            max_var_id: formula.max_var_id(),
            clause_count: formula.len(),
        },
    )?;
    write_dimacs_clauses(&mut *target, formula.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_whitespace() -> Result<(), Error> {
        let parsed = DimacsParser::parse(
            b"p  cnf  4   3  \n  1  \n 2  3\n0 -4 0 2\nccomment  \n\n0\n\n" as &[_],
        )?;

        let mut expected = CnfFormula::new();
        expected.add_clause([Lit::from_dimacs(1), Lit::from_dimacs(2), Lit::from_dimacs(3)]);
        expected.add_clause([Lit::from_dimacs(-4)]);
        expected.add_clause([Lit::from_dimacs(2)]);

        assert_eq!(parsed, expected);
        Ok(())
    }

    #[test]
    fn invalid_headers() {
        assert!(DimacsParser::parse(b"pcnf 1 3" as &[_]).is_err());
        assert!(DimacsParser::parse(b"p notcnf 1 3" as &[_]).is_err());
        assert!(DimacsParser::parse(b"p cnf 1" as &[_]).is_err());
        assert!(DimacsParser::parse(b"p cnf 1 2 3" as &[_]).is_err());
    }

    #[test]
    fn mismatched_header_counts_are_rejected() {
        let err = DimacsParser::parse(b"p cnf 3 2\n1 0\n" as &[_]);
        assert!(err.is_err());
    }

    #[test]
    fn write_then_parse_roundtrip() {
        let mut formula = CnfFormula::new();
        formula.add_clause([Lit::from_dimacs(1), Lit::from_dimacs(-2)]);
        formula.add_clause([Lit::from_dimacs(2), Lit::from_dimacs(3)]);
        formula.add_clause([Lit::from_dimacs(-3)]);

        let mut buf = Vec::new();
        write_dimacs(&mut buf, &formula).unwrap();

        let parsed = DimacsParser::parse(&buf[..]).unwrap();
        assert_eq!(parsed, formula);
    }

    #[test]
    fn header_reports_correct_counts() {
        let mut formula = CnfFormula::new();
        formula.add_clause([Lit::from_dimacs(1), Lit::from_dimacs(5)]);

        let mut buf = Vec::new();
        write_dimacs(&mut buf, &formula).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().next(), Some("p cnf 5 1"));
    }

    use proptest::{prelude::*, *};

    proptest! {
        // Property 8: a CNF formula written to DIMACS and read back by the parser is unchanged.
        #[test]
        fn write_then_parse_roundtrips_for_any_formula(
            clauses in collection::vec(
                collection::vec(1isize..50, 1..6).prop_flat_map(|indices| {
                    collection::vec(any::<bool>(), indices.len())
                        .prop_map(move |signs| {
                            indices
                                .iter()
                                .zip(signs)
                                .map(|(&i, positive)| Lit::from_dimacs(if positive { i } else { -i }))
                                .collect::<Vec<_>>()
                        })
                }),
                0..20,
            ),
        ) {
            let mut formula = CnfFormula::new();
            for clause in &clauses {
                formula.add_clause(clause.clone());
            }

            let mut buf = Vec::new();
            write_dimacs(&mut buf, &formula).unwrap();

            let parsed = DimacsParser::parse(&buf[..]).unwrap();
            prop_assert_eq!(parsed, formula);
        }
    }
}
