//! DIMACS CNF parser and writer for the satori SAT solver.

use std::{borrow::Borrow, io, mem::replace};

use satori_formula::{CnfFormula, Lit, Var};

use anyhow::Error;
use thiserror::Error;

/// Errors encountered while parsing DIMACS CNF input.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {line}: unexpected character in DIMACS CNF input: '{unexpected}'")]
    UnexpectedInput { line: usize, unexpected: char },
    #[error("line {line}: literal index is too large: {value}...")]
    LiteralTooLarge { line: usize, value: usize },
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

/// Variable and clause counts of a `p cnf` header line.
#[derive(Copy, Clone, Debug)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// Streaming parser for DIMACS CNF files.
///
/// Input can be fed in arbitrary chunks, and the clauses parsed so far can be taken out between
/// chunks, so neither the input nor the complete formula has to be held in memory at once.
///
/// A clause is emitted for each terminating `0` token, including explicit empty clauses. Input
/// that ends without a final `0` is rejected as an unterminated clause.
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
    /// Create a parser with no input consumed yet.
    pub fn new() -> DimacsParser {
        DimacsParser {
            formula: CnfFormula::new(),
            partial_clause: vec![],
            header: None,

            line_number: 1,
            clause_count: 0,
            partial_lit: 0,
            negate_next_lit: false,

            in_lit: false,
            in_comment_or_header: false,
            in_header: false,
            start_of_line: true,
            error: false,

            header_line: vec![],
        }
    }

    /// Parse the whole input into a single formula, checking the header if present.
    pub fn parse(input: impl io::Read) -> Result<CnfFormula, Error> {
        Ok(Self::parse_incremental(input, |_| Ok(()))?.take_formula())
    }

    /// Parse the input in chunks, checking the header if present.
    ///
    /// The callback runs after every chunk and after the end of the input. It can drain the
    /// clauses parsed so far by calling [`take_formula`](DimacsParser::take_formula) on its
    /// argument.
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

    /// Parse one chunk of input.
    ///
    /// Call [`eof`](DimacsParser::eof) after the last chunk. When this method returns an error the
    /// parser state is invalid and further chunks cannot be parsed.
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), ParserError> {
        if self.error {
            return Err(ParserError::PreviousError);
        }
        for &byte in chunk.iter() {
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
                    self.start_of_line = true
                }
                _ if self.in_comment_or_header => {
                    if self.in_header {
                        self.header_line.push(byte);
                    }
                }
                b'0'..=b'9' => {
                    self.in_lit = true;
                    self.partial_lit = self.partial_lit * 10 + (byte - b'0') as usize;

                    // Erroring as soon as the value leaves the variable range keeps the
                    // accumulator far away from overflowing.
                    if self.partial_lit > Var::max_count() {
                        self.error = true;
                        return Err(ParserError::LiteralTooLarge {
                            line: self.line_number,
                            value: self.partial_lit,
                        });
                    }

                    self.start_of_line = false
                }
                b'-' if !self.negate_next_lit && !self.in_lit => {
                    self.negate_next_lit = true;
                    self.start_of_line = false
                }
                b' ' | b'\t' | b'\n' | b'\r' if !self.negate_next_lit || self.in_lit => {
                    self.finish_literal();
                    self.negate_next_lit = false;
                    self.in_lit = false;
                    self.partial_lit = 0;
                    self.start_of_line = byte == b'\n' || byte == b'\r';
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

    /// Finish parsing.
    ///
    /// Header counts are not verified here, use [`check_header`](DimacsParser::check_header).
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

    /// Verify the header counts against the parsed formula.
    ///
    /// Does nothing when the input had no header.
    pub fn check_header(&self) -> Result<(), ParserError> {
        if let Some(header) = self.header {
            let var_count = self.formula.var_count();
            if var_count != header.var_count {
                return Err(ParserError::VarCount {
                    var_count,
                    header_var_count: header.var_count,
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

    /// Take everything parsed since the last call to this method as a formula.
    ///
    /// Calling this once after [`eof`](DimacsParser::eof) yields the whole input as one formula.
    /// For incremental processing it can be called between chunks instead.
    ///
    /// The variable count of the returned formula is the maximum seen so far, including the header
    /// if present.
    pub fn take_formula(&mut self) -> CnfFormula {
        let mut new_formula = CnfFormula::new();
        new_formula.set_var_count(self.formula.var_count());
        replace(&mut self.formula, new_formula)
    }

    /// The header data, when the input had a header.
    pub fn header(&self) -> Option<DimacsHeader> {
        self.header
    }

    /// Number of clauses parsed so far.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Number of variables in the formula parsed so far.
    pub fn var_count(&self) -> usize {
        self.formula.var_count()
    }

    fn finish_literal(&mut self) {
        if self.in_lit {
            if self.partial_lit == 0 {
                self.formula.add_clause(&self.partial_clause);
                self.partial_clause.clear();
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

        let var_count: usize = match header_values.next().and_then(|value| value.parse().ok()) {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if var_count > Var::max_count() {
            self.error = true;
            return Err(ParserError::LiteralTooLarge {
                line: self.line_number,
                value: var_count,
            });
        }

        let clause_count: usize = match header_values.next().and_then(|value| value.parse().ok()) {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if header_values.next().is_some() {
            return self.invalid_header(header_line);
        }

        self.header = Some(DimacsHeader {
            var_count,
            clause_count,
        });

        self.formula.set_var_count(var_count);

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

/// Write a DIMACS CNF header line.
///
/// Combine with [`write_dimacs_clauses`] for incremental writing.
pub fn write_dimacs_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {} {}",
        header.var_count, header.clause_count
    )
}

/// Write an iterator of clauses as headerless DIMACS CNF.
///
/// Combine with [`write_dimacs_header`] for incremental writing.
pub fn write_dimacs_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses.into_iter() {
        for lit in clause.into_iter() {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write a whole formula as DIMACS CNF, header included.
pub fn write_dimacs(target: &mut impl io::Write, formula: &CnfFormula) -> io::Result<()> {
    write_dimacs_header(
        &mut *target,
        DimacsHeader {
            var_count: formula.var_count(),
            clause_count: formula.len(),
        },
    )?;
    write_dimacs_clauses(&mut *target, formula.iter())
}
