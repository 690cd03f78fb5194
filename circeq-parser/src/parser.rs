//! Recursive-descent parser producing a validated [`circeq_circuit::Circuit`].
//!
//! Grammar (highest precedence first): `~` binds tighter than `&`, which binds tighter than
//! `^`, which binds tighter than `|`; all binary operators are left-associative.
//!
//! ```text
//! circuit  ::= 'circ' NAME '{' inputs outputs body '}'
//! inputs   ::= 'inputs' ':' varlist
//! outputs  ::= 'outputs' ':' varlist
//! varlist  ::= NAME (',' NAME)*
//! body     ::= (NAME '=' expr)*
//! expr     ::= esop ('|' esop)*
//! esop     ::= minterm ('^' minterm)*
//! minterm  ::= literal ('&' literal)*
//! literal  ::= '~' primary | primary
//! primary  ::= '0' | '1' | NAME | '(' expr ')'
//! ```
use circeq_circuit::{Arena, BinOp, Circuit, CircuitError, NodeId};

use crate::lexer::{lex, LexError, Span, SpannedToken, Token};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("{line}:{col}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        col: usize,
        expected: String,
        found: Token,
    },

    #[error(transparent)]
    InvalidCircuit(#[from] CircuitError),
}

pub fn parse(input: &str) -> Result<Circuit, ParseError> {
    let tokens = lex(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        arena: Arena::new(),
    };
    parser.parse_circuit()
}

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    arena: Arena,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].token.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), ParseError> {
        if self.peek() == expected {
            self.bump();
            Ok(())
        } else {
            let span = self.span();
            Err(ParseError::UnexpectedToken {
                line: span.line,
                col: span.col,
                expected: what.to_string(),
                found: self.peek().clone(),
            })
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek().clone() {
            Token::Ident(name) => {
                self.bump();
                Ok(name)
            }
            found => {
                let span = self.span();
                Err(ParseError::UnexpectedToken {
                    line: span.line,
                    col: span.col,
                    expected: "an identifier".to_string(),
                    found,
                })
            }
        }
    }

    fn parse_circuit(&mut self) -> Result<Circuit, ParseError> {
        self.expect(&Token::Circ, "'circ'")?;
        let name = self.expect_ident()?;
        self.expect(&Token::LBrace, "'{'")?;

        self.expect(&Token::Inputs, "'inputs'")?;
        self.expect(&Token::Colon, "':'")?;
        let inputs = self.parse_varlist()?;

        self.expect(&Token::Outputs, "'outputs'")?;
        self.expect(&Token::Colon, "':'")?;
        let outputs = self.parse_varlist()?;

        let mut equations = Vec::new();
        loop {
            match self.peek() {
                Token::Ident(_) => {
                    let lhs = self.expect_ident()?;
                    self.expect(&Token::Eq, "'='")?;
                    let rhs = self.parse_expr()?;
                    equations.push((lhs, rhs));
                }
                _ => break,
            }
        }

        self.expect(&Token::RBrace, "'}'")?;
        self.expect(&Token::Eof, "end of input")?;

        let arena = std::mem::take(&mut self.arena);
        Ok(Circuit::new(name, inputs, outputs, equations, arena)?)
    }

    fn parse_varlist(&mut self) -> Result<Vec<String>, ParseError> {
        let mut names = vec![self.expect_ident()?];
        while *self.peek() == Token::Comma {
            self.bump();
            names.push(self.expect_ident()?);
        }
        Ok(names)
    }

    fn parse_expr(&mut self) -> Result<NodeId, ParseError> {
        let mut lhs = self.parse_esop()?;
        while *self.peek() == Token::Or {
            self.bump();
            let rhs = self.parse_esop()?;
            lhs = self.arena.bin(BinOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_esop(&mut self) -> Result<NodeId, ParseError> {
        let mut lhs = self.parse_minterm()?;
        while *self.peek() == Token::Xor {
            self.bump();
            let rhs = self.parse_minterm()?;
            lhs = self.arena.bin(BinOp::Xor, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_minterm(&mut self) -> Result<NodeId, ParseError> {
        let mut lhs = self.parse_literal()?;
        while *self.peek() == Token::And {
            self.bump();
            let rhs = self.parse_literal()?;
            lhs = self.arena.bin(BinOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_literal(&mut self) -> Result<NodeId, ParseError> {
        if *self.peek() == Token::Not {
            self.bump();
            let child = self.parse_primary()?;
            Ok(self.arena.not(child))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<NodeId, ParseError> {
        match self.peek().clone() {
            Token::Bit(value) => {
                self.bump();
                Ok(self.arena.literal(value))
            }
            Token::Ident(name) => {
                self.bump();
                Ok(self.arena.variable(name))
            }
            Token::LParen => {
                self.bump();
                let node = self.parse_expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(node)
            }
            found => {
                let span = self.span();
                Err(ParseError::UnexpectedToken {
                    line: span.line,
                    col: span.col,
                    expected: "a literal, identifier, or '('".to_string(),
                    found,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parses_full_adder() {
        let src = "circ full_adder {
            inputs: a, b, cin
            outputs: s, cout
            s0 = a ^ b
            s = s0 ^ cin
            s1 = a & b
            s2 = s0 & cin
            cout = s1 | s2
        }";
        let circuit = parse(src).unwrap();
        assert_eq!(circuit.name(), "full_adder");
        for bits in 0..8u8 {
            let a = bits & 1 != 0;
            let b = bits & 2 != 0;
            let cin = bits & 4 != 0;
            let inputs = HashMap::from([
                ("a".to_string(), a),
                ("b".to_string(), b),
                ("cin".to_string(), cin),
            ]);
            let out = circuit.simulate(&inputs).unwrap();
            assert_eq!(out[&"s".to_string()], a ^ b ^ cin);
            assert_eq!(out[&"cout".to_string()], (a && b) || (cin && (a ^ b)));
        }
    }

    #[test]
    fn precedence_matches_and_over_xor_over_or() {
        let src = "circ t { inputs: a, b, c outputs: y y = a | b ^ c & ~a }";
        let circuit = parse(src).unwrap();
        let inputs = HashMap::from([
            ("a".to_string(), false),
            ("b".to_string(), false),
            ("c".to_string(), true),
        ]);
        // y = a | (b ^ (c & ~a)) = false | (false ^ (true & true)) = true
        let out = circuit.simulate(&inputs).unwrap();
        assert_eq!(out[&"y".to_string()], true);
    }

    #[test]
    fn parenthesized_expressions_override_precedence() {
        let src = "circ t { inputs: a, b outputs: y y = (a | b) & 0 }";
        let circuit = parse(src).unwrap();
        let inputs = HashMap::from([("a".to_string(), true), ("b".to_string(), false)]);
        let out = circuit.simulate(&inputs).unwrap();
        assert_eq!(out[&"y".to_string()], false);
    }

    #[test]
    fn reports_line_and_column_on_syntax_error() {
        let src = "circ t { inputs: a outputs: y y = }";
        let err = parse(src).unwrap_err();
        match err {
            ParseError::UnexpectedToken { line, .. } => assert_eq!(line, 1),
            other => panic!("expected UnexpectedToken, got {:?}", other),
        }
    }

    #[test]
    fn surfaces_circuit_validation_errors() {
        let src = "circ t { inputs: a outputs: y y = ghost }";
        let err = parse(src).unwrap_err();
        assert!(matches!(err, ParseError::InvalidCircuit(CircuitError::UndefinedSignal(_))));
    }
}
