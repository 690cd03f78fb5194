//! Hand-rolled lexer for the `.crc` circuit description language.
use std::fmt;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Token {
    Circ,
    Inputs,
    Outputs,
    Ident(String),
    Bit(bool),
    LBrace,
    RBrace,
    LParen,
    RParen,
    Colon,
    Comma,
    Eq,
    And,
    Or,
    Xor,
    Not,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Circ => write!(f, "'circ'"),
            Token::Inputs => write!(f, "'inputs'"),
            Token::Outputs => write!(f, "'outputs'"),
            Token::Ident(name) => write!(f, "identifier '{}'", name),
            Token::Bit(b) => write!(f, "'{}'", if *b { 1 } else { 0 }),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Colon => write!(f, "':'"),
            Token::Comma => write!(f, "','"),
            Token::Eq => write!(f, "'='"),
            Token::And => write!(f, "'&'"),
            Token::Or => write!(f, "'|'"),
            Token::Xor => write!(f, "'^'"),
            Token::Not => write!(f, "'~'"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("{line}:{col}: unexpected character '{found}'")]
    UnexpectedChar { line: usize, col: usize, found: char },
}

/// Tokenizes `input`, skipping whitespace of any kind (newlines are not significant).
pub fn lex(input: &str) -> Result<Vec<SpannedToken>, LexError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    let mut line = 1usize;
    let mut col = 1usize;

    macro_rules! advance {
        () => {{
            let c = chars.next();
            match c {
                Some('\n') => {
                    line += 1;
                    col = 1;
                }
                Some(_) => col += 1,
                None => {}
            }
            c
        }};
    }

    while let Some(&c) = chars.peek() {
        let start = Span { line, col };
        if c.is_whitespace() {
            advance!();
            continue;
        }
        if c == '#' {
            while let Some(&c) = chars.peek() {
                if c == '\n' {
                    break;
                }
                advance!();
            }
            continue;
        }
        if c.is_ascii_digit() {
            advance!();
            match c {
                '0' => tokens.push(SpannedToken { token: Token::Bit(false), span: start }),
                '1' => tokens.push(SpannedToken { token: Token::Bit(true), span: start }),
                other => {
                    return Err(LexError::UnexpectedChar {
                        line: start.line,
                        col: start.col,
                        found: other,
                    })
                }
            }
            continue;
        }
        if c.is_alphabetic() || c == '_' {
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    name.push(c);
                    advance!();
                } else {
                    break;
                }
            }
            let token = match name.as_str() {
                "circ" => Token::Circ,
                "inputs" => Token::Inputs,
                "outputs" => Token::Outputs,
                _ => Token::Ident(name),
            };
            tokens.push(SpannedToken { token, span: start });
            continue;
        }

        let token = match c {
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ':' => Token::Colon,
            ',' => Token::Comma,
            '=' => Token::Eq,
            '&' => Token::And,
            '|' => Token::Or,
            '^' => Token::Xor,
            '~' => Token::Not,
            other => {
                advance!();
                return Err(LexError::UnexpectedChar {
                    line: start.line,
                    col: start.col,
                    found: other,
                });
            }
        };
        advance!();
        tokens.push(SpannedToken { token, span: start });
    }

    tokens.push(SpannedToken {
        token: Token::Eof,
        span: Span { line, col },
    });
    Ok(tokens)
}
