//! Tokenizing BLITZ assembly.
//!
//! The lexer is line oriented: `Newline` is a token, and comments run from `!` to
//! the end of the line. Register names are lexed as identifiers and classified
//! by the parser, so a label can never collide with a register token.

use logos::{Lexer, Logos};

/// A unit of BLITZ source text.
#[derive(Clone, Debug, Logos, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"![^\n]*")]
#[logos(error = LexErr)]
pub enum Token {
    /// An unsigned integer literal: decimal or `0x` hexadecimal.
    #[regex(r"[0-9][0-9A-Za-z_]*", lex_integer)]
    Integer(u32),

    /// A character literal such as `'a'` or `'\n'`.
    #[regex(r"'([^'\\\n]|\\[^\n])'", lex_char)]
    Char(u8),

    /// A string literal.
    #[token("\"", lex_string)]
    String(String),

    /// A label, mnemonic or register name.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lx| lx.slice().to_string())]
    Ident(String),

    /// A directive such as `.text`, without the dot.
    #[regex(r"\.[A-Za-z_][A-Za-z0-9_]*", |lx| lx.slice()[1..].to_string())]
    Directive(String),

    /// `,`
    #[token(",")]
    Comma,
    /// `:` after a label
    #[token(":")]
    Colon,
    /// `=` in an equate
    #[token("=")]
    Equals,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `++` post-increment
    #[token("++")]
    PlusPlus,
    /// `--` pre-decrement
    #[token("--")]
    MinusMinus,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,

    /// End of a source line.
    #[token("\n")]
    Newline,
}

/// Errors raised while tokenizing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LexErr {
    /// A numeric literal with digits invalid for its radix.
    InvalidNumber,
    /// A numeric literal wider than 32 bits.
    NumberTooLarge,
    /// An unknown escape in a character or string literal.
    InvalidEscape,
    /// A string literal missing its closing quote.
    UnclosedString,
    /// A character that starts no token.
    #[default]
    InvalidSymbol,
}

impl std::fmt::Display for LexErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErr::InvalidNumber => f.write_str("invalid numeric literal"),
            LexErr::NumberTooLarge => f.write_str("numeric literal does not fit in 32 bits"),
            LexErr::InvalidEscape => f.write_str("invalid escape sequence"),
            LexErr::UnclosedString => f.write_str("unclosed string literal"),
            LexErr::InvalidSymbol => f.write_str("unrecognized character"),
        }
    }
}

impl std::error::Error for LexErr {}

fn lex_integer(lx: &Lexer<'_, Token>) -> Result<u32, LexErr> {
    let text = lx.slice();
    let (digits, radix) = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (text, 10),
    };
    u32::from_str_radix(digits, radix).map_err(|e| match e.kind() {
        std::num::IntErrorKind::PosOverflow => LexErr::NumberTooLarge,
        _ => LexErr::InvalidNumber,
    })
}

fn escape(c: u8) -> Result<u8, LexErr> {
    Ok(match c {
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'0' => 0,
        b'a' => 0x07,
        b'b' => 0x08,
        b'f' => 0x0C,
        b'v' => 0x0B,
        b'\\' => b'\\',
        b'\'' => b'\'',
        b'"' => b'"',
        _ => return Err(LexErr::InvalidEscape),
    })
}

fn lex_char(lx: &Lexer<'_, Token>) -> Result<u8, LexErr> {
    let inner = &lx.slice().as_bytes()[1..lx.slice().len() - 1];
    match inner {
        [b'\\', c] => escape(*c),
        [c] => Ok(*c),
        _ => Err(LexErr::InvalidSymbol),
    }
}

fn lex_string(lx: &mut Lexer<'_, Token>) -> Result<String, LexErr> {
    let rest = lx.remainder().as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    loop {
        match rest.get(i) {
            None | Some(b'\n') => {
                lx.bump(i);
                return Err(LexErr::UnclosedString);
            }
            Some(b'"') => {
                lx.bump(i + 1);
                break;
            }
            Some(b'\\') => {
                let Some(&c) = rest.get(i + 1).filter(|c| **c != b'\n') else {
                    lx.bump(i + 1);
                    return Err(LexErr::UnclosedString);
                };
                out.push(escape(c)?);
                i += 2;
            }
            Some(&c) => {
                out.push(c);
                i += 1;
            }
        }
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Tokenizes one source file into per-line token vectors.
///
/// # Returns
///
/// One entry per source line: the 1-based line number and its tokens, or the
/// first lexical error on that line.
pub fn tokenize(source: &str) -> Vec<(u32, Result<Vec<Token>, LexErr>)> {
    let mut lines = Vec::new();
    let mut current: Result<Vec<Token>, LexErr> = Ok(Vec::new());
    let mut line = 1u32;
    for token in Token::lexer(source) {
        match token {
            Ok(Token::Newline) => {
                let done = std::mem::replace(&mut current, Ok(Vec::new()));
                lines.push((line, done));
                line += 1;
            }
            Ok(tok) => {
                if let Ok(tokens) = current.as_mut() {
                    tokens.push(tok);
                }
            }
            Err(err) => {
                if current.is_ok() {
                    current = Err(err);
                }
            }
        }
    }
    if !matches!(&current, Ok(tokens) if tokens.is_empty()) {
        lines.push((line, current));
    }
    lines
}
