//! Line parser.
//!
//! Turns the token vector of one source line into a `Line`: an optional label and
//! an optional statement. Operand shapes are kept syntactic here; the code
//! generator decides which instruction format a shape selects.

use super::expr::{BinOp, Expr};
use super::lex::Token;

/// A register reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg {
    /// Integer register `r0`..`r15`.
    Int(u8),
    /// Floating register `f0`..`f15`.
    Float(u8),
}

/// The second half of `ra+x` forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Index {
    /// No index: `[ra]`.
    None,
    /// A register index: `[ra+rb]`.
    Reg(u8),
    /// A displacement: `[ra+expr]`.
    Expr(Expr),
}

/// One instruction operand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    /// A bare register.
    Reg(Reg),
    /// A bare expression.
    Expr(Expr),
    /// `ra+rb` or `ra+expr` outside brackets (jump targets, `syscall`).
    Sum(u8, Index),
    /// `[ra]`, `[ra+rb]` or `[ra+expr]`.
    Mem(u8, Index),
    /// `[--ra]`.
    PreDec(u8),
    /// `[ra++]`.
    PostInc(u8),
}

/// An assembler directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    /// `.text`
    Text,
    /// `.data`
    Data,
    /// `.bss`
    Bss,
    /// `.export name, ...`
    Export(Vec<String>),
    /// `.import name, ...`
    Import(Vec<String>),
    /// `.word expr`
    Word(Expr),
    /// `.byte expr`
    Byte(Expr),
    /// `.ascii "text"`
    Ascii(Vec<u8>),
    /// `.skip expr`
    Skip(Expr),
    /// `.align`
    Align,
}

/// The statement part of a line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    /// A directive.
    Directive(Directive),
    /// `name = expr`.
    Equate(String, Expr),
    /// A mnemonic with its operands.
    Instruction(String, Vec<Operand>),
}

/// One parsed source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    /// 1-based source line.
    pub number: u32,
    /// Label defined on this line.
    pub label: Option<String>,
    /// Statement, if any.
    pub statement: Option<Statement>,
}

/// Parses a register name.
pub fn register(name: &str) -> Option<Reg> {
    let (kind, digits) = name.split_at_checked(1)?;
    if digits.is_empty() || (digits.len() > 1 && digits.starts_with('0')) {
        return None;
    }
    let n: u8 = digits.parse().ok().filter(|n| *n < 16)?;
    match kind {
        "r" => Some(Reg::Int(n)),
        "f" => Some(Reg::Float(n)),
        _ => None,
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

type ParseResult<T> = Result<T, String>;

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + n)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        self.pos += 1;
        tok
    }

    fn eat(&mut self, want: &Token) -> bool {
        if self.peek() == Some(want) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, want: &Token, what: &str) -> ParseResult<()> {
        if self.eat(want) {
            Ok(())
        } else {
            Err(format!("expected {what}"))
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn int_register(&mut self) -> ParseResult<u8> {
        match self.next() {
            Some(Token::Ident(name)) => match register(name) {
                Some(Reg::Int(n)) => Ok(n),
                _ => Err(format!("expected an integer register, found '{name}'")),
            },
            _ => Err("expected an integer register".to_string()),
        }
    }

    fn peek_int_register(&self, n: usize) -> Option<u8> {
        match self.peek_at(n) {
            Some(Token::Ident(name)) => match register(name) {
                Some(Reg::Int(r)) => Some(r),
                _ => None,
            },
            _ => None,
        }
    }

    // expr := term (('+'|'-') term)*
    fn expr(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    // term := unary (('*'|'/'|'%') unary)*
    fn term(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Rem,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        match self.next() {
            Some(Token::Integer(n)) => Ok(Expr::Int(i64::from(*n))),
            Some(Token::Char(c)) => Ok(Expr::Int(i64::from(*c))),
            Some(Token::Ident(name)) => {
                if register(name).is_some() {
                    Err(format!("register '{name}' used in an expression"))
                } else {
                    Ok(Expr::Symbol(name.clone()))
                }
            }
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(tok) => Err(format!("unexpected {tok:?} in expression")),
            None => Err("missing expression".to_string()),
        }
    }

    /// `+ rb`, `+ expr`, `- expr` or nothing, after a base register.
    fn index(&mut self) -> ParseResult<Index> {
        match self.peek() {
            Some(Token::Plus) => {
                self.pos += 1;
                if let Some(rb) = self.peek_int_register(0) {
                    self.pos += 1;
                    Ok(Index::Reg(rb))
                } else {
                    Ok(Index::Expr(self.expr()?))
                }
            }
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Index::Expr(Expr::Neg(Box::new(self.term()?))))
            }
            _ => Ok(Index::None),
        }
    }

    fn memory(&mut self) -> ParseResult<Operand> {
        let op = if self.eat(&Token::MinusMinus) {
            Operand::PreDec(self.int_register()?)
        } else {
            let base = self.int_register()?;
            if self.eat(&Token::PlusPlus) {
                Operand::PostInc(base)
            } else {
                Operand::Mem(base, self.index()?)
            }
        };
        self.expect(&Token::RBracket, "']'")?;
        Ok(op)
    }

    fn operand(&mut self) -> ParseResult<Operand> {
        if self.eat(&Token::LBracket) {
            return self.memory();
        }
        if let Some(Token::Ident(name)) = self.peek() {
            if let Some(reg) = register(name) {
                self.pos += 1;
                return match (reg, self.peek()) {
                    (Reg::Int(ra), Some(Token::Plus | Token::Minus)) => {
                        Ok(Operand::Sum(ra, self.index()?))
                    }
                    _ => Ok(Operand::Reg(reg)),
                };
            }
        }
        Ok(Operand::Expr(self.expr()?))
    }

    fn operands(&mut self) -> ParseResult<Vec<Operand>> {
        let mut ops = Vec::new();
        if self.at_end() {
            return Ok(ops);
        }
        loop {
            ops.push(self.operand()?);
            if !self.eat(&Token::Comma) {
                return Ok(ops);
            }
        }
    }

    fn names(&mut self) -> ParseResult<Vec<String>> {
        let mut names = Vec::new();
        loop {
            match self.next() {
                Some(Token::Ident(name)) if register(name).is_none() => names.push(name.clone()),
                _ => return Err("expected a symbol name".to_string()),
            }
            if !self.eat(&Token::Comma) {
                return Ok(names);
            }
        }
    }

    fn directive(&mut self, name: &str) -> ParseResult<Directive> {
        Ok(match name {
            "text" => Directive::Text,
            "data" => Directive::Data,
            "bss" => Directive::Bss,
            "export" => Directive::Export(self.names()?),
            "import" => Directive::Import(self.names()?),
            "word" => Directive::Word(self.expr()?),
            "byte" => Directive::Byte(self.expr()?),
            "skip" => Directive::Skip(self.expr()?),
            "align" => Directive::Align,
            "ascii" => match self.next() {
                Some(Token::String(s)) => Directive::Ascii(s.clone().into_bytes()),
                _ => return Err("expected a string literal after .ascii".to_string()),
            },
            other => return Err(format!("unknown directive '.{other}'")),
        })
    }

    fn line(&mut self, number: u32) -> ParseResult<Line> {
        let mut line = Line {
            number,
            label: None,
            statement: None,
        };

        if let (Some(Token::Ident(name)), Some(Token::Colon)) = (self.peek(), self.peek_at(1)) {
            if register(name).is_some() {
                return Err(format!("register name '{name}' used as a label"));
            }
            line.label = Some(name.clone());
            self.pos += 2;
        }

        line.statement = match self.next() {
            None => None,
            Some(Token::Directive(name)) => Some(Statement::Directive(self.directive(name)?)),
            Some(Token::Ident(name)) if self.peek() == Some(&Token::Equals) => {
                self.pos += 1;
                Some(Statement::Equate(name.clone(), self.expr()?))
            }
            Some(Token::Ident(name)) => {
                Some(Statement::Instruction(name.to_lowercase(), self.operands()?))
            }
            Some(tok) => return Err(format!("unexpected {tok:?} at start of statement")),
        };

        if !self.at_end() {
            return Err("unexpected tokens at end of line".to_string());
        }
        Ok(line)
    }
}

/// Parses the tokens of one line.
///
/// # Arguments
///
/// * `number` - 1-based source line, recorded in the result.
/// * `tokens` - The line's tokens, without the trailing newline.
pub fn parse_line(number: u32, tokens: &[Token]) -> Result<Line, String> {
    Parser { tokens, pos: 0 }.line(number)
}
