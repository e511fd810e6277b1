//! S-expression reader.
//!
//! Turns the token stream into a tree of [`SExp`] nodes with spans. `(...)`
//! and `[...]` are interchangeable but must be closed by their own kind.

use redex_diagnostic::Diagnostic;
use redex_ir::Span;
use redex_stack::ensure_sufficient_stack;

use crate::error;
use crate::lexer::{Token, TokenKind};

/// Atom of an S-expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Atom {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Symbol(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum SExpKind {
    Atom(Atom),
    List(Vec<SExp>),
}

/// S-expression with the span of its source text.
#[derive(Clone, Debug, PartialEq)]
pub struct SExp {
    pub kind: SExpKind,
    pub span: Span,
}

impl SExp {
    /// The symbol text, if this is a symbol atom.
    pub fn as_symbol(&self) -> Option<&str> {
        match &self.kind {
            SExpKind::Atom(Atom::Symbol(text)) => Some(text),
            _ => None,
        }
    }

    pub fn is_symbol(&self, wanted: &str) -> bool {
        self.as_symbol() == Some(wanted)
    }

    pub fn as_list(&self) -> Option<&[SExp]> {
        match &self.kind {
            SExpKind::List(items) => Some(items),
            SExpKind::Atom(_) => None,
        }
    }

    /// Head symbol of a list, e.g. `in-hole` for `(in-hole E e)`.
    pub fn head_symbol(&self) -> Option<&str> {
        self.as_list()?.first()?.as_symbol()
    }
}

/// Read every top-level S-expression of the source.
pub fn read_all(source: &str, tokens: &[Token]) -> Result<Vec<SExp>, Diagnostic> {
    let mut reader = Reader {
        tokens,
        pos: 0,
        eof: Span::new(
            u32::try_from(source.len()).unwrap_or(u32::MAX),
            u32::try_from(source.len()).unwrap_or(u32::MAX),
        ),
    };
    let mut out = Vec::new();
    while reader.pos < reader.tokens.len() {
        out.push(reader.read()?);
    }
    Ok(out)
}

struct Reader<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: Span,
}

impl Reader<'_> {
    fn read(&mut self) -> Result<SExp, Diagnostic> {
        let Some(token) = self.tokens.get(self.pos) else {
            return Err(error::malformed(self.eof, "expected an expression"));
        };
        self.pos += 1;
        let atom = match &token.kind {
            TokenKind::LParen => return self.read_list(token.span, ')'),
            TokenKind::LBracket => return self.read_list(token.span, ']'),
            TokenKind::RParen | TokenKind::RBracket => {
                return Err(error::unexpected_close(token.span));
            }
            TokenKind::Integer(n) => Atom::Integer(*n),
            TokenKind::Float(x) => Atom::Float(*x),
            TokenKind::String(s) => Atom::String(s.clone()),
            TokenKind::Boolean(b) => Atom::Boolean(*b),
            TokenKind::Symbol(s) => Atom::Symbol(s.clone()),
        };
        Ok(SExp {
            kind: SExpKind::Atom(atom),
            span: token.span,
        })
    }

    fn read_list(&mut self, open: Span, close: char) -> Result<SExp, Diagnostic> {
        ensure_sufficient_stack(|| {
            let mut items = Vec::new();
            loop {
                let Some(token) = self.tokens.get(self.pos) else {
                    return Err(error::unclosed_delimiter(open, self.eof));
                };
                let closer = match token.kind {
                    TokenKind::RParen => Some(')'),
                    TokenKind::RBracket => Some(']'),
                    _ => None,
                };
                if let Some(found) = closer {
                    if found != close {
                        return Err(error::mismatched_delimiter(open, token.span, close));
                    }
                    self.pos += 1;
                    return Ok(SExp {
                        kind: SExpKind::List(items),
                        span: open.merge(token.span),
                    });
                }
                items.push(self.read()?);
            }
        })
    }
}
