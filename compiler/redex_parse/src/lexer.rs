//! Tokenizer for specification source, built on `logos`.
//!
//! Whitespace and `;` line comments are skipped. Everything that is not a
//! delimiter, string or boolean is an atom; atoms are classified as numbers
//! or symbols after lexing so that symbols like `-->`, `::=` and `...` need
//! no special rules.

use logos::Logos;
use redex_diagnostic::Diagnostic;
use redex_ir::Span;

use crate::error;

/// Raw token from logos.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r";[^\n]*")]
enum RawToken {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    #[token("#t", |_| true)]
    #[token("#true", |_| true)]
    #[token("#f", |_| false)]
    #[token("#false", |_| false)]
    Boolean(bool),

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    #[regex(r#"[^\s()\[\]";]+"#)]
    Atom,
}

/// Token kinds after cooking.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Symbol(String),
}

impl TokenKind {
    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::LParen => "`(`".to_owned(),
            TokenKind::RParen => "`)`".to_owned(),
            TokenKind::LBracket => "`[`".to_owned(),
            TokenKind::RBracket => "`]`".to_owned(),
            TokenKind::Integer(n) => format!("integer `{n}`"),
            TokenKind::Float(x) => format!("float `{x}`"),
            TokenKind::String(_) => "string literal".to_owned(),
            TokenKind::Boolean(b) => format!("boolean `{}`", if *b { "#t" } else { "#f" }),
            TokenKind::Symbol(s) => format!("symbol `{s}`"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Lex the whole source. Stops at the first invalid token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Diagnostic> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        let slice = lexer.slice();
        let kind = match result {
            Ok(RawToken::LParen) => TokenKind::LParen,
            Ok(RawToken::RParen) => TokenKind::RParen,
            Ok(RawToken::LBracket) => TokenKind::LBracket,
            Ok(RawToken::RBracket) => TokenKind::RBracket,
            Ok(RawToken::Boolean(value)) => TokenKind::Boolean(value),
            Ok(RawToken::String) => {
                let content = &slice[1..slice.len() - 1];
                TokenKind::String(unescape_string(content, span)?)
            }
            Ok(RawToken::Atom) => classify_atom(slice, span)?,
            Err(()) if slice.starts_with('"') => {
                let rest = Span::new(span.start, u32::try_from(source.len()).unwrap_or(u32::MAX));
                return Err(error::invalid_literal(rest, "unterminated string literal"));
            }
            Err(()) => {
                return Err(error::invalid_literal(
                    span,
                    format!("unexpected character `{slice}`"),
                ));
            }
        };
        tokens.push(Token { kind, span });
    }

    Ok(tokens)
}

/// Numbers are atoms that start like a number; everything else is a symbol.
fn classify_atom(slice: &str, span: Span) -> Result<TokenKind, Diagnostic> {
    if let Ok(n) = slice.parse::<i64>() {
        return Ok(TokenKind::Integer(n));
    }
    if !looks_numeric(slice) {
        return Ok(TokenKind::Symbol(slice.to_owned()));
    }
    if unsigned_part(slice).bytes().all(|b| b.is_ascii_digit()) {
        return Err(error::invalid_literal(
            span,
            format!("integer literal `{slice}` is out of range"),
        ));
    }
    match slice.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(TokenKind::Float(value)),
        _ => Err(error::invalid_literal(
            span,
            format!("invalid number literal `{slice}`"),
        )),
    }
}

fn unsigned_part(slice: &str) -> &str {
    slice
        .strip_prefix('-')
        .or_else(|| slice.strip_prefix('+'))
        .unwrap_or(slice)
}

fn looks_numeric(slice: &str) -> bool {
    let mut chars = unsigned_part(slice).chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

fn unescape_string(content: &str, span: Span) -> Result<String, Diagnostic> {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => {
                return Err(error::invalid_literal(
                    span,
                    format!("unknown escape sequence `\\{other}`"),
                ));
            }
            None => return Err(error::invalid_literal(span, "dangling backslash")),
        }
    }
    Ok(out)
}
