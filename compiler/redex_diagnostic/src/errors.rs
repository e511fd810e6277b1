//! Embedded error documentation for `redexc explain`.
//!
//! Each error code has a markdown file in `errors/` that explains the error
//! and shows an example. They are embedded at compile time.

use crate::ErrorCode;

/// Registry of embedded error documentation.
pub struct ErrorDocs;

impl ErrorDocs {
    /// Get the documentation for an error code.
    pub fn get(code: ErrorCode) -> Option<&'static str> {
        DOCS.iter().find(|(c, _)| *c == code).map(|(_, doc)| *doc)
    }

    /// Get all documented error codes.
    pub fn all_codes() -> impl Iterator<Item = ErrorCode> {
        DOCS.iter().map(|(code, _)| *code)
    }
}

static DOCS: &[(ErrorCode, &str)] = &[
    // Syntax errors (E1xxx)
    (ErrorCode::E1001, include_str!("errors/E1001.md")),
    (ErrorCode::E1002, include_str!("errors/E1002.md")),
    (ErrorCode::E1003, include_str!("errors/E1003.md")),
    (ErrorCode::E1004, include_str!("errors/E1004.md")),
    (ErrorCode::E1005, include_str!("errors/E1005.md")),
    (ErrorCode::E1006, include_str!("errors/E1006.md")),
    (ErrorCode::E1007, include_str!("errors/E1007.md")),
    // Grammar errors (E2xxx)
    (ErrorCode::E2001, include_str!("errors/E2001.md")),
    (ErrorCode::E2002, include_str!("errors/E2002.md")),
    (ErrorCode::E2003, include_str!("errors/E2003.md")),
    (ErrorCode::E2004, include_str!("errors/E2004.md")),
    (ErrorCode::E2005, include_str!("errors/E2005.md")),
    (ErrorCode::E2006, include_str!("errors/E2006.md")),
    (ErrorCode::E2007, include_str!("errors/E2007.md")),
    (ErrorCode::E2008, include_str!("errors/E2008.md")),
    // Pattern and template errors (E3xxx)
    (ErrorCode::E3001, include_str!("errors/E3001.md")),
    (ErrorCode::E3002, include_str!("errors/E3002.md")),
    (ErrorCode::E3003, include_str!("errors/E3003.md")),
    (ErrorCode::E3004, include_str!("errors/E3004.md")),
    // Internal
    (ErrorCode::E9001, include_str!("errors/E9001.md")),
];

#[cfg(test)]
mod tests;
