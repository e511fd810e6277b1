use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E1xxx: Reader and form syntax errors
/// - E2xxx: Grammar-definition errors
/// - E3xxx: Pattern and template consistency errors
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Syntax Errors (E1xxx)
    /// Unexpected closing parenthesis
    E1001,
    /// Unclosed delimiter
    E1002,
    /// Invalid literal (unterminated string, bad escape, bad number)
    E1003,
    /// Unknown top-level form
    E1004,
    /// Malformed form
    E1005,
    /// Misplaced ellipsis
    E1006,
    /// Reserved keyword used with the wrong shape
    E1007,

    // Grammar Errors (E2xxx)
    /// Non-terminal defined more than once
    E2001,
    /// Underscore in a non-terminal name
    E2002,
    /// Cycle among non-terminal aliases
    E2003,
    /// Unknown language
    E2004,
    /// Underscore suffix on something that is not a non-terminal or built-in
    E2005,
    /// Reserved keyword used as a bare pattern
    E2006,
    /// `in-hole` context does not contain exactly one hole
    E2007,
    /// Language, relation or metafunction defined more than once
    E2008,

    // Pattern and Template Errors (E3xxx)
    /// Pattern variable used at inconsistent ellipsis depths
    E3001,
    /// Template uses a pattern variable under too few ellipses
    E3002,
    /// Template ellipsis with no variable to iterate
    E3003,
    /// Unknown reduction relation
    E3004,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    /// Every code, in numeric order.
    pub const ALL: [ErrorCode; 20] = [
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E9001,
    ];

    /// Get the code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Syntax
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            // Grammar
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            // Pattern / template
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            // Internal
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Parse a code such as `"E2003"` (case-insensitive).
    pub fn parse(text: &str) -> Option<ErrorCode> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(text))
    }

    /// Check if this is a reader/syntax error (E1xxx range).
    pub fn is_syntax_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this is a grammar-definition error (E2xxx range).
    pub fn is_grammar_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
