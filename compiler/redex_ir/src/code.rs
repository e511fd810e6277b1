//! Target statement IR.
//!
//! A restricted three-address model: modules hold ordered statements,
//! statements hold at most one call or one binary operation, and every
//! operand is a variable or a literal. Any backend can linearize it into
//! source text without needing nested expressions.
//!
//! Runtime support is named by [`RuntimeFn`] instead of by string so that
//! the code generator and the interpreter agree on the available helpers
//! and their arities.

use std::fmt;
use std::rc::Rc;

use crate::term::write_quoted;
use crate::Symbol;

// ── Operands ────────────────────────────────────────────────────────

/// Literal operand.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Lit {
    None,
    Bool(bool),
    Int(i64),
    Str(Rc<str>),
}

/// Simple operand: a variable or a literal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    Var(Symbol),
    Lit(Lit),
}

impl Operand {
    pub fn var(name: &Symbol) -> Operand {
        Operand::Var(name.clone())
    }

    pub fn int(value: i64) -> Operand {
        Operand::Lit(Lit::Int(value))
    }

    pub fn str(text: &str) -> Operand {
        Operand::Lit(Lit::Str(Rc::from(text)))
    }

    pub fn bool(value: bool) -> Operand {
        Operand::Lit(Lit::Bool(value))
    }

    pub fn none() -> Operand {
        Operand::Lit(Lit::None)
    }
}

impl From<Symbol> for Operand {
    fn from(name: Symbol) -> Self {
        Operand::Var(name)
    }
}

impl From<&Symbol> for Operand {
    fn from(name: &Symbol) -> Self {
        Operand::Var(name.clone())
    }
}

// ── Operators ───────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Ge => ">=",
            BinaryOp::Gt => ">",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

// ── Runtime helpers ─────────────────────────────────────────────────

/// Helpers the generated code may call.
///
/// Term arguments are terms, symbol arguments are strings, and paths are
/// sequence terms of integers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RuntimeFn {
    // Terms
    IsSequence,
    SeqLen,
    SeqGet,
    /// `t` as the only child of a new sequence; the top-level match cursor.
    WrapTerm,
    /// Sequence term from a list of terms.
    MakeSequence,
    /// Children of a sequence term as a list.
    SeqChildren,
    TermEq,
    IsInteger,
    IsNatural,
    IsFloat,
    IsNumber,
    IsString,
    IsBoolean,
    IsHole,
    IsVariable,
    /// Whether a sequence term has a child equal to the term.
    SeqContains,
    /// List of `(subterm, path)` pairs in pre-order.
    SubtermPaths,
    ReplaceAtPath,
    Plug,
    ReadTerm,
    TermToString,

    // Binding environments
    NewMatch,
    MatchCopy,
    MatchAdd,
    MatchIncreaseDepth,
    MatchDecreaseDepth,
    MatchGet,
    MatchRemove,
    MatchCompare,
    MatchMerge,
    MatchSetsEqual,
    MatchesToString,

    // Lists and results
    NewList,
    ListAppend,
    ListExtend,
    ListLen,
    ListGet,
    MakePair,
    TermSetsEqual,
    TermsToString,
    /// Raise unless the sequence term has the given length.
    CheckEllipsisCounts,
}

impl RuntimeFn {
    pub fn name(self) -> &'static str {
        match self {
            RuntimeFn::IsSequence => "is_sequence",
            RuntimeFn::SeqLen => "seq_len",
            RuntimeFn::SeqGet => "seq_get",
            RuntimeFn::WrapTerm => "wrap_term",
            RuntimeFn::MakeSequence => "make_sequence",
            RuntimeFn::SeqChildren => "seq_children",
            RuntimeFn::TermEq => "term_eq",
            RuntimeFn::IsInteger => "is_integer",
            RuntimeFn::IsNatural => "is_natural",
            RuntimeFn::IsFloat => "is_float",
            RuntimeFn::IsNumber => "is_number",
            RuntimeFn::IsString => "is_string",
            RuntimeFn::IsBoolean => "is_boolean",
            RuntimeFn::IsHole => "is_hole",
            RuntimeFn::IsVariable => "is_variable",
            RuntimeFn::SeqContains => "seq_contains",
            RuntimeFn::SubtermPaths => "subterm_paths",
            RuntimeFn::ReplaceAtPath => "replace_at_path",
            RuntimeFn::Plug => "plug",
            RuntimeFn::ReadTerm => "read_term",
            RuntimeFn::TermToString => "term_to_string",
            RuntimeFn::NewMatch => "new_match",
            RuntimeFn::MatchCopy => "match_copy",
            RuntimeFn::MatchAdd => "match_add",
            RuntimeFn::MatchIncreaseDepth => "match_increase_depth",
            RuntimeFn::MatchDecreaseDepth => "match_decrease_depth",
            RuntimeFn::MatchGet => "match_get",
            RuntimeFn::MatchRemove => "match_remove",
            RuntimeFn::MatchCompare => "match_compare",
            RuntimeFn::MatchMerge => "match_merge",
            RuntimeFn::MatchSetsEqual => "match_sets_equal",
            RuntimeFn::MatchesToString => "matches_to_string",
            RuntimeFn::NewList => "new_list",
            RuntimeFn::ListAppend => "list_append",
            RuntimeFn::ListExtend => "list_extend",
            RuntimeFn::ListLen => "list_len",
            RuntimeFn::ListGet => "list_get",
            RuntimeFn::MakePair => "make_pair",
            RuntimeFn::TermSetsEqual => "term_sets_equal",
            RuntimeFn::TermsToString => "terms_to_string",
            RuntimeFn::CheckEllipsisCounts => "check_ellipsis_counts",
        }
    }

    /// Number of arguments the helper takes.
    pub fn arity(self) -> usize {
        match self {
            RuntimeFn::NewMatch | RuntimeFn::NewList => 0,
            RuntimeFn::IsSequence
            | RuntimeFn::SeqLen
            | RuntimeFn::WrapTerm
            | RuntimeFn::MakeSequence
            | RuntimeFn::SeqChildren
            | RuntimeFn::IsInteger
            | RuntimeFn::IsNatural
            | RuntimeFn::IsFloat
            | RuntimeFn::IsNumber
            | RuntimeFn::IsString
            | RuntimeFn::IsBoolean
            | RuntimeFn::IsHole
            | RuntimeFn::IsVariable
            | RuntimeFn::SubtermPaths
            | RuntimeFn::ReadTerm
            | RuntimeFn::TermToString
            | RuntimeFn::MatchCopy
            | RuntimeFn::MatchesToString
            | RuntimeFn::ListLen
            | RuntimeFn::TermsToString => 1,
            RuntimeFn::SeqGet
            | RuntimeFn::TermEq
            | RuntimeFn::SeqContains
            | RuntimeFn::Plug
            | RuntimeFn::MatchIncreaseDepth
            | RuntimeFn::MatchDecreaseDepth
            | RuntimeFn::MatchGet
            | RuntimeFn::MatchRemove
            | RuntimeFn::MatchMerge
            | RuntimeFn::MatchSetsEqual
            | RuntimeFn::ListAppend
            | RuntimeFn::ListExtend
            | RuntimeFn::ListGet
            | RuntimeFn::MakePair
            | RuntimeFn::TermSetsEqual
            | RuntimeFn::CheckEllipsisCounts => 2,
            RuntimeFn::ReplaceAtPath | RuntimeFn::MatchAdd | RuntimeFn::MatchCompare => 3,
        }
    }
}

// ── Expressions ─────────────────────────────────────────────────────

/// Call target.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Callee {
    /// A function defined in the module, or a registered foreign function.
    Function(Symbol),
    Runtime(RuntimeFn),
}

/// Right-hand side of an assignment. Never nested.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    Operand(Operand),
    Call { callee: Callee, args: Vec<Operand> },
    /// Element of a pair.
    Field { base: Symbol, index: usize },
    Binary {
        op: BinaryOp,
        lhs: Operand,
        rhs: Operand,
    },
}

impl Expr {
    pub fn runtime(function: RuntimeFn, args: Vec<Operand>) -> Expr {
        Expr::Call {
            callee: Callee::Runtime(function),
            args,
        }
    }

    pub fn call(function: &Symbol, args: Vec<Operand>) -> Expr {
        Expr::Call {
            callee: Callee::Function(function.clone()),
            args,
        }
    }

    pub fn binary(op: BinaryOp, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
        Expr::Binary {
            op,
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }
}

// ── Statements ──────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stmt {
    FunctionDef {
        name: Symbol,
        params: Vec<Symbol>,
        body: Vec<Stmt>,
    },
    Assign {
        target: Symbol,
        value: Expr,
    },
    If {
        condition: Operand,
        then_body: Vec<Stmt>,
        else_body: Vec<Stmt>,
    },
    /// Iterate a list. Several targets destructure pair elements.
    ForEach {
        targets: Vec<Symbol>,
        iterable: Symbol,
        body: Vec<Stmt>,
    },
    /// `for target in start..end`.
    ForRange {
        target: Symbol,
        start: Operand,
        end: Operand,
        body: Vec<Stmt>,
    },
    /// Loop while the variable holds `true`; the body updates it.
    While {
        condition: Symbol,
        body: Vec<Stmt>,
    },
    Break,
    Return(Operand),
    Raise(Operand),
    Print(Operand),
    /// A call evaluated for its effect.
    Expr(Expr),
}

/// A compiled module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Module {
    /// Paths named by `require-foreign-source`, in order.
    pub foreign_sources: Vec<String>,
    pub body: Vec<Stmt>,
}

impl Module {
    /// Names of every top-level function, in definition order.
    pub fn function_names(&self) -> impl Iterator<Item = &Symbol> {
        self.body.iter().filter_map(|stmt| match stmt {
            Stmt::FunctionDef { name, .. } => Some(name),
            _ => None,
        })
    }

    pub fn function(&self, wanted: &str) -> Option<&Stmt> {
        self.body
            .iter()
            .find(|stmt| matches!(stmt, Stmt::FunctionDef { name, .. } if name.as_str() == wanted))
    }
}

// ── Display ─────────────────────────────────────────────────────────

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lit::None => f.write_str("None"),
            Lit::Bool(true) => f.write_str("True"),
            Lit::Bool(false) => f.write_str("False"),
            Lit::Int(n) => write!(f, "{n}"),
            Lit::Str(s) => write_quoted(f, s),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Var(name) => write!(f, "{name}"),
            Operand::Lit(lit) => write!(f, "{lit}"),
        }
    }
}

impl fmt::Display for Callee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callee::Function(name) => write!(f, "{name}"),
            Callee::Runtime(function) => f.write_str(function.name()),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Operand(operand) => write!(f, "{operand}"),
            Expr::Call { callee, args } => {
                write!(f, "{callee}(")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Expr::Field { base, index } => write!(f, "{base}[{index}]"),
            Expr::Binary { op, lhs, rhs } => write!(f, "{lhs} {} {rhs}", op.as_str()),
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for source in &self.foreign_sources {
            writeln!(f, "# require {source}")?;
        }
        write_block(f, &self.body, 0)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, body: &[Stmt], indent: usize) -> fmt::Result {
    if body.is_empty() {
        return writeln!(f, "{:indent$}pass", "", indent = indent * 4);
    }
    for stmt in body {
        write_stmt(f, stmt, indent)?;
    }
    Ok(())
}

fn write_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt, indent: usize) -> fmt::Result {
    let pad = indent * 4;
    match stmt {
        Stmt::FunctionDef { name, params, body } => {
            write!(f, "{:pad$}def {name}(", "")?;
            for (index, param) in params.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{param}")?;
            }
            writeln!(f, "):")?;
            write_block(f, body, indent + 1)
        }
        Stmt::Assign { target, value } => writeln!(f, "{:pad$}{target} = {value}", ""),
        Stmt::If {
            condition,
            then_body,
            else_body,
        } => {
            writeln!(f, "{:pad$}if {condition}:", "")?;
            write_block(f, then_body, indent + 1)?;
            if !else_body.is_empty() {
                writeln!(f, "{:pad$}else:", "")?;
                write_block(f, else_body, indent + 1)?;
            }
            Ok(())
        }
        Stmt::ForEach {
            targets,
            iterable,
            body,
        } => {
            write!(f, "{:pad$}for ", "")?;
            for (index, target) in targets.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{target}")?;
            }
            writeln!(f, " in {iterable}:")?;
            write_block(f, body, indent + 1)
        }
        Stmt::ForRange {
            target,
            start,
            end,
            body,
        } => {
            writeln!(f, "{:pad$}for {target} in range({start}, {end}):", "")?;
            write_block(f, body, indent + 1)
        }
        Stmt::While { condition, body } => {
            writeln!(f, "{:pad$}while {condition}:", "")?;
            write_block(f, body, indent + 1)
        }
        Stmt::Break => writeln!(f, "{:pad$}break", ""),
        Stmt::Return(value) => writeln!(f, "{:pad$}return {value}", ""),
        Stmt::Raise(value) => writeln!(f, "{:pad$}raise Exception({value})", ""),
        Stmt::Print(value) => writeln!(f, "{:pad$}print({value})", ""),
        Stmt::Expr(expr) => writeln!(f, "{:pad$}{expr}", ""),
    }
}
