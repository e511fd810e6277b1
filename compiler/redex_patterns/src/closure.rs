//! Non-terminal closures and the "provably different" test.
//!
//! A closure is the set of [`Shape`]s a non-terminal can produce: every
//! built-in, literal and sequence reachable through alias alternatives.
//! Two patterns are provably different when no shape of one can overlap a
//! shape of the other; the determinism rewriter relies on this being sound
//! (never "different" when some term matches both).

use std::collections::BTreeSet;

use redex_ir::{BuiltIn, BuiltInKind, Literal, Pattern, Symbol};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Recursion budget for comparing nested sequences through non-terminals.
///
/// Exhausting it answers "may overlap".
const COMPARE_FUEL: u32 = 8;

/// One kind of term a pattern can match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    BuiltIn(BuiltIn),
    Literal(Literal),
    /// A sequence pattern, compared element-wise.
    Sequence(Vec<Pattern>),
    /// Anything; used for `in-hole` alternatives.
    Any,
}

/// Closures of every non-terminal in a grammar.
#[derive(Clone, Debug, Default)]
pub struct Closures {
    shapes: FxHashMap<Symbol, Vec<Shape>>,
}

impl Closures {
    /// Compute closures from resolved alternatives.
    ///
    /// Alias alternatives are followed transitively; the grammar must
    /// already be free of alias cycles.
    pub fn compute(alternatives: &FxHashMap<Symbol, Vec<Pattern>>) -> Self {
        let mut closures = Closures::default();
        for name in alternatives.keys() {
            let mut out = Vec::new();
            let mut visiting = Vec::new();
            collect_shapes(name, alternatives, &mut visiting, &mut out);
            closures.shapes.insert(name.clone(), out);
        }
        closures
    }

    pub fn shapes(&self, non_terminal: &str) -> &[Shape] {
        self.shapes.get(non_terminal).map_or(&[], Vec::as_slice)
    }

    /// Whether no term can match both `a` and `b`.
    ///
    /// `mentioned` is the language's literal-variable set.
    pub fn provably_different(&self, a: &Pattern, b: &Pattern, mentioned: &BTreeSet<Symbol>) -> bool {
        Comparer {
            closures: self,
            mentioned,
        }
        .different(a, b, COMPARE_FUEL)
    }
}

fn collect_shapes(
    name: &Symbol,
    alternatives: &FxHashMap<Symbol, Vec<Pattern>>,
    visiting: &mut Vec<Symbol>,
    out: &mut Vec<Shape>,
) {
    if visiting.contains(name) {
        return;
    }
    visiting.push(name.clone());
    for alternative in alternatives.get(name).into_iter().flatten() {
        match alternative {
            Pattern::NonTerminal { prefix, .. } => {
                collect_shapes(prefix, alternatives, visiting, out);
            }
            other => {
                for shape in shapes_of_leaf(other) {
                    if !out.contains(&shape) {
                        out.push(shape);
                    }
                }
            }
        }
    }
    visiting.pop();
}

fn shapes_of_leaf(pattern: &Pattern) -> SmallVec<[Shape; 1]> {
    let mut out = SmallVec::new();
    match pattern {
        Pattern::BuiltIn(builtin) => out.push(Shape::BuiltIn(builtin.clone())),
        Pattern::Literal(literal) => out.push(Shape::Literal(literal.clone())),
        Pattern::Sequence(items) => out.push(Shape::Sequence(items.clone())),
        Pattern::Check(_) => {}
        Pattern::NonTerminal { .. }
        | Pattern::Repeat { .. }
        | Pattern::InHole { .. }
        | Pattern::Unresolved(_) => out.push(Shape::Any),
    }
    out
}

struct Comparer<'a> {
    closures: &'a Closures,
    mentioned: &'a BTreeSet<Symbol>,
}

impl Comparer<'_> {
    fn shapes_of(&self, pattern: &Pattern) -> SmallVec<[Shape; 1]> {
        match pattern {
            Pattern::NonTerminal { prefix, .. } => {
                self.closures.shapes(prefix.as_str()).iter().cloned().collect()
            }
            other => shapes_of_leaf(other),
        }
    }

    fn different(&self, a: &Pattern, b: &Pattern, fuel: u32) -> bool {
        let left = self.shapes_of(a);
        let right = self.shapes_of(b);
        left.iter()
            .all(|x| right.iter().all(|y| !self.overlap(x, y, fuel)))
    }

    fn overlap(&self, a: &Shape, b: &Shape, fuel: u32) -> bool {
        match (a, b) {
            (Shape::Any, _) | (_, Shape::Any) => true,
            (Shape::BuiltIn(x), Shape::BuiltIn(y)) => builtins_overlap(x, y),
            (Shape::BuiltIn(builtin), Shape::Literal(literal))
            | (Shape::Literal(literal), Shape::BuiltIn(builtin)) => {
                self.literal_in_builtin(literal, builtin)
            }
            (Shape::Literal(x), Shape::Literal(y)) => x == y,
            (Shape::Sequence(x), Shape::Sequence(y)) => self.sequences_overlap(x, y, fuel),
            (Shape::Sequence(_), _) | (_, Shape::Sequence(_)) => false,
        }
    }

    fn literal_in_builtin(&self, literal: &Literal, builtin: &BuiltIn) -> bool {
        match (literal, builtin.kind) {
            (Literal::Integer(_), BuiltInKind::Number | BuiltInKind::Integer)
            | (Literal::Float(_), BuiltInKind::Number | BuiltInKind::Float)
            | (Literal::String(_), BuiltInKind::String)
            | (Literal::Boolean(_), BuiltInKind::Boolean) => true,
            (Literal::Integer(n), BuiltInKind::Natural) => *n >= 0,
            (Literal::Variable(name), BuiltInKind::VariableNotOtherwiseMentioned) => {
                !self.mentioned.contains(name)
            }
            (Literal::Variable(name), BuiltInKind::VariableExcept) => {
                !builtin.excluded.contains(name)
            }
            _ => false,
        }
    }

    fn sequences_overlap(&self, a: &[Pattern], b: &[Pattern], fuel: u32) -> bool {
        if fuel == 0 {
            return true;
        }
        let fuel = fuel - 1;
        let a: SmallVec<[&Pattern; 8]> = a.iter().filter(|p| !matches!(p, Pattern::Check(_))).collect();
        let b: SmallVec<[&Pattern; 8]> = b.iter().filter(|p| !matches!(p, Pattern::Check(_))).collect();
        let a_fixed = a.iter().filter(|p| p.is_fixed_width()).count();
        let b_fixed = b.iter().filter(|p| p.is_fixed_width()).count();
        let a_open = a_fixed < a.len();
        let b_open = b_fixed < b.len();

        // Length bounds.
        match (a_open, b_open) {
            (false, false) if a.len() != b.len() => return false,
            (false, true) if b_fixed > a.len() => return false,
            (true, false) if a_fixed > b.len() => return false,
            _ => {}
        }

        // Leading fixed elements line up positionally.
        for (x, y) in a.iter().zip(b.iter()) {
            if !x.is_fixed_width() || !y.is_fixed_width() {
                break;
            }
            if self.different(x, y, fuel) {
                return false;
            }
        }

        // So do trailing ones.
        for (x, y) in a.iter().rev().zip(b.iter().rev()) {
            if !x.is_fixed_width() || !y.is_fixed_width() {
                break;
            }
            if self.different(x, y, fuel) {
                return false;
            }
        }

        true
    }
}

fn builtins_overlap(a: &BuiltIn, b: &BuiltIn) -> bool {
    use BuiltInKind::{Float, Integer, Natural, Number, VariableExcept, VariableNotOtherwiseMentioned};
    let is_number = |kind| matches!(kind, Number | Integer | Natural | Float);
    let is_variable = |kind| matches!(kind, VariableNotOtherwiseMentioned | VariableExcept);
    match (a.kind, b.kind) {
        (x, y) if x == y => true,
        (Number, y) | (y, Number) => is_number(y),
        (Integer, Natural) | (Natural, Integer) => true,
        (x, y) => is_variable(x) && is_variable(y),
    }
}
