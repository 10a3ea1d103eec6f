//! Hyphenated-name repair.
//!
//! Document identifiers may contain `-` (`log-pretty`), but the expression
//! grammar reads `log-pretty` as `log - pretty`. [`HyphenPatcher`] walks a
//! compiled program children-first and fuses a subtraction back into one
//! name when, and only when, the fused name exists. Subtraction between
//! names that do not fuse into a known name is left alone.
//!
//! Handled shapes, with `r` an identifier:
//!
//! ```text
//! a - r            ->  a-r
//! x.y - r          ->  x.y-r
//! a - b - r        ->  a-b-r, or a - b-r
//! a - r.z / r(..)  ->  a-r.z / a-r(..)
//! 2 * a - r * 3    ->  2 * a-r * 3
//! 2 * a - r.z      ->  2 * a-r.z
//! ```
//!
//! The last shape exists because `*`, `/`, `%` and `**` bind tighter than
//! `-`, so the two halves of the name end up in different operands.

use mung_expr::{BinaryOp, Expr, ExprId, Patch, Program, UnaryOp};
use tracing::trace;

/// Answers whether a fused name exists.
pub trait NameResolver {
    /// A name visible in the current scope.
    fn has_name(&self, name: &str) -> bool;
    /// A child entry `member` of the value at `path`.
    fn has_member(&self, path: &[&str], member: &str) -> bool;
}

pub struct HyphenPatcher<'r> {
    resolver: &'r dyn NameResolver,
    fused: usize,
}

impl<'r> HyphenPatcher<'r> {
    pub fn new(resolver: &'r dyn NameResolver) -> Self {
        HyphenPatcher { resolver, fused: 0 }
    }

    /// Number of fusions performed so far.
    pub fn fused(&self) -> usize {
        self.fused
    }

    /// What a fused operand list would become, if the fused name exists.
    ///
    /// `head` is the left-most operand; the rest are plain identifiers.
    fn fuse(&self, program: &Program, head: ExprId, tail: &[&str]) -> Option<Expr> {
        let suffix = tail.join("-");
        match program.get(head) {
            Expr::Ident(name) => {
                let fused = format!("{name}-{suffix}");
                self.resolver.has_name(&fused).then_some(Expr::Ident(fused))
            }
            Expr::Member {
                object,
                field,
                optional: false,
            } => {
                let base = program.path(*object)?;
                let fused = format!("{field}-{suffix}");
                self.resolver
                    .has_member(&base, &fused)
                    .then_some(Expr::Member {
                        object: *object,
                        field: fused,
                        optional: false,
                    })
            }
            _ => None,
        }
    }

    /// `a - b - c` as `[(node, a), (node, b), (node, c)]`: each operand with
    /// the subtraction node whose right side it is (the first operand is
    /// paired with itself).
    fn flatten(program: &Program, id: ExprId) -> Vec<(ExprId, ExprId)> {
        let mut operands = Vec::new();
        let mut current = id;
        while let Expr::Binary {
            op: BinaryOp::Sub,
            left,
            right,
        } = program.get(current)
        {
            operands.push((current, *right));
            current = *left;
        }
        operands.push((current, current));
        operands.reverse();
        operands
    }

    fn fuse_chain(&mut self, program: &mut Program, id: ExprId) {
        let operands = Self::flatten(program, id);
        let tail: Option<Vec<String>> = operands[1..]
            .iter()
            .map(|&(_, operand)| program.get(operand).as_ident().map(str::to_string))
            .collect();
        let Some(tail) = tail else {
            return;
        };
        let tail: Vec<&str> = tail.iter().map(String::as_str).collect();

        let head = operands[0].1;
        let atom = rightmost_atom(program, head);
        if let Some(fused) = self.fuse(program, atom, &tail) {
            trace!(fused = ?fused, "fused hyphenated name");
            program.set(atom, fused);
            let hoisted = program.get(head).clone();
            program.set(id, hoisted);
            self.fused += 1;
            return;
        }

        // Keep the head as an operand and fuse the longest suffix that
        // names something: `a - b - c` becomes `a - b-c`.
        for start in 1..tail.len() {
            let fused = tail[start - 1..].join("-");
            if !self.resolver.has_name(&fused) {
                continue;
            }
            let left = operands[start - 1].0;
            let offset = program.offset(operands[start].1);
            trace!(fused = %fused, "fused hyphenated name");
            let right = program.push(Expr::Ident(fused), offset);
            program.set(
                id,
                Expr::Binary {
                    op: BinaryOp::Sub,
                    left,
                    right,
                },
            );
            self.fused += 1;
            return;
        }
    }

    /// The right operand is not a bare identifier but starts with one:
    /// `a - r.z`, `a - r(..)`, `a - r * 3`. Fuse the atoms on both sides of
    /// the `-`, then regroup the operators around the fused atom by
    /// precedence, so `2 * a - r.z` becomes `2 * (a-r).z` and
    /// `8 / a - r / 2` becomes `(8 / a-r) / 2`.
    fn fuse_across(&mut self, program: &mut Program, id: ExprId, left: ExprId, right: ExprId) {
        let (mut after, top, root) = leading_path(program, right);
        let Some(name) = program.get(root).as_ident().map(str::to_string) else {
            return;
        };
        let (mut before, atom) = trailing_path(program, left);
        let Some(fused) = self.fuse(program, atom, &[&name]) else {
            return;
        };
        trace!(fused = ?fused, "fused hyphenated name");
        program.set(root, fused);

        let mut current = top;
        loop {
            let before_first = match (before.last(), after.last()) {
                (None, None) => break,
                (Some(outer), Some(&(_, op, _))) => outer.binds_before(op),
                (outer, _) => outer.is_some(),
            };
            current = if before_first {
                match before.pop() {
                    Some(Step::Binary { id: node, op, other }) => {
                        program.set(
                            node,
                            Expr::Binary {
                                op,
                                left: other,
                                right: current,
                            },
                        );
                        node
                    }
                    Some(Step::Unary { id: node, op }) => {
                        program.set(node, Expr::Unary { op, operand: current });
                        node
                    }
                    None => break,
                }
            } else {
                let Some((node, op, other)) = after.pop() else {
                    break;
                };
                program.set(
                    node,
                    Expr::Binary {
                        op,
                        left: current,
                        right: other,
                    },
                );
                node
            };
        }
        let merged = program.get(current).clone();
        program.set(id, merged);
        self.fused += 1;
    }
}

/// Operators that bind tighter than binary `-`.
fn binds_tighter(op: BinaryOp) -> bool {
    op.precedence() > BinaryOp::Sub.precedence()
}

/// An operator between an operand of `-` and the atom that ends it.
#[derive(Clone, Copy)]
enum Step {
    /// `other` is the operand off the path.
    Binary {
        id: ExprId,
        op: BinaryOp,
        other: ExprId,
    },
    Unary {
        id: ExprId,
        op: UnaryOp,
    },
}

impl Step {
    /// Does this operator take the fused atom before `op`, the innermost
    /// operator on its right? `**` groups to the right.
    fn binds_before(self, op: BinaryOp) -> bool {
        let (own, pow) = match self {
            Step::Binary { op: own, .. } => (own.precedence(), own == BinaryOp::Pow),
            Step::Unary { op: own, .. } => (own.precedence(), false),
        };
        own > op.precedence() || (own == op.precedence() && !pow)
    }
}

/// Operators from `id` down to the operand that ends its text, through
/// tighter binary operators and prefix operators, outermost first.
fn trailing_path(program: &Program, mut id: ExprId) -> (Vec<Step>, ExprId) {
    let mut steps = Vec::new();
    loop {
        match *program.get(id) {
            Expr::Binary { op, left, right } if binds_tighter(op) => {
                steps.push(Step::Binary {
                    id,
                    op,
                    other: left,
                });
                id = right;
            }
            Expr::Unary { op, operand } => {
                steps.push(Step::Unary { id, op });
                id = operand;
            }
            _ => return (steps, id),
        }
    }
}

/// The operand that ends the text of `id`.
fn rightmost_atom(program: &Program, id: ExprId) -> ExprId {
    trailing_path(program, id).1
}

/// Path from `id` to the atom that starts its text: tighter binary
/// operators as `(node, op, right operand)`, outermost first, then the top
/// of the postfix chain over the atom, then the atom itself.
fn leading_path(
    program: &Program,
    mut id: ExprId,
) -> (Vec<(ExprId, BinaryOp, ExprId)>, ExprId, ExprId) {
    let mut steps = Vec::new();
    while let Expr::Binary { op, left, right } = *program.get(id) {
        if !binds_tighter(op) {
            break;
        }
        steps.push((id, op, right));
        id = left;
    }
    let top = id;
    loop {
        match *program.get(id) {
            Expr::Member { object, .. } | Expr::Index { object, .. } => id = object,
            Expr::Call { callee, .. } => id = callee,
            _ => return (steps, top, id),
        }
    }
}

impl Patch for HyphenPatcher<'_> {
    fn visit(&mut self, program: &mut Program, id: ExprId) {
        let Expr::Binary {
            op: BinaryOp::Sub,
            left,
            right,
        } = *program.get(id)
        else {
            return;
        };
        if program.get(right).as_ident().is_some() {
            self.fuse_chain(program, id);
        } else {
            self.fuse_across(program, id, left, right);
        }
    }
}

#[cfg(test)]
mod tests;
