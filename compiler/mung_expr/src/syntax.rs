//! Flat expression tree.
//!
//! Nodes live in a `Vec` owned by the [`Program`] and refer to each other by
//! [`ExprId`]. Rewriting a node is an index store, which is what the patch
//! pass relies on.

use std::fmt;

use rustc_hash::FxHashSet;

/// Index of a node in a program's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }

    /// Binding power, on the same scale as [`BinaryOp::precedence`].
    #[inline]
    pub fn precedence(self) -> u8 {
        UNARY_PRECEDENCE
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Pow,
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    Contains,
    StartsWith,
    EndsWith,
    And,
    Or,
    Coalesce,
}

impl BinaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Pow => "**",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::In => "in",
            BinaryOp::Contains => "contains",
            BinaryOp::StartsWith => "startsWith",
            BinaryOp::EndsWith => "endsWith",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Coalesce => "??",
        }
    }

    /// Binding power; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Coalesce => 1,
            BinaryOp::Or => 2,
            BinaryOp::And => 3,
            BinaryOp::Eq | BinaryOp::NotEq => 4,
            BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq
            | BinaryOp::In
            | BinaryOp::Contains
            | BinaryOp::StartsWith
            | BinaryOp::EndsWith => 5,
            BinaryOp::Add | BinaryOp::Sub => 6,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 7,
            BinaryOp::Pow => 9,
        }
    }

    /// Operator spelled as a word in source, if any.
    pub(crate) fn from_word(word: &str) -> Option<BinaryOp> {
        Some(match word {
            "in" => BinaryOp::In,
            "contains" => BinaryOp::Contains,
            "startsWith" => BinaryOp::StartsWith,
            "endsWith" => BinaryOp::EndsWith,
            "and" => BinaryOp::And,
            "or" => BinaryOp::Or,
            _ => return None,
        })
    }
}

/// Precedence of prefix operators. `**` binds tighter, so `-2 ** 2` is `-4`.
pub(crate) const UNARY_PRECEDENCE: u8 = 8;

/// One node of an expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    /// `object.field`, or `object?.field` when `optional`.
    Member {
        object: ExprId,
        field: String,
        optional: bool,
    },
    Index {
        object: ExprId,
        index: ExprId,
    },
    Call {
        callee: ExprId,
        args: Vec<ExprId>,
    },
    List(Vec<ExprId>),
    Map(Vec<(String, ExprId)>),
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Ternary {
        cond: ExprId,
        then: ExprId,
        otherwise: ExprId,
    },
}

impl Expr {
    /// Direct children, in evaluation order.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            Expr::Nil
            | Expr::Bool(_)
            | Expr::Int(_)
            | Expr::Float(_)
            | Expr::Str(_)
            | Expr::Ident(_) => Vec::new(),
            Expr::Member { object, .. } => vec![*object],
            Expr::Index { object, index } => vec![*object, *index],
            Expr::Call { callee, args } => {
                let mut out = Vec::with_capacity(args.len() + 1);
                out.push(*callee);
                out.extend_from_slice(args);
                out
            }
            Expr::List(items) => items.clone(),
            Expr::Map(entries) => entries.iter().map(|(_, v)| *v).collect(),
            Expr::Unary { operand, .. } => vec![*operand],
            Expr::Binary { left, right, .. } => vec![*left, *right],
            Expr::Ternary {
                cond,
                then,
                otherwise,
            } => vec![*cond, *then, *otherwise],
        }
    }

    #[inline]
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// A compiled expression: its source text and syntax tree.
///
/// Programs are plain data. They are shared behind `Arc` by caches and
/// cloned when a caller wants to rewrite one with [`Program::patch`].
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    source: String,
    nodes: Vec<Expr>,
    /// Byte offset of each node in `source`.
    offsets: Vec<u32>,
    root: ExprId,
}

/// Rewrites nodes of a program.
///
/// [`Program::patch`] calls `visit` once per reachable node, children
/// before parents. The visitor may replace the visited node or add new
/// nodes; it must not touch nodes outside the visited subtree.
pub trait Patch {
    fn visit(&mut self, program: &mut Program, id: ExprId);
}

impl Program {
    pub(crate) fn from_parts(
        source: String,
        nodes: Vec<Expr>,
        offsets: Vec<u32>,
        root: ExprId,
    ) -> Self {
        debug_assert_eq!(nodes.len(), offsets.len());
        Program {
            source,
            nodes,
            offsets,
            root,
        }
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn root(&self) -> ExprId {
        self.root
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.index()]
    }

    /// Byte offset of a node in the source.
    #[inline]
    pub fn offset(&self, id: ExprId) -> u32 {
        self.offsets[id.index()]
    }

    /// Replace a node, keeping its source offset.
    pub fn set(&mut self, id: ExprId, expr: Expr) {
        self.nodes[id.index()] = expr;
    }

    /// Append a node at the given source offset.
    pub fn push(&mut self, expr: Expr, offset: u32) -> ExprId {
        let id = ExprId::new(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(expr);
        self.offsets.push(offset);
        id
    }

    /// Nodes reachable from the root, children before parents.
    pub fn post_order(&self) -> Vec<ExprId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                out.push(id);
                continue;
            }
            stack.push((id, true));
            for child in self.get(id).children().into_iter().rev() {
                stack.push((child, false));
            }
        }
        out
    }

    /// Run a rewriting pass over every reachable node.
    pub fn patch(&mut self, patcher: &mut dyn Patch) {
        for id in self.post_order() {
            patcher.visit(self, id);
        }
    }

    /// Identifiers the program reads from its environment, in first-use
    /// order. Member names and map keys are not free names.
    pub fn free_names(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for id in self.post_order() {
            if let Expr::Ident(name) = self.get(id) {
                if seen.insert(name.as_str()) {
                    out.push(name.as_str());
                }
            }
        }
        out
    }

    /// The chain of identifiers `a.b.c` rooted at `id`, when the node is a
    /// plain identifier or a non-optional member access on one.
    pub fn path(&self, id: ExprId) -> Option<Vec<&str>> {
        match self.get(id) {
            Expr::Ident(name) => Some(vec![name.as_str()]),
            Expr::Member {
                object,
                field,
                optional: false,
            } => {
                let mut path = self.path(*object)?;
                path.push(field.as_str());
                Some(path)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
