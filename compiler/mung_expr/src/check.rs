//! Static shape checking against exemplar values.
//!
//! The checker never evaluates anything. Each name in the type environment
//! is bound to a placeholder whose variant stands for the eventual type;
//! `nil` means "unknown" and checks against everything.

use crate::error::{CompileError, CompileErrorKind};
use crate::interp::Env;
use crate::stdlib;
use crate::syntax::{BinaryOp, Expr, ExprId, Program, UnaryOp};
use crate::value::{Func, Map, Value};

/// Type environment: name to exemplar value.
pub type TypeEnv = Env;

#[derive(Clone, Copy, Debug)]
enum Shape<'a> {
    Any,
    Bool,
    Int,
    Float,
    Str,
    List,
    /// A map, with known entries when the exemplar is non-empty.
    Map(Option<&'a Map>),
    Func(&'a Func),
}

impl Shape<'_> {
    fn of(value: &Value) -> Shape<'_> {
        match value {
            Value::Nil => Shape::Any,
            Value::Bool(_) => Shape::Bool,
            Value::Int(_) => Shape::Int,
            Value::Float(_) => Shape::Float,
            Value::Str(_) => Shape::Str,
            Value::List(_) => Shape::List,
            Value::Map(map) if map.is_empty() => Shape::Map(None),
            Value::Map(map) => Shape::Map(Some(map)),
            Value::Func(func) => Shape::Func(func),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Shape::Any => "any",
            Shape::Bool => "bool",
            Shape::Int => "int",
            Shape::Float => "float",
            Shape::Str => "string",
            Shape::List => "array",
            Shape::Map(_) => "map",
            Shape::Func(_) => "function",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, Shape::Int | Shape::Float | Shape::Any)
    }
}

/// Check a program against a type environment.
///
/// Reports unknown names, calls with the wrong number of arguments, calls
/// of non-functions and operators applied to incompatible shapes.
pub fn check(program: &Program, env: &TypeEnv) -> Result<(), CompileError> {
    Checker { program, env }.shape(program.root()).map(|_| ())
}

struct Checker<'a> {
    program: &'a Program,
    env: &'a TypeEnv,
}

impl<'a> Checker<'a> {
    fn error(&self, id: ExprId, kind: CompileErrorKind) -> CompileError {
        CompileError::new(kind, self.program.offset(id))
    }

    fn type_error(&self, id: ExprId, message: String) -> CompileError {
        self.error(id, CompileErrorKind::Type { message })
    }

    fn shape(&self, id: ExprId) -> Result<Shape<'a>, CompileError> {
        mung_stack::with_stack(|| self.shape_node(id))
    }

    fn shape_node(&self, id: ExprId) -> Result<Shape<'a>, CompileError> {
        Ok(match self.program.get(id) {
            Expr::Nil => Shape::Any,
            Expr::Bool(_) => Shape::Bool,
            Expr::Int(_) => Shape::Int,
            Expr::Float(_) => Shape::Float,
            Expr::Str(_) => Shape::Str,
            Expr::Ident(name) => match self.env.get(name.as_str()).or_else(|| stdlib::lookup(name)) {
                Some(value) => Shape::of(value),
                None => {
                    return Err(self.error(id, CompileErrorKind::UnknownName { name: name.clone() }))
                }
            },
            Expr::Member { object, field, .. } => match self.shape(*object)? {
                Shape::Any | Shape::Map(None) => Shape::Any,
                Shape::Map(Some(map)) => map.get(field.as_str()).map_or(Shape::Any, Shape::of),
                Shape::Func(func) => func
                    .members()
                    .and_then(|m| m.get(field.as_str()))
                    .map_or(Shape::Any, Shape::of),
                other => {
                    return Err(self.type_error(
                        id,
                        format!("cannot access `{field}` on {}", other.name()),
                    ))
                }
            },
            Expr::Index { object, index } => {
                let target = self.shape(*object)?;
                let index_shape = self.shape(*index)?;
                match (target, index_shape) {
                    (Shape::Any, _) | (Shape::List, Shape::Int | Shape::Any) => Shape::Any,
                    (Shape::Str, Shape::Int | Shape::Any) => Shape::Str,
                    (Shape::Map(_) | Shape::Func(_), Shape::Str | Shape::Any) => Shape::Any,
                    (t, i) => {
                        return Err(self.type_error(
                            id,
                            format!("cannot index {} with {}", t.name(), i.name()),
                        ))
                    }
                }
            }
            Expr::Call { callee, args } => {
                let callee_shape = self.shape(*callee)?;
                for arg in args {
                    self.shape(*arg)?;
                }
                match callee_shape {
                    Shape::Any => Shape::Any,
                    Shape::Func(func) => {
                        if !func.arity().accepts(args.len()) {
                            return Err(self.error(
                                id,
                                CompileErrorKind::ArgumentCount {
                                    name: func.name().to_string(),
                                    expected: func.arity(),
                                    got: args.len(),
                                },
                            ));
                        }
                        Shape::Any
                    }
                    _ => {
                        let name = match self.program.path(*callee) {
                            Some(path) => path.join("."),
                            None => callee_shape.name().to_string(),
                        };
                        return Err(self.error(id, CompileErrorKind::NotCallable { name }));
                    }
                }
            }
            Expr::List(items) => {
                for item in items {
                    self.shape(*item)?;
                }
                Shape::List
            }
            Expr::Map(entries) => {
                for (_, value) in entries {
                    self.shape(*value)?;
                }
                Shape::Map(None)
            }
            Expr::Unary { op, operand } => {
                let shape = self.shape(*operand)?;
                match (op, shape) {
                    (UnaryOp::Neg, s) if s.is_numeric() => s,
                    (UnaryOp::Not, Shape::Bool | Shape::Any) => Shape::Bool,
                    (op, s) => {
                        return Err(self.type_error(
                            id,
                            format!(
                                "operator `{}` cannot be applied to {}",
                                op.as_symbol(),
                                s.name()
                            ),
                        ))
                    }
                }
            }
            Expr::Binary { op, left, right } => {
                let l = self.shape(*left)?;
                let r = self.shape(*right)?;
                self.binary(id, *op, l, r)?
            }
            Expr::Ternary {
                cond,
                then,
                otherwise,
            } => {
                let c = self.shape(*cond)?;
                if !matches!(c, Shape::Bool | Shape::Any) {
                    return Err(self.type_error(
                        id,
                        format!("condition must be bool, got {}", c.name()),
                    ));
                }
                let a = self.shape(*then)?;
                let b = self.shape(*otherwise)?;
                if std::mem::discriminant(&a) == std::mem::discriminant(&b) {
                    a
                } else {
                    Shape::Any
                }
            }
        })
    }

    fn binary(
        &self,
        id: ExprId,
        op: BinaryOp,
        l: Shape<'a>,
        r: Shape<'a>,
    ) -> Result<Shape<'a>, CompileError> {
        use Shape::{Any, Bool, Float, Int, List, Str};
        let shape = match op {
            BinaryOp::Eq | BinaryOp::NotEq => Some(Bool),
            BinaryOp::And | BinaryOp::Or => {
                matches!((l, r), (Bool | Any, Bool | Any)).then_some(Bool)
            }
            BinaryOp::Coalesce => Some(Any),
            BinaryOp::In => matches!(r, Any | List | Str | Shape::Map(_)).then_some(Bool),
            BinaryOp::Contains => matches!(l, Any | List | Str | Shape::Map(_)).then_some(Bool),
            BinaryOp::StartsWith | BinaryOp::EndsWith => {
                matches!((l, r), (Str | Any, Str | Any)).then_some(Bool)
            }
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                let ordered = (l.is_numeric() && r.is_numeric())
                    || matches!((l, r), (Str | Any, Str | Any));
                ordered.then_some(Bool)
            }
            BinaryOp::Add => match (l, r) {
                (Int, Int) => Some(Int),
                (Int | Float, Int | Float) => Some(Float),
                (Str, Str) => Some(Str),
                (List, List) => Some(List),
                (Any, Any | Int | Float | Str | List) | (Int | Float | Str | List, Any) => {
                    Some(Any)
                }
                _ => None,
            },
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Rem => match (l, r) {
                (Int, Int) => Some(Int),
                (Float, _) | (_, Float) if l.is_numeric() && r.is_numeric() => Some(Float),
                _ if l.is_numeric() && r.is_numeric() => Some(Any),
                _ => None,
            },
            BinaryOp::Div => (l.is_numeric() && r.is_numeric()).then_some(Float),
            BinaryOp::Pow => (l.is_numeric() && r.is_numeric()).then_some(Any),
        };
        shape.ok_or_else(|| {
            self.type_error(
                id,
                format!(
                    "operator `{}` cannot be applied to {} and {}",
                    op.as_symbol(),
                    l.name(),
                    r.name()
                ),
            )
        })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
