//! Tree-walking execution of a [`Program`].

use std::any::Any;

use rustc_hash::FxHashMap;

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::stdlib;
use crate::syntax::{BinaryOp, Expr, ExprId, Program, UnaryOp};
use crate::value::{Callable, Func, Map, Value};

/// Runtime environment: name to value.
pub type Env = FxHashMap<String, Value>;

/// Embedder callbacks for [`Callable::Host`] functions.
pub trait Host {
    fn call(
        &mut self,
        func: &Func,
        handle: &(dyn Any + Send + Sync),
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError>;
}

/// A host that owns no callables.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoHost;

impl Host for NoHost {
    fn call(
        &mut self,
        func: &Func,
        _handle: &(dyn Any + Send + Sync),
        _args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        Err(RuntimeError::host(format!(
            "`{}` cannot be called without its host",
            func.name()
        )))
    }
}

/// Execute a program against an environment.
pub fn run(program: &Program, env: &Env, host: &mut dyn Host) -> Result<Value, RuntimeError> {
    Machine { program, env, host }.eval(program.root())
}

/// Call a function value with already evaluated arguments.
pub fn call(func: &Func, args: Vec<Value>, host: &mut dyn Host) -> Result<Value, RuntimeError> {
    if !func.arity().accepts(args.len()) {
        return Err(RuntimeError::new(RuntimeErrorKind::ArgumentCount {
            name: func.name().to_string(),
            expected: func.arity(),
            got: args.len(),
        }));
    }
    match func.callable() {
        Callable::Native(f) => f(&args),
        Callable::Host(handle) => host.call(func, handle.as_ref(), args),
    }
}

struct Machine<'a> {
    program: &'a Program,
    env: &'a Env,
    host: &'a mut dyn Host,
}

impl Machine<'_> {
    fn eval(&mut self, id: ExprId) -> Result<Value, RuntimeError> {
        mung_stack::with_stack(|| self.eval_node(id)).map_err(|e| e.at(self.program.offset(id)))
    }

    fn eval_node(&mut self, id: ExprId) -> Result<Value, RuntimeError> {
        let program = self.program;
        match program.get(id) {
            Expr::Nil => Ok(Value::Nil),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Float(n) => Ok(Value::Float(*n)),
            Expr::Str(s) => Ok(Value::str(s.as_str())),
            Expr::Ident(name) => self.lookup(name),
            Expr::Member {
                object,
                field,
                optional,
            } => {
                let target = self.eval(*object)?;
                if target.is_nil() && *optional {
                    return Ok(Value::Nil);
                }
                target.member(field).ok_or_else(|| {
                    RuntimeError::type_error(format!(
                        "cannot access `{field}` on {}",
                        target.type_name()
                    ))
                })
            }
            Expr::Index { object, index } => {
                let target = self.eval(*object)?;
                let index = self.eval(*index)?;
                index_value(&target, &index)
            }
            Expr::Call { callee, args } => {
                let func = match self.eval(*callee)? {
                    Value::Func(func) => func,
                    other => {
                        return Err(RuntimeError::new(RuntimeErrorKind::NotCallable {
                            type_name: other.type_name(),
                        }))
                    }
                };
                let args = args
                    .iter()
                    .map(|a| self.eval(*a))
                    .collect::<Result<Vec<_>, _>>()?;
                call(&func, args, &mut *self.host)
            }
            Expr::List(items) => {
                let items = items
                    .iter()
                    .map(|a| self.eval(*a))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::list(items))
            }
            Expr::Map(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    let value = self.eval(*value)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::map(map))
            }
            Expr::Unary { op, operand } => {
                let value = self.eval(*operand)?;
                unary(*op, &value)
            }
            Expr::Binary { op, left, right } => self.binary(*op, *left, *right),
            Expr::Ternary {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.eval(*cond)?;
                match cond.truthy() {
                    Some(true) => self.eval(*then),
                    Some(false) => self.eval(*otherwise),
                    None => Err(RuntimeError::type_error(format!(
                        "condition must be bool, got {}",
                        cond.type_name()
                    ))),
                }
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Value, RuntimeError> {
        if let Some(value) = self.env.get(name) {
            return Ok(value.clone());
        }
        stdlib::lookup(name).cloned().ok_or_else(|| {
            RuntimeError::new(RuntimeErrorKind::UnknownName {
                name: name.to_string(),
            })
        })
    }

    fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> Result<Value, RuntimeError> {
        let lhs = self.eval(left)?;
        match op {
            BinaryOp::And | BinaryOp::Or => {
                let l = condition(op, &lhs)?;
                if (op == BinaryOp::And) != l {
                    return Ok(Value::Bool(l));
                }
                let rhs = self.eval(right)?;
                Ok(Value::Bool(condition(op, &rhs)?))
            }
            BinaryOp::Coalesce => {
                if lhs.is_nil() {
                    self.eval(right)
                } else {
                    Ok(lhs)
                }
            }
            _ => {
                let rhs = self.eval(right)?;
                binary(op, &lhs, &rhs)
            }
        }
    }
}

fn condition(op: BinaryOp, value: &Value) -> Result<bool, RuntimeError> {
    value.truthy().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "operator `{}` expects bool operands, got {}",
            op.as_symbol(),
            value.type_name()
        ))
    })
}

fn index_value(target: &Value, index: &Value) -> Result<Value, RuntimeError> {
    match (target, index) {
        (Value::List(items), Value::Int(i)) => {
            let len = items.len();
            position(*i, len)
                .map(|p| items[p].clone())
                .ok_or_else(|| RuntimeError::new(RuntimeErrorKind::IndexOutOfBounds { index: *i, len }))
        }
        (Value::Str(s), Value::Int(i)) => {
            let chars: Vec<char> = s.chars().collect();
            position(*i, chars.len())
                .map(|p| Value::str(chars[p].to_string()))
                .ok_or_else(|| {
                    RuntimeError::new(RuntimeErrorKind::IndexOutOfBounds {
                        index: *i,
                        len: chars.len(),
                    })
                })
        }
        (Value::Map(map), Value::Str(key)) => Ok(map.get(&**key).cloned().unwrap_or_default()),
        (Value::Func(_), Value::Str(key)) => Ok(target.member(key).unwrap_or_default()),
        _ => Err(RuntimeError::type_error(format!(
            "cannot index {} with {}",
            target.type_name(),
            index.type_name()
        ))),
    }
}

/// Resolve a possibly negative index. Negative indexes count from the end.
fn position(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let idx = if index < 0 { index + len } else { index };
    if (0..len).contains(&idx) {
        usize::try_from(idx).ok()
    } else {
        None
    }
}

fn unary(op: UnaryOp, value: &Value) -> Result<Value, RuntimeError> {
    match (op, value) {
        (UnaryOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or(RuntimeError::new(RuntimeErrorKind::Overflow {
                operation: "negation",
            })),
        (UnaryOp::Neg, Value::Float(n)) => Ok(Value::Float(-n)),
        (UnaryOp::Not, v) if v.truthy().is_some() => Ok(Value::Bool(v.truthy() == Some(false))),
        _ => Err(RuntimeError::type_error(format!(
            "operator `{}` cannot be applied to {}",
            op.as_symbol(),
            value.type_name()
        ))),
    }
}

fn overflow(operation: &'static str) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::Overflow { operation })
}

fn mismatch(op: BinaryOp, lhs: &Value, rhs: &Value) -> RuntimeError {
    RuntimeError::type_error(format!(
        "operator `{}` cannot be applied to {} and {}",
        op.as_symbol(),
        lhs.type_name(),
        rhs.type_name()
    ))
}

/// Apply a strict (non short-circuiting) binary operator.
pub(crate) fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, RuntimeError> {
    use Value::{Float, Int, List, Str};
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(lhs == rhs)),
        BinaryOp::NotEq => return Ok(Value::Bool(lhs != rhs)),
        BinaryOp::In => {
            return stdlib::contains(&[rhs.clone(), lhs.clone()])
                .map_err(|_| mismatch(op, lhs, rhs))
        }
        BinaryOp::Contains => {
            return stdlib::contains(&[lhs.clone(), rhs.clone()]).map_err(|_| mismatch(op, lhs, rhs))
        }
        BinaryOp::StartsWith => {
            return stdlib::starts_with(&[lhs.clone(), rhs.clone()])
                .map_err(|_| mismatch(op, lhs, rhs))
        }
        BinaryOp::EndsWith => {
            return stdlib::ends_with(&[lhs.clone(), rhs.clone()]).map_err(|_| mismatch(op, lhs, rhs))
        }
        _ => {}
    }

    match (op, lhs, rhs) {
        (BinaryOp::Add, Int(a), Int(b)) => a.checked_add(*b).map(Int).ok_or(overflow("addition")),
        (BinaryOp::Sub, Int(a), Int(b)) => {
            a.checked_sub(*b).map(Int).ok_or(overflow("subtraction"))
        }
        (BinaryOp::Mul, Int(a), Int(b)) => {
            a.checked_mul(*b).map(Int).ok_or(overflow("multiplication"))
        }
        (BinaryOp::Rem, Int(_), Int(0)) | (BinaryOp::Div, Int(_), Int(0)) => {
            Err(RuntimeError::new(RuntimeErrorKind::DivisionByZero))
        }
        (BinaryOp::Rem, Int(a), Int(b)) => a.checked_rem(*b).map(Int).ok_or(overflow("remainder")),
        (BinaryOp::Pow, Int(a), Int(b)) if *b >= 0 => u32::try_from(*b)
            .ok()
            .and_then(|e| a.checked_pow(e))
            .map(Int)
            .ok_or(overflow("exponentiation")),
        (BinaryOp::Add, Str(a), Str(b)) => Ok(Value::str(format!("{a}{b}"))),
        (BinaryOp::Add, List(a), List(b)) => {
            let mut items = Vec::with_capacity(a.len() + b.len());
            items.extend(a.iter().cloned());
            items.extend(b.iter().cloned());
            Ok(Value::list(items))
        }
        (BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq, Str(a), Str(b)) => {
            Ok(Value::Bool(compare(op, a.cmp(b))))
        }
        _ => {
            let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) else {
                return Err(mismatch(op, lhs, rhs));
            };
            match op {
                BinaryOp::Add => Ok(Float(a + b)),
                BinaryOp::Sub => Ok(Float(a - b)),
                BinaryOp::Mul => Ok(Float(a * b)),
                BinaryOp::Div | BinaryOp::Rem if b == 0.0 => {
                    Err(RuntimeError::new(RuntimeErrorKind::DivisionByZero))
                }
                BinaryOp::Div => Ok(Float(a / b)),
                BinaryOp::Rem => Ok(Float(a % b)),
                BinaryOp::Pow => Ok(Float(a.powf(b))),
                BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                    match a.partial_cmp(&b) {
                        Some(ord) => Ok(Value::Bool(compare(op, ord))),
                        None => Ok(Value::Bool(false)),
                    }
                }
                _ => Err(mismatch(op, lhs, rhs)),
            }
        }
    }
}

fn compare(op: BinaryOp, ord: std::cmp::Ordering) -> bool {
    match op {
        BinaryOp::Lt => ord.is_lt(),
        BinaryOp::LtEq => ord.is_le(),
        BinaryOp::Gt => ord.is_gt(),
        _ => ord.is_ge(),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
