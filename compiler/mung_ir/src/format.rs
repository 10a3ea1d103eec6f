//! Native-syntax rendering.
//!
//! Output reparses to a document with the same namespace names, parameter
//! lists and value shapes. Bare expressions are always written in the
//! `{{ ... }}` form.

use std::fmt::{self, Write};

use crate::ast::{Ast, Namespace, Tuple, Value};

const INDENT: &str = "  ";

struct Printer<'a, 'f> {
    out: &'a mut fmt::Formatter<'f>,
    depth: usize,
}

impl Printer<'_, '_> {
    fn indent(&mut self) -> fmt::Result {
        for _ in 0..self.depth {
            self.out.write_str(INDENT)?;
        }
        Ok(())
    }

    fn namespace(&mut self, ns: &Namespace) -> fmt::Result {
        self.out.write_str(ns.name())?;
        for param in ns.params() {
            write!(self.out, " {param}")?;
        }
        self.out.write_str(" : ")?;
        self.value(ns.value())
    }

    fn value(&mut self, value: &Value) -> fmt::Result {
        match value {
            Value::Identifier(t) | Value::Boolean(t) | Value::Number(t) | Value::String(t) => {
                self.out.write_str(&t.text)
            }
            Value::Expr(e) => write!(self.out, "{{{{ {} }}}}", e.source()),
            Value::Namespace(ns) => self.namespace(ns),
            Value::Tuple(t) => self.tuple(t),
        }
    }

    fn tuple(&mut self, tuple: &Tuple) -> fmt::Result {
        if tuple.is_empty() {
            return self.out.write_str("{}");
        }
        if !tuple.is_block() {
            // Aggregates have no block syntax; write them as an array.
            self.out.write_char('[')?;
            for (i, value) in tuple.values().iter().enumerate() {
                if i > 0 {
                    self.out.write_str(", ")?;
                }
                self.value(value)?;
            }
            return self.out.write_char(']');
        }
        self.out.write_str("{\n")?;
        self.depth += 1;
        for ns in tuple.namespaces() {
            self.indent()?;
            self.namespace(ns)?;
            self.out.write_str(";\n")?;
        }
        self.depth -= 1;
        self.indent()?;
        self.out.write_char('}')
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer { out: f, depth: 0 };
        for ns in self.namespaces() {
            printer.namespace(ns)?;
            printer.out.write_str(";\n")?;
        }
        Ok(())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer { out: f, depth: 0 }.namespace(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer { out: f, depth: 0 }.value(self)
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer { out: f, depth: 0 }.tuple(self)
    }
}
