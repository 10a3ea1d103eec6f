//! `serde` conversion of unevaluated documents to native data.
//!
//! Literals become native scalars, blocks become maps, aggregates become
//! sequences. Expressions are kept as their `{{ ... }}` source because they
//! only have a value after evaluation.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::ast::{Ast, Namespace, Tuple, Value};
use crate::literal::{self, Number};

impl Serialize for Ast {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for ns in self.namespaces() {
            map.serialize_entry(ns.name(), ns.value())?;
        }
        map.end()
    }
}

impl Serialize for Namespace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

impl Serialize for Tuple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_block() {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for ns in self.namespaces() {
                map.serialize_entry(ns.name(), ns.value())?;
            }
            map.end()
        } else {
            let mut seq = serializer.serialize_seq(Some(self.len()))?;
            for value in self.values() {
                seq.serialize_element(value)?;
            }
            seq.end()
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Identifier(t) => serializer.serialize_str(&t.text),
            Value::Boolean(t) => match literal::parse_bool(&t.text) {
                Some(b) => serializer.serialize_bool(b),
                None => serializer.serialize_str(&t.text),
            },
            Value::Number(t) => match literal::parse_number(&t.text) {
                Some(Number::Int(n)) => serializer.serialize_i64(n),
                Some(Number::Float(n)) => serializer.serialize_f64(n),
                None => serializer.serialize_str(&t.text),
            },
            Value::String(t) => match literal::unescape(&t.text) {
                Some(s) => serializer.serialize_str(&s),
                None => serializer.serialize_str(&t.text),
            },
            Value::Expr(e) => serializer.serialize_str(&format!("{{{{ {} }}}}", e.source())),
            Value::Tuple(t) => t.serialize(serializer),
            Value::Namespace(ns) => ns.serialize(serializer),
        }
    }
}
