//! Namespaces, tuples and values.

use std::fmt;
use std::sync::Arc;

use mung_expr::Program;
use smallvec::SmallVec;

use crate::options::ParseOptions;
use crate::span::Position;
use crate::token::{Token, TokenKind};

/// A declared parameter. Only the last parameter may be variadic.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: String,
    pub variadic: bool,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            variadic: false,
        }
    }

    pub fn variadic(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            variadic: true,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variadic {
            f.write_str("...")?;
        }
        f.write_str(&self.name)
    }
}

/// Parameter list. Most namespaces take none or a couple.
pub type Params = SmallVec<[Param; 2]>;

/// Error raised when a node is assembled in violation of its invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AstError {
    /// A variadic parameter was followed by another parameter.
    VariadicNotLast { namespace: String, param: String },
    /// Literal text that does not cook into a value of its kind.
    InvalidLiteral { kind: TokenKind, text: String },
    /// An empty or otherwise unusable identifier.
    InvalidIdentifier { text: String },
}

impl fmt::Display for AstError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstError::VariadicNotLast { namespace, param } => write!(
                f,
                "variadic parameter `...{param}` of `{namespace}` must be the last parameter"
            ),
            AstError::InvalidLiteral { kind, text } => {
                write!(f, "`{text}` is not a valid {kind} literal")
            }
            AstError::InvalidIdentifier { text } => write!(f, "`{text}` is not a valid identifier"),
        }
    }
}

impl std::error::Error for AstError {}

/// A named, optionally parameterized binding to exactly one value.
#[derive(Clone, Debug, PartialEq)]
pub struct Namespace {
    ident: Token,
    params: Params,
    value: Value,
}

impl Namespace {
    /// Build a namespace, enforcing that only the last parameter is variadic.
    pub fn new(
        ident: Token,
        params: impl IntoIterator<Item = Param>,
        value: Value,
    ) -> Result<Self, AstError> {
        let params: Params = params.into_iter().collect();
        if let Some(pos) = params.iter().position(|p| p.variadic) {
            if pos + 1 != params.len() {
                return Err(AstError::VariadicNotLast {
                    namespace: ident.text.clone(),
                    param: params[pos].name.clone(),
                });
            }
        }
        Ok(Namespace {
            ident,
            params,
            value,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.ident.text
    }

    #[inline]
    pub fn ident(&self) -> &Token {
        &self.ident
    }

    #[inline]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[inline]
    pub fn pos(&self) -> Position {
        self.ident.pos
    }

    /// A namespace with parameters evaluates to a callable.
    #[inline]
    pub fn is_parameterized(&self) -> bool {
        !self.params.is_empty()
    }

    /// The variadic tail parameter, if any.
    pub fn variadic(&self) -> Option<&Param> {
        self.params.last().filter(|p| p.variadic)
    }

    /// Number of parameters before the variadic tail.
    pub fn fixed_arity(&self) -> usize {
        self.params.len() - usize::from(self.variadic().is_some())
    }

    /// Does a call with `argc` arguments satisfy the parameter list?
    pub fn accepts(&self, argc: usize) -> bool {
        if self.variadic().is_some() {
            argc >= self.fixed_arity()
        } else {
            argc == self.params.len()
        }
    }

    /// Declared signature, e.g. `add x y` or `sum ...nums`.
    pub fn signature(&self) -> String {
        let mut out = self.ident.text.clone();
        for param in &self.params {
            out.push(' ');
            out.push_str(&param.to_string());
        }
        out
    }
}

/// An ordered sequence of values.
///
/// A tuple whose elements are all namespace definitions is a *block* and
/// evaluates to a map; anything else is an *aggregate* and evaluates to an
/// array. The distinction is structural and re-derived on demand.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tuple {
    values: Vec<Value>,
}

impl Tuple {
    pub fn new(values: Vec<Value>) -> Self {
        Tuple { values }
    }

    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All elements are namespace definitions. The empty tuple is a block.
    pub fn is_block(&self) -> bool {
        self.values
            .iter()
            .all(|v| matches!(v, Value::Namespace(_)))
    }

    /// Namespace elements, in order.
    pub fn namespaces(&self) -> impl Iterator<Item = &Arc<Namespace>> {
        self.values.iter().filter_map(Value::as_namespace)
    }

    /// First namespace element named `name`.
    pub fn find(&self, name: &str) -> Option<&Arc<Namespace>> {
        self.namespaces().find(|ns| ns.name() == name)
    }
}

/// An expression literal with an optional pre-compiled program.
#[derive(Clone, Debug)]
pub struct ExprLiteral {
    token: Token,
    program: Option<Arc<Program>>,
}

impl ExprLiteral {
    pub fn new(token: Token) -> Self {
        ExprLiteral {
            token,
            program: None,
        }
    }

    #[must_use]
    pub fn with_program(mut self, program: Arc<Program>) -> Self {
        self.program = Some(program);
        self
    }

    #[inline]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Expression source text.
    #[inline]
    pub fn source(&self) -> &str {
        &self.token.text
    }

    /// Program compiled while parsing, when eager compilation was requested.
    #[inline]
    pub fn program(&self) -> Option<&Arc<Program>> {
        self.program.as_ref()
    }
}

impl PartialEq for ExprLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

/// Discriminant of [`Value`], for diagnostics and shape checks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Identifier,
    Boolean,
    Number,
    String,
    Expr,
    Tuple,
    Namespace,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Identifier => "identifier",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Expr => "expression",
            ValueKind::Tuple => "tuple",
            ValueKind::Namespace => "namespace",
        }
    }

    /// Token kind a value of this kind must carry.
    pub fn token_kind(self) -> Option<TokenKind> {
        match self {
            ValueKind::Identifier => Some(TokenKind::Ident),
            ValueKind::Boolean => Some(TokenKind::Bool),
            ValueKind::Number => Some(TokenKind::Number),
            ValueKind::String => Some(TokenKind::Str),
            ValueKind::Expr => Some(TokenKind::Expr),
            ValueKind::Tuple | ValueKind::Namespace => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value: one variant, one payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Identifier(Token),
    Boolean(Token),
    Number(Token),
    String(Token),
    Expr(ExprLiteral),
    Tuple(Arc<Tuple>),
    Namespace(Arc<Namespace>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Identifier(_) => ValueKind::Identifier,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Expr(_) => ValueKind::Expr,
            Value::Tuple(_) => ValueKind::Tuple,
            Value::Namespace(_) => ValueKind::Namespace,
        }
    }

    /// The token of a leaf value.
    pub fn token(&self) -> Option<&Token> {
        match self {
            Value::Identifier(t) | Value::Boolean(t) | Value::Number(t) | Value::String(t) => {
                Some(t)
            }
            Value::Expr(e) => Some(e.token()),
            Value::Tuple(_) | Value::Namespace(_) => None,
        }
    }

    /// Best-effort source position.
    pub fn pos(&self) -> Position {
        match self {
            Value::Namespace(ns) => ns.pos(),
            Value::Tuple(t) => t.values().first().map_or(Position::DUMMY, Value::pos),
            _ => self.token().map_or(Position::DUMMY, |t| t.pos),
        }
    }

    #[inline]
    pub fn as_namespace(&self) -> Option<&Arc<Namespace>> {
        match self {
            Value::Namespace(ns) => Some(ns),
            _ => None,
        }
    }

    #[inline]
    pub fn as_tuple(&self) -> Option<&Arc<Tuple>> {
        match self {
            Value::Tuple(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    pub fn is_expr(&self) -> bool {
        matches!(self, Value::Expr(_))
    }

    /// Boolean, number or string literal.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Boolean(_) | Value::Number(_) | Value::String(_))
    }
}

/// A parsed (or programmatically built) document.
#[derive(Clone, Debug, Default)]
pub struct Ast {
    namespaces: Arc<Vec<Arc<Namespace>>>,
    options: ParseOptions,
}

impl Ast {
    pub fn new(options: ParseOptions) -> Self {
        Ast {
            namespaces: Arc::default(),
            options,
        }
    }

    pub fn from_namespaces(namespaces: Vec<Arc<Namespace>>, options: ParseOptions) -> Self {
        Ast {
            namespaces: Arc::new(namespaces),
            options,
        }
    }

    #[inline]
    pub fn namespaces(&self) -> &[Arc<Namespace>] {
        &self.namespaces
    }

    /// The namespace list as a shareable handle, for scopes that outlive
    /// a borrow of the document.
    #[inline]
    pub fn shared_namespaces(&self) -> Arc<Vec<Arc<Namespace>>> {
        Arc::clone(&self.namespaces)
    }

    #[inline]
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// First namespace named `name`.
    pub fn namespace(&self, name: &str) -> Option<&Arc<Namespace>> {
        self.namespaces.iter().find(|ns| ns.name() == name)
    }

    /// Replace the first namespace with the same name, or append.
    ///
    /// The replaced node is not mutated; other holders of it keep seeing
    /// the old definition.
    pub fn define(&mut self, namespace: Namespace) -> Arc<Namespace> {
        let namespace = Arc::new(namespace);
        let list = Arc::make_mut(&mut self.namespaces);
        match list.iter_mut().find(|ns| ns.name() == namespace.name()) {
            Some(slot) => *slot = Arc::clone(&namespace),
            None => list.push(Arc::clone(&namespace)),
        }
        namespace
    }
}

impl PartialEq for Ast {
    fn eq(&self, other: &Self) -> bool {
        self.namespaces == other.namespaces
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
