use crate::error::Error;
use crate::eval_ctx::Context;
use crate::schema::{Bindings, Schema};
use crate::stringify;
use crate::value::Value;
use serde::{Serialize, Serializer};
use serde_json::Value as Json;
use std::fmt;
use std::sync::Arc;

/// Evaluation contract of an operator instance.
///
/// Instances are immutable once built, so `exec` may run concurrently on
/// several threads against the same tree.
pub trait Exec: fmt::Debug + Send + Sync {
    fn exec(&self, ctx: &Context, input: &Value) -> Result<Value, Error>;
}

/// An operator type the registry can construct from bound arguments.
pub trait Operator: Exec + Sized + 'static {
    /// Canonical name used when the operator is registered without an override.
    const NAME: &'static str;

    /// How positional arguments bind to this operator.
    fn schema() -> Schema;

    /// Builds the instance from arguments bound according to [`Operator::schema`].
    fn construct(bindings: &mut Bindings) -> Result<Self, Error>;
}

/// A resolved argument: a literal or a nested expression.
#[derive(Debug, Clone)]
pub enum Arg {
    Value(Value),
    Expr(Expr),
}

impl Arg {
    /// Evaluates the argument: literals evaluate to themselves.
    pub fn eval(&self, ctx: &Context, input: &Value) -> Result<Value, Error> {
        match self {
            Arg::Value(v) => Ok(v.clone()),
            Arg::Expr(e) => e.exec(ctx, input),
        }
    }

    pub fn to_generic(&self) -> Json {
        match self {
            Arg::Value(v) => v.to_json(),
            Arg::Expr(e) => e.to_generic(),
        }
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Value(v)
    }
}

impl From<Expr> for Arg {
    fn from(e: Expr) -> Self {
        Arg::Expr(e)
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(v) => f.write_str(&stringify::value(v)),
            Arg::Expr(e) => fmt::Display::fmt(e, f),
        }
    }
}

struct Node {
    name: String,
    args: Vec<Arg>,
    op: Box<dyn Exec>,
}

/// A resolved, executable expression.
///
/// Cloning is cheap: clones share the same immutable node. The node keeps the
/// operator name and the arguments it was built from so it can render itself
/// back to text or to the generic array form.
#[derive(Clone)]
pub struct Expr(Arc<Node>);

impl Expr {
    pub(crate) fn new(name: impl Into<String>, args: Vec<Arg>, op: impl Exec + 'static) -> Self {
        Self::from_boxed(name.into(), args, Box::new(op))
    }

    pub(crate) fn from_boxed(name: String, args: Vec<Arg>, op: Box<dyn Exec>) -> Self {
        Expr(Arc::new(Node { name, args, op }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn args(&self) -> &[Arg] {
        &self.0.args
    }

    pub fn exec(&self, ctx: &Context, input: &Value) -> Result<Value, Error> {
        self.0.op.exec(ctx, input)
    }

    /// Renders the expression back to `["name", args...]`.
    pub fn to_generic(&self) -> Json {
        let mut items = Vec::with_capacity(self.0.args.len() + 1);
        items.push(Json::String(self.0.name.clone()));
        items.extend(self.0.args.iter().map(Arg::to_generic));
        Json::Array(items)
    }
}

/// Canonical text: `name(arg1,arg2)`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.0.name)?;
        for (i, arg) in self.0.args.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({})", self)
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_generic().serialize(serializer)
    }
}
