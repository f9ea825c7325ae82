//! Boolean combinators.

use super::comparison::Equal;
use crate::error::Error;
use crate::eval_ctx::Context;
use crate::registry::RegistryBuilder;
use crate::schema::{Bindings, Schema, Slot, SlotType};
use crate::types::{Arg, Exec, Expr, Operator};
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct Not {
    cond: Expr,
}

impl Not {
    pub fn new(cond: Expr) -> Self {
        Not { cond }
    }
}

impl Exec for Not {
    fn exec(&self, ctx: &Context, input: &Value) -> Result<Value, Error> {
        Ok(Value::Bool(!self.cond.exec(ctx, input)?.to_bool()))
    }
}

impl Operator for Not {
    const NAME: &'static str = "not";

    fn schema() -> Schema {
        Schema::slots([Slot::bound("cond", SlotType::Expr)])
    }

    fn construct(bindings: &mut Bindings) -> Result<Self, Error> {
        Ok(Not::new(bindings.take_expr()?))
    }
}

/// True when every sub-expression is. Empty is true.
#[derive(Debug, Clone)]
pub struct AllOf {
    conds: Vec<Expr>,
}

impl AllOf {
    pub fn new(conds: Vec<Expr>) -> Self {
        AllOf { conds }
    }
}

impl Exec for AllOf {
    fn exec(&self, ctx: &Context, input: &Value) -> Result<Value, Error> {
        for cond in &self.conds {
            if !cond.exec(ctx, input)?.to_bool() {
                return Ok(Value::Bool(false));
            }
        }
        Ok(Value::Bool(true))
    }
}

impl Operator for AllOf {
    const NAME: &'static str = "allOf";

    fn schema() -> Schema {
        Schema::Raw
    }

    fn construct(bindings: &mut Bindings) -> Result<Self, Error> {
        Ok(AllOf::new(bindings.take_exprs()?))
    }
}

/// True when some sub-expression is. Empty is false.
#[derive(Debug, Clone)]
pub struct AnyOf {
    conds: Vec<Expr>,
}

impl AnyOf {
    pub fn new(conds: Vec<Expr>) -> Self {
        AnyOf { conds }
    }
}

impl Exec for AnyOf {
    fn exec(&self, ctx: &Context, input: &Value) -> Result<Value, Error> {
        for cond in &self.conds {
            if cond.exec(ctx, input)?.to_bool() {
                return Ok(Value::Bool(true));
            }
        }
        Ok(Value::Bool(false))
    }
}

impl Operator for AnyOf {
    const NAME: &'static str = "anyOf";

    fn schema() -> Schema {
        Schema::Raw
    }

    fn construct(bindings: &mut Bindings) -> Result<Self, Error> {
        Ok(AnyOf::new(bindings.take_exprs()?))
    }
}

/// True when exactly one branch matches. Literal branches compare with `eq`.
#[derive(Debug, Clone)]
pub struct OneOf {
    branches: Vec<Expr>,
}

impl OneOf {
    pub fn new(args: Vec<Arg>) -> Self {
        let branches = args
            .into_iter()
            .map(|arg| match arg {
                Arg::Expr(e) => e,
                Arg::Value(v) => Expr::new(
                    Equal::NAME,
                    vec![Arg::Value(v.clone())],
                    Equal::new(v),
                ),
            })
            .collect();
        OneOf { branches }
    }
}

impl Exec for OneOf {
    fn exec(&self, ctx: &Context, input: &Value) -> Result<Value, Error> {
        let mut matched = 0;
        for branch in &self.branches {
            if branch.exec(ctx, input)?.to_bool() {
                matched += 1;
                if matched > 1 {
                    return Ok(Value::Bool(false));
                }
            }
        }
        Ok(Value::Bool(matched == 1))
    }
}

impl Operator for OneOf {
    const NAME: &'static str = "oneOf";

    fn schema() -> Schema {
        Schema::Raw
    }

    fn construct(bindings: &mut Bindings) -> Result<Self, Error> {
        Ok(OneOf::new(bindings.take_args()?))
    }
}

pub fn register(registry: &mut RegistryBuilder) {
    registry.register::<Not>();
    registry.register::<AllOf>();
    registry.register::<AnyOf>();
    registry.register::<OneOf>();
}
