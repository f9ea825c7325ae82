//! Control flow: `pipe`, `select` and `when`.

use crate::error::Error;
use crate::eval_ctx::Context;
use crate::registry::RegistryBuilder;
use crate::schema::{Bindings, Schema, Slot, SlotType};
use crate::types::{Arg, Exec, Expr, Operator};
use crate::value::Value;
use std::borrow::Cow;

/// Threads a running value through its stages.
///
/// An expression stage maps the running value to its result. A literal stage
/// replaces it.
#[derive(Debug, Clone)]
pub struct Pipe {
    stages: Vec<Arg>,
}

impl Pipe {
    pub fn new(stages: Vec<Arg>) -> Self {
        Pipe { stages }
    }
}

impl Exec for Pipe {
    fn exec(&self, ctx: &Context, input: &Value) -> Result<Value, Error> {
        let mut value = input.clone();
        let mut ctx = Cow::Borrowed(ctx);
        for (i, stage) in self.stages.iter().enumerate() {
            // The entity describes the original input only.
            if i == 1 && ctx.entity().is_some() {
                ctx = Cow::Owned(ctx.without_entity());
            }
            value = stage.eval(&ctx, &value)?;
        }
        Ok(value)
    }
}

impl Operator for Pipe {
    const NAME: &'static str = "pipe";

    fn schema() -> Schema {
        Schema::Raw
    }

    fn construct(bindings: &mut Bindings) -> Result<Self, Error> {
        Ok(Pipe::new(bindings.take_args()?))
    }
}

/// The first non-nil stage result, each stage seeing the original input.
#[derive(Debug, Clone)]
pub struct Select {
    stages: Vec<Arg>,
}

impl Select {
    pub fn new(stages: Vec<Arg>) -> Self {
        Select { stages }
    }
}

impl Exec for Select {
    fn exec(&self, ctx: &Context, input: &Value) -> Result<Value, Error> {
        for stage in &self.stages {
            let value = stage.eval(ctx, input)?;
            if !value.is_nil() {
                return Ok(value);
            }
        }
        Ok(Value::Invalid)
    }
}

impl Operator for Select {
    const NAME: &'static str = "select";

    fn schema() -> Schema {
        Schema::Raw
    }

    fn construct(bindings: &mut Bindings) -> Result<Self, Error> {
        Ok(Select::new(bindings.take_args()?))
    }
}

/// `then` evaluated against the input when `cond` holds, nil otherwise.
#[derive(Debug, Clone)]
pub struct When {
    cond: Expr,
    then: Expr,
}

impl When {
    pub fn new(cond: Expr, then: Expr) -> Self {
        When { cond, then }
    }
}

impl Exec for When {
    fn exec(&self, ctx: &Context, input: &Value) -> Result<Value, Error> {
        if self.cond.exec(ctx, input)?.to_bool() {
            self.then.exec(ctx, input)
        } else {
            Ok(Value::Invalid)
        }
    }
}

impl Operator for When {
    const NAME: &'static str = "when";

    fn schema() -> Schema {
        Schema::slots([
            Slot::bound("cond", SlotType::Expr),
            Slot::bound("then", SlotType::Expr),
        ])
    }

    fn construct(bindings: &mut Bindings) -> Result<Self, Error> {
        let cond = bindings.take_expr()?;
        let then = bindings.take_expr()?;
        Ok(When::new(cond, then))
    }
}

pub fn register(registry: &mut RegistryBuilder) {
    registry.register::<Pipe>();
    registry.register::<Select>();
    registry.register::<When>();
}
