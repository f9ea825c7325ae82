//! Collection operators.

use crate::error::Error;
use crate::eval_ctx::Context;
use crate::registry::RegistryBuilder;
use crate::schema::{Bindings, Schema, Slot, SlotType};
use crate::types::{Exec, Expr, Operator};
use crate::value::Value;
use tracing::trace;

/// Checks every item of an array or map against all sub-expressions.
///
/// Each sub-expression sees the item's value as input, with the `(key, value)`
/// entity available to `elem` and `key`. The first falsy result makes the
/// whole check `false`. An empty collection passes.
#[derive(Debug, Clone)]
pub struct Each {
    conds: Vec<Expr>,
}

impl Each {
    pub fn new(conds: Vec<Expr>) -> Self {
        Each { conds }
    }
}

impl Exec for Each {
    fn exec(&self, ctx: &Context, input: &Value) -> Result<Value, Error> {
        let entries = input
            .entries(ctx.cancellation())
            .ok_or_else(|| Error::NotIterable(input.kind()))?;
        for entity in entries {
            let entity = entity.inspect_err(|_| trace!("iteration cancelled"))?;
            let value = entity.value.clone();
            let item_ctx = ctx.with_entity(entity);
            for cond in &self.conds {
                if !cond.exec(&item_ctx, &value)?.to_bool() {
                    return Ok(Value::Bool(false));
                }
            }
        }
        Ok(Value::Bool(true))
    }
}

impl Operator for Each {
    const NAME: &'static str = "each";

    fn schema() -> Schema {
        Schema::slots([Slot::variadic("conds", SlotType::Expr)])
    }

    fn construct(bindings: &mut Bindings) -> Result<Self, Error> {
        Ok(Each::new(bindings.take_exprs()?))
    }
}

macro_rules! entity_accessor {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $field:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $ty {
            expr: Expr,
        }

        impl $ty {
            pub fn new(expr: Expr) -> Self {
                $ty { expr }
            }
        }

        impl Exec for $ty {
            fn exec(&self, ctx: &Context, _input: &Value) -> Result<Value, Error> {
                let entity = ctx
                    .entity()
                    .ok_or(Error::InvalidIterationContext($name))?;
                self.expr.exec(&ctx.without_entity(), &entity.$field)
            }
        }

        impl Operator for $ty {
            const NAME: &'static str = $name;

            fn schema() -> Schema {
                Schema::slots([Slot::bound("expr", SlotType::Expr)])
            }

            fn construct(bindings: &mut Bindings) -> Result<Self, Error> {
                Ok($ty::new(bindings.take_expr()?))
            }
        }
    };
}

entity_accessor!(
    /// Evaluates its sub-expression against the value of the current entity.
    Elem, "elem", value
);
entity_accessor!(
    /// Evaluates its sub-expression against the key of the current entity:
    /// the index for arrays, the field name for maps.
    Key, "key", key
);

/// Structural length of the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Len;

impl Exec for Len {
    fn exec(&self, _ctx: &Context, input: &Value) -> Result<Value, Error> {
        Ok(Value::Int(input.len() as i64))
    }
}

impl Operator for Len {
    const NAME: &'static str = "len";

    fn schema() -> Schema {
        Schema::empty()
    }

    fn construct(_bindings: &mut Bindings) -> Result<Self, Error> {
        Ok(Len)
    }
}

pub fn register(registry: &mut RegistryBuilder) {
    registry.register::<Each>();
    registry.register::<Elem>();
    registry.register::<Key>();
    registry.register::<Len>();
}
