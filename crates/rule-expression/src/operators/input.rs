//! Context variable access.

use crate::error::Error;
use crate::eval_ctx::Context;
use crate::registry::RegistryBuilder;
use crate::schema::{Bindings, Schema, Slot, SlotType};
use crate::types::{Exec, Operator};
use crate::value::Value;

/// Reads a named variable through the context's value getter. The input is
/// ignored.
#[derive(Debug, Clone)]
pub struct Get {
    name: String,
}

impl Get {
    pub fn new(name: impl Into<String>) -> Self {
        Get { name: name.into() }
    }
}

impl Exec for Get {
    fn exec(&self, ctx: &Context, _input: &Value) -> Result<Value, Error> {
        ctx.lookup(&self.name)
    }
}

impl Operator for Get {
    const NAME: &'static str = "get";

    fn schema() -> Schema {
        Schema::slots([Slot::bound("name", SlotType::Str)])
    }

    fn construct(bindings: &mut Bindings) -> Result<Self, Error> {
        Ok(Get::new(bindings.take_text()?))
    }
}

pub fn register(registry: &mut RegistryBuilder) {
    registry.register::<Get>();
}
