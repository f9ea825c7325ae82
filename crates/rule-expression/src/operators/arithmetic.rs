//! Arithmetic operators.
//!
//! The bound argument modifies the input: `div(2)` halves it, `pow(3)` cubes
//! it. Integer results stay integral except for inexact division.

use crate::error::Error;
use crate::eval_ctx::Context;
use crate::numeric;
use crate::registry::RegistryBuilder;
use crate::schema::{Bindings, Schema, Slot, SlotType};
use crate::types::{Exec, Operator};
use crate::value::Value;

type Apply = fn(&Value, &Value) -> Result<Value, Error>;

macro_rules! arithmetic {
    ($ty:ident, $name:literal, $apply:path) => {
        #[derive(Debug, Clone)]
        pub struct $ty {
            modifier: Value,
        }

        impl $ty {
            pub fn new(modifier: Value) -> Self {
                $ty { modifier }
            }
        }

        impl Exec for $ty {
            fn exec(&self, _ctx: &Context, input: &Value) -> Result<Value, Error> {
                let apply: Apply = $apply;
                apply(&self.modifier, input)
            }
        }

        impl Operator for $ty {
            const NAME: &'static str = $name;

            fn schema() -> Schema {
                Schema::slots([Slot::bound("modifier", SlotType::Value)])
            }

            fn construct(bindings: &mut Bindings) -> Result<Self, Error> {
                Ok($ty::new(bindings.take_value()?))
            }
        }
    };
}

arithmetic!(Add, "add", numeric::add);
arithmetic!(Sub, "sub", numeric::sub);
arithmetic!(Mul, "mul", numeric::mul);
arithmetic!(Div, "div", numeric::div);
arithmetic!(Mod, "mod", numeric::modulo);
arithmetic!(Pow, "pow", numeric::pow);

pub fn register(registry: &mut RegistryBuilder) {
    registry.register::<Add>();
    registry.register::<Sub>();
    registry.register::<Mul>();
    registry.register::<Div>();
    registry.register::<Mod>();
    registry.register::<Pow>();
}
