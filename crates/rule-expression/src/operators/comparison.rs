//! Comparison operators: the input compared against a bound value.

use crate::error::Error;
use crate::eval_ctx::Context;
use crate::numeric;
use crate::registry::RegistryBuilder;
use crate::schema::{Bindings, Schema, Slot, SlotType};
use crate::types::{Exec, Operator};
use crate::value::Value;
use std::cmp::Ordering;

macro_rules! comparison {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $test:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $ty {
            value: Value,
        }

        impl $ty {
            pub fn new(value: Value) -> Self {
                $ty { value }
            }
        }

        impl Exec for $ty {
            fn exec(&self, _ctx: &Context, input: &Value) -> Result<Value, Error> {
                let test: fn(Ordering) -> bool = $test;
                Ok(Value::Bool(test(numeric::compare(input, &self.value)?)))
            }
        }

        impl Operator for $ty {
            const NAME: &'static str = $name;

            fn schema() -> Schema {
                Schema::slots([Slot::bound("value", SlotType::Value)])
            }

            fn construct(bindings: &mut Bindings) -> Result<Self, Error> {
                Ok($ty::new(bindings.take_value()?))
            }
        }
    };
}

comparison!(
    /// `eq(v)`: input equals `v`.
    Equal, "eq", Ordering::is_eq
);
comparison!(
    /// `ne(v)`: input differs from `v`. Incomparable kinds are still an error.
    NotEqual, "ne", Ordering::is_ne
);
comparison!(Less, "lt", Ordering::is_lt);
comparison!(LessOrEqual, "lte", Ordering::is_le);
comparison!(Greater, "gt", Ordering::is_gt);
comparison!(GreaterOrEqual, "gte", Ordering::is_ge);

pub fn register(registry: &mut RegistryBuilder) {
    registry.register::<Equal>();
    registry.register::<NotEqual>();
    registry.register::<Less>();
    registry.register::<LessOrEqual>();
    registry.register::<Greater>();
    registry.register::<GreaterOrEqual>();
}
