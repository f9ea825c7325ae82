//! Built-in operators.

pub mod arithmetic;
pub mod branching;
pub mod comparison;
pub mod container;
pub mod input;
pub mod logical;
pub mod string;

use crate::registry::RegistryBuilder;

/// Registers every built-in operator.
pub fn register_builtins(registry: &mut RegistryBuilder) {
    comparison::register(registry);
    arithmetic::register(registry);
    logical::register(registry);
    branching::register(registry);
    container::register(registry);
    input::register(registry);
    string::register(registry);
}
