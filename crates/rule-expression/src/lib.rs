//! Rule expression language.
//!
//! # Overview
//!
//! Rules are trees of named operators. They can be written as call syntax
//! (`allOf(pipe(len(),gte(3)),each(elem(match("^a"))))`), as the generic
//! array form (`["allOf", ["pipe", ["len"], ["gte", 3]], ...]`), or built with
//! the functions in [`builder`]. Either form resolves into an [`Expr`] that
//! can be evaluated any number of times, from any number of threads, against
//! an input [`Value`] and a [`Context`].
//!
//! # Example
//!
//! ```
//! use rule_expression::{compile, Context, Value};
//! use std::collections::HashMap;
//!
//! let expr = compile(r#"pipe(get("x"), len(), eq(5))"#).unwrap();
//! let vars = HashMap::from([("x".to_string(), Value::from("12345"))]);
//! let ctx = Context::new().with_getter(vars);
//!
//! assert_eq!(expr.exec(&ctx, &Value::Invalid).unwrap(), Value::Bool(true));
//! assert_eq!(expr.to_string(), r#"pipe(get("x"),len(),eq(5))"#);
//! ```

pub mod builder;
pub mod cancel;
pub mod error;
pub mod eval_ctx;
pub mod factory;
pub mod numeric;
pub mod operators;
pub mod parser;
pub mod registry;
pub mod schema;
pub mod stringify;
pub mod types;
pub mod value;

pub use cancel::Cancellation;
pub use error::{Error, Result};
pub use eval_ctx::{Context, FnGetter, ValueGetter};
pub use factory::{Factory, FactoryOptions};
pub use parser::{
    parse, parse_str, parse_str_with_max_depth, ParseError, DEFAULT_MAX_DEPTH,
};
pub use registry::{global, install, Builder, Registry, RegistryBuilder};
pub use schema::{Bindings, Schema, Slot, SlotType};
pub use types::{Arg, Exec, Expr, Operator};
pub use value::{Entity, Kind, Value};

use serde_json::Value as Json;

/// Resolves a generic expression against the global registry.
pub fn from(expr: &Json) -> Result<Expr> {
    Factory::default().from_generic(expr)
}

/// Parses call syntax and resolves it against the global registry.
pub fn compile(text: &str) -> Result<Expr> {
    Factory::default().from_text(text)
}

/// Canonical text of a generic expression.
pub fn stringify(expr: &Json) -> String {
    stringify::generic(expr)
}
