//! Operator registry.
//!
//! Registration happens on a [`RegistryBuilder`]; [`RegistryBuilder::seal`]
//! turns it into a read-only [`Registry`] that can be shared freely between
//! threads. The process-wide registry is sealed on first use.

use crate::error::Error;
use crate::schema::{bind, Bindings, Schema};
use crate::types::{Arg, Exec, Expr, Operator};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::OnceLock;
use tracing::debug;

type Constructor = fn(&mut Bindings) -> Result<Box<dyn Exec>, Error>;

fn construct_boxed<T: Operator>(bindings: &mut Bindings) -> Result<Box<dyn Exec>, Error> {
    Ok(Box::new(T::construct(bindings)?))
}

/// A registered operator: its schema and constructor.
#[derive(Clone)]
pub struct Entry {
    name: String,
    schema: Schema,
    construct: Constructor,
}

impl Entry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Binds `args` and constructs the operator. The resulting expression
    /// keeps `args` for rendering, so literals that have no textual form are
    /// refused here.
    pub fn build(&self, args: Vec<Arg>) -> Result<Expr, Error> {
        for (index, arg) in args.iter().enumerate() {
            if let Arg::Value(value) = arg {
                check_literal(value).map_err(|reason| Error::ArgumentTypeMismatch {
                    operator: self.name.clone(),
                    index,
                    reason: reason.to_string(),
                })?;
            }
        }
        let mut bindings = bind(&self.name, &self.schema, args.clone())?;
        let op = (self.construct)(&mut bindings)?;
        Ok(Expr::from_boxed(self.name.clone(), args, op))
    }
}

fn check_literal(value: &Value) -> Result<(), &'static str> {
    if let Value::Array(items) = value {
        if matches!(items.first(), Some(Value::String(_))) {
            return Err("a literal list cannot start with a string");
        }
    }
    check_finite(value)
}

fn check_finite(value: &Value) -> Result<(), &'static str> {
    match value {
        Value::Float(n) if !n.is_finite() => Err("literal numbers must be finite"),
        Value::Array(items) => items.iter().try_for_each(check_finite),
        Value::Map(entries) => entries.values().try_for_each(check_finite),
        _ => Ok(()),
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish()
    }
}

/// Typed constructor handed out by registration.
pub struct Builder<T> {
    entry: Entry,
    _operator: PhantomData<fn() -> T>,
}

impl<T: Operator> Builder<T> {
    /// A builder for `T` under its canonical name, independent of any registry.
    pub fn new() -> Self {
        Self::named(T::NAME)
    }

    fn named(name: &str) -> Self {
        Builder {
            entry: Entry {
                name: name.to_string(),
                schema: T::schema(),
                construct: construct_boxed::<T>,
            },
            _operator: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.entry.name
    }

    pub fn build(&self, args: impl IntoIterator<Item = Arg>) -> Result<Expr, Error> {
        self.entry.build(args.into_iter().collect())
    }
}

impl<T: Operator> Default for Builder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Builder<T> {
    fn clone(&self) -> Self {
        Builder {
            entry: self.entry.clone(),
            _operator: PhantomData,
        }
    }
}

/// The registration phase of a registry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: HashMap<String, Entry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every built-in operator.
    pub fn with_builtins(mut self) -> Self {
        crate::operators::register_builtins(&mut self);
        self
    }

    /// Registers `T` under its canonical name.
    pub fn register<T: Operator>(&mut self) -> Builder<T> {
        self.register_as::<T>(T::NAME)
    }

    /// Registers `T` under `name`. A later registration under the same name
    /// replaces the earlier one.
    pub fn register_as<T: Operator>(&mut self, name: &str) -> Builder<T> {
        let builder = Builder::<T>::named(name);
        if self
            .entries
            .insert(name.to_string(), builder.entry.clone())
            .is_some()
        {
            debug!(operator = name, "replacing registered operator");
        } else {
            debug!(operator = name, "registered operator");
        }
        builder
    }

    /// Ends the registration phase.
    pub fn seal(self) -> Registry {
        debug!(operators = self.entries.len(), "registry sealed");
        Registry {
            entries: self.entries,
        }
    }
}

/// A sealed, read-only operator table.
#[derive(Debug)]
pub struct Registry {
    entries: HashMap<String, Entry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered operator names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Constructs operator `name` from already resolved arguments.
    pub fn build(&self, name: &str, args: Vec<Arg>) -> Result<Expr, Error> {
        self.get(name)
            .ok_or_else(|| Error::UnknownOperator(name.to_string()))?
            .build(args)
    }
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// The process-wide registry. Unless [`install`] ran first, it holds the
/// built-in operators.
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(|| RegistryBuilder::new().with_builtins().seal())
}

/// Installs `registry` as the process-wide registry.
///
/// Fails, handing the registry back, once the global registry has been
/// installed or read.
pub fn install(registry: Registry) -> Result<(), Registry> {
    GLOBAL.set(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval_ctx::Context;
    use crate::schema::{Slot, SlotType};

    /// Repeats the input string a bound number of times.
    #[derive(Debug)]
    struct Repeat {
        times: usize,
    }

    impl Exec for Repeat {
        fn exec(&self, _ctx: &Context, input: &Value) -> Result<Value, Error> {
            Ok(Value::String(input.to_string().repeat(self.times)))
        }
    }

    impl Operator for Repeat {
        const NAME: &'static str = "repeat";

        fn schema() -> Schema {
            Schema::slots([Slot::bound("times", SlotType::Value)])
        }

        fn construct(bindings: &mut Bindings) -> Result<Self, Error> {
            Ok(Repeat {
                times: bindings.take_value()?.to_uint() as usize,
            })
        }
    }

    #[derive(Debug)]
    struct Shout;

    impl Exec for Shout {
        fn exec(&self, _ctx: &Context, input: &Value) -> Result<Value, Error> {
            Ok(Value::String(input.to_string().to_uppercase()))
        }
    }

    impl Operator for Shout {
        const NAME: &'static str = "shout";

        fn schema() -> Schema {
            Schema::empty()
        }

        fn construct(_bindings: &mut Bindings) -> Result<Self, Error> {
            Ok(Shout)
        }
    }

    #[test]
    fn register_returns_a_typed_builder() {
        let mut builder = RegistryBuilder::new();
        let repeat = builder.register::<Repeat>();
        let expr = repeat.build([Arg::Value(Value::Int(3))]).unwrap();
        assert_eq!(expr.to_string(), "repeat(3)");
        assert_eq!(
            expr.exec(&Context::new(), &Value::from("ab")).unwrap(),
            Value::from("ababab")
        );
        let registry = builder.seal();
        assert!(registry.contains("repeat"));
    }

    #[test]
    fn last_registration_wins() {
        let mut builder = RegistryBuilder::new();
        builder.register_as::<Repeat>("x");
        builder.register_as::<Shout>("x");
        let registry = builder.seal();
        assert_eq!(registry.names(), vec!["x"]);
        let expr = registry.build("x", vec![]).unwrap();
        assert_eq!(
            expr.exec(&Context::new(), &Value::from("hi")).unwrap(),
            Value::from("HI")
        );
    }

    #[test]
    fn unknown_operator() {
        let registry = RegistryBuilder::new().seal();
        assert_eq!(
            registry.build("nope", vec![]).unwrap_err(),
            Error::UnknownOperator("nope".into())
        );
    }

    #[test]
    fn literals_without_text_form_are_refused() {
        let repeat = Builder::<Repeat>::new();
        for literal in [
            Value::Float(f64::NAN),
            Value::Float(f64::INFINITY),
            Value::from(vec![Value::Int(1), Value::Float(f64::NEG_INFINITY)]),
            Value::from(vec!["a", "b"]),
        ] {
            let err = repeat.build([Arg::Value(literal.clone())]).unwrap_err();
            assert!(
                matches!(err, Error::ArgumentTypeMismatch { index: 0, .. }),
                "{:?} gave {:?}",
                literal,
                err
            );
        }
        assert!(repeat.build([Arg::Value(Value::from(vec![Value::Int(1), Value::from("a")]))]).is_ok());
    }

    #[test]
    fn global_has_builtins() {
        let names = global().names();
        for name in ["eq", "allOf", "each", "match", "charCount", "mod"] {
            assert!(names.contains(&name), "missing {}", name);
        }
    }
}
