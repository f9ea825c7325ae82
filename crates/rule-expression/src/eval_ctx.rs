use crate::cancel::Cancellation;
use crate::error::Error;
use crate::value::{Entity, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::sync::Arc;
use std::time::Instant;

/// Resolves named variables for the `get` operator.
pub trait ValueGetter: Send + Sync {
    /// Returns `None` when the name is not defined.
    fn get_value(&self, name: &str) -> Option<Value>;
}

impl<S: BuildHasher + Send + Sync> ValueGetter for HashMap<String, Value, S> {
    fn get_value(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl ValueGetter for BTreeMap<String, Value> {
    fn get_value(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// A `Map` value serves its entries; any other kind defines nothing.
impl ValueGetter for Value {
    fn get_value(&self, name: &str) -> Option<Value> {
        match self {
            Value::Map(map) => map.get(name).cloned(),
            _ => None,
        }
    }
}

/// Adapts a closure into a [`ValueGetter`].
pub struct FnGetter<F>(pub F);

impl<F> ValueGetter for FnGetter<F>
where
    F: Fn(&str) -> Option<Value> + Send + Sync,
{
    fn get_value(&self, name: &str) -> Option<Value> {
        (self.0)(name)
    }
}

/// The evaluation context passed to every `exec` call.
///
/// Contexts are never mutated during evaluation. Operators that need to add
/// something (the iteration entity) derive a new context from the old one.
#[derive(Clone, Default)]
pub struct Context {
    getter: Option<Arc<dyn ValueGetter>>,
    cancel: Cancellation,
    entity: Option<Arc<Entity>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_getter<G: ValueGetter + 'static>(self, getter: G) -> Self {
        self.with_shared_getter(Arc::new(getter))
    }

    pub fn with_shared_getter(mut self, getter: Arc<dyn ValueGetter>) -> Self {
        self.getter = Some(getter);
        self
    }

    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    /// Cancels iteration once `deadline` passes. Cancelling the original
    /// signal still cancels the derived one.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.cancel = self.cancel.with_deadline(deadline);
        self
    }

    pub fn cancellation(&self) -> &Cancellation {
        &self.cancel
    }

    /// Looks up a named variable through the installed getter.
    pub fn lookup(&self, name: &str) -> Result<Value, Error> {
        let getter = self.getter.as_ref().ok_or(Error::MissingValueGetter)?;
        getter
            .get_value(name)
            .ok_or_else(|| Error::MissingField(name.to_string()))
    }

    /// The entity currently being iterated, if the input is one.
    pub fn entity(&self) -> Option<&Entity> {
        self.entity.as_deref()
    }

    pub(crate) fn with_entity(&self, entity: Entity) -> Self {
        Context {
            entity: Some(Arc::new(entity)),
            ..self.clone()
        }
    }

    pub(crate) fn without_entity(&self) -> Self {
        Context {
            entity: None,
            ..self.clone()
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("getter", &self.getter.is_some())
            .field("cancel", &self.cancel)
            .field("entity", &self.entity)
            .finish()
    }
}
