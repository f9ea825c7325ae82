//! Resolution of the generic array form into executable expressions.

use crate::error::Error;
use crate::parser;
use crate::registry::{global, Registry};
use crate::stringify;
use crate::types::{Arg, Expr};
use crate::value::Value;
use serde_json::Value as Json;
use tracing::debug;

/// Options for [`Factory`].
#[derive(Debug, Clone)]
pub struct FactoryOptions {
    /// Deepest nesting accepted. Text input beyond it fails to parse with
    /// [`ParseError::TooDeep`](parser::ParseError::TooDeep); generic input
    /// fails to resolve with [`Error::TooDeep`].
    pub max_depth: usize,
}

impl Default for FactoryOptions {
    fn default() -> Self {
        FactoryOptions {
            max_depth: parser::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Builds expression trees from the generic array form using a registry.
#[derive(Debug, Clone)]
pub struct Factory<'r> {
    registry: &'r Registry,
    options: FactoryOptions,
}

impl Default for Factory<'static> {
    fn default() -> Self {
        Factory::new(global())
    }
}

impl<'r> Factory<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_options(registry, FactoryOptions::default())
    }

    pub fn with_options(registry: &'r Registry, options: FactoryOptions) -> Self {
        Factory { registry, options }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Resolves `["name", args...]`, nested calls first.
    pub fn from_generic(&self, expr: &Json) -> Result<Expr, Error> {
        self.resolve(expr, 1)
    }

    /// Parses call syntax and resolves it.
    pub fn from_text(&self, text: &str) -> Result<Expr, Error> {
        let generic = parser::parse_str_with_max_depth(text, self.options.max_depth)?;
        self.from_generic(&generic)
    }

    pub fn from_bytes(&self, text: &[u8]) -> Result<Expr, Error> {
        let text = std::str::from_utf8(text).map_err(|_| parser::ParseError::InvalidUtf8)?;
        self.from_text(text)
    }

    fn resolve(&self, expr: &Json, depth: usize) -> Result<Expr, Error> {
        if depth > self.options.max_depth {
            return Err(Error::TooDeep(self.options.max_depth));
        }
        let (name, raw_args) = match call_parts(expr) {
            Some(parts) => parts,
            None => return Err(Error::UnknownOperator(stringify::generic(expr))),
        };
        let entry = self.registry.get(name).ok_or_else(|| {
            debug!(operator = name, "unknown operator");
            Error::UnknownOperator(name.to_string())
        })?;
        let args = raw_args
            .iter()
            .map(|arg| self.resolve_arg(arg, depth))
            .collect::<Result<Vec<_>, _>>()?;
        entry.build(args).inspect_err(|err| {
            debug!(operator = name, error = %err, "failed to bind operator");
        })
    }

    fn resolve_arg(&self, arg: &Json, depth: usize) -> Result<Arg, Error> {
        if call_parts(arg).is_some() {
            Ok(Arg::Expr(self.resolve(arg, depth + 1)?))
        } else {
            Ok(Arg::Value(Value::from(arg)))
        }
    }
}

/// Splits a nested call (`["name", ...]`) into name and arguments.
fn call_parts(expr: &Json) -> Option<(&str, &[Json])> {
    match expr {
        Json::Array(items) => match items.split_first() {
            Some((Json::String(name), args)) => Some((name.as_str(), args)),
            _ => None,
        },
        _ => None,
    }
}
