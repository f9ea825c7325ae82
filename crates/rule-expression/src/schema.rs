//! Declarative argument binding.
//!
//! Each operator describes its positional arguments as an ordered list of
//! [`Slot`]s. [`bind`] interprets that list against the resolved arguments of
//! a call and hands the result to the operator's constructor as [`Bindings`].

use crate::error::Error;
use crate::types::{Arg, Expr};
use crate::value::Value;
use std::collections::VecDeque;

/// How a bound slot converts the argument it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotType {
    /// A literal, kept as a [`Value`].
    Value,
    /// The text form of a literal, for fields parsed from text.
    Text,
    /// A literal string, taken as-is.
    Str,
    /// A nested expression.
    Expr,
    /// A literal or a nested expression.
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Consumes one positional argument.
    Bound { name: &'static str, ty: SlotType },
    /// A field of the operator that no argument binds to.
    Excluded { name: &'static str },
    /// Collects every positional argument not claimed by a bound slot.
    Variadic { name: &'static str, ty: SlotType },
}

impl Slot {
    pub const fn bound(name: &'static str, ty: SlotType) -> Self {
        Slot::Bound { name, ty }
    }

    pub const fn excluded(name: &'static str) -> Self {
        Slot::Excluded { name }
    }

    pub const fn variadic(name: &'static str, ty: SlotType) -> Self {
        Slot::Variadic { name, ty }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    Slots(Vec<Slot>),
    /// Skips slot binding: the constructor receives the raw argument list.
    Raw,
}

impl Schema {
    pub fn slots(slots: impl Into<Vec<Slot>>) -> Self {
        Schema::Slots(slots.into())
    }

    /// An operator that takes no arguments.
    pub fn empty() -> Self {
        Schema::Slots(Vec::new())
    }
}

/// One bound slot.
#[derive(Debug, Clone)]
pub enum Bound {
    Value(Value),
    Text(String),
    Expr(Expr),
    Arg(Arg),
    List(Vec<Bound>),
    Excluded,
}

/// Arguments bound to an operator's slots, consumed in slot order.
#[derive(Debug)]
pub struct Bindings {
    operator: String,
    slots: VecDeque<Bound>,
    index: usize,
}

impl Bindings {
    /// The name the operator is being built under.
    pub fn operator(&self) -> &str {
        &self.operator
    }

    fn next(&mut self) -> Result<Bound, Error> {
        let index = self.index;
        self.index += 1;
        self.slots.pop_front().ok_or_else(|| Error::ArgumentCountMismatch {
            operator: self.operator.clone(),
            expected: format!("more than {}", index),
            got: index,
        })
    }

    fn mismatch(&self, reason: &str) -> Error {
        Error::ArgumentTypeMismatch {
            operator: self.operator.clone(),
            index: self.index.saturating_sub(1),
            reason: reason.to_string(),
        }
    }

    pub fn take_value(&mut self) -> Result<Value, Error> {
        match self.next()? {
            Bound::Value(v) => Ok(v),
            _ => Err(self.mismatch("slot is not bound to a value")),
        }
    }

    pub fn take_text(&mut self) -> Result<String, Error> {
        match self.next()? {
            Bound::Text(s) => Ok(s),
            _ => Err(self.mismatch("slot is not bound to text")),
        }
    }

    pub fn take_expr(&mut self) -> Result<Expr, Error> {
        match self.next()? {
            Bound::Expr(e) => Ok(e),
            _ => Err(self.mismatch("slot is not bound to an expression")),
        }
    }

    pub fn take_arg(&mut self) -> Result<Arg, Error> {
        match self.next()? {
            Bound::Arg(a) => Ok(a),
            _ => Err(self.mismatch("slot is not bound to an argument")),
        }
    }

    pub fn skip_excluded(&mut self) -> Result<(), Error> {
        match self.next()? {
            Bound::Excluded => Ok(()),
            _ => Err(self.mismatch("slot is not excluded")),
        }
    }

    /// Takes a variadic slot, or the whole list of a raw schema, as arguments.
    pub fn take_args(&mut self) -> Result<Vec<Arg>, Error> {
        match self.next()? {
            Bound::List(items) => items
                .into_iter()
                .map(|item| match item {
                    Bound::Arg(a) => Ok(a),
                    Bound::Expr(e) => Ok(Arg::Expr(e)),
                    Bound::Value(v) => Ok(Arg::Value(v)),
                    _ => Err(self.mismatch("list item is not an argument")),
                })
                .collect(),
            _ => Err(self.mismatch("slot is not a list")),
        }
    }

    /// Takes a variadic or raw list whose items must all be expressions.
    pub fn take_exprs(&mut self) -> Result<Vec<Expr>, Error> {
        let base = self.index;
        let args = self.take_args()?;
        args.into_iter()
            .enumerate()
            .map(|(i, arg)| match arg {
                Arg::Expr(e) => Ok(e),
                Arg::Value(v) => Err(Error::ArgumentTypeMismatch {
                    operator: self.operator.clone(),
                    index: base + i,
                    reason: format!("expected an expression, got {} literal", v.kind()),
                }),
            })
            .collect()
    }
}

fn convert(operator: &str, index: usize, arg: Arg, ty: SlotType) -> Result<Bound, Error> {
    let mismatch = |reason: String| Error::ArgumentTypeMismatch {
        operator: operator.to_string(),
        index,
        reason,
    };
    match (ty, arg) {
        (SlotType::Any, arg) => Ok(Bound::Arg(arg)),
        (SlotType::Expr, Arg::Expr(e)) => Ok(Bound::Expr(e)),
        (SlotType::Expr, Arg::Value(v)) => Err(mismatch(format!(
            "expected an expression, got {} literal",
            v.kind()
        ))),
        (_, Arg::Expr(e)) => Err(mismatch(format!(
            "expected a literal, got expression {}",
            e.name()
        ))),
        (SlotType::Value, Arg::Value(v)) => Ok(Bound::Value(v)),
        (SlotType::Text, Arg::Value(v)) => Ok(Bound::Text(v.to_string())),
        (SlotType::Str, Arg::Value(Value::String(s))) => Ok(Bound::Text(s)),
        (SlotType::Str, Arg::Value(v)) => {
            Err(mismatch(format!("expected a string, got {}", v.kind())))
        }
    }
}

/// Binds resolved positional arguments to `schema`.
pub fn bind(operator: &str, schema: &Schema, args: Vec<Arg>) -> Result<Bindings, Error> {
    let slots = match schema {
        Schema::Raw => {
            let list = args.into_iter().map(Bound::Arg).collect();
            return Ok(Bindings {
                operator: operator.to_string(),
                slots: VecDeque::from([Bound::List(list)]),
                index: 0,
            });
        }
        Schema::Slots(slots) => slots,
    };

    let fixed = slots
        .iter()
        .filter(|slot| matches!(slot, Slot::Bound { .. }))
        .count();
    let variadic = slots.iter().any(|slot| matches!(slot, Slot::Variadic { .. }));
    if (!variadic && args.len() != fixed) || args.len() < fixed {
        return Err(Error::ArgumentCountMismatch {
            operator: operator.to_string(),
            expected: if variadic {
                format!("at least {}", fixed)
            } else {
                fixed.to_string()
            },
            got: args.len(),
        });
    }
    let mut extra = args.len() - fixed;

    let mut args = args.into_iter().enumerate();
    let mut bound = VecDeque::with_capacity(slots.len());
    for slot in slots {
        match *slot {
            Slot::Bound { ty, .. } => {
                let (index, arg) = args.next().ok_or_else(|| Error::ArgumentCountMismatch {
                    operator: operator.to_string(),
                    expected: fixed.to_string(),
                    got: 0,
                })?;
                bound.push_back(convert(operator, index, arg, ty)?);
            }
            Slot::Excluded { .. } => bound.push_back(Bound::Excluded),
            Slot::Variadic { ty, .. } => {
                let mut items = Vec::with_capacity(extra);
                for (index, arg) in args.by_ref().take(extra) {
                    items.push(convert(operator, index, arg, ty)?);
                }
                extra = 0;
                bound.push_back(Bound::List(items));
            }
        }
    }

    Ok(Bindings {
        operator: operator.to_string(),
        slots: bound,
        index: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: impl Into<Value>) -> Arg {
        Arg::Value(v.into())
    }

    #[test]
    fn binds_in_order_skipping_excluded() {
        let schema = Schema::slots([
            Slot::bound("pattern", SlotType::Text),
            Slot::excluded("compiled"),
            Slot::bound("value", SlotType::Value),
        ]);
        let mut b = bind("op", &schema, vec![lit(1.5), lit("x")]).unwrap();
        assert_eq!(b.take_text().unwrap(), "1.5");
        b.skip_excluded().unwrap();
        assert_eq!(b.take_value().unwrap(), Value::from("x"));
    }

    #[test]
    fn variadic_collects_the_middle() {
        let schema = Schema::slots([
            Slot::bound("first", SlotType::Value),
            Slot::variadic("rest", SlotType::Any),
            Slot::bound("last", SlotType::Value),
        ]);
        let mut b = bind("op", &schema, vec![lit(1), lit(2), lit(3), lit(4)]).unwrap();
        assert_eq!(b.take_value().unwrap(), Value::Int(1));
        assert_eq!(b.take_args().unwrap().len(), 2);
        assert_eq!(b.take_value().unwrap(), Value::Int(4));

        let mut b = bind("op", &schema, vec![lit(1), lit(4)]).unwrap();
        b.take_value().unwrap();
        assert!(b.take_args().unwrap().is_empty());
    }

    #[test]
    fn count_mismatch() {
        let schema = Schema::slots([Slot::bound("value", SlotType::Value)]);
        assert_eq!(
            bind("eq", &schema, vec![]).unwrap_err(),
            Error::ArgumentCountMismatch {
                operator: "eq".into(),
                expected: "1".into(),
                got: 0
            }
        );
        let schema = Schema::slots([Slot::variadic("items", SlotType::Expr)]);
        assert!(bind("each", &schema, vec![]).is_ok());
    }

    #[test]
    fn type_mismatch() {
        let schema = Schema::slots([Slot::bound("name", SlotType::Str)]);
        let err = bind("get", &schema, vec![lit(1)]).unwrap_err();
        assert!(matches!(err, Error::ArgumentTypeMismatch { index: 0, .. }));

        let schema = Schema::slots([Slot::bound("cond", SlotType::Expr)]);
        assert!(bind("not", &schema, vec![lit(true)]).is_err());
    }

    #[test]
    fn raw_schema_passes_arguments_verbatim() {
        let mut b = bind("oneOf", &Schema::Raw, vec![lit(1), lit("a")]).unwrap();
        let args = b.take_args().unwrap();
        assert_eq!(args.len(), 2);
        assert!(matches!(&args[1], Arg::Value(Value::String(s)) if s == "a"));
    }
}
