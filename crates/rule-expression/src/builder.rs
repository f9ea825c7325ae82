//! Programmatic construction of expressions.
//!
//! Every constructor goes through the same binding and literal checks as an
//! expression resolved from text, so the result renders and round-trips the
//! same way. Arguments the text form cannot carry are refused with
//! [`Error::ArgumentTypeMismatch`].
//!
//! ```
//! use rule_expression::builder::{each, elem, gte, len, pipe};
//!
//! let expr = each([elem(pipe([len()?, gte(3)?])?)?])?;
//! assert_eq!(expr.to_string(), "each(elem(pipe(len(),gte(3))))");
//! # Ok::<(), rule_expression::Error>(())
//! ```

use crate::error::Error;
use crate::operators::arithmetic::{Add, Div, Mod, Mul, Pow, Sub};
use crate::operators::branching::{Pipe, Select, When};
use crate::operators::comparison::{
    Equal, Greater, GreaterOrEqual, Less, LessOrEqual, NotEqual,
};
use crate::operators::container::{Each, Elem, Key, Len};
use crate::operators::input::Get;
use crate::operators::logical::{AllOf, AnyOf, Not, OneOf};
use crate::operators::string::{CharCount, Match};
use crate::registry::Builder;
use crate::types::{Arg, Expr, Operator};
use crate::value::Value;

/// A literal argument.
pub fn lit(value: impl Into<Value>) -> Arg {
    Arg::Value(value.into())
}

fn build<T: Operator>(args: impl IntoIterator<Item = Arg>) -> Result<Expr, Error> {
    Builder::<T>::new().build(args)
}

fn args<I>(items: I) -> impl Iterator<Item = Arg>
where
    I: IntoIterator,
    I::Item: Into<Arg>,
{
    items.into_iter().map(Into::into)
}

macro_rules! value_operator {
    ($($fn_name:ident => $ty:ident),* $(,)?) => {
        $(
            pub fn $fn_name(value: impl Into<Value>) -> Result<Expr, Error> {
                build::<$ty>([lit(value)])
            }
        )*
    };
}

value_operator! {
    eq => Equal,
    ne => NotEqual,
    lt => Less,
    lte => LessOrEqual,
    gt => Greater,
    gte => GreaterOrEqual,
    add => Add,
    sub => Sub,
    mul => Mul,
    div => Div,
    modulo => Mod,
    pow => Pow,
}

pub fn not(cond: Expr) -> Result<Expr, Error> {
    build::<Not>([Arg::Expr(cond)])
}

pub fn all_of(conds: impl IntoIterator<Item = Expr>) -> Result<Expr, Error> {
    build::<AllOf>(args(conds))
}

pub fn any_of(conds: impl IntoIterator<Item = Expr>) -> Result<Expr, Error> {
    build::<AnyOf>(args(conds))
}

/// Literal branches are matched with `eq`.
pub fn one_of<I>(branches: I) -> Result<Expr, Error>
where
    I: IntoIterator,
    I::Item: Into<Arg>,
{
    build::<OneOf>(args(branches))
}

pub fn pipe<I>(stages: I) -> Result<Expr, Error>
where
    I: IntoIterator,
    I::Item: Into<Arg>,
{
    build::<Pipe>(args(stages))
}

pub fn select<I>(stages: I) -> Result<Expr, Error>
where
    I: IntoIterator,
    I::Item: Into<Arg>,
{
    build::<Select>(args(stages))
}

pub fn when(cond: Expr, then: Expr) -> Result<Expr, Error> {
    build::<When>([Arg::Expr(cond), Arg::Expr(then)])
}

pub fn each(conds: impl IntoIterator<Item = Expr>) -> Result<Expr, Error> {
    build::<Each>(args(conds))
}

pub fn elem(expr: Expr) -> Result<Expr, Error> {
    build::<Elem>([Arg::Expr(expr)])
}

pub fn key(expr: Expr) -> Result<Expr, Error> {
    build::<Key>([Arg::Expr(expr)])
}

pub fn get(name: impl Into<String>) -> Result<Expr, Error> {
    build::<Get>([lit(name.into())])
}

/// Fails when `pattern` is not a valid regular expression.
pub fn matches(pattern: &str) -> Result<Expr, Error> {
    build::<Match>([lit(pattern)])
}

pub fn len() -> Result<Expr, Error> {
    build::<Len>([])
}

pub fn char_count() -> Result<Expr, Error> {
    build::<CharCount>([])
}
