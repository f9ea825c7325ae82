//! String operators.

use crate::error::Error;
use crate::eval_ctx::Context;
use crate::registry::RegistryBuilder;
use crate::schema::{Bindings, Schema, Slot, SlotType};
use crate::types::{Exec, Operator};
use crate::value::Value;
use regex::Regex;

/// Matches the text form of the input against a regular expression compiled
/// when the operator is built.
#[derive(Debug, Clone)]
pub struct Match {
    pattern: Regex,
}

impl Match {
    pub fn new(pattern: &str) -> Result<Self, Error> {
        let pattern = Regex::new(pattern).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Match { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Exec for Match {
    fn exec(&self, _ctx: &Context, input: &Value) -> Result<Value, Error> {
        Ok(Value::Bool(self.pattern.is_match(&input.to_string())))
    }
}

impl Operator for Match {
    const NAME: &'static str = "match";

    fn schema() -> Schema {
        Schema::slots([
            Slot::bound("pattern", SlotType::Text),
            Slot::excluded("compiled"),
        ])
    }

    fn construct(bindings: &mut Bindings) -> Result<Self, Error> {
        let pattern = bindings.take_text()?;
        bindings.skip_excluded()?;
        Match::new(&pattern)
    }
}

/// Code point count of a string input; 0 for other kinds.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharCount;

impl Exec for CharCount {
    fn exec(&self, _ctx: &Context, input: &Value) -> Result<Value, Error> {
        let count = match input {
            Value::String(s) => s.chars().count(),
            _ => 0,
        };
        Ok(Value::Int(count as i64))
    }
}

impl Operator for CharCount {
    const NAME: &'static str = "charCount";

    fn schema() -> Schema {
        Schema::empty()
    }

    fn construct(_bindings: &mut Bindings) -> Result<Self, Error> {
        Ok(CharCount)
    }
}

pub fn register(registry: &mut RegistryBuilder) {
    registry.register::<Match>();
    registry.register::<CharCount>();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_compiles_once() {
        let m = Match::new("^a+$").unwrap();
        let ctx = Context::new();
        assert_eq!(m.exec(&ctx, &Value::from("aaa")).unwrap(), Value::Bool(true));
        assert_eq!(m.exec(&ctx, &Value::from("ab")).unwrap(), Value::Bool(false));
        assert_eq!(m.pattern(), "^a+$");
    }

    #[test]
    fn bad_pattern_fails_to_build() {
        assert!(matches!(
            Match::new("(").unwrap_err(),
            Error::InvalidPattern { .. }
        ));
    }

    #[test]
    fn char_count_counts_code_points() {
        let ctx = Context::new();
        assert_eq!(
            CharCount.exec(&ctx, &Value::from("héllo")).unwrap(),
            Value::Int(5)
        );
        assert_eq!(CharCount.exec(&ctx, &Value::Int(12345)).unwrap(), Value::Int(0));
    }
}
