//! Canonical text rendering.
//!
//! Calls render as `name(arg1,arg2)` with no whitespace, strings are double
//! quoted with JSON escapes, and `nil` stands for an absent value. The output
//! of [`generic`] parses back into the same generic form.

use crate::value::Value;
use serde_json::Value as Json;

pub fn quote(s: &str) -> String {
    Json::String(s.to_owned()).to_string()
}

pub fn float(n: f64) -> String {
    n.to_string()
}

/// Renders a value the way it appears as a literal argument.
pub fn value(v: &Value) -> String {
    match v {
        Value::Invalid => "nil".to_string(),
        Value::Uint(n) => n.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(n) => float(*n),
        Value::String(s) => quote(s),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(value).collect();
            format!("[{}]", items.join(","))
        }
        Value::Map(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}:{}", quote(k), value(v)))
                .collect();
            format!("{{{}}}", entries.join(","))
        }
    }
}

/// Renders a generic (array form) expression or literal.
pub fn generic(expr: &Json) -> String {
    match expr {
        Json::Array(items) => match items.split_first() {
            Some((Json::String(name), args)) => {
                let args: Vec<String> = args.iter().map(generic).collect();
                format!("{}({})", name, args.join(","))
            }
            _ => {
                let items: Vec<String> = items.iter().map(generic).collect();
                format!("[{}]", items.join(","))
            }
        },
        Json::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(u)) => u.to_string(),
            _ => n.as_f64().map(float).unwrap_or_else(|| n.to_string()),
        },
        Json::String(s) => quote(s),
        Json::Bool(b) => b.to_string(),
        Json::Null => "nil".to_string(),
        Json::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}:{}", quote(k), generic(v)))
                .collect();
            format!("{{{}}}", entries.join(","))
        }
    }
}
