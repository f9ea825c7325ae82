//! Integration tests for the call-syntax parser and canonical rendering.

use rule_expression::{parse, parse_str, parse_str_with_max_depth, stringify, ParseError};
use serde_json::json;

fn check(text: &str, expected: serde_json::Value) {
    let parsed = parse_str(text).unwrap_or_else(|e| panic!("parse({}) failed: {}", text, e));
    assert_eq!(parsed, expected, "text: {}", text);
}

#[test]
fn test_calls() {
    check("len()", json!(["len"]));
    check("eq(1)", json!(["eq", 1.0]));
    check("  eq ( 'a' , \"b\" )  ", json!(["eq", "a", "b"]));
    check("pipe(get(\"x\"),len(),eq(5),)", json!(["pipe", ["get", "x"], ["len"], ["eq", 5.0]]));
}

#[test]
fn test_operator_names_are_not_checked() {
    check("whatever(a, b)", json!(["whatever", "a", "b"]));
}

#[test]
fn test_numbers() {
    check("f(0, -1, +2, 1e3, 0.25, -.5)", json!(["f", 0.0, -1.0, 2.0, 1000.0, 0.25, -0.5]));
    check("f(NaN, inf, 1x)", json!(["f", "NaN", "inf", "1x"]));
}

#[test]
fn test_booleans() {
    check("f(true, false, 'true')", json!(["f", true, false, "true"]));
}

#[test]
fn test_literals() {
    check("f(nil, [nil], {k: nil})", json!(["f", null, [null], {"k": null}]));
    check("f([1, 'a'], {'x y': [true]})", json!(["f", [1.0, "a"], {"x y": [true]}]));
    assert_eq!(parse_str("f(['a'])"), Err(ParseError::CallShapedList(2)));
}

#[test]
fn test_depth_limit() {
    let depth = 100_000;
    let text = format!("{}len(){}", "not(".repeat(depth), ")".repeat(depth));
    assert!(matches!(parse_str(&text), Err(ParseError::TooDeep { .. })));
    assert!(matches!(parse(text.as_bytes()), Err(ParseError::TooDeep { .. })));
    assert_eq!(
        parse_str_with_max_depth("a(b(c()))", 2),
        Err(ParseError::TooDeep { offset: 4, limit: 2 })
    );
}

#[test]
fn test_bytes() {
    assert_eq!(parse(b"eq('x')").unwrap(), json!(["eq", "x"]));
    assert_eq!(parse(&[b'e', b'q', b'(', 0xff, b')']), Err(ParseError::InvalidUtf8));
}

#[test]
fn test_errors() {
    assert_eq!(parse_str("eq(1,,2)").unwrap_err().to_string(), "unexpected ',' at offset 5");
    assert!(matches!(parse_str("eq(1 2)"), Err(ParseError::UnexpectedToken { offset: 5, .. })));
    assert!(matches!(parse_str("(1)"), Err(ParseError::UnexpectedToken { offset: 0, .. })));
    assert_eq!(parse_str("eq(1) /* open"), Err(ParseError::UnclosedComment(6)));
    assert_eq!(parse_str("   "), Err(ParseError::ExpectedCall));
    assert_eq!(parse_str(")"), Err(ParseError::UnbalancedParen(0)));
    assert_eq!(parse_str(r"get('\u+041')"), Err(ParseError::InvalidEscape(5)));
}

#[test]
fn test_stringify() {
    assert_eq!(
        stringify(&json!(["select", ["when", ["pipe", ["get", "x"], ["eq", 1.1]], ["eq", 1.0]], ["eq", 2]])),
        r#"select(when(pipe(get("x"),eq(1.1)),eq(1)),eq(2))"#
    );
    assert_eq!(stringify(&json!(["match", "a\"b\n"])), r#"match("a\"b\n")"#);
    assert_eq!(stringify(&json!(["f", true, null])), "f(true,nil)");
}

#[test]
fn test_stringify_parse_round_trip() {
    for text in [
        "allOf(pipe(len(),gte(3)),each(elem(pipe(len(),gte(3)))))",
        r#"oneOf(1,"two",true,eq(4.5))"#,
        r#"each(key(match("^a\\d+\"")))"#,
        "pipe(add(-1),mod(0.5),pow(2))",
        "pipe([1,[2,nil],[]],len())",
        r#"select({"a b":[1,"b"],"c":{}},nil)"#,
    ] {
        let generic = parse_str(text).unwrap();
        assert_eq!(stringify(&generic), text);
        assert_eq!(parse_str(&stringify(&generic)).unwrap(), generic);
    }
}
