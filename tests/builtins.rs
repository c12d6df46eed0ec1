//! Representative coverage of the built-in catalogue (spec.md §4.6), run
//! through the public API rather than calling builtin functions directly.

use kodiscript::{KodiScript, Value};

fn eval(src: &str) -> Value {
    KodiScript::eval(src, Default::default()).unwrap_or_else(|e| panic!("{src}: {e}"))
}

#[test]
fn string_builtins() {
    assert!(matches!(eval(r#"length("hello")"#), Value::Number(n) if n == 5.0));
    assert!(matches!(eval(r#"toUpperCase("hi")"#), Value::Str(ref s) if s == "HI"));
    assert!(matches!(eval(r#"trim("  hi  ")"#), Value::Str(ref s) if s == "hi"));
    assert!(matches!(eval(r#"substring("hello world", 6)"#), Value::Str(ref s) if s == "world"));
    assert!(matches!(eval(r#"substring("hello", 1, 3)"#), Value::Str(ref s) if s == "el"));
    assert!(matches!(eval(r#"replace("foo bar", "bar", "baz")"#), Value::Str(ref s) if s == "foo baz"));
    assert!(matches!(eval(r#"contains("hello", "ell")"#), Value::Bool(true)));
    assert!(matches!(eval(r#"startsWith("hello", "he")"#), Value::Bool(true)));
    assert!(matches!(eval(r#"endsWith("hello", "lo")"#), Value::Bool(true)));
    assert!(matches!(eval(r#"indexOf("hello", "h")"#), Value::Number(n) if n == 0.0));
    assert!(matches!(eval(r#"indexOf("hello", "z")"#), Value::Number(n) if n == -1.0));
    assert!(matches!(eval(r#"repeat("ab", 3)"#), Value::Str(ref s) if s == "ababab"));
    assert!(matches!(eval(r#"padLeft("7", 3, "0")"#), Value::Str(ref s) if s == "007"));
    assert!(matches!(eval(r#"padRight("7", 3, "0")"#), Value::Str(ref s) if s == "700"));
    assert!(matches!(eval(r#"join(split("a,b,c", ","), "-")"#), Value::Str(ref s) if s == "a-b-c"));
}

#[test]
fn to_number_to_string_round_trip() {
    assert!(matches!(eval("toNumber(toString(42))"), Value::Number(n) if n == 42.0));
    assert!(matches!(eval("toNumber(toString(3.5))"), Value::Number(n) if n == 3.5));
}

#[test]
fn math_builtins() {
    assert!(matches!(eval("abs(-5)"), Value::Number(n) if n == 5.0));
    assert!(matches!(eval("floor(1.9)"), Value::Number(n) if n == 1.0));
    assert!(matches!(eval("ceil(1.1)"), Value::Number(n) if n == 2.0));
    assert!(matches!(eval("round(1.5)"), Value::Number(n) if n == 2.0));
    assert!(matches!(eval("min(3, 7)"), Value::Number(n) if n == 3.0));
    assert!(matches!(eval("max(3, 7)"), Value::Number(n) if n == 7.0));
    assert!(matches!(eval("pow(2, 10)"), Value::Number(n) if n == 1024.0));
    assert!(matches!(eval("sqrt(16)"), Value::Number(n) if n == 4.0));
}

#[test]
fn type_predicates() {
    assert!(matches!(eval("typeOf(null)"), Value::Str(ref s) if s == "null"));
    assert!(matches!(eval("typeOf(1)"), Value::Str(ref s) if s == "number"));
    assert!(matches!(eval(r#"typeOf("s")"#), Value::Str(ref s) if s == "string"));
    assert!(matches!(eval("typeOf([1])"), Value::Str(ref s) if s == "array"));
    assert!(matches!(eval("typeOf({a: 1})"), Value::Str(ref s) if s == "object"));
    assert!(matches!(eval("isNull(null)"), Value::Bool(true)));
    assert!(matches!(eval("isNumber(1)"), Value::Bool(true)));
}

#[test]
fn array_builtins() {
    assert!(matches!(eval("size([1,2,3])"), Value::Number(n) if n == 3.0));
    assert!(matches!(eval("first([1,2,3])"), Value::Number(n) if n == 1.0));
    assert!(matches!(eval("last([1,2,3])"), Value::Number(n) if n == 3.0));
    assert!(matches!(eval("first([])"), Value::Null));

    let reversed = eval("reverse([1,2,3])");
    assert!(reversed.strict_eq(&Value::array(vec![
        Value::Number(3.0),
        Value::Number(2.0),
        Value::Number(1.0),
    ])));

    let sliced = eval("slice([1,2,3,4,5], 1, 3)");
    assert!(sliced.strict_eq(&Value::array(vec![Value::Number(2.0), Value::Number(3.0)])));

    let sorted = eval(r#"sort([3,1,2], "asc")"#);
    assert!(sorted.strict_eq(&Value::array(vec![
        Value::Number(1.0),
        Value::Number(2.0),
        Value::Number(3.0),
    ])));
}

#[test]
fn higher_order_builtins_call_back_into_the_evaluator() {
    assert!(matches!(
        eval("map([1,2,3], fn(x) { return x * 2 })"),
        Value::Array(ref items) if items.len() == 3
    ));
    assert!(matches!(eval("reduce([1,2,3,4], fn(acc, x) { return acc + x }, 0)"), Value::Number(n) if n == 10.0));
    assert!(matches!(eval("find([1,2,3], fn(x) { return x > 1 })"), Value::Number(n) if n == 2.0));
    assert!(matches!(eval("findIndex([1,2,3], fn(x) { return x > 1 })"), Value::Number(n) if n == 1.0));
    assert!(matches!(
        eval("filter([1,2,3,4], fn(x) { return x % 2 == 0 })"),
        Value::Array(ref items) if items.len() == 2
    ));
}

#[test]
fn json_round_trip_preserves_insertion_order() {
    let source = r#"jsonStringify(jsonParse("{\"b\":1,\"a\":2}"))"#;
    assert!(matches!(eval(source), Value::Str(ref s) if s == r#"{"b":1,"a":2}"#));
}

#[test]
fn encoding_round_trips() {
    assert!(matches!(
        eval(r#"base64Decode(base64Encode("hello world"))"#),
        Value::Str(ref s) if s == "hello world"
    ));
    assert!(matches!(
        eval(r#"urlDecode(urlEncode("a b/c"))"#),
        Value::Str(ref s) if s == "a b/c"
    ));
}

#[test]
fn crypto_digests_are_stable() {
    assert!(matches!(
        eval(r#"sha256("")"#),
        Value::Str(ref s) if s == "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    ));
    assert!(matches!(
        eval(r#"md5("")"#),
        Value::Str(ref s) if s == "d41d8cd98f00b204e9800998ecf8427e"
    ));
}

#[test]
fn time_builtins_compose() {
    assert!(matches!(eval("addDays(0, 1)"), Value::Number(n) if n == 86_400_000.0));
    assert!(matches!(eval("diffDays(86400000, 0)"), Value::Number(n) if n == 1.0));
    assert!(matches!(
        eval(r#"formatDate(0, "%Y-%m-%d")"#),
        Value::Str(ref s) if s == "1970-01-01"
    ));
    assert!(matches!(eval("year(0)"), Value::Number(n) if n == 1970.0));
}
