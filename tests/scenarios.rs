//! End-to-end scenarios from spec.md §8, driven through the public
//! `kodiscript` API the way a hosting application would (no subprocess).

use std::collections::HashMap;

use kodiscript::{KodiScript, Value};

#[test]
fn arithmetic_precedence() {
    let result = KodiScript::run("2 + 3 * 4", None).unwrap();
    assert!(matches!(result.value, Value::Number(n) if n == 14.0));
}

#[test]
fn reassignment_is_visible_after_the_let() {
    let result = KodiScript::run("let x = 10; x = 100; x", None).unwrap();
    assert!(matches!(result.value, Value::Number(n) if n == 100.0));
}

#[test]
fn for_in_accumulates_over_an_array() {
    let result = KodiScript::run(
        "let sum = 0 for (i in [1,2,3,4,5]) { sum = sum + i } sum",
        None,
    )
    .unwrap();
    assert!(matches!(result.value, Value::Number(n) if n == 15.0));
}

#[test]
fn print_appends_to_output_and_yields_null() {
    let result = KodiScript::run(r#"print("Hello"); print("World")"#, None).unwrap();
    assert_eq!(result.output, vec!["Hello".to_string(), "World".to_string()]);
    assert!(result.value.is_null());
}

#[test]
fn safe_member_on_null_yields_null_otherwise_reads_through() {
    let mut vars = HashMap::new();
    vars.insert("user".to_string(), Value::Null);
    let result = KodiScript::run("user?.name", Some(vars)).unwrap();
    assert!(result.value.is_null());

    let mut object = kodiscript::value::ObjectMap::new();
    object.insert("name".to_string(), Value::Str("Alice".to_string()));
    let mut vars = HashMap::new();
    vars.insert("user".to_string(), Value::object(object));
    let result = KodiScript::run("user?.name", Some(vars)).unwrap();
    assert!(matches!(result.value, Value::Str(ref s) if s == "Alice"));
}

#[test]
fn factorial_recursion() {
    let result = KodiScript::run(
        "let factorial = fn(n) { if (n <= 1) { return 1 } return n * factorial(n - 1) } factorial(5)",
        None,
    )
    .unwrap();
    assert!(matches!(result.value, Value::Number(n) if n == 120.0));
}

#[test]
fn host_function_composes_with_script_call_syntax() {
    let result = KodiScript::builder()
        .function("greet", |args: &[Value]| {
            let name = match args.first() {
                Some(Value::Str(s)) => s.clone(),
                _ => return Err("greet expects a string argument".to_string()),
            };
            Ok(Value::Str(format!("Hello, {name}!")))
        })
        .run(r#"greet("PHP")"#)
        .unwrap();
    assert!(matches!(result.value, Value::Str(ref s) if s == "Hello, PHP!"));
}

#[test]
fn undefined_variable_is_a_result_error_not_a_panic() {
    let result = KodiScript::run("undefined_variable", None).unwrap();
    assert!(result.value.is_null());
    assert_eq!(result.errors.len(), 1);
}

#[test]
fn eval_returns_injected_variable_verbatim_for_every_kind() {
    for value in [
        Value::Null,
        Value::Bool(true),
        Value::Number(3.5),
        Value::Str("hi".to_string()),
        Value::array(vec![Value::Number(1.0), Value::Number(2.0)]),
    ] {
        let mut vars = HashMap::new();
        vars.insert("x".to_string(), value.clone());
        let got = KodiScript::eval("x", vars).unwrap();
        assert!(got.strict_eq(&value));
    }
}

#[test]
fn elvis_falls_through_only_on_null_not_on_falsy_values() {
    let mut vars = HashMap::new();
    vars.insert("x".to_string(), Value::Number(0.0));
    let got = KodiScript::eval("x ?: 99", vars).unwrap();
    assert!(matches!(got, Value::Number(n) if n == 0.0));

    let mut vars = HashMap::new();
    vars.insert("x".to_string(), Value::Null);
    let got = KodiScript::eval("x ?: 99", vars).unwrap();
    assert!(matches!(got, Value::Number(n) if n == 99.0));
}

#[test]
fn max_operations_of_one_always_terminates_with_a_limit_error() {
    let result = KodiScript::builder()
        .max_operations(1)
        .run("let x = 1 + 1")
        .unwrap();
    assert_eq!(result.errors.len(), 1);
}

#[test]
fn division_by_zero_is_an_arithmetic_error() {
    let result = KodiScript::run("1 / 0", None).unwrap();
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("division by zero"));
}

#[test]
fn closures_capture_by_snapshot_but_recurse_by_name() {
    let result = KodiScript::run(
        "let makeAdder = fn(n) { return fn(x) { return x + n } } let addFive = makeAdder(5) addFive(10)",
        None,
    )
    .unwrap();
    assert!(matches!(result.value, Value::Number(n) if n == 15.0));
}
