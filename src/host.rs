//! The host-facing façade (spec.md §6): three entry points over the
//! lexer/parser/evaluator pipeline, plus the single-use execution builder.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ast::Program;
use crate::builtins;
use crate::evaluator::{Evaluator, RunResult};
use crate::limits::Limits;
use crate::value::{Environment, Value};
use crate::Error;

/// A host-registered function: already-evaluated arguments in, a value or a
/// verbatim error message out (spec.md §7: "its message is captured
/// verbatim").
pub type HostFunction = Rc<dyn Fn(&[Value]) -> Result<Value, String>>;

/// Namespace for the two static host entry points. The third entry point is
/// [`KodiScriptBuilder`].
pub struct KodiScript;

impl KodiScript {
    /// Evaluates `source` and returns only the value, re-raising any lexical,
    /// parse, or evaluation error to the host.
    pub fn eval(source: &str, variables: HashMap<String, Value>) -> Result<Value, Error> {
        let program = parse_program(source)?;
        let mut evaluator = Evaluator::new(
            environment_from(variables),
            HashMap::new(),
            builtins::registry(),
            Limits::default(),
        );
        Ok(evaluator.try_run(&program)?)
    }

    /// Runs `source` with an optional initial variables map and returns the
    /// full result record; a terminal evaluation error is folded into
    /// `RunResult::errors` rather than propagated.
    pub fn run(
        source: &str,
        variables: Option<HashMap<String, Value>>,
    ) -> Result<RunResult, Error> {
        let program = parse_program(source)?;
        let mut evaluator = Evaluator::new(
            environment_from(variables.unwrap_or_default()),
            HashMap::new(),
            builtins::registry(),
            Limits::default(),
        );
        Ok(evaluator.run(&program))
    }

    pub fn builder() -> KodiScriptBuilder {
        KodiScriptBuilder::default()
    }
}

/// Accepts variables, registered functions, and execution limits, then
/// executes once. Single-use from the caller's perspective: `run` consumes
/// the builder (spec.md §6).
#[derive(Default)]
pub struct KodiScriptBuilder {
    variables: HashMap<String, Value>,
    host_functions: HashMap<String, HostFunction>,
    max_operations: Option<u64>,
    timeout_ms: Option<i64>,
}

impl KodiScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }

    pub fn variables(mut self, variables: HashMap<String, Value>) -> Self {
        self.variables.extend(variables);
        self
    }

    pub fn function<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + 'static,
    {
        self.host_functions.insert(name.into(), Rc::new(f));
        self
    }

    pub fn max_operations(mut self, max_operations: u64) -> Self {
        self.max_operations = Some(max_operations);
        self
    }

    /// Additional wall-clock time, in milliseconds, from the moment `run` is
    /// called (resolved to an absolute deadline at that point, not here).
    pub fn timeout(mut self, timeout_ms: i64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn run(self, source: &str) -> Result<RunResult, Error> {
        let program = parse_program(source)?;
        let deadline_epoch_ms = self.timeout_ms.map(|timeout| now_epoch_ms() + timeout);
        let limits = Limits {
            max_operations: self.max_operations,
            deadline_epoch_ms,
        };
        let mut evaluator = Evaluator::new(
            environment_from(self.variables),
            self.host_functions,
            builtins::registry(),
            limits,
        );
        Ok(evaluator.run(&program))
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn parse_program(source: &str) -> Result<Program, Error> {
    log::debug!("parsing {} bytes of source", source.len());
    Ok(crate::parser::parse(source)?)
}

fn environment_from(variables: HashMap<String, Value>) -> Environment {
    let mut env = Environment::new();
    for (name, value) in variables {
        env.set(name, value);
    }
    env
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_returns_injected_variable() {
        let mut vars = HashMap::new();
        vars.insert("x".to_string(), Value::Number(42.0));
        let value = KodiScript::eval("x", vars).expect("eval");
        assert!(matches!(value, Value::Number(n) if n == 42.0));
    }

    #[test]
    fn run_captures_undefined_variable_as_result_error() {
        let result = KodiScript::run("undefined_variable", None).expect("run");
        assert_eq!(result.errors.len(), 1);
        assert!(result.value.is_null());
    }

    #[test]
    fn builder_registers_host_function() {
        let result = KodiScript::builder()
            .function("greet", |args: &[Value]| {
                let name = match args.first() {
                    Some(Value::Str(s)) => s.clone(),
                    _ => return Err("greet expects a string".to_string()),
                };
                Ok(Value::Str(format!("Hello, {name}!")))
            })
            .run("greet(\"PHP\")")
            .expect("run");
        assert!(matches!(result.value, Value::Str(ref s) if s == "Hello, PHP!"));
    }

    #[test]
    fn builder_max_operations_one_fails() {
        let result = KodiScript::builder()
            .max_operations(1)
            .run("1 + 1")
            .expect("run");
        assert_eq!(result.errors.len(), 1);
    }
}
