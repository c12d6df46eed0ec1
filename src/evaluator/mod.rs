//! AST → value evaluation (spec.md §4.5): closures, non-local `return`,
//! and the bounded-execution checks in §4.7.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ast::{Expr, Program, Stmt, TemplatePart};
use crate::builtins::BuiltinFn;
use crate::host::HostFunction;
use crate::limits::Limits;
use crate::value::{Environment, Function, ObjectMap, Value};

/// The error taxonomy of spec.md §7, minus lexical/parse errors which live in
/// their own stages.
#[derive(Debug)]
pub enum EvalError {
    UndefinedVariable(String),
    Type(String),
    DivisionByZero,
    Limit(String),
    /// A registered host function failed; message carried verbatim.
    Host(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UndefinedVariable(name) => write!(f, "undefined variable: {name}"),
            EvalError::Type(message) => f.write_str(message),
            EvalError::DivisionByZero => f.write_str("division by zero"),
            EvalError::Limit(message) => f.write_str(message),
            EvalError::Host(message) => f.write_str(message),
        }
    }
}

impl StdError for EvalError {}

/// Internal non-local control transfer: `return` unwinds through blocks and
/// bodies as an `Err` value rather than a real panic, matching spec.md
/// §4.5's "single well-defined signalling mechanism".
enum Signal {
    Return(Value),
    Error(EvalError),
}

impl From<EvalError> for Signal {
    fn from(e: EvalError) -> Self {
        Signal::Error(e)
    }
}

type EvalResult<T> = Result<T, Signal>;

/// The result record handed back to the host (spec.md §3/§6).
#[derive(Debug, Clone)]
pub struct RunResult {
    pub value: Value,
    pub output: Vec<String>,
    pub errors: Vec<String>,
}

/// The bridge higher-order built-ins (`map`, `filter`, `reduce`, `find`,
/// `findIndex`) use to call back into the evaluator for a function-valued
/// argument, and to append to the captured output (spec.md §9: an explicit
/// capability passed at call time, not a mutable singleton registry).
pub trait Apply {
    fn apply(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, EvalError>;
    fn record_output(&mut self, line: String);
}

pub struct Evaluator {
    variables: Environment,
    host_functions: HashMap<String, HostFunction>,
    builtins: Rc<HashMap<String, Rc<BuiltinFn>>>,
    limits: Limits,
    operations: u64,
    output: Vec<String>,
}

impl Evaluator {
    pub fn new(
        variables: Environment,
        host_functions: HashMap<String, HostFunction>,
        builtins: Rc<HashMap<String, Rc<BuiltinFn>>>,
        limits: Limits,
    ) -> Self {
        Self {
            variables,
            host_functions,
            builtins,
            limits,
            operations: 0,
            output: Vec::new(),
        }
    }

    /// Runs a parsed program to completion, turning a terminal error into a
    /// `Result` rather than propagating it (the eval-only host entry point
    /// re-raises instead; see `host.rs`).
    pub fn run(&mut self, program: &Program) -> RunResult {
        let outcome = self.try_run(program);
        let output = std::mem::take(&mut self.output);
        match outcome {
            Ok(value) => RunResult {
                value,
                output,
                errors: Vec::new(),
            },
            Err(e) => {
                log::warn!("script terminated: {e}");
                RunResult {
                    value: Value::Null,
                    output,
                    errors: vec![e.to_string()],
                }
            }
        }
    }

    /// Runs a parsed program, propagating a terminal error instead of
    /// capturing it in a `RunResult` (used by the eval-only host entry
    /// point). Output already emitted via `print` is still retained on
    /// `self.output` for the caller to drain.
    pub fn try_run(&mut self, program: &Program) -> Result<Value, EvalError> {
        match self.eval_program(program) {
            Ok(v) | Err(Signal::Return(v)) => Ok(v),
            Err(Signal::Error(e)) => Err(e),
        }
    }

    fn tick(&mut self) -> EvalResult<()> {
        self.operations += 1;
        if let Some(max) = self.limits.max_operations {
            if self.operations > max {
                return Err(EvalError::Limit("max operations exceeded".into()).into());
            }
        }
        if let Some(deadline) = self.limits.deadline_epoch_ms {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as i64)
                .unwrap_or(i64::MAX);
            if now > deadline {
                return Err(EvalError::Limit("execution timeout".into()).into());
            }
        }
        Ok(())
    }

    fn eval_program(&mut self, program: &Program) -> EvalResult<Value> {
        self.tick()?;
        self.eval_block(&program.statements)
    }

    fn eval_block(&mut self, stmts: &[Stmt]) -> EvalResult<Value> {
        let mut result = Value::Null;
        for stmt in stmts {
            result = self.eval_stmt(stmt)?;
        }
        Ok(result)
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> EvalResult<Value> {
        self.tick()?;
        match stmt {
            Stmt::Let { name, value } | Stmt::Assign { name, value } => {
                let v = self.eval_expr(value)?;
                self.variables.set(name.clone(), v.clone());
                Ok(v)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let cond = self.eval_expr(condition)?;
                if cond.is_truthy() {
                    self.eval_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.eval_block(else_branch)
                } else {
                    Ok(Value::Null)
                }
            }
            Stmt::ForIn {
                name,
                iterable,
                body,
            } => {
                let iter_val = self.eval_expr(iterable)?;
                let items: Vec<Value> = match &iter_val {
                    Value::Array(items) => items.as_ref().clone(),
                    Value::Object(map) => map.iter().map(|(_, v)| v.clone()).collect(),
                    other => {
                        return Err(EvalError::Type(format!(
                            "cannot iterate a {}",
                            other.type_name()
                        ))
                        .into())
                    }
                };
                let mut result = Value::Null;
                for item in items {
                    self.variables.set(name.clone(), item);
                    result = self.eval_block(body)?;
                }
                Ok(result)
            }
            Stmt::While { condition, body } => {
                let mut result = Value::Null;
                while self.eval_expr(condition)?.is_truthy() {
                    result = self.eval_block(body)?;
                }
                Ok(result)
            }
            Stmt::Return(value) => {
                let v = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                Err(Signal::Return(v))
            }
            Stmt::Block(stmts) => self.eval_block(stmts),
            Stmt::Expr(expr) => self.eval_expr(expr),
        }
    }

    fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.tick()?;
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::StringTemplate(parts) => self.eval_template(parts),
            Expr::Ident(name) => self.resolve(name),
            Expr::Binary { op, left, right } => self.eval_binary(op, left, right),
            Expr::Unary { op, operand } => {
                let v = self.eval_expr(operand)?;
                match op.as_str() {
                    "-" => Ok(Value::Number(-coerce_number(&v)?)),
                    "!" => Ok(Value::Bool(!v.is_truthy())),
                    other => unreachable!("parser emits no unary operator {other:?}"),
                }
            }
            Expr::Call { callee, args } => {
                let callee_val = self.eval_expr(callee)?;
                let mut arg_vals = Vec::with_capacity(args.len());
                for arg in args {
                    arg_vals.push(self.eval_expr(arg)?);
                }
                self.call_value(&callee_val, arg_vals)
            }
            Expr::Member { object, property } => {
                let obj = self.eval_expr(object)?;
                member_access(&obj, property)
            }
            Expr::SafeMember { object, property } => {
                let obj = self.eval_expr(object)?;
                if obj.is_null() {
                    Ok(Value::Null)
                } else {
                    member_access(&obj, property)
                }
            }
            Expr::Elvis { left, right } => {
                let l = self.eval_expr(left)?;
                if l.is_null() {
                    self.eval_expr(right)
                } else {
                    Ok(l)
                }
            }
            Expr::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for el in elements {
                    items.push(self.eval_expr(el)?);
                }
                Ok(Value::array(items))
            }
            Expr::Object(pairs) => {
                let mut map = ObjectMap::new();
                for (key, value_expr) in pairs {
                    let value = self.eval_expr(value_expr)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::object(map))
            }
            Expr::Index { object, index } => {
                let obj = self.eval_expr(object)?;
                let idx = self.eval_expr(index)?;
                index_access(&obj, &idx)
            }
            Expr::Function { params, body } => Ok(Value::Function(Rc::new(Function {
                params: params.clone(),
                body: body.clone(),
                closure: self.variables.clone(),
            }))),
        }
    }

    fn eval_template(&mut self, parts: &[TemplatePart]) -> EvalResult<Value> {
        let mut out = String::new();
        for part in parts {
            match part {
                TemplatePart::Lit(s) => out.push_str(s),
                TemplatePart::Expr(expr) => {
                    let v = self.eval_expr(expr)?;
                    out.push_str(&v.stringify());
                }
            }
        }
        Ok(Value::Str(out))
    }

    /// Identifier resolution order per spec.md §3: current variables, then
    /// host-registered functions, then built-ins.
    fn resolve(&mut self, name: &str) -> EvalResult<Value> {
        if let Some(v) = self.variables.get(name) {
            return Ok(v.clone());
        }
        if let Some(host_fn) = self.host_functions.get(name) {
            let host_fn = Rc::clone(host_fn);
            return Ok(Value::Builtin(Rc::new(BuiltinFn::new(
                name,
                move |args, _apply| host_fn(args).map_err(EvalError::Host),
            ))));
        }
        if let Some(builtin) = self.builtins.get(name) {
            return Ok(Value::Builtin(Rc::clone(builtin)));
        }
        Err(EvalError::UndefinedVariable(name.to_string()).into())
    }

    fn eval_binary(&mut self, op: &str, left: &Expr, right: &Expr) -> EvalResult<Value> {
        match op {
            "&&" => {
                let l = self.eval_expr(left)?;
                if !l.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                let r = self.eval_expr(right)?;
                Ok(Value::Bool(r.is_truthy()))
            }
            "||" => {
                let l = self.eval_expr(left)?;
                if l.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                let r = self.eval_expr(right)?;
                Ok(Value::Bool(r.is_truthy()))
            }
            _ => {
                let l = self.eval_expr(left)?;
                let r = self.eval_expr(right)?;
                apply_binary(op, l, r)
            }
        }
    }

    fn call_value(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult<Value> {
        match callee {
            Value::Function(f) => self.call_function(f, args),
            Value::Builtin(b) => {
                let b = Rc::clone(b);
                b.call(&args, self).map_err(Signal::Error)
            }
            other => {
                Err(EvalError::Type(format!("cannot call a {}", other.type_name())).into())
            }
        }
    }

    /// Positional binding, closure overlay, whole-mapping save/restore
    /// (spec.md §4.5). `f.closure` is overlaid onto the caller's current
    /// variables rather than replacing them, so a name absent from the
    /// snapshot (such as the function's own binding, added by the `let`
    /// statement after the closure was captured) still resolves — this is
    /// what makes `let f = fn(n) { ... f(n - 1) ... }` recurse correctly.
    fn call_function(&mut self, f: &Rc<Function>, args: Vec<Value>) -> EvalResult<Value> {
        let saved = self.variables.clone();
        let mut activation = self.variables.clone();
        activation.overlay(&f.closure);
        for (i, param) in f.params.iter().enumerate() {
            activation.set(param.clone(), args.get(i).cloned().unwrap_or(Value::Null));
        }
        self.variables = activation;
        let outcome = self.eval_block(&f.body);
        self.variables = saved;
        match outcome {
            Ok(v) | Err(Signal::Return(v)) => Ok(v),
            Err(e @ Signal::Error(_)) => Err(e),
        }
    }
}

impl Apply for Evaluator {
    fn apply(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, EvalError> {
        match self.call_value(callee, args) {
            Ok(v) | Err(Signal::Return(v)) => Ok(v),
            Err(Signal::Error(e)) => Err(e),
        }
    }

    fn record_output(&mut self, line: String) {
        self.output.push(line);
    }
}

fn member_access(obj: &Value, property: &str) -> EvalResult<Value> {
    match obj {
        Value::Object(map) => Ok(map.get(property).cloned().unwrap_or(Value::Null)),
        other => Err(EvalError::Type(format!(
            "cannot access property '{property}' on a {}",
            other.type_name()
        ))
        .into()),
    }
}

fn index_access(obj: &Value, idx: &Value) -> EvalResult<Value> {
    match obj {
        Value::Array(items) => {
            let i = coerce_number(idx)?;
            if i < 0.0 {
                return Ok(Value::Null);
            }
            Ok(items.get(i as usize).cloned().unwrap_or(Value::Null))
        }
        Value::Object(map) => {
            let key = match idx {
                Value::Str(s) => s.clone(),
                other => other.stringify(),
            };
            Ok(map.get(&key).cloned().unwrap_or(Value::Null))
        }
        Value::Str(s) => {
            let i = coerce_number(idx)?;
            if i < 0.0 {
                return Ok(Value::Null);
            }
            match s.encode_utf16().nth(i as usize) {
                Some(unit) => Ok(Value::Str(String::from_utf16_lossy(&[unit]))),
                None => Ok(Value::Null),
            }
        }
        other => Err(EvalError::Type(format!("cannot index a {}", other.type_name())).into()),
    }
}

fn apply_binary(op: &str, l: Value, r: Value) -> EvalResult<Value> {
    match op {
        "+" => {
            if matches!(l, Value::Str(_)) || matches!(r, Value::Str(_)) {
                Ok(Value::Str(format!("{}{}", l.stringify(), r.stringify())))
            } else {
                Ok(Value::Number(coerce_number(&l)? + coerce_number(&r)?))
            }
        }
        "-" => Ok(Value::Number(coerce_number(&l)? - coerce_number(&r)?)),
        "*" => Ok(Value::Number(coerce_number(&l)? * coerce_number(&r)?)),
        "%" => Ok(Value::Number(coerce_number(&l)? % coerce_number(&r)?)),
        "/" => {
            let rn = coerce_number(&r)?;
            if rn == 0.0 {
                return Err(EvalError::DivisionByZero.into());
            }
            Ok(Value::Number(coerce_number(&l)? / rn))
        }
        "==" => Ok(Value::Bool(l.strict_eq(&r))),
        "!=" => Ok(Value::Bool(!l.strict_eq(&r))),
        "<" | "<=" | ">" | ">=" => compare(op, &l, &r),
        other => unreachable!("parser emits no binary operator {other:?}"),
    }
}

fn compare(op: &str, l: &Value, r: &Value) -> EvalResult<Value> {
    let ordering = match (l, r) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => None,
    };
    let ordering = ordering.ok_or_else(|| {
        EvalError::Type(format!(
            "cannot compare {} and {}",
            l.type_name(),
            r.type_name()
        ))
    })?;
    let result = match op {
        "<" => ordering.is_lt(),
        "<=" => ordering.is_le(),
        ">" => ordering.is_gt(),
        ">=" => ordering.is_ge(),
        other => unreachable!("not a comparison operator: {other:?}"),
    };
    Ok(Value::Bool(result))
}

/// Numeric coercion shared by arithmetic operators and indexing. Mirrors the
/// `toNumber` built-in's rule (see `builtins::strings`).
pub fn coerce_number(v: &Value) -> Result<f64, EvalError> {
    match v {
        Value::Number(n) => Ok(*n),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Null => Ok(0.0),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| EvalError::Type(format!("cannot convert \"{s}\" to a number"))),
        other => Err(EvalError::Type(format!(
            "cannot convert a {} to a number",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_source(src: &str) -> RunResult {
        run_source_with_limits(src, Limits::unlimited())
    }

    fn run_source_with_limits(src: &str, limits: Limits) -> RunResult {
        let program = crate::parser::parse(src).expect("parse");
        let mut evaluator = Evaluator::new(
            Environment::new(),
            HashMap::new(),
            crate::builtins::registry(),
            limits,
        );
        evaluator.run(&program)
    }

    #[test]
    fn arithmetic_precedence() {
        let result = run_source("2 + 3 * 4");
        assert!(result.errors.is_empty());
        assert!(matches!(result.value, Value::Number(n) if n == 14.0));
    }

    #[test]
    fn let_then_reassign() {
        let result = run_source("let x = 10; x = 100; x");
        assert!(matches!(result.value, Value::Number(n) if n == 100.0));
    }

    #[test]
    fn for_in_sums_array() {
        let result =
            run_source("let sum = 0 for (i in [1,2,3,4,5]) { sum = sum + i } sum");
        assert!(matches!(result.value, Value::Number(n) if n == 15.0));
    }

    #[test]
    fn print_captures_output_and_returns_null() {
        let result = run_source("print(\"Hello\"); print(\"World\")");
        assert_eq!(result.output, vec!["Hello".to_string(), "World".to_string()]);
        assert!(result.value.is_null());
    }

    #[test]
    fn recursive_factorial() {
        let result = run_source(
            "let factorial = fn(n) { if (n <= 1) { return 1 } return n * factorial(n - 1) } factorial(5)",
        );
        assert!(matches!(result.value, Value::Number(n) if n == 120.0));
    }

    #[test]
    fn undefined_variable_reports_error() {
        let result = run_source("undefined_variable");
        assert!(result.value.is_null());
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn max_operations_one_always_fails() {
        let result = run_source_with_limits("1", Limits::unlimited().with_max_operations(1));
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn gauss_sum_property() {
        let result = run_source(
            "let f = fn(n) { if (n <= 0) { return 0 } return n + f(n - 1) } f(10)",
        );
        assert!(matches!(result.value, Value::Number(n) if n == 55.0));
    }

    #[test]
    fn elvis_does_not_use_truthiness() {
        let result = run_source("0 ?: 1");
        assert!(matches!(result.value, Value::Number(n) if n == 0.0));
    }
}
