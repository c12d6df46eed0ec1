//! The built-in standard library (spec.md §4.6): a name-keyed registry of
//! host-callable functions, shared read-only across evaluator instances.

mod arrays;
mod crypto;
mod encoding;
mod json;
mod math;
mod random;
mod strings;
mod time;
mod types;

use std::collections::HashMap;
use std::rc::Rc;

use crate::evaluator::{Apply, EvalError};
use crate::value::Value;

/// A built-in's signature: already-evaluated arguments plus an `Apply`
/// capability for the handful of higher-order built-ins that need to call
/// back into the evaluator (spec.md §9).
pub struct BuiltinFn {
    pub name: String,
    func: Box<dyn Fn(&[Value], &mut dyn Apply) -> Result<Value, EvalError>>,
}

impl BuiltinFn {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value], &mut dyn Apply) -> Result<Value, EvalError> + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    pub fn call(&self, args: &[Value], apply: &mut dyn Apply) -> Result<Value, EvalError> {
        (self.func)(args, apply)
    }
}

/// Builds the full built-in registry once; cheap to share via `Rc` across
/// concurrent independent runs (spec.md §5).
pub fn registry() -> Rc<HashMap<String, Rc<BuiltinFn>>> {
    let mut map = HashMap::new();
    insert(&mut map, BuiltinFn::new("print", print));
    strings::register(&mut map);
    math::register(&mut map);
    random::register(&mut map);
    types::register(&mut map);
    arrays::register(&mut map);
    json::register(&mut map);
    encoding::register(&mut map);
    crypto::register(&mut map);
    time::register(&mut map);
    Rc::new(map)
}

pub(crate) fn insert(map: &mut HashMap<String, Rc<BuiltinFn>>, f: BuiltinFn) {
    map.insert(f.name.clone(), Rc::new(f));
}

fn print(args: &[Value], apply: &mut dyn Apply) -> Result<Value, EvalError> {
    let line = args
        .iter()
        .map(Value::stringify)
        .collect::<Vec<_>>()
        .join(" ");
    apply.record_output(line);
    Ok(Value::Null)
}

/// Argument-extraction helpers shared by every built-in module. A missing
/// argument reads as `Value::Null`, matching the evaluator's own "extra
/// arguments ignored, missing arguments bind null" rule for user functions.
pub(crate) fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or(Value::Null)
}

pub(crate) fn as_number(name: &str, args: &[Value], i: usize) -> Result<f64, EvalError> {
    crate::evaluator::coerce_number(&arg(args, i))
        .map_err(|_| EvalError::Type(format!("{name}: argument {i} is not a number")))
}

pub(crate) fn as_string(name: &str, args: &[Value], i: usize) -> Result<String, EvalError> {
    match arg(args, i) {
        Value::Str(s) => Ok(s),
        other => Err(EvalError::Type(format!(
            "{name}: argument {i} is a {}, not a string",
            other.type_name()
        ))),
    }
}

pub(crate) fn as_array(name: &str, args: &[Value], i: usize) -> Result<Rc<Vec<Value>>, EvalError> {
    match arg(args, i) {
        Value::Array(items) => Ok(items),
        other => Err(EvalError::Type(format!(
            "{name}: argument {i} is a {}, not an array",
            other.type_name()
        ))),
    }
}
