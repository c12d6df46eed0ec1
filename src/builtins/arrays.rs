use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

use super::{arg, as_array, as_number, as_string, insert, BuiltinFn};
use crate::evaluator::{coerce_number, Apply, EvalError};
use crate::value::Value;

pub fn register(map: &mut HashMap<String, Rc<BuiltinFn>>) {
    insert(map, BuiltinFn::new("size", |args, _| {
        Ok(Value::Number(as_array("size", args, 0)?.len() as f64))
    }));
    insert(map, BuiltinFn::new("first", |args, _| {
        Ok(as_array("first", args, 0)?.first().cloned().unwrap_or(Value::Null))
    }));
    insert(map, BuiltinFn::new("last", |args, _| {
        Ok(as_array("last", args, 0)?.last().cloned().unwrap_or(Value::Null))
    }));
    insert(map, BuiltinFn::new("reverse", |args, _| {
        let items = as_array("reverse", args, 0)?;
        let mut v = items.as_ref().clone();
        v.reverse();
        Ok(Value::array(v))
    }));
    insert(map, BuiltinFn::new("slice", |args, _| slice(args)));
    insert(map, BuiltinFn::new("sort", |args, _| sort(args)));
    insert(map, BuiltinFn::new("sortBy", |args, _| sort_by(args)));
    insert(map, BuiltinFn::new("filter", filter));
    insert(map, BuiltinFn::new("map", map_fn));
    insert(map, BuiltinFn::new("reduce", reduce));
    insert(map, BuiltinFn::new("find", find));
    insert(map, BuiltinFn::new("findIndex", find_index));
}

fn slice(args: &[Value]) -> Result<Value, EvalError> {
    let items = as_array("slice", args, 0)?;
    let start = as_number("slice", args, 1)?.max(0.0) as usize;
    let end = match arg(args, 2) {
        Value::Null => items.len(),
        other => coerce_number(&other)?.max(0.0) as usize,
    };
    let start = start.min(items.len());
    let end = end.min(items.len()).max(start);
    Ok(Value::array(items[start..end].to_vec()))
}

/// Ordering used by both `sort` and `sortBy`'s key comparison. Per
/// SPEC_FULL.md §G.3, null keys compare equal to each other and sort before
/// every other key.
fn compare_values(a: &Value, b: &Value) -> Result<Ordering, EvalError> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .partial_cmp(y)
            .ok_or_else(|| EvalError::Type("cannot order NaN".into())),
        (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
        (Value::Null, Value::Null) => Ok(Ordering::Equal),
        (Value::Null, _) => Ok(Ordering::Less),
        (_, Value::Null) => Ok(Ordering::Greater),
        _ => Err(EvalError::Type(format!(
            "cannot order a {} against a {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn is_descending(args: &[Value], i: usize) -> String {
    match arg(args, i) {
        Value::Null => "asc".to_string(),
        other => other.stringify(),
    }
}

fn sort(args: &[Value]) -> Result<Value, EvalError> {
    let items = as_array("sort", args, 0)?;
    let order = is_descending(args, 1);
    let mut v = items.as_ref().clone();
    let mut failure = None;
    v.sort_by(|a, b| {
        compare_values(a, b).unwrap_or_else(|e| {
            failure.get_or_insert(e);
            Ordering::Equal
        })
    });
    if let Some(e) = failure {
        return Err(e);
    }
    if order == "desc" {
        v.reverse();
    }
    Ok(Value::array(v))
}

/// Elements that are not objects, or lack the named field, sort as if their
/// key were `null` (SPEC_FULL.md §G.3).
fn sort_by(args: &[Value]) -> Result<Value, EvalError> {
    let items = as_array("sortBy", args, 0)?;
    let field = as_string("sortBy", args, 1)?;
    let order = is_descending(args, 2);
    let key_of = |v: &Value| -> Value {
        match v {
            Value::Object(map) => map.get(&field).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        }
    };
    let mut v = items.as_ref().clone();
    let mut failure = None;
    v.sort_by(|a, b| {
        compare_values(&key_of(a), &key_of(b)).unwrap_or_else(|e| {
            failure.get_or_insert(e);
            Ordering::Equal
        })
    });
    if let Some(e) = failure {
        return Err(e);
    }
    if order == "desc" {
        v.reverse();
    }
    Ok(Value::array(v))
}

fn filter(args: &[Value], apply: &mut dyn Apply) -> Result<Value, EvalError> {
    let items = as_array("filter", args, 0)?;
    let f = arg(args, 1);
    let mut out = Vec::new();
    for item in items.iter() {
        if apply.apply(&f, vec![item.clone()])?.is_truthy() {
            out.push(item.clone());
        }
    }
    Ok(Value::array(out))
}

fn map_fn(args: &[Value], apply: &mut dyn Apply) -> Result<Value, EvalError> {
    let items = as_array("map", args, 0)?;
    let f = arg(args, 1);
    let mut out = Vec::with_capacity(items.len());
    for item in items.iter() {
        out.push(apply.apply(&f, vec![item.clone()])?);
    }
    Ok(Value::array(out))
}

fn reduce(args: &[Value], apply: &mut dyn Apply) -> Result<Value, EvalError> {
    let items = as_array("reduce", args, 0)?;
    let f = arg(args, 1);
    let mut acc = arg(args, 2);
    for item in items.iter() {
        acc = apply.apply(&f, vec![acc, item.clone()])?;
    }
    Ok(acc)
}

fn find(args: &[Value], apply: &mut dyn Apply) -> Result<Value, EvalError> {
    let items = as_array("find", args, 0)?;
    let f = arg(args, 1);
    for item in items.iter() {
        if apply.apply(&f, vec![item.clone()])?.is_truthy() {
            return Ok(item.clone());
        }
    }
    Ok(Value::Null)
}

fn find_index(args: &[Value], apply: &mut dyn Apply) -> Result<Value, EvalError> {
    let items = as_array("findIndex", args, 0)?;
    let f = arg(args, 1);
    for (i, item) in items.iter().enumerate() {
        if apply.apply(&f, vec![item.clone()])?.is_truthy() {
            return Ok(Value::Number(i as f64));
        }
    }
    Ok(Value::Number(-1.0))
}
