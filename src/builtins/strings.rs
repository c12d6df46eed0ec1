use std::collections::HashMap;
use std::rc::Rc;

use super::{arg, as_number, as_string, insert, BuiltinFn};
use crate::evaluator::{coerce_number, EvalError};
use crate::value::Value;

pub fn register(map: &mut HashMap<String, Rc<BuiltinFn>>) {
    insert(map, BuiltinFn::new("toString", |args, _| {
        Ok(Value::Str(arg(args, 0).stringify()))
    }));
    insert(map, BuiltinFn::new("toNumber", |args, _| {
        Ok(Value::Number(coerce_number(&arg(args, 0))?))
    }));
    insert(map, BuiltinFn::new("length", |args, _| length(&arg(args, 0))));
    insert(map, BuiltinFn::new("substring", |args, _| substring(args)));
    insert(map, BuiltinFn::new("toUpperCase", |args, _| {
        Ok(Value::Str(as_string("toUpperCase", args, 0)?.to_uppercase()))
    }));
    insert(map, BuiltinFn::new("toLowerCase", |args, _| {
        Ok(Value::Str(as_string("toLowerCase", args, 0)?.to_lowercase()))
    }));
    insert(map, BuiltinFn::new("trim", |args, _| {
        Ok(Value::Str(as_string("trim", args, 0)?.trim().to_string()))
    }));
    insert(map, BuiltinFn::new("replace", |args, _| replace(args)));
    insert(map, BuiltinFn::new("split", |args, _| split(args)));
    insert(map, BuiltinFn::new("join", |args, _| join(args)));
    insert(map, BuiltinFn::new("contains", |args, _| {
        let haystack = as_string("contains", args, 0)?;
        let needle = as_string("contains", args, 1)?;
        Ok(Value::Bool(haystack.contains(&needle)))
    }));
    insert(map, BuiltinFn::new("startsWith", |args, _| {
        let haystack = as_string("startsWith", args, 0)?;
        let prefix = as_string("startsWith", args, 1)?;
        Ok(Value::Bool(haystack.starts_with(&prefix)))
    }));
    insert(map, BuiltinFn::new("endsWith", |args, _| {
        let haystack = as_string("endsWith", args, 0)?;
        let suffix = as_string("endsWith", args, 1)?;
        Ok(Value::Bool(haystack.ends_with(&suffix)))
    }));
    insert(map, BuiltinFn::new("indexOf", |args, _| index_of(args)));
    insert(map, BuiltinFn::new("repeat", |args, _| repeat(args)));
    insert(map, BuiltinFn::new("padLeft", |args, _| pad(args, true)));
    insert(map, BuiltinFn::new("padRight", |args, _| pad(args, false)));
}

fn units(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn from_units(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

fn length(v: &Value) -> Result<Value, EvalError> {
    match v {
        Value::Str(s) => Ok(Value::Number(units(s).len() as f64)),
        Value::Array(items) => Ok(Value::Number(items.len() as f64)),
        other => Err(EvalError::Type(format!(
            "length: argument is a {}, not a string or array",
            other.type_name()
        ))),
    }
}

fn substring(args: &[Value]) -> Result<Value, EvalError> {
    let s = as_string("substring", args, 0)?;
    let all = units(&s);
    let start = as_number("substring", args, 1)?.max(0.0) as usize;
    let end = match arg(args, 2) {
        Value::Null => all.len(),
        other => coerce_number(&other)?.max(0.0) as usize,
    };
    let start = start.min(all.len());
    let end = end.min(all.len()).max(start);
    Ok(Value::Str(from_units(&all[start..end])))
}

fn replace(args: &[Value]) -> Result<Value, EvalError> {
    let s = as_string("replace", args, 0)?;
    let from = as_string("replace", args, 1)?;
    let to = as_string("replace", args, 2)?;
    Ok(Value::Str(s.replace(&from, &to)))
}

fn split(args: &[Value]) -> Result<Value, EvalError> {
    let s = as_string("split", args, 0)?;
    let sep = as_string("split", args, 1)?;
    let parts: Vec<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::Str(c.to_string())).collect()
    } else {
        s.split(&sep as &str).map(|p| Value::Str(p.to_string())).collect()
    };
    Ok(Value::array(parts))
}

fn join(args: &[Value]) -> Result<Value, EvalError> {
    let items = super::as_array("join", args, 0)?;
    let sep = as_string("join", args, 1)?;
    let parts: Vec<String> = items.iter().map(Value::stringify).collect();
    Ok(Value::Str(parts.join(&sep)))
}

/// See SPEC_FULL.md §G.2: returns the true code-unit position, `-1` only
/// when absent (position `0` is a valid match, unlike the bug this corrects).
fn index_of(args: &[Value]) -> Result<Value, EvalError> {
    let haystack = units(&as_string("indexOf", args, 0)?);
    let needle = units(&as_string("indexOf", args, 1)?);
    if needle.is_empty() {
        return Ok(Value::Number(0.0));
    }
    let pos = haystack
        .windows(needle.len())
        .position(|window| window == needle.as_slice());
    Ok(Value::Number(pos.map(|p| p as f64).unwrap_or(-1.0)))
}

fn repeat(args: &[Value]) -> Result<Value, EvalError> {
    let s = as_string("repeat", args, 0)?;
    let n = as_number("repeat", args, 1)?;
    if n <= 0.0 {
        return Ok(Value::Str(String::new()));
    }
    Ok(Value::Str(s.repeat(n as usize)))
}

fn pad(args: &[Value], left: bool) -> Result<Value, EvalError> {
    let name = if left { "padLeft" } else { "padRight" };
    let s = as_string(name, args, 0)?;
    let target_len = as_number(name, args, 1)?.max(0.0) as usize;
    let pad_str = match arg(args, 2) {
        Value::Null => " ".to_string(),
        other => other.stringify(),
    };
    let mut current = units(&s);
    if pad_str.is_empty() || current.len() >= target_len {
        return Ok(Value::Str(s));
    }
    let pad_units = units(&pad_str);
    let mut filler = Vec::new();
    while current.len() + filler.len() < target_len {
        filler.extend_from_slice(&pad_units);
    }
    filler.truncate(target_len - current.len());
    if left {
        filler.extend_from_slice(&current);
        Ok(Value::Str(from_units(&filler)))
    } else {
        current.extend_from_slice(&filler);
        Ok(Value::Str(from_units(&current)))
    }
}
