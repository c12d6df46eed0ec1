use std::collections::HashMap;
use std::rc::Rc;

use super::{arg, as_string, insert, BuiltinFn};
use crate::evaluator::EvalError;
use crate::value::{ObjectMap, Value};

pub fn register(map: &mut HashMap<String, Rc<BuiltinFn>>) {
    insert(map, BuiltinFn::new("jsonParse", |args, _| {
        let text = as_string("jsonParse", args, 0)?;
        let parsed: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| EvalError::Type(format!("jsonParse: invalid JSON ({e})")))?;
        Ok(from_json(parsed))
    }));
    insert(map, BuiltinFn::new("jsonStringify", |args, _| {
        let json = to_json(&arg(args, 0));
        let text = serde_json::to_string(&json)
            .map_err(|e| EvalError::Type(format!("jsonStringify: {e}")))?;
        Ok(Value::Str(text))
    }));
}

fn to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => number_to_json(*n),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Object(map) => {
            let mut obj = serde_json::Map::new();
            for (k, v) in map.iter() {
                obj.insert(k.clone(), to_json(v));
            }
            serde_json::Value::Object(obj)
        }
        Value::Function(_) | Value::Builtin(_) => serde_json::Value::Null,
    }
}

/// Integral, finite values render as JSON integers (`1`, not `1.0`), matching
/// the reference `json_encode`'s number formatting.
fn number_to_json(n: f64) -> serde_json::Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        if n >= 0.0 {
            serde_json::Value::Number((n as u64).into())
        } else {
            serde_json::Value::Number((n as i64).into())
        }
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

fn from_json(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(items) => Value::array(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(obj) => {
            let map: ObjectMap = obj.into_iter().map(|(k, v)| (k, from_json(v))).collect();
            Value::object(map)
        }
    }
}
