use std::collections::HashMap;
use std::rc::Rc;

use super::{arg, insert, BuiltinFn};
use crate::value::Value;

pub fn register(map: &mut HashMap<String, Rc<BuiltinFn>>) {
    insert(map, BuiltinFn::new("typeOf", |args, _| {
        Ok(Value::Str(arg(args, 0).type_name().to_string()))
    }));
    insert(map, BuiltinFn::new("isNull", |args, _| {
        Ok(Value::Bool(arg(args, 0).is_null()))
    }));
    insert(map, BuiltinFn::new("isNumber", |args, _| {
        Ok(Value::Bool(matches!(arg(args, 0), Value::Number(_))))
    }));
    insert(map, BuiltinFn::new("isString", |args, _| {
        Ok(Value::Bool(matches!(arg(args, 0), Value::Str(_))))
    }));
    insert(map, BuiltinFn::new("isBool", |args, _| {
        Ok(Value::Bool(matches!(arg(args, 0), Value::Bool(_))))
    }));
}
