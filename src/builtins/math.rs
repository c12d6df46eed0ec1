use std::collections::HashMap;
use std::rc::Rc;

use super::{as_number, insert, BuiltinFn};
use crate::evaluator::EvalError;
use crate::value::Value;

pub fn register(map: &mut HashMap<String, Rc<BuiltinFn>>) {
    insert(map, BuiltinFn::new("abs", unary("abs", f64::abs)));
    insert(map, BuiltinFn::new("floor", unary("floor", f64::floor)));
    insert(map, BuiltinFn::new("ceil", unary("ceil", f64::ceil)));
    insert(map, BuiltinFn::new("round", unary("round", f64::round)));
    insert(map, BuiltinFn::new("sqrt", unary("sqrt", f64::sqrt)));
    insert(map, BuiltinFn::new("sin", unary("sin", f64::sin)));
    insert(map, BuiltinFn::new("cos", unary("cos", f64::cos)));
    insert(map, BuiltinFn::new("tan", unary("tan", f64::tan)));
    insert(map, BuiltinFn::new("log", unary("log", f64::ln)));
    insert(map, BuiltinFn::new("log10", unary("log10", f64::log10)));
    insert(map, BuiltinFn::new("exp", unary("exp", f64::exp)));
    insert(map, BuiltinFn::new("min", |args, _| {
        let a = as_number("min", args, 0)?;
        let b = as_number("min", args, 1)?;
        Ok(Value::Number(a.min(b)))
    }));
    insert(map, BuiltinFn::new("max", |args, _| {
        let a = as_number("max", args, 0)?;
        let b = as_number("max", args, 1)?;
        Ok(Value::Number(a.max(b)))
    }));
    insert(map, BuiltinFn::new("pow", |args, _| {
        let base = as_number("pow", args, 0)?;
        let exponent = as_number("pow", args, 1)?;
        Ok(Value::Number(base.powf(exponent)))
    }));
}

fn unary(
    name: &'static str,
    f: fn(f64) -> f64,
) -> impl Fn(&[Value], &mut dyn crate::evaluator::Apply) -> Result<Value, EvalError> {
    move |args, _apply| Ok(Value::Number(f(as_number(name, args, 0)?)))
}
