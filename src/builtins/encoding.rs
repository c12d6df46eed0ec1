use std::collections::HashMap;
use std::rc::Rc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use super::{as_string, insert, BuiltinFn};
use crate::evaluator::EvalError;
use crate::value::Value;

pub fn register(map: &mut HashMap<String, Rc<BuiltinFn>>) {
    insert(map, BuiltinFn::new("base64Encode", |args, _| {
        let s = as_string("base64Encode", args, 0)?;
        Ok(Value::Str(BASE64.encode(s.as_bytes())))
    }));
    insert(map, BuiltinFn::new("base64Decode", |args, _| {
        let s = as_string("base64Decode", args, 0)?;
        let bytes = BASE64
            .decode(s)
            .map_err(|e| EvalError::Type(format!("base64Decode: {e}")))?;
        Ok(Value::Str(
            String::from_utf8(bytes).map_err(|e| EvalError::Type(format!("base64Decode: {e}")))?,
        ))
    }));
    insert(map, BuiltinFn::new("urlEncode", |args, _| {
        let s = as_string("urlEncode", args, 0)?;
        Ok(Value::Str(urlencoding::encode(&s).into_owned()))
    }));
    insert(map, BuiltinFn::new("urlDecode", |args, _| {
        let s = as_string("urlDecode", args, 0)?;
        let decoded = urlencoding::decode(&s)
            .map_err(|e| EvalError::Type(format!("urlDecode: {e}")))?;
        Ok(Value::Str(decoded.into_owned()))
    }));
}
