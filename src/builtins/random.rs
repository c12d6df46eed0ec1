use std::collections::HashMap;
use std::rc::Rc;

use rand::Rng;

use super::{as_number, insert, BuiltinFn};
use crate::value::Value;

pub fn register(map: &mut HashMap<String, Rc<BuiltinFn>>) {
    insert(map, BuiltinFn::new("random", |_args, _apply| {
        Ok(Value::Number(rand::thread_rng().gen_range(0.0..1.0)))
    }));
    insert(map, BuiltinFn::new("randomInt", |args, _apply| {
        let min = as_number("randomInt", args, 0)? as i64;
        let max = as_number("randomInt", args, 1)? as i64;
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        Ok(Value::Number(rand::thread_rng().gen_range(lo..=hi) as f64))
    }));
    insert(map, BuiltinFn::new("randomUUID", |_args, _apply| {
        Ok(Value::Str(random_uuid_v4()))
    }));
}

/// RFC-4122 version-4 UUID built from 16 random bytes with the version and
/// variant bits forced, formatted without pulling in the `uuid` crate.
fn random_uuid_v4() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        bytes[6], bytes[7],
        bytes[8], bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
    )
}
