use std::collections::HashMap;
use std::rc::Rc;

use sha1::Sha1;
use sha2::{Digest, Sha256};

use super::{as_string, insert, BuiltinFn};
use crate::value::Value;

pub fn register(map: &mut HashMap<String, Rc<BuiltinFn>>) {
    insert(map, BuiltinFn::new("md5", |args, _| {
        let s = as_string("md5", args, 0)?;
        Ok(Value::Str(format!("{:x}", md5::compute(s.as_bytes()))))
    }));
    insert(map, BuiltinFn::new("sha1", |args, _| {
        let s = as_string("sha1", args, 0)?;
        let mut hasher = Sha1::new();
        hasher.update(s.as_bytes());
        Ok(Value::Str(to_hex(&hasher.finalize())))
    }));
    insert(map, BuiltinFn::new("sha256", |args, _| {
        let s = as_string("sha256", args, 0)?;
        let mut hasher = Sha256::new();
        hasher.update(s.as_bytes());
        Ok(Value::Str(to_hex(&hasher.finalize())))
    }));
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_empty_string_matches_known_digest() {
        let mut hasher = Sha256::new();
        hasher.update(b"");
        assert_eq!(
            to_hex(&hasher.finalize()),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
