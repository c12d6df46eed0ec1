use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

use super::{arg, as_number, as_string, insert, BuiltinFn};
use crate::evaluator::EvalError;
use crate::value::Value;

pub fn register(map: &mut HashMap<String, Rc<BuiltinFn>>) {
    insert(map, BuiltinFn::new("now", |_args, _| Ok(Value::Number(now_ms()))));
    insert(map, BuiltinFn::new("date", |_args, _| {
        Ok(Value::Str(Utc::now().format("%Y-%m-%d").to_string()))
    }));
    insert(map, BuiltinFn::new("time", |_args, _| {
        Ok(Value::Str(Utc::now().format("%H:%M:%S").to_string()))
    }));
    insert(map, BuiltinFn::new("datetime", |_args, _| {
        Ok(Value::Str(Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()))
    }));
    insert(map, BuiltinFn::new("timestamp", |args, _| timestamp(args)));
    insert(map, BuiltinFn::new("formatDate", |args, _| format_date(args)));
    insert(map, BuiltinFn::new("year", |args, _| {
        Ok(Value::Number(component(args, |dt| dt.year() as f64)?))
    }));
    insert(map, BuiltinFn::new("month", |args, _| {
        Ok(Value::Number(component(args, |dt| dt.month() as f64)?))
    }));
    insert(map, BuiltinFn::new("day", |args, _| {
        Ok(Value::Number(component(args, |dt| dt.day() as f64)?))
    }));
    insert(map, BuiltinFn::new("hour", |args, _| {
        Ok(Value::Number(component(args, |dt| dt.hour() as f64)?))
    }));
    insert(map, BuiltinFn::new("minute", |args, _| {
        Ok(Value::Number(component(args, |dt| dt.minute() as f64)?))
    }));
    insert(map, BuiltinFn::new("second", |args, _| {
        Ok(Value::Number(component(args, |dt| dt.second() as f64)?))
    }));
    insert(map, BuiltinFn::new("dayOfWeek", |args, _| {
        Ok(Value::Number(component(args, |dt| {
            dt.weekday().num_days_from_sunday() as f64
        })?))
    }));
    insert(map, BuiltinFn::new("addDays", |args, _| {
        let ts = as_number("addDays", args, 0)?;
        let n = as_number("addDays", args, 1)?;
        Ok(Value::Number(ts + n * 86_400_000.0))
    }));
    insert(map, BuiltinFn::new("addHours", |args, _| {
        let ts = as_number("addHours", args, 0)?;
        let n = as_number("addHours", args, 1)?;
        Ok(Value::Number(ts + n * 3_600_000.0))
    }));
    insert(map, BuiltinFn::new("diffDays", |args, _| {
        let a = as_number("diffDays", args, 0)?;
        let b = as_number("diffDays", args, 1)?;
        Ok(Value::Number((a - b) / 86_400_000.0))
    }));
}

fn now_ms() -> f64 {
    Utc::now().timestamp_millis() as f64
}

fn dt_from_ms(ms: f64) -> Result<DateTime<Utc>, EvalError> {
    Utc.timestamp_millis_opt(ms as i64)
        .single()
        .ok_or_else(|| EvalError::Type(format!("not a valid timestamp: {ms}")))
}

/// Reads the timestamp argument, defaulting to the current time when the
/// argument is omitted (the `(ts?)` shape shared by `year`/`month`/etc.).
fn component(args: &[Value], f: impl Fn(DateTime<Utc>) -> f64) -> Result<f64, EvalError> {
    let ts = match arg(args, 0) {
        Value::Null => now_ms(),
        other => crate::evaluator::coerce_number(&other)?,
    };
    Ok(f(dt_from_ms(ts)?))
}

fn timestamp(args: &[Value]) -> Result<Value, EvalError> {
    match arg(args, 0) {
        Value::Null => Ok(Value::Number(now_ms())),
        _ => {
            let text = as_string("timestamp", args, 0)?;
            parse_timestamp(&text).map(Value::Number)
        }
    }
}

fn parse_timestamp(text: &str) -> Result<f64, EvalError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.timestamp_millis() as f64);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(naive.and_utc().timestamp_millis() as f64);
        }
        if let Ok(date) = chrono::NaiveDate::parse_from_str(text, fmt) {
            return Ok(date
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc()
                .timestamp_millis() as f64);
        }
    }
    Err(EvalError::Type(format!("timestamp: cannot parse \"{text}\"")))
}

fn format_date(args: &[Value]) -> Result<Value, EvalError> {
    let ts = as_number("formatDate", args, 0)?;
    let fmt = match arg(args, 1) {
        Value::Null => "%Y-%m-%d %H:%M:%S".to_string(),
        other => other.stringify(),
    };
    let dt = dt_from_ms(ts)?;
    Ok(Value::Str(dt.format(&fmt).to_string()))
}
