//! Named rules the engine understands without extensions.

use crate::foundation::Value;

/// Modifier tokens that carry no check of their own.
const MODIFIERS: [&str; 3] = ["sometimes", "nullable", "bail"];

pub(crate) fn is_modifier(name: &str) -> bool {
    MODIFIERS.contains(&name)
}

/// `required`: present, not null, not a blank string, not an empty collection.
pub(crate) fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

/// Runs a built-in check, or returns `None` when `name` is not built in.
pub(crate) fn check(name: &str, value: &Value) -> Option<bool> {
    let passed = match name {
        "string" => value.is_string(),
        "integer" => match value {
            Value::Number(n) => n.is_i64() || n.is_u64(),
            Value::String(s) => s.trim().parse::<i64>().is_ok(),
            _ => false,
        },
        "numeric" => match value {
            Value::Number(_) => true,
            Value::String(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
            _ => false,
        },
        "boolean" => match value {
            Value::Bool(_) => true,
            Value::Number(n) => n.as_u64().is_some_and(|n| n <= 1),
            Value::String(s) => matches!(s.as_str(), "0" | "1"),
            _ => false,
        },
        "array" => value.is_array() || value.is_object(),
        _ => return None,
    };
    Some(passed)
}
