//! Value conversions applied between remote and local field representations

use serde_json::Value;

use crate::error::ConversionError;

type ConvertFn = fn(&Value) -> Result<Value, ConversionError>;

/// A named, pure conversion between raw remote values and local values
#[derive(Clone, Copy)]
pub struct Conversion {
    name: &'static str,
    func: ConvertFn,
    idempotent: bool,
}

impl Conversion {
    pub const fn new(name: &'static str, func: ConvertFn, idempotent: bool) -> Self {
        Self {
            name,
            func,
            idempotent,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether applying the conversion to its own output is a no-op. Only
    /// idempotent read conversions may double as write conversions.
    pub fn is_idempotent(&self) -> bool {
        self.idempotent
    }

    pub fn apply(&self, value: &Value) -> Result<Value, ConversionError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        (self.func)(value)
    }
}

impl std::fmt::Debug for Conversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Conversion").field(&self.name).finish()
    }
}

pub const INTEGER: Conversion = Conversion::new("integer", integer, true);
pub const STRING: Conversion = Conversion::new("string", string, true);
pub const BOOLEAN: Conversion = Conversion::new("boolean", boolean, false);
pub const UNBOOLEAN: Conversion = Conversion::new("unboolean", unboolean, true);

fn integer(value: &Value) -> Result<Value, ConversionError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(f) = n.as_f64().map(f64::trunc).filter(|f| in_i64_range(*f)) {
                Ok(Value::from(f as i64))
            } else {
                Err(ConversionError::new("integer", value))
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| ConversionError::new("integer", value)),
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        _ => Err(ConversionError::new("integer", value)),
    }
}

// i64::MAX as f64 rounds up to 2^63, which is itself out of range.
fn in_i64_range(f: f64) -> bool {
    f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64
}

fn string(value: &Value) -> Result<Value, ConversionError> {
    match value {
        Value::String(_) => Ok(value.clone()),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        _ => Err(ConversionError::new("string", value)),
    }
}

// The remote encodes flags as 1/0; only an exact 1 or "1" counts as set.
fn boolean(value: &Value) -> Result<Value, ConversionError> {
    let set = match value {
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => s == "1",
        _ => false,
    };
    Ok(Value::Bool(set))
}

fn unboolean(value: &Value) -> Result<Value, ConversionError> {
    Ok(Value::from(i64::from(is_truthy(value))))
}

/// JSON truthiness: null, false, zero, and empty strings or containers are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
