//! System scalar types: bounded types bound to one named configuration
//! variable each, with a persistence codec on top of the regular type
//! contract. The registry replaces the ambient global variable table with
//! an explicit store threaded through as a dependency.

use crate::error::{Error, Result};
use crate::types::{compare_nulls, SqlType, TypeRef, Value, WireType, WireValue};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A `SqlType` restricted to one primitive kind with inclusive bounds,
/// plus the codec used to round-trip values through the persisted
/// key/string configuration store.
pub trait SystemScalarType: SqlType {
    /// The configuration variable this type is bound to.
    fn variable_name(&self) -> &str;

    /// Canonical string form of a normalized value, for storage.
    fn encode_value(&self, v: &Value) -> Result<String>;

    /// Inverse of [`encode_value`](Self::encode_value); the result is
    /// re-validated against the same bounds.
    fn decode_value(&self, s: &str) -> Result<Value>;
}

/// Signed integer system variable with inclusive bounds.
#[derive(Debug, Clone)]
pub struct SystemIntType {
    name: String,
    lower: i64,
    upper: i64,
}

impl SystemIntType {
    pub fn new(name: impl Into<String>, lower: i64, upper: i64) -> Self {
        SystemIntType {
            name: name.into(),
            lower,
            upper,
        }
    }

    fn to_i64(&self, v: &Value) -> Result<i64> {
        let fail = || Error::ConvertFailed {
            value: format!("{:?}", v),
            typ: self.to_string(),
        };
        let i = match v {
            Value::Str(s) => s.trim().parse::<i64>().map_err(|_| fail())?,
            Value::F32(f) => float_to_exact_int(*f as f64).ok_or_else(fail)?,
            Value::F64(f) => float_to_exact_int(*f).ok_or_else(fail)?,
            other if other.is_integer() => i64::try_from(other.to_i128()?).map_err(|_| fail())?,
            _ => return Err(fail()),
        };
        if i < self.lower || i > self.upper {
            return Err(Error::OutOfRange {
                value: i.to_string(),
                typ: self.to_string(),
            });
        }
        Ok(i)
    }
}

impl SqlType for SystemIntType {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering> {
        if let Some(ord) = compare_nulls(a, b) {
            return Ok(ord);
        }
        Ok(self.to_i64(a)?.cmp(&self.to_i64(b)?))
    }

    fn convert(&self, v: Value) -> Result<Value> {
        if v.is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::I64(self.to_i64(&v)?))
    }

    fn promote(&self) -> TypeRef {
        Arc::new(self.clone())
    }

    fn sql(&self, v: &Value) -> Result<WireValue> {
        if v.is_null() {
            return Ok(WireValue::null());
        }
        let i = self.to_i64(v)?;
        Ok(WireValue::new(WireType::Int64, i.to_string().into_bytes()))
    }

    fn wire_type(&self) -> WireType {
        WireType::Int64
    }

    fn zero(&self) -> Value {
        Value::I64(0)
    }
}

impl SystemScalarType for SystemIntType {
    fn variable_name(&self) -> &str {
        &self.name
    }

    fn encode_value(&self, v: &Value) -> Result<String> {
        Ok(self.to_i64(v)?.to_string())
    }

    fn decode_value(&self, s: &str) -> Result<Value> {
        self.convert(Value::Str(s.to_string()))
    }
}

impl fmt::Display for SystemIntType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system_int({})", self.name)
    }
}

/// Unsigned integer system variable with inclusive bounds.
#[derive(Debug, Clone)]
pub struct SystemUintType {
    name: String,
    lower: u64,
    upper: u64,
}

impl SystemUintType {
    pub fn new(name: impl Into<String>, lower: u64, upper: u64) -> Self {
        SystemUintType {
            name: name.into(),
            lower,
            upper,
        }
    }

    fn to_u64(&self, v: &Value) -> Result<u64> {
        let fail = || Error::ConvertFailed {
            value: format!("{:?}", v),
            typ: self.to_string(),
        };
        let i = match v {
            Value::Str(s) => s.trim().parse::<u64>().map_err(|_| fail())?,
            Value::F32(f) => u64::try_from(float_to_exact_int(*f as f64).ok_or_else(fail)?)
                .map_err(|_| fail())?,
            Value::F64(f) => {
                u64::try_from(float_to_exact_int(*f).ok_or_else(fail)?).map_err(|_| fail())?
            }
            other if other.is_integer() => u64::try_from(other.to_i128()?).map_err(|_| fail())?,
            _ => return Err(fail()),
        };
        if i < self.lower || i > self.upper {
            return Err(Error::OutOfRange {
                value: i.to_string(),
                typ: self.to_string(),
            });
        }
        Ok(i)
    }
}

impl SqlType for SystemUintType {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering> {
        if let Some(ord) = compare_nulls(a, b) {
            return Ok(ord);
        }
        Ok(self.to_u64(a)?.cmp(&self.to_u64(b)?))
    }

    fn convert(&self, v: Value) -> Result<Value> {
        if v.is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::U64(self.to_u64(&v)?))
    }

    fn promote(&self) -> TypeRef {
        Arc::new(self.clone())
    }

    fn sql(&self, v: &Value) -> Result<WireValue> {
        if v.is_null() {
            return Ok(WireValue::null());
        }
        let i = self.to_u64(v)?;
        Ok(WireValue::new(WireType::Uint64, i.to_string().into_bytes()))
    }

    fn wire_type(&self) -> WireType {
        WireType::Uint64
    }

    fn zero(&self) -> Value {
        Value::U64(0)
    }
}

impl SystemScalarType for SystemUintType {
    fn variable_name(&self) -> &str {
        &self.name
    }

    fn encode_value(&self, v: &Value) -> Result<String> {
        Ok(self.to_u64(v)?.to_string())
    }

    fn decode_value(&self, s: &str) -> Result<Value> {
        self.convert(Value::Str(s.to_string()))
    }
}

impl fmt::Display for SystemUintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system_uint({})", self.name)
    }
}

/// Double system variable. Accepts any numeric-coercible input and
/// range-checks the float result.
#[derive(Debug, Clone)]
pub struct SystemDoubleType {
    name: String,
    lower: f64,
    upper: f64,
}

impl SystemDoubleType {
    pub fn new(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        SystemDoubleType {
            name: name.into(),
            lower,
            upper,
        }
    }

    fn to_f64(&self, v: &Value) -> Result<f64> {
        let fail = || Error::ConvertFailed {
            value: format!("{:?}", v),
            typ: self.to_string(),
        };
        let f = match v {
            Value::Str(s) => s.trim().parse::<f64>().map_err(|_| fail())?,
            other if other.is_numeric() => other.to_f64()?,
            _ => return Err(fail()),
        };
        if !f.is_finite() || f < self.lower || f > self.upper {
            return Err(Error::OutOfRange {
                value: f.to_string(),
                typ: self.to_string(),
            });
        }
        Ok(f)
    }
}

impl SqlType for SystemDoubleType {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering> {
        if let Some(ord) = compare_nulls(a, b) {
            return Ok(ord);
        }
        let af = self.to_f64(a)?;
        let bf = self.to_f64(b)?;
        Ok(af.partial_cmp(&bf).unwrap_or(Ordering::Equal))
    }

    fn convert(&self, v: Value) -> Result<Value> {
        if v.is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::F64(self.to_f64(&v)?))
    }

    fn promote(&self) -> TypeRef {
        Arc::new(self.clone())
    }

    fn sql(&self, v: &Value) -> Result<WireValue> {
        if v.is_null() {
            return Ok(WireValue::null());
        }
        let f = self.to_f64(v)?;
        Ok(WireValue::new(WireType::Float64, f.to_string().into_bytes()))
    }

    fn wire_type(&self) -> WireType {
        WireType::Float64
    }

    fn zero(&self) -> Value {
        Value::F64(0.0)
    }
}

impl SystemScalarType for SystemDoubleType {
    fn variable_name(&self) -> &str {
        &self.name
    }

    fn encode_value(&self, v: &Value) -> Result<String> {
        Ok(self.to_f64(v)?.to_string())
    }

    fn decode_value(&self, s: &str) -> Result<Value> {
        self.convert(Value::Str(s.to_string()))
    }
}

impl fmt::Display for SystemDoubleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system_double({})", self.name)
    }
}

/// String system variable. Accepts only strings; nil maps to the empty
/// string rather than NULL.
#[derive(Debug, Clone)]
pub struct SystemStrType {
    name: String,
}

impl SystemStrType {
    pub fn new(name: impl Into<String>) -> Self {
        SystemStrType { name: name.into() }
    }
}

impl SqlType for SystemStrType {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering> {
        if let Some(ord) = compare_nulls(a, b) {
            return Ok(ord);
        }
        match (self.convert(a.clone())?, self.convert(b.clone())?) {
            (Value::Str(x), Value::Str(y)) => Ok(x.cmp(&y)),
            _ => unreachable!("convert yields strings"),
        }
    }

    fn convert(&self, v: Value) -> Result<Value> {
        match v {
            Value::Null => Ok(Value::Str(String::new())),
            Value::Str(s) => Ok(Value::Str(s)),
            other => Err(Error::ConvertFailed {
                value: format!("{:?}", other),
                typ: self.to_string(),
            }),
        }
    }

    fn promote(&self) -> TypeRef {
        Arc::new(self.clone())
    }

    fn sql(&self, v: &Value) -> Result<WireValue> {
        match self.convert(v.clone())? {
            Value::Str(s) => Ok(WireValue::new(WireType::VarChar, s.into_bytes())),
            _ => unreachable!("convert yields strings"),
        }
    }

    fn wire_type(&self) -> WireType {
        WireType::VarChar
    }

    fn zero(&self) -> Value {
        Value::Str(String::new())
    }
}

impl SystemScalarType for SystemStrType {
    fn variable_name(&self) -> &str {
        &self.name
    }

    fn encode_value(&self, v: &Value) -> Result<String> {
        match self.convert(v.clone())? {
            Value::Str(s) => Ok(s),
            _ => unreachable!("convert yields strings"),
        }
    }

    fn decode_value(&self, s: &str) -> Result<Value> {
        Ok(Value::Str(s.to_string()))
    }
}

impl fmt::Display for SystemStrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system_string({})", self.name)
    }
}

/// Boolean system variable: on/off, true/false, 0/1.
#[derive(Debug, Clone)]
pub struct SystemBoolType {
    name: String,
}

impl SystemBoolType {
    pub fn new(name: impl Into<String>) -> Self {
        SystemBoolType { name: name.into() }
    }

    fn to_bool(&self, v: &Value) -> Result<bool> {
        let fail = || Error::ConvertFailed {
            value: format!("{:?}", v),
            typ: self.to_string(),
        };
        match v {
            Value::Bool(b) => Ok(*b),
            Value::Str(s) => match s.to_ascii_lowercase().as_str() {
                "on" | "true" | "1" => Ok(true),
                "off" | "false" | "0" => Ok(false),
                _ => Err(fail()),
            },
            other if other.is_integer() => match other.to_i128()? {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(fail()),
            },
            _ => Err(fail()),
        }
    }
}

impl SqlType for SystemBoolType {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering> {
        if let Some(ord) = compare_nulls(a, b) {
            return Ok(ord);
        }
        Ok(self.to_bool(a)?.cmp(&self.to_bool(b)?))
    }

    fn convert(&self, v: Value) -> Result<Value> {
        if v.is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::Bool(self.to_bool(&v)?))
    }

    fn promote(&self) -> TypeRef {
        Arc::new(self.clone())
    }

    fn sql(&self, v: &Value) -> Result<WireValue> {
        if v.is_null() {
            return Ok(WireValue::null());
        }
        let b = self.to_bool(v)?;
        Ok(WireValue::new(
            WireType::Int8,
            if b { b"1".to_vec() } else { b"0".to_vec() },
        ))
    }

    fn wire_type(&self) -> WireType {
        WireType::Int8
    }

    fn zero(&self) -> Value {
        Value::Bool(false)
    }
}

impl SystemScalarType for SystemBoolType {
    fn variable_name(&self) -> &str {
        &self.name
    }

    fn encode_value(&self, v: &Value) -> Result<String> {
        Ok(if self.to_bool(v)? { "1" } else { "0" }.to_string())
    }

    fn decode_value(&self, s: &str) -> Result<Value> {
        self.convert(Value::Str(s.to_string()))
    }
}

impl fmt::Display for SystemBoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system_bool({})", self.name)
    }
}

/// A registered system variable: its scalar type plus its default.
#[derive(Clone)]
pub struct SystemVariable {
    pub ty: Arc<dyn SystemScalarType>,
    pub default: Value,
}

/// Explicit name-to-type store for system variables. Constructed once and
/// passed where needed; there is no global registry.
#[derive(Default)]
pub struct SystemVariableRegistry {
    vars: HashMap<String, SystemVariable>,
}

impl SystemVariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, ty: Arc<dyn SystemScalarType>, default: Value) {
        tracing::debug!(name = ty.variable_name(), "registering system variable");
        self.vars.insert(
            ty.variable_name().to_string(),
            SystemVariable { ty, default },
        );
    }

    pub fn get(&self, name: &str) -> Option<&SystemVariable> {
        self.vars.get(name)
    }

    /// Encode a value for the persisted configuration store.
    pub fn encode(&self, name: &str, v: &Value) -> Result<String> {
        let var = self
            .vars
            .get(name)
            .ok_or_else(|| Error::UnknownSystemVariable(name.to_string()))?;
        var.ty.encode_value(v)
    }

    /// Decode a stored string back into a validated value.
    pub fn decode(&self, name: &str, s: &str) -> Result<Value> {
        let var = self
            .vars
            .get(name)
            .ok_or_else(|| Error::UnknownSystemVariable(name.to_string()))?;
        var.ty.decode_value(s).map_err(|e| {
            tracing::debug!(name, value = s, error = %e, "system variable decode failed");
            Error::InvalidSystemValue {
                name: name.to_string(),
                value: s.to_string(),
            }
        })
    }
}

/// A float stands for an integer only when it is finite and has no
/// fractional part.
fn float_to_exact_int(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
