//! TIME type: a signed interval with microsecond resolution
//!
//! The representable range is ±838:59:59.000000. Inputs inside the accepted
//! shapes clamp to that range; malformed shapes and out-of-bounds
//! minute/second fields are rejected outright.

use crate::error::{Error, Result};
use crate::types::{compare_nulls, SqlType, TypeRef, Value, WireType, WireValue};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Largest representable magnitude, in microseconds (838:59:59).
pub const TIMESPAN_MAX_MICROSECONDS: i64 = 3_020_399_000_000;

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;

static TIMESPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-)?(\d{1,3}):(\d{1,2})(?::(\d{1,2})(?:\.(\d{1,6}))?)?$").unwrap()
});

/// A normalized TIME value: a clamped signed microsecond count.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timespan {
    microseconds: i64,
}

impl Timespan {
    /// Build from a raw microsecond count, clamping to the representable
    /// range.
    pub fn from_microseconds(micros: i64) -> Self {
        Timespan {
            microseconds: micros.clamp(-TIMESPAN_MAX_MICROSECONDS, TIMESPAN_MAX_MICROSECONDS),
        }
    }

    /// Build from a raw elapsed duration, clamping to the representable
    /// range.
    pub fn from_duration(d: chrono::Duration) -> Self {
        match d.num_microseconds() {
            Some(micros) => Self::from_microseconds(micros),
            // Overflowed i64 microseconds, so it is far past either bound
            None if d > chrono::Duration::zero() => {
                Self::from_microseconds(TIMESPAN_MAX_MICROSECONDS)
            }
            None => Self::from_microseconds(-TIMESPAN_MAX_MICROSECONDS),
        }
    }

    pub fn as_microseconds(&self) -> i64 {
        self.microseconds
    }

    pub fn to_duration(&self) -> chrono::Duration {
        chrono::Duration::microseconds(self.microseconds)
    }
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.microseconds < 0 { "-" } else { "" };
        let abs = self.microseconds.unsigned_abs();
        let hours = abs / MICROS_PER_HOUR as u64;
        let minutes = (abs / MICROS_PER_MINUTE as u64) % 60;
        let seconds = (abs / MICROS_PER_SECOND as u64) % 60;
        let micros = abs % MICROS_PER_SECOND as u64;
        if micros == 0 {
            write!(f, "{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds)
        } else {
            write!(
                f,
                "{}{:02}:{:02}:{:02}.{:06}",
                sign, hours, minutes, seconds, micros
            )
        }
    }
}

impl fmt::Debug for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timespan({})", self)
    }
}

/// The TIME type descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimespanType;

impl TimespanType {
    fn to_timespan(&self, v: &Value) -> Result<Timespan> {
        let fail = || Error::ConvertFailed {
            value: format!("{:?}", v),
            typ: self.to_string(),
        };
        match v {
            Value::Timespan(t) => Ok(*t),
            Value::Str(s) => parse_timespan(s).ok_or_else(fail),
            Value::F32(f) => float_to_micros(*f as f64).map(Timespan::from_microseconds).ok_or_else(fail),
            Value::F64(f) => float_to_micros(*f).map(Timespan::from_microseconds).ok_or_else(fail),
            other if other.is_integer() => {
                let i = other.to_i128()?;
                let i = i64::try_from(i).map_err(|_| fail())?;
                int_to_micros(i).map(Timespan::from_microseconds).ok_or_else(fail)
            }
            _ => Err(fail()),
        }
    }
}

impl SqlType for TimespanType {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering> {
        if let Some(ord) = compare_nulls(a, b) {
            return Ok(ord);
        }
        let at = self.to_timespan(a)?;
        let bt = self.to_timespan(b)?;
        Ok(at.as_microseconds().cmp(&bt.as_microseconds()))
    }

    fn convert(&self, v: Value) -> Result<Value> {
        if v.is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::Timespan(self.to_timespan(&v)?))
    }

    fn promote(&self) -> TypeRef {
        Arc::new(*self)
    }

    fn sql(&self, v: &Value) -> Result<WireValue> {
        if v.is_null() {
            return Ok(WireValue::null());
        }
        let t = self.to_timespan(v)?;
        Ok(WireValue::new(WireType::Time, t.to_string().into_bytes()))
    }

    fn wire_type(&self) -> WireType {
        WireType::Time
    }

    fn zero(&self) -> Value {
        Value::Timespan(Timespan::from_microseconds(0))
    }
}

impl fmt::Display for TimespanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TIME")
    }
}

/// Parse the formatted grammar `-?H{1,3}:M{1,2}(:S{1,2}(.f{1,6})?)?`.
/// Minutes and seconds above 59 are rejected, not clamped; hours beyond the
/// range clamp to the bound.
fn parse_timespan(s: &str) -> Option<Timespan> {
    let caps = TIMESPAN_RE.captures(s)?;
    let negative = caps.get(1).is_some();
    let hours: i64 = caps[2].parse().ok()?;
    let minutes: i64 = caps[3].parse().ok()?;
    if minutes > 59 {
        return None;
    }
    let seconds: i64 = match caps.get(4) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    if seconds > 59 {
        return None;
    }
    let micros: i64 = match caps.get(5) {
        // Right-pad short fractions: ".5" means half a second
        Some(m) => format!("{:0<6}", m.as_str()).parse().ok()?,
        None => 0,
    };
    let total = hours * MICROS_PER_HOUR
        + minutes * MICROS_PER_MINUTE
        + seconds * MICROS_PER_SECOND
        + micros;
    Some(Timespan::from_microseconds(if negative { -total } else { total }))
}

/// Interpret an integer by its magnitude shape: seconds, packed MMSS, or
/// packed HHMMSS. Other magnitudes are not times.
fn int_to_micros(v: i64) -> Option<i64> {
    let abs = v.unsigned_abs() as i64;
    let magnitude = match abs {
        0..=59 => abs * MICROS_PER_SECOND,
        1000..=9999 => {
            let minutes = abs / 100;
            let seconds = abs % 100;
            if minutes > 59 || seconds > 59 {
                return None;
            }
            minutes * MICROS_PER_MINUTE + seconds * MICROS_PER_SECOND
        }
        100_000..=9_999_999 => {
            let hours = abs / 10_000;
            let minutes = (abs / 100) % 100;
            let seconds = abs % 100;
            if minutes > 59 || seconds > 59 {
                return None;
            }
            hours * MICROS_PER_HOUR + minutes * MICROS_PER_MINUTE + seconds * MICROS_PER_SECOND
        }
        _ => return None,
    };
    Some(if v < 0 { -magnitude } else { magnitude })
}

/// Same shape rule as integers applied to the truncated integer part, plus
/// a fractional-microsecond component.
fn float_to_micros(v: f64) -> Option<i64> {
    if !v.is_finite() || v.abs() >= i64::MAX as f64 {
        return None;
    }
    let mut int_part = v.trunc().abs() as i64;
    let mut frac_micros = ((v - v.trunc()).abs() * MICROS_PER_SECOND as f64).round() as i64;
    // A fraction that rounds up to a whole second carries into the
    // integer part before the shape rule applies
    if frac_micros == MICROS_PER_SECOND {
        int_part += 1;
        frac_micros = 0;
    }
    let magnitude = int_to_micros(int_part)? + frac_micros;
    Some(if v < 0.0 { -magnitude } else { magnitude })
}
