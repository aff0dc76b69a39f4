use crate::metric::WireType;
use std::fmt::Write;

/// A numeric gauge sample.
///
/// Callers hand in whatever primitive they have; the `From` impls below pick
/// the variant once at the call boundary. Integers narrower than 32 bits widen
/// to the 32 bit variant of their signedness and `f32` widens to `Float64`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    /// Signed 32 bit integer, wire type `i`
    Int32(i32),
    /// Unsigned 32 bit integer, wire type `I`
    Uint32(u32),
    /// Signed 64 bit integer, wire type `l`
    Int64(i64),
    /// Unsigned 64 bit integer, wire type `L`
    Uint64(u64),
    /// Double, wire type `n`
    Float64(f64),
}

impl Value {
    /// The wire type this value is emitted as.
    pub fn wire_type(&self) -> WireType {
        match *self {
            Value::Int32(_) => WireType::Int32,
            Value::Uint32(_) => WireType::Uint32,
            Value::Int64(_) => WireType::Int64,
            Value::Uint64(_) => WireType::Uint64,
            Value::Float64(_) => WireType::Float64,
        }
    }

    /// Sum two values of the same numeric kind. Integers wrap. Returns `None`
    /// if the kinds differ.
    pub fn add(self, rhs: Value) -> Option<Value> {
        match (self, rhs) {
            (Value::Int32(x), Value::Int32(y)) => Some(Value::Int32(x.wrapping_add(y))),
            (Value::Uint32(x), Value::Uint32(y)) => Some(Value::Uint32(x.wrapping_add(y))),
            (Value::Int64(x), Value::Int64(y)) => Some(Value::Int64(x.wrapping_add(y))),
            (Value::Uint64(x), Value::Uint64(y)) => Some(Value::Uint64(x.wrapping_add(y))),
            (Value::Float64(x), Value::Float64(y)) => Some(Value::Float64(x + y)),
            (_, _) => None,
        }
    }

    /// Append the httptrap `_value` rendering.
    ///
    /// 32 bit integers go out bare. 64 bit integers are quoted so collectors
    /// parsing JSON numbers as doubles don't lose precision, and doubles are
    /// quoted in fixed point with six decimals.
    pub fn write_json(&self, s: &mut String) {
        // fmt::Write for String never fails
        let _ = match *self {
            Value::Int32(v) => write!(s, "{}", v),
            Value::Uint32(v) => write!(s, "{}", v),
            Value::Int64(v) => write!(s, "\"{}\"", v),
            Value::Uint64(v) => write!(s, "\"{}\"", v),
            Value::Float64(v) => {
                if v.is_nan() {
                    write!(s, "\"NaN\"")
                } else if v.is_infinite() {
                    write!(s, "\"{}Inf\"", if v > 0.0 { "+" } else { "-" })
                } else {
                    write!(s, "\"{:.6}\"", v)
                }
            }
        };
    }
}

macro_rules! value_from {
    ($variant:ident, $inner:ty, $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Value {
                    Value::$variant(<$inner>::from(v))
                }
            }
        )+
    };
}

value_from!(Int32, i32, i8, i16, i32);
value_from!(Uint32, u32, u8, u16, u32);
value_from!(Int64, i64, i64);
value_from!(Uint64, u64, u64);
value_from!(Float64, f64, f32, f64);

impl From<isize> for Value {
    fn from(v: isize) -> Value {
        Value::Int64(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Value {
        Value::Uint64(v as u64)
    }
}
