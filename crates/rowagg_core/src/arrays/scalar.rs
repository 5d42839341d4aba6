use std::cmp::Ordering;
use std::fmt;

use num_traits::CheckedAdd;
use rowagg_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use super::datatype::DataType;

/// A single owned value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    /// Castable to/from any other type.
    Null,
    Boolean(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Utf8(String),
    Binary(Vec<u8>),
}

impl ScalarValue {
    pub fn datatype(&self) -> DataType {
        match self {
            Self::Null => DataType::Null,
            Self::Boolean(_) => DataType::Boolean,
            Self::Int8(_) => DataType::Int8,
            Self::Int16(_) => DataType::Int16,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::UInt8(_) => DataType::UInt8,
            Self::UInt16(_) => DataType::UInt16,
            Self::UInt32(_) => DataType::UInt32,
            Self::UInt64(_) => DataType::UInt64,
            Self::Float32(_) => DataType::Float32,
            Self::Float64(_) => DataType::Float64,
            Self::Utf8(_) => DataType::Utf8,
            Self::Binary(_) => DataType::Binary,
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Zero value for a numeric type.
    pub fn zero(datatype: DataType) -> Result<Self> {
        Ok(match datatype {
            DataType::Int8 => Self::Int8(0),
            DataType::Int16 => Self::Int16(0),
            DataType::Int32 => Self::Int32(0),
            DataType::Int64 => Self::Int64(0),
            DataType::UInt8 => Self::UInt8(0),
            DataType::UInt16 => Self::UInt16(0),
            DataType::UInt32 => Self::UInt32(0),
            DataType::UInt64 => Self::UInt64(0),
            DataType::Float32 => Self::Float32(0.0),
            DataType::Float64 => Self::Float64(0.0),
            other => {
                return Err(DbError::new(format!("No zero value for type {other}")));
            }
        })
    }

    pub fn try_as_bool(&self) -> Result<bool> {
        match self {
            Self::Boolean(b) => Ok(*b),
            other => Err(DbError::new(format!("Not a bool: {other}"))),
        }
    }

    pub fn try_as_i64(&self) -> Result<i64> {
        match self.try_as_i128()? {
            Some(v) => i64::try_from(v)
                .map_err(|_| DbError::new(format!("Value {self} does not fit in Int64"))),
            None => Err(DbError::new(format!("Not an integer: {self}"))),
        }
    }

    pub fn try_as_f64(&self) -> Result<f64> {
        match self {
            Self::Float32(v) => Ok(*v as f64),
            Self::Float64(v) => Ok(*v),
            other => match other.try_as_i128()? {
                Some(v) => Ok(v as f64),
                None => Err(DbError::new(format!("Not a number: {other}"))),
            },
        }
    }

    /// Integer view of the value, `None` for non-integers.
    fn try_as_i128(&self) -> Result<Option<i128>> {
        Ok(match self {
            Self::Int8(v) => Some(*v as i128),
            Self::Int16(v) => Some(*v as i128),
            Self::Int32(v) => Some(*v as i128),
            Self::Int64(v) => Some(*v as i128),
            Self::UInt8(v) => Some(*v as i128),
            Self::UInt16(v) => Some(*v as i128),
            Self::UInt32(v) => Some(*v as i128),
            Self::UInt64(v) => Some(*v as i128),
            _ => None,
        })
    }

    /// Cast this value to another type.
    ///
    /// Only identity casts and widening/narrowing between numeric types are
    /// supported. Narrowing errors if the value does not fit. NULL casts to
    /// NULL of any type.
    pub fn try_cast(&self, datatype: DataType) -> Result<Self> {
        if self.is_null() || self.datatype() == datatype {
            return Ok(self.clone());
        }

        fn narrow<T: TryFrom<i128>>(v: i128, datatype: DataType) -> Result<T> {
            T::try_from(v)
                .map_err(|_| DbError::new(format!("Value {v} out of range for type {datatype}")))
        }

        if let Some(v) = self.try_as_i128()? {
            return Ok(match datatype {
                DataType::Int8 => Self::Int8(narrow(v, datatype)?),
                DataType::Int16 => Self::Int16(narrow(v, datatype)?),
                DataType::Int32 => Self::Int32(narrow(v, datatype)?),
                DataType::Int64 => Self::Int64(narrow(v, datatype)?),
                DataType::UInt8 => Self::UInt8(narrow(v, datatype)?),
                DataType::UInt16 => Self::UInt16(narrow(v, datatype)?),
                DataType::UInt32 => Self::UInt32(narrow(v, datatype)?),
                DataType::UInt64 => Self::UInt64(narrow(v, datatype)?),
                DataType::Float32 => Self::Float32(v as f32),
                DataType::Float64 => Self::Float64(v as f64),
                other => {
                    return Err(DbError::new(format!(
                        "Cannot cast {} to {other}",
                        self.datatype()
                    )));
                }
            });
        }

        match (self, datatype) {
            (Self::Float32(v), DataType::Float64) => Ok(Self::Float64(*v as f64)),
            (Self::Float64(v), DataType::Float32) => Ok(Self::Float32(*v as f32)),
            (_, other) => Err(DbError::new(format!(
                "Cannot cast {} to {other}",
                self.datatype()
            ))),
        }
    }

    /// Add two values of the same numeric type, erroring on integer overflow.
    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        fn add<T: CheckedAdd>(a: &T, b: &T) -> Result<T> {
            a.checked_add(b)
                .ok_or_else(|| DbError::new("Integer overflow during addition"))
        }

        Ok(match (self, other) {
            (Self::Int8(a), Self::Int8(b)) => Self::Int8(add(a, b)?),
            (Self::Int16(a), Self::Int16(b)) => Self::Int16(add(a, b)?),
            (Self::Int32(a), Self::Int32(b)) => Self::Int32(add(a, b)?),
            (Self::Int64(a), Self::Int64(b)) => Self::Int64(add(a, b)?),
            (Self::UInt8(a), Self::UInt8(b)) => Self::UInt8(add(a, b)?),
            (Self::UInt16(a), Self::UInt16(b)) => Self::UInt16(add(a, b)?),
            (Self::UInt32(a), Self::UInt32(b)) => Self::UInt32(add(a, b)?),
            (Self::UInt64(a), Self::UInt64(b)) => Self::UInt64(add(a, b)?),
            (Self::Float32(a), Self::Float32(b)) => Self::Float32(a + b),
            (Self::Float64(a), Self::Float64(b)) => Self::Float64(a + b),
            (a, b) => {
                return Err(DbError::new("Cannot add values")
                    .with_field("left", a.datatype())
                    .with_field("right", b.datatype()));
            }
        })
    }

    /// Compare two non-null values.
    ///
    /// Integers compare across widths, floats compare with other numerics as
    /// f64 using a total order.
    pub fn try_compare(&self, other: &Self) -> Result<Ordering> {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => Ok(a.cmp(b)),
            (Self::Utf8(a), Self::Utf8(b)) => Ok(a.cmp(b)),
            (Self::Binary(a), Self::Binary(b)) => Ok(a.cmp(b)),
            (a, b) if a.datatype().is_numeric() && b.datatype().is_numeric() => {
                match (a.try_as_i128()?, b.try_as_i128()?) {
                    (Some(a), Some(b)) => Ok(a.cmp(&b)),
                    _ => Ok(a.try_as_f64()?.total_cmp(&b.try_as_f64()?)),
                }
            }
            (a, b) => Err(DbError::new("Cannot compare values")
                .with_field("left", a.datatype())
                .with_field("right", b.datatype())),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt8(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Utf8(v) => write!(f, "{v}"),
            Self::Binary(v) => {
                write!(f, "\\x")?;
                for b in v {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! impl_from_primitive {
    ($prim:ty, $variant:ident) => {
        impl From<$prim> for ScalarValue {
            fn from(value: $prim) -> Self {
                ScalarValue::$variant(value)
            }
        }
    };
}

impl_from_primitive!(bool, Boolean);
impl_from_primitive!(i8, Int8);
impl_from_primitive!(i16, Int16);
impl_from_primitive!(i32, Int32);
impl_from_primitive!(i64, Int64);
impl_from_primitive!(u8, UInt8);
impl_from_primitive!(u16, UInt16);
impl_from_primitive!(u32, UInt32);
impl_from_primitive!(u64, UInt64);
impl_from_primitive!(f32, Float32);
impl_from_primitive!(f64, Float64);
impl_from_primitive!(String, Utf8);
impl_from_primitive!(Vec<u8>, Binary);

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.to_string())
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => ScalarValue::Null,
        }
    }
}
