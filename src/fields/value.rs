//! Runtime value union for extracted telemetry fields

use crate::{RecorderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// A single extracted field value, ready for row serialization.
///
/// Integer widths are folded into `UInt`/`Int` (their text rendering is
/// identical); 32-bit floats are kept as `F32` so a value round-trips
/// through its canonical shortest representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    UInt(u64),
    Int(i64),
    F32(f32),
    /// Already-decoded text.
    Text(String),
    /// Raw byte sequence, decoded to UTF-8 at serialization time.
    Bytes(Vec<u8>),
    /// Fixed-length unsigned array, rendered as one space-joined cell.
    UIntArray(Vec<u64>),
    /// Fixed-length float array, rendered as one space-joined cell.
    F32Array(Vec<f32>),
}

impl FieldValue {
    /// Build a byte-sequence value from a raw buffer.
    pub fn bytes(raw: impl AsRef<[u8]>) -> Self {
        FieldValue::Bytes(raw.as_ref().to_vec())
    }

    /// Build an unsigned-array value from any unsigned integer slice.
    pub fn uint_array<T: Into<u64> + Copy>(values: &[T]) -> Self {
        FieldValue::UIntArray(values.iter().map(|v| (*v).into()).collect())
    }

    /// Build a float-array value.
    pub fn f32_array(values: &[f32]) -> Self {
        FieldValue::F32Array(values.to_vec())
    }

    /// Render this value as one row cell appended to `out`.
    ///
    /// Array cells join their elements with single spaces, never the row
    /// delimiter, so a consumer recovers the array by splitting the cell on
    /// whitespace. A byte sequence that is not valid UTF-8 fails the whole
    /// row with [`RecorderError::MalformedField`] rather than producing a
    /// blank or partial cell.
    pub(crate) fn render_into(&self, out: &mut String, field: &str) -> Result<()> {
        match self {
            FieldValue::UInt(v) => {
                let _ = write!(out, "{v}");
            }
            FieldValue::Int(v) => {
                let _ = write!(out, "{v}");
            }
            FieldValue::F32(v) => {
                let _ = write!(out, "{v}");
            }
            FieldValue::Text(text) => out.push_str(text),
            FieldValue::Bytes(raw) => match std::str::from_utf8(raw) {
                Ok(text) => out.push_str(text),
                Err(err) => {
                    return Err(RecorderError::MalformedField {
                        field: field.to_string(),
                        details: err.to_string(),
                    });
                }
            },
            FieldValue::UIntArray(values) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    let _ = write!(out, "{v}");
                }
            }
            FieldValue::F32Array(values) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    let _ = write!(out, "{v}");
                }
            }
        }
        Ok(())
    }
}

impl From<u8> for FieldValue {
    fn from(v: u8) -> Self {
        FieldValue::UInt(v.into())
    }
}

impl From<u16> for FieldValue {
    fn from(v: u16) -> Self {
        FieldValue::UInt(v.into())
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::UInt(v.into())
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::UInt(v)
    }
}

impl From<i8> for FieldValue {
    fn from(v: i8) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<i16> for FieldValue {
    fn from(v: i16) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::F32(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}
