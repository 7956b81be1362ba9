use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A tempo marker decoded from a chart record.
///
/// Wire layout: Double (milliseconds per beat), Double (offset in
/// milliseconds), Boolean (uninherited flag) - 17 bytes total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingPoint {
    /// Milliseconds per beat.
    pub beat_length: f64,
    /// Offset from the start of the track, in milliseconds.
    pub offset: f64,
    /// True for points that set the base tempo; inherited (slave) points
    /// only scale the tempo currently in effect.
    pub uninherited: bool,
}

impl TimingPoint {
    /// Beats per minute implied by this point.
    pub fn bpm(&self) -> f64 {
        60_000.0 / self.beat_length
    }
}

/// The primitive kinds the format is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Primitive {
    Byte,
    Short,
    Int,
    Long,
    Single,
    Double,
    Boolean,
    DateTime,
    String,
    Uleb128,
    IntDoublePair,
    TimingPoint,
}

/// A decoded value tagged with its primitive kind.
///
/// Produced by [`ByteReader::read_value`] and [`ByteReader::read_batch`].
/// Extracting the wrong kind is a codec-misuse error, never a silent default.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(u8),
    Short(u16),
    Int(u32),
    Long(u64),
    Single(f32),
    Double(f64),
    Boolean(bool),
    DateTime(u64),
    String(String),
    Uleb128(u64),
    IntDoublePair(u32, f64),
    TimingPoint(TimingPoint),
}

impl Value {
    /// The kind this value was decoded as.
    pub fn kind(&self) -> Primitive {
        match self {
            Value::Byte(_) => Primitive::Byte,
            Value::Short(_) => Primitive::Short,
            Value::Int(_) => Primitive::Int,
            Value::Long(_) => Primitive::Long,
            Value::Single(_) => Primitive::Single,
            Value::Double(_) => Primitive::Double,
            Value::Boolean(_) => Primitive::Boolean,
            Value::DateTime(_) => Primitive::DateTime,
            Value::String(_) => Primitive::String,
            Value::Uleb128(_) => Primitive::Uleb128,
            Value::IntDoublePair(..) => Primitive::IntDoublePair,
            Value::TimingPoint(_) => Primitive::TimingPoint,
        }
    }

    fn mismatch<T>(self, expected: Primitive) -> Result<T> {
        Err(Error::UnsupportedPrimitive {
            expected,
            actual: self.kind(),
        })
    }

    pub fn into_u8(self) -> Result<u8> {
        match self {
            Value::Byte(v) => Ok(v),
            other => other.mismatch(Primitive::Byte),
        }
    }

    pub fn into_u16(self) -> Result<u16> {
        match self {
            Value::Short(v) => Ok(v),
            other => other.mismatch(Primitive::Short),
        }
    }

    pub fn into_u32(self) -> Result<u32> {
        match self {
            Value::Int(v) => Ok(v),
            other => other.mismatch(Primitive::Int),
        }
    }

    pub fn into_u64(self) -> Result<u64> {
        match self {
            Value::Long(v) => Ok(v),
            other => other.mismatch(Primitive::Long),
        }
    }

    pub fn into_f32(self) -> Result<f32> {
        match self {
            Value::Single(v) => Ok(v),
            other => other.mismatch(Primitive::Single),
        }
    }

    pub fn into_f64(self) -> Result<f64> {
        match self {
            Value::Double(v) => Ok(v),
            other => other.mismatch(Primitive::Double),
        }
    }

    pub fn into_bool(self) -> Result<bool> {
        match self {
            Value::Boolean(v) => Ok(v),
            other => other.mismatch(Primitive::Boolean),
        }
    }

    pub fn into_string(self) -> Result<String> {
        match self {
            Value::String(v) => Ok(v),
            other => other.mismatch(Primitive::String),
        }
    }

    pub fn into_timing_point(self) -> Result<TimingPoint> {
        match self {
            Value::TimingPoint(v) => Ok(v),
            other => other.mismatch(Primitive::TimingPoint),
        }
    }
}

/// A position-tracking byte reader for walking the database file.
///
/// Wraps a byte slice and maintains a current position. Every read either
/// succeeds and advances the position by the consumed byte count, or fails
/// without producing a value. There is no backward seeking; the database
/// format is decoded in a single front-to-back pass.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new `ByteReader` over the given byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current read position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the total length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of bytes remaining from the current position.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Consumes `count` bytes and advances the position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TruncatedInput`] if fewer than `count` bytes remain.
    pub fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(Error::TruncatedInput {
                position: self.pos,
                needed: count,
                remaining,
            });
        }
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    /// Reads an unsigned 8-bit integer.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Reads an unsigned 16-bit integer (little-endian).
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Reads an unsigned 32-bit integer (little-endian).
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads an unsigned 64-bit integer (little-endian).
    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        Ok(u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    /// Reads an IEEE-754 32-bit float (little-endian).
    pub fn read_f32(&mut self) -> Result<f32> {
        let bytes = self.take(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads an IEEE-754 64-bit float (little-endian).
    pub fn read_f64(&mut self) -> Result<f64> {
        let bytes = self.take(8)?;
        Ok(f64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    /// Reads a boolean: `0x00` is false, any other byte is true.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0x00)
    }

    /// Reads a DateTime field: an opaque 64-bit tick count, not decoded to a
    /// calendar value.
    pub fn read_datetime(&mut self) -> Result<u64> {
        self.read_u64()
    }

    /// Reads a ULEB128 variable-length unsigned integer.
    ///
    /// Accumulates 7 data bits per byte while the continuation (high) bit is
    /// set. Overlong encodings are accepted; data bits past the 64-bit range
    /// are dropped.
    pub fn read_uleb128(&mut self) -> Result<u64> {
        let mut result: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let byte = self.read_u8()?;
            if shift < u64::BITS {
                result |= u64::from(byte & 0x7F) << shift;
            }
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    /// Reads a length-prefixed string.
    ///
    /// Indicator byte `0x00` means the empty string with no further payload.
    /// Indicator `0x0B` is followed by a ULEB128 byte length and that many
    /// bytes of UTF-8. Any other indicator is a malformed-string error.
    pub fn read_string(&mut self) -> Result<String> {
        let indicator_pos = self.pos;
        match self.read_u8()? {
            0x00 => Ok(String::new()),
            0x0B => {
                let len = self.read_uleb128()? as usize;
                let payload_pos = self.pos;
                let bytes = self.take(len)?;
                let text = std::str::from_utf8(bytes).map_err(|source| Error::InvalidUtf8 {
                    position: payload_pos,
                    source,
                })?;
                Ok(text.to_owned())
            }
            indicator => Err(Error::MalformedString {
                position: indicator_pos,
                indicator,
            }),
        }
    }

    /// Reads an Int-Double pair: tag byte (ignored), Int, tag byte (ignored),
    /// Double. The tags are `0x08` and `0x0B` in well-formed files but carry
    /// no information.
    pub fn read_int_double_pair(&mut self) -> Result<(u32, f64)> {
        let _ = self.read_u8()?;
        let int = self.read_u32()?;
        let _ = self.read_u8()?;
        let double = self.read_f64()?;
        Ok((int, double))
    }

    /// Reads a timing point: beat length, offset, uninherited flag.
    pub fn read_timing_point(&mut self) -> Result<TimingPoint> {
        Ok(TimingPoint {
            beat_length: self.read_f64()?,
            offset: self.read_f64()?,
            uninherited: self.read_bool()?,
        })
    }

    /// Reads one value of the requested primitive kind.
    pub fn read_value(&mut self, kind: Primitive) -> Result<Value> {
        match kind {
            Primitive::Byte => self.read_u8().map(Value::Byte),
            Primitive::Short => self.read_u16().map(Value::Short),
            Primitive::Int => self.read_u32().map(Value::Int),
            Primitive::Long => self.read_u64().map(Value::Long),
            Primitive::Single => self.read_f32().map(Value::Single),
            Primitive::Double => self.read_f64().map(Value::Double),
            Primitive::Boolean => self.read_bool().map(Value::Boolean),
            Primitive::DateTime => self.read_datetime().map(Value::DateTime),
            Primitive::String => self.read_string().map(Value::String),
            Primitive::Uleb128 => self.read_uleb128().map(Value::Uleb128),
            Primitive::IntDoublePair => self
                .read_int_double_pair()
                .map(|(i, d)| Value::IntDoublePair(i, d)),
            Primitive::TimingPoint => self.read_timing_point().map(Value::TimingPoint),
        }
    }

    /// Reads `count` values of one primitive kind, in order.
    ///
    /// Fails on the first element that cannot be read; the position is left
    /// at whatever partial offset was reached, so callers must treat a batch
    /// failure as fatal for the whole decode.
    pub fn read_batch(&mut self, count: usize, kind: Primitive) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.read_value(kind)?);
        }
        Ok(values)
    }
}
