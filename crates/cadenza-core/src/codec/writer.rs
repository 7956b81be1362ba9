use crate::codec::TimingPoint;

/// Mirror-image encoder for the primitive wire types.
///
/// There is no production write-back path for the database; this exists so
/// tests can build byte-exact fixtures and verify encode/decode round-trips.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the encoded bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the writer and returns the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(if value { 0x01 } else { 0x00 });
    }

    /// Writes a DateTime field: the opaque 64-bit tick count.
    pub fn write_datetime(&mut self, ticks: u64) {
        self.write_u64(ticks);
    }

    /// Writes a ULEB128 variable-length unsigned integer: low 7 bits per
    /// byte, high bit set while more bytes follow.
    pub fn write_uleb128(&mut self, mut value: u64) {
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            self.buf.push(byte);
            if value == 0 {
                return;
            }
        }
    }

    /// Writes a length-prefixed string: `0x00` for the empty string,
    /// otherwise `0x0B` + ULEB128 byte length + UTF-8 payload.
    pub fn write_string(&mut self, value: &str) {
        if value.is_empty() {
            self.buf.push(0x00);
        } else {
            self.buf.push(0x0B);
            self.write_uleb128(value.len() as u64);
            self.buf.extend_from_slice(value.as_bytes());
        }
    }

    pub fn write_int_double_pair(&mut self, int: u32, double: f64) {
        self.buf.push(0x08);
        self.write_u32(int);
        self.buf.push(0x0B);
        self.write_f64(double);
    }

    pub fn write_timing_point(&mut self, point: &TimingPoint) {
        self.write_f64(point.beat_length);
        self.write_f64(point.offset);
        self.write_bool(point.uninherited);
    }
}
