use thiserror::Error;

use crate::codec::Primitive;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "input truncated at byte {position}: needed {needed} more bytes but only {remaining} remain"
    )]
    TruncatedInput {
        position: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("malformed string at byte {position}: indicator {indicator:#04x} is neither 0x00 nor 0x0b")]
    MalformedString { position: usize, indicator: u8 },

    #[error("string payload at byte {position} is not valid UTF-8")]
    InvalidUtf8 {
        position: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("codec misuse: expected {expected} value, got {actual}")]
    UnsupportedPrimitive {
        expected: Primitive,
        actual: Primitive,
    },

    #[error("failed to decode header field `{field}`")]
    Header {
        field: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to decode field `{field}` of chart record {index}")]
    Record {
        index: u32,
        field: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
