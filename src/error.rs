use crate::boxes::FourCC;

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("range {start}..{stop} exceeds window limit {limit}")]
    RangeExceeded { start: u64, stop: u64, limit: u64 },
    #[error("truncated source: wanted {wanted} bytes at offset {offset}, got {got}")]
    Truncated { offset: u64, wanted: u64, got: u64 },
    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: u64 },
    #[error("box '{box_type}' has no field '{name}'")]
    UnknownField { box_type: FourCC, name: String },
    #[error("'{key}' is already registered")]
    RegistrationConflict { key: String },
    #[error("invalid box size {size} at offset {offset}")]
    InvalidSize { offset: u64, size: u64 },
    #[error("invalid format '{format}': {reason}")]
    InvalidFormat { format: String, reason: &'static str },
    #[error("index {index} out of range for {len} items")]
    IndexOutOfRange { index: i64, len: u64 },
}

pub type Result<T> = std::result::Result<T, ParseError>;
