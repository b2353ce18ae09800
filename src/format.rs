//! Struct-style record formats such as `">Iihh"`.

use crate::error::{ParseError, Result};
use crate::value::BoxValue;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Code {
    Pad,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    Bytes(usize),
}

impl Code {
    fn size(self) -> usize {
        match self {
            Code::Pad | Code::U8 | Code::I8 => 1,
            Code::U16 | Code::I16 => 2,
            Code::U32 | Code::I32 => 4,
            Code::U64 | Code::I64 => 8,
            Code::Bytes(n) => n,
        }
    }
}

/// A parsed record layout. Byte order defaults to big-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    text: String,
    codes: Vec<Code>,
    little_endian: bool,
    size: usize,
}

impl Format {
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |reason| ParseError::InvalidFormat { format: text.to_string(), reason };
        let mut chars = text.chars().filter(|c| !c.is_whitespace()).peekable();
        let little_endian = match chars.peek() {
            Some('<') => {
                chars.next();
                true
            }
            Some('>') | Some('!') => {
                chars.next();
                false
            }
            _ => false,
        };

        let mut codes = Vec::new();
        let mut repeat: Option<usize> = None;
        for c in chars {
            if let Some(d) = c.to_digit(10) {
                let n = repeat.unwrap_or(0).checked_mul(10).and_then(|n| n.checked_add(d as usize));
                repeat = Some(n.ok_or_else(|| invalid("repeat count overflows"))?);
                continue;
            }
            let count = repeat.take().unwrap_or(1);
            let code = match c {
                'x' => Code::Pad,
                'B' => Code::U8,
                'b' => Code::I8,
                'H' => Code::U16,
                'h' => Code::I16,
                'I' | 'L' => Code::U32,
                'i' | 'l' => Code::I32,
                'Q' => Code::U64,
                'q' => Code::I64,
                's' => {
                    codes.push(Code::Bytes(count));
                    continue;
                }
                _ => return Err(invalid("unsupported format code")),
            };
            codes.extend(std::iter::repeat_n(code, count));
        }
        if repeat.is_some() {
            return Err(invalid("repeat count without a code"));
        }

        let size = codes.iter().map(|c| c.size()).sum();
        Ok(Self { text: text.to_string(), codes, little_endian, size })
    }

    /// Bytes consumed by one record.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of values one record yields (padding excluded).
    pub fn arity(&self) -> usize {
        self.codes.iter().filter(|c| **c != Code::Pad).count()
    }

    pub fn unpack(&self, data: &[u8]) -> Result<Vec<BoxValue>> {
        if data.len() != self.size {
            return Err(ParseError::Truncated {
                offset: 0,
                wanted: self.size as u64,
                got: data.len() as u64,
            });
        }
        if self.little_endian {
            Ok(self.unpack_with::<LittleEndian>(data))
        } else {
            Ok(self.unpack_with::<BigEndian>(data))
        }
    }

    fn unpack_with<E: ByteOrder>(&self, data: &[u8]) -> Vec<BoxValue> {
        let mut out = Vec::with_capacity(self.codes.len());
        let mut at = 0;
        for code in &self.codes {
            let b = &data[at..at + code.size()];
            at += code.size();
            let value = match *code {
                Code::Pad => continue,
                Code::U8 => BoxValue::UInt(b[0] as u64),
                Code::I8 => BoxValue::Int(b[0] as i8 as i64),
                Code::U16 => BoxValue::UInt(E::read_u16(b) as u64),
                Code::I16 => BoxValue::Int(E::read_i16(b) as i64),
                Code::U32 => BoxValue::UInt(E::read_u32(b) as u64),
                Code::I32 => BoxValue::Int(E::read_i32(b) as i64),
                Code::U64 => BoxValue::UInt(E::read_u64(b)),
                Code::I64 => BoxValue::Int(E::read_i64(b)),
                Code::Bytes(_) => BoxValue::Bytes(b.to_vec()),
            };
            out.push(value);
        }
        out
    }
}

impl FromStr for Format {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        Format::parse(s)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
