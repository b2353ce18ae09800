use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// A decoded field, table entry or unpacked record member.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxValue {
    /// The field is not present for this version/flags combination.
    None,
    Bool(bool),
    UInt(u64),
    Int(i64),
    Fixed(f64),
    Text(String),
    Bytes(Vec<u8>),
    DateTime(DateTime<Utc>),
    Uuid([u8; 16]),
    List(Vec<BoxValue>),
    Record(Vec<(&'static str, BoxValue)>),
}

impl BoxValue {
    pub fn is_none(&self) -> bool {
        matches!(self, BoxValue::None)
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            BoxValue::UInt(v) => Some(v),
            BoxValue::Int(v) => u64::try_from(v).ok(),
            BoxValue::Bool(b) => Some(b as u64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            BoxValue::Int(v) => Some(v),
            BoxValue::UInt(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            BoxValue::Fixed(v) => Some(v),
            BoxValue::UInt(v) => Some(v as f64),
            BoxValue::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            BoxValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            BoxValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            BoxValue::DateTime(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[BoxValue]> {
        match self {
            BoxValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Member of a `Record` by name.
    pub fn get(&self, name: &str) -> Option<&BoxValue> {
        match self {
            BoxValue::Record(members) => members.iter().find(|(n, _)| *n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl Serialize for BoxValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BoxValue::None => serializer.serialize_none(),
            BoxValue::Bool(b) => serializer.serialize_bool(*b),
            BoxValue::UInt(v) => serializer.serialize_u64(*v),
            BoxValue::Int(v) => serializer.serialize_i64(*v),
            BoxValue::Fixed(v) => serializer.serialize_f64(*v),
            BoxValue::Text(s) => serializer.serialize_str(s),
            BoxValue::Bytes(b) => serializer.serialize_str(&hex::encode(b)),
            BoxValue::DateTime(t) => serializer.serialize_str(&t.to_rfc3339()),
            BoxValue::Uuid(u) => serializer.serialize_str(&hex::encode(u)),
            BoxValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            BoxValue::Record(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (name, value) in members {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

impl fmt::Display for BoxValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoxValue::None => write!(f, "-"),
            BoxValue::Bool(b) => write!(f, "{b}"),
            BoxValue::UInt(v) => write!(f, "{v}"),
            BoxValue::Int(v) => write!(f, "{v}"),
            BoxValue::Fixed(v) => write!(f, "{v}"),
            BoxValue::Text(s) => write!(f, "{s:?}"),
            BoxValue::Bytes(b) if b.len() > 32 => write!(f, "<{} bytes>", b.len()),
            BoxValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            BoxValue::DateTime(t) => write!(f, "{}", t.to_rfc3339()),
            BoxValue::Uuid(u) => write!(f, "{}", hex::encode(u)),
            BoxValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            BoxValue::Record(members) => {
                write!(f, "{{")?;
                for (i, (name, value)) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
