use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub fn parse(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        if b.len() == 4 {
            Some(FourCC([b[0], b[1], b[2], b[3]]))
        } else { None }
    }
    pub fn as_bytes(&self) -> &[u8; 4] { &self.0 }
    pub fn as_str_lossy(&self) -> String {
        self.0.iter().map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }
}
impl From<[u8; 4]> for FourCC { fn from(b: [u8; 4]) -> Self { FourCC(b) } }
impl From<&[u8; 4]> for FourCC { fn from(b: &[u8; 4]) -> Self { FourCC(*b) } }
impl PartialEq<str> for FourCC { fn eq(&self, other: &str) -> bool { self.0.as_slice() == other.as_bytes() } }
impl PartialEq<&str> for FourCC { fn eq(&self, other: &&str) -> bool { self.0.as_slice() == other.as_bytes() } }
impl fmt::Debug for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }
impl fmt::Display for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }

#[derive(Debug, Clone)]
pub struct BoxHeader {
    pub size: u64,          // total size including header, or 0=to enclosing end
    pub typ: FourCC,        // 4CC or b"uuid"
    pub uuid: Option<[u8;16]>,
    pub header_size: u64,   // 8, 16, 24 or 32; version/flags not included
    pub start: u64,         // absolute offset of header start
    pub extended: bool,     // 64-bit size follows the type
}

impl BoxHeader {
    /// Absolute end when the size is known from the header alone.
    pub fn end(&self) -> Option<u64> {
        (self.size != 0).then(|| self.start.saturating_add(self.size))
    }
}

/// The 24-bit flags of a full box.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct BoxFlags(pub u32);

impl BoxFlags {
    pub fn bits(&self) -> u32 { self.0 }
    pub fn contains(&self, mask: u32) -> bool { self.0 & mask == mask }
    /// Bit `i` counting from the least significant bit.
    pub fn bit(&self, i: u8) -> bool { i < 24 && (self.0 >> i) & 1 == 1 }
}
impl fmt::Debug for BoxFlags { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "0x{:06x}", self.0) } }
impl fmt::Display for BoxFlags { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "0x{:06x}", self.0) } }
