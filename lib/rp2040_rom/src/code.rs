use core::fmt;

/// A bootrom function table code.
pub type RomFnTableCode = [u8; 2];

/// Two character code identifying a boot ROM function or data item.
///
/// The ROM stores the code as a little endian halfword, so `b"RE"` is
/// `0x4552`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RomCode(u16);

impl RomCode {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn from_tag(tag: RomFnTableCode) -> Self {
        Self(u16::from_le_bytes(tag))
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    pub const fn tag(self) -> RomFnTableCode {
        self.0.to_le_bytes()
    }
}

impl From<RomFnTableCode> for RomCode {
    fn from(tag: RomFnTableCode) -> Self {
        Self::from_tag(tag)
    }
}

impl From<u16> for RomCode {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<RomCode> for u32 {
    fn from(code: RomCode) -> Self {
        code.0 as u32
    }
}

impl fmt::Display for RomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.tag() {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_little_endian() {
        let code = RomCode::from_tag(*b"RE");
        assert_eq!(code.raw(), 0x4552);
        assert_eq!(code.tag(), *b"RE");
        assert_eq!(u32::from(code), 0x4552);
    }

    #[test]
    fn display() {
        assert_eq!(RomCode::from_tag(*b"UB").to_string(), "UB");
        assert_eq!(RomCode::new(0).to_string(), "\\x00\\x00");
        assert_eq!(RomCode::new(0x0a41).to_string(), "A\\x0a");
    }
}
