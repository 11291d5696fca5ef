use crate::bus::{BootRom, RomBus};
use crate::layout::{ROM_HEADER_LEN, ROM_MAGIC, ROM_MAGIC_BYTES, ROM_VERSION};

/// The identifying bytes at the start of the boot ROM.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RomHeader {
    pub magic: [u8; 3],
    pub version: u8,
}

impl RomHeader {
    pub fn read_in<B: RomBus + ?Sized>(bus: &B) -> Self {
        let magic = ROM_MAGIC as usize;
        // fixed header offsets
        unsafe {
            Self {
                magic: [bus.read_u8(magic), bus.read_u8(magic + 1), bus.read_u8(magic + 2)],
                version: bus.read_u8(ROM_VERSION as usize),
            }
        }
    }

    pub fn read() -> Self {
        Self::read_in(&BootRom)
    }

    /// Does the magic say this is an RP2040 boot ROM?
    pub fn is_rp2040(&self) -> bool {
        self.magic == ROM_MAGIC_BYTES
    }
}

pub fn rom_version_number_in<B: RomBus + ?Sized>(bus: &B) -> u8 {
    unsafe { bus.read_u8(ROM_VERSION as usize) }
}

/// The raw header bytes: magic, version and the three table pointers.
pub fn header_bytes_in<B: RomBus + ?Sized>(bus: &B) -> [u8; ROM_HEADER_LEN] {
    let mut bytes = [0u8; ROM_HEADER_LEN];
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = unsafe { bus.read_u8(ROM_MAGIC as usize + i) };
    }
    bytes
}

/// The raw header bytes of this chip's boot ROM.
pub fn header_bytes() -> [u8; ROM_HEADER_LEN] {
    header_bytes_in(&BootRom)
}

/// The version number of the boot ROM of this chip.
pub fn rom_version_number() -> u8 {
    rom_version_number_in(&BootRom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimRom;

    #[test]
    fn reads_header() {
        let rom = SimRom::builder().version(2).build();
        let header = RomHeader::read_in(&rom);
        assert!(header.is_rp2040());
        assert_eq!(header.version, 2);
        assert_eq!(rom_version_number_in(&rom), 2);
    }

    #[test]
    fn wrong_magic() {
        let rom = SimRom::builder().byte(0x11, b'x').build();
        assert!(!RomHeader::read_in(&rom).is_rp2040());
    }

    #[test]
    fn header_bytes_cover_pointers() {
        let rom = SimRom::builder().version(3).build();
        let bytes = header_bytes_in(&rom);
        assert_eq!(&bytes[..4], b"Mu\x01\x03");
        assert_eq!(&bytes[4..10], &[0x00, 0x01, 0x00, 0x02, 0x81, 0x00]);
        assert_eq!(&bytes[..], &rom.image()[0x10..0x20]);
    }
}
