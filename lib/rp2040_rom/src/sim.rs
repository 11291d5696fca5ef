//! A simulated boot ROM for testing lookups off the chip.
//!
//! The image follows the RP2040 layout: header pointers at the fixed offsets
//! and code tables made of little endian halfword pairs `(code, address)`,
//! terminated by a zero code. The table lookup routine is simulated: calling
//! the entry installed at [`ROM_TABLE_LOOKUP_PTR`] scans a table the way the
//! ROM routine does.

use core::sync::atomic::{AtomicUsize, Ordering};

use arrayvec::ArrayVec;

use crate::bus::RomBus;
use crate::code::{RomCode, RomFnTableCode};
use crate::layout::{
    ROM_DATA_TABLE_PTR, ROM_FUNC_TABLE_PTR, ROM_MAGIC, ROM_MAGIC_BYTES, ROM_SIZE,
    ROM_TABLE_LOOKUP_PTR, ROM_VERSION,
};

/// Entries per table.
pub const SIM_TABLE_CAPACITY: usize = 32;

/// Where the function table is placed in the image.
pub const SIM_FUNC_TABLE: u16 = 0x0100;

/// Where the data table is placed in the image.
pub const SIM_DATA_TABLE: u16 = 0x0200;

/// Entry of the simulated table lookup routine (thumb bit set).
pub const SIM_TABLE_LOOKUP_ENTRY: u16 = 0x0081;

type Table = ArrayVec<(RomCode, u16), SIM_TABLE_CAPACITY>;

pub struct SimRom {
    image: [u8; ROM_SIZE],
    dispatch_calls: AtomicUsize,
}

impl SimRom {
    pub fn builder() -> SimRomBuilder {
        SimRomBuilder::new()
    }

    /// The raw image, for comparing against a shadow copy.
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// Number of times the table lookup routine ran.
    pub fn dispatch_calls(&self) -> usize {
        self.dispatch_calls.load(Ordering::Relaxed)
    }

    /// Byte at `addr`; 0 outside the image.
    pub fn byte_at(&self, addr: usize) -> u8 {
        self.image.get(addr).copied().unwrap_or(0)
    }

    pub fn hword_at(&self, addr: usize) -> u16 {
        u16::from_le_bytes([self.byte_at(addr), self.byte_at(addr.wrapping_add(1))])
    }

    /// Run the simulated lookup routine. An entry other than
    /// [`SIM_TABLE_LOOKUP_ENTRY`] finds nothing.
    pub fn table_lookup(&self, lookup: usize, table: usize, code: u32) -> usize {
        self.dispatch_calls.fetch_add(1, Ordering::Relaxed);
        if lookup != SIM_TABLE_LOOKUP_ENTRY as usize {
            return 0;
        }
        self.scan(table, code)
    }

    fn scan(&self, table: usize, code: u32) -> usize {
        let mut entry = table;
        while entry + 4 <= self.image.len() {
            let entry_code = self.hword_at(entry) as u32;
            if entry_code == 0 {
                break;
            }
            if entry_code == code {
                return self.hword_at(entry + 2) as usize;
            }
            entry += 4;
        }
        0
    }
}

// Every address reads as something, and the lookup routine is a plain scan.
unsafe impl RomBus for SimRom {
    unsafe fn read_u8(&self, addr: usize) -> u8 {
        self.byte_at(addr)
    }

    unsafe fn call_table_lookup(&self, lookup: usize, table: usize, code: u32) -> usize {
        self.table_lookup(lookup, table, code)
    }
}

pub struct SimRomBuilder {
    version: u8,
    functions: Table,
    data: Table,
    patches: ArrayVec<(u16, u8), 64>,
}

impl Default for SimRomBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimRomBuilder {
    pub fn new() -> Self {
        Self {
            version: 3,
            functions: ArrayVec::new(),
            data: ArrayVec::new(),
            patches: ArrayVec::new(),
        }
    }

    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Add a function table entry.
    ///
    /// # Panics
    ///
    /// Panics if more than [`SIM_TABLE_CAPACITY`] functions are added.
    pub fn function(mut self, tag: RomFnTableCode, addr: u16) -> Self {
        self.functions.push((RomCode::from_tag(tag), addr));
        self
    }

    /// Add a data table entry.
    ///
    /// # Panics
    ///
    /// Panics if more than [`SIM_TABLE_CAPACITY`] data items are added.
    pub fn data(mut self, tag: RomFnTableCode, addr: u16) -> Self {
        self.data.push((RomCode::from_tag(tag), addr));
        self
    }

    /// Overwrite a byte after the tables are laid out.
    ///
    /// A byte outside the image is dropped, the same way reads outside it
    /// give 0.
    ///
    /// # Panics
    ///
    /// Panics if more than 64 bytes are patched.
    pub fn byte(mut self, addr: u16, val: u8) -> Self {
        if (addr as usize) < ROM_SIZE {
            self.patches.push((addr, val));
        }
        self
    }

    /// Overwrite consecutive bytes from `addr` on, see [`byte`](Self::byte).
    pub fn bytes(mut self, addr: u16, data: &[u8]) -> Self {
        for (i, &val) in data.iter().enumerate() {
            let Some(at) = u16::try_from(i).ok().and_then(|i| addr.checked_add(i)) else {
                break;
            };
            self = self.byte(at, val);
        }
        self
    }

    pub fn hword(self, addr: u16, val: u16) -> Self {
        self.bytes(addr, &val.to_le_bytes())
    }

    pub fn word(self, addr: u16, val: u32) -> Self {
        self.bytes(addr, &val.to_le_bytes())
    }

    pub fn build(self) -> SimRom {
        let mut image = [0u8; ROM_SIZE];

        let magic = ROM_MAGIC as usize;
        image[magic..magic + ROM_MAGIC_BYTES.len()].copy_from_slice(&ROM_MAGIC_BYTES);
        image[ROM_VERSION as usize] = self.version;

        put_hword(&mut image, ROM_FUNC_TABLE_PTR, SIM_FUNC_TABLE);
        put_hword(&mut image, ROM_DATA_TABLE_PTR, SIM_DATA_TABLE);
        put_hword(&mut image, ROM_TABLE_LOOKUP_PTR, SIM_TABLE_LOOKUP_ENTRY);

        put_table(&mut image, SIM_FUNC_TABLE, &self.functions);
        put_table(&mut image, SIM_DATA_TABLE, &self.data);

        for (addr, val) in self.patches {
            image[addr as usize] = val;
        }

        SimRom {
            image,
            dispatch_calls: AtomicUsize::new(0),
        }
    }
}

fn put_hword(image: &mut [u8], addr: u16, val: u16) {
    let addr = addr as usize;
    image[addr..addr + 2].copy_from_slice(&val.to_le_bytes());
}

fn put_table(image: &mut [u8], base: u16, entries: &Table) {
    let mut at = base;
    for (code, addr) in entries {
        put_hword(image, at, code.raw());
        put_hword(image, at + 2, *addr);
        at += 4;
    }
    // terminator
    put_hword(image, at, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_laid_out() {
        let rom = SimRom::builder().version(2).build();
        assert_eq!(&rom.image()[0x10..0x13], b"Mu\x01");
        assert_eq!(rom.byte_at(0x13), 2);
        assert_eq!(rom.hword_at(0x14), SIM_FUNC_TABLE);
        assert_eq!(rom.hword_at(0x16), SIM_DATA_TABLE);
        assert_eq!(rom.hword_at(0x18), SIM_TABLE_LOOKUP_ENTRY);
    }

    #[test]
    fn table_entries_are_halfword_pairs() {
        let rom = SimRom::builder()
            .function(*b"RE", 0x2349)
            .function(*b"RP", 0x2379)
            .build();
        let base = SIM_FUNC_TABLE as usize;
        assert_eq!(&rom.image()[base..base + 12], &[b'R', b'E', 0x49, 0x23, b'R', b'P', 0x79, 0x23, 0, 0, 0, 0]);
    }

    #[test]
    fn scan_stops_at_terminator() {
        // entry behind the terminator is never reached
        let rom = SimRom::builder()
            .function(*b"RE", 0x2349)
            .hword(SIM_FUNC_TABLE + 8, u16::from_le_bytes(*b"RP"))
            .hword(SIM_FUNC_TABLE + 10, 0x2379)
            .build();
        let table = SIM_FUNC_TABLE as usize;
        let entry = SIM_TABLE_LOOKUP_ENTRY as usize;
        assert_eq!(rom.table_lookup(entry, table, u16::from_le_bytes(*b"RE") as u32), 0x2349);
        assert_eq!(rom.table_lookup(entry, table, u16::from_le_bytes(*b"RP") as u32), 0);
        assert_eq!(rom.dispatch_calls(), 2);
    }

    #[test]
    fn reads_outside_image_are_zero() {
        let rom = SimRom::builder().build();
        assert_eq!(rom.byte_at(ROM_SIZE), 0);
        assert_eq!(rom.hword_at(ROM_SIZE - 1), 0);
        assert_eq!(unsafe { rom.read_word(0x1000_0000) }, 0);
    }

    #[test]
    fn scan_runs_off_the_end() {
        // a table without terminator at the very end of the image
        let rom = SimRom::builder().build();
        let entry = SIM_TABLE_LOOKUP_ENTRY as usize;
        assert_eq!(rom.table_lookup(entry, ROM_SIZE - 2, 0x4552), 0);
    }

    #[test]
    fn patch_outside_image_is_dropped() {
        // 0x4014 is past the 16 KiB image, it must not land on the table pointer
        let rom = SimRom::builder()
            .function(*b"RE", 0x2349)
            .hword(0x4014, 0x0200)
            .build();
        assert_eq!(rom.hword_at(0x14), SIM_FUNC_TABLE);
        assert_eq!(
            crate::rom_func_lookup_in(&rom, RomCode::from_tag(*b"RE")).map(crate::RomAddress::addr),
            Some(0x2349)
        );
    }

    #[test]
    fn patch_at_top_of_address_space() {
        let rom = SimRom::builder().hword(0xffff, 0x1234).word(0xfffe, 0x5678_9abc).build();
        assert_eq!(rom.image(), SimRom::builder().build().image());
    }

    #[test]
    fn safe_wrappers_reach_the_image() {
        let rom = SimRom::builder()
            .version(2)
            .function(*b"P3", 0x1d09)
            .data(*b"GR", 0x0300)
            .word(0x0300, 0xe1a4_01b3)
            .build();
        assert!(crate::RomHeader::read_in(&rom).is_rp2040());
        assert_eq!(crate::rom_version_number_in(&rom), 2);
        let popcount = crate::rom_func_lookup_inline_in(&rom, RomCode::from_tag(*b"P3"));
        assert_eq!(popcount.map(crate::RomAddress::addr), Some(0x1d09));
        assert_eq!(crate::git_revision_in(&rom), Some(0xe1a4_01b3));
    }
}
