/// Signature of the ROM's `rom_table_lookup` routine: table, code -> address or 0.
type RomTableLookupFn = unsafe extern "C" fn(*const u16, u32) -> usize;

/// Read access to a boot ROM and the ability to run its table lookup routine.
///
/// The methods take raw addresses and are `unsafe` to call. Safe code goes
/// through [`rom_func_lookup_in`](crate::rom_func_lookup_in),
/// [`rom_data_lookup_in`](crate::rom_data_lookup_in) and
/// [`RomHeader`](crate::RomHeader), which only start from the fixed offsets in
/// [`layout`](crate::layout).
///
/// # Safety
///
/// An implementor promises that the bus holds an RP2040 style ROM: the bytes
/// `ROM_MAGIC..ROM_MAGIC + ROM_HEADER_LEN` are readable, the pointers at
/// `ROM_FUNC_TABLE_PTR` and `ROM_DATA_TABLE_PTR` lead to readable code tables,
/// the pointer at `ROM_TABLE_LOOKUP_PTR` leads to a routine that
/// `call_table_lookup` may run on them, and every non-zero address a data
/// lookup returns is readable: a string up to its NUL, anything else as a
/// word.
pub unsafe trait RomBus {
    /// Byte at `addr`.
    ///
    /// # Safety
    ///
    /// `addr` must be readable on this bus. For the chip's own ROM that means
    /// non-null and mapped.
    unsafe fn read_u8(&self, addr: usize) -> u8;

    /// Little endian halfword at `addr`.
    ///
    /// # Safety
    ///
    /// As [`read_u8`](Self::read_u8), for `addr..addr + 2`; `addr` is 2 byte aligned.
    unsafe fn read_hword(&self, addr: usize) -> u16 {
        u16::from_le_bytes([self.read_u8(addr), self.read_u8(addr + 1)])
    }

    /// Little endian word at `addr`.
    ///
    /// # Safety
    ///
    /// As [`read_u8`](Self::read_u8), for `addr..addr + 4`; `addr` is 4 byte aligned.
    unsafe fn read_word(&self, addr: usize) -> u32 {
        u32::from_le_bytes([
            self.read_u8(addr),
            self.read_u8(addr + 1),
            self.read_u8(addr + 2),
            self.read_u8(addr + 3),
        ])
    }

    /// Run the lookup routine at `lookup` on the code table at `table`.
    ///
    /// Returns the address stored for `code`, or 0.
    ///
    /// # Safety
    ///
    /// `lookup` must be the address read from `ROM_TABLE_LOOKUP_PTR` of this
    /// bus and `table` one read from `ROM_FUNC_TABLE_PTR` or
    /// `ROM_DATA_TABLE_PTR` of this bus.
    unsafe fn call_table_lookup(&self, lookup: usize, table: usize, code: u32) -> usize;
}

/// The boot ROM of the chip we are running on, mapped at `0x0000_0000`.
///
/// Only meaningful on the RP2040 itself.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootRom;

// The RP2040 boot ROM has the header and tables described in `layout`.
unsafe impl RomBus for BootRom {
    #[inline(always)]
    unsafe fn read_u8(&self, addr: usize) -> u8 {
        (addr as *const u8).read_volatile()
    }

    #[inline(always)]
    unsafe fn read_hword(&self, addr: usize) -> u16 {
        (addr as *const u16).read_volatile()
    }

    #[inline(always)]
    unsafe fn read_word(&self, addr: usize) -> u32 {
        (addr as *const u32).read_volatile()
    }

    #[inline(always)]
    unsafe fn call_table_lookup(&self, lookup: usize, table: usize, code: u32) -> usize {
        let rom_table_lookup: RomTableLookupFn = core::mem::transmute(lookup);
        rom_table_lookup(table as *const u16, code)
    }
}
