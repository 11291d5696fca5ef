use core::ffi::CStr;
use core::num::NonZeroUsize;

use crate::bus::{BootRom, RomBus};
use crate::code::RomCode;
use crate::layout::{ROM_DATA_TABLE_PTR, ROM_FUNC_TABLE_PTR, ROM_TABLE_LOOKUP_PTR};

/// Data code of the NUL terminated copyright string.
pub const DATA_COPYRIGHT: RomCode = RomCode::from_tag(*b"CR");
/// Data code of the 32-bit git revision of the ROM source.
pub const DATA_GIT_REVISION: RomCode = RomCode::from_tag(*b"GR");
/// Data code of the soft float function table.
pub const DATA_SOFT_FLOAT_TABLE: RomCode = RomCode::from_tag(*b"SF");
/// Data code of the soft double function table (ROM version 2 and later).
pub const DATA_SOFT_DOUBLE_TABLE: RomCode = RomCode::from_tag(*b"SD");
/// Data code of the soft float table size (ROM version 2 and later).
pub const DATA_SOFT_FLOAT_TABLE_SIZE: RomCode = RomCode::from_tag(*b"FZ");

/// Address of something found in the boot ROM.
///
/// Never zero; the ROM reports "not found" as a null pointer, which becomes
/// `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RomAddress(NonZeroUsize);

#[cfg(feature = "defmt")]
impl defmt::Format for RomAddress {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=usize:#x}", self.0.get())
    }
}

impl RomAddress {
    #[inline(always)]
    pub fn new(addr: usize) -> Option<Self> {
        NonZeroUsize::new(addr).map(Self)
    }

    #[inline(always)]
    pub fn addr(self) -> usize {
        self.0.get()
    }

    #[inline(always)]
    pub fn as_ptr<T>(self) -> *const T {
        self.0.get() as *const T
    }
}

/// To save space, the ROM likes to store memory pointers (which are 32-bit on
/// the Cortex-M0+) using only the bottom 16-bits. The assumption is that the
/// values they point at live in the first 64 KiB of ROM, and the ROM is mapped
/// to address `0x0000_0000` and so 16-bits are always sufficient.
///
/// This functions grabs a 16-bit value from ROM and expands it out to a full address.
///
/// # Safety
///
/// `rom_address` must be readable on `bus`, see [`RomBus::read_hword`].
#[inline(always)]
pub unsafe fn rom_hword_as_addr<B: RomBus + ?Sized>(bus: &B, rom_address: u16) -> usize {
    bus.read_hword(rom_address as usize) as usize
}

/// Retrieve rom content from the table found through `table_ptr` using a code.
///
/// `table_ptr` is one of the table pointer offsets of `layout`.
#[inline(always)]
fn rom_table_lookup<B: RomBus + ?Sized>(bus: &B, table_ptr: u16, code: RomCode) -> Option<RomAddress> {
    // The header offsets are readable and lead to the lookup routine and its
    // tables on every `RomBus`.
    let found = unsafe {
        let rom_table_lookup = rom_hword_as_addr(bus, ROM_TABLE_LOOKUP_PTR);
        let table = rom_hword_as_addr(bus, table_ptr);
        bus.call_table_lookup(rom_table_lookup, table, code.into())
    };
    RomAddress::new(found)
}

/// Lookup a bootrom function by code.
///
/// Returns `None` if the code does not match any function in this ROM
/// revision.
#[inline(never)]
pub fn rom_func_lookup_in<B: RomBus + ?Sized>(bus: &B, code: RomCode) -> Option<RomAddress> {
    rom_table_lookup(bus, ROM_FUNC_TABLE_PTR, code)
}

/// Lookup a bootrom function by code, forcibly inlined into the caller.
///
/// For code that must not call out of its own memory region, e.g. routines
/// running from RAM while flash is disconnected.
#[inline(always)]
pub fn rom_func_lookup_inline_in<B: RomBus + ?Sized>(bus: &B, code: RomCode) -> Option<RomAddress> {
    rom_table_lookup(bus, ROM_FUNC_TABLE_PTR, code)
}

/// Lookup a bootrom data item by code.
#[inline(never)]
pub fn rom_data_lookup_in<B: RomBus + ?Sized>(bus: &B, code: RomCode) -> Option<RomAddress> {
    rom_table_lookup(bus, ROM_DATA_TABLE_PTR, code)
}

/// Lookup a function in the boot ROM of this chip.
#[inline(never)]
pub fn rom_func_lookup(code: RomCode) -> Option<RomAddress> {
    rom_func_lookup_in(&BootRom, code)
}

/// Lookup a function in the boot ROM of this chip, forcibly inlined.
#[inline(always)]
pub fn rom_func_lookup_inline(code: RomCode) -> Option<RomAddress> {
    rom_func_lookup_inline_in(&BootRom, code)
}

/// Lookup a data item in the boot ROM of this chip.
#[inline(never)]
pub fn rom_data_lookup(code: RomCode) -> Option<RomAddress> {
    rom_data_lookup_in(&BootRom, code)
}

/// The git revision of the boot ROM source.
pub fn git_revision_in<B: RomBus + ?Sized>(bus: &B) -> Option<u32> {
    // data lookups only return readable addresses
    rom_data_lookup_in(bus, DATA_GIT_REVISION).map(|addr| unsafe { bus.read_word(addr.addr()) })
}

/// The git revision of this chip's boot ROM.
pub fn git_revision() -> Option<u32> {
    git_revision_in(&BootRom)
}

/// Copy the copyright string of the ROM on `bus` into `buf`.
///
/// Returns the bytes before the terminating NUL, cut short if `buf` fills up
/// first.
pub fn copyright_string_in<'b, B: RomBus + ?Sized>(bus: &B, buf: &'b mut [u8]) -> Option<&'b [u8]> {
    let start = rom_data_lookup_in(bus, DATA_COPYRIGHT)?.addr();
    let mut len = 0;
    while len < buf.len() {
        // the string is readable up to and including its NUL
        let b = unsafe { bus.read_u8(start + len) };
        if b == 0 {
            break;
        }
        buf[len] = b;
        len += 1;
    }
    Some(&buf[..len])
}

/// The copyright string of this chip's boot ROM.
pub fn copyright_string() -> Option<&'static CStr> {
    // The ROM is mapped for the whole lifetime of the program and its data
    // item is NUL terminated.
    rom_data_lookup(DATA_COPYRIGHT).map(|addr| unsafe { CStr::from_ptr(addr.as_ptr()) })
}
