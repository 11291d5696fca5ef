//! Functions and data from the RP2040 boot ROM.
//!
//! The boot ROM carries a table of useful routines (flash programming, USB
//! boot, bit and memory helpers). They are not part of the link-time symbol
//! space, so they are located at runtime: two 16-bit pointers at fixed ROM
//! offsets give the table and the ROM's own lookup routine, which then scans
//! the table for a two-character code.
//!
//! ```ignore
//! use rp2040_rom::{rom_func_lookup, RomCode};
//!
//! if let Some(erase) = rom_func_lookup(RomCode::from_tag(*b"RE")) {
//!     // cast `erase` to the calling convention documented for "RE"
//! }
//! ```
//!
//! Known codes also have typed handles, see [`functions`].
#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod cache;
pub mod code;
pub mod functions;
pub mod header;
pub mod layout;
pub mod lookup;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use bus::{BootRom, RomBus};
pub use cache::CachedLookup;
pub use code::RomCode;
pub use functions::RomFunction;
pub use header::{header_bytes, header_bytes_in, rom_version_number, rom_version_number_in, RomHeader};
pub use lookup::{
    copyright_string, copyright_string_in, git_revision, git_revision_in, rom_data_lookup, rom_data_lookup_in,
    rom_func_lookup, rom_func_lookup_in, rom_func_lookup_inline, rom_func_lookup_inline_in,
    rom_hword_as_addr, RomAddress,
};
