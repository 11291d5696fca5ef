//! Fixed locations in the boot ROM header.
//!
//! The following addresses are described at `2.8.2. Bootrom Contents` of the
//! RP2040 datasheet. They are baked into the silicon and never move.

/// Address of the three byte ROM magic, `'M' 'u' 0x01`.
pub const ROM_MAGIC: u16 = 0x0010;

/// Address of the ROM version byte.
pub const ROM_VERSION: u16 = 0x0013;

/// Pointer to helper functions lookup table.
pub const ROM_FUNC_TABLE_PTR: u16 = 0x0014;

/// Pointer to the public data lookup table.
pub const ROM_DATA_TABLE_PTR: u16 = 0x0016;

/// Pointer to the lookup table function supplied by the rom.
pub const ROM_TABLE_LOOKUP_PTR: u16 = 0x0018;

/// Expected contents at [`ROM_MAGIC`].
pub const ROM_MAGIC_BYTES: [u8; 3] = [b'M', b'u', 0x01];

/// Size of the RP2040 boot ROM, mapped at `0x0000_0000`.
pub const ROM_SIZE: usize = 16 * 1024;

/// Header bytes from [`ROM_MAGIC`] on, up to `0x0020`.
pub const ROM_HEADER_LEN: usize = 16;
