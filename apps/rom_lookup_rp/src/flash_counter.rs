//! A boot counter kept in the last MiB of flash.
//!
//! Erasing and programming flash disconnects XIP, so the update runs from RAM
//! and reaches the ROM flash routines through the inlined lookup only.

use rp2040_rom::functions::{
    connect_internal_flash, flash_enter_cmd_xip, flash_exit_xip, flash_flush_cache, flash_range_erase,
    flash_range_program,
};
use rp2040_rom::{rom_func_lookup_inline, RomAddress, RomCode};

const FLASH_BASE: u32 = 0x1000_0000;
pub const COUNTER_OFFSET: u32 = 0x0010_0000;
pub const COUNTER_ADDRESS: u32 = FLASH_BASE + COUNTER_OFFSET;

const SECTOR_SIZE: usize = 1 << 12;
const BLOCK_SIZE: u32 = 1 << 16;
const BLOCK_ERASE_CMD: u8 = 0xD8;
const PAGE_SIZE: usize = 256;

pub fn read() -> u32 {
    unsafe { (COUNTER_ADDRESS as *const u32).read_volatile() }
}

/// Add one to the counter. Returns `false`, leaving flash untouched, if this
/// ROM lacks one of the flash functions.
pub fn increment() -> bool {
    let next = read().wrapping_add(1);
    cortex_m::interrupt::free(|_| unsafe { program_counter(next) })
}

#[inline(always)]
fn resolve(code: RomCode) -> Option<RomAddress> {
    rom_func_lookup_inline(code)
}

#[inline(never)]
#[link_section = ".data.ram_func"]
unsafe fn program_counter(value: u32) -> bool {
    let mut data = [0u8; PAGE_SIZE];
    data[..4].copy_from_slice(&value.to_le_bytes());

    let (
        Some(connect),
        Some(exit_xip),
        Some(erase),
        Some(program),
        Some(flush),
        Some(enter_xip),
    ) = (
        resolve(connect_internal_flash::CODE),
        resolve(flash_exit_xip::CODE),
        resolve(flash_range_erase::CODE),
        resolve(flash_range_program::CODE),
        resolve(flash_flush_cache::CODE),
        resolve(flash_enter_cmd_xip::CODE),
    )
    else {
        return false;
    };

    let connect: connect_internal_flash::FnPtr = core::mem::transmute(connect.addr());
    let exit_xip: flash_exit_xip::FnPtr = core::mem::transmute(exit_xip.addr());
    let erase: flash_range_erase::FnPtr = core::mem::transmute(erase.addr());
    let program: flash_range_program::FnPtr = core::mem::transmute(program.addr());
    let flush: flash_flush_cache::FnPtr = core::mem::transmute(flush.addr());
    let enter_xip: flash_enter_cmd_xip::FnPtr = core::mem::transmute(enter_xip.addr());

    connect();
    exit_xip();
    erase(COUNTER_OFFSET, SECTOR_SIZE, BLOCK_SIZE, BLOCK_ERASE_CMD);
    program(COUNTER_OFFSET, data.as_ptr(), data.len());
    flush();
    enter_xip();
    true
}
