//! Typed handles for the functions in the RP2040 boot ROM.
//!
//! Every known code gets a module with its [`RomCode`], the function pointer
//! type of its calling convention and getters returning that type. The list
//! follows `2.8.3. Bootrom Functions` of the RP2040 datasheet.
//!
//! ```ignore
//! use rp2040_rom::functions::popcount32;
//!
//! if let Some(f) = popcount32::ptr() {
//!     let ones = unsafe { f(0xf0f0) };
//! }
//! ```

use crate::bus::RomBus;
use crate::code::RomCode;
use crate::lookup::{rom_func_lookup_in, RomAddress};

macro_rules! rom_functions {
    ($(
        $(#[$meta:meta])*
        $variant:ident => $name:ident = $tag:literal : fn($($arg:ident: $ty:ty),*) $(-> $ret:ty)?;
    )*) => {
        /// A function known to live in the boot ROM.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub enum RomFunction {
            $(
                $(#[$meta])*
                $variant,
            )*
        }

        impl RomFunction {
            pub const ALL: &'static [RomFunction] = &[$(RomFunction::$variant),*];

            pub const fn code(self) -> RomCode {
                match self {
                    $(RomFunction::$variant => $name::CODE,)*
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(RomFunction::$variant => stringify!($name),)*
                }
            }

            pub fn from_code(code: RomCode) -> Option<Self> {
                Self::ALL.iter().copied().find(|f| f.code() == code)
            }

            pub fn resolve_in<B: RomBus + ?Sized>(self, bus: &B) -> Option<RomAddress> {
                rom_func_lookup_in(bus, self.code())
            }

            pub fn resolve(self) -> Option<RomAddress> {
                crate::lookup::rom_func_lookup(self.code())
            }
        }

        $(
            $(#[$meta])*
            pub mod $name {
                use crate::bus::RomBus;
                use crate::code::RomCode;
                use crate::lookup::RomAddress;

                pub const CODE: RomCode = RomCode::from_tag(*$tag);

                pub type FnPtr = unsafe extern "C" fn($($arg: $ty),*) $(-> $ret)?;

                fn as_fn(addr: RomAddress) -> FnPtr {
                    // FnPtr is a plain code pointer, same size as the address
                    unsafe { core::mem::transmute::<usize, FnPtr>(addr.addr()) }
                }

                /// Look the function up in `bus`.
                pub fn ptr_in<B: RomBus + ?Sized>(bus: &B) -> Option<FnPtr> {
                    crate::lookup::rom_func_lookup_in(bus, CODE).map(as_fn)
                }

                /// Look the function up in the boot ROM of this chip.
                #[cfg(not(feature = "rom-func-cache"))]
                pub fn ptr() -> Option<FnPtr> {
                    ptr_in(&crate::bus::BootRom)
                }

                /// Look the function up in the boot ROM of this chip, once.
                #[cfg(feature = "rom-func-cache")]
                pub fn ptr() -> Option<FnPtr> {
                    static CACHE: crate::cache::CachedLookup = crate::cache::CachedLookup::new(CODE);
                    CACHE.get_in(&crate::bus::BootRom).map(as_fn)
                }
            }
        )*
    };
}

rom_functions! {
    /// Return a count of the number of 1 bits in value.
    PopCount32 => popcount32 = b"P3": fn(value: u32) -> u32;
    /// Return the bits of value in the reverse order.
    Reverse32 => reverse32 = b"R3": fn(value: u32) -> u32;
    /// Return the number of consecutive high order 0 bits of value.
    Clz32 => clz32 = b"L3": fn(value: u32) -> u32;
    /// Return the number of consecutive low order 0 bits of value.
    Ctz32 => ctz32 = b"T3": fn(value: u32) -> u32;
    /// Sets n bytes start at ptr to the value c and returns ptr.
    Memset => memset = b"MS": fn(ptr: *mut u8, c: u8, n: u32) -> *mut u8;
    /// Sets n bytes start at ptr to the value c and returns ptr; ptr must be word aligned.
    Memset4 => memset4 = b"S4": fn(ptr: *mut u32, c: u8, n: u32) -> *mut u32;
    /// Copies n bytes starting at src to dest and returns dest.
    Memcpy => memcpy = b"MC": fn(dest: *mut u8, src: *const u8, n: u32) -> *mut u8;
    /// Copies n bytes starting at src to dest and returns dest; both must be word aligned.
    Memcpy44 => memcpy44 = b"C4": fn(dest: *mut u32, src: *const u32, n: u32) -> *mut u8;
    /// Resets the RP2040 and uses the watchdog facility to re-start in BOOTSEL mode.
    ResetToUsbBoot => reset_to_usb_boot = b"UB": fn(gpio_activity_pin_mask: u32, disable_interface_mask: u32) -> !;
    /// Restore all QSPI pad controls to their default state, and connect the SSI to the QSPI pads.
    ConnectInternalFlash => connect_internal_flash = b"IF": fn();
    /// First set up the SSI for serial-mode operations, then issue the fixed XIP exit sequence.
    FlashExitXip => flash_exit_xip = b"EX": fn();
    /// Erase a count bytes, starting at addr (offset from start of flash).
    FlashRangeErase => flash_range_erase = b"RE": fn(addr: u32, count: usize, block_size: u32, block_cmd: u8);
    /// Program data to a range of flash addresses starting at addr (offset from start of flash).
    FlashRangeProgram => flash_range_program = b"RP": fn(addr: u32, data: *const u8, count: usize);
    /// Flush and enable the XIP cache.
    FlashFlushCache => flash_flush_cache = b"FC": fn();
    /// Configure the SSI to generate a standard 03h serial read command.
    FlashEnterCmdXip => flash_enter_cmd_xip = b"CX": fn();
    /// Simple debugger trampoline for break-on-return.
    DebugTrampoline => debug_trampoline = b"DT": fn();
    /// Address just past the debug trampoline.
    DebugTrampolineEnd => debug_trampoline_end = b"DE": fn();
    /// Resume execution at the vector in VTOR of this core (ROM version 2 and later).
    WaitForVector => wait_for_vector = b"WV": fn() -> !;
}
