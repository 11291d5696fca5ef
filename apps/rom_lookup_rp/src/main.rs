#![no_std]
#![no_main]

mod dump;
mod flash_counter;

use arrayvec::ArrayString;
use core::fmt::Write;

use defmt_rtt as _;

// The macro for our start-up function
use rp_pico::entry;

// Ensure we halt the program on panic (if we don't mention this crate it won't
// be linked)
use panic_halt as _;

// A shorter alias for the Peripheral Access Crate, which provides low-level
// register access
use rp_pico::hal::pac;

// A shorter alias for the Hardware Abstraction Layer, which provides
// higher-level drivers.
use rp_pico::hal;
use rp_pico::hal::Clock;

use embedded_hal::digital::v2::OutputPin;
use usb_device::class_prelude::UsbBusAllocator;
use usb_device::device::UsbDeviceBuilder;
use usb_device::device::UsbVidPid;
use usbd_serial::SerialPort;

use rp2040_rom::functions::{popcount32, reset_to_usb_boot, reverse32};
use rp2040_rom::layout::ROM_MAGIC;
use rp2040_rom::{
    copyright_string, git_revision, header_bytes, rom_func_lookup, rom_func_lookup_inline, RomAddress,
    RomFunction, RomHeader,
};

type StrBuf = ArrayString<2048>;

// Wait this long after boot before greeting, so the host has opened the port
const WELCOME_DELAY_US: u64 = 2_000_000;

fn stopwatch_start(timer: &hal::Timer) -> u64 {
    timer.get_counter().ticks()
}

fn stopwatch_delta(start: u64, timer: &hal::Timer) -> u64 {
    timer.get_counter().ticks() - start
}

fn write_header(strbuf: &mut StrBuf) -> core::fmt::Result {
    let header = RomHeader::read();
    writeln!(
        strbuf,
        "ROM magic {:02X?} ({}) version {}\r",
        header.magic,
        if header.is_rp2040() { "RP2040" } else { "unknown" },
        header.version
    )
}

fn write_functions(strbuf: &mut StrBuf, lookup: fn(rp2040_rom::RomCode) -> Option<RomAddress>) -> core::fmt::Result {
    for &function in RomFunction::ALL {
        let code = function.code();
        match lookup(code) {
            Some(addr) => writeln!(strbuf, "{} {:<24} {:#010X}\r", code, function.name(), addr.addr())?,
            None => writeln!(strbuf, "{} {:<24} not in this ROM\r", code, function.name())?,
        }
    }
    Ok(())
}

fn write_version(strbuf: &mut StrBuf) -> core::fmt::Result {
    write_header(strbuf)?;
    match git_revision() {
        Some(rev) => writeln!(strbuf, "git revision {:08x}\r", rev)?,
        None => writeln!(strbuf, "git revision not in this ROM\r")?,
    }
    match copyright_string().and_then(|s| s.to_str().ok()) {
        Some(text) => writeln!(strbuf, "{}\r", text),
        None => writeln!(strbuf, "no copyright string\r"),
    }
}

fn write_bit_helpers(strbuf: &mut StrBuf) -> core::fmt::Result {
    let value = 0x1234_5678_u32;
    match popcount32::ptr() {
        Some(f) => writeln!(strbuf, "popcount32({:#010X}) = {}\r", value, unsafe { f(value) })?,
        None => writeln!(strbuf, "popcount32 not in this ROM\r")?,
    }
    match reverse32::ptr() {
        Some(f) => writeln!(strbuf, "reverse32({:#010X}) = {:#010X}\r", value, unsafe { f(value) }),
        None => writeln!(strbuf, "reverse32 not in this ROM\r"),
    }
}

#[entry]
fn main() -> ! {
    defmt::info!("rom_lookup_rp starting");

    let mut pac = pac::Peripherals::take().unwrap();
    let cp = pac::CorePeripherals::take().unwrap();

    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);

    let clocks = hal::clocks::init_clocks_and_plls(
        rp_pico::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    // The single-cycle I/O block controls our GPIO pins
    let sio = hal::Sio::new(pac.SIO);

    // Set the pins up according to their function on this particular board
    let pins = rp_pico::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    // Set the LED to be an output
    let mut led_pin = pins.led.into_push_pull_output();
    led_pin.set_high().unwrap();

    let mut delay = cortex_m::delay::Delay::new(cp.SYST, clocks.system_clock.freq().to_Hz());

    // Set up the USB driver
    let usb_bus = UsbBusAllocator::new(hal::usb::UsbBus::new(
        pac.USBCTRL_REGS,
        pac.USBCTRL_DPRAM,
        clocks.usb_clock,
        true,
        &mut pac.RESETS,
    ));

    // Set up the USB Communications Class Device driver
    let mut serial = SerialPort::new(&usb_bus);

    // Create a USB device with a fake VID and PID
    let mut usb_dev = UsbDeviceBuilder::new(&usb_bus, UsbVidPid(0x16c0, 0x27dd))
        .manufacturer("EmbeddedRust")
        .product("ROMLOOKUP")
        .serial_number("0.1")
        .device_class(2) // from: https://www.usb.org/defined-class-codes
        .build();

    let timer = hal::Timer::new(pac.TIMER, &mut pac.RESETS);

    let header = RomHeader::read();
    defmt::info!("boot rom {}", header);

    let mut strbuf = StrBuf::new();
    drop(write_header(&mut strbuf));

    led_pin.set_low().unwrap();

    let mut said_hello = false;
    loop {
        // A welcome message at the beginning
        if !said_hello && timer.get_counter().ticks() >= WELCOME_DELAY_US {
            said_hello = true;

            drop(serial.write(b"\r\n *** Welcome to PICO ROM lookup v0.1 *** \r\n"));
            drop(serial.write(strbuf.as_bytes()));
        }

        // Check for new data
        if usb_dev.poll(&mut [&mut serial]) {
            let mut buf = [0u8; 64];
            match serial.read(&mut buf) {
                Err(_e) => {
                    // Do nothing
                }
                Ok(0) => {
                    // Do nothing
                }
                Ok(count) => {
                    // Convert to upper case
                    buf.iter_mut().take(count).for_each(|b| {
                        b.make_ascii_uppercase();
                    });

                    led_pin.set_high().unwrap();
                    strbuf.clear();
                    defmt::info!("command {=u8}", buf[0]);

                    let written = match buf[0] as char {
                        'L' => {
                            let start = stopwatch_start(&timer);
                            let res = write_functions(&mut strbuf, rom_func_lookup);
                            defmt::debug!("out-of-line lookups took {=u64} us", stopwatch_delta(start, &timer));
                            res
                        }
                        'I' => {
                            let start = stopwatch_start(&timer);
                            let res = write_functions(&mut strbuf, |code| rom_func_lookup_inline(code));
                            defmt::debug!("inline lookups took {=u64} us", stopwatch_delta(start, &timer));
                            res
                        }
                        'D' => dump::dump(&header_bytes(), ROM_MAGIC as u32, &mut strbuf),
                        'V' => write_version(&mut strbuf),
                        'P' => write_bit_helpers(&mut strbuf),
                        'S' => {
                            let before = flash_counter::read();
                            let done = flash_counter::increment();
                            defmt::info!("flash counter {=u32} updated {=bool}", before, done);
                            writeln!(strbuf, "Counter {} -> {}\r", before, flash_counter::read())
                        }
                        'F' => {
                            drop(serial.write(b"Boot to Flash mode!\r\n"));
                            match reset_to_usb_boot::ptr() {
                                Some(reset) => {
                                    // give the host a moment to receive the message
                                    delay.delay_ms(100);
                                    unsafe { reset(0, 0) }
                                }
                                None => writeln!(strbuf, "reset_to_usb_boot not in this ROM\r"),
                            }
                        }
                        _ => writeln!(strbuf, "Unknown command\r"),
                    };

                    if written.is_err() {
                        defmt::warn!("console buffer full, output truncated");
                    }

                    let mut wr_ptr = strbuf.as_bytes();
                    while !wr_ptr.is_empty() {
                        match serial.write(wr_ptr) {
                            Ok(len) => wr_ptr = &wr_ptr[len..],
                            // On error, just drop unwritten data.
                            // One possible error is Err(WouldBlock), meaning the USB
                            // write buffer is full.
                            Err(_) => break,
                        };
                    }
                    led_pin.set_low().unwrap();
                }
            }
        }
    }
}
