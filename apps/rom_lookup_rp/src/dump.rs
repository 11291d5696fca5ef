use arrayvec::ArrayString;
use core::fmt::Write;

/// Hex dump of `data`, labelled with addresses starting at `base`.
///
/// Stops with an error once `out` is full.
pub fn dump<const N: usize>(data: &[u8], base: u32, out: &mut ArrayString<N>) -> core::fmt::Result {
    for (i, val) in data.iter().enumerate() {
        if (i % 16) == 0 {
            write!(out, "{:08X} ", base + i as u32)?;
        }
        if (i % 8) == 0 {
            write!(out, " ")?;
        }

        write!(out, " {:02X}", val)?;

        if (i % 16) == 15 {
            write!(out, "\r\n")?;
        }
    }
    write!(out, "\r\n")
}
