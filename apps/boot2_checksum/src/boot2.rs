use std::fmt::Write;
use std::path::Path;

use anyhow::ensure;

use crate::crc32::boot2_crc32;

/// Boot2 must be exactly 256 bytes long, including the checksum.
pub const PADDED_SIZE: usize = 256;
pub const CHECKSUM_LEN: usize = 4;
pub const MAX_INPUT_LEN: usize = PADDED_SIZE - CHECKSUM_LEN;

/// Zero pad `input` to 252 bytes and append its checksum, little endian.
///
/// The boot ROM only jumps into boot2 if the last four bytes are the CRC32
/// of the first 252.
pub fn pad_and_checksum(input: &[u8]) -> anyhow::Result<[u8; PADDED_SIZE]> {
    ensure!(
        input.len() <= MAX_INPUT_LEN,
        "Input file size ({} bytes) is too large for output size ({} bytes). Maximum allowed input file size: {} bytes",
        input.len(),
        PADDED_SIZE,
        MAX_INPUT_LEN
    );

    let mut out = [0u8; PADDED_SIZE];
    out[..input.len()].copy_from_slice(input);
    let checksum = boot2_crc32(&out[..MAX_INPUT_LEN]);
    out[MAX_INPUT_LEN..].copy_from_slice(&checksum.to_le_bytes());
    Ok(out)
}

/// Assembly source placing the image in the `.boot2` section.
///
/// Follows the layout of the `pad_checksum` script from the Pico SDK, so the
/// result is assembled in a later build step.
pub fn render_asm(image: &[u8], source: &Path) -> String {
    let mut out = String::new();
    // writes into a String never fail
    let _ = writeln!(out, "// Padded and checksummed copy of: {}", source.display());
    let _ = writeln!(out);
    let _ = writeln!(out, ".cpu cortex-m0plus");
    let _ = writeln!(out, ".thumb");
    let _ = writeln!(out);
    let _ = writeln!(out, ".section .boot2, \"ax\"");
    let _ = writeln!(out);

    for chunk in image.chunks(16) {
        let bytes: Vec<String> = chunk.iter().map(|b| format!("0x{:02x}", b)).collect();
        let _ = writeln!(out, ".byte {}", bytes.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_full_size() {
        let image = pad_and_checksum(&[0x00, 0xb5, 0x32, 0x4b]).unwrap();
        assert_eq!(image.len(), PADDED_SIZE);
        assert_eq!(&image[..4], &[0x00, 0xb5, 0x32, 0x4b]);
        assert!(image[4..MAX_INPUT_LEN].iter().all(|&b| b == 0));
    }

    #[test]
    fn checksum_trails_little_endian() {
        let image = pad_and_checksum(b"boot2").unwrap();
        let expected = boot2_crc32(&image[..MAX_INPUT_LEN]);
        assert_eq!(image[MAX_INPUT_LEN..], expected.to_le_bytes());
    }

    #[test]
    fn max_size_input_fits() {
        let input = [0xa5u8; MAX_INPUT_LEN];
        let image = pad_and_checksum(&input).unwrap();
        assert_eq!(&image[..MAX_INPUT_LEN], &input[..]);
    }

    #[test]
    fn oversize_input_rejected() {
        let err = pad_and_checksum(&[0u8; MAX_INPUT_LEN + 1]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("253 bytes"), "{}", msg);
        assert!(msg.contains("Maximum allowed input file size: 252 bytes"), "{}", msg);
    }

    #[test]
    fn asm_layout() {
        let image = pad_and_checksum(&[0x01, 0xab]).unwrap();
        let asm = render_asm(&image, Path::new("/tmp/boot2.bin"));
        let lines: Vec<&str> = asm.lines().collect();

        assert_eq!(lines[0], "// Padded and checksummed copy of: /tmp/boot2.bin");
        assert_eq!(lines[2], ".cpu cortex-m0plus");
        assert_eq!(lines[3], ".thumb");
        assert_eq!(lines[5], ".section .boot2, \"ax\"");

        let byte_lines: Vec<&&str> = lines.iter().filter(|l| l.starts_with(".byte ")).collect();
        assert_eq!(byte_lines.len(), PADDED_SIZE / 16);
        assert!(byte_lines[0].starts_with(".byte 0x01, 0xab, 0x00,"));
        assert_eq!(byte_lines[0].split(", ").count(), 16);
    }
}
