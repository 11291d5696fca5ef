/// Polynomial the RP2040 boot ROM uses for the boot2 checksum.
pub const BOOT2_POLYNOMIAL: u32 = 0x04c1_1db7;

/// MSB first CRC32 without input or output reflection.
pub fn crc32(message: &[u8], polynomial: u32, initial_value: u32, xor_out: u32) -> u32 {
    let mut crc = initial_value;
    for &byte in message {
        crc ^= (byte as u32) << 24;
        for _ in 0..8 {
            let top_bit_set = crc & (1 << 31) != 0;
            crc <<= 1;
            if top_bit_set {
                crc ^= polynomial;
            }
        }
    }
    crc ^ xor_out
}

/// The boot2 checksum: init 0xffffffff, no final xor.
pub fn boot2_crc32(message: &[u8]) -> u32 {
    crc32(message, BOOT2_POLYNOMIAL, 0xffff_ffff, 0x0000_0000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_value() {
        // CRC-32/MPEG-2 check value
        assert_eq!(boot2_crc32(b"123456789"), 0x0376_e6e7);
    }

    #[test]
    fn bzip2_check_value() {
        // same polynomial with a final xor is CRC-32/BZIP2
        assert_eq!(crc32(b"123456789", BOOT2_POLYNOMIAL, 0xffff_ffff, 0xffff_ffff), 0xfc89_1918);
    }

    #[test]
    fn empty_message() {
        assert_eq!(boot2_crc32(&[]), 0xffff_ffff);
    }
}
