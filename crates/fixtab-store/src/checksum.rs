//! Built-in checksums.
//!
//! Both CRCs are non-reflected with a zero seed and no output xor, so the
//! running register after each byte is the stored checksum. Folding one
//! byte reduces to one lookup of the single-byte CRC.

use crc::{Crc, CRC_16_XMODEM, CRC_8_SMBUS};
use fixtab_hal::{Checksum, ChecksumWidth};

const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Records carry no checksum bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChecksum;

impl Checksum for NoChecksum {
    fn width(&self) -> ChecksumWidth {
        ChecksumWidth::None
    }

    fn fold(&self, _byte: u8, acc: u16) -> u16 {
        acc
    }
}

/// CRC-8 (polynomial 0x07), one checksum byte per record.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc8;

impl Checksum for Crc8 {
    fn width(&self) -> ChecksumWidth {
        ChecksumWidth::One
    }

    fn fold(&self, byte: u8, acc: u16) -> u16 {
        // CRC of a single byte is the table entry for that byte.
        CRC8.checksum(&[acc as u8 ^ byte]) as u16
    }
}

/// CRC-16 CCITT (polynomial 0x1021), two checksum bytes per record.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc16;

impl Checksum for Crc16 {
    fn width(&self) -> ChecksumWidth {
        ChecksumWidth::Two
    }

    fn fold(&self, byte: u8, acc: u16) -> u16 {
        // Table step: shift the register and xor in the single-byte CRC of the top byte.
        (acc << 8) ^ CRC16.checksum(&[(acc >> 8) as u8 ^ byte])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECK: &[u8] = b"123456789";

    #[test]
    fn test_crc8_matches_catalogue() {
        assert_eq!(Crc8.digest(CHECK), CRC8.checksum(CHECK) as u16);
        assert_eq!(Crc8.digest(CHECK), 0xF4);
    }

    #[test]
    fn test_crc16_matches_catalogue() {
        assert_eq!(Crc16.digest(CHECK), CRC16.checksum(CHECK));
        assert_eq!(Crc16.digest(CHECK), 0x31C3);
    }

    #[test]
    fn test_fold_is_order_sensitive() {
        assert_ne!(Crc16.digest(&[1, 2]), Crc16.digest(&[2, 1]));
        assert_ne!(Crc8.digest(&[1, 2]), Crc8.digest(&[2, 1]));
    }

    #[test]
    fn test_no_checksum_is_inert() {
        assert_eq!(NoChecksum.digest(CHECK), 0);
    }
}
