#![no_std]
#![forbid(unsafe_code)]

use fixtab_core::FixtabError;

/// Byte-addressable non-volatile memory (EEPROM, FRAM, emulated flash).
///
/// Failures carry `FixtabError::LowLevelWrite` / `FixtabError::LowLevelRead`
/// or a device-specific `FixtabError::Device` code.
/// `nb::Error::WouldBlock` signals a write cycle still in progress; the
/// store polls until the call completes.
pub trait NvMemory: Send {
    /// Number of addressable bytes, starting at address 0.
    fn capacity(&self) -> u32;

    fn write_byte(&mut self, address: u32, byte: u8) -> nb::Result<(), FixtabError>;

    fn read_byte(&mut self, address: u32) -> nb::Result<u8, FixtabError>;
}

impl<T: NvMemory + ?Sized> NvMemory for &mut T {
    fn capacity(&self) -> u32 {
        (**self).capacity()
    }

    fn write_byte(&mut self, address: u32, byte: u8) -> nb::Result<(), FixtabError> {
        (**self).write_byte(address, byte)
    }

    fn read_byte(&mut self, address: u32) -> nb::Result<u8, FixtabError> {
        (**self).read_byte(address)
    }
}

/// Number of checksum bytes stored after each record payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumWidth {
    None,
    One,
    Two,
}

impl ChecksumWidth {
    pub const fn bytes(self) -> u32 {
        match self {
            ChecksumWidth::None => 0,
            ChecksumWidth::One => 1,
            ChecksumWidth::Two => 2,
        }
    }

    /// Mask selecting the accumulator bits that are stored.
    pub const fn mask(self) -> u16 {
        match self {
            ChecksumWidth::None => 0,
            ChecksumWidth::One => 0x00FF,
            ChecksumWidth::Two => 0xFFFF,
        }
    }
}

/// Running checksum folded one byte at a time.
/// INVARIANT: Deterministic and order-sensitive. The accumulator starts at 0
/// and only the bits selected by `width().mask()` are ever significant.
pub trait Checksum: Send + Sync {
    fn width(&self) -> ChecksumWidth;

    fn fold(&self, byte: u8, acc: u16) -> u16;

    /// Fold a whole slice. Used for diagnostics and tests.
    fn digest(&self, bytes: &[u8]) -> u16 {
        bytes.iter().fold(0, |acc, &b| self.fold(b, acc)) & self.width().mask()
    }
}
