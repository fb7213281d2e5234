use fixtab_core::FixtabError;
use fixtab_hal::{Checksum, ChecksumWidth, NvMemory};

struct Latch {
    cell: u8,
    pending: u8,
}

impl NvMemory for Latch {
    fn capacity(&self) -> u32 {
        1
    }
    fn write_byte(&mut self, address: u32, byte: u8) -> nb::Result<(), FixtabError> {
        if address != 0 {
            return Err(nb::Error::Other(FixtabError::LowLevelWrite));
        }
        // Simulated write cycle
        if self.pending > 0 {
            self.pending -= 1;
            return Err(nb::Error::WouldBlock);
        }
        self.cell = byte;
        Ok(())
    }
    fn read_byte(&mut self, address: u32) -> nb::Result<u8, FixtabError> {
        if address != 0 {
            return Err(nb::Error::Other(FixtabError::LowLevelRead));
        }
        Ok(self.cell)
    }
}

struct Xor;

impl Checksum for Xor {
    fn width(&self) -> ChecksumWidth {
        ChecksumWidth::One
    }
    fn fold(&self, byte: u8, acc: u16) -> u16 {
        acc ^ byte as u16
    }
}

#[test]
fn test_trait_object_safety() {
    let mut dev = Latch { cell: 0, pending: 2 };
    let obj: &mut dyn NvMemory = &mut dev;

    assert_eq!(obj.capacity(), 1);
    assert!(matches!(obj.write_byte(0, 7), Err(nb::Error::WouldBlock)));
    nb::block!(obj.write_byte(0, 7)).unwrap();
    assert_eq!(nb::block!(obj.read_byte(0)).unwrap(), 7);
    assert!(matches!(
        obj.read_byte(5),
        Err(nb::Error::Other(FixtabError::LowLevelRead))
    ));
}

#[test]
fn test_borrowed_medium_forwards() {
    let mut dev = Latch { cell: 9, pending: 0 };
    let mut borrowed = &mut dev;
    assert_eq!(NvMemory::read_byte(&mut borrowed, 0).unwrap(), 9);
}

#[test]
fn test_checksum_digest_masks_width() {
    assert_eq!(Xor.digest(&[0x0F, 0xF0]), 0xFF);
    assert_eq!(Xor.digest(&[]), 0);
    assert_eq!(ChecksumWidth::Two.bytes(), 2);
    assert_eq!(ChecksumWidth::None.mask(), 0);
}
