use fixtab_core::{FixtabError, FixtabResult};
use fixtab_hal::{Checksum, NvMemory};

use crate::layout::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

/// Moves single bytes between the caller and the medium, folding each
/// transferred byte into an optional checksum accumulator.
pub(crate) struct ByteMover<'a, M: ?Sized, C: ?Sized> {
    pub medium: &'a mut M,
    pub checksum: &'a C,
    pub layout: &'a Layout,
}

impl<'a, M: NvMemory + ?Sized, C: Checksum + ?Sized> ByteMover<'a, M, C> {
    /// Transfer one byte at `address`.
    /// On write `*byte` is stored; on read it is overwritten with the medium value.
    /// Out-of-range addresses are rejected before the medium is touched.
    pub fn transfer(
        &mut self,
        address: u32,
        byte: &mut u8,
        direction: Direction,
        acc: Option<&mut u16>,
    ) -> FixtabResult<()> {
        if !self.layout.contains(address) {
            return Err(FixtabError::AddressOutOfRange);
        }

        match direction {
            Direction::Write => nb::block!(self.medium.write_byte(address, *byte))
                .map_err(|e| medium_failure(e, FixtabError::LowLevelWrite))?,
            Direction::Read => {
                *byte = nb::block!(self.medium.read_byte(address))
                    .map_err(|e| medium_failure(e, FixtabError::LowLevelRead))?
            }
        }

        if let Some(acc) = acc {
            *acc = self.checksum.fold(*byte, *acc);
        }
        Ok(())
    }
}

/// Device codes must stay below the reserved range, otherwise they would
/// read back as a protocol error. Those fall back to the generic kind.
fn medium_failure(err: FixtabError, fallback: FixtabError) -> FixtabError {
    match err {
        FixtabError::Device(code) => FixtabError::device(code, fallback),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::Crc8;
    use crate::config::StoreConfig;
    use fixtab_hal::ChecksumWidth;

    struct Cells([u8; 64], usize);

    struct Faulty(i32);

    impl NvMemory for Faulty {
        fn capacity(&self) -> u32 {
            64
        }
        fn write_byte(&mut self, _address: u32, _byte: u8) -> nb::Result<(), FixtabError> {
            Err(nb::Error::Other(FixtabError::Device(self.0)))
        }
        fn read_byte(&mut self, _address: u32) -> nb::Result<u8, FixtabError> {
            Err(nb::Error::Other(FixtabError::Device(self.0)))
        }
    }

    impl NvMemory for Cells {
        fn capacity(&self) -> u32 {
            64
        }
        fn write_byte(&mut self, address: u32, byte: u8) -> nb::Result<(), FixtabError> {
            self.1 += 1;
            self.0[address as usize] = byte;
            Ok(())
        }
        fn read_byte(&mut self, address: u32) -> nb::Result<u8, FixtabError> {
            self.1 += 1;
            Ok(self.0[address as usize])
        }
    }

    fn layout() -> Layout {
        let config = StoreConfig::builder().record("a", 4).range(8, 31).build();
        Layout::new(&config, ChecksumWidth::One, 64).unwrap()
    }

    #[test]
    fn test_out_of_range_never_reaches_medium() {
        let layout = layout();
        let mut cells = Cells([0; 64], 0);
        let mut mover = ByteMover { medium: &mut cells, checksum: &Crc8, layout: &layout };

        let mut byte = 1;
        assert_eq!(
            mover.transfer(7, &mut byte, Direction::Write, None),
            Err(FixtabError::AddressOutOfRange)
        );
        assert_eq!(
            mover.transfer(32, &mut byte, Direction::Read, None),
            Err(FixtabError::AddressOutOfRange)
        );
        assert_eq!(cells.1, 0);
    }

    #[test]
    fn test_reserved_device_codes_fall_back() {
        let layout = layout();
        let mut byte = 0;

        let mut faulty = Faulty(-5);
        let mut mover = ByteMover { medium: &mut faulty, checksum: &Crc8, layout: &layout };
        assert_eq!(
            mover.transfer(8, &mut byte, Direction::Write, None),
            Err(FixtabError::LowLevelWrite)
        );
        assert_eq!(
            mover.transfer(8, &mut byte, Direction::Read, None),
            Err(FixtabError::LowLevelRead)
        );

        let mut faulty = Faulty(-42);
        let mut mover = ByteMover { medium: &mut faulty, checksum: &Crc8, layout: &layout };
        assert_eq!(
            mover.transfer(8, &mut byte, Direction::Read, None),
            Err(FixtabError::Device(-42))
        );
    }

    #[test]
    fn test_fold_follows_transferred_bytes() {
        let layout = layout();
        let mut cells = Cells([0; 64], 0);
        let mut acc = 0u16;
        {
            let mut mover = ByteMover { medium: &mut cells, checksum: &Crc8, layout: &layout };
            for (i, b) in [3u8, 1, 4].into_iter().enumerate() {
                let mut b = b;
                mover.transfer(8 + i as u32, &mut b, Direction::Write, Some(&mut acc)).unwrap();
            }
        }
        assert_eq!(acc, Crc8.digest(&[3, 1, 4]));

        let mut read_acc = 0u16;
        let mut mover = ByteMover { medium: &mut cells, checksum: &Crc8, layout: &layout };
        let mut b = 0;
        for address in 8..11 {
            mover.transfer(address, &mut b, Direction::Read, Some(&mut read_acc)).unwrap();
        }
        assert_eq!(b, 4);
        assert_eq!(read_acc, acc);
    }
}
