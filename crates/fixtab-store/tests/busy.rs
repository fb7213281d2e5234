use std::sync::{Arc, Barrier};
use std::thread;

use fixtab_core::FixtabError;
use fixtab_hal::NvMemory;
use fixtab_sim::SimEeprom;
use fixtab_store::{Crc8, RecordId, RecordStore, StoreConfig};

const COUNTER: RecordId = RecordId(0);

/// Parks the first write until the test releases it, simulating a
/// transfer that is still in flight.
struct GatedMedium {
    inner: SimEeprom,
    entered: Arc<Barrier>,
    release: Arc<Barrier>,
    armed: bool,
}

impl NvMemory for GatedMedium {
    fn capacity(&self) -> u32 {
        self.inner.capacity()
    }

    fn write_byte(&mut self, address: u32, byte: u8) -> nb::Result<(), FixtabError> {
        if self.armed {
            self.armed = false;
            self.entered.wait();
            self.release.wait();
        }
        self.inner.write_byte(address, byte)
    }

    fn read_byte(&mut self, address: u32) -> nb::Result<u8, FixtabError> {
        self.inner.read_byte(address)
    }
}

#[test]
fn test_second_caller_rejected_while_busy() {
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    let medium = GatedMedium {
        inner: SimEeprom::new(2048),
        entered: entered.clone(),
        release: release.clone(),
        armed: true,
    };
    let config = StoreConfig::builder().record("counter", 4).build();
    let store = Arc::new(RecordStore::new(config, medium, Crc8).unwrap());

    let writer = {
        let store = store.clone();
        thread::spawn(move || store.write_value(COUNTER, 0xCAFE_F00Du32))
    };

    // Writer is now parked inside its first byte write.
    entered.wait();
    assert!(store.is_busy());
    assert_eq!(store.read_value::<u32>(COUNTER), Err(FixtabError::Busy));
    assert_eq!(store.write_value(COUNTER, 1u32), Err(FixtabError::Busy));
    assert_eq!(store.with_medium(|_| ()), Err(FixtabError::Busy));
    assert_eq!(store.error_count(), 2);

    release.wait();
    assert_eq!(writer.join().unwrap(), Ok(()));

    // Rejected callers never reached the medium.
    let (reads, writes) = store.with_medium(|m| m.inner.op_counts()).unwrap();
    assert_eq!(reads, 0);
    assert_eq!(writes, 5);

    assert!(!store.is_busy());
    assert_eq!(store.read_value::<u32>(COUNTER), Ok(0xCAFE_F00D));
}

#[test]
fn test_claim_released_after_failure() {
    let config = StoreConfig::builder().record("counter", 4).build();
    let store = RecordStore::new(config, SimEeprom::new(2048), Crc8).unwrap();

    assert_eq!(store.write_value(RecordId(3), 1u8), Err(FixtabError::UnknownRecord));
    assert!(!store.is_busy());
    assert_eq!(store.read_value::<u32>(COUNTER), Err(FixtabError::Checksum));
    assert!(!store.is_busy());
    assert_eq!(store.write_value(COUNTER, 2u32), Ok(()));
}

#[test]
fn test_shared_store_across_threads() {
    let config = StoreConfig::builder()
        .table(fixtab_store::RecordTable::from_sizes(&[4, 4, 4, 4]))
        .diagnostics(false)
        .build();
    let store = Arc::new(RecordStore::new(config, SimEeprom::new(2048), Crc8).unwrap());

    let workers: Vec<_> = (0..4u32)
        .map(|i| {
            let store = store.clone();
            thread::spawn(move || {
                let id = RecordId(i);
                let mut done = 0;
                // Busy rejections are retried by the caller.
                while done < 50 {
                    if store.write_value(id, i * 1000 + done).is_ok() {
                        done += 1;
                    }
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    for i in 0..4u32 {
        assert_eq!(store.read_value::<u32>(RecordId(i)), Ok(i * 1000 + 49));
    }
}
