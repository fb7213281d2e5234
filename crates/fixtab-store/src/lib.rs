//! Fixed-layout record store for small byte-addressable non-volatile memory.
//!
//! A closed table of fixed-size records is packed into an address range of
//! the medium. Each record may carry a CRC and an optional backup copy.
//!
//! ```
//! use fixtab_store::{Crc8, RecordId, RecordStore, StoreConfig};
//! use fixtab_sim::SimEeprom;
//!
//! let config = StoreConfig::builder()
//!     .record("version", 1)
//!     .record("counter", 4)
//!     .build();
//! let store = RecordStore::new(config, SimEeprom::new(2048), Crc8).unwrap();
//!
//! let counter = RecordId(1);
//! store.write_value(counter, 4_578_686u32).unwrap();
//! assert_eq!(store.read_value::<u32>(counter).unwrap(), 4_578_686);
//! ```
#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod checksum;
pub mod codec;
pub mod config;
pub mod engine;
pub mod layout;
mod transfer;

pub use checksum::{Crc16, Crc8, NoChecksum};
pub use codec::FixedValue;
pub use config::{RecordDescriptor, RecordTable, StoreConfig, StoreConfigBuilder};
pub use engine::{Payload, RecordStore, FILL_BYTE};
pub use layout::{Layout, Replica};
pub use transfer::Direction;

pub use fixtab_core::{ConfigError, FixtabError, FixtabResult, RecordId, Width};
