//! Address layout of the record table.
//!
//! Records are packed in table order from `start`, without gaps:
//!
//! ```text
//! [r0 payload][r0 checksum]{[r0 payload][r0 checksum]}[r1 payload][r1 checksum]...
//! ```
//!
//! The braced region is the backup copy and only exists in backup mode.

use alloc::vec::Vec;
use fixtab_core::{ConfigError, RecordId};
use fixtab_hal::ChecksumWidth;

use crate::config::StoreConfig;

/// Which copy of a record a transfer targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replica {
    Primary,
    Backup,
}

/// Resolved addresses for every record. Pure function of the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    addresses: Vec<u32>,
    sizes: Vec<u32>,
    checksum: ChecksumWidth,
    backup: bool,
    start: u32,
    end: u32,
    max_address: u32,
    span: u32,
    table_size: u32,
}

impl Layout {
    /// Validate `config` against the checksum width and the medium capacity
    /// and compute every record address.
    pub fn new(
        config: &StoreConfig,
        checksum: ChecksumWidth,
        capacity: u32,
    ) -> Result<Self, ConfigError> {
        let table = &config.table;
        if table.is_empty() {
            return Err(ConfigError::EmptyTable);
        }
        if config.start > config.end {
            return Err(ConfigError::InvertedRange { start: config.start, end: config.end });
        }
        if config.end > config.address_width.max() {
            return Err(ConfigError::AddressWidth {
                end: config.end,
                width: config.address_width,
            });
        }
        if config.end >= capacity {
            return Err(ConfigError::MediumCapacity { end: config.end, capacity });
        }
        if table.len() as u64 > config.id_width.max() as u64 + 1 {
            return Err(ConfigError::RecordCount { count: table.len(), width: config.id_width });
        }

        let copies: u64 = if config.backup { 2 } else { 1 };
        let mut addresses = Vec::with_capacity(table.len());
        let mut sizes = Vec::with_capacity(table.len());
        // Wide accumulator so an oversized table is reported instead of wrapping.
        let mut next = config.start as u64;
        let mut table_size = 0u64;

        for (id, record) in table.iter() {
            if record.size > config.size_width.max() {
                return Err(ConfigError::RecordSize {
                    id,
                    size: record.size,
                    width: config.size_width,
                });
            }
            if next > config.end as u64 + 1 {
                return Err(ConfigError::TableOverflow { max_address: next - 1, end: config.end });
            }
            addresses.push(next as u32);
            sizes.push(record.size);
            next += (record.size as u64 + checksum.bytes() as u64) * copies;
            table_size += record.size as u64;
        }

        let span = next - config.start as u64;
        if span == 0 {
            return Err(ConfigError::EmptyFootprint);
        }
        let max_address = next - 1;
        if max_address > config.end as u64 {
            return Err(ConfigError::TableOverflow { max_address, end: config.end });
        }

        Ok(Self {
            addresses,
            sizes,
            checksum,
            backup: config.backup,
            start: config.start,
            end: config.end,
            max_address: max_address as u32,
            span: span as u32,
            table_size: table_size as u32,
        })
    }

    /// Address of the first byte of `replica` of record `id`.
    pub fn address(&self, id: RecordId, replica: Replica) -> Option<u32> {
        let base = *self.addresses.get(id.index())?;
        match replica {
            Replica::Primary => Some(base),
            Replica::Backup => Some(base + self.copy_footprint(id)?),
        }
    }

    pub fn declared_size(&self, id: RecordId) -> Option<u32> {
        self.sizes.get(id.index()).copied()
    }

    /// Payload plus checksum bytes of a single copy.
    pub fn copy_footprint(&self, id: RecordId) -> Option<u32> {
        Some(self.declared_size(id)? + self.checksum.bytes())
    }

    /// Bytes occupied by the record, backup copy included.
    pub fn footprint(&self, id: RecordId) -> Option<u32> {
        let single = self.copy_footprint(id)?;
        Some(if self.backup { single * 2 } else { single })
    }

    pub fn contains(&self, address: u32) -> bool {
        address >= self.start && address <= self.end
    }

    pub fn record_count(&self) -> usize {
        self.addresses.len()
    }

    pub fn checksum(&self) -> ChecksumWidth {
        self.checksum
    }

    pub fn backup(&self) -> bool {
        self.backup
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Last address used by the table.
    pub fn max_address(&self) -> u32 {
        self.max_address
    }

    /// Bytes used by the table, checksums and backup copies included.
    pub fn span(&self) -> u32 {
        self.span
    }

    /// Sum of declared payload sizes. Useful for sizing caller buffers.
    pub fn table_size(&self) -> u32 {
        self.table_size
    }
}
