use alloc::vec::Vec;
use fixtab_core::{RecordId, Width};

/// One fixed-size record slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordDescriptor {
    pub label: &'static str,
    /// Declared payload size in bytes, checksum excluded.
    pub size: u32,
}

/// Ordered record table. Position in the table is the record identity and
/// fixes the on-medium address; reordering or resizing invalidates stored data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTable {
    records: Vec<RecordDescriptor>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    /// Table built from bare sizes, labelled by position.
    pub fn from_sizes(sizes: &[u32]) -> Self {
        let records = sizes
            .iter()
            .map(|&size| RecordDescriptor { label: "", size })
            .collect();
        Self { records }
    }

    /// Append a record and return the id it was assigned.
    pub fn push(&mut self, label: &'static str, size: u32) -> RecordId {
        let id = RecordId(self.records.len() as u32);
        self.records.push(RecordDescriptor { label, size });
        id
    }

    pub fn with(mut self, label: &'static str, size: u32) -> Self {
        self.push(label, size);
        self
    }

    pub fn get(&self, id: RecordId) -> Option<&RecordDescriptor> {
        self.records.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &RecordDescriptor)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (RecordId(i as u32), r))
    }
}

/// Immutable store configuration, fixed for the lifetime of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub table: RecordTable,
    /// First usable address.
    pub start: u32,
    /// Last usable address (inclusive).
    pub end: u32,
    pub address_width: Width,
    /// Bounds the declared size of any single record.
    pub size_width: Width,
    /// Bounds the number of records.
    pub id_width: Width,
    /// Store every record twice, the backup copy right after the primary.
    pub backup: bool,
    /// Emit checksum and fallback traces through `log`.
    pub diagnostics: bool,
}

impl StoreConfig {
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }
}

pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl Default for StoreConfigBuilder {
    fn default() -> Self {
        Self {
            config: StoreConfig {
                table: RecordTable::new(),
                start: 16,
                end: 2047,
                address_width: Width::U16,
                size_width: Width::U8,
                id_width: Width::U8,
                backup: false,
                diagnostics: true,
            },
        }
    }
}

impl StoreConfigBuilder {
    pub fn table(mut self, table: RecordTable) -> Self {
        self.config.table = table;
        self
    }

    pub fn record(mut self, label: &'static str, size: u32) -> Self {
        self.config.table.push(label, size);
        self
    }

    pub fn range(mut self, start: u32, end: u32) -> Self {
        self.config.start = start;
        self.config.end = end;
        self
    }

    pub fn address_width(mut self, width: Width) -> Self {
        self.config.address_width = width;
        self
    }

    pub fn size_width(mut self, width: Width) -> Self {
        self.config.size_width = width;
        self
    }

    pub fn id_width(mut self, width: Width) -> Self {
        self.config.id_width = width;
        self
    }

    pub fn backup(mut self, enabled: bool) -> Self {
        self.config.backup = enabled;
        self
    }

    pub fn diagnostics(mut self, enabled: bool) -> Self {
        self.config.diagnostics = enabled;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_sequential_ids() {
        let mut table = RecordTable::new();
        assert_eq!(table.push("version", 1), RecordId(0));
        assert_eq!(table.push("sensor", 4), RecordId(1));
        assert_eq!(table.get(RecordId(1)).map(|r| r.size), Some(4));
        assert!(table.get(RecordId(2)).is_none());
    }

    #[test]
    fn test_builder_defaults() {
        let config = StoreConfig::builder().record("a", 2).build();
        assert_eq!(config.start, 16);
        assert_eq!(config.end, 2047);
        assert!(!config.backup);
        assert_eq!(config.table.len(), 1);
    }
}
