use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use fixtab_core::{ConfigError, FixtabError, FixtabResult, RecordId};
use fixtab_hal::{Checksum, ChecksumWidth, NvMemory};
use log::{debug, trace, warn};
use spin::Mutex;

use crate::config::StoreConfig;
use crate::layout::{Layout, Replica};
use crate::transfer::{ByteMover, Direction};

/// Value written into the unused tail of a record so the checksum always
/// spans the full declared size.
pub const FILL_BYTE: u8 = 0x00;

/// Caller side of a record transfer.
#[derive(Debug)]
pub enum Payload<'a> {
    Write(&'a [u8]),
    Read(&'a mut [u8]),
}

impl Payload<'_> {
    pub fn len(&self) -> usize {
        match self {
            Payload::Write(data) => data.len(),
            Payload::Read(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn direction(&self) -> Direction {
        match self {
            Payload::Write(_) => Direction::Write,
            Payload::Read(_) => Direction::Read,
        }
    }
}

/// Exclusive claim on the store. Released on drop, on every exit path.
struct BusyClaim<'a>(&'a AtomicBool);

impl<'a> BusyClaim<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyClaim<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Fixed-layout record store over a byte-addressable medium.
///
/// All operations take `&self`; a caller arriving while another transfer is
/// in flight gets `FixtabError::Busy` immediately instead of waiting.
pub struct RecordStore<M, C> {
    config: StoreConfig,
    layout: Layout,
    checksum: C,
    medium: Mutex<M>,
    busy: AtomicBool,
    errors: AtomicU32,
}

impl<M: NvMemory, C: Checksum> RecordStore<M, C> {
    /// Validate the configuration against `medium` and `checksum` and build the store.
    pub fn new(config: StoreConfig, medium: M, checksum: C) -> Result<Self, ConfigError> {
        let layout = Layout::new(&config, checksum.width(), medium.capacity())?;

        if config.diagnostics {
            debug!(
                "[STORE] {} records, {}..={} used of {}..={}, backup={}",
                layout.record_count(),
                layout.start(),
                layout.max_address(),
                config.start,
                config.end,
                config.backup
            );
        }

        Ok(Self {
            config,
            layout,
            checksum,
            medium: Mutex::new(medium),
            busy: AtomicBool::new(false),
            errors: AtomicU32::new(0),
        })
    }

    /// Read or write one record.
    ///
    /// Requests longer than the declared size are clamped for reads and for
    /// writes with `truncate`; otherwise such writes fail with
    /// `RecordTooLarge` before any byte is written.
    ///
    /// # Returns
    /// * `Ok(n)` - payload bytes transferred (at most the declared size).
    pub fn transfer(&self, id: RecordId, mut payload: Payload<'_>, truncate: bool) -> FixtabResult<usize> {
        let Some(_claim) = BusyClaim::acquire(&self.busy) else {
            self.count_failure();
            if self.config.diagnostics {
                trace!("[STORE] {} rejected: busy", id);
            }
            return Err(FixtabError::Busy);
        };

        let mut medium = self.medium.lock();
        let medium = &mut *medium;

        // 1. Primary copy
        let primary = self.transfer_copy(medium, id, &mut payload, truncate, Replica::Primary);
        self.account(&primary);

        if !self.layout.backup() {
            return primary;
        }

        // 2. Backup copy
        match payload.direction() {
            Direction::Write => {
                // Written even if the primary failed; the caller sees the primary result.
                let backup = self.transfer_copy(medium, id, &mut payload, truncate, Replica::Backup);
                self.account(&backup);
                primary
            }
            Direction::Read => match primary {
                Ok(n) => Ok(n),
                Err(e) => {
                    if self.config.diagnostics {
                        warn!("[STORE] {} primary copy failed ({}), reading backup", id, e);
                    }
                    let backup = self.transfer_copy(medium, id, &mut payload, truncate, Replica::Backup);
                    self.account(&backup);
                    backup
                }
            },
        }
    }

    /// One pass over a single copy of a record.
    fn transfer_copy(
        &self,
        medium: &mut M,
        id: RecordId,
        payload: &mut Payload<'_>,
        truncate: bool,
        replica: Replica,
    ) -> FixtabResult<usize> {
        let declared = self.layout.declared_size(id).ok_or(FixtabError::UnknownRecord)? as usize;
        let direction = payload.direction();

        let mut size = payload.len();
        if size > declared {
            if direction == Direction::Write && !truncate {
                return Err(FixtabError::RecordTooLarge);
            }
            size = declared;
        }

        let mut address = self.layout.address(id, replica).ok_or(FixtabError::UnknownRecord)?;
        let width = self.layout.checksum();
        let checksummed = width != ChecksumWidth::None;
        let mut acc = 0u16;
        let mut mover = ByteMover { medium, checksum: &self.checksum, layout: &self.layout };

        for i in 0..size {
            let fold = if checksummed { Some(&mut acc) } else { None };
            let moved = match payload {
                Payload::Write(data) => {
                    let mut byte = data[i];
                    mover.transfer(address, &mut byte, Direction::Write, fold)
                }
                Payload::Read(buf) => mover.transfer(address, &mut buf[i], Direction::Read, fold),
            };
            moved.inspect_err(|e| self.trace_byte_error(address, e))?;
            address += 1;
        }

        if !checksummed {
            return Ok(size);
        }

        // Unused tail: keeps the checksum over the full declared size and at a fixed offset.
        for _ in size..declared {
            let mut filler = FILL_BYTE;
            mover
                .transfer(address, &mut filler, direction, Some(&mut acc))
                .inspect_err(|e| self.trace_byte_error(address, e))?;
            address += 1;
        }

        let computed = acc & width.mask();
        let mut stored = computed.to_le_bytes();
        for byte in stored.iter_mut().take(width.bytes() as usize) {
            mover
                .transfer(address, byte, direction, None)
                .inspect_err(|e| self.trace_byte_error(address, e))?;
            address += 1;
        }

        match direction {
            Direction::Write => {
                if self.config.diagnostics {
                    debug!("[STORE] {} {:?} write checksum = 0x{:04X}", id, replica, computed);
                }
            }
            Direction::Read => {
                let stored = u16::from_le_bytes(stored);
                if self.config.diagnostics {
                    debug!(
                        "[STORE] {} {:?} stored checksum = 0x{:04X}, computed = 0x{:04X}",
                        id, replica, stored, computed
                    );
                }
                if stored != computed {
                    return Err(FixtabError::Checksum);
                }
            }
        }

        Ok(size)
    }

    fn account<T>(&self, outcome: &FixtabResult<T>) {
        if outcome.is_err() {
            self.count_failure();
        }
    }

    fn count_failure(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    fn trace_byte_error(&self, address: u32, err: &FixtabError) {
        if self.config.diagnostics {
            trace!("[STORE] byte transfer at {} failed: {}", address, err);
        }
    }

    /// Run `f` against the medium while holding the busy claim.
    /// Fails with `Busy` (without counting an error) if a transfer is in flight.
    pub fn with_medium<R>(&self, f: impl FnOnce(&mut M) -> R) -> FixtabResult<R> {
        let Some(_claim) = BusyClaim::acquire(&self.busy) else {
            return Err(FixtabError::Busy);
        };
        let mut medium = self.medium.lock();
        Ok(f(&mut *medium))
    }
}

impl<M, C> RecordStore<M, C> {
    /// Failed transfer attempts since construction or the last reset.
    /// A backup-mode call can count twice.
    pub fn error_count(&self) -> u32 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn reset_error_count(&self) {
        self.errors.store(0, Ordering::Relaxed);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn checksum(&self) -> &C {
        &self.checksum
    }

    /// Last address used by the table.
    pub fn max_address(&self) -> u32 {
        self.layout.max_address()
    }

    /// Sum of declared record sizes.
    pub fn table_size(&self) -> u32 {
        self.layout.table_size()
    }

    /// Bytes of medium the table occupies.
    pub fn span(&self) -> u32 {
        self.layout.span()
    }

    /// Direct medium access. Exclusive borrow, so no transfer can be in flight.
    pub fn medium_mut(&mut self) -> &mut M {
        self.medium.get_mut()
    }

    pub fn into_medium(self) -> M {
        self.medium.into_inner()
    }
}
