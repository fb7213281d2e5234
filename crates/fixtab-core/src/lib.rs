#![no_std]
#[cfg(feature = "std")]
extern crate std;

/// Success return code. Every other code is negative.
pub const RW_OK: i32 = 0;

/// Medium implementations may report their own failure codes below this value.
pub const DEVICE_CODE_THRESHOLD: i32 = -20;

/// Record identity: the index of a record in the configured table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub u32);

impl RecordId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for RecordId {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Width of an unsigned integer field (address, record size, record id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Width {
    U8,
    U16,
    U32,
}

impl Width {
    /// Largest value representable at this width.
    pub const fn max(self) -> u32 {
        match self {
            Width::U8 => u8::MAX as u32,
            Width::U16 => u16::MAX as u32,
            Width::U32 => u32::MAX,
        }
    }

    /// Narrowest width able to hold `value`.
    pub const fn fitting(value: u32) -> Self {
        if value <= u8::MAX as u32 {
            Width::U8
        } else if value <= u16::MAX as u32 {
            Width::U16
        } else {
            Width::U32
        }
    }
}

pub type FixtabResult<T> = Result<T, FixtabError>;

/// Outcome of a failed record operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtabError {
    UnknownRecord,
    RecordTooLarge,
    AddressOutOfRange,
    Checksum,
    /// Reserved for structural table validation. Not raised by the transfer protocol.
    RecordTableCorrupt,
    LowLevelWrite,
    LowLevelRead,
    /// Implementation-specific medium failure. The code is below `DEVICE_CODE_THRESHOLD`.
    Device(i32),
    Busy,
}

impl FixtabError {
    /// Numeric return code of this error.
    pub const fn code(self) -> i32 {
        match self {
            FixtabError::UnknownRecord => -1,
            FixtabError::RecordTooLarge => -2,
            FixtabError::AddressOutOfRange => -3,
            FixtabError::Checksum => -4,
            FixtabError::RecordTableCorrupt => -5,
            FixtabError::LowLevelWrite => -10,
            FixtabError::LowLevelRead => -11,
            FixtabError::Busy => -12,
            FixtabError::Device(code) => code,
        }
    }

    /// Inverse of [`FixtabError::code`]. `Ok(())` for `RW_OK`, `None` for codes
    /// that are neither reserved nor in the device range.
    pub const fn from_code(code: i32) -> Option<FixtabResult<()>> {
        let err = match code {
            RW_OK => return Some(Ok(())),
            -1 => FixtabError::UnknownRecord,
            -2 => FixtabError::RecordTooLarge,
            -3 => FixtabError::AddressOutOfRange,
            -4 => FixtabError::Checksum,
            -5 => FixtabError::RecordTableCorrupt,
            -10 => FixtabError::LowLevelWrite,
            -11 => FixtabError::LowLevelRead,
            -12 => FixtabError::Busy,
            c if c < DEVICE_CODE_THRESHOLD => FixtabError::Device(c),
            _ => return None,
        };
        Some(Err(err))
    }

    /// A device failure, or the generic `fallback` kind when `code` falls
    /// outside the device range.
    pub const fn device(code: i32, fallback: FixtabError) -> Self {
        if code < DEVICE_CODE_THRESHOLD {
            FixtabError::Device(code)
        } else {
            fallback
        }
    }

    pub const fn describe(self) -> &'static str {
        match self {
            FixtabError::UnknownRecord => "record id not in table",
            FixtabError::RecordTooLarge => "data larger than declared record size",
            FixtabError::AddressOutOfRange => "address out of range",
            FixtabError::Checksum => "checksum mismatch",
            FixtabError::RecordTableCorrupt => "record table corrupt",
            FixtabError::LowLevelWrite => "low level write failed",
            FixtabError::LowLevelRead => "low level read failed",
            FixtabError::Device(_) => "device specific failure",
            FixtabError::Busy => "store busy, try later",
        }
    }
}

impl core::fmt::Display for FixtabError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FixtabError::Device(code) => write!(f, "{} ({})", self.describe(), code),
            _ => write!(f, "{} ({})", self.describe(), self.code()),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FixtabError {}

/// Rejections raised while constructing a store. A store that fails these
/// checks is never usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    EmptyTable,
    /// Every record is zero-sized and unchecksummed, so the table occupies no bytes.
    EmptyFootprint,
    /// `start` lies after `end`.
    InvertedRange { start: u32, end: u32 },
    /// `end` does not fit the configured address width.
    AddressWidth { end: u32, width: Width },
    /// `end` lies beyond what the medium can address.
    MediumCapacity { end: u32, capacity: u32 },
    /// The packed table needs more space than `[start, end]` offers.
    TableOverflow { max_address: u64, end: u32 },
    /// A declared size does not fit the configured size width.
    RecordSize { id: RecordId, size: u32, width: Width },
    /// More records than the record id width can number.
    RecordCount { count: usize, width: Width },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::EmptyTable => write!(f, "record table is empty"),
            ConfigError::EmptyFootprint => write!(f, "record table occupies no bytes"),
            ConfigError::InvertedRange { start, end } => {
                write!(f, "start address {start} is after end address {end}")
            }
            ConfigError::AddressWidth { end, width } => {
                write!(f, "end address {end} does not fit {width:?}")
            }
            ConfigError::MediumCapacity { end, capacity } => {
                write!(f, "end address {end} beyond medium capacity {capacity}")
            }
            ConfigError::TableOverflow { max_address, end } => {
                write!(f, "table needs address {max_address}, range ends at {end}")
            }
            ConfigError::RecordSize { id, size, width } => {
                write!(f, "record {id} size {size} does not fit {width:?}")
            }
            ConfigError::RecordCount { count, width } => {
                write!(f, "{count} records cannot be numbered with {width:?}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
