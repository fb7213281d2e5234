use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use fixtab_core::{FixtabResult, RecordId};
use fixtab_hal::{Checksum, NvMemory};

use crate::engine::{Payload, RecordStore};

/// A value stored at its natural width, little-endian.
pub trait FixedValue: Sized {
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;

    fn to_bytes(self) -> Self::Bytes;
    fn from_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_fixed_value {
    ($($t:ty => $n:literal),* $(,)?) => {
        $(
            impl FixedValue for $t {
                type Bytes = [u8; $n];

                fn to_bytes(self) -> Self::Bytes {
                    self.to_le_bytes()
                }

                fn from_bytes(bytes: Self::Bytes) -> Self {
                    <$t>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_fixed_value!(
    u8 => 1, i8 => 1,
    u16 => 2, i16 => 2,
    u32 => 4, i32 => 4, f32 => 4,
    u64 => 8, i64 => 8, f64 => 8,
);

impl FixedValue for bool {
    type Bytes = [u8; 1];

    fn to_bytes(self) -> Self::Bytes {
        [self as u8]
    }

    fn from_bytes(bytes: Self::Bytes) -> Self {
        bytes[0] != 0
    }
}

/// Length of the string in `bytes`: up to the first NUL, at most `limit`.
pub(crate) fn bounded_strlen(bytes: &[u8], limit: usize) -> usize {
    bytes
        .iter()
        .take(limit)
        .position(|&b| b == 0)
        .unwrap_or_else(|| bytes.len().min(limit))
}

impl<M: NvMemory, C: Checksum> RecordStore<M, C> {
    /// Store `value` at its natural width. Fails with `RecordTooLarge` if the
    /// record is declared narrower than the type.
    pub fn write_value<T: FixedValue>(&self, id: RecordId, value: T) -> FixtabResult<()> {
        let bytes = value.to_bytes();
        self.transfer(id, Payload::Write(bytes.as_ref()), false).map(|_| ())
    }

    pub fn read_value<T: FixedValue>(&self, id: RecordId) -> FixtabResult<T> {
        let mut bytes = T::Bytes::default();
        self.transfer(id, Payload::Read(bytes.as_mut()), false)?;
        Ok(T::from_bytes(bytes))
    }

    /// Store raw bytes. Longer than the declared size is an error.
    pub fn write_raw(&self, id: RecordId, data: &[u8]) -> FixtabResult<usize> {
        self.transfer(id, Payload::Write(data), false)
    }

    /// Read into `buf`, at most the declared size. Returns the bytes read.
    pub fn read_raw(&self, id: RecordId, buf: &mut [u8]) -> FixtabResult<usize> {
        self.transfer(id, Payload::Read(buf), false)
    }

    /// Store `text` with its NUL terminator, truncated to the declared size.
    /// When the text fills the record exactly, no terminator is stored.
    ///
    /// # Returns
    /// * `Ok(n)` - bytes stored, terminator included.
    pub fn write_str(&self, id: RecordId, text: &str) -> FixtabResult<usize> {
        let limit = self.config().size_width.max() as usize;
        let len = bounded_strlen(text.as_bytes(), limit);

        let mut terminated = Vec::with_capacity(len + 1);
        terminated.extend_from_slice(&text.as_bytes()[..len]);
        terminated.push(0);

        self.transfer(id, Payload::Write(&terminated), true)
    }

    /// Read a NUL-terminated string into `buf`, at most `buf.len() - 1` bytes.
    ///
    /// `buf[0]` and `buf[buf.len() - 1]` are zeroed before the transfer, so
    /// the buffer is terminated whether or not the read succeeds.
    ///
    /// # Returns
    /// * `Ok(n)` - string length, terminator excluded.
    pub fn read_str_into(&self, id: RecordId, buf: &mut [u8]) -> FixtabResult<usize> {
        let Some(max_len) = buf.len().checked_sub(1) else {
            // No room for even a terminator; still verify the record.
            return self.transfer(id, Payload::Read(buf), true).map(|_| 0);
        };

        buf[0] = 0;
        buf[max_len] = 0;
        let read = self.transfer(id, Payload::Read(&mut buf[..max_len]), true)?;
        if read < max_len {
            buf[read] = 0;
        }
        Ok(bounded_strlen(&buf[..read], read))
    }

    /// Read a whole string record. Invalid UTF-8 is replaced.
    pub fn read_string(&self, id: RecordId) -> FixtabResult<String> {
        // Unknown ids fall through to the transfer, which rejects and counts them.
        let declared = self.layout().declared_size(id).unwrap_or(0) as usize;
        let mut buf = vec![0u8; declared + 1];
        let len = self.read_str_into(id, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf[..len]).into_owned())
    }
}
