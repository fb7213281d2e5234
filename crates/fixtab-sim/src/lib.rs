//! RAM-backed EEPROM simulator for host builds, tests and the demo binary.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fixtab_core::FixtabError;
use fixtab_hal::NvMemory;

/// Value of an erased EEPROM cell.
pub const ERASED: u8 = 0xFF;

struct ReadNoise {
    rate: f64,
    rng: StdRng,
}

/// Simulated byte-addressable EEPROM.
pub struct SimEeprom {
    cells: Vec<u8>,
    write_faults: BTreeMap<u32, FixtabError>,
    read_faults: BTreeMap<u32, FixtabError>,
    noise: Option<ReadNoise>,
    /// `WouldBlock` answers given before each write completes.
    write_cycle: u32,
    pending: u32,
    wear: Vec<u32>,
    reads: u64,
    writes: u64,
}

impl SimEeprom {
    /// Erased memory of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self::from_image(vec![ERASED; capacity])
    }

    pub fn from_image(cells: Vec<u8>) -> Self {
        let len = cells.len();
        Self {
            cells,
            write_faults: BTreeMap::new(),
            read_faults: BTreeMap::new(),
            noise: None,
            write_cycle: 0,
            pending: 0,
            wear: vec![0; len],
            reads: 0,
            writes: 0,
        }
    }

    /// Load a raw image file. A missing file yields erased memory.
    pub fn load(path: impl AsRef<Path>, capacity: usize) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("[SIM] {} not found, starting erased", path.display());
            return Ok(Self::new(capacity));
        }
        let image = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        if image.len() != capacity {
            bail!(
                "image {} holds {} bytes, expected {}",
                path.display(),
                image.len(),
                capacity
            );
        }
        debug!("[SIM] loaded {} bytes from {}", image.len(), path.display());
        Ok(Self::from_image(image))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        fs::write(path, &self.cells).with_context(|| format!("writing {}", path.display()))?;
        debug!("[SIM] saved {} bytes to {}", self.cells.len(), path.display());
        Ok(())
    }

    /// Every write completes only after `cycles` polls answered with `WouldBlock`.
    pub fn with_write_cycle(mut self, cycles: u32) -> Self {
        self.write_cycle = cycles;
        self
    }

    /// Fail each read with probability `rate`, deterministically from `seed`.
    pub fn with_read_noise(mut self, rate: f64, seed: u64) -> Self {
        self.noise = Some(ReadNoise { rate: rate.clamp(0.0, 1.0), rng: StdRng::seed_from_u64(seed) });
        self
    }

    pub fn fail_write_at(&mut self, address: u32, error: FixtabError) {
        self.write_faults.insert(address, error);
    }

    pub fn fail_read_at(&mut self, address: u32, error: FixtabError) {
        self.read_faults.insert(address, error);
    }

    pub fn clear_faults(&mut self) {
        self.write_faults.clear();
        self.read_faults.clear();
        self.noise = None;
    }

    /// Raw cell value, bypassing faults and counters.
    pub fn peek(&self, address: u32) -> u8 {
        self.cells[address as usize]
    }

    pub fn poke(&mut self, address: u32, value: u8) {
        self.cells[address as usize] = value;
    }

    /// Flip the bits of `mask` in one cell.
    pub fn corrupt(&mut self, address: u32, mask: u8) {
        self.cells[address as usize] ^= mask;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Completed reads and writes since construction.
    pub fn op_counts(&self) -> (u64, u64) {
        (self.reads, self.writes)
    }

    /// Completed writes to one cell.
    pub fn wear(&self, address: u32) -> u32 {
        self.wear.get(address as usize).copied().unwrap_or(0)
    }

    /// Hex rendering of `[start, end]`, sixteen cells per line.
    pub fn dump(&self, start: u32, end: u32) -> String {
        let mut out = String::new();
        if self.cells.is_empty() {
            return out;
        }
        let end = end.min(self.cells.len() as u32 - 1);
        let mut line_open = false;
        for address in start..=end {
            if !line_open || address % 16 == 0 {
                if line_open {
                    out.push('\n');
                }
                let _ = write!(out, "{:04X}:", address);
                line_open = true;
            }
            let _ = write!(out, " {:02X}", self.cells[address as usize]);
        }
        if line_open {
            out.push('\n');
        }
        out
    }

    fn in_range(&self, address: u32) -> bool {
        (address as usize) < self.cells.len()
    }
}

impl NvMemory for SimEeprom {
    fn capacity(&self) -> u32 {
        u32::try_from(self.cells.len()).unwrap_or(u32::MAX)
    }

    fn write_byte(&mut self, address: u32, byte: u8) -> nb::Result<(), FixtabError> {
        if !self.in_range(address) {
            return Err(nb::Error::Other(FixtabError::LowLevelWrite));
        }
        if let Some(&err) = self.write_faults.get(&address) {
            trace!("[SIM] injected write fault at {}", address);
            return Err(nb::Error::Other(err));
        }
        if self.pending < self.write_cycle {
            self.pending += 1;
            return Err(nb::Error::WouldBlock);
        }
        self.pending = 0;
        self.cells[address as usize] = byte;
        self.wear[address as usize] += 1;
        self.writes += 1;
        Ok(())
    }

    fn read_byte(&mut self, address: u32) -> nb::Result<u8, FixtabError> {
        if !self.in_range(address) {
            return Err(nb::Error::Other(FixtabError::LowLevelRead));
        }
        if let Some(&err) = self.read_faults.get(&address) {
            trace!("[SIM] injected read fault at {}", address);
            return Err(nb::Error::Other(err));
        }
        if let Some(noise) = self.noise.as_mut() {
            if noise.rng.gen_bool(noise.rate) {
                return Err(nb::Error::Other(FixtabError::LowLevelRead));
            }
        }
        self.reads += 1;
        Ok(self.cells[address as usize])
    }
}
