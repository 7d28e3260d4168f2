//! Byte frequency counting, the single statistics pass before encoding.

use std::collections::BTreeMap;
use std::io::Read;

/// Occurrence counts for the byte values present in a source.
///
/// Only bytes that occur are stored. Iteration is in ascending byte order,
/// which fixes the order leaves enter the tree builder's queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<u8, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        let mut freq = [0u64; 256];
        for &b in data {
            freq[b as usize] += 1;
        }
        Self::from_counts(&freq)
    }

    /// Scan `input` to exhaustion, one byte at a time.
    pub fn from_reader<R: Read>(input: R) -> std::io::Result<Self> {
        let mut freq = [0u64; 256];
        for byte in input.bytes() {
            freq[byte? as usize] += 1;
        }
        Ok(Self::from_counts(&freq))
    }

    fn from_counts(freq: &[u64; 256]) -> Self {
        let counts = freq
            .iter()
            .enumerate()
            .filter(|&(_, &f)| f > 0)
            .map(|(i, &f)| (i as u8, f))
            .collect();
        Self { counts }
    }

    /// Add `count` occurrences of `byte`.
    pub fn add(&mut self, byte: u8, count: u64) {
        if count > 0 {
            *self.counts.entry(byte).or_insert(0) += count;
        }
    }

    pub fn get(&self, byte: u8) -> u64 {
        self.counts.get(&byte).copied().unwrap_or(0)
    }

    /// Number of distinct byte values.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, i.e. the length of the scanned source.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts.iter().map(|(&b, &f)| (b, f))
    }
}

impl FromIterator<(u8, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (u8, u64)>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for (byte, count) in iter {
            table.add(byte, count);
        }
        table
    }
}
