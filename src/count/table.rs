use anyhow::{bail, Result};
use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::barcode::codec::{BarcodeCodec, MAX_BARCODE_LEN};

///////////////////////////////
/// Counter cap. A saturated entry holds a floor, not necessarily the
/// true count; downstream consumers know to read it that way.
pub const MAX_COUNT: u16 = u16::MAX;

///////////////////////////////
/// Longest barcode the dense backend will allocate for. 4^16 u16 slots
/// is already an 8 GiB table; beyond that the sparse backend takes over.
pub const MAX_DENSE_BARCODE_LEN: usize = 16;

///////////////////////////////
/// Storage strategy for the barcode frequency table. The counting logic
/// only sees this interface; dense and sparse backings are swappable.
pub trait CountTable {
    /// Allocate the zeroed table for barcodes of the given length.
    /// Must be called once, before the first increment.
    fn resize(&mut self, barcode_length: usize) -> Result<()>;

    /// Count one barcode. An entry already at MAX_COUNT stays unchanged.
    fn increment(&mut self, barcode: &[u8]);

    /// Count stored for one packed barcode index
    fn get(&self, index: u64) -> u16;

    /// Number of addressable barcode values, 4^barcode_length
    fn n_slots(&self) -> u64;

    /// Observed (index, count) pairs, in index order
    fn snapshot(&self) -> Vec<(u64, u16)>;
}

///////////////////////////////
/// Dense backing: one u16 slot per possible barcode value. This is the
/// default; lookups are a single array access.
pub struct DenseCountTable {
    table: Vec<u16>,
    barcode_length: usize,
}

impl DenseCountTable {
    pub fn new() -> DenseCountTable {
        DenseCountTable {
            table: Vec::new(),
            barcode_length: 0,
        }
    }

    /// Read-only view of the full array, index = packed barcode value
    pub fn counts(&self) -> &[u16] {
        &self.table
    }
}

impl CountTable for DenseCountTable {
    fn resize(&mut self, barcode_length: usize) -> Result<()> {
        if barcode_length > MAX_DENSE_BARCODE_LEN {
            bail!(
                "A dense table for {}bp barcodes does not fit in memory (at most {}bp); use the sparse table instead",
                barcode_length,
                MAX_DENSE_BARCODE_LEN
            );
        }
        self.barcode_length = barcode_length;
        self.table = vec![0u16; 1usize << (2 * barcode_length)];
        Ok(())
    }

    fn increment(&mut self, barcode: &[u8]) {
        let index = BarcodeCodec::encode(barcode) as usize;
        let entry = &mut self.table[index];
        if *entry != MAX_COUNT {
            //avoid counting overflow
            *entry += 1;
        }
    }

    fn get(&self, index: u64) -> u16 {
        self.table[index as usize]
    }

    fn n_slots(&self) -> u64 {
        self.table.len() as u64
    }

    fn snapshot(&self) -> Vec<(u64, u16)> {
        self.table
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(index, &count)| (index as u64, count))
            .collect()
    }
}

///////////////////////////////
/// Sparse backing: hash map keyed by packed barcode value, for barcode
/// lengths whose dense table would not fit in memory. Absent key = zero.
pub struct SparseCountTable {
    table: FxHashMap<u64, u16>,
    barcode_length: usize,
}

impl SparseCountTable {
    pub fn new() -> SparseCountTable {
        SparseCountTable {
            table: FxHashMap::default(),
            barcode_length: 0,
        }
    }
}

impl CountTable for SparseCountTable {
    fn resize(&mut self, barcode_length: usize) -> Result<()> {
        if barcode_length > MAX_BARCODE_LEN {
            bail!(
                "Barcodes of {}bp do not fit the 2-bit packing (at most {}bp)",
                barcode_length,
                MAX_BARCODE_LEN
            );
        }
        self.barcode_length = barcode_length;
        self.table = FxHashMap::default();
        Ok(())
    }

    fn increment(&mut self, barcode: &[u8]) {
        let index = BarcodeCodec::encode(barcode);
        let entry = self.table.entry(index).or_insert(0);
        if *entry != MAX_COUNT {
            //avoid counting overflow
            *entry += 1;
        }
    }

    fn get(&self, index: u64) -> u16 {
        self.table.get(&index).copied().unwrap_or(0)
    }

    fn n_slots(&self) -> u64 {
        1u64 << (2 * self.barcode_length)
    }

    fn snapshot(&self) -> Vec<(u64, u16)> {
        self.table
            .iter()
            .map(|(&index, &count)| (index, count))
            .sorted_by_key(|&(index, _)| index)
            .collect()
    }
}
