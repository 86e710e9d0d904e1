pub mod pipeline;
pub mod table;

pub use pipeline::{count_reads, PipelineStats};
pub use table::{CountTable, DenseCountTable, SparseCountTable, MAX_COUNT, MAX_DENSE_BARCODE_LEN};
