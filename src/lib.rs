pub mod barcode;
pub mod command;
pub mod count;
pub mod fileformat;

pub use barcode::{Mate, ReadStructure, StructureError};
pub use count::{CountTable, DenseCountTable, SparseCountTable};
