pub mod codec;
pub mod extract;
pub mod presets;
pub mod structure;

pub use codec::BarcodeCodec;
pub use extract::extract_barcode;
pub use presets::Platform;
pub use structure::{Mate, ReadStructure, Segment, StructureError, StructureParser};
