pub mod count;

pub use count::CountCMD;
