//! Buffered input/output helpers shared by the jess crates.
//!
//! A molecule stream may come from a plain or gzip-compressed PDB file, or from
//! stdin when used in a pipeline. These functions centralize that dispatch so
//! neither the parser nor the driver has to special-case it.

mod utils;

pub use utils::{open_file, out_writer};
