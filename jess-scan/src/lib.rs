//! The backtracking scanner and the query façade built on top of it: given a
//! template and a molecule, enumerate every atom tuple satisfying the
//! template's identity, distance, and coherence constraints, then gate each
//! on RMSD after an on-demand rigid superposition.

mod error;
mod query;
mod scanner;

pub use error::ScanError;
pub use query::{Hit, Query, TemplateList};
pub use scanner::{ScanParams, Scanner};
