//! PDB atom records and molecules: parsing `ATOM`/`HETATM` streams into an
//! in-memory model, and formatting atoms back into PDB-style lines for hit
//! reports.

mod atom;
mod error;
mod molecule;

pub use atom::Atom;
pub use error::PDBError;
pub use molecule::Molecule;
