use thiserror::Error;

/// A record-level parse failure: the offending line is rejected and reported,
/// but the containing stream keeps reading.
#[derive(Debug, Error)]
pub enum PDBError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed ATOM/HETATM record: {line}")]
    MalformedAtomLine { line: String },
    #[error("molecule has no atoms")]
    EmptyMolecule,
}
