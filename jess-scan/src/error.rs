use thiserror::Error;

/// A scanner could not be built for a given (template, molecule) pair.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("template atom {template_atom_index} has no candidate molecule atoms")]
    EmptyCandidateSet { template_atom_index: usize },
}
