use thiserror::Error;

/// A template-library parse failure. Unlike a single malformed `ATOM` record
/// in a molecule (which is skipped in place), a malformed template record
/// invalidates the whole template it belongs to.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed template record: {line}")]
    MalformedTemplateLine { line: String },
    #[error("unknown single-letter residue code '{code}'")]
    UnknownResidueCode { code: char },
    #[error("unbalanced parentheses in alternates block: {line}")]
    UnbalancedParens { line: String },
    #[error("atom name alternate longer than 4 characters: '{name}'")]
    AtomNameTooLong { name: String },
    #[error("template has no atoms")]
    EmptyTemplate,
}
