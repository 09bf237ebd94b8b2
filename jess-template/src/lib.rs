//! The template model: a polymorphic contract over per-atom identity
//! predicates, pairwise distance ranges, and cross-atom coherence checks,
//! plus the Tess concrete variant and its record parser.

mod error;
mod parser;
mod residue;
mod template;
mod tess_atom;
mod tess_template;

pub use error::TemplateError;
pub use residue::expand_one_letter_code;
pub use template::Template;
pub use tess_atom::TessAtom;
pub use tess_template::TessTemplate;
