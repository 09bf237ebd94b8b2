use std::io::BufRead;

use log::warn;

use crate::atom::Atom;
use crate::error::PDBError;

/// A sequence of atoms read from a single PDB deposit, plus its optional
/// 4-character identifier.
///
/// Atoms keep file order. A molecule is never empty: an input with no `ATOM`/
/// `HETATM` records yields no [`Molecule`] at all rather than an empty one.
#[derive(Clone, Debug)]
pub struct Molecule {
    pub id: Option<String>,
    atoms: Vec<Atom>,
}

impl Molecule {
    pub fn atoms(&self) -> &[Atom] { &self.atoms }

    pub fn len(&self) -> usize { self.atoms.len() }
    pub fn is_empty(&self) -> bool { self.atoms.is_empty() }

    /// Reads a molecule from a buffered byte stream.
    ///
    /// `ATOM`/`HETATM` lines are parsed; a malformed record is rejected and
    /// logged but does not abort the read. Reading stops at the first `ENDMDL`
    /// unless `ignore_endmdl` is set, so only the first model of a multi-model
    /// deposit is kept by default. A `HEADER` line contributes the 4-character
    /// PDB identifier found at columns 63-66.
    ///
    /// Returns `Ok(None)` when the stream yields no atoms.
    pub fn from_reader<R: BufRead>(reader: R, ignore_endmdl: bool) -> Result<Option<Molecule>, PDBError> {
        let mut id = None;
        let mut atoms = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.len() < 4 {
                continue;
            }
            match &line[0..4] {
                "ATOM" => match Atom::from_atom_line(&line) {
                    Ok(a) => atoms.push(a),
                    Err(e) => warn!("skipping malformed ATOM record: {e}"),
                },
                "HETA" if line.starts_with("HETATM") => match Atom::from_atom_line(&line) {
                    Ok(a) => atoms.push(a),
                    Err(e) => warn!("skipping malformed HETATM record: {e}"),
                },
                "HEAD" if line.starts_with("HEADER") => {
                    if line.len() >= 66 {
                        id = Some(line[62..66].trim().to_string());
                    }
                }
                "ENDM" if line.starts_with("ENDMDL") => {
                    if !ignore_endmdl {
                        break;
                    }
                }
                _ => {}
            }
        }

        if atoms.is_empty() {
            return Ok(None);
        }
        Ok(Some(Molecule { id, atoms }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    #[test]
    fn empty_input_yields_no_molecule() {
        let text = "REMARK nothing here\n";
        let m = Molecule::from_reader(BufReader::new(text.as_bytes()), false).unwrap();
        assert!(m.is_none());
    }

    #[test]
    fn stops_at_first_endmdl_by_default() {
        let text = "\
ATOM      1 CA   ALAA0   1       0.000   0.000   0.000  1.00  0.00           C 0
ENDMDL
ATOM      2 CA   ALAA0   2       1.000   0.000   0.000  1.00  0.00           C 0
";
        let m = Molecule::from_reader(BufReader::new(text.as_bytes()), false).unwrap().unwrap();
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn ignore_endmdl_reads_every_model() {
        let text = "\
ATOM      1 CA   ALAA0   1       0.000   0.000   0.000  1.00  0.00           C 0
ENDMDL
ATOM      2 CA   ALAA0   2       1.000   0.000   0.000  1.00  0.00           C 0
";
        let m = Molecule::from_reader(BufReader::new(text.as_bytes()), true).unwrap().unwrap();
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn header_line_contributes_pdb_id() {
        let text = "HEADER    HYDROLASE                               01-JAN-26   1ABC\nATOM      1 CA   ALAA0   1       0.000   0.000   0.000  1.00  0.00           C 0\n";
        let m = Molecule::from_reader(BufReader::new(text.as_bytes()), false).unwrap().unwrap();
        assert_eq!(m.id.as_deref(), Some("1ABC"));
    }
}
