use jess_geom::Vec3;
use jess_pdb::Atom;

/// One template atom slot: a match code selecting the identity predicate
/// family, the expected sequence/chain context, a reference position, a
/// per-atom distance slack, and the alternate names/residues the slot
/// accepts.
#[derive(Clone, Debug)]
pub struct TessAtom {
    pub code: i32,
    pub res_seq: i32,
    pub chain_id1: char,
    pub chain_id2: char,
    pub pos: Vec3,
    pub dist_weight: f64,
    /// 4-character, underscore-normalized alternates (`"_CA_"`, `"_CB_"`, ...).
    pub alt_names: Vec<String>,
    /// 3-letter alternates (`"ALA"`, `"SER"`, ...).
    pub alt_residues: Vec<String>,
}

fn element_char(name: &str) -> char {
    let b = name.as_bytes();
    if b[0] == b'_' { b[1] as char } else { b[0] as char }
}

fn same_position_chars(a: &str, b: &str) -> bool {
    let ab = a.as_bytes();
    let bb = b.as_bytes();
    if ab[0] == b'_' || bb[0] == b'_' {
        ab[2] == bb[2]
    } else {
        ab[1] == bb[1] && ab[2] == bb[2]
    }
}

impl TessAtom {
    fn residue_ok(&self, atom: &Atom) -> bool {
        self.alt_residues.is_empty() || self.alt_residues.iter().any(|r| r == &atom.res_name)
    }

    fn name_ok(&self, atom: &Atom) -> bool {
        self.alt_names.iter().any(|n| n == &atom.name)
    }

    fn same_atom_type(&self, atom: &Atom) -> bool {
        self.alt_names.iter().any(|n| element_char(n) == element_char(&atom.name))
    }

    fn same_position(&self, atom: &Atom) -> bool {
        self.alt_names.iter().any(|n| same_position_chars(n, &atom.name))
    }

    /// Identity predicate for this slot, dispatched on `code` per the match
    /// table: 0/-1 exact name+residue, 1-8 progressively looser atom-class
    /// predicates with a residue check, 100-107 the same atom-class
    /// predicates without the residue check.
    pub fn matches(&self, atom: &Atom) -> bool {
        match self.code {
            0 | -1 => self.name_ok(atom) && self.residue_ok(atom),
            1 => !atom.is_carbon() && !atom.is_main_chain_name() && !atom.is_hydrogen() && self.residue_ok(atom),
            2 => !atom.is_carbon() && !atom.is_hydrogen() && self.residue_ok(atom),
            3 => !atom.is_hydrogen() && self.same_atom_type(atom) && self.residue_ok(atom),
            4 => atom.is_main_chain_name() && !atom.is_carbon() && !atom.is_hydrogen() && self.residue_ok(atom),
            5 => atom.is_main_chain_name() && !atom.is_hydrogen() && self.residue_ok(atom),
            6 => !atom.is_main_chain_name() && !atom.is_hydrogen() && self.residue_ok(atom),
            7 => !atom.is_hydrogen() && self.residue_ok(atom),
            8 => !atom.is_hydrogen() && self.same_position(atom) && self.residue_ok(atom),
            100 => self.name_ok(atom),
            101 => !atom.is_carbon() && !atom.is_main_chain_name() && !atom.is_hydrogen(),
            102 => !atom.is_carbon() && !atom.is_hydrogen(),
            103 => !atom.is_hydrogen() && self.same_atom_type(atom),
            104 => atom.is_main_chain_name() && !atom.is_carbon() && !atom.is_hydrogen(),
            105 => atom.is_main_chain_name() && !atom.is_hydrogen(),
            106 => !atom.is_main_chain_name() && !atom.is_hydrogen(),
            107 => !atom.is_hydrogen(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jess_geom::Vec3 as V;

    fn atom(name: &str, res_name: &str) -> Atom {
        Atom {
            serial: 1,
            name: name.to_string(),
            alt_loc: ' ',
            res_name: res_name.to_string(),
            chain_id1: 'A',
            chain_id2: '0',
            res_seq: 1,
            i_code: ' ',
            pos: V::new(0.0, 0.0, 0.0),
            occupancy: 1.0,
            temp_factor: 0.0,
            seg_id: "____".to_string(),
            element: String::new(),
            charge: 0,
            is_hetero_atom: false,
        }
    }

    fn slot(code: i32, alt_names: &[&str], alt_residues: &[&str]) -> TessAtom {
        TessAtom {
            code,
            res_seq: 1,
            chain_id1: 'A',
            chain_id2: '0',
            pos: V::new(0.0, 0.0, 0.0),
            dist_weight: 0.0,
            alt_names: alt_names.iter().map(|s| s.to_string()).collect(),
            alt_residues: alt_residues.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn code_zero_requires_exact_name_and_residue() {
        let s = slot(0, &["_CA_"], &["ALA"]);
        assert!(s.matches(&atom("_CA_", "ALA")));
        assert!(!s.matches(&atom("_CB_", "ALA")));
        assert!(!s.matches(&atom("_CA_", "SER")));
    }

    #[test]
    fn code_one_excludes_carbon_main_chain_and_hydrogen() {
        let s = slot(1, &["_CB_"], &["SER"]);
        assert!(s.matches(&atom("_OG_", "SER")));
        assert!(!s.matches(&atom("_CB_", "SER")));
        assert!(!s.matches(&atom("_CA_", "SER")));
        assert!(!s.matches(&atom("_HB_", "SER")));
    }

    #[test]
    fn code_hundred_drops_the_residue_check() {
        let s = slot(100, &["_CA_"], &["ALA"]);
        assert!(s.matches(&atom("_CA_", "GLY")));
    }

    #[test]
    fn code_eight_matches_same_position_across_residues() {
        let s = slot(8, &["_CB_"], &["SER", "CYS"]);
        assert!(s.matches(&atom("_CB_", "CYS")));
        assert!(!s.matches(&atom("_CA_", "CYS")));
    }
}
