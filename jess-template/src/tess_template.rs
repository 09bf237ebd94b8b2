use std::collections::HashSet;

use jess_geom::Vec3;
use jess_pdb::Atom;

use crate::tess_atom::TessAtom;
use crate::template::Template;

const LOG_A: f64 = -8.5;
const ALPHA: f64 = 2.5;
const BETA: f64 = -0.7;

/// A template built from a sequence of match-coded atom slots: the Tess
/// variant of [`Template`]. Pairwise distances are precomputed once at
/// construction since they never change for the lifetime of the template.
#[derive(Clone, Debug)]
pub struct TessTemplate {
    name: String,
    atoms: Vec<TessAtom>,
    /// Row-major `n*n` symmetric distance matrix, zero diagonal.
    distances: Vec<f64>,
    dim: usize,
}

impl TessTemplate {
    pub fn new(name: String, atoms: Vec<TessAtom>) -> TessTemplate {
        let n = atoms.len();
        let mut distances = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = atoms[i].pos.distance_to(&atoms[j].pos);
                distances[i * n + j] = d;
                distances[j * n + i] = d;
            }
        }
        let dim = atoms.iter().map(|a| a.res_seq).collect::<HashSet<_>>().len();
        TessTemplate { name, atoms, distances, dim }
    }

    pub fn dim(&self) -> usize { self.dim }

    pub fn atoms(&self) -> &[TessAtom] { &self.atoms }
}

impl Template for TessTemplate {
    fn count(&self) -> usize { self.atoms.len() }

    fn matches(&self, k: usize, atom: &Atom) -> bool { self.atoms[k].matches(atom) }

    fn range(&self, i: usize, j: usize) -> (f64, f64) {
        let n = self.atoms.len();
        let d = self.distances[i * n + j];
        (d, d)
    }

    fn check(&self, assigned: &[(char, char, i32)], k: usize, ignore_chain: bool) -> bool {
        if k == 0 {
            return true;
        }
        let newest = assigned[k - 1];
        let new_slot = &self.atoms[k - 1];
        for i in 0..(k - 1) {
            let placed = assigned[i];
            let slot_i = &self.atoms[i];

            let mut mol_chain_delta = if newest.0 == placed.0 && newest.1 == placed.1 { 0 } else { 1 };
            let mut tmpl_chain_delta =
                if new_slot.chain_id1 == slot_i.chain_id1 && new_slot.chain_id2 == slot_i.chain_id2 { 0 } else { 1 };
            if ignore_chain {
                mol_chain_delta = 0;
                tmpl_chain_delta = 0;
            }
            if (mol_chain_delta == 0) != (tmpl_chain_delta == 0) {
                return false;
            }
            if mol_chain_delta != 0 {
                continue;
            }

            let mol_res_delta = if newest.2 == placed.2 { 0 } else { 1 };
            let tmpl_res_delta = if new_slot.res_seq == slot_i.res_seq { 0 } else { 1 };
            if (mol_res_delta == 0) != (tmpl_res_delta == 0) {
                return false;
            }
        }
        true
    }

    fn position(&self, k: usize) -> Vec3 { self.atoms[k].pos }

    fn name(&self) -> &str { &self.name }

    fn log_e(&self, rmsd: f64, n_molecule_atoms: usize) -> f64 {
        LOG_A + ALPHA * rmsd + BETA * (self.dim as f64) + (n_molecule_atoms as f64).ln()
    }

    fn dist_weight(&self, k: usize) -> f64 { self.atoms[k].dist_weight }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(res_seq: i32, chain: char, pos: Vec3) -> TessAtom {
        TessAtom {
            code: 0,
            res_seq,
            chain_id1: chain,
            chain_id2: '0',
            pos,
            dist_weight: 0.0,
            alt_names: vec!["_CA_".to_string()],
            alt_residues: vec!["ALA".to_string()],
        }
    }

    #[test]
    fn distance_matrix_is_symmetric_with_zero_diagonal() {
        let t = TessTemplate::new(
            "t".to_string(),
            vec![slot(1, 'A', Vec3::new(0.0, 0.0, 0.0)), slot(2, 'A', Vec3::new(3.0, 4.0, 0.0))],
        );
        assert_eq!(t.range(0, 0), (0.0, 0.0));
        assert_eq!(t.range(0, 1), (5.0, 5.0));
        assert_eq!(t.range(1, 0), (5.0, 5.0));
    }

    #[test]
    fn dim_counts_distinct_res_seq_values() {
        let t = TessTemplate::new(
            "t".to_string(),
            vec![
                slot(1, 'A', Vec3::new(0.0, 0.0, 0.0)),
                slot(1, 'A', Vec3::new(1.0, 0.0, 0.0)),
                slot(2, 'A', Vec3::new(2.0, 0.0, 0.0)),
            ],
        );
        assert_eq!(t.dim(), 2);
    }

    #[test]
    fn check_rejects_split_chain_not_matching_template_same_chain() {
        let t = TessTemplate::new(
            "t".to_string(),
            vec![slot(1, 'A', Vec3::new(0.0, 0.0, 0.0)), slot(2, 'A', Vec3::new(5.0, 0.0, 0.0))],
        );
        let assigned = [('A', '0', 1), ('B', '0', 2)];
        assert!(!t.check(&assigned, 2, false));
        assert!(t.check(&assigned, 2, true));
    }

    #[test]
    fn check_rejects_res_seq_mismatch_within_same_chain() {
        let t = TessTemplate::new(
            "t".to_string(),
            vec![slot(1, 'A', Vec3::new(0.0, 0.0, 0.0)), slot(1, 'A', Vec3::new(5.0, 0.0, 0.0))],
        );
        let assigned = [('A', '0', 1), ('A', '0', 2)];
        assert!(!t.check(&assigned, 2, false));
    }

    #[test]
    fn log_e_matches_the_closed_form() {
        let t = TessTemplate::new("t".to_string(), vec![slot(1, 'A', Vec3::new(0.0, 0.0, 0.0))]);
        let e = t.log_e(1.0, 100);
        let expected = -8.5 + 2.5 * 1.0 - 0.7 * 1.0 + (100f64).ln();
        assert!((e - expected).abs() < 1e-12);
    }
}
