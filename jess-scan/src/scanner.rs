use jess_geom::{Annulus, Join, JoinMode, KdTree, Region, Vec3};
use jess_pdb::Atom;
use jess_template::Template;
use log::warn;

use crate::error::ScanError;

/// Minimum radius floor applied to every per-pair distance range after
/// subtracting slack, so a tight template pair never collapses to a
/// zero-radius annulus that would only match exact coincidence.
const MIN_ANNULUS_RADIUS: f64 = 0.5;

/// An active, resumable kd-tree traversal for one template-atom slot: the
/// region it was built with, plus the explicit stack driving it forward one
/// step at a time.
struct SlotQuery {
    region: Box<dyn Region>,
    stack: Vec<usize>,
}

/// Tunable geometric and search-space parameters shared by every slot of a
/// scan; these are policy knobs, not part of the matching invariants.
#[derive(Clone, Copy, Debug)]
pub struct ScanParams {
    pub global_threshold: f64,
    pub max_total_threshold: f64,
    pub ignore_chain: bool,
    pub conservation_cutoff: f64,
}

impl Default for ScanParams {
    fn default() -> Self {
        ScanParams { global_threshold: 0.5, max_total_threshold: 3.0, ignore_chain: false, conservation_cutoff: 0.0 }
    }
}

/// Backtracking enumerator over template-to-molecule atom assignments.
///
/// Holds one candidate set, kd-tree, and (when mid-traversal) active region
/// query per template-atom slot. The working index `k` and every per-slot
/// cursor are explicit fields, not call-stack state, so a scan can be
/// suspended between calls to [`Scanner::next`] and resumed exactly where it
/// left off.
pub struct Scanner<'t, 'm> {
    template: &'t dyn Template,
    molecule_atoms: &'m [Atom],
    params: ScanParams,
    n: usize,
    sets: Vec<Vec<usize>>,
    trees: Vec<KdTree>,
    queries: Vec<Option<SlotQuery>>,
    atom: Vec<Option<usize>>,
    index0: i64,
    k: usize,
    exhausted: bool,
}

impl<'t, 'm> Scanner<'t, 'm> {
    /// Builds candidate sets and a kd-tree per template-atom slot. Fails if
    /// any slot has no molecule atom passing both the conservation cutoff and
    /// the slot's identity predicate.
    pub fn new(
        template: &'t dyn Template,
        molecule_atoms: &'m [Atom],
        params: ScanParams,
    ) -> Result<Scanner<'t, 'm>, ScanError> {
        let n = template.count();
        let mut sets = Vec::with_capacity(n);
        let mut trees = Vec::with_capacity(n);

        for k in 0..n {
            let candidates: Vec<usize> = molecule_atoms
                .iter()
                .enumerate()
                .filter(|(_, a)| a.temp_factor >= params.conservation_cutoff && template.matches(k, a))
                .map(|(i, _)| i)
                .collect();
            if candidates.is_empty() {
                warn!("template atom {k} has no surviving candidates");
                return Err(ScanError::EmptyCandidateSet { template_atom_index: k });
            }
            let positions: Vec<Vec3> = candidates.iter().map(|&i| molecule_atoms[i].pos).collect();
            let tree = KdTree::build(&positions).expect("non-empty candidate set yields a tree");
            trees.push(tree);
            sets.push(candidates);
        }

        let mut atom = vec![None; n];
        atom[0] = Some(sets[0][0]);

        Ok(Scanner {
            template,
            molecule_atoms,
            params,
            n,
            sets,
            trees,
            queries: (0..n).map(|_| None).collect(),
            atom,
            index0: 0,
            k: if n == 1 { n } else { 1 },
            exhausted: false,
        })
    }

    fn placed_tuples(&self, upto: usize) -> Vec<(char, char, i32)> {
        (0..upto)
            .map(|i| {
                let a = &self.molecule_atoms[self.atom[i].unwrap()];
                (a.chain_id1, a.chain_id2, a.res_seq)
            })
            .collect()
    }

    fn build_region(&self, k: usize) -> Box<dyn Region> {
        let mut children: Vec<Box<dyn Region>> = Vec::with_capacity(k);
        for j in 0..k {
            let (min, max) = self.template.range(j, k);
            let mut slack = self.template.dist_weight(j) + self.template.dist_weight(k) + self.params.global_threshold;
            slack = slack.min(self.params.max_total_threshold);
            let min = (min - slack).max(MIN_ANNULUS_RADIUS);
            let max = max + slack;
            let centre = self.molecule_atoms[self.atom[j].unwrap()].pos;
            children.push(Box::new(Annulus::new(centre, min, max)));
        }
        Box::new(Join::new(children, JoinMode::Inner))
    }

    /// Advances the enumeration and returns the next tuple of molecule-atom
    /// indices (one per template slot, in template order) satisfying every
    /// identity, distance, and coherence constraint, or `None` once every
    /// assignment has been produced.
    pub fn next(&mut self) -> Option<Vec<usize>> {
        if self.exhausted {
            return None;
        }
        loop {
            if self.k == self.n {
                let result: Vec<usize> = self.atom.iter().map(|a| a.unwrap()).collect();
                self.k = self.n - 1;
                return Some(result);
            }

            let k = self.k;
            if k == 0 {
                self.index0 += 1;
                if self.index0 as usize >= self.sets[0].len() {
                    self.exhausted = true;
                    return None;
                }
                self.atom[0] = Some(self.sets[0][self.index0 as usize]);
                self.k = 1;
                continue;
            }

            if let Some(q) = self.queries[k].as_mut() {
                match self.trees[k].step(q.region.as_ref(), &mut q.stack) {
                    Some(local) => {
                        let global = self.sets[k][local];
                        let already_used = self.atom[0..k].iter().any(|a| *a == Some(global));
                        self.atom[k] = Some(global);
                        let tuples = self.placed_tuples(k + 1);
                        if !already_used && self.template.check(&tuples, k + 1, self.params.ignore_chain) {
                            self.k += 1;
                        }
                        // else: retry at the same k with the same active query
                    }
                    None => {
                        self.queries[k] = None;
                        self.atom[k] = None;
                        self.k -= 1;
                    }
                }
                continue;
            }

            if self.atom[k - 1].is_none() {
                self.k -= 1;
                continue;
            }
            let region = self.build_region(k);
            let stack = self.trees[k].fresh_stack();
            self.queries[k] = Some(SlotQuery { region, stack });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jess_geom::Vec3;
    use jess_template::{TessAtom, TessTemplate};

    fn atom(name: &str, res_name: &str, chain1: char, chain2: char, res_seq: i32, pos: Vec3) -> Atom {
        Atom {
            serial: 1,
            name: name.to_string(),
            alt_loc: ' ',
            res_name: res_name.to_string(),
            chain_id1: chain1,
            chain_id2: chain2,
            res_seq,
            i_code: ' ',
            pos,
            occupancy: 1.0,
            temp_factor: 1.0,
            seg_id: "____".to_string(),
            element: String::new(),
            charge: 0,
            is_hetero_atom: false,
        }
    }

    fn tess_atom(res_seq: i32, chain1: char, pos: Vec3, names: &[&str], residues: &[&str]) -> TessAtom {
        TessAtom {
            code: 0,
            res_seq,
            chain_id1: chain1,
            chain_id2: '0',
            pos,
            dist_weight: 0.0,
            alt_names: names.iter().map(|s| s.to_string()).collect(),
            alt_residues: residues.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn single_atom_template_matches_the_lone_candidate() {
        let template =
            TessTemplate::new("t".to_string(), vec![tess_atom(1, 'A', Vec3::new(0.0, 0.0, 0.0), &["_CA_"], &["ALA"])]);
        let molecule = vec![atom("_CA_", "ALA", 'A', '0', 1, Vec3::new(1.0, 2.0, 3.0))];
        let mut scanner = Scanner::new(&template, &molecule, ScanParams::default()).unwrap();
        assert_eq!(scanner.next(), Some(vec![0]));
        assert_eq!(scanner.next(), None);
    }

    #[test]
    fn distance_filter_excludes_the_too_far_candidate_until_threshold_widens() {
        let template = TessTemplate::new(
            "t".to_string(),
            vec![
                tess_atom(1, 'A', Vec3::new(0.0, 0.0, 0.0), &["_CA_"], &["ALA"]),
                tess_atom(2, 'A', Vec3::new(5.0, 0.0, 0.0), &["_CA_"], &["ALA"]),
            ],
        );
        let molecule = vec![
            atom("_CA_", "ALA", 'A', '0', 1, Vec3::new(0.0, 0.0, 0.0)),
            atom("_CA_", "ALA", 'A', '0', 2, Vec3::new(5.0, 0.0, 0.0)),
            atom("_CA_", "ALA", 'A', '0', 3, Vec3::new(5.5, 0.0, 0.0)),
        ];

        let mut tight = ScanParams::default();
        tight.global_threshold = 0.3;
        let mut scanner = Scanner::new(&template, &molecule, tight).unwrap();
        let mut hits = Vec::new();
        while let Some(h) = scanner.next() {
            hits.push(h);
        }
        assert!(hits.contains(&vec![0, 1]));
        assert!(hits.iter().all(|h| !h.contains(&2)));

        let mut loose = ScanParams::default();
        loose.global_threshold = 0.6;
        let mut scanner = Scanner::new(&template, &molecule, loose).unwrap();
        let mut hits = Vec::new();
        while let Some(h) = scanner.next() {
            hits.push(h);
        }
        assert!(hits.iter().any(|h| h.contains(&2)));
    }

    #[test]
    fn chain_coherence_is_enforced_unless_ignored() {
        let template = TessTemplate::new(
            "t".to_string(),
            vec![
                tess_atom(1, 'A', Vec3::new(0.0, 0.0, 0.0), &["_CA_"], &["ALA"]),
                tess_atom(2, 'A', Vec3::new(5.0, 0.0, 0.0), &["_CA_"], &["ALA"]),
            ],
        );
        let molecule = vec![
            atom("_CA_", "ALA", 'A', '0', 1, Vec3::new(0.0, 0.0, 0.0)),
            atom("_CA_", "ALA", 'B', '0', 2, Vec3::new(5.0, 0.0, 0.0)),
        ];

        let mut scanner = Scanner::new(&template, &molecule, ScanParams::default()).unwrap();
        assert_eq!(scanner.next(), None);

        let mut ignoring = ScanParams::default();
        ignoring.ignore_chain = true;
        let mut scanner = Scanner::new(&template, &molecule, ignoring).unwrap();
        assert_eq!(scanner.next(), Some(vec![0, 1]));
    }

    #[test]
    fn empty_candidate_set_fails_construction() {
        let template =
            TessTemplate::new("t".to_string(), vec![tess_atom(1, 'A', Vec3::new(0.0, 0.0, 0.0), &["_CA_"], &["ALA"])]);
        let molecule = vec![atom("_CB_", "ALA", 'A', '0', 1, Vec3::new(0.0, 0.0, 0.0))];
        assert!(Scanner::new(&template, &molecule, ScanParams::default()).is_err());
    }
}
