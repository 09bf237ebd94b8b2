use jess_geom::Vec3;
use jess_pdb::Atom;

/// The capability set every concrete template variant must provide to the
/// scanner. Modeled as a trait rather than a struct-of-function-pointers:
/// the scanner only ever needs dynamic dispatch over "some template", never
/// to downcast back to a concrete variant.
pub trait Template {
    /// Number of template-atom slots.
    fn count(&self) -> usize;
    /// Identity predicate for slot `k`.
    fn matches(&self, k: usize, atom: &Atom) -> bool;
    /// Allowed distance range `(min, max)` between slots `i` and `j`.
    fn range(&self, i: usize, j: usize) -> (f64, f64);
    /// Cross-atom coherence check over already-placed slots `0..k`, applied
    /// after slot `k - 1` was just assigned.
    fn check(&self, assigned: &[(char, char, i32)], k: usize, ignore_chain: bool) -> bool;
    /// Reference position of slot `k` in the template frame.
    fn position(&self, k: usize) -> Vec3;
    /// Symbolic template name.
    fn name(&self) -> &str;
    /// Heuristic log-expectation of a spurious hit.
    fn log_e(&self, rmsd: f64, n_molecule_atoms: usize) -> f64;
    /// Per-slot distance slack contributed to every pair involving `k`.
    fn dist_weight(&self, k: usize) -> f64;
}
