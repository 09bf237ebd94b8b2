use jess_geom::Superposition;
use jess_pdb::Atom;
use jess_template::Template;
use log::debug;

use crate::scanner::{ScanParams, Scanner};

/// Ordered list of templates to scan a molecule against.
///
/// `insert` prepends, so the templates the caller added last are scanned
/// first; this mirrors the reference engine's insertion order and must be
/// preserved by callers that care about reproducing its result ordering.
pub struct TemplateList<'t> {
    templates: Vec<&'t dyn Template>,
}

impl<'t> Default for TemplateList<'t> {
    fn default() -> Self { TemplateList::new() }
}

impl<'t> TemplateList<'t> {
    pub fn new() -> TemplateList<'t> { TemplateList { templates: Vec::new() } }

    pub fn insert(&mut self, template: &'t dyn Template) { self.templates.insert(0, template); }

    pub fn len(&self) -> usize { self.templates.len() }
    pub fn is_empty(&self) -> bool { self.templates.is_empty() }
}

/// One accepted candidate: the matched molecule-atom indices in template
/// slot order, the template it matched, and the superposition aligning the
/// molecule positions onto the template frame.
pub struct Hit<'t> {
    pub template: &'t dyn Template,
    pub assignment: Vec<usize>,
    pub superposition: Superposition,
}

impl<'t> Hit<'t> {
    pub fn rmsd(&mut self) -> f64 { self.superposition.rmsd() }
    pub fn determinant(&mut self) -> f64 { self.superposition.rotation().det() }
    pub fn log_e(&mut self, n_molecule_atoms: usize) -> f64 {
        let rmsd = self.superposition.rmsd();
        self.template.log_e(rmsd, n_molecule_atoms)
    }
}

/// Drives a [`Scanner`] across every template in a [`TemplateList`] against
/// one molecule, lazily building a [`Superposition`] for each accepted tuple
/// and gating on an RMSD threshold.
pub struct Query<'t, 'm> {
    templates: &'t TemplateList<'t>,
    cursor: usize,
    molecule_atoms: &'m [Atom],
    params: ScanParams,
    t_rmsd: f64,
    max_hits: usize,
    hits_emitted: usize,
    current: Option<(&'t dyn Template, Scanner<'t, 'm>)>,
}

impl<'t, 'm> Query<'t, 'm> {
    pub fn new(
        templates: &'t TemplateList<'t>,
        molecule_atoms: &'m [Atom],
        params: ScanParams,
        t_rmsd: f64,
        max_hits: usize,
    ) -> Query<'t, 'm> {
        Query { templates, cursor: 0, molecule_atoms, params, t_rmsd, max_hits, hits_emitted: 0, current: None }
    }

    fn advance_to_next_scanner(&mut self) -> bool {
        while self.cursor < self.templates.templates.len() {
            let template = self.templates.templates[self.cursor];
            self.cursor += 1;
            match Scanner::new(template, self.molecule_atoms, self.params) {
                Ok(scanner) => {
                    self.current = Some((template, scanner));
                    return true;
                }
                Err(e) => debug!("skipping template '{}': {e}", template.name()),
            }
        }
        self.current = None;
        false
    }

    /// Returns the next accepted hit (RMSD at or below the threshold), or
    /// `None` once every template has been exhausted or the emission cap is
    /// reached.
    pub fn next_hit(&mut self) -> Option<Hit<'t>> {
        loop {
            if self.hits_emitted >= self.max_hits {
                return None;
            }
            if self.current.is_none() && !self.advance_to_next_scanner() {
                return None;
            }
            let (template, scanner) = self.current.as_mut().unwrap();
            match scanner.next() {
                Some(assignment) => {
                    let mut superposition = Superposition::new();
                    for (k, &global_idx) in assignment.iter().enumerate() {
                        superposition.append(self.molecule_atoms[global_idx].pos, template.position(k));
                    }
                    if superposition.rmsd() <= self.t_rmsd {
                        self.hits_emitted += 1;
                        return Some(Hit { template: *template, assignment, superposition });
                    }
                }
                None => {
                    self.current = None;
                }
            }
        }
    }
}
