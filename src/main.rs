use std::env;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};

use jess_geom::Superposition;
use jess_io::{open_file, out_writer};
use jess_pdb::{Atom, Molecule};
use jess_scan::{Query, ScanParams, TemplateList};
use jess_template::TessTemplate;

#[derive(Parser, Debug)]
#[clap(name = "jess")]
#[clap(version = "0.1")]
#[clap(about = "Searches protein structures for 3D arrangements of atoms matching geometric templates", long_about = None)]
struct Args {
    /// template library file
    #[clap(short, long)]
    templates: String,
    /// RMSD threshold for a hit to be reported
    #[clap(short = 'r', long, default_value_t = 2.0)]
    t_rmsd: f64,
    /// distance tolerance added to every pairwise range
    #[clap(short = 'd', long, default_value_t = 0.5)]
    global_threshold: f64,
    /// cap on per-pair slack after per-atom weights
    #[clap(short = 'm', long, default_value_t = 3.0)]
    max_threshold: f64,
    /// ignore chain identity in the n-ary coherence check
    #[clap(short = 'g', long, default_value_t = false)]
    ignore_chain: bool,
    /// drop molecule atoms with tempFactor below this cutoff
    #[clap(short = 'c', long, default_value_t = 0.0)]
    conservation: f64,
    /// emission cap per (molecule, template list) pair
    #[clap(short = 'e', long, default_value_t = 1000)]
    max_hits: usize,
    /// read every model in a multi-model PDB entry, not just the first
    #[clap(short = 'i', long, default_value_t = false)]
    ignore_endmdl: bool,
    /// report hit coordinates in the molecule frame instead of the template frame
    #[clap(short = 'x', long, default_value_t = false)]
    no_transform: bool,
    /// output file, "-" or "stdout" for standard output
    #[clap(short, long, default_value = "stdout")]
    output: String,
    /// raise log verbosity to debug
    #[clap(short, long, default_value_t = false)]
    verbose: bool,
    /// PDB files to scan
    #[clap(required = true)]
    pdb_files: Vec<String>,
}

/// Formats one accepted hit as a `REMARK` summary line followed by one
/// `ATOM` line per template slot, terminated by `ENDMDL`.
///
/// When `transform` is set, molecule coordinates are mapped into the
/// template frame via the hit's superposition; otherwise the molecule's
/// own coordinates are reported unchanged.
fn format_hit(
    molecule_id: &str,
    template_name: &str,
    rmsd: f64,
    det: f64,
    log_e: f64,
    assignment: &[usize],
    molecule_atoms: &[Atom],
    superposition: &mut Superposition,
    transform: bool,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "REMARK {} {:.3} {} Det= {:.3} log(E)~ {:.3}\n",
        molecule_id, rmsd, template_name, det, log_e
    ));
    for &global_idx in assignment {
        let source = &molecule_atoms[global_idx];
        if transform {
            let mapped = superposition.transform(&source.pos);
            let mut a = source.clone();
            a.pos = mapped;
            out.push_str(&a.to_atom_line());
        } else {
            out.push_str(&source.to_atom_line());
        }
        out.push('\n');
    }
    out.push_str("ENDMDL\n");
    out
}

fn run(args: &Args) -> Result<usize, Box<dyn std::error::Error>> {
    let reader = open_file(&args.templates)?;
    let templates = TessTemplate::read_library(reader)?;
    info!("loaded {} template(s) from {}", templates.len(), args.templates);

    let mut list = TemplateList::new();
    for t in &templates {
        list.insert(t);
    }

    let params = ScanParams {
        global_threshold: args.global_threshold,
        max_total_threshold: args.max_threshold,
        ignore_chain: args.ignore_chain,
        conservation_cutoff: args.conservation,
    };

    let mut writer = out_writer(&args.output, false);
    let mut total_hits = 0usize;

    for fname in &args.pdb_files {
        let reader = open_file(fname)?;
        let molecule = match Molecule::from_reader(reader, args.ignore_endmdl)? {
            Some(m) => m,
            None => {
                warn!("{fname} contains no atom records, skipping");
                continue;
            }
        };
        let molecule_id = molecule.id.clone().unwrap_or_else(|| fname.clone());
        info!("scanning {} ({} atoms)", molecule_id, molecule.len());

        let mut query = Query::new(&list, molecule.atoms(), params, args.t_rmsd, args.max_hits);
        while let Some(mut hit) = query.next_hit() {
            let rmsd = hit.rmsd();
            let det = hit.determinant();
            let log_e = hit.log_e(molecule.len());
            let text = format_hit(
                &molecule_id,
                hit.template.name(),
                rmsd,
                det,
                log_e,
                &hit.assignment,
                molecule.atoms(),
                &mut hit.superposition,
                !args.no_transform,
            );
            writer.write_all(text.as_bytes())?;
            total_hits += 1;
        }
    }

    writer.flush()?;
    Ok(total_hits)
}

fn main() -> ExitCode {
    let args = Args::parse();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", if args.verbose { "debug" } else { "info" });
    }
    env_logger::init();

    match run(&args) {
        Ok(n) => {
            info!("{n} hit(s) reported");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
