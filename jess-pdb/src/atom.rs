use jess_geom::Vec3;

use crate::error::PDBError;

/// One `ATOM`/`HETATM` record.
///
/// `temp_factor` is reused outside its crystallographic meaning in two places
/// downstream: a template atom stores its per-atom distance slack there, and a
/// molecule atom may carry a per-atom conservation score there for filtering
/// candidates before the scanner ever sees them.
#[derive(Clone, Debug, PartialEq)]
pub struct Atom {
    pub serial: i32,
    /// 4 characters, internal spaces normalized to `_` (`" CA "` → `"_CA_"`).
    pub name: String,
    pub alt_loc: char,
    pub res_name: String,
    pub chain_id1: char,
    /// Defaults to `'0'` when the source column is blank.
    pub chain_id2: char,
    pub res_seq: i32,
    pub i_code: char,
    pub pos: Vec3,
    pub occupancy: f64,
    pub temp_factor: f64,
    pub seg_id: String,
    pub element: String,
    pub charge: i32,
    pub is_hetero_atom: bool,
}

fn normalize_name(raw: &str) -> String {
    let mut s: String = raw.chars().take(4).collect();
    while s.len() < 4 {
        s.push(' ');
    }
    s.replace(' ', "_")
}

fn denormalize_name(name: &str) -> String { name.replace('_', " ") }

fn parse_field<T: std::str::FromStr>(s: &str) -> Option<T> { s.trim().parse::<T>().ok() }

impl Atom {
    /// Parses an `ATOM` or `HETATM` line per the column layout in §6 of the
    /// interface spec: `ATOM  <serial:5><name:5><altLoc:1><resName:3><chain1:1><chain2:1><resSeq:4><iCode:4><x:8><y:8><z:8><occ:6><temp:6>`,
    /// with `segID`/`element`/`charge` trailing when present.
    pub fn from_atom_line(line: &str) -> Result<Atom, PDBError> {
        if line.len() < 66 {
            return Err(PDBError::MalformedAtomLine { line: line.to_string() });
        }
        let record = &line[0..6];
        let is_hetero_atom = record.trim_start().starts_with("HETATM");

        let serial = parse_field(&line[6..11]).ok_or_else(|| PDBError::MalformedAtomLine { line: line.to_string() })?;
        let name = normalize_name(&line[12..16]);
        let alt_loc = line[16..17].chars().next().unwrap_or(' ');
        let res_name = line[17..20].trim().to_string();

        let c1 = line[20..21].chars().next().unwrap_or(' ');
        let c2_raw = line[21..22].chars().next().unwrap_or(' ');
        let chain_id2 = if c2_raw == ' ' { '0' } else { c2_raw };

        let res_seq = parse_field(&line[22..26]).ok_or_else(|| PDBError::MalformedAtomLine { line: line.to_string() })?;
        let i_code = line[26..27].chars().next().unwrap_or(' ');

        let x = parse_field(&line[30..38]).ok_or_else(|| PDBError::MalformedAtomLine { line: line.to_string() })?;
        let y = parse_field(&line[38..46]).ok_or_else(|| PDBError::MalformedAtomLine { line: line.to_string() })?;
        let z = parse_field(&line[46..54]).ok_or_else(|| PDBError::MalformedAtomLine { line: line.to_string() })?;

        let occupancy = parse_field(&line[54..60]).unwrap_or(1.0);
        let temp_factor = parse_field(&line[60..66]).unwrap_or(0.0);

        let seg_id = if line.len() >= 76 { normalize_name(&line[72..76]) } else { "____".to_string() };
        let element = if line.len() >= 78 { line[76..78].trim().to_string() } else { String::new() };
        let charge = if line.len() >= 80 { parse_field(&line[78..80]).unwrap_or(0) } else { 0 };

        Ok(Atom {
            serial,
            name,
            alt_loc,
            res_name,
            chain_id1: c1,
            chain_id2,
            res_seq,
            i_code,
            pos: Vec3::new(x, y, z),
            occupancy,
            temp_factor,
            seg_id,
            element,
            charge,
            is_hetero_atom,
        })
    }

    /// Formats this atom back into a PDB-style `ATOM`/`HETATM` line, converting
    /// underscores back to spaces in text fields.
    pub fn to_atom_line(&self) -> String {
        let record = if self.is_hetero_atom { "HETATM" } else { "ATOM  " };
        format!(
            "{}{:5} {}{}{:<3}{}{}{:4}{}   {:8.3}{:8.3}{:8.3}{:6.2}{:6.2}      {}{:>2}{:2}",
            record,
            self.serial,
            denormalize_name(&self.name),
            self.alt_loc,
            self.res_name,
            self.chain_id1,
            self.chain_id2,
            self.res_seq,
            self.i_code,
            self.pos.x,
            self.pos.y,
            self.pos.z,
            self.occupancy,
            self.temp_factor,
            denormalize_name(&self.seg_id),
            self.element,
            self.charge,
        )
    }

    /// `true` for the three exact main-chain names (already normalized).
    pub fn is_main_chain_name(&self) -> bool {
        matches!(self.name.as_str(), "_CA_" | "_N__" | "_O__")
    }

    /// `true` when the atom is a carbon by name convention: `name[0]='_'`, `name[1]='C'`.
    pub fn is_carbon(&self) -> bool {
        self.name.as_bytes()[0] == b'_' && self.name.as_bytes().get(1) == Some(&b'C')
    }

    /// `true` when the atom is a hydrogen by name convention: `name[0]='_'`, `name[1]='H'`.
    pub fn is_hydrogen(&self) -> bool {
        self.name.as_bytes()[0] == b'_' && self.name.as_bytes().get(1) == Some(&b'H')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_serial_name_resname_chain_seq_and_coords() {
        let line = "ATOM    320  CA  PHEA0  43      16.101   9.057  19.587  1.00 18.18      SEG1 C 0";
        let a = Atom::from_atom_line(line).unwrap();
        assert_eq!(a.serial, 320);
        assert_eq!(a.name, "_CA_");
        assert_eq!(a.res_name, "PHE");
        assert_eq!(a.chain_id1, 'A');
        assert_eq!(a.chain_id2, '0');
        assert_eq!(a.res_seq, 43);
        assert!((a.pos.x - 16.101).abs() < 1e-9);
        assert!((a.pos.z - 19.587).abs() < 1e-9);
        let back = a.to_atom_line();
        assert_eq!(&back[0..30], &line[0..30]);
    }

    #[test]
    fn blank_second_chain_column_defaults_to_zero() {
        let line = "ATOM      1 N    ALAA    1      11.104  13.207  10.101  1.00  0.00           N 0";
        let a = Atom::from_atom_line(line).unwrap();
        assert_eq!(a.chain_id2, '0');
    }

    #[test]
    fn hetatm_prefix_sets_hetero_flag() {
        let line = "HETATM    1 ZN   ZN A0   1       0.000   0.000   0.000  1.00  0.00          ZN 0";
        let a = Atom::from_atom_line(line).unwrap();
        assert!(a.is_hetero_atom);
    }

    #[test]
    fn short_line_is_rejected() {
        assert!(Atom::from_atom_line("ATOM  ").is_err());
    }
}
