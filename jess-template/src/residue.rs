use crate::error::TemplateError;

/// Expands a single-letter residue code into its 3-letter name, per the
/// 20 standard amino acids plus `X` for an unknown/non-standard residue.
pub fn expand_one_letter_code(code: char) -> Result<&'static str, TemplateError> {
    let name = match code.to_ascii_uppercase() {
        'A' => "ALA",
        'R' => "ARG",
        'N' => "ASN",
        'D' => "ASP",
        'C' => "CYS",
        'Q' => "GLN",
        'E' => "GLU",
        'G' => "GLY",
        'H' => "HIS",
        'I' => "ILE",
        'L' => "LEU",
        'K' => "LYS",
        'M' => "MET",
        'F' => "PHE",
        'P' => "PRO",
        'S' => "SER",
        'T' => "THR",
        'W' => "TRP",
        'Y' => "TYR",
        'V' => "VAL",
        'X' => "UNK",
        other => return Err(TemplateError::UnknownResidueCode { code: other }),
    };
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alanine_expands_to_ala() {
        assert_eq!(expand_one_letter_code('A').unwrap(), "ALA");
    }

    #[test]
    fn lowercase_code_is_accepted() {
        assert_eq!(expand_one_letter_code('g').unwrap(), "GLY");
    }

    #[test]
    fn unknown_placeholder_expands_to_unk() {
        assert_eq!(expand_one_letter_code('X').unwrap(), "UNK");
    }

    #[test]
    fn unrecognised_code_is_an_error() {
        assert!(expand_one_letter_code('Z').is_err());
    }
}
