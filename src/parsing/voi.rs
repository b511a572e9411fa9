use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::parsing::fastq::ParseError;

/// A curated amino-acid change, e.g. `PfDHFR:N51I`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantOfInterest {
    pub gene: String,
    /// Change as written in the table, e.g. `N51I`
    pub snp: String,
    pub ref_aa: String,
    /// Codon number; `None` if the SNP text carries no digits
    pub aa_pos: Option<u32>,
    pub alt_aa: String,
}

impl VariantOfInterest {
    /// Table key `Gene:SNP`, shared with variant-call keys
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.gene, self.snp)
    }
}

/// Parse a variant-of-interest table. The delimiter is a comma for `.csv`
/// files and a tab otherwise.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` if the `Gene`/`SNP` columns are missing or a
/// SNP cannot be parsed.
pub fn parse_voi_file(path: &Path) -> Result<Vec<VariantOfInterest>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    parse_voi_text(&content, if is_csv { ',' } else { '\t' })
}

/// Parse variant-of-interest text with a header naming `Gene` and `SNP`.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the header lacks the required
/// columns, a row is short, or a SNP cannot be parsed.
pub fn parse_voi_text(text: &str, delimiter: char) -> Result<Vec<VariantOfInterest>, ParseError> {
    let snp_regex = Regex::new(r"^(?P<ref>[A-Za-z]?)(?P<pos>[0-9]*)(?P<alt>[A-Za-z]?)$")
        .map_err(|e| ParseError::InvalidFormat(e.to_string()))?;

    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'));

    let (_, header) = lines
        .next()
        .ok_or_else(|| ParseError::InvalidFormat("Variant table is empty".to_string()))?;
    let columns: Vec<String> = header
        .split(delimiter)
        .map(|c| c.trim().to_lowercase())
        .collect();
    let column = |name: &str| {
        columns.iter().position(|c| c == name).ok_or_else(|| {
            ParseError::InvalidFormat(format!("Variant table has no '{name}' column"))
        })
    };
    let gene_col = column("gene")?;
    let snp_col = column("snp")?;

    let mut variants = Vec::new();
    for (i, line) in lines {
        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;
        let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
        let (Some(gene), Some(snp)) = (fields.get(gene_col), fields.get(snp_col)) else {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} is missing the gene or SNP column"
            )));
        };

        let caps = snp_regex.captures(snp).ok_or_else(|| {
            ParseError::InvalidFormat(format!("Invalid SNP on line {line_num}: '{snp}'"))
        })?;
        let aa_pos = match &caps["pos"] {
            "" => None,
            digits => Some(digits.parse().map_err(|_| {
                ParseError::InvalidFormat(format!("Invalid codon on line {line_num}: '{snp}'"))
            })?),
        };

        variants.push(VariantOfInterest {
            gene: (*gene).to_string(),
            snp: (*snp).to_string(),
            ref_aa: caps["ref"].to_string(),
            aa_pos,
            alt_aa: caps["alt"].to_string(),
        });
    }

    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_voi_text() {
        let table = "Gene\tSNP\tDrug
PfDHFR\tN51I\tpyrimethamine
PfCRT\tK76T\tchloroquine
";
        let voi = parse_voi_text(table, '\t').unwrap();
        assert_eq!(voi.len(), 2);
        assert_eq!(voi[0].key(), "PfDHFR:N51I");
        assert_eq!(voi[0].ref_aa, "N");
        assert_eq!(voi[0].aa_pos, Some(51));
        assert_eq!(voi[0].alt_aa, "I");
        assert_eq!(voi[1].gene, "PfCRT");
    }

    #[test]
    fn test_parse_voi_csv_any_column_order() {
        let table = "snp,gene\nS108N,PfDHFR\n";
        let voi = parse_voi_text(table, ',').unwrap();
        assert_eq!(voi[0].key(), "PfDHFR:S108N");
        assert_eq!(voi[0].aa_pos, Some(108));
    }

    #[test]
    fn test_missing_columns() {
        assert!(parse_voi_text("Gene\tChange\nPfCRT\tK76T\n", '\t').is_err());
        assert!(parse_voi_text("", '\t').is_err());
    }

    #[test]
    fn test_invalid_snp() {
        let err = parse_voi_text("Gene\tSNP\nPfCRT\tK76T-ish\n", '\t').unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
