//! Parser for annotated amplicon VCF files.
//!
//! The variant caller writes codon-level annotation into INFO:
//! `ExonNumber`, `CodonPos`, `RefCodon`, `AltCodon`, `RefAA`, `AltAA`,
//! `AlFreq` (fraction) and `Found` (number of callers agreeing).
//!
//! Data lines are parsed by hand; only the first ALT allele and the first
//! value of each INFO key are kept.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use crate::parsing::fastq::ParseError;
use crate::utils::io::open_text;

/// A parsed VCF data line
#[derive(Debug, Clone, PartialEq)]
pub struct VcfRecord {
    pub chrom: String,
    pub pos: u64,
    pub reference: String,
    /// First ALT allele, `.` when the site has none
    pub alt: String,
    pub qual: Option<f64>,
    info: HashMap<String, String>,
}

impl VcfRecord {
    /// First value of an INFO key. Flags yield an empty string.
    #[must_use]
    pub fn info(&self, key: &str) -> Option<&str> {
        self.info.get(key).map(String::as_str)
    }

    /// INFO value that is present and not the literal `NA`
    #[must_use]
    pub fn info_present(&self, key: &str) -> Option<&str> {
        self.info(key).filter(|v| *v != "NA" && !v.is_empty())
    }

    #[must_use]
    pub fn depth(&self) -> u64 {
        self.info("DP").and_then(|v| v.parse().ok()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_intronic(&self) -> bool {
        self.info("ExonNumber") == Some("Intron")
    }
}

/// All samples and data lines of a VCF file
#[derive(Debug, Clone, Default)]
pub struct VcfFile {
    pub samples: Vec<String>,
    pub records: Vec<VcfRecord>,
}

/// Parse a plain or gzip-compressed VCF file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read or
/// `ParseError::InvalidFormat` if a data line is malformed.
pub fn parse_vcf_file(path: &Path) -> Result<VcfFile, ParseError> {
    let mut vcf = VcfFile::default();

    for (i, line) in open_text(path)?.lines().enumerate() {
        let line = line?;
        if line.starts_with("##") || line.trim().is_empty() {
            continue;
        }
        if let Some(columns) = line.strip_prefix("#CHROM") {
            vcf.samples = columns.split('\t').skip(9).map(str::to_string).collect();
            continue;
        }

        // Line numbers in errors are 1-based for user friendliness
        let record = parse_data_line(&line).map_err(|msg| {
            ParseError::InvalidFormat(format!("{}:{}: {msg}", path.display(), i + 1))
        })?;
        vcf.records.push(record);
    }

    Ok(vcf)
}

/// Parse one tab-separated data line
///
/// # Errors
///
/// Returns a message describing the first problem found.
pub fn parse_data_line(line: &str) -> Result<VcfRecord, String> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 8 {
        return Err(format!("expected at least 8 columns, found {}", fields.len()));
    }

    let pos = fields[1]
        .parse()
        .map_err(|_| format!("invalid POS '{}'", fields[1]))?;

    let qual = match fields[5] {
        "." => None,
        q => Some(q.parse().map_err(|_| format!("invalid QUAL '{q}'"))?),
    };

    let alt = fields[4].split(',').next().unwrap_or(".").to_string();

    Ok(VcfRecord {
        chrom: fields[0].to_string(),
        pos,
        reference: fields[3].to_string(),
        alt,
        qual,
        info: parse_info(fields[7]),
    })
}

fn parse_info(text: &str) -> HashMap<String, String> {
    if text == "." {
        return HashMap::new();
    }
    text.split(';')
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) => (
                key.to_string(),
                value.split(',').next().unwrap_or_default().to_string(),
            ),
            None => (entry.to_string(), String::new()),
        })
        .collect()
}
