//! Parser for BED files describing amplicon target regions.
//!
//! Columns: chrom, start (0-based), stop, and an optional name used as the
//! gene label. The stop coordinate is treated as inclusive, matching the
//! way the amplicon panels are written.

use std::io::BufRead;
use std::path::Path;

use crate::parsing::fastq::ParseError;
use crate::utils::io::open_text;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedRecord {
    pub chrom: String,
    pub start: u64,
    pub stop: u64,
    pub gene: Option<String>,
}

impl BedRecord {
    /// 0-based positions covered by the interval, stop included
    pub fn positions(&self) -> impl Iterator<Item = u64> {
        self.start..=self.stop
    }
}

/// Parse a BED file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read or
/// `ParseError::InvalidFormat` for short lines or bad coordinates.
pub fn parse_bed_file(path: &Path) -> Result<Vec<BedRecord>, ParseError> {
    let mut records = Vec::new();
    for (i, line) in open_text(path)?.lines().enumerate() {
        let line = line?;
        if let Some(record) = parse_bed_line(&line, i + 1)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Parse BED text
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for short lines or bad coordinates.
pub fn parse_bed_text(text: &str) -> Result<Vec<BedRecord>, ParseError> {
    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(record) = parse_bed_line(line, i + 1)? {
            records.push(record);
        }
    }
    Ok(records)
}

fn parse_bed_line(line: &str, line_num: usize) -> Result<Option<BedRecord>, ParseError> {
    let line = line.trim_end();
    if line.is_empty()
        || line.starts_with('#')
        || line.starts_with("track")
        || line.starts_with("browser")
    {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 3 {
        return Err(ParseError::InvalidFormat(format!(
            "BED line {line_num} has fewer than 3 fields"
        )));
    }

    let coord = |value: &str| {
        value.trim().parse::<u64>().map_err(|_| {
            ParseError::InvalidFormat(format!(
                "Invalid coordinate on BED line {line_num}: '{value}'"
            ))
        })
    };
    let start = coord(fields[1])?;
    let stop = coord(fields[2])?;
    if stop < start {
        return Err(ParseError::InvalidFormat(format!(
            "BED line {line_num} ends before it starts"
        )));
    }

    Ok(Some(BedRecord {
        chrom: fields[0].to_string(),
        start,
        stop,
        gene: fields
            .get(3)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bed_text() {
        let bed = "track name=amplicons
PfDHFR\t0\t5\tdhfr
PfDHFR\t10\t12
# comment
MT\t100\t108\tcytob
";
        let records = parse_bed_text(bed).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].gene.as_deref(), Some("dhfr"));
        assert_eq!(records[1].gene, None);
        assert_eq!(records[1].positions().collect::<Vec<_>>(), vec![10, 11, 12]);
        assert_eq!(records[2].chrom, "MT");
    }

    #[test]
    fn test_bad_coordinates() {
        assert!(parse_bed_text("chr1\tx\t10\n").is_err());
        assert!(parse_bed_text("chr1\t10\n").is_err());
        assert!(parse_bed_text("chr1\t10\t5\n").is_err());
    }
}
