//! Alignment coverage over target regions.
//!
//! A single streaming pass over a BAM file yields both per-base depth
//! across every BED interval and read counts over arbitrary windows (codon
//! windows, in practice).
//!
//! Depth only counts aligned bases (`M`, `=`, `X`) of reads that are mapped,
//! primary, not QC-failed and not duplicates. Window counts include every
//! mapped read whose reference span overlaps the window.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io;
use std::path::Path;

use noodles::bam;
use noodles::sam::alignment::record::cigar::op::Kind;
use tracing::debug;

use crate::parsing::bed::BedRecord;
use crate::summary::SummaryError;
use crate::utils::math::median;

/// Gene whose codons are laid out on the `cytob` intervals only
const MITOCHONDRIAL: &str = "MT";
const MITOCHONDRIAL_CODING_GENE: &str = "cytob";

/// A 0-based, half-open reference window
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Window {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl Window {
    #[must_use]
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
        }
    }

    /// Window `[pos - 1, pos + 1)` around 1-based `pos`: the called base
    /// and the one after it
    #[must_use]
    pub fn around_base(chrom: impl Into<String>, pos: u64) -> Self {
        Self::new(chrom, pos.saturating_sub(1), pos + 1)
    }

    fn overlaps(&self, start: u64, end: u64) -> bool {
        start < self.end && self.start < end
    }
}

/// Reference positions of each gene's coding bases, in BED order
#[derive(Debug, Clone, Default)]
pub struct CodonMap {
    positions: HashMap<String, Vec<u64>>,
}

impl CodonMap {
    /// Concatenate the positions of every interval per chromosome.
    ///
    /// For the mitochondrial genome only intervals named `cytob` are used
    /// when any are present.
    #[must_use]
    pub fn from_bed(bed: &[BedRecord]) -> Self {
        let has_cytob = bed.iter().any(|r| {
            r.chrom == MITOCHONDRIAL && r.gene.as_deref() == Some(MITOCHONDRIAL_CODING_GENE)
        });

        let mut positions: HashMap<String, Vec<u64>> = HashMap::new();
        for record in bed {
            if has_cytob
                && record.chrom == MITOCHONDRIAL
                && record.gene.as_deref() != Some(MITOCHONDRIAL_CODING_GENE)
            {
                continue;
            }
            positions
                .entry(record.chrom.clone())
                .or_default()
                .extend(record.positions());
        }
        Self { positions }
    }

    /// Window spanning the three bases of 1-based codon `aa_pos` of `gene`
    #[must_use]
    pub fn codon(&self, gene: &str, aa_pos: u32) -> Option<Window> {
        let index = usize::try_from(aa_pos.checked_sub(1)?).ok()?;
        let codon = self.positions.get(gene)?.chunks(3).nth(index)?;
        let first = *codon.first()?;
        let last = *codon.last()?;
        Some(Window::new(gene, first, last + 1))
    }
}

/// Per-base depth across one BED interval
#[derive(Debug, Clone)]
struct IntervalDepth {
    chrom: String,
    start: u64,
    depths: Vec<u32>,
}

impl IntervalDepth {
    fn new(record: &BedRecord) -> Self {
        let len = record.stop.saturating_sub(record.start) + 1;
        Self {
            chrom: record.chrom.clone(),
            start: record.start,
            depths: vec![0; usize::try_from(len).unwrap_or(0)],
        }
    }

    fn end(&self) -> u64 {
        self.start + self.depths.len() as u64
    }

    /// Add one to every position of `[start, end)` inside this interval
    fn add_block(&mut self, start: u64, end: u64) {
        let from = start.max(self.start);
        let to = end.min(self.end());
        for pos in from..to {
            if let Ok(offset) = usize::try_from(pos - self.start) {
                if let Some(depth) = self.depths.get_mut(offset) {
                    *depth = depth.saturating_add(1);
                }
            }
        }
    }
}

/// Aligned reference blocks of a read starting at 0-based `start`, and the
/// end of its reference span
fn aligned_blocks<I>(start: u64, ops: I) -> (Vec<(u64, u64)>, u64)
where
    I: IntoIterator<Item = (Kind, usize)>,
{
    let mut blocks = Vec::new();
    let mut pos = start;
    for (kind, len) in ops {
        let len = len as u64;
        match kind {
            Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch => {
                blocks.push((pos, pos + len));
                pos += len;
            }
            Kind::Deletion | Kind::Skip => pos += len,
            _ => {}
        }
    }
    (blocks, pos)
}

/// Result of one pass over an alignment file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    /// Per-base depth for each BED chromosome, intervals concatenated in BED order
    pub gene_depths: BTreeMap<String, Vec<u32>>,
    /// Overlapping read count per requested window, in request order
    pub window_counts: Vec<u64>,
}

/// Accumulates depth and window counts from aligned reads
#[derive(Debug)]
struct CoverageScan<'a> {
    intervals: Vec<IntervalDepth>,
    windows: &'a [Window],
    window_counts: Vec<u64>,
}

impl<'a> CoverageScan<'a> {
    fn new(bed: &[BedRecord], windows: &'a [Window]) -> Self {
        Self {
            intervals: bed.iter().map(IntervalDepth::new).collect(),
            windows,
            window_counts: vec![0; windows.len()],
        }
    }

    fn add_read(&mut self, chrom: &str, blocks: &[(u64, u64)], span: (u64, u64), counts_depth: bool) {
        for (window, count) in self.windows.iter().zip(self.window_counts.iter_mut()) {
            if window.chrom == chrom && window.overlaps(span.0, span.1) {
                *count += 1;
            }
        }

        if !counts_depth {
            return;
        }
        for interval in self.intervals.iter_mut().filter(|i| i.chrom == chrom) {
            for &(start, end) in blocks {
                interval.add_block(start, end);
            }
        }
    }

    fn finish(self) -> CoverageReport {
        let mut gene_depths: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        for interval in self.intervals {
            gene_depths
                .entry(interval.chrom)
                .or_default()
                .extend(interval.depths);
        }
        CoverageReport {
            gene_depths,
            window_counts: self.window_counts,
        }
    }
}

/// Stream a BAM file once, computing depth over `bed` and counts over `windows`.
///
/// # Errors
///
/// Returns `SummaryError::Alignment` if the file cannot be opened or a record
/// cannot be decoded.
pub fn scan_bam(path: &Path, bed: &[BedRecord], windows: &[Window]) -> Result<CoverageReport, SummaryError> {
    let wrap = |source: io::Error| SummaryError::Alignment {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = File::open(path).map(bam::io::Reader::new).map_err(wrap)?;
    let header = reader.read_header().map_err(wrap)?;
    let names: Vec<String> = header
        .reference_sequences()
        .keys()
        .map(ToString::to_string)
        .collect();

    let mut scan = CoverageScan::new(bed, windows);
    let mut reads = 0u64;

    for result in reader.records() {
        let record = result.map_err(wrap)?;
        let flags = record.flags();
        if flags.is_unmapped() {
            continue;
        }

        let Some(id) = record.reference_sequence_id().transpose().map_err(wrap)? else {
            continue;
        };
        let Some(chrom) = names.get(id) else {
            continue;
        };
        let Some(start) = record.alignment_start().transpose().map_err(wrap)? else {
            continue;
        };
        let start = (start.get() - 1) as u64;

        let ops = record
            .cigar()
            .iter()
            .map(|op| op.map(|op| (op.kind(), op.len())))
            .collect::<io::Result<Vec<_>>>()
            .map_err(wrap)?;
        let (blocks, end) = aligned_blocks(start, ops);

        let counts_depth = !(flags.is_secondary() || flags.is_qc_fail() || flags.is_duplicate());
        scan.add_read(chrom, &blocks, (start, end), counts_depth);
        reads += 1;
    }

    debug!(file = %path.display(), reads, "Scanned alignments");
    Ok(scan.finish())
}

/// Whether each gene's median depth reaches `min_depth`
#[must_use]
pub fn depth_pass(gene_depths: &BTreeMap<String, Vec<u32>>, min_depth: f64) -> BTreeMap<String, bool> {
    gene_depths
        .iter()
        .map(|(gene, depths)| {
            let passed = median(depths).is_some_and(|m| m >= min_depth);
            (gene.clone(), passed)
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::bed::parse_bed_text;

    fn bed(text: &str) -> Vec<BedRecord> {
        parse_bed_text(&text.replace(' ', "\t")).unwrap()
    }

    #[test]
    fn test_codon_spans_interval_boundary() {
        // Exon 1 holds positions 100..=103, exon 2 starts at 200
        let map = CodonMap::from_bed(&bed("PfDHFR 100 103 exon1\nPfDHFR 200 210 exon2\n"));

        assert_eq!(map.codon("PfDHFR", 1), Some(Window::new("PfDHFR", 100, 103)));
        assert_eq!(map.codon("PfDHFR", 2), Some(Window::new("PfDHFR", 103, 202)));
        assert_eq!(map.codon("PfDHFR", 0), None);
        assert_eq!(map.codon("PfDHFR", 100), None);
        assert_eq!(map.codon("PfCRT", 1), None);
    }

    #[test]
    fn test_mitochondrial_codons_use_cytob() {
        let map = CodonMap::from_bed(&bed("MT 0 50 cox3\nMT 500 520 cytob\n"));
        assert_eq!(map.codon("MT", 1), Some(Window::new("MT", 500, 503)));
    }

    #[test]
    fn test_aligned_blocks() {
        let ops = vec![
            (Kind::SoftClip, 5),
            (Kind::Match, 10),
            (Kind::Insertion, 2),
            (Kind::Match, 5),
            (Kind::Deletion, 3),
            (Kind::SequenceMatch, 4),
        ];
        let (blocks, end) = aligned_blocks(100, ops);
        assert_eq!(blocks, vec![(100, 110), (110, 115), (118, 122)]);
        assert_eq!(end, 122);
    }

    #[test]
    fn test_scan_accumulates_depth_and_windows() {
        let records = bed("PfCRT 10 14\nPfCRT 20 21\n");
        let windows = vec![Window::new("PfCRT", 12, 15), Window::around_base("PfCRT", 30)];
        let mut scan = CoverageScan::new(&records, &windows);

        scan.add_read("PfCRT", &[(8, 13)], (8, 13), true);
        scan.add_read("PfCRT", &[(12, 22)], (12, 22), true);
        // Duplicate: counted in windows only
        scan.add_read("PfCRT", &[(12, 22)], (12, 22), false);
        scan.add_read("PfMDR1", &[(0, 50)], (0, 50), true);

        let report = scan.finish();
        assert_eq!(report.gene_depths["PfCRT"], vec![1, 1, 2, 1, 1, 1, 1]);
        assert_eq!(report.window_counts, vec![3, 0]);
        assert!(!report.gene_depths.contains_key("PfMDR1"));
    }

    #[test]
    fn test_window_around_base_covers_next_base() {
        let window = Window::around_base("PfCRT", 30);
        assert_eq!(window, Window::new("PfCRT", 29, 31));

        // Reads ending on base 30, or starting on base 31 (1-based), overlap
        assert!(window.overlaps(20, 30));
        assert!(window.overlaps(30, 40));
        assert!(!window.overlaps(31, 40));
        assert!(!window.overlaps(10, 29));

        assert_eq!(Window::around_base("PfCRT", 0), Window::new("PfCRT", 0, 1));
    }

    #[test]
    fn test_scan_bam_filters_flags() {
        use noodles::sam::alignment::record::Flags;
        use testing::{write_bam, TestRead};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output_sorted_RG.bam");
        let (dhfr, crt) = (0, 1);
        write_bam(
            &path,
            &[("PfDHFR", 1000), ("PfCRT", 1000)],
            &[
                TestRead::new(crt, 9, &[(Kind::Match, 5)]),
                TestRead::new(crt, 13, &[(Kind::Match, 3), (Kind::Deletion, 2), (Kind::Match, 5)]),
                TestRead::new(crt, 13, &[(Kind::Match, 3), (Kind::Deletion, 2), (Kind::Match, 5)])
                    .flagged(Flags::DUPLICATE),
                TestRead::new(crt, 11, &[(Kind::Match, 2)]).flagged(Flags::SECONDARY),
                TestRead::new(crt, 11, &[(Kind::Match, 2)]).flagged(Flags::QC_FAIL),
                TestRead::new(crt, 13, &[(Kind::Match, 5)]).flagged(Flags::UNMAPPED),
                TestRead::new(dhfr, 1, &[(Kind::SoftClip, 2), (Kind::Match, 10)]),
                TestRead::new(dhfr, 21, &[(Kind::Match, 5)]),
            ],
        );

        let records = bed("PfCRT 10 14\n");
        let windows = vec![
            Window::new("PfCRT", 12, 15),
            Window::around_base("PfCRT", 22),
            Window::around_base("PfDHFR", 20),
            Window::new("PfK13", 0, 100),
        ];
        let report = scan_bam(&path, &records, &windows).unwrap();

        // Secondary, QC-fail, duplicate and unmapped reads add no depth
        assert_eq!(report.gene_depths["PfCRT"], vec![1, 1, 2, 1, 1]);
        assert!(!report.gene_depths.contains_key("PfDHFR"));
        // Windows count every mapped read, duplicates included
        assert_eq!(report.window_counts, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_depth_pass_uses_median() {
        let mut depths = BTreeMap::new();
        depths.insert("PfCRT".to_string(), vec![0, 10, 50]);
        depths.insert("PfK13".to_string(), vec![0, 9, 50]);
        depths.insert("PfMDR1".to_string(), vec![]);

        let pass = depth_pass(&depths, 10.0);
        assert!(pass["PfCRT"]);
        assert!(!pass["PfK13"]);
        assert!(!pass["PfMDR1"]);
    }

    #[test]
    fn test_missing_bam() {
        let result = scan_bam(Path::new("/nonexistent/output_sorted_RG.bam"), &[], &[]);
        assert!(matches!(result, Err(SummaryError::Alignment { .. })));
    }
}
