//! Summaries of per-sample variant calls and alignment coverage.
//!
//! The summarize pass expects a pipeline output directory with one
//! subdirectory per sample:
//!
//! ```text
//! <out>/
//!   S01_ACGT-TTGA/
//!     S01_ACGT-TTGA_variants_merged_annotated.vcf
//!     output_sorted_RG.bam
//!   S02_.../
//! ```
//!
//! Sample names drop everything from the first `_<barcode>-<barcode>` token.
//!
//! | Table | Rows | Columns | Cells |
//! |-------|------|---------|-------|
//! | `variants_of_interest_af.tsv` | variant of interest | sample | allele frequency (%) |
//! | `variants_of_interest_dp.tsv` | variant of interest | sample | reads over the codon |
//! | `novel_variants_af.tsv` | verified novel call | sample | allele frequency (%) |
//! | `intronic_variants.tsv` | intronic call | sample | allele frequency (%) |
//! | `variant_stats.tsv` | sample | counts | |
//! | `depth_pass.tsv` | gene | sample | 1 if median depth passes |

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::parsing::bed::{parse_bed_file, BedRecord};
use crate::parsing::fastq::ParseError;
use crate::parsing::vcf::parse_vcf_file;
use crate::parsing::voi::parse_voi_file;

pub mod coverage;
pub mod pivot;
pub mod stats;
pub mod variants;

use coverage::{depth_pass, scan_bam, CodonMap, Window};
use pivot::PivotTable;
use stats::VariantStats;
use variants::{intron_table, novel_calls, reportable_calls, variant_table, ReportableCall, SampleVcf, VariantCall};

/// Median depth a gene needs to pass
pub const DEFAULT_MIN_DEPTH: f64 = 10.0;

const VCF_PATTERN: &str = "*/*_variants_merged_annotated.vcf";
const BAM_PATTERN: &str = "*/output_sorted_RG.bam";
const BARCODE: &str = "_[ATGC]*-[ATGC]*";

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read alignments from {}: {source}", path.display())]
    Alignment { path: PathBuf, source: io::Error },

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to walk output directory: {0}")]
    Walk(#[from] glob::GlobError),

    #[error("Invalid built-in pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid field: {0}")]
    InvalidField(String),
}

/// Inputs of the summarize pass
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    pub bed: PathBuf,
    pub voi: PathBuf,
    pub out_dir: PathBuf,
    pub min_depth: f64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            bed: PathBuf::new(),
            voi: PathBuf::new(),
            out_dir: PathBuf::new(),
            min_depth: DEFAULT_MIN_DEPTH,
        }
    }
}

impl SummaryConfig {
    #[must_use]
    pub fn new(bed: impl Into<PathBuf>, voi: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            bed: bed.into(),
            voi: voi.into(),
            out_dir: out_dir.into(),
            ..Self::default()
        }
    }
}

/// Everything the summarize pass produces
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub reportable: Vec<ReportableCall>,
    pub novel: Vec<VariantCall>,
    pub intronic: Vec<VariantCall>,
    pub stats: BTreeMap<String, VariantStats>,
    /// Sample to gene to pass/fail
    pub depth_pass: BTreeMap<String, BTreeMap<String, bool>>,
}

/// Strips sequencing barcodes from sample and directory names
#[derive(Debug, Clone)]
struct SampleNames {
    barcode: Regex,
}

impl SampleNames {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            barcode: Regex::new(BARCODE)?,
        })
    }

    fn strip(&self, name: &str) -> String {
        self.barcode.split(name).next().unwrap_or(name).to_string()
    }
}

fn find(out_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, SummaryError> {
    let pattern = format!("{}/{pattern}", glob::Pattern::escape(&out_dir.to_string_lossy()));
    let mut paths = glob::glob(&pattern)?.collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}

fn parent_dir_name(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Load every sample's annotated VCF below `out_dir`
fn load_vcfs(out_dir: &Path, names: &SampleNames) -> Result<Vec<SampleVcf>, SummaryError> {
    let mut vcfs = Vec::new();
    for path in find(out_dir, VCF_PATTERN)? {
        let vcf = parse_vcf_file(&path)?;
        let raw = vcf
            .samples
            .first()
            .cloned()
            .unwrap_or_else(|| parent_dir_name(&path));
        vcfs.push(SampleVcf {
            sample: names.strip(&raw),
            records: vcf.records,
        });
    }
    info!(count = vcfs.len(), dir = %out_dir.display(), "Loaded variant calls");
    Ok(vcfs)
}

/// Reads over the codon of a reportable call, or over the called base
fn depth_window(codons: &CodonMap, row: &ReportableCall) -> Option<Window> {
    row.voi
        .aa_pos
        .and_then(|aa_pos| codons.codon(&row.voi.gene, aa_pos))
        .or_else(|| {
            let call = row.call.as_ref()?;
            Some(Window::around_base(call.gene.clone(), call.pos?))
        })
}

/// Run the summarize pass over a pipeline output directory.
///
/// # Errors
///
/// Fails if an input table cannot be parsed, the output directory cannot be
/// searched, or an alignment file cannot be decoded. A sample without an
/// alignment file only loses its depth values.
pub fn summarize(config: &SummaryConfig) -> Result<Summary, SummaryError> {
    let names = SampleNames::new()?;
    let voi = parse_voi_file(&config.voi)?;
    let bed = parse_bed_file(&config.bed)?;
    let codons = CodonMap::from_bed(&bed);

    let vcfs = load_vcfs(&config.out_dir, &names)?;
    let stats = vcfs
        .iter()
        .map(|vcf| (vcf.sample.clone(), VariantStats::from_records(&vcf.records)))
        .collect();

    let table = variant_table(&vcfs, &voi)?;
    let mut reportable = reportable_calls(&table, &voi);
    let novel = novel_calls(&table, &voi);
    let intronic = intron_table(&vcfs);

    let bams: BTreeMap<String, PathBuf> = find(&config.out_dir, BAM_PATTERN)?
        .into_iter()
        .map(|path| (names.strip(&parent_dir_name(&path)), path))
        .collect();

    for sample in reportable.iter().map(|r| r.sample.as_str()).collect::<BTreeSet<_>>() {
        if !bams.contains_key(sample) {
            warn!(sample, "No alignments found; depth values left empty");
        }
    }

    let mut depth = BTreeMap::new();
    for (sample, path) in &bams {
        let depth_rows = fill_depths(sample, path, &bed, &codons, &mut reportable)?;
        depth.insert(sample.clone(), depth_pass(&depth_rows, config.min_depth));
    }

    Ok(Summary {
        reportable,
        novel,
        intronic,
        stats,
        depth_pass: depth,
    })
}

/// Scan one sample's alignments, writing codon depths into its reportable
/// rows and returning per-gene depth
fn fill_depths(
    sample: &str,
    path: &Path,
    bed: &[BedRecord],
    codons: &CodonMap,
    reportable: &mut [ReportableCall],
) -> Result<BTreeMap<String, Vec<u32>>, SummaryError> {
    let mut rows = Vec::new();
    let mut windows = Vec::new();
    for (i, row) in reportable.iter().enumerate().filter(|(_, r)| r.sample == sample) {
        if let Some(window) = depth_window(codons, row) {
            rows.push(i);
            windows.push(window);
        }
    }

    let report = scan_bam(path, bed, &windows)?;
    for (i, count) in rows.into_iter().zip(report.window_counts) {
        reportable[i].depth = Some(count);
    }
    Ok(report.gene_depths)
}

fn write_table(dir: &Path, name: &str, table: &PivotTable) -> Result<PathBuf, SummaryError> {
    let path = dir.join(name);
    let mut out = BufWriter::new(File::create(&path)?);
    table.write_tsv(&mut out)?;
    out.flush()?;
    Ok(path)
}

/// Write the summary tables into `dir`, returning the paths written
///
/// # Errors
///
/// Returns `SummaryError::Io` if a table cannot be written.
#[allow(clippy::cast_precision_loss)]
pub fn write_tables(summary: &Summary, dir: &Path) -> Result<Vec<PathBuf>, SummaryError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let af = PivotTable::from_rows(
        summary
            .reportable
            .iter()
            .map(|r| (r.variant(), r.sample.as_str(), r.alt_freq())),
    );
    written.push(write_table(dir, "variants_of_interest_af.tsv", &af)?);

    let dp = PivotTable::from_rows(
        summary
            .reportable
            .iter()
            .map(|r| (r.variant(), r.sample.as_str(), r.depth.map(|d| d as f64))),
    );
    written.push(write_table(dir, "variants_of_interest_dp.tsv", &dp)?);

    let novel = PivotTable::from_rows(
        summary
            .novel
            .iter()
            .map(|c| (c.variant.as_str(), c.sample.as_str(), c.alt_freq)),
    );
    written.push(write_table(dir, "novel_variants_af.tsv", &novel)?);

    let intronic = PivotTable::from_rows(
        summary
            .intronic
            .iter()
            .map(|c| (c.variant.as_str(), c.sample.as_str(), c.alt_freq)),
    );
    written.push(write_table(dir, "intronic_variants.tsv", &intronic)?);

    let mut pass = PivotTable::new();
    for (sample, genes) in &summary.depth_pass {
        for (gene, passed) in genes {
            pass.insert(gene.as_str(), sample.as_str(), Some(if *passed { 1.0 } else { 0.0 }));
        }
    }
    written.push(write_table(dir, "depth_pass.tsv", &pass)?);

    let path = dir.join("variant_stats.tsv");
    let mut out = BufWriter::new(File::create(&path)?);
    writeln!(out, "Sample\t{}", VariantStats::TSV_HEADER)?;
    for (sample, stats) in &summary.stats {
        writeln!(out, "{sample}\t{}", stats.tsv_fields())?;
    }
    out.flush()?;
    written.push(path);

    let path = dir.join("variants_of_interest.tsv");
    let mut out = BufWriter::new(File::create(&path)?);
    writeln!(out, "Sample\tVariant\tFinalCall\tAF\tDP")?;
    for row in &summary.reportable {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            row.sample,
            row.variant(),
            row.final_call,
            row.alt_freq().map(|f| f.to_string()).unwrap_or_default(),
            row.depth.map(|d| d.to_string()).unwrap_or_default()
        )?;
    }
    out.flush()?;
    written.push(path);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOI: &str = "Gene\tSNP\nPfDHFR\tN51I\nPfCRT\tK76T\n";
    const BED: &str = "PfDHFR\t100\t400\tdhfr\nPfCRT\t50\t300\tcrt\n";

    fn vcf(sample: &str, data: &[&str]) -> String {
        let mut text = format!(
            "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\t{sample}\n"
        );
        for line in data {
            text.push_str(&line.replace(' ', "\t"));
            text.push('\n');
        }
        text
    }

    const N51I: &str = "PfDHFR 252 . A T 60 PASS DP=120;AlFreq=0.85;Found=2;ExonNumber=1;CodonPos=51;RefCodon=AAT;AltCodon=ATT;RefAA=N;AltAA=I GT 1";
    const NOVEL: &str = "PfCRT 200 . G A 50 PASS DP=90;AlFreq=0.30;Found=2;ExonNumber=2;CodonPos=50;RefCodon=GCT;AltCodon=ACT;RefAA=A;AltAA=T GT 1";
    const INTRON: &str = "PfCRT 90 . C T 40 PASS DP=30;AlFreq=0.5;Found=1;ExonNumber=Intron;CodonPos=NA;RefAA=NA;AltAA=NA GT 1";

    fn fixture() -> (tempfile::TempDir, SummaryConfig) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("voi.tsv"), VOI).unwrap();
        std::fs::write(root.join("targets.bed"), BED).unwrap();

        let out = root.join("out");
        for (name, lines) in [("S01_ACGT-TTGA", vec![N51I, INTRON]), ("S02_GGCC-AATT", vec![NOVEL])] {
            let sample_dir = out.join(name);
            std::fs::create_dir_all(&sample_dir).unwrap();
            std::fs::write(
                sample_dir.join(format!("{name}_variants_merged_annotated.vcf")),
                vcf(name, &lines),
            )
            .unwrap();
        }

        let config = SummaryConfig::new(root.join("targets.bed"), root.join("voi.tsv"), out);
        (dir, config)
    }

    #[test]
    fn test_sample_names_drop_barcode() {
        let names = SampleNames::new().unwrap();
        assert_eq!(names.strip("S01_ACGT-TTGA"), "S01");
        assert_eq!(names.strip("S01_ACGT-TTGA_extra"), "S01");
        assert_eq!(names.strip("plain"), "plain");
    }

    #[test]
    fn test_summarize_without_alignments() {
        let (_dir, config) = fixture();
        let summary = summarize(&config).unwrap();

        assert_eq!(summary.stats.keys().collect::<Vec<_>>(), vec!["S01", "S02"]);
        assert_eq!(summary.stats["S01"].intronic, 1);

        // Two samples, two variants of interest each
        assert_eq!(summary.reportable.len(), 4);
        let s1: Vec<&str> = summary
            .reportable
            .iter()
            .filter(|r| r.sample == "S01")
            .map(|r| r.final_call.as_str())
            .collect();
        assert_eq!(s1, vec!["N51I", "WT"]);
        assert!(summary.reportable.iter().all(|r| r.depth.is_none()));

        assert_eq!(summary.novel.len(), 1);
        assert_eq!(summary.novel[0].variant, "PfCRT:A50T");
        assert_eq!(summary.intronic.len(), 1);
        assert!(summary.depth_pass.is_empty());
    }

    #[test]
    fn test_write_tables() {
        let (dir, config) = fixture();
        let summary = summarize(&config).unwrap();
        let tables = dir.path().join("tables");
        let written = write_tables(&summary, &tables).unwrap();
        assert_eq!(written.len(), 7);

        let af = std::fs::read_to_string(tables.join("variants_of_interest_af.tsv")).unwrap();
        assert_eq!(af.lines().next(), Some("Variant\tS01\tS02"));
        assert!(af.contains("PfDHFR:N51I\t85\t"));

        let stats = std::fs::read_to_string(tables.join("variant_stats.tsv")).unwrap();
        assert!(stats.starts_with("Sample\ttotal\t"));
        assert!(stats.contains("S02\t1\t1\t1\t0\t0\t1\t1\t0"));
    }

    #[test]
    fn test_depth_window_prefers_codon_layout() {
        let bed = vec![BedRecord {
            chrom: "PfDHFR".to_string(),
            start: 100,
            stop: 400,
            gene: None,
        }];
        let codons = CodonMap::from_bed(&bed);
        let voi = crate::parsing::voi::parse_voi_text("Gene\tSNP\nPfDHFR\tN51I\n", '\t').unwrap();
        let row = ReportableCall {
            sample: "S01".to_string(),
            voi: voi[0].clone(),
            call: None,
            final_call: "WT".to_string(),
            depth: None,
        };
        assert_eq!(depth_window(&codons, &row), Some(Window::new("PfDHFR", 250, 253)));

        let empty = CodonMap::default();
        assert_eq!(depth_window(&empty, &row), None);
    }

    #[test]
    fn test_depth_window_without_codon_layout_spans_two_bases() {
        let voi = crate::parsing::voi::parse_voi_text("Gene\tSNP\nPfDHFR\tN51I\n", '\t').unwrap();
        let vcfs = vec![SampleVcf {
            sample: "S01".to_string(),
            records: vec![crate::parsing::vcf::parse_data_line(&N51I.replace(' ', "\t")).unwrap()],
        }];
        let table = variant_table(&vcfs, &voi).unwrap();
        let rows = reportable_calls(&table, &voi);

        // Called base 252 and the base after it
        assert_eq!(
            depth_window(&CodonMap::default(), &rows[0]),
            Some(Window::new("PfDHFR", 251, 253))
        );
    }

    #[test]
    fn test_summarize_with_alignments() {
        use coverage::testing::{write_bam, TestRead};
        use noodles::sam::alignment::record::cigar::op::Kind;
        use noodles::sam::alignment::record::Flags;

        let (dir, config) = fixture();
        let (dhfr, crt) = (0, 1);
        let mut reads: Vec<TestRead> = (0..12)
            .map(|_| TestRead::new(dhfr, 101, &[(Kind::Match, 301)]))
            .collect();
        reads.push(TestRead::new(dhfr, 241, &[(Kind::Match, 20)]).flagged(Flags::DUPLICATE));
        reads.extend((0..3).map(|_| TestRead::new(crt, 51, &[(Kind::Match, 251)])));
        reads.push(TestRead::new(crt, 270, &[(Kind::Match, 20)]).flagged(Flags::UNMAPPED));
        write_bam(
            &config.out_dir.join("S01_ACGT-TTGA").join("output_sorted_RG.bam"),
            &[("PfDHFR", 1000), ("PfCRT", 1000)],
            &reads,
        );

        let summary = summarize(&config).unwrap();

        let depth = |sample: &str, variant: &str| {
            summary
                .reportable
                .iter()
                .find(|r| r.sample == sample && r.variant() == variant)
                .and_then(|r| r.depth)
        };
        // Codon windows [250, 253) and [275, 278); the duplicate still counts
        assert_eq!(depth("S01", "PfDHFR:N51I"), Some(13));
        assert_eq!(depth("S01", "PfCRT:K76T"), Some(3));
        assert_eq!(depth("S02", "PfDHFR:N51I"), None);

        assert_eq!(summary.depth_pass.keys().collect::<Vec<_>>(), vec!["S01"]);
        assert!(summary.depth_pass["S01"]["PfDHFR"]);
        assert!(!summary.depth_pass["S01"]["PfCRT"]);

        let tables = dir.path().join("tables");
        write_tables(&summary, &tables).unwrap();
        let dp = std::fs::read_to_string(tables.join("variants_of_interest_dp.tsv")).unwrap();
        assert_eq!(dp, "Variant\tS01\tS02\nPfCRT:K76T\t3\t\nPfDHFR:N51I\t13\t\n");
        let pass = std::fs::read_to_string(tables.join("depth_pass.tsv")).unwrap();
        assert_eq!(pass, "Variant\tS01\nPfCRT\t0\nPfDHFR\t1\n");
    }
}
