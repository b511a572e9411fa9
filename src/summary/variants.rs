//! Per-sample variant tables built from annotated VCFs.
//!
//! Codon-level calls are keyed `Gene:<RefAA><Codon><AltAA>` so they line up
//! with variant-of-interest keys (`Gene:SNP`). Intronic calls have no codon
//! and are keyed by nucleotide change instead.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::info;

use crate::parsing::vcf::VcfRecord;
use crate::parsing::voi::VariantOfInterest;
use crate::summary::SummaryError;

/// Confidence assigned when both callers report a site
pub const VERIFIED: u8 = 2;

/// The records of one VCF under its sample name
#[derive(Debug, Clone)]
pub struct SampleVcf {
    pub sample: String,
    pub records: Vec<VcfRecord>,
}

/// One row of a sample's variant table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantCall {
    pub sample: String,
    pub variant: String,
    pub gene: String,
    pub pos: Option<u64>,
    pub qual: Option<f64>,
    pub ref_allele: Option<String>,
    pub alt_allele: Option<String>,
    pub codon_pos: Option<u32>,
    pub ref_codon: Option<String>,
    pub alt_codon: Option<String>,
    pub ref_aa: Option<String>,
    pub alt_aa: Option<String>,
    pub depth: u64,
    /// Alternate allele frequency in percent
    pub alt_freq: Option<f64>,
    pub confidence: Option<u8>,
    pub exon: Option<String>,
}

impl VariantCall {
    fn from_record(sample: &str, variant: String, record: &VcfRecord) -> Result<Self, SummaryError> {
        let codon_pos = record
            .info_present("CodonPos")
            .map(|v| {
                v.parse::<u32>().map_err(|_| {
                    SummaryError::InvalidField(format!(
                        "{}:{} has non-numeric CodonPos '{v}'",
                        record.chrom, record.pos
                    ))
                })
            })
            .transpose()?;

        Ok(Self {
            sample: sample.to_string(),
            variant,
            gene: record.chrom.clone(),
            pos: Some(record.pos),
            qual: record.qual,
            ref_allele: Some(record.reference.clone()),
            alt_allele: Some(record.alt.clone()),
            codon_pos,
            ref_codon: record.info_present("RefCodon").map(str::to_string),
            alt_codon: record.info_present("AltCodon").map(str::to_string),
            ref_aa: record.info_present("RefAA").map(str::to_string),
            alt_aa: record.info_present("AltAA").map(str::to_string),
            depth: record.depth(),
            alt_freq: alt_freq_percent(record),
            confidence: record.info("Found").and_then(|v| v.parse().ok()),
            exon: record.info_present("ExonNumber").map(str::to_string),
        })
    }

    /// Placeholder row for a variant of interest in a sample with no hits
    fn reference_call(sample: &str, voi: &VariantOfInterest) -> Self {
        Self {
            sample: sample.to_string(),
            variant: voi.key(),
            gene: voi.gene.clone(),
            pos: None,
            qual: None,
            ref_allele: None,
            alt_allele: None,
            codon_pos: voi.aa_pos,
            ref_codon: None,
            alt_codon: None,
            ref_aa: Some(voi.ref_aa.clone()),
            alt_aa: Some(voi.alt_aa.clone()),
            depth: 0,
            alt_freq: None,
            confidence: Some(VERIFIED),
            exon: None,
        }
    }
}

fn alt_freq_percent(record: &VcfRecord) -> Option<f64> {
    record
        .info("AlFreq")
        .and_then(|v| v.parse::<f64>().ok())
        .map(|f| f * 100.0)
}

/// Codon key for a record, `None` if any codon annotation is missing
fn codon_key(record: &VcfRecord) -> Option<(String, String)> {
    if record.chrom == "NA" {
        return None;
    }
    let ref_aa = record.info_present("RefAA")?;
    let codon = record.info_present("CodonPos")?;
    let alt_aa = record.info_present("AltAA")?;
    Some((
        format!("{}:{ref_aa}{codon}{alt_aa}", record.chrom),
        // Zero-depth calls are tracked under an NA alt so later duplicates
        // of them are not merged
        format!("{}:{ref_aa}{codon}NA", record.chrom),
    ))
}

/// Build the codon-level variant table for every sample.
///
/// Records lacking codon annotation are skipped. A key seen twice in one
/// sample is merged into the earlier row by comma-joining the alleles. A
/// sample with no variant-of-interest hit gets a reference row for every
/// variant of interest.
///
/// # Errors
///
/// Returns `SummaryError::InvalidField` for a non-numeric codon position.
pub fn variant_table(
    vcfs: &[SampleVcf],
    voi: &[VariantOfInterest],
) -> Result<Vec<VariantCall>, SummaryError> {
    let voi_keys: HashSet<String> = voi.iter().map(VariantOfInterest::key).collect();
    let mut calls: Vec<VariantCall> = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for vcf in vcfs {
        let mut voi_hits = 0usize;

        for record in &vcf.records {
            let Some((key, zero_depth_key)) = codon_key(record) else {
                continue;
            };
            if voi_keys.contains(&key) {
                voi_hits += 1;
            }

            if seen.contains(&(vcf.sample.clone(), key.clone())) {
                if let Some(row) = calls
                    .iter_mut()
                    .rev()
                    .find(|c| c.sample == vcf.sample && c.variant == key)
                {
                    row.ref_allele = Some(join_allele(row.ref_allele.as_deref(), &record.reference));
                    row.alt_allele = Some(join_allele(row.alt_allele.as_deref(), &record.alt));
                }
                continue;
            }

            let call = VariantCall::from_record(&vcf.sample, key.clone(), record)?;
            let seen_key = if call.depth > 0 { key } else { zero_depth_key };
            seen.insert((vcf.sample.clone(), seen_key));
            calls.push(call);
        }

        if voi_hits == 0 {
            info!(sample = %vcf.sample, "No variants of interest found; adding reference calls");
            calls.extend(voi.iter().map(|v| VariantCall::reference_call(&vcf.sample, v)));
        }
    }

    Ok(calls)
}

fn join_allele(existing: Option<&str>, next: &str) -> String {
    match existing {
        Some(existing) => format!("{existing},{next}"),
        None => next.to_string(),
    }
}

/// Intronic calls of every sample, keyed `Gene:<Ref><Pos><Alt>`
#[must_use]
pub fn intron_table(vcfs: &[SampleVcf]) -> Vec<VariantCall> {
    vcfs.iter()
        .flat_map(|vcf| {
            vcf.records
                .iter()
                .filter(|r| r.is_intronic())
                .map(|r| VariantCall {
                    sample: vcf.sample.clone(),
                    variant: format!("{}:{}{}{}", r.chrom, r.reference, r.pos, r.alt),
                    gene: r.chrom.clone(),
                    pos: Some(r.pos),
                    qual: r.qual,
                    ref_allele: Some(r.reference.clone()),
                    alt_allele: Some(r.alt.clone()),
                    codon_pos: None,
                    ref_codon: None,
                    alt_codon: None,
                    ref_aa: None,
                    alt_aa: None,
                    depth: r.depth(),
                    alt_freq: alt_freq_percent(r),
                    confidence: r.info("Found").and_then(|v| v.parse().ok()),
                    exon: Some("Intron".to_string()),
                })
        })
        .collect()
}

/// A variant of interest joined with one sample's call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportableCall {
    pub sample: String,
    pub voi: VariantOfInterest,
    pub call: Option<VariantCall>,
    /// `WT`, a synonymous reference label such as `N51N`, or the SNP
    pub final_call: String,
    /// Reads covering the codon, filled in from the sample's alignments
    pub depth: Option<u64>,
}

impl ReportableCall {
    #[must_use]
    pub fn variant(&self) -> String {
        self.voi.key()
    }

    #[must_use]
    pub fn alt_freq(&self) -> Option<f64> {
        self.call.as_ref().and_then(|c| c.alt_freq)
    }
}

fn final_call(voi: &VariantOfInterest, call: Option<&VariantCall>) -> String {
    match call {
        None => "WT".to_string(),
        Some(call) if call.alt_allele.is_none() => match voi.aa_pos {
            Some(pos) if !voi.ref_aa.is_empty() => format!("{0}{pos}{0}", voi.ref_aa),
            _ => voi.snp.clone(),
        },
        Some(_) => voi.snp.clone(),
    }
}

fn by_sample(table: &[VariantCall]) -> BTreeMap<&str, Vec<&VariantCall>> {
    let mut samples: BTreeMap<&str, Vec<&VariantCall>> = BTreeMap::new();
    for call in table {
        samples.entry(call.sample.as_str()).or_default().push(call);
    }
    samples
}

/// Every variant of interest for every sample, with the sample's call(s).
///
/// Samples are ordered by name; within a sample rows follow the
/// variant-of-interest list. A variant with several matching rows yields
/// one joined row per match.
#[must_use]
pub fn reportable_calls(table: &[VariantCall], voi: &[VariantOfInterest]) -> Vec<ReportableCall> {
    let mut rows = Vec::new();
    for (sample, calls) in by_sample(table) {
        for v in voi {
            let key = v.key();
            let matches: Vec<&VariantCall> =
                calls.iter().copied().filter(|c| c.variant == key).collect();

            if matches.is_empty() {
                rows.push(ReportableCall {
                    sample: sample.to_string(),
                    voi: v.clone(),
                    call: None,
                    final_call: final_call(v, None),
                    depth: None,
                });
            }
            for call in matches {
                rows.push(ReportableCall {
                    sample: sample.to_string(),
                    voi: v.clone(),
                    call: Some(call.clone()),
                    final_call: final_call(v, Some(call)),
                    depth: None,
                });
            }
        }
    }
    rows
}

/// Verified calls that are not variants of interest, grouped by sample
#[must_use]
pub fn novel_calls(table: &[VariantCall], voi: &[VariantOfInterest]) -> Vec<VariantCall> {
    let voi_keys: HashSet<String> = voi.iter().map(VariantOfInterest::key).collect();
    by_sample(table)
        .into_values()
        .flatten()
        .filter(|c| !voi_keys.contains(&c.variant) && c.confidence == Some(VERIFIED))
        .cloned()
        .collect()
}
