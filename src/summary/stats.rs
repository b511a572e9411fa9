use serde::Serialize;

use crate::parsing::vcf::VcfRecord;

const TRANSITIONS: [&str; 4] = ["AG", "GA", "CT", "TC"];

/// Per-VCF call counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VariantStats {
    pub total: usize,
    pub verified: usize,
    pub exonic: usize,
    pub intronic: usize,
    pub synonymous: usize,
    pub non_synonymous: usize,
    pub transitions: usize,
    pub transversions: usize,
}

impl VariantStats {
    /// Count every record. Verification, synonymy and substitution type are
    /// only counted for exonic records.
    #[must_use]
    pub fn from_records(records: &[VcfRecord]) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.total += 1;
            if record.is_intronic() {
                stats.intronic += 1;
                continue;
            }

            stats.exonic += 1;
            if record.info("Found") == Some("2") {
                stats.verified += 1;
            }
            if record.info("RefAA") == record.info("AltAA") {
                stats.synonymous += 1;
            } else {
                stats.non_synonymous += 1;
            }
            let change = format!("{}{}", record.reference, record.alt);
            if TRANSITIONS.contains(&change.as_str()) {
                stats.transitions += 1;
            } else {
                stats.transversions += 1;
            }
        }
        stats
    }

    pub const TSV_HEADER: &'static str =
        "total\tverified\texonic\tintronic\tsynonymous\tnon_synonymous\ttransitions\ttransversions";

    #[must_use]
    pub fn tsv_fields(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.total,
            self.verified,
            self.exonic,
            self.intronic,
            self.synonymous,
            self.non_synonymous,
            self.transitions,
            self.transversions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::vcf::parse_data_line;

    #[test]
    fn test_variant_stats() {
        let lines = [
            // exonic, verified, non-synonymous transition
            "PfDHFR\t152\t.\tA\tG\t60\tPASS\tDP=10;Found=2;ExonNumber=1;RefAA=N;AltAA=D",
            // exonic, unverified, synonymous transversion
            "PfDHFR\t160\t.\tA\tC\t60\tPASS\tDP=10;Found=1;ExonNumber=1;RefAA=L;AltAA=L",
            // intronic
            "PfCRT\t900\t.\tC\tT\t60\tPASS\tDP=10;Found=2;ExonNumber=Intron",
        ];
        let records: Vec<VcfRecord> = lines.iter().map(|l| parse_data_line(l).unwrap()).collect();

        let stats = VariantStats::from_records(&records);
        assert_eq!(
            stats,
            VariantStats {
                total: 3,
                verified: 1,
                exonic: 2,
                intronic: 1,
                synonymous: 1,
                non_synonymous: 1,
                transitions: 1,
                transversions: 1,
            }
        );
        assert_eq!(stats.tsv_fields(), "3\t1\t2\t1\t1\t1\t1\t1");
    }
}
