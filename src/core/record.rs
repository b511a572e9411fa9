use crate::core::types::QualityEncoding;

/// A single sequencing read as handed out by the FASTQ reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// Definition line, including the leading `@`
    pub header: String,
    pub sequence: String,
    pub quality: String,
}

impl SequenceRecord {
    #[must_use]
    pub fn new(
        header: impl Into<String>,
        sequence: impl Into<String>,
        quality: impl Into<String>,
    ) -> Self {
        Self {
            header: header.into(),
            sequence: sequence.into(),
            quality: quality.into(),
        }
    }

    /// Number of bases in the read
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Decode the quality string into Phred scores.
    ///
    /// Characters below the encoding offset saturate to zero.
    #[must_use]
    pub fn phred_scores(&self, encoding: QualityEncoding) -> Vec<u8> {
        let offset = encoding.offset();
        self.quality
            .bytes()
            .map(|b| b.saturating_sub(offset))
            .collect()
    }
}
