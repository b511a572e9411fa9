use serde::{Deserialize, Serialize};

/// Header convention a sequence record was produced under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Pre-CASAVA 1.8 Illumina: `@HWUSI-EAS100R:6:73:941:1973#0/1`
    IlluminaOld,
    /// CASAVA 1.8+ Illumina: `@D00468:24:H8ELMADXX:1:1101:1470:2237 1:N:0:2`
    IlluminaNew,
    /// SRA dump of a numeric-tile Illumina run
    SraOld,
    /// SRA dump of a flowcell-tagged Illumina run
    SraNew,
    /// PacBio subread: `@m160113_152755_42135_c1_s1_p0/15/7044_26271`
    Pacbio,
    /// No known convention matched
    Unknown,
}

impl Platform {
    /// Sequencing technology implied by the header convention.
    ///
    /// SRA dumps are re-headered Illumina runs, so they report Illumina.
    #[must_use]
    pub fn technology(self) -> Option<Technology> {
        match self {
            Self::IlluminaOld | Self::IlluminaNew | Self::SraOld | Self::SraNew => {
                Some(Technology::Illumina)
            }
            Self::Pacbio => Some(Technology::Pacbio),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IlluminaOld => write!(f, "Illumina (old)"),
            Self::IlluminaNew => write!(f, "Illumina (new)"),
            Self::SraOld => write!(f, "SRA (old)"),
            Self::SraNew => write!(f, "SRA (new)"),
            Self::Pacbio => write!(f, "PacBio"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Technology {
    Illumina,
    Pacbio,
}

impl Technology {
    /// Read-length class for a library with the given average read length.
    ///
    /// The class follows the technology, not the length: any non-zero average
    /// is Short for Illumina and Long for PacBio. A zero average has no class.
    #[must_use]
    pub fn length_class(self, avg_read_len: f64) -> Option<ReadLengthClass> {
        if avg_read_len == 0.0 {
            return None;
        }
        match self {
            Self::Illumina => Some(ReadLengthClass::Short),
            Self::Pacbio => Some(ReadLengthClass::Long),
        }
    }
}

impl std::fmt::Display for Technology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Illumina => write!(f, "Illumina"),
            Self::Pacbio => write!(f, "Pacbio"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadLengthClass {
    Short,
    Long,
}

impl std::fmt::Display for ReadLengthClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Short => write!(f, "Short"),
            Self::Long => write!(f, "Long"),
        }
    }
}

/// ASCII offset used to encode base qualities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityEncoding {
    #[default]
    Phred33,
    Phred64,
}

impl QualityEncoding {
    #[must_use]
    pub fn offset(self) -> u8 {
        match self {
            Self::Phred33 => 33,
            Self::Phred64 => 64,
        }
    }
}
