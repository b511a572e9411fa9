//! Core data types shared by the prep and summarize passes.
//!
//! - [`SequenceRecord`](record::SequenceRecord): one read as produced by the FASTQ reader
//! - [`Platform`](types::Platform): header convention a read was written under
//! - [`LibraryRecord`](library::LibraryRecord): one or two read files grouped under a sample key
//!
//! ## Header conventions
//!
//! | Platform     | Example header |
//! |--------------|----------------|
//! | Illumina old | `@HWUSI-EAS100R:6:73:941:1973#0/1` |
//! | Illumina new | `@D00468:24:H8ELMADXX:1:1101:1470:2237 1:N:0:2` |
//! | SRA old      | `@SRR037455.1 HWI-E4_6_30ACL:4:1:0:29 length=35` |
//! | SRA new      | `@SRR902931.1 HWI-ST1384:61:D1DJ4ACXX:8:1101:1240:2015 length=50` |
//! | PacBio       | `@m160113_152755_42135_c1_s1_p0/15/7044_26271` |

pub mod library;
pub mod record;
pub mod types;
