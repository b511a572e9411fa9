use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};

use crate::core::types::{ReadLengthClass, Technology};

/// The read files of one library: a first file and at most one mate.
///
/// Only two slots exist. Pushing onto a full container replaces the second
/// slot, so a third file sharing a sample key displaces the earlier mate
/// instead of extending the library.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<PathBuf>")]
pub struct LibraryFiles {
    slots: [Option<PathBuf>; 2],
}

impl LibraryFiles {
    #[must_use]
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self {
            slots: [Some(path.into()), None],
        }
    }

    /// Place `path` in the second slot, returning whatever it displaced.
    pub fn push_capped(&mut self, path: impl Into<PathBuf>) -> Option<PathBuf> {
        self.slots[1].replace(path.into())
    }

    #[must_use]
    pub fn first(&self) -> &Path {
        // Constructors always fill slot 0
        self.slots[0].as_deref().unwrap_or_else(|| Path::new(""))
    }

    #[must_use]
    pub fn second(&self) -> Option<&Path> {
        self.slots[1].as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_pair(&self) -> bool {
        self.slots[1].is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.slots.iter().flatten().map(PathBuf::as_path)
    }
}

impl Serialize for LibraryFiles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl TryFrom<Vec<PathBuf>> for LibraryFiles {
    type Error = String;

    fn try_from(paths: Vec<PathBuf>) -> Result<Self, Self::Error> {
        let mut iter = paths.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| "library needs at least one file".to_string())?;
        let second = iter.next();
        if iter.next().is_some() {
            return Err("library holds at most two files".to_string());
        }
        Ok(Self {
            slots: [Some(first), second],
        })
    }
}

/// A sequencing library assembled from one or two read files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryRecord {
    /// Filename-derived key shared by mate files
    pub sample: String,

    /// Instrument/run, run/spot or movie prefix taken from the first read header
    pub library: String,

    pub technology: Technology,

    pub files: LibraryFiles,

    /// `None` when every sampled read was empty
    pub length_class: Option<ReadLengthClass>,

    pub paired: bool,

    /// Reads in the first file of the library
    pub read_count: u64,
}

impl LibraryRecord {
    /// Start a single-end library from its first file
    #[must_use]
    pub fn single(
        sample: impl Into<String>,
        library: impl Into<String>,
        technology: Technology,
        file: impl Into<PathBuf>,
        length_class: Option<ReadLengthClass>,
        read_count: u64,
    ) -> Self {
        Self {
            sample: sample.into(),
            library: library.into(),
            technology,
            files: LibraryFiles::single(file),
            length_class,
            paired: false,
            read_count,
        }
    }

    #[must_use]
    pub fn first_file(&self) -> &Path {
        self.files.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_capped_fills_then_displaces() {
        let mut files = LibraryFiles::single("s_R1.fastq");
        assert_eq!(files.len(), 1);
        assert!(!files.is_pair());

        assert_eq!(files.push_capped("s_R2.fastq"), None);
        assert_eq!(files.len(), 2);
        assert!(files.is_pair());

        let displaced = files.push_capped("s_L003.fastq");
        assert_eq!(displaced, Some(PathBuf::from("s_R2.fastq")));
        assert_eq!(files.len(), 2);
        assert_eq!(files.first(), Path::new("s_R1.fastq"));
        assert_eq!(files.second(), Some(Path::new("s_L003.fastq")));
    }

    #[test]
    fn test_files_serialize_as_list() {
        let mut files = LibraryFiles::single("a_R1.fastq");
        files.push_capped("a_R2.fastq");
        let json = serde_json::to_string(&files).unwrap();
        assert_eq!(json, r#"["a_R1.fastq","a_R2.fastq"]"#);

        let back: LibraryFiles = serde_json::from_str(&json).unwrap();
        assert_eq!(back, files);
    }

    #[test]
    fn test_files_reject_three_entries() {
        let result: Result<LibraryFiles, _> = serde_json::from_str(r#"["a","b","c"]"#);
        assert!(result.is_err());
        let result: Result<LibraryFiles, _> = serde_json::from_str("[]");
        assert!(result.is_err());
    }

    #[test]
    fn test_single_library() {
        let record = LibraryRecord::single(
            "sample1",
            "D00468",
            Technology::Illumina,
            "sample1_R1.fastq",
            Some(ReadLengthClass::Short),
            42,
        );
        assert!(!record.paired);
        assert_eq!(record.files.len(), 1);
        assert_eq!(record.first_file(), Path::new("sample1_R1.fastq"));
    }
}
