use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::library::LibraryRecord;
use crate::parsing::fastq::{count_records, first_record, ReaderOptions};
use crate::prep::classifier::HeaderClassifier;
use crate::prep::discover::discover;
use crate::prep::metrics::sample_reads;
use crate::prep::report::GroupingReporter;
use crate::prep::sample::SampleNamer;
use crate::prep::PrepError;

/// Libraries keyed by sample key
pub type Libraries = BTreeMap<String, LibraryRecord>;

/// Folds read files into single-end and paired libraries
#[derive(Debug, Clone)]
pub struct LibraryGrouper {
    classifier: HeaderClassifier,
    namer: SampleNamer,
    options: ReaderOptions,
}

impl LibraryGrouper {
    /// # Errors
    ///
    /// Returns `PrepError::Regex` if a built-in pattern fails to compile.
    pub fn new(options: ReaderOptions) -> Result<Self, PrepError> {
        Ok(Self {
            classifier: HeaderClassifier::new()?,
            namer: SampleNamer::new()?,
            options,
        })
    }

    /// Discover every read file below `root` and group them.
    ///
    /// # Errors
    ///
    /// Fails on the first file that cannot be discovered, opened, parsed,
    /// or that holds no reads.
    pub fn group_directory(
        &self,
        root: &Path,
        reporter: &mut dyn GroupingReporter,
    ) -> Result<Libraries, PrepError> {
        let paths = discover(root)?;
        self.group_inner(&paths, Some(root), reporter)
    }

    /// Group the given files in order.
    ///
    /// The first file seen for a sample key starts a single-end library.
    /// The next one turns it into a pair: the first file stays in place, the
    /// newcomer takes the mate slot, and the read count is taken from the
    /// first file. Any further file for the same key replaces the mate.
    /// Files whose header matches no known convention are reported and
    /// skipped.
    ///
    /// # Errors
    ///
    /// Fails on the first file that cannot be opened or parsed, or that
    /// holds no reads.
    pub fn group(
        &self,
        paths: &[PathBuf],
        reporter: &mut dyn GroupingReporter,
    ) -> Result<Libraries, PrepError> {
        self.group_inner(paths, None, reporter)
    }

    fn group_inner(
        &self,
        paths: &[PathBuf],
        root: Option<&Path>,
        reporter: &mut dyn GroupingReporter,
    ) -> Result<Libraries, PrepError> {
        let mut libraries = Libraries::new();

        for path in paths {
            let Some(first) = first_record(path)? else {
                return Err(PrepError::EmptyFile(path.clone()));
            };

            let identified = self
                .classifier
                .identify(&first.header)
                .and_then(|m| m.platform.technology().map(|tech| (m, tech)));
            let Some((header, technology)) = identified else {
                reporter.unknown_header(path, &first.header);
                continue;
            };

            let sample = sample_reads(path, self.options)?;
            reporter.file_sampled(path, &sample);
            let length_class = technology.length_class(sample.avg_read_len);

            match libraries.entry(self.namer.sample_key(path)) {
                Entry::Vacant(entry) => {
                    let read_count = count_records(path)?;
                    let record = LibraryRecord::single(
                        entry.key().clone(),
                        header.library,
                        technology,
                        path.clone(),
                        length_class,
                        read_count,
                    );
                    entry.insert(record);
                }
                Entry::Occupied(mut entry) => {
                    let record = entry.get_mut();
                    if let Some(displaced) = record.files.push_capped(path.clone()) {
                        reporter.mate_displaced(&record.sample, &displaced, path);
                    }
                    record.library = header.library;
                    record.technology = technology;
                    record.length_class = length_class;
                    record.paired = true;
                    record.read_count = count_records(record.first_file())?;
                }
            }
        }

        reporter.libraries_identified(root, libraries.len());
        for record in libraries.values() {
            reporter.library_detail(record);
        }

        Ok(libraries)
    }
}

/// Split library files into those whose path contains `_R1` and everything else.
///
/// Single-end files without the marker land in the second list too.
#[must_use]
pub fn split_mate_lists(libraries: &Libraries) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut first_mates = Vec::new();
    let mut rest = Vec::new();
    for path in libraries.values().flat_map(|record| record.files.iter()) {
        if path.to_string_lossy().contains("_R1") {
            first_mates.push(path.to_path_buf());
        } else {
            rest.push(path.to_path_buf());
        }
    }
    (first_mates, rest)
}
