//! Observable events raised while grouping read files.
//!
//! The grouper never logs directly; it reports through a
//! [`GroupingReporter`] handed to it by the caller. [`TracingReporter`]
//! forwards events to `tracing`, and tests can record them instead.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::core::library::LibraryRecord;
use crate::prep::metrics::ReadSample;

pub trait GroupingReporter {
    /// A file's first header matched no known convention; the file is skipped
    fn unknown_header(&mut self, path: &Path, header: &str);

    /// A file was classified and sampled
    fn file_sampled(&mut self, _path: &Path, _sample: &ReadSample) {}

    /// A further file for `sample` replaced the mate file `displaced`
    fn mate_displaced(&mut self, _sample: &str, _displaced: &Path, _path: &Path) {}

    /// Grouping finished with `count` libraries
    fn libraries_identified(&mut self, root: Option<&Path>, count: usize);

    /// One finished library
    fn library_detail(&mut self, record: &LibraryRecord);
}

/// Reporter that emits `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl GroupingReporter for TracingReporter {
    fn unknown_header(&mut self, path: &Path, header: &str) {
        warn!(
            file = %path.display(),
            header = %header,
            "Read header does not follow any known FASTQ header format, skipping file"
        );
    }

    fn file_sampled(&mut self, path: &Path, sample: &ReadSample) {
        debug!(
            file = %path.display(),
            reads = sample.reads,
            avg_read_len = sample.avg_read_len,
            mean_quality = ?sample.mean_quality,
            "Sampled leading reads"
        );
    }

    fn mate_displaced(&mut self, sample: &str, displaced: &Path, path: &Path) {
        warn!(
            sample = %sample,
            displaced = %displaced.display(),
            file = %path.display(),
            "More than two files share a sample key, replacing the mate file"
        );
    }

    fn libraries_identified(&mut self, root: Option<&Path>, count: usize) {
        match root {
            Some(root) => info!(root = %root.display(), "Identified {count} libraries"),
            None => info!("Identified {count} libraries"),
        }
    }

    fn library_detail(&mut self, record: &LibraryRecord) {
        let files: Vec<String> = record
            .files
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        debug!(
            sample = %record.sample,
            library = %record.library,
            technology = %record.technology,
            files = %files.join(","),
            length_class = ?record.length_class,
            paired = record.paired,
            reads = record.read_count,
            "Library"
        );
    }
}

/// Event captured by [`RecordingReporter`]
#[derive(Debug, Clone, PartialEq)]
pub enum GroupingEvent {
    UnknownHeader { path: String, header: String },
    MateDisplaced { sample: String, displaced: String },
    LibrariesIdentified(usize),
    Library(String),
}

/// Reporter that keeps every event in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    pub events: Vec<GroupingEvent>,
}

impl RecordingReporter {
    /// Headers reported as unknown, in order
    #[must_use]
    pub fn unknown_headers(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GroupingEvent::UnknownHeader { header, .. } => Some(header.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl GroupingReporter for RecordingReporter {
    fn unknown_header(&mut self, path: &Path, header: &str) {
        self.events.push(GroupingEvent::UnknownHeader {
            path: path.display().to_string(),
            header: header.to_string(),
        });
    }

    fn mate_displaced(&mut self, sample: &str, displaced: &Path, _path: &Path) {
        self.events.push(GroupingEvent::MateDisplaced {
            sample: sample.to_string(),
            displaced: displaced.display().to_string(),
        });
    }

    fn libraries_identified(&mut self, _root: Option<&Path>, count: usize) {
        self.events.push(GroupingEvent::LibrariesIdentified(count));
    }

    fn library_detail(&mut self, record: &LibraryRecord) {
        self.events.push(GroupingEvent::Library(record.sample.clone()));
    }
}
