//! Platform detection from FASTQ header lines.
//!
//! Each supported convention is one anchored pattern with a `library`
//! capture. Patterns are tried in a fixed order and the first match wins;
//! the grammars are written so that no well-formed header matches two of
//! them, so the order only affects how quickly a header is recognized.

use regex::Regex;

use crate::core::types::Platform;

const ILLUMINA_OLD: &str = r"^@(?P<library>\w+-?\w+):\d+:\d+:\d+:\d+#\d*(?:/\d)?$";

const ILLUMINA_NEW: &str =
    r"^@(?P<library>\w+-?\w+):\d+:\w+-?\w+:\d+:\d+:\d+:\d+\s\d:\w+:\w+:[\w+]*$";

// Third field purely numeric; the two trailing fields are absent in the
// earliest SRA dumps.
const SRA_OLD: &str =
    r"^@(?P<library>\w+(?:\.\w+)?) \w+-\w+:\d+:\d+:\d+:\d+(?::\d+:\d+)? length=\d+$";

// Third field is a flowcell id and so carries at least one non-digit.
const SRA_NEW: &str =
    r"^@(?P<library>\w+(?:\.\w+)?) \w+-\w+:\d+:\d*[A-Za-z_]\w*:\d+:\d+:\d+:\d+ length=\d+$";

const PACBIO: &str = r"^@(?P<library>\w+)/\d+/\d+_\d+$";

/// A header recognized as one of the supported conventions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    pub platform: Platform,
    /// Instrument name before the first colon (Illumina), run/spot (SRA) or
    /// movie name (PacBio)
    pub library: String,
}

/// Ordered list of header grammars
#[derive(Debug, Clone)]
pub struct HeaderClassifier {
    patterns: Vec<(Platform, Regex)>,
}

impl HeaderClassifier {
    /// Compile the built-in header grammars.
    ///
    /// # Errors
    ///
    /// Returns a regex error if a grammar fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        let patterns = [
            (Platform::IlluminaOld, ILLUMINA_OLD),
            (Platform::IlluminaNew, ILLUMINA_NEW),
            (Platform::SraOld, SRA_OLD),
            (Platform::SraNew, SRA_NEW),
            (Platform::Pacbio, PACBIO),
        ]
        .into_iter()
        .map(|(platform, pattern)| Regex::new(pattern).map(|re| (platform, re)))
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Platform of a header, `Platform::Unknown` if no grammar matches
    #[must_use]
    pub fn classify(&self, header: &str) -> Platform {
        self.identify(header)
            .map_or(Platform::Unknown, |m| m.platform)
    }

    /// First matching grammar together with the library identifier it captures
    #[must_use]
    pub fn identify(&self, header: &str) -> Option<HeaderMatch> {
        self.patterns.iter().find_map(|(platform, re)| {
            re.captures(header).map(|caps| HeaderMatch {
                platform: *platform,
                library: caps
                    .name("library")
                    .map_or_else(String::new, |m| m.as_str().to_string()),
            })
        })
    }

    /// Every grammar the header satisfies, in priority order.
    ///
    /// For a well-formed header this holds at most one platform.
    #[must_use]
    pub fn matching_platforms(&self, header: &str) -> Vec<Platform> {
        self.patterns
            .iter()
            .filter(|(_, re)| re.is_match(header))
            .map(|(platform, _)| *platform)
            .collect()
    }
}
