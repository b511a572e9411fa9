use std::path::Path;

use regex::Regex;

/// Mate (`R1`/`R2`, `_1`/`_2`) and lane (`L001`-`L004`) tokens, any case,
/// underscore optional except for the bare digit form.
const MATE_LANE_TOKENS: &str = r"(?i)_?r[12]|_?l00[1-4]|_[12]";

/// Derives sample keys from read file names
#[derive(Debug, Clone)]
pub struct SampleNamer {
    tokens: Regex,
}

impl SampleNamer {
    /// # Errors
    ///
    /// Returns a regex error if the token pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            tokens: Regex::new(MATE_LANE_TOKENS)?,
        })
    }

    /// Everything before the leftmost mate/lane token of the base name.
    ///
    /// Files that differ only in those tokens share a key, which is what
    /// pairs mates. A name without any token is returned whole.
    #[must_use]
    pub fn sample_key(&self, path: &Path) -> String {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.key_for_name(&name)
    }

    #[must_use]
    pub fn key_for_name(&self, name: &str) -> String {
        match self.tokens.find(name) {
            Some(m) => name[..m.start()].to_string(),
            None => name.to_string(),
        }
    }
}
