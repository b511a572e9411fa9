//! Opening plain or gzip-compressed text inputs behind one `BufRead`.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Check whether the file starts with the gzip magic bytes.
///
/// Compression is detected from content rather than the extension, since
/// sequencing cores are inconsistent about `.gz` suffixes.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened or read.
pub fn is_gzipped(path: &Path) -> std::io::Result<bool> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    let mut filled = 0;
    while filled < magic.len() {
        let n = file.read(&mut magic[filled..])?;
        if n == 0 {
            return Ok(false);
        }
        filled += n;
    }
    Ok(magic == GZIP_MAGIC)
}

/// Open a file for buffered line reading, decompressing gzip (and bgzip,
/// which is multi-member gzip) transparently.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened.
pub fn open_text(path: &Path) -> std::io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gzipped(path)? {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_open_plain_and_gzipped() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("reads.txt");
        std::fs::write(&plain, "line one\nline two\n").unwrap();

        let gz = dir.path().join("reads.txt.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(b"line one\nline two\n").unwrap();
        encoder.finish().unwrap();

        assert!(!is_gzipped(&plain).unwrap());
        assert!(is_gzipped(&gz).unwrap());

        for path in [&plain, &gz] {
            let lines: Vec<String> = open_text(path).unwrap().lines().map(Result::unwrap).collect();
            assert_eq!(lines, vec!["line one", "line two"]);
        }
    }

    #[test]
    fn test_short_file_is_not_gzipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny");
        std::fs::write(&path, [0x1f]).unwrap();
        assert!(!is_gzipped(&path).unwrap());
    }

    #[test]
    fn test_missing_file() {
        assert!(open_text(Path::new("/nonexistent/reads.fastq")).is_err());
    }
}
