//! Parsing the GO master data: `go-basic.obo` and GAF association files
//!
//! Both sources can be read plain or gzip-compressed. A file whose name
//! ends with `.gz` is decompressed on the fly.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::{GoError, GoResult};

pub mod gaf;
pub mod go_obo;

pub use gaf::{parse_gaf, read_gaf_file, GafHeader, ParsedGaf};
pub use go_obo::{parse_obo, read_obo_file, OboHeader, ParsedObo};

/// Returns `true` if the file at `path` is treated as gzip-compressed
pub(crate) fn is_gzip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Opens a text source for line-wise reading
///
/// # Errors
///
/// [`GoError::CannotOpenFile`] if the file is missing or not readable
pub(crate) fn open_text<P: AsRef<Path>>(path: P) -> GoResult<Box<dyn BufRead>> {
    let path = path.as_ref();
    let filename = path.display().to_string();
    let file = File::open(path).map_err(|_| GoError::CannotOpenFile(filename))?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    use super::*;

    #[test]
    fn gzip_detection() {
        assert!(is_gzip(Path::new("go-basic.obo.gz")));
        assert!(is_gzip(Path::new("goa_human.GAF.GZ")));
        assert!(!is_gzip(Path::new("go-basic.obo")));
        assert!(!is_gzip(Path::new("gz")));
    }

    #[test]
    fn read_gzipped_obo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mini.obo.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder
            .write_all(b"[Term]\nid: GO:0008150\nname: biological_process\n")
            .unwrap();
        encoder.finish().unwrap();

        let parsed = read_obo_file(&path).unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
