//! Reading query targets from files, streams and lists
//!
//! Target lists come in three shapes. All lines are trimmed, empty lines
//! and lines starting with `#` are dropped first.
//!
//! 1. The JSON annotation document `{"data": [{"gid": "ACAA1", "label": ..}]}`
//! 2. A CSV file with `gid` and `label` headers
//! 3. Anything else: the first CSV column of every line
//!
//! ```text
//! # lipid genes
//! ACAA1
//! CYP1A1,cytochrome
//! ```
//!
//! The enrichment tables of g:Profiler and Enrichr are read by
//! [`enrichment`].
use std::io::BufRead;
use std::iter::once;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::parser::open_text;
use crate::GoResult;

pub mod enrichment;

const GID: &str = "gid";
const LABEL: &str = "label";

/// One target of a query, with an optional display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub gid: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl TargetRecord {
    fn new(gid: &str, label: Option<&str>) -> Option<Self> {
        let gid = gid.trim();
        if gid.is_empty() {
            return None;
        }
        Some(Self {
            gid: gid.to_string(),
            label: label.map(str::trim).filter(|l| !l.is_empty()).map(String::from),
        })
    }
}

#[derive(Deserialize)]
struct TargetDocument {
    data: Vec<TargetRecord>,
}

/// Reads targets from a file, gzip-compressed if the name ends with `.gz`
///
/// # Errors
///
/// - [`crate::GoError::CannotOpenFile`]: The file is missing
/// - [`crate::GoError::Csv`]: The file is not valid CSV
pub fn read_targets<P: AsRef<Path>>(path: P) -> GoResult<Vec<TargetRecord>> {
    let source = path.as_ref().display().to_string();
    let records = parse_targets(open_text(path)?)?;
    info!("Read {} targets from {source}", records.len());
    Ok(records)
}

/// Reads targets from any line source, e.g. stdin
///
/// # Examples
///
/// ```
/// use genescape::targets::parse_targets;
///
/// let input = "# genes\n\nACAA1\ncyp1a1, second column\n";
/// let records = parse_targets(input.as_bytes()).unwrap();
/// let gids: Vec<&str> = records.iter().map(|r| r.gid.as_str()).collect();
/// assert_eq!(gids, vec!["ACAA1", "cyp1a1"]);
/// ```
pub fn parse_targets<R: BufRead>(reader: R) -> GoResult<Vec<TargetRecord>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        lines.push(line.to_string());
    }
    parse_lines(&lines)
}

/// Reads targets from in-memory strings
///
/// Every item is treated like a line of a file.
pub fn parse_target_list<I, S>(items: I) -> GoResult<Vec<TargetRecord>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let text = items
        .into_iter()
        .map(|item| item.as_ref().to_string())
        .collect::<Vec<String>>()
        .join("\n");
    parse_targets(text.as_bytes())
}

/// The `gid`s of the records, in input order
pub fn target_symbols(records: &[TargetRecord]) -> Vec<String> {
    records.iter().map(|record| record.gid.clone()).collect()
}

fn parse_lines(lines: &[String]) -> GoResult<Vec<TargetRecord>> {
    let text = lines.join("\n");
    match serde_json::from_str::<TargetDocument>(&text) {
        Ok(document) => {
            debug!("Reading targets as JSON");
            Ok(document
                .data
                .iter()
                .filter_map(|record| TargetRecord::new(&record.gid, record.label.as_deref()))
                .collect())
        }
        Err(_) => parse_csv(&text),
    }
}

fn parse_csv(text: &str) -> GoResult<Vec<TargetRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let mut rows = reader.records();
    let Some(first) = rows.next().transpose()? else {
        return Ok(Vec::new());
    };

    let mut records = Vec::new();
    let gid = first.iter().position(|header| header == GID);
    let label = first.iter().position(|header| header == LABEL);
    if let (Some(gid), Some(label)) = (gid, label) {
        debug!("Reading targets as CSV with headers");
        for row in rows {
            let row = row?;
            records.extend(TargetRecord::new(
                row.get(gid).unwrap_or_default(),
                row.get(label),
            ));
        }
    } else {
        debug!("Reading the first column of the targets");
        for row in once(Ok(first)).chain(rows) {
            let row = row?;
            records.extend(TargetRecord::new(row.get(0).unwrap_or_default(), None));
        }
    }
    Ok(records)
}

#[cfg(test)]
mod test {
    use std::fs::File;
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    use super::*;
    use crate::{GoError, GoTermId, Ontology, QueryParams};

    fn gids(records: &[TargetRecord]) -> Vec<String> {
        target_symbols(records)
    }

    #[test]
    fn plain_list_file() {
        let records = read_targets("tests/targets.txt").unwrap();
        assert_eq!(gids(&records), vec!["ACAA1", "cyp1a1", "GO:0005634", "NOTAGENE"]);
        assert!(records.iter().all(|record| record.label.is_none()));
    }

    #[test]
    fn csv_with_headers() {
        let records = read_targets("tests/targets.csv").unwrap();
        assert_eq!(
            records,
            vec![
                TargetRecord {
                    gid: "ACAA1".to_string(),
                    label: Some("thiolase".to_string())
                },
                TargetRecord {
                    gid: "ACADVL".to_string(),
                    label: None
                },
            ]
        );
    }

    #[test]
    fn json_document() {
        let records = read_targets("tests/targets.json").unwrap();
        assert_eq!(gids(&records), vec!["TP53BP1", "ACADVL"]);
        assert_eq!(records[0].label.as_deref(), Some("(1/2)"));
    }

    #[test]
    fn gzipped_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("targets.txt.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"# header\nACAA1\n\nCYP1A1\n").unwrap();
        encoder.finish().unwrap();

        assert_eq!(gids(&read_targets(&path).unwrap()), vec!["ACAA1", "CYP1A1"]);
    }

    #[test]
    fn in_memory_list() {
        let records = parse_target_list(["ACAA1", "  ", "# skipped", "CYP1A1"]).unwrap();
        assert_eq!(gids(&records), vec!["ACAA1", "CYP1A1"]);
    }

    #[test]
    fn header_needs_gid_and_label() {
        let records = parse_targets("gid,name\nACAA1,thiolase\n".as_bytes()).unwrap();
        assert_eq!(gids(&records), vec!["gid", "ACAA1"]);
    }

    #[test]
    fn byte_order_mark_is_removed() {
        let records = parse_targets("\u{feff}ACAA1\n".as_bytes()).unwrap();
        assert_eq!(gids(&records), vec!["ACAA1"]);
    }

    #[test]
    fn empty_input() {
        assert!(parse_targets("# nothing\n\n".as_bytes()).unwrap().is_empty());
        assert!(parse_target_list(Vec::<String>::new()).unwrap().is_empty());
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_targets("tests/no-targets.txt"),
            Err(GoError::CannotOpenFile(_))
        ));
    }

    #[test]
    fn file_targets_drive_a_query() {
        let ontology =
            Ontology::from_standard("tests/example.obo", "tests/example.gaf", false).unwrap();
        let records = read_targets("tests/targets.txt").unwrap();
        let result = ontology
            .query(&QueryParams::new(target_symbols(&records)).with_min_coverage(1))
            .unwrap();
        assert_eq!(result.missing_symbols(), &["NOTAGENE"]);
        assert!(result.node_set().contains(&GoTermId::from(5634u32)));
        assert!(result.node_set().contains(&GoTermId::from(16787u32)));
    }
}
