//! Enrichment tables of g:Profiler and Enrichr
//!
//! Both tools report one row per enriched term. The rows are filtered by
//! adjusted p-value and source category, the remaining GO ids become the
//! targets of a subgraph query:
//!
//! ```
//! use genescape::Ontology;
//! use genescape::targets::enrichment::{read_enrichment, EnrichmentFilter};
//!
//! let ontology = Ontology::from_standard("tests/example.obo", "tests/example.gaf", false).unwrap();
//! let table = read_enrichment("tests/gprofiler.csv").unwrap();
//!
//! let filter = EnrichmentFilter::new().with_category("GO:MF").unwrap();
//! let result = ontology.query(&table.query_params(&filter)).unwrap();
//! assert_eq!(result.node_set().len(), 3);
//! ```
//!
//! Files ending with `.csv` (or `.csv.gz`) are comma separated, all others
//! tab separated.
use std::fmt::Display;
use std::io::Read;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::parser::open_text;
use crate::query::QueryParams;
use crate::term::{GoTermId, TermGroup};
use crate::{GoError, GoResult};

/// Default upper bound of the adjusted p-value
pub const DEFAULT_MAX_P_VALUE: f64 = 0.05;

const GPROFILER_COLUMNS: [&str; 8] = [
    "source",
    "term_id",
    "term_name",
    "adjusted_p_value",
    "intersection_size",
    "term_size",
    "query_size",
    "effective_domain_size",
];

const ENRICHR_COLUMNS: [&str; 3] = ["Term", "Overlap", "Adjusted P-value"];

/// The tool that produced an enrichment table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentFormat {
    GProfiler,
    Enrichr,
}

impl EnrichmentFormat {
    fn columns(self) -> &'static [&'static str] {
        match self {
            EnrichmentFormat::GProfiler => &GPROFILER_COLUMNS,
            EnrichmentFormat::Enrichr => &ENRICHR_COLUMNS,
        }
    }

    fn missing_columns(self, headers: &csv::StringRecord) -> Vec<&'static str> {
        self.columns()
            .iter()
            .filter(|column| !headers.iter().any(|header| header == **column))
            .copied()
            .collect()
    }

    /// The first format whose columns are all present, g:Profiler wins
    fn detect(headers: &csv::StringRecord) -> GoResult<Self> {
        let mut best: Option<Vec<&str>> = None;
        for format in [EnrichmentFormat::GProfiler, EnrichmentFormat::Enrichr] {
            let missing = format.missing_columns(headers);
            if missing.is_empty() {
                return Ok(format);
            }
            if best.as_ref().map_or(true, |best| missing.len() < best.len()) {
                best = Some(missing);
            }
        }
        Err(GoError::InvalidInput(format!(
            "unknown enrichment table, missing columns: {}",
            best.unwrap_or_default().join(", ")
        )))
    }
}

impl Display for EnrichmentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrichmentFormat::GProfiler => write!(f, "g:Profiler"),
            EnrichmentFormat::Enrichr => write!(f, "Enrichr"),
        }
    }
}

/// One enriched term
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichmentRow {
    pub term_id: GoTermId,
    pub name: String,
    /// Source category, e.g. `GO:BP`. Empty for Enrichr.
    pub category: String,
    /// Adjusted p-value
    pub p_value: f64,
    /// Input genes annotated to the term
    pub common_size: usize,
    pub term_size: usize,
    pub query_size: usize,
    pub domain_size: usize,
}

impl EnrichmentRow {
    /// `(common_size / query_size) / (term_size / domain_size)`
    ///
    /// `None` if one of the sizes is unknown, as for Enrichr tables.
    #[allow(clippy::cast_precision_loss)]
    pub fn fold_enrichment(&self) -> Option<f64> {
        if self.query_size == 0 || self.domain_size == 0 || self.term_size == 0 {
            return None;
        }
        let observed = self.common_size as f64 / self.query_size as f64;
        let expected = self.term_size as f64 / self.domain_size as f64;
        Some(observed / expected)
    }
}

#[derive(Deserialize)]
struct GProfilerRecord {
    source: String,
    term_id: String,
    term_name: String,
    adjusted_p_value: f64,
    intersection_size: usize,
    term_size: usize,
    query_size: usize,
    effective_domain_size: usize,
}

impl TryFrom<GProfilerRecord> for EnrichmentRow {
    type Error = GoError;
    fn try_from(record: GProfilerRecord) -> GoResult<Self> {
        Ok(Self {
            term_id: GoTermId::try_from(record.term_id.as_str())?,
            name: record.term_name,
            category: record.source,
            p_value: record.adjusted_p_value,
            common_size: record.intersection_size,
            term_size: record.term_size,
            query_size: record.query_size,
            domain_size: record.effective_domain_size,
        })
    }
}

#[derive(Deserialize)]
struct EnrichrRecord {
    #[serde(rename = "Term")]
    term: String,
    #[serde(rename = "Overlap")]
    overlap: String,
    #[serde(rename = "Adjusted P-value")]
    p_value: f64,
}

impl TryFrom<EnrichrRecord> for EnrichmentRow {
    type Error = GoError;
    fn try_from(record: EnrichrRecord) -> GoResult<Self> {
        // `fatty acid metabolic process (GO:0006631)`
        let Some((name, term_id)) = record
            .term
            .strip_suffix(')')
            .and_then(|term| term.rsplit_once(" ("))
        else {
            return Err(GoError::InvalidTermId(record.term));
        };

        // `3/120`
        let Some((common, term_size)) = record.overlap.split_once('/') else {
            return Err(GoError::InvalidInput(format!(
                "invalid overlap {}",
                record.overlap
            )));
        };

        Ok(Self {
            term_id: GoTermId::try_from(term_id)?,
            name: name.trim().to_string(),
            category: String::new(),
            p_value: record.p_value,
            common_size: common.trim().parse()?,
            term_size: term_size.trim().parse()?,
            query_size: 0,
            domain_size: 0,
        })
    }
}

/// Selects rows of an [`EnrichmentTable`]
///
/// By default rows need an adjusted p-value below
/// [`DEFAULT_MAX_P_VALUE`], the category is not checked.
#[derive(Debug, Clone)]
pub struct EnrichmentFilter {
    max_p_value: Option<f64>,
    category: Option<Regex>,
}

impl Default for EnrichmentFilter {
    fn default() -> Self {
        Self {
            max_p_value: Some(DEFAULT_MAX_P_VALUE),
            category: None,
        }
    }
}

impl EnrichmentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps rows with an adjusted p-value strictly below `max_p_value`
    #[must_use]
    pub fn with_max_p_value(mut self, max_p_value: f64) -> Self {
        self.max_p_value = Some(max_p_value);
        self
    }

    /// Keeps rows regardless of their p-value
    #[must_use]
    pub fn without_p_value(mut self) -> Self {
        self.max_p_value = None;
        self
    }

    /// Keeps rows whose category matches `pattern`, case-insensitive
    ///
    /// Rows without a category always pass.
    ///
    /// # Errors
    ///
    /// [`GoError::InvalidInput`] if `pattern` is not a valid regex
    pub fn with_category(mut self, pattern: &str) -> GoResult<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|err| GoError::InvalidInput(err.to_string()))?;
        self.category = Some(regex);
        Ok(self)
    }

    pub fn matches(&self, row: &EnrichmentRow) -> bool {
        if let Some(max) = self.max_p_value {
            if row.p_value >= max {
                return false;
            }
        }
        match &self.category {
            Some(regex) if !row.category.is_empty() => regex.is_match(&row.category),
            _ => true,
        }
    }
}

/// The parsed rows of an enrichment table
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentTable {
    format: EnrichmentFormat,
    rows: Vec<EnrichmentRow>,
    skipped: usize,
}

impl EnrichmentTable {
    pub fn format(&self) -> EnrichmentFormat {
        self.format
    }

    /// All parsed rows in table order
    pub fn rows(&self) -> &[EnrichmentRow] {
        &self.rows
    }

    /// Number of rows that could not be parsed
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The rows that pass `filter`, in table order
    pub fn selected(&self, filter: &EnrichmentFilter) -> Vec<&EnrichmentRow> {
        self.rows.iter().filter(|row| filter.matches(row)).collect()
    }

    /// The GO ids of the rows that pass `filter`
    pub fn term_ids(&self, filter: &EnrichmentFilter) -> TermGroup {
        self.selected(filter).iter().map(|row| row.term_id).collect()
    }

    /// Query parameters for the subtree of all selected terms
    ///
    /// Every GO id is a target of its own, so the minimum coverage is `1`.
    pub fn query_params(&self, filter: &EnrichmentFilter) -> QueryParams {
        let ids = self.term_ids(filter);
        debug!("{} of {} enriched terms selected", ids.len(), self.len());
        QueryParams::new(ids.iter().map(|id| id.to_string())).with_min_coverage(1)
    }
}

/// Returns the field delimiter for a table file
fn delimiter(path: &Path) -> u8 {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    if name.ends_with(".csv") {
        b','
    } else {
        b'\t'
    }
}

/// Reads an enrichment table, gzip-compressed if the name ends with `.gz`
///
/// # Errors
///
/// - [`GoError::CannotOpenFile`]: The file is missing
/// - [`GoError::InvalidInput`]: The columns match no known tool
pub fn read_enrichment<P: AsRef<Path>>(path: P) -> GoResult<EnrichmentTable> {
    let path = path.as_ref();
    let table = parse_enrichment(open_text(path)?, delimiter(path))?;
    info!(
        "Read {} {} rows from {} ({} skipped)",
        table.len(),
        table.format(),
        path.display(),
        table.skipped()
    );
    Ok(table)
}

/// Parses an enrichment table with the given field delimiter
///
/// The format is detected from the header row. Rows without a GO id or
/// with invalid numbers are skipped with a warning.
pub fn parse_enrichment<R: Read>(reader: R, delimiter: u8) -> GoResult<EnrichmentTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let format = EnrichmentFormat::detect(reader.headers()?)?;

    let mut rows = Vec::new();
    let skipped = match format {
        EnrichmentFormat::GProfiler => collect_rows::<_, GProfilerRecord>(&mut reader, &mut rows)?,
        EnrichmentFormat::Enrichr => collect_rows::<_, EnrichrRecord>(&mut reader, &mut rows)?,
    };

    Ok(EnrichmentTable {
        format,
        rows,
        skipped,
    })
}

/// Returns the number of skipped rows
fn collect_rows<R, T>(reader: &mut csv::Reader<R>, rows: &mut Vec<EnrichmentRow>) -> GoResult<usize>
where
    R: Read,
    T: DeserializeOwned,
    EnrichmentRow: TryFrom<T, Error = GoError>,
{
    let mut skipped = 0;
    for record in reader.deserialize::<T>() {
        let record = match record {
            Ok(record) => record,
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                warn!("Skipping enrichment row: {err}");
                skipped += 1;
                continue;
            }
        };
        match EnrichmentRow::try_from(record) {
            Ok(row) => rows.push(row),
            Err(err) => {
                warn!("Skipping enrichment row: {err}");
                skipped += 1;
            }
        }
    }
    Ok(skipped)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Ontology;

    fn ids(group: &TermGroup) -> Vec<u32> {
        group.iter().map(|id| id.as_u32()).collect()
    }

    fn example() -> Ontology {
        Ontology::from_standard("tests/example.obo", "tests/example.gaf", false).unwrap()
    }

    #[test]
    fn delimiter_from_name() {
        assert_eq!(delimiter(Path::new("gprofiler.csv")), b',');
        assert_eq!(delimiter(Path::new("data/GPROFILER.CSV.gz")), b',');
        assert_eq!(delimiter(Path::new("enrichr.txt")), b'\t');
        assert_eq!(delimiter(Path::new("enrichr.tsv.gz")), b'\t');
    }

    #[test]
    fn gprofiler_table() {
        let table = read_enrichment("tests/gprofiler.csv").unwrap();
        assert_eq!(table.format(), EnrichmentFormat::GProfiler);
        assert_eq!(table.len(), 5);
        assert_eq!(table.skipped(), 1);

        let row = &table.rows()[0];
        assert_eq!(row.term_id, GoTermId::from(16787u32));
        assert_eq!(row.name, "hydrolase activity");
        assert_eq!(row.category, "GO:MF");
        assert_eq!(row.common_size, 2);
        let fold = row.fold_enrichment().unwrap();
        assert!((fold - 100.0).abs() < 1e-9);
    }

    #[test]
    fn p_value_filter() {
        let table = read_enrichment("tests/gprofiler.csv").unwrap();
        let filter = EnrichmentFilter::new();
        assert_eq!(
            ids(&table.term_ids(&filter)),
            vec![5634, 6631, 16787, 9_999_999]
        );

        let filter = EnrichmentFilter::new().with_max_p_value(0.01);
        assert_eq!(ids(&table.term_ids(&filter)), vec![16787]);

        let filter = EnrichmentFilter::new().without_p_value();
        assert_eq!(table.selected(&filter).len(), 5);
    }

    #[test]
    fn category_filter() {
        let table = read_enrichment("tests/gprofiler.csv").unwrap();
        let filter = EnrichmentFilter::new().with_category("go:bp").unwrap();
        assert_eq!(ids(&table.term_ids(&filter)), vec![6631, 9_999_999]);

        let filter = EnrichmentFilter::new().with_category("GO:(MF|CC)").unwrap();
        assert_eq!(ids(&table.term_ids(&filter)), vec![5634, 16787]);

        assert!(matches!(
            EnrichmentFilter::new().with_category("GO:("),
            Err(GoError::InvalidInput(_))
        ));
    }

    #[test]
    fn subtree_of_enriched_terms() {
        let ontology = example();
        let table = read_enrichment("tests/gprofiler.csv").unwrap();

        let filter = EnrichmentFilter::new().with_category("GO:BP").unwrap();
        let params = table.query_params(&filter);
        assert_eq!(params.min_coverage(), Some(1));

        let result = ontology.query(&params).unwrap();
        assert_eq!(result.missing_symbols(), &["GO:9999999"]);
        assert_eq!(
            ids(result.node_set()),
            vec![6629, 6631, 8150, 8152, 9987, 44237, 44255]
        );
        assert_eq!(result.exit_code(), 1);
    }

    #[test]
    fn enrichr_table() {
        let table = read_enrichment("tests/enrichr.txt").unwrap();
        assert_eq!(table.format(), EnrichmentFormat::Enrichr);
        assert_eq!(table.len(), 2);
        assert_eq!(table.skipped(), 1);

        let row = &table.rows()[0];
        assert_eq!(row.term_id, GoTermId::from(6631u32));
        assert_eq!(row.name, "fatty acid metabolic process");
        assert_eq!(row.common_size, 3);
        assert_eq!(row.term_size, 120);
        assert!(row.category.is_empty());
        assert!(row.fold_enrichment().is_none());

        // rows without a category pass any category filter
        let filter = EnrichmentFilter::new().with_category("GO:MF").unwrap();
        assert_eq!(ids(&table.term_ids(&filter)), vec![6631]);
    }

    #[test]
    fn unknown_columns() {
        let table = "gene\tscore\nACAA1\t1.0\n";
        match parse_enrichment(table.as_bytes(), b'\t') {
            Err(GoError::InvalidInput(msg)) => assert!(msg.contains("Overlap")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn invalid_numbers_are_skipped() {
        let table = "Term\tOverlap\tAdjusted P-value\n\
                     lipid metabolic process (GO:0006629)\tmany\t0.01\n\
                     nucleus (GO:0005634)\t1/10\tnot-a-number\n";
        let table = parse_enrichment(table.as_bytes(), b'\t').unwrap();
        assert!(table.is_empty());
        assert_eq!(table.skipped(), 2);
    }
}
