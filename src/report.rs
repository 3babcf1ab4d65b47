//! Serializable views of a [`SubgraphQueryResult`]
//!
//! - [`AnnotationReport`]: one row per selected term, as JSON or CSV
//! - [`SubgraphExport`]: nodes and edges of the subgraph, for graph drawing
use serde::{Deserialize, Serialize};

use crate::index::Index;
use crate::query::SubgraphQueryResult;
use crate::term::{GoTermId, Namespace};
use crate::{GoError, GoResult};

/// One selected term of the annotation report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub term_id: GoTermId,
    /// `BP`, `MF`, `CC` or `?`
    pub namespace_root: String,
    pub coverage_count: usize,
    pub function_name: String,
    pub source_symbols: Vec<String>,
    pub coverage_count_duplicate: usize,
    pub total_targets: usize,
    /// `(coverage_count/total_targets)`
    pub label: String,
}

/// Flat form of [`AnnotationRecord`] with the sources joined by `;`
#[derive(Serialize)]
struct CsvRecord<'a> {
    term_id: GoTermId,
    namespace_root: &'a str,
    coverage_count: usize,
    function_name: &'a str,
    source_symbols: String,
    coverage_count_duplicate: usize,
    total_targets: usize,
    label: &'a str,
}

impl<'a> From<&'a AnnotationRecord> for CsvRecord<'a> {
    fn from(record: &'a AnnotationRecord) -> Self {
        Self {
            term_id: record.term_id,
            namespace_root: &record.namespace_root,
            coverage_count: record.coverage_count,
            function_name: &record.function_name,
            source_symbols: record.source_symbols.join(";"),
            coverage_count_duplicate: record.coverage_count_duplicate,
            total_targets: record.total_targets,
            label: &record.label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStatus {
    /// `1` if some targets are unknown
    pub exit_code: i32,
    pub unknown_terms: Vec<String>,
}

/// The annotation report of a query
///
/// Records are sorted by coverage, highest first, ties are broken by the
/// term id, also descending.
///
/// # Examples
///
/// ```
/// use genescape::{Ontology, QueryParams};
/// use genescape::report::AnnotationReport;
///
/// let ontology = Ontology::from_standard("tests/example.obo", "tests/example.gaf", false).unwrap();
/// let result = ontology.query(&QueryParams::new(["ACAA1", "CYP1A1"]).with_min_coverage(1)).unwrap();
///
/// let report = AnnotationReport::new(&result, ontology.index()).unwrap();
/// let first = &report.data()[0];
/// assert_eq!(first.term_id.to_string(), "GO:0016787");
/// assert_eq!(first.label, "(2/2)");
///
/// let csv = report.to_csv().unwrap();
/// assert!(csv.contains("ACAA1;CYP1A1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationReport {
    data: Vec<AnnotationRecord>,
    status: ReportStatus,
}

impl AnnotationReport {
    /// Builds the report for all terms that passed the filters
    ///
    /// # Errors
    ///
    /// [`GoError::DoesNotExist`] if a selected term is not part of `index`
    pub fn new(result: &SubgraphQueryResult, index: &Index) -> GoResult<Self> {
        let total_targets = result.valid_symbols().len();
        let mut data = Vec::with_capacity(result.surviving_terms().len());

        for id in result.surviving_terms() {
            let term = index.term(&id).ok_or(GoError::DoesNotExist)?;
            let sources = result.term_to_inputs().get(&id).cloned().unwrap_or_default();
            let coverage = sources.len();
            data.push(AnnotationRecord {
                term_id: id,
                namespace_root: term.namespace().code().to_string(),
                coverage_count: coverage,
                function_name: term.name().to_string(),
                source_symbols: sources,
                coverage_count_duplicate: coverage,
                total_targets,
                label: format!("({coverage}/{total_targets})"),
            });
        }
        data.sort_by(|a, b| {
            (b.coverage_count, b.term_id).cmp(&(a.coverage_count, a.term_id))
        });

        Ok(Self {
            data,
            status: ReportStatus {
                exit_code: result.exit_code(),
                unknown_terms: result.missing_symbols().to_vec(),
            },
        })
    }

    pub fn data(&self) -> &[AnnotationRecord] {
        &self.data
    }

    pub fn status(&self) -> &ReportStatus {
        &self.status
    }

    /// `{"data": [...], "status": {...}}`, pretty printed
    pub fn to_json(&self) -> GoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The records as CSV with a header line
    ///
    /// An empty report yields an empty string.
    pub fn to_csv(&self) -> GoResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in &self.data {
            writer.serialize(CsvRecord::from(record))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| GoError::Io(err.into_error()))?;
        String::from_utf8(bytes).map_err(|err| GoError::InvalidInput(err.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportNode {
    pub id: GoTermId,
    pub name: String,
    pub namespace: Namespace,
    pub is_seed: bool,
    pub direct_source_count: usize,
    pub cumulative_source_count: usize,
    pub cumulative_annotation_count: usize,
    pub descendant_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEdge {
    pub parent_id: GoTermId,
    pub child_id: GoTermId,
}

/// Nodes and edges of a query subgraph
///
/// Nodes are sorted by id, edges by parent and then child id, so the same
/// query always produces the same export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgraphExport {
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<ExportEdge>,
}

impl SubgraphExport {
    /// # Errors
    ///
    /// [`GoError::DoesNotExist`] if a subgraph node is not part of `index`
    pub fn new(result: &SubgraphQueryResult, index: &Index) -> GoResult<Self> {
        let nodes = result
            .nodes()
            .iter()
            .map(|node| {
                let term = index.term(&node.id).ok_or(GoError::DoesNotExist)?;
                Ok(ExportNode {
                    id: node.id,
                    name: term.name().to_string(),
                    namespace: term.namespace(),
                    is_seed: node.is_seed,
                    direct_source_count: node.direct_sources.len(),
                    cumulative_source_count: node.cumulative_source_count,
                    cumulative_annotation_count: term.cumulative_annotation_count(),
                    descendant_count: term.descendant_count(),
                })
            })
            .collect::<GoResult<Vec<ExportNode>>>()?;
        let edges = result
            .edges()
            .into_iter()
            .map(|(parent_id, child_id)| ExportEdge {
                parent_id,
                child_id,
            })
            .collect();
        Ok(Self { nodes, edges })
    }

    pub fn to_json(&self) -> GoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
