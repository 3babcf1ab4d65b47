//! Subgraph queries
//!
//! A query takes a list of target symbols (gene symbols, protein ids,
//! synonyms or GO term ids), selects the terms they are annotated with and
//! returns the ancestor-closed subgraph of the ontology that contains them.
//!
//! The selected terms can be filtered by
//! - the namespace root ([`NamespaceFilter`])
//! - a case-insensitive regex on the term name
//! - a minimum coverage, i.e. the number of targets annotated to the term.
//!   Without one, the threshold is estimated, see [`coverage`].
//!
//! Problems with the input, like unknown symbols, never fail a query.
//! They are reported as [`QueryMessage`]s in the result.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use regex::RegexBuilder;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::index::Index;
use crate::ontology::OntologyGraph;
use crate::term::{GoTermId, NamespaceFilter, TermGroup};
use crate::{GoResult, DEFAULT_COVERAGE_NODE_BOUND};

pub mod comparison;
pub mod coverage;

/// The parameters of a subgraph query
///
/// # Examples
///
/// ```
/// use genescape::{Namespace, NamespaceFilter, QueryParams};
///
/// let params = QueryParams::new(["ACAA1", "cyp1a1"])
///     .with_root(NamespaceFilter::Only(Namespace::BiologicalProcess))
///     .with_pattern("lipid")
///     .with_min_coverage(1);
///
/// assert_eq!(params.targets().len(), 2);
/// assert_eq!(params.pattern(), Some("lipid"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    targets: Vec<String>,
    root: NamespaceFilter,
    pattern: Option<String>,
    min_coverage: Option<usize>,
    coverage_node_bound: usize,
}

impl QueryParams {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            root: NamespaceFilter::All,
            pattern: None,
            min_coverage: None,
            coverage_node_bound: DEFAULT_COVERAGE_NODE_BOUND,
        }
    }

    #[must_use]
    pub fn with_root(mut self, root: NamespaceFilter) -> Self {
        self.root = root;
        self
    }

    /// Sets the name pattern, an empty pattern disables the filter
    #[must_use]
    pub fn with_pattern<S: Into<String>>(mut self, pattern: S) -> Self {
        let pattern: String = pattern.into();
        self.pattern = if pattern.trim().is_empty() {
            None
        } else {
            Some(pattern)
        };
        self
    }

    #[must_use]
    pub fn with_min_coverage(mut self, min_coverage: usize) -> Self {
        self.min_coverage = Some(min_coverage);
        self
    }

    /// Removes the minimum coverage, so that it will be estimated
    #[must_use]
    pub fn with_estimated_coverage(mut self) -> Self {
        self.min_coverage = None;
        self
    }

    #[must_use]
    pub fn with_coverage_node_bound(mut self, bound: usize) -> Self {
        self.coverage_node_bound = bound;
        self
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn root(&self) -> NamespaceFilter {
        self.root
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn min_coverage(&self) -> Option<usize> {
        self.min_coverage
    }

    pub fn coverage_node_bound(&self) -> usize {
        self.coverage_node_bound
    }
}

/// Non-fatal conditions of a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryMessage {
    /// Targets that are neither a known symbol nor a known term
    UnknownSymbols { symbols: Vec<String> },
    /// Annotated terms that are not part of the ontology graph
    MissingTerms { terms: Vec<GoTermId> },
    /// The name pattern is not a valid regex and was ignored
    InvalidPattern { pattern: String, error: String },
    NoTermsPassFilters,
}

impl Display for QueryMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryMessage::UnknownSymbols { symbols } => {
                write!(f, "unknown symbols: {}", symbols.join(", "))
            }
            QueryMessage::MissingTerms { terms } => {
                let terms: Vec<String> = terms.iter().map(ToString::to_string).collect();
                write!(f, "terms not in the ontology: {}", terms.join(", "))
            }
            QueryMessage::InvalidPattern { pattern, error } => {
                write!(f, "invalid pattern {pattern}: {error}")
            }
            QueryMessage::NoTermsPassFilters => write!(f, "no terms pass all conditions"),
        }
    }
}

/// A node of the query subgraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubgraphNode {
    pub id: GoTermId,
    /// The term was selected directly and passed all filters
    pub is_seed: bool,
    /// Targets annotated to exactly this term
    pub direct_sources: Vec<String>,
    /// Targets annotated to this term or any descendant inside the subgraph
    pub cumulative_sources: Vec<String>,
    pub cumulative_source_count: usize,
}

/// The outcome of [`query`]
#[derive(Debug, Clone)]
pub struct SubgraphQueryResult {
    targets: Vec<String>,
    valid_symbols: Vec<String>,
    missing_symbols: Vec<String>,
    term_to_inputs: BTreeMap<GoTermId, Vec<String>>,
    missing_terms: TermGroup,
    surviving_terms: TermGroup,
    min_coverage: usize,
    coverage_estimated: bool,
    node_set: TermGroup,
    subgraph: OntologyGraph,
    nodes: Vec<SubgraphNode>,
    messages: Vec<QueryMessage>,
}

impl SubgraphQueryResult {
    /// The uppercased and deduplicated targets, sorted
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn valid_symbols(&self) -> &[String] {
        &self.valid_symbols
    }

    pub fn missing_symbols(&self) -> &[String] {
        &self.missing_symbols
    }

    /// The targets that are annotated directly to each term
    pub fn term_to_inputs(&self) -> &BTreeMap<GoTermId, Vec<String>> {
        &self.term_to_inputs
    }

    pub fn missing_terms(&self) -> &TermGroup {
        &self.missing_terms
    }

    /// The terms that passed all filters
    pub fn surviving_terms(&self) -> &TermGroup {
        &self.surviving_terms
    }

    /// The minimum coverage that was applied
    pub fn min_coverage(&self) -> usize {
        self.min_coverage
    }

    /// Returns `true` if the minimum coverage was estimated
    pub fn coverage_estimated(&self) -> bool {
        self.coverage_estimated
    }

    /// The surviving terms and all their ancestors
    pub fn node_set(&self) -> &TermGroup {
        &self.node_set
    }

    pub fn subgraph(&self) -> &OntologyGraph {
        &self.subgraph
    }

    /// All nodes of the subgraph, sorted by id
    pub fn nodes(&self) -> &[SubgraphNode] {
        &self.nodes
    }

    pub fn node(&self, id: &GoTermId) -> Option<&SubgraphNode> {
        self.nodes
            .binary_search_by(|node| node.id.cmp(id))
            .ok()
            .map(|idx| &self.nodes[idx])
    }

    /// All edges of the subgraph as `(parent, child)`, sorted
    pub fn edges(&self) -> Vec<(GoTermId, GoTermId)> {
        self.subgraph.edges()
    }

    pub fn messages(&self) -> &[QueryMessage] {
        &self.messages
    }

    /// `1` if some targets are unknown, otherwise `0`
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.missing_symbols.is_empty())
    }
}

/// Computes the ancestor-closed subgraph of the targets
///
/// # Errors
///
/// [`crate::GoError::CyclicGraph`] if `graph` contains a cycle. This cannot
/// happen for a graph of an [`crate::Ontology`].
///
/// # Examples
///
/// ```
/// use genescape::{GoTermId, Ontology, QueryParams};
/// use genescape::query::query;
///
/// let ontology = Ontology::from_standard("tests/example.obo", "tests/example.gaf", false).unwrap();
/// let params = QueryParams::new(["ACAA1", "CYP1A1", "NOTAGENE"]).with_min_coverage(1);
///
/// let result = query(ontology.index(), ontology.graph(), &params).unwrap();
/// assert_eq!(result.missing_symbols(), &["NOTAGENE"]);
/// assert_eq!(result.node_set().len(), 10);
/// assert_eq!(result.exit_code(), 1);
///
/// let root = result.node(&GoTermId::from(8150u32)).unwrap();
/// assert_eq!(root.cumulative_sources, vec!["ACAA1", "CYP1A1"]);
/// ```
pub fn query(
    index: &Index,
    graph: &OntologyGraph,
    params: &QueryParams,
) -> GoResult<SubgraphQueryResult> {
    let mut messages = Vec::new();

    let targets: BTreeSet<String> = params
        .targets()
        .iter()
        .map(|target| target.trim().to_uppercase())
        .filter(|target| !target.is_empty())
        .collect();

    let (valid_symbols, missing_symbols): (Vec<String>, Vec<String>) = targets
        .iter()
        .cloned()
        .partition(|target| index.is_known(target));

    if !missing_symbols.is_empty() {
        warn!("Unknown symbols: {}", missing_symbols.join(", "));
        messages.push(QueryMessage::UnknownSymbols {
            symbols: missing_symbols.clone(),
        });
    }

    let mut term_to_inputs: BTreeMap<GoTermId, Vec<String>> = BTreeMap::new();
    for symbol in &valid_symbols {
        for term in &index.resolve(symbol) {
            term_to_inputs.entry(term).or_default().push(symbol.clone());
        }
    }

    let (candidates, missing_terms): (Vec<GoTermId>, Vec<GoTermId>) =
        term_to_inputs.keys().copied().partition(|id| graph.contains(id));
    if !missing_terms.is_empty() {
        warn!("{} annotated terms are not in the ontology", missing_terms.len());
        messages.push(QueryMessage::MissingTerms {
            terms: missing_terms.clone(),
        });
    }

    let mut candidates = filter_namespace(index, candidates, params.root());
    if let Some(pattern) = params.pattern() {
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(regex) => candidates.retain(|id| {
                index
                    .term(id)
                    .is_some_and(|term| regex.is_match(term.name()))
            }),
            Err(err) => {
                error!("Invalid pattern {pattern}: {err}");
                messages.push(QueryMessage::InvalidPattern {
                    pattern: pattern.to_string(),
                    error: err.to_string(),
                });
            }
        }
    }

    let coverage_of = |id: &GoTermId| term_to_inputs.get(id).map_or(0, Vec::len);
    let (min_coverage, coverage_estimated) = match params.min_coverage() {
        Some(min_coverage) => (min_coverage, false),
        None => {
            let scored: Vec<coverage::Candidate> =
                candidates.iter().map(|id| (*id, coverage_of(id))).collect();
            let estimate =
                coverage::estimate_min_coverage(graph, &scored, params.coverage_node_bound());
            debug!("Estimated minimum coverage: {estimate}");
            (estimate, true)
        }
    };
    candidates.retain(|id| coverage_of(id) >= min_coverage);

    let surviving_terms = TermGroup::from(candidates);
    if surviving_terms.is_empty() {
        warn!("No terms pass all conditions");
        messages.push(QueryMessage::NoTermsPassFilters);
    }

    let mut node_set = surviving_terms.clone();
    for id in &surviving_terms {
        node_set = &node_set | &graph.ancestors(&id);
    }

    let subgraph = graph.induced_subgraph(&node_set);
    let nodes = subgraph_nodes(&subgraph, &surviving_terms, &term_to_inputs)?;
    debug!(
        "Subgraph with {} nodes and {} edges",
        subgraph.len(),
        subgraph.edge_count()
    );

    Ok(SubgraphQueryResult {
        targets: targets.into_iter().collect(),
        valid_symbols,
        missing_symbols,
        term_to_inputs,
        missing_terms: TermGroup::from(missing_terms),
        surviving_terms,
        min_coverage,
        coverage_estimated,
        node_set,
        subgraph,
        nodes,
        messages,
    })
}

fn filter_namespace(
    index: &Index,
    mut candidates: Vec<GoTermId>,
    root: NamespaceFilter,
) -> Vec<GoTermId> {
    if root != NamespaceFilter::All {
        candidates.retain(|id| {
            index
                .term(id)
                .is_some_and(|term| root.matches(term.namespace()))
        });
    }
    candidates
}

/// Accumulates the sources of every node over its descendants in `subgraph`
fn subgraph_nodes(
    subgraph: &OntologyGraph,
    seeds: &TermGroup,
    term_to_inputs: &BTreeMap<GoTermId, Vec<String>>,
) -> GoResult<Vec<SubgraphNode>> {
    let mut cumulative: Vec<BTreeSet<String>> = vec![BTreeSet::new(); subgraph.len()];
    for idx in subgraph.post_order_positions()? {
        let mut sources: BTreeSet<String> = term_to_inputs
            .get(&subgraph.id_at(idx))
            .map(|symbols| symbols.iter().cloned().collect())
            .unwrap_or_default();
        for child in subgraph.children_at(idx) {
            sources.extend(cumulative[*child].iter().cloned());
        }
        cumulative[idx] = sources;
    }

    Ok(cumulative
        .into_iter()
        .enumerate()
        .map(|(idx, sources)| {
            let id = subgraph.id_at(idx);
            SubgraphNode {
                id,
                is_seed: seeds.contains(&id),
                direct_sources: term_to_inputs.get(&id).cloned().unwrap_or_default(),
                cumulative_source_count: sources.len(),
                cumulative_sources: sources.into_iter().collect(),
            }
        })
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::annotations::AssociationIndex;
    use crate::index::Metadata;
    use crate::parser::parse_obo;
    use crate::term::Namespace;
    use crate::Ontology;

    fn id(n: u32) -> GoTermId {
        GoTermId::from(n)
    }

    fn example() -> Ontology {
        Ontology::from_standard("tests/example.obo", "tests/example.gaf", false).unwrap()
    }

    fn ids(group: &TermGroup) -> Vec<u32> {
        group.iter().map(|id| id.as_u32()).collect()
    }

    fn params() -> QueryParams {
        QueryParams::new(["acaa1", "CYP1A1", "NOTAGENE", "ACAA1 "])
    }

    #[test]
    fn two_term_scenario() {
        let obo = "[Term]\nid: GO:0000002\nname: general\nnamespace: biological_process\n\n\
                   [Term]\nid: GO:0000001\nname: specific\nnamespace: biological_process\nis_a: GO:0000002 ! general\n";
        let (_, terms) = parse_obo(obo.as_bytes()).unwrap().into_parts();
        let mut builder = AssociationIndex::builder();
        builder.add(["A"], id(1));
        builder.add(["B"], id(2));
        let index = Index::build(terms, builder.build(), Metadata::default());
        let ontology = Ontology::new(index).unwrap();

        let result = ontology
            .query(&QueryParams::new(["A", "B"]).with_min_coverage(1))
            .unwrap();
        assert_eq!(ids(result.node_set()), vec![1, 2]);
        assert_eq!(result.edges(), vec![(id(2), id(1))]);

        let general = result.node(&id(2)).unwrap();
        assert_eq!(general.cumulative_sources, vec!["A", "B"]);
        assert_eq!(general.cumulative_source_count, 2);
        let specific = result.node(&id(1)).unwrap();
        assert_eq!(specific.cumulative_sources, vec!["A"]);
        assert_eq!(specific.cumulative_source_count, 1);
        assert!(result.messages().is_empty());
    }

    #[test]
    fn targets_are_normalized() {
        let result = example().query(&params().with_min_coverage(1)).unwrap();
        assert_eq!(result.targets(), &["ACAA1", "CYP1A1", "NOTAGENE"]);
        assert_eq!(result.valid_symbols(), &["ACAA1", "CYP1A1"]);
        assert_eq!(result.missing_symbols(), &["NOTAGENE"]);
        assert_eq!(
            result.term_to_inputs()[&id(16787)],
            vec!["ACAA1".to_string(), "CYP1A1".to_string()]
        );
        assert_eq!(result.exit_code(), 1);
        assert_eq!(
            result.messages()[0],
            QueryMessage::UnknownSymbols {
                symbols: vec!["NOTAGENE".to_string()]
            }
        );
    }

    #[test]
    fn full_subgraph() {
        let result = example().query(&params().with_min_coverage(1)).unwrap();
        assert_eq!(
            ids(result.node_set()),
            vec![3674, 3824, 6629, 6631, 8150, 8152, 9987, 16787, 44237, 44255]
        );
        assert_eq!(ids(result.surviving_terms()), vec![6629, 6631, 16787]);
        assert!(!result.coverage_estimated());

        let lipid = result.node(&id(6629)).unwrap();
        assert!(lipid.is_seed);
        assert_eq!(lipid.direct_sources, vec!["CYP1A1"]);
        assert_eq!(lipid.cumulative_sources, vec!["ACAA1", "CYP1A1"]);

        let cellular = result.node(&id(44255)).unwrap();
        assert!(!cellular.is_seed);
        assert!(cellular.direct_sources.is_empty());
        assert_eq!(cellular.cumulative_sources, vec!["ACAA1"]);
    }

    #[test]
    fn min_coverage_filter() {
        let result = example().query(&params().with_min_coverage(2)).unwrap();
        assert_eq!(ids(result.node_set()), vec![3674, 3824, 16787]);
        assert_eq!(result.edges(), vec![(id(3674), id(3824)), (id(3824), id(16787))]);
    }

    #[test]
    fn coverage_is_monotonic() {
        let ontology = example();
        let mut previous = usize::MAX;
        for min_coverage in 0..4 {
            let result = ontology
                .query(&params().with_min_coverage(min_coverage))
                .unwrap();
            assert!(result.node_set().len() <= previous);
            previous = result.node_set().len();
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn pattern_filter() {
        let result = example()
            .query(&params().with_pattern("LIPID").with_min_coverage(1))
            .unwrap();
        assert_eq!(ids(result.node_set()), vec![6629, 8150, 8152]);
    }

    #[test]
    fn invalid_pattern_is_skipped() {
        let result = example()
            .query(&params().with_pattern("(").with_min_coverage(1))
            .unwrap();
        assert_eq!(ids(result.surviving_terms()), vec![6629, 6631, 16787]);
        assert!(result
            .messages()
            .iter()
            .any(|msg| matches!(msg, QueryMessage::InvalidPattern { .. })));
    }

    #[test]
    fn namespace_filter() {
        let result = example()
            .query(
                &params()
                    .with_root(NamespaceFilter::Only(Namespace::MolecularFunction))
                    .with_min_coverage(1),
            )
            .unwrap();
        assert_eq!(ids(result.node_set()), vec![3674, 3824, 16787]);
    }

    #[test]
    fn estimated_coverage() {
        let ontology = example();
        let result = ontology.query(&params()).unwrap();
        assert!(result.coverage_estimated());
        assert_eq!(result.min_coverage(), 1);
        assert_eq!(result.node_set().len(), 10);

        let result = ontology.query(&params().with_coverage_node_bound(3)).unwrap();
        assert_eq!(result.min_coverage(), 2);
        assert_eq!(result.node_set().len(), 3);

        let result = ontology.query(&params().with_coverage_node_bound(2)).unwrap();
        assert_eq!(result.min_coverage(), 1);
        assert_eq!(result.node_set().len(), 10);
    }

    #[test]
    fn ancestor_closure_is_complete() {
        let ontology = example();
        let result = ontology.query(&params().with_min_coverage(1)).unwrap();
        for id in result.surviving_terms() {
            for ancestor in &ontology.graph().ancestors(&id) {
                assert!(result.node_set().contains(&ancestor));
            }
        }
    }

    #[test]
    fn term_ids_as_targets() {
        let result = example()
            .query(&QueryParams::new(["go:0005634"]).with_min_coverage(1))
            .unwrap();
        assert_eq!(result.valid_symbols(), &["GO:0005634"]);
        assert_eq!(ids(result.node_set()), vec![5575, 5634, 110_165]);
    }

    #[test]
    fn obsolete_annotations_are_missing_terms() {
        let result = example()
            .query(&QueryParams::new(["OLD1"]).with_min_coverage(1))
            .unwrap();
        assert!(result.missing_symbols().is_empty());
        assert_eq!(ids(result.missing_terms()), vec![4]);
        assert!(result.node_set().is_empty());
        assert_eq!(result.exit_code(), 0);
        assert_eq!(
            result.messages(),
            &[
                QueryMessage::MissingTerms { terms: vec![id(4)] },
                QueryMessage::NoTermsPassFilters
            ]
        );
    }

    #[test]
    fn empty_input() {
        let targets: [&str; 0] = [];
        let result = example().query(&QueryParams::new(targets)).unwrap();
        assert!(result.node_set().is_empty());
        assert!(result.nodes().is_empty());
        assert_eq!(result.messages(), &[QueryMessage::NoTermsPassFilters]);
        assert_eq!(result.exit_code(), 0);
    }

    #[test]
    fn unknown_symbol() {
        let result = example()
            .query(&QueryParams::new(["NOTAREALGENE"]))
            .unwrap();
        assert_eq!(result.missing_symbols(), &["NOTAREALGENE"]);
        assert!(result.node_set().is_empty());
        assert_eq!(result.exit_code(), 1);
        assert_eq!(result.messages().len(), 2);
    }

    #[test]
    fn deterministic_output() {
        let ontology = example();
        let first = ontology.query(&params()).unwrap();
        let second = ontology.query(&params()).unwrap();
        assert_eq!(first.nodes(), second.nodes());
        assert_eq!(first.edges(), second.edges());
    }

    #[test]
    fn message_display() {
        assert_eq!(
            QueryMessage::NoTermsPassFilters.to_string(),
            "no terms pass all conditions"
        );
        assert_eq!(
            QueryMessage::MissingTerms { terms: vec![id(4)] }.to_string(),
            "terms not in the ontology: GO:0000004"
        );
    }
}
