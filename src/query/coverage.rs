//! Automatic selection of the minimum coverage
//!
//! Rendered GO subgraphs become unreadable quickly. When the caller does
//! not provide a minimum coverage, the smallest threshold is chosen whose
//! ancestor closure stays within a node bound
//! ([`crate::DEFAULT_COVERAGE_NODE_BOUND`] unless configured otherwise).
//!
//! Thresholds are tried in increasing order from `1` up to the highest
//! coverage of any candidate term. If even the highest threshold exceeds
//! the bound, `1` is used and the full subgraph is returned.
use tracing::debug;

use crate::ontology::OntologyGraph;
use crate::term::{GoTermId, TermGroup};

/// A candidate term and its coverage
pub type Candidate = (GoTermId, usize);

/// Returns the smallest threshold whose node set has at most `bound` nodes
///
/// # Examples
///
/// ```
/// use genescape::query::coverage::estimate_min_coverage;
/// use genescape::{GoTermId, Index, OntologyGraph};
///
/// let index = Index::from_standard_files("tests/example.obo", "tests/example.gaf", false).unwrap();
/// let graph = OntologyGraph::from_index(&index);
///
/// let candidates = [
///     (GoTermId::from(6631u32), 1),
///     (GoTermId::from(6629u32), 1),
///     (GoTermId::from(16787u32), 2),
/// ];
/// assert_eq!(estimate_min_coverage(&graph, &candidates, 50), 1);
/// assert_eq!(estimate_min_coverage(&graph, &candidates, 3), 2);
/// assert_eq!(estimate_min_coverage(&graph, &candidates, 2), 1);
/// ```
pub fn estimate_min_coverage(graph: &OntologyGraph, candidates: &[Candidate], bound: usize) -> usize {
    let Some(max_coverage) = candidates.iter().map(|(_, coverage)| *coverage).max() else {
        return 1;
    };

    // closure of every candidate, computed once for all thresholds
    let closures: Vec<(usize, TermGroup)> = candidates
        .iter()
        .map(|(id, coverage)| {
            let mut closure = graph.ancestors(id);
            closure.insert(*id);
            (*coverage, closure)
        })
        .collect();

    for threshold in 1..=max_coverage {
        let size = node_set_size(&closures, threshold);
        debug!("Coverage threshold {threshold} yields {size} nodes");
        if size <= bound {
            return threshold;
        }
    }
    debug!("No coverage threshold yields at most {bound} nodes, using 1");
    1
}

fn node_set_size(closures: &[(usize, TermGroup)], threshold: usize) -> usize {
    closures
        .iter()
        .filter(|(coverage, _)| *coverage >= threshold)
        .fold(TermGroup::new(), |nodes, (_, closure)| &nodes | closure)
        .len()
}
