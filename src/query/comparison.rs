//! Compare the node sets of two subgraph queries
//!
//! # Examples
//!
//! ```rust
//! use genescape::{Ontology, QueryParams};
//! use genescape::query::comparison::Comparison;
//!
//! let ontology = Ontology::from_standard("tests/example.obo", "tests/example.gaf", false).unwrap();
//! let lhs = ontology.query(&QueryParams::new(["ACAA1"]).with_min_coverage(1)).unwrap();
//! let rhs = ontology.query(&QueryParams::new(["ACADVL"]).with_min_coverage(1)).unwrap();
//!
//! let comparison = Comparison::new(&lhs, &rhs);
//! assert_eq!(comparison.common().len(), 7);
//! assert!(comparison.jaccard() > 0.5);
//! ```
use std::fmt::Display;

use crate::ontology::OntologyGraph;
use crate::query::SubgraphQueryResult;
use crate::term::TermGroup;

/// Jaccard index `|A ∩ B| / |A ∪ B|`
///
/// Defined as `0.0` if both sets are empty.
#[allow(clippy::cast_precision_loss)]
pub fn jaccard(lhs: &TermGroup, rhs: &TermGroup) -> f64 {
    let union = (lhs | rhs).len();
    if union == 0 {
        return 0.0;
    }
    (lhs & rhs).len() as f64 / union as f64
}

/// Overlap coefficient `|A ∩ B| / min(|A|, |B|)`
///
/// Defined as `0.0` if one of the sets is empty.
#[allow(clippy::cast_precision_loss)]
pub fn overlap_coefficient(lhs: &TermGroup, rhs: &TermGroup) -> f64 {
    let smaller = lhs.len().min(rhs.len());
    if smaller == 0 {
        return 0.0;
    }
    (lhs & rhs).len() as f64 / smaller as f64
}

#[derive(Debug)]
/// Compares the subgraphs of two queries
pub struct Comparison<'a> {
    lhs: &'a SubgraphQueryResult,
    rhs: &'a SubgraphQueryResult,
}

impl<'a> Display for Comparison<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Nodes\t{}\t{}\nCommon\t{}\nJaccard\t{:.3}\nOverlap\t{:.3}",
            self.lhs.node_set().len(),
            self.rhs.node_set().len(),
            self.common().len(),
            self.jaccard(),
            self.overlap_coefficient()
        )
    }
}

impl<'a> Comparison<'a> {
    pub fn new(lhs: &'a SubgraphQueryResult, rhs: &'a SubgraphQueryResult) -> Self {
        Self { lhs, rhs }
    }

    pub fn jaccard(&self) -> f64 {
        jaccard(self.lhs.node_set(), self.rhs.node_set())
    }

    pub fn overlap_coefficient(&self) -> f64 {
        overlap_coefficient(self.lhs.node_set(), self.rhs.node_set())
    }

    /// Terms present in both node sets
    pub fn common(&self) -> TermGroup {
        self.lhs.node_set() & self.rhs.node_set()
    }

    /// Terms present in only one of the node sets
    pub fn exclusive(&self) -> (TermGroup, TermGroup) {
        let common = self.common();
        let only = |nodes: &TermGroup| -> TermGroup {
            nodes.iter().filter(|id| !common.contains(id)).collect()
        };
        (only(self.lhs.node_set()), only(self.rhs.node_set()))
    }

    /// The part of `graph` that both subgraphs share
    pub fn common_subgraph(&self, graph: &OntologyGraph) -> OntologyGraph {
        graph.induced_subgraph(&self.common())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::GoTermId;

    fn group(ids: &[u32]) -> TermGroup {
        ids.iter().map(|id| GoTermId::from(*id)).collect()
    }

    #[test]
    fn empty_sets() {
        let empty = TermGroup::new();
        assert!(jaccard(&empty, &empty).abs() < f64::EPSILON);
        assert!(overlap_coefficient(&empty, &empty).abs() < f64::EPSILON);
        assert!(overlap_coefficient(&empty, &group(&[1])).abs() < f64::EPSILON);
    }

    #[test]
    fn identical_sets() {
        let a = group(&[1, 2, 3]);
        assert!((jaccard(&a, &a) - 1.0).abs() < f64::EPSILON);
        assert!((overlap_coefficient(&a, &a) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn symmetry_and_bounds() {
        let sets = [
            group(&[1, 2, 3]),
            group(&[2, 3, 4, 5]),
            group(&[9]),
            TermGroup::new(),
        ];
        for a in &sets {
            for b in &sets {
                let j = jaccard(a, b);
                assert!((j - jaccard(b, a)).abs() < f64::EPSILON);
                assert!((0.0..=1.0).contains(&j));
                let o = overlap_coefficient(a, b);
                assert!((o - overlap_coefficient(b, a)).abs() < f64::EPSILON);
                assert!((0.0..=1.0).contains(&o));
            }
        }
    }

    #[test]
    fn partial_overlap() {
        let a = group(&[1, 2, 3]);
        let b = group(&[2, 3, 4, 5]);
        assert!((jaccard(&a, &b) - 0.4).abs() < 1e-9);
        assert!((overlap_coefficient(&a, &b) - 2.0 / 3.0).abs() < 1e-9);
    }
}
