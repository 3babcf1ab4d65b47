//! Bottom-up aggregation of annotation counts
//!
//! For every node `n` with children `c`:
//!
//! ```text
//! descendant_count[n]            = Σ (descendant_count[c] + 1)
//! cumulative_annotation_count[n] = direct_annotation_count[n] + Σ cumulative_annotation_count[c]
//! ```
//!
//! A term that is reachable via several paths contributes once per path.
use tracing::info;

use crate::index::Index;
use crate::ontology::OntologyGraph;
use crate::GoResult;

/// Aggregated values of one term
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollupValues {
    pub cumulative_annotation_count: usize,
    pub descendant_count: usize,
}

/// Computes the rollup of all graph nodes and stores it in `index`
///
/// Every node is visited exactly once, children before their parents, and
/// its result is reused by all parents. The degree fields of the terms are
/// set at the same time.
///
/// # Errors
///
/// [`crate::GoError::CyclicGraph`] if the graph is not acyclic. `index`
/// is not modified in that case.
pub fn compute_rollup(graph: &OntologyGraph, index: &mut Index) -> GoResult<Vec<RollupValues>> {
    let order = graph.post_order_positions()?;
    let mut values = vec![RollupValues::default(); graph.len()];

    for idx in order {
        let direct = index
            .term(&graph.id_at(idx))
            .map_or(0, |term| term.direct_annotation_count());
        let mut current = RollupValues {
            cumulative_annotation_count: direct,
            descendant_count: 0,
        };
        for child in graph.children_at(idx) {
            let child = values[*child];
            current.descendant_count += child.descendant_count + 1;
            current.cumulative_annotation_count += child.cumulative_annotation_count;
        }
        values[idx] = current;
    }

    for (idx, rollup) in values.iter().enumerate() {
        if let Some(term) = index.term_mut(&graph.id_at(idx)) {
            term.set_rollup(
                rollup.cumulative_annotation_count,
                rollup.descendant_count,
                graph.parents_at(idx).len(),
                graph.children_at(idx).len(),
            );
        }
    }

    info!("Rolled up annotation counts of {} terms", graph.len());
    Ok(values)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::GoTermId;
    use crate::GoError;

    fn example() -> (OntologyGraph, Index) {
        let mut index =
            Index::from_standard_files("tests/example.obo", "tests/example.gaf", false).unwrap();
        let graph = OntologyGraph::from_index(&index);
        compute_rollup(&graph, &mut index).unwrap();
        (graph, index)
    }

    #[test]
    fn descendant_counts() {
        let (_, index) = example();
        let expected = [
            (6631u32, 0),
            (44255, 1),
            (44237, 2),
            (6629, 2),
            (9987, 3),
            (8152, 6),
            (8150, 11),
            (16787, 0),
            (3824, 1),
            (3674, 2),
            (5634, 0),
            (110_165, 1),
            (5575, 2),
        ];
        for (id, count) in expected {
            assert_eq!(
                index.term(&GoTermId::from(id)).unwrap().descendant_count(),
                count,
                "descendants of {id}"
            );
        }
    }

    #[test]
    fn cumulative_counts() {
        let (_, index) = example();
        let expected = [
            (6631u32, 2),
            (44255, 2),
            (44237, 2),
            (6629, 3),
            (9987, 2),
            (8152, 5),
            (8150, 7),
            (3824, 2),
            (3674, 2),
            (110_165, 2),
            (5575, 2),
        ];
        for (id, count) in expected {
            assert_eq!(
                index
                    .term(&GoTermId::from(id))
                    .unwrap()
                    .cumulative_annotation_count(),
                count,
                "cumulative count of {id}"
            );
        }
    }

    #[test]
    fn conservation_holds_for_all_nodes() {
        let (graph, index) = example();
        for id in graph.ids() {
            let term = index.term(id).unwrap();
            let children: usize = graph
                .successors(id)
                .map(|child| index.term(&child).unwrap().cumulative_annotation_count())
                .sum();
            assert_eq!(
                term.cumulative_annotation_count(),
                term.direct_annotation_count() + children
            );
        }
    }

    #[test]
    fn monotonic_towards_roots() {
        let (graph, index) = example();
        for (parent, child) in graph.edges() {
            let parent = index.term(&parent).unwrap();
            let child = index.term(&child).unwrap();
            assert!(parent.cumulative_annotation_count() >= child.cumulative_annotation_count());
            assert!(parent.descendant_count() > child.descendant_count());
        }
    }

    #[test]
    fn degrees() {
        let (_, index) = example();
        let term = index.term(&GoTermId::from(44255u32)).unwrap();
        assert_eq!(term.in_degree(), 2);
        assert_eq!(term.out_degree(), 1);
        let term = index.term(&GoTermId::from(6631u32)).unwrap();
        assert_eq!(term.in_degree(), 1);
        assert_eq!(term.out_degree(), 0);
    }

    #[test]
    fn cycle_fails_without_touching_the_index() {
        let obo = "[Term]\nid: GO:0000001\nis_a: GO:0000002\n\n[Term]\nid: GO:0000002\nis_a: GO:0000001\n";
        let (_, terms) = crate::parser::parse_obo(obo.as_bytes()).unwrap().into_parts();
        let mut index = Index::build(
            terms,
            crate::annotations::AssociationIndex::default(),
            crate::index::Metadata::default(),
        );
        let graph = OntologyGraph::from_index(&index);
        let before = index.clone();
        assert!(matches!(
            compute_rollup(&graph, &mut index),
            Err(GoError::CyclicGraph(_))
        ));
        assert_eq!(index, before);
    }
}
