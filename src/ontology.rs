use std::path::Path;

use tracing::info;

use crate::index::Index;
use crate::query::{self, QueryParams, SubgraphQueryResult};
use crate::term::{GoTermId, Term};
use crate::GoResult;

mod graph;
pub mod rollup;

pub use graph::OntologyGraph;
pub use rollup::{compute_rollup, RollupValues};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// `Ontology` is the main interface of the `genescape` crate
///
/// It bundles the [`Index`] with the [`OntologyGraph`] built from it. The
/// rollup of annotation counts is computed during construction, so every
/// [`Term`] of an `Ontology` carries its final counts.
///
/// # Examples
///
/// ```
/// use genescape::{GoTermId, Ontology, QueryParams};
///
/// let ontology = Ontology::from_standard("tests/example.obo", "tests/example.gaf", false).unwrap();
///
/// let root = ontology.term(&GoTermId::from(8150u32)).unwrap();
/// assert_eq!(root.name(), "biological_process");
/// assert_eq!(root.cumulative_annotation_count(), 7);
///
/// let params = QueryParams::new(["ACAA1", "CYP1A1"]).with_min_coverage(2);
/// let result = ontology.query(&params).unwrap();
/// assert_eq!(result.node_set().len(), 3);
/// ```
///
/// # Construction
///
/// 1. From the raw sources, `go-basic.obo` and a GAF file such as
///    `goa_human.gaf.gz`, with [`Ontology::from_standard`]
/// 2. From a previously saved index with [`Ontology::from_index_file`].
///    Use [`Ontology::save`] to write one.
///
/// # Layout
///
/// ```mermaid
/// erDiagram
///     ONTOLOGY ||--|| INDEX : contains
///     ONTOLOGY ||--|| GRAPH : contains
///     INDEX ||--|{ TERM : terms
///     INDEX ||--o{ SYMBOL : symbol_to_terms
///     TERM ||--|{ TERM : is_a
///     TERM }|--o{ SYMBOL : annotated_with
///     GRAPH ||--|{ TERM : nodes
/// ```
#[derive(Debug, Clone, Default)]
pub struct Ontology {
    index: Index,
    graph: OntologyGraph,
}

impl Ontology {
    /// Builds the graph of `index` and computes the rollup
    ///
    /// # Errors
    ///
    /// [`crate::GoError::CyclicGraph`] if the terms contain an `is_a` cycle
    pub fn new(mut index: Index) -> GoResult<Self> {
        let graph = OntologyGraph::from_index(&index);
        compute_rollup(&graph, &mut index)?;
        Ok(Self { index, graph })
    }

    /// Parses the raw OBO and GAF sources
    ///
    /// # Errors
    ///
    /// - [`crate::GoError::CannotOpenFile`]: A source file is missing
    /// - [`crate::GoError::MissingTermId`]: A term stanza has no id
    /// - [`crate::GoError::CyclicGraph`]: The terms contain an `is_a` cycle
    pub fn from_standard<P: AsRef<Path>, Q: AsRef<Path>>(
        obo: P,
        gaf: Q,
        include_synonyms: bool,
    ) -> GoResult<Self> {
        let ontology = Ontology::new(Index::from_standard_files(obo, gaf, include_synonyms)?)?;
        info!("Ontology with {} terms ready", ontology.len());
        Ok(ontology)
    }

    /// Loads a saved index
    ///
    /// The graph is rebuilt from the terms, the rollup is recomputed.
    pub fn from_index_file<P: AsRef<Path>>(path: P) -> GoResult<Self> {
        Ontology::new(Index::from_file(path)?)
    }

    /// Writes the index, including all rollup values
    pub fn save<P: AsRef<Path>>(&self, path: P) -> GoResult<()> {
        self.index.save(path)
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn graph(&self) -> &OntologyGraph {
        &self.graph
    }

    /// Returns the term, if it exists and is not obsolete
    pub fn term(&self, id: &GoTermId) -> Option<&Term> {
        if self.graph.contains(id) {
            self.index.term(id)
        } else {
            None
        }
    }

    /// Iterates all terms of the graph in ascending id order
    pub fn terms(&self) -> impl Iterator<Item = &Term> + '_ {
        self.graph.ids().iter().filter_map(|id| self.index.term(id))
    }

    /// Number of terms in the graph
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Runs a subgraph query, see [`query::query`]
    pub fn query(&self, params: &QueryParams) -> GoResult<SubgraphQueryResult> {
        query::query(&self.index, &self.graph, params)
    }
}
