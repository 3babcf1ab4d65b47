use serde::{Deserialize, Serialize};

use crate::term::{GoTermId, Namespace, TermGroup};

/// A single GO concept
///
/// The record is created by the OBO parser, receives its
/// `direct_annotation_count` from the index builder and the aggregated
/// values from the rollup. After that it is only read.
///
/// The serialized form is the `terms` section of the persisted index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    id: GoTermId,
    name: String,
    namespace: Namespace,
    #[serde(rename = "is_a", default)]
    parents: TermGroup,
    #[serde(default)]
    obsolete: bool,
    #[serde(default)]
    direct_annotation_count: usize,
    #[serde(default)]
    cumulative_annotation_count: usize,
    #[serde(default)]
    descendant_count: usize,
    #[serde(default)]
    out_degree: usize,
    #[serde(default)]
    in_degree: usize,
}

impl Term {
    pub fn new(id: GoTermId, name: String, namespace: Namespace) -> Self {
        Self {
            id,
            name,
            namespace,
            parents: TermGroup::new(),
            obsolete: false,
            direct_annotation_count: 0,
            cumulative_annotation_count: 0,
            descendant_count: 0,
            out_degree: 0,
            in_degree: 0,
        }
    }

    pub fn id(&self) -> GoTermId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// The `is_a` parents as listed in the source ontology
    ///
    /// This can contain ids of obsolete or missing terms, the
    /// [`crate::OntologyGraph`] drops those edges.
    pub fn parents(&self) -> &TermGroup {
        &self.parents
    }

    pub fn obsolete(&self) -> bool {
        self.obsolete
    }

    /// Number of distinct symbols annotated directly to this term
    pub fn direct_annotation_count(&self) -> usize {
        self.direct_annotation_count
    }

    /// Direct annotations of this term plus the cumulative annotations
    /// of all child terms
    pub fn cumulative_annotation_count(&self) -> usize {
        self.cumulative_annotation_count
    }

    pub fn descendant_count(&self) -> usize {
        self.descendant_count
    }

    /// Number of child terms in the ontology graph
    pub fn out_degree(&self) -> usize {
        self.out_degree
    }

    /// Number of parent terms in the ontology graph
    pub fn in_degree(&self) -> usize {
        self.in_degree
    }

    pub(crate) fn add_parent(&mut self, parent: GoTermId) -> bool {
        self.parents.insert(parent)
    }

    pub(crate) fn set_direct_annotation_count(&mut self, count: usize) {
        self.direct_annotation_count = count;
    }

    pub(crate) fn set_rollup(
        &mut self,
        cumulative_annotation_count: usize,
        descendant_count: usize,
        in_degree: usize,
        out_degree: usize,
    ) {
        self.cumulative_annotation_count = cumulative_annotation_count;
        self.descendant_count = descendant_count;
        self.in_degree = in_degree;
        self.out_degree = out_degree;
    }
}
