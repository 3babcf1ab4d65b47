use std::collections::{HashMap, HashSet};
use std::iter::once;

use tracing::{debug, warn};

use crate::index::Index;
use crate::term::{GoTermId, TermGroup};
use crate::{GoError, GoResult, DEFAULT_NUM_TERMS};

/// The `is_a` DAG of all non-obsolete terms
///
/// Nodes are stored in an arena, sorted by [`GoTermId`], and refer to each
/// other by their arena position. Edges point from parent to child, so the
/// successors of a node are the more specific terms.
///
/// Every adjacency list is sorted, which makes every traversal
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OntologyGraph {
    nodes: Vec<GoTermId>,
    children: Vec<Vec<usize>>,
    parents: Vec<Vec<usize>>,
    lookup: HashMap<GoTermId, usize>,
    dropped_edges: Vec<(GoTermId, GoTermId)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mark {
    New,
    Active,
    Done,
}

impl OntologyGraph {
    /// Builds the graph from all non-obsolete terms of the index
    ///
    /// `is_a` references to terms that are missing or obsolete are
    /// dropped with a warning, see [`OntologyGraph::dropped_edges`].
    pub fn from_index(index: &Index) -> Self {
        let mut graph = OntologyGraph::with_capacity(index.len().min(DEFAULT_NUM_TERMS));
        let terms = index.terms().values().filter(|term| !term.obsolete());

        for term in terms.clone() {
            graph.push_node(term.id());
        }

        for term in terms {
            for parent in term.parents() {
                if !graph.add_edge(parent, term.id()) {
                    warn!(
                        "Dropping is_a edge {} -> {parent}, parent is missing or obsolete",
                        term.id()
                    );
                    graph.dropped_edges.push((parent, term.id()));
                }
            }
        }
        debug!(
            "Ontology graph with {} nodes and {} edges",
            graph.len(),
            graph.edge_count()
        );
        graph
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            children: Vec::with_capacity(capacity),
            parents: Vec::with_capacity(capacity),
            lookup: HashMap::with_capacity(capacity),
            dropped_edges: Vec::new(),
        }
    }

    /// Nodes must be pushed in ascending id order
    fn push_node(&mut self, id: GoTermId) {
        self.lookup.insert(id, self.nodes.len());
        self.nodes.push(id);
        self.children.push(Vec::new());
        self.parents.push(Vec::new());
    }

    /// Returns `false` if one of the nodes is not part of the graph
    ///
    /// Children must be added in ascending id order to keep the
    /// adjacency lists sorted.
    fn add_edge(&mut self, parent: GoTermId, child: GoTermId) -> bool {
        let (Some(&parent), Some(&child)) = (self.lookup.get(&parent), self.lookup.get(&child))
        else {
            return false;
        };
        self.children[parent].push(child);
        self.parents[child].push(parent);
        true
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.children.iter().map(Vec::len).sum()
    }

    pub fn contains(&self, id: &GoTermId) -> bool {
        self.lookup.contains_key(id)
    }

    /// All node ids in ascending order
    pub fn ids(&self) -> &[GoTermId] {
        &self.nodes
    }

    /// The `is_a` references that were not turned into edges,
    /// as `(parent, child)`
    pub fn dropped_edges(&self) -> &[(GoTermId, GoTermId)] {
        &self.dropped_edges
    }

    pub(crate) fn position(&self, id: &GoTermId) -> Option<usize> {
        self.lookup.get(id).copied()
    }

    pub(crate) fn id_at(&self, idx: usize) -> GoTermId {
        self.nodes[idx]
    }

    pub(crate) fn children_at(&self, idx: usize) -> &[usize] {
        &self.children[idx]
    }

    pub(crate) fn parents_at(&self, idx: usize) -> &[usize] {
        &self.parents[idx]
    }

    /// The direct children of a term, i.e. the more specific terms
    pub fn successors(&self, id: &GoTermId) -> impl Iterator<Item = GoTermId> + '_ {
        self.position(id)
            .into_iter()
            .flat_map(move |idx| self.children[idx].iter().map(move |c| self.nodes[*c]))
    }

    /// The direct parents of a term
    pub fn predecessors(&self, id: &GoTermId) -> impl Iterator<Item = GoTermId> + '_ {
        self.position(id)
            .into_iter()
            .flat_map(move |idx| self.parents[idx].iter().map(move |p| self.nodes[*p]))
    }

    /// All terms that `id` is a (transitive) subclass of
    ///
    /// The term itself is not included.
    pub fn ancestors(&self, id: &GoTermId) -> TermGroup {
        self.reachable(id, &self.parents)
    }

    /// All (transitive) subclasses of `id`, without the term itself
    pub fn descendants(&self, id: &GoTermId) -> TermGroup {
        self.reachable(id, &self.children)
    }

    fn reachable(&self, id: &GoTermId, adjacency: &[Vec<usize>]) -> TermGroup {
        let Some(start) = self.position(id) else {
            return TermGroup::new();
        };
        let mut visited: HashSet<usize> = HashSet::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            for next in &adjacency[idx] {
                if visited.insert(*next) {
                    stack.push(*next);
                }
            }
        }
        visited.remove(&start);
        visited.into_iter().map(|idx| self.nodes[idx]).collect()
    }

    /// All terms without a parent
    pub fn roots(&self) -> TermGroup {
        self.root_positions().map(|idx| self.nodes[idx]).collect()
    }

    fn root_positions(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.nodes.len()).filter(|idx| self.parents[*idx].is_empty())
    }

    /// All edges as `(parent, child)`, sorted by parent and then child
    pub fn edges(&self) -> Vec<(GoTermId, GoTermId)> {
        self.children
            .iter()
            .enumerate()
            .flat_map(|(parent, children)| {
                children
                    .iter()
                    .map(move |child| (self.nodes[parent], self.nodes[*child]))
            })
            .collect()
    }

    /// Returns the graph restricted to `ids`
    ///
    /// Ids that are not part of the graph are ignored. All edges between
    /// two retained nodes are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use genescape::{GoTermId, Index, OntologyGraph, TermGroup};
    ///
    /// let index = Index::from_standard_files("tests/example.obo", "tests/example.gaf", false).unwrap();
    /// let graph = OntologyGraph::from_index(&index);
    ///
    /// let nucleus = GoTermId::from(5634u32);
    /// let mut nodes = graph.ancestors(&nucleus);
    /// nodes.insert(nucleus);
    ///
    /// let subgraph = graph.induced_subgraph(&nodes);
    /// assert_eq!(subgraph.len(), 3);
    /// assert_eq!(subgraph.edge_count(), 2);
    /// ```
    pub fn induced_subgraph(&self, ids: &TermGroup) -> OntologyGraph {
        let mut subgraph = OntologyGraph::with_capacity(ids.len());
        for id in ids {
            if self.contains(&id) {
                subgraph.push_node(id);
            }
        }
        for child in subgraph.nodes.clone() {
            for parent in self.predecessors(&child) {
                subgraph.add_edge(parent, child);
            }
        }
        subgraph
    }

    /// All terms ordered children-before-parents
    ///
    /// # Errors
    ///
    /// [`GoError::CyclicGraph`] if the `is_a` relations contain a cycle.
    /// The error names the terms of the cycle.
    pub fn post_order(&self) -> GoResult<Vec<GoTermId>> {
        Ok(self
            .post_order_positions()?
            .into_iter()
            .map(|idx| self.nodes[idx])
            .collect())
    }

    /// Iterative depth-first traversal from every root
    ///
    /// A second pass starts from every node that was not reached, so that
    /// a cycle without any root is detected as well.
    pub(crate) fn post_order_positions(&self) -> GoResult<Vec<usize>> {
        let mut marks = vec![Mark::New; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        let starts: Vec<usize> = self
            .root_positions()
            .chain(0..self.nodes.len())
            .collect();

        for start in starts {
            if marks[start] != Mark::New {
                continue;
            }
            marks[start] = Mark::Active;
            // (node, position of the next child to visit)
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];

            while let Some(frame) = stack.last_mut() {
                let (node, next) = *frame;
                if let Some(&child) = self.children[node].get(next) {
                    frame.1 += 1;
                    match marks[child] {
                        Mark::New => {
                            marks[child] = Mark::Active;
                            stack.push((child, 0));
                        }
                        Mark::Active => {
                            return Err(GoError::CyclicGraph(self.cycle_path(&stack, child)));
                        }
                        Mark::Done => (),
                    }
                } else {
                    marks[node] = Mark::Done;
                    order.push(node);
                    stack.pop();
                }
            }
        }
        Ok(order)
    }

    fn cycle_path(&self, stack: &[(usize, usize)], closing: usize) -> String {
        let start = stack
            .iter()
            .position(|(node, _)| *node == closing)
            .unwrap_or_default();
        stack[start..]
            .iter()
            .map(|(node, _)| *node)
            .chain(once(closing))
            .map(|node| self.nodes[node].to_string())
            .collect::<Vec<String>>()
            .join(" -> ")
    }
}
