//! GO terms and term identifiers
//!
//! A [`Term`] is one concept of the Gene Ontology. Terms are identified
//! by a [`GoTermId`] and belong to one of the three GO roots ([`Namespace`]).
//! Sets of term ids are represented as [`TermGroup`].

mod goterm;
mod group;
mod namespace;
mod termid;

pub use goterm::Term;
pub use group::{GoTermIds, TermGroup};
pub use namespace::{Namespace, NamespaceFilter};
pub use termid::GoTermId;
