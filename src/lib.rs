#![doc = include_str!("../README.md")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

use std::num::ParseIntError;
use thiserror::Error;

pub mod annotations;
pub mod cache;
pub mod config;
pub mod index;
pub mod ontology;
pub mod parser;
pub mod query;
pub mod report;
pub mod targets;
pub mod term;

pub use cache::IndexCache;
pub use config::Config;
pub use index::Index;
pub use ontology::{Ontology, OntologyGraph};
pub use query::{QueryParams, SubgraphQueryResult};
pub use targets::TargetRecord;
pub use term::{GoTermId, Namespace, NamespaceFilter, Term, TermGroup};

/// Upper bound of nodes in the induced subgraph that the automatic
/// coverage estimation aims for
///
/// GO subgraphs with more than ~50 boxes are no longer readable when
/// rendered, so this is the default target for [`query::coverage`].
pub const DEFAULT_COVERAGE_NODE_BOUND: usize = 50;

const DEFAULT_NUM_PARENTS: usize = 4;
const DEFAULT_NUM_TERMS: usize = 50_000;

/// Minimum number of tab-separated columns of a GAF row
///
/// The synonym column (11th) is the right-most one we read.
const MIN_GAF_COLUMNS: usize = 11;

#[derive(Error, Debug)]
pub enum GoError {
    #[error("term does not exist")]
    DoesNotExist,
    #[error("unable to parse Integer")]
    ParseIntError,
    #[error("invalid term id: {0}")]
    InvalidTermId(String),
    #[error("term stanza without an id:\n{0}")]
    MissingTermId(String),
    #[error("invalid input data: {0}")]
    InvalidInput(String),
    #[error("cannot open file {0}")]
    CannotOpenFile(String),
    #[error("the ontology contains a cycle: {0}")]
    CyclicGraph(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("cache lock is poisoned")]
    LockPoisoned,
    #[error("unable to (de)serialize index: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ParseIntError> for GoError {
    fn from(_: ParseIntError) -> Self {
        GoError::ParseIntError
    }
}

/// Shortcut for `Result<T, GoError>`
pub type GoResult<T> = Result<T, GoError>;
