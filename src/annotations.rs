//! Symbol to term associations
//!
//! The [`AssociationIndex`] links the symbols of the GAF file (gene symbols,
//! protein ids and optionally synonyms) to the GO terms they are annotated
//! with, in both directions.
//!
//! All symbols are stored uppercased. Every lookup from user input must
//! uppercase the query first, [`AssociationIndex::terms_of`] does this.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::term::{GoTermId, TermGroup};

/// Bidirectional mapping of symbols and GO terms
///
/// # Examples
///
/// ```
/// use genescape::annotations::AssociationIndex;
/// use genescape::GoTermId;
///
/// let mut builder = AssociationIndex::builder();
/// builder.add(["acaa1", "P09110"], GoTermId::from(6631u32));
/// builder.add(["ACAA1"], GoTermId::from(16787u32));
/// let index = builder.build();
///
/// assert_eq!(index.terms_of("Acaa1").map(|terms| terms.len()), Some(2));
/// assert_eq!(index.symbols_of(&GoTermId::from(6631u32)).len(), 2);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationIndex {
    symbol_to_terms: BTreeMap<String, TermGroup>,
    term_to_symbols: BTreeMap<GoTermId, Vec<String>>,
}

impl AssociationIndex {
    /// Returns a builder that collects raw associations
    pub fn builder() -> AssociationBuilder {
        AssociationBuilder::default()
    }

    /// Returns the terms of a symbol, the lookup is case-insensitive
    pub fn terms_of(&self, symbol: &str) -> Option<&TermGroup> {
        self.symbol_to_terms.get(&symbol.trim().to_uppercase())
    }

    /// Returns the symbols annotated to a term, sorted
    pub fn symbols_of(&self, term: &GoTermId) -> &[String] {
        self.term_to_symbols.get(term).map_or(&[][..], Vec::as_slice)
    }

    pub fn symbol_to_terms(&self) -> &BTreeMap<String, TermGroup> {
        &self.symbol_to_terms
    }

    pub fn term_to_symbols(&self) -> &BTreeMap<GoTermId, Vec<String>> {
        &self.term_to_symbols
    }

    /// Number of distinct symbols
    pub fn symbol_count(&self) -> usize {
        self.symbol_to_terms.len()
    }

    /// Number of distinct annotated terms
    pub fn term_count(&self) -> usize {
        self.term_to_symbols.len()
    }

    /// Number of distinct symbol - term pairs
    pub fn mapping_count(&self) -> usize {
        self.symbol_to_terms.values().map(TermGroup::len).sum()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        BTreeMap<String, TermGroup>,
        BTreeMap<GoTermId, Vec<String>>,
    ) {
        (self.symbol_to_terms, self.term_to_symbols)
    }
}

/// Collects associations without deduplication
///
/// Duplicates are removed once in [`AssociationBuilder::build`], so adding
/// a row never scans the already collected values.
#[derive(Debug, Default)]
pub struct AssociationBuilder {
    symbol_to_terms: HashMap<String, Vec<GoTermId>>,
    term_to_symbols: HashMap<GoTermId, Vec<String>>,
}

impl AssociationBuilder {
    /// Associates every symbol with `term`
    ///
    /// Symbols are uppercased, empty symbols are ignored.
    pub fn add<I, S>(&mut self, symbols: I, term: GoTermId)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for symbol in symbols {
            let symbol = symbol.as_ref().trim();
            if symbol.is_empty() {
                continue;
            }
            let symbol = symbol.to_uppercase();
            self.symbol_to_terms
                .entry(symbol.clone())
                .or_default()
                .push(term);
            self.term_to_symbols.entry(term).or_default().push(symbol);
        }
    }

    /// Returns `true` if no association was added yet
    pub fn is_empty(&self) -> bool {
        self.symbol_to_terms.is_empty()
    }

    /// Deduplicates and sorts all collected associations
    pub fn build(self) -> AssociationIndex {
        let symbol_to_terms = self
            .symbol_to_terms
            .into_iter()
            .map(|(symbol, terms)| (symbol, TermGroup::from_unsorted(terms)))
            .collect();
        let term_to_symbols = self
            .term_to_symbols
            .into_iter()
            .map(|(term, mut symbols)| {
                symbols.sort_unstable();
                symbols.dedup();
                (term, symbols)
            })
            .collect();
        AssociationIndex {
            symbol_to_terms,
            term_to_symbols,
        }
    }
}
