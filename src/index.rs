//! The persisted GO index
//!
//! An [`Index`] merges the parsed ontology with the parsed associations.
//! It is built once from the raw sources and then saved to disk, every
//! query afterwards only loads it.
//!
//! The on-disk format is JSON, gzip-compressed if the file name ends with
//! `.gz`:
//!
//! ```text
//! {
//!   "metadata": {"version": ..., "build_date": ..., ...},
//!   "terms": {"GO:0008150": {"id": "GO:0008150", "name": ..., "is_a": [...], ...}},
//!   "symbol_to_terms": {"ACAA1": ["GO:0006631", ...]},
//!   "term_to_symbols": {"GO:0006631": ["ACAA1", ...]}
//! }
//! ```
use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::annotations::AssociationIndex;
use crate::parser::{self, is_gzip, open_text, ParsedGaf, ParsedObo};
use crate::term::{GoTermId, Term, TermGroup};
use crate::{GoError, GoResult};

mod metadata;

pub use metadata::Metadata;

/// Terms, associations and build information
///
/// # Examples
///
/// ```
/// use genescape::{GoTermId, Index};
///
/// let index = Index::from_standard_files("tests/example.obo", "tests/example.gaf", false).unwrap();
///
/// let term = index.term(&GoTermId::from(6631u32)).unwrap();
/// assert_eq!(term.name(), "fatty acid metabolic process");
/// assert_eq!(term.direct_annotation_count(), 2);
///
/// assert_eq!(index.resolve("acaa1").len(), 2);
/// assert_eq!(index.resolve("GO:0005634").len(), 1);
/// assert!(index.resolve("NOTAGENE").is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    metadata: Metadata,
    terms: BTreeMap<GoTermId, Term>,
    symbol_to_terms: BTreeMap<String, TermGroup>,
    term_to_symbols: BTreeMap<GoTermId, Vec<String>>,
}

impl Index {
    /// Merges ontology terms and associations
    ///
    /// Sets the `direct_annotation_count` of every non-obsolete term to
    /// the number of distinct symbols annotated to it.
    pub fn build(
        terms: BTreeMap<GoTermId, Term>,
        associations: AssociationIndex,
        metadata: Metadata,
    ) -> Self {
        let (symbol_to_terms, term_to_symbols) = associations.into_parts();
        let mut index = Self {
            metadata,
            terms,
            symbol_to_terms,
            term_to_symbols,
        };

        for term in index.terms.values_mut() {
            if term.obsolete() {
                continue;
            }
            let count = index
                .term_to_symbols
                .get(&term.id())
                .map_or(0, Vec::len);
            term.set_direct_annotation_count(count);
        }

        info!("{}", index.stats());
        index
    }

    /// Builds the index from already parsed sources
    ///
    /// The version information of both headers is copied to `metadata`.
    pub fn from_parsed(obo: ParsedObo, gaf: ParsedGaf, metadata: Metadata) -> Self {
        let (obo_header, terms) = obo.into_parts();
        let (gaf_header, associations) = gaf.into_parts();
        let metadata = metadata
            .with_obo_data_version(obo_header.data_version)
            .with_gaf_version(gaf_header.gaf_version);
        Index::build(terms, associations, metadata)
    }

    /// Parses `go-basic.obo` and a GAF file and builds the index
    ///
    /// # Errors
    ///
    /// - [`GoError::CannotOpenFile`]: A source file is missing
    /// - [`GoError::MissingTermId`]: The OBO file contains a term without id
    pub fn from_standard_files<P: AsRef<Path>, Q: AsRef<Path>>(
        obo: P,
        gaf: Q,
        include_synonyms: bool,
    ) -> GoResult<Self> {
        let metadata = Metadata::new(obo.as_ref(), gaf.as_ref(), include_synonyms);
        let parsed_obo = parser::read_obo_file(obo)?;
        let parsed_gaf = parser::read_gaf_file(gaf, include_synonyms)?;
        Ok(Index::from_parsed(parsed_obo, parsed_gaf, metadata))
    }

    /// Loads a saved index, gzip-compressed if the name ends with `.gz`
    pub fn from_file<P: AsRef<Path>>(path: P) -> GoResult<Self> {
        let source = path.as_ref().display().to_string();
        let index = Index::from_reader(open_text(path)?)?;
        debug!("Loaded index from {source}");
        Ok(index)
    }

    pub fn from_reader<R: Read>(reader: R) -> GoResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Writes the index to `path`
    ///
    /// The file is gzip-compressed if the name ends with `.gz`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> GoResult<()> {
        let path = path.as_ref();
        let file =
            File::create(path).map_err(|_| GoError::CannotOpenFile(path.display().to_string()))?;
        let writer = BufWriter::new(file);
        if is_gzip(path) {
            let mut encoder = GzEncoder::new(writer, Compression::default());
            self.to_writer(&mut encoder)?;
            encoder.finish()?.flush()?;
        } else {
            let mut writer = writer;
            self.to_writer(&mut writer)?;
            writer.flush()?;
        }
        info!("Saved index to {}", path.display());
        Ok(())
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> GoResult<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn terms(&self) -> &BTreeMap<GoTermId, Term> {
        &self.terms
    }

    pub fn term(&self, id: &GoTermId) -> Option<&Term> {
        self.terms.get(id)
    }

    pub(crate) fn term_mut(&mut self, id: &GoTermId) -> Option<&mut Term> {
        self.terms.get_mut(id)
    }

    pub fn symbol_to_terms(&self) -> &BTreeMap<String, TermGroup> {
        &self.symbol_to_terms
    }

    pub fn term_to_symbols(&self) -> &BTreeMap<GoTermId, Vec<String>> {
        &self.term_to_symbols
    }

    /// Returns the symbols annotated directly to a term
    pub fn symbols_of(&self, id: &GoTermId) -> &[String] {
        self.term_to_symbols.get(id).map_or(&[][..], Vec::as_slice)
    }

    /// Number of terms in the index
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns the terms that `token` stands for
    ///
    /// A GO term id resolves to itself. Anything else is looked up as an
    /// uppercased symbol.
    pub fn resolve(&self, token: &str) -> TermGroup {
        if let Ok(id) = GoTermId::try_from(token) {
            return TermGroup::from(vec![id]);
        }
        self.symbol_to_terms
            .get(&token.trim().to_uppercase())
            .cloned()
            .unwrap_or_default()
    }

    /// Returns `true` if `token` is a known symbol or the id of a known term
    pub fn is_known(&self, token: &str) -> bool {
        match GoTermId::try_from(token) {
            Ok(id) => self.terms.contains_key(&id),
            Err(_) => self
                .symbol_to_terms
                .contains_key(&token.trim().to_uppercase()),
        }
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            mappings: self.symbol_to_terms.values().map(TermGroup::len).sum(),
            symbols: self.symbol_to_terms.len(),
            terms: self.term_to_symbols.len(),
            source: self.metadata.source_gaf_filename.clone(),
        }
    }
}

/// Size information of an [`Index`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    /// Distinct symbol - term pairs
    pub mappings: usize,
    pub symbols: usize,
    /// Terms with at least one annotation
    pub terms: usize,
    pub source: String,
}

impl Display for IndexStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "index: {} mappings, {} symbols, {} terms ({})",
            self.mappings, self.symbols, self.terms, self.source
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn example() -> Index {
        Index::from_standard_files("tests/example.obo", "tests/example.gaf", false).unwrap()
    }

    #[test]
    fn direct_counts() {
        let index = example();
        let count = |n: u32| {
            index
                .term(&GoTermId::from(n))
                .unwrap()
                .direct_annotation_count()
        };
        assert_eq!(count(6631), 2);
        assert_eq!(count(16787), 2);
        assert_eq!(count(5634), 2);
        assert_eq!(count(6629), 1);
        assert_eq!(count(8150), 0);
    }

    #[test]
    fn obsolete_terms_are_not_indexed() {
        let index = example();
        assert!(index.term(&GoTermId::from(4u32)).is_none());
        assert_eq!(index.symbols_of(&GoTermId::from(4u32)), &["OLD1"]);
    }

    #[test]
    fn known_tokens() {
        let index = example();
        assert!(index.is_known("acadvl"));
        assert!(index.is_known("GO:0008150"));
        assert!(!index.is_known("GO:0000004"));
        assert!(!index.is_known("NOTAGENE"));
    }

    #[test]
    fn stats_line() {
        let index = example();
        assert_eq!(
            index.stats().to_string(),
            "index: 8 mappings, 5 symbols, 5 terms (example.gaf)"
        );
    }

    #[test]
    fn metadata_versions() {
        let index = example();
        let metadata = index.metadata();
        assert_eq!(metadata.source_obo_filename, "example.obo");
        assert_eq!(metadata.obo_data_version.as_deref(), Some("releases/2024-01-17"));
        assert_eq!(metadata.gaf_version.as_deref(), Some("2.2"));
        assert!(!metadata.synonyms_included);
    }

    #[test]
    fn roundtrip_plain_and_gzip() {
        let index = example();
        let dir = tempfile::tempdir().unwrap();
        for name in ["index.json", "index.json.gz"] {
            let path = dir.path().join(name);
            index.save(&path).unwrap();
            let loaded = Index::from_file(&path).unwrap();
            assert_eq!(loaded, index);
        }
    }

    #[test]
    fn gzip_is_compressed() {
        let index = example();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json.gz");
        index.save(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn missing_index_file() {
        assert!(matches!(
            Index::from_file("tests/nothing-here.json.gz"),
            Err(GoError::CannotOpenFile(_))
        ));
    }
}
