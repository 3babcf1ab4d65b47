//! Parser for GO annotation files (GAF 2.x)
//!
//! ```text
//! !gaf-version: 2.2
//! UniProtKB  P09110  ACAA1  involved_in  GO:0006631  GO_REF:0000107  IEA  ...  P  3-ketoacyl-CoA thiolase, peroxisomal  ACAA|PTHIO  protein  taxon:9606  20240115  Ensembl
//! ```
//!
//! Only four columns are used: the protein id (2), the gene symbol (3), the
//! GO term (5) and the pipe separated synonyms (11).
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::annotations::{AssociationBuilder, AssociationIndex};
use crate::parser::open_text;
use crate::term::GoTermId;
use crate::{GoError, GoResult, MIN_GAF_COLUMNS};

/// Header comments of the GAF file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GafHeader {
    pub gaf_version: Option<String>,
    pub go_version: Option<String>,
}

impl GafHeader {
    fn set(&mut self, line: &str) {
        let Some((key, value)) = line.trim_start_matches('!').split_once(':') else {
            return;
        };
        let value = Some(value.trim().to_string());
        match key.trim() {
            "gaf-version" => self.gaf_version = value,
            "go-version" => self.go_version = value,
            _ => (),
        }
    }
}

/// Result of parsing a GAF source
#[derive(Debug, Default)]
pub struct ParsedGaf {
    header: GafHeader,
    associations: AssociationIndex,
    rows: usize,
    skipped: usize,
}

impl ParsedGaf {
    pub fn header(&self) -> &GafHeader {
        &self.header
    }

    pub fn associations(&self) -> &AssociationIndex {
        &self.associations
    }

    /// Number of association rows that were used
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of malformed rows that were skipped
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub(crate) fn into_parts(self) -> (GafHeader, AssociationIndex) {
        (self.header, self.associations)
    }
}

struct GafRow<'a> {
    protein_id: &'a str,
    symbol: &'a str,
    term: GoTermId,
    synonyms: &'a str,
}

impl<'a> GafRow<'a> {
    /// All symbols of the row that should point to the term
    fn symbols(&self, include_synonyms: bool) -> Vec<&'a str> {
        if include_synonyms {
            let mut symbols = vec![self.protein_id, self.symbol];
            symbols.extend(self.synonyms.split('|'));
            symbols
        } else {
            vec![self.symbol]
        }
    }
}

/// Parses a single association row
fn parse_line(line: &str) -> GoResult<GafRow<'_>> {
    let mut cols = line.split('\t');

    // Column 2 is the DB object id, e.g. the UniProt accession
    let Some(protein_id) = cols.nth(1) else {
        return Err(GoError::InvalidInput(line.to_string()));
    };

    // Column 3 is the gene symbol
    let Some(symbol) = cols.next() else {
        return Err(GoError::InvalidInput(line.to_string()));
    };

    // Column 5 is the GO term, column 4 holds the qualifier
    let Some(term) = cols.nth(1) else {
        return Err(GoError::InvalidInput(line.to_string()));
    };

    // Column 11 are the synonyms
    let Some(synonyms) = cols.nth(5) else {
        return Err(GoError::InvalidInput(line.to_string()));
    };

    Ok(GafRow {
        protein_id: protein_id.trim(),
        symbol: symbol.trim(),
        term: GoTermId::try_from(term.to_uppercase().as_str())?,
        synonyms: synonyms.trim(),
    })
}

/// Parses a GAF file from disk, gzip-compressed if the name ends with `.gz`
pub fn read_gaf_file<P: AsRef<Path>>(path: P, include_synonyms: bool) -> GoResult<ParsedGaf> {
    let source = path.as_ref().display().to_string();
    let parsed = parse_gaf(open_text(path)?, include_synonyms)?;
    info!(
        "Parsed {} annotation rows from {source} ({} skipped)",
        parsed.rows(),
        parsed.skipped()
    );
    Ok(parsed)
}

/// Parses GAF rows into an [`AssociationIndex`]
///
/// Lines starting with `!` are comments. Rows with fewer than eleven
/// columns or an invalid GO id are skipped with a warning.
///
/// # Examples
///
/// ```
/// use genescape::parser::parse_gaf;
///
/// let gaf = "!gaf-version: 2.2\n\
///            UniProtKB\tP09110\tACAA1\tinvolved_in\tGO:0006631\tref\tIEA\t\tP\tname\tACAA|PTHIO\tprotein\n";
///
/// let parsed = parse_gaf(gaf.as_bytes(), true).unwrap();
/// assert_eq!(parsed.associations().symbol_count(), 4);
///
/// let parsed = parse_gaf(gaf.as_bytes(), false).unwrap();
/// assert_eq!(parsed.associations().symbol_count(), 1);
/// ```
pub fn parse_gaf<R: BufRead>(reader: R, include_synonyms: bool) -> GoResult<ParsedGaf> {
    let mut header = GafHeader::default();
    let mut builder = AssociationBuilder::default();
    let mut rows = 0;
    let mut skipped = 0;

    for line in reader.lines() {
        let line = line?;
        if line.starts_with('!') {
            header.set(&line);
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        if line.split('\t').count() < MIN_GAF_COLUMNS {
            warn!("Skipping GAF row with too few columns: {line}");
            skipped += 1;
            continue;
        }

        match parse_line(&line) {
            Ok(row) => {
                builder.add(row.symbols(include_synonyms), row.term);
                rows += 1;
            }
            Err(err) => {
                warn!("Skipping invalid GAF row ({err}): {line}");
                skipped += 1;
            }
        }
    }

    let associations = builder.build();
    debug!(
        "{} symbols annotated to {} terms",
        associations.symbol_count(),
        associations.term_count()
    );

    Ok(ParsedGaf {
        header,
        associations,
        rows,
        skipped,
    })
}
