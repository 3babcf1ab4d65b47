//! Stanza parser for `go-basic.obo`
//!
//! ```text
//! format-version: 1.2
//! data-version: releases/2024-01-17
//!
//! [Term]
//! id: GO:0006631
//! name: fatty acid metabolic process
//! namespace: biological_process
//! is_a: GO:0044255 ! cellular lipid metabolic process
//! ```
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, info, trace, warn};

use crate::parser::open_text;
use crate::term::{GoTermId, Namespace, Term};
use crate::{GoError, GoResult};

/// Header lines of the OBO file, before the first stanza
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OboHeader {
    pub format_version: Option<String>,
    pub data_version: Option<String>,
    pub ontology: Option<String>,
}

impl OboHeader {
    fn set(&mut self, key: &str, value: &str) {
        let value = Some(value.to_string());
        match key {
            "format-version" => self.format_version = value,
            "data-version" => self.data_version = value,
            "ontology" => self.ontology = value,
            _ => trace!("Ignoring header line {key}"),
        }
    }
}

/// Result of parsing an OBO source
///
/// Obsolete terms are not part of `terms`, they are only counted.
#[derive(Debug, Default)]
pub struct ParsedObo {
    header: OboHeader,
    terms: BTreeMap<GoTermId, Term>,
    obsolete: usize,
}

impl ParsedObo {
    pub fn header(&self) -> &OboHeader {
        &self.header
    }

    pub fn terms(&self) -> &BTreeMap<GoTermId, Term> {
        &self.terms
    }

    /// Number of obsolete terms that were skipped
    pub fn obsolete_count(&self) -> usize {
        self.obsolete
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub(crate) fn into_parts(self) -> (OboHeader, BTreeMap<GoTermId, Term>) {
        (self.header, self.terms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Header,
    Term,
    Other,
}

/// The currently open `[Term]` stanza
#[derive(Debug, Default)]
struct Stanza {
    id: Option<String>,
    name: Option<String>,
    namespace: Option<String>,
    parents: Vec<GoTermId>,
    obsolete: bool,
    raw: Vec<String>,
}

impl Stanza {
    fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    fn add_line(&mut self, key: &str, value: &str, line: &str) {
        self.raw.push(line.to_string());
        match key {
            "id" => self.id = Some(value.to_string()),
            "name" => self.name = Some(value.to_string()),
            "namespace" => self.namespace = Some(value.to_string()),
            "is_a" => {
                // `is_a: GO:0044255 ! cellular lipid metabolic process`
                let reference = value.split('!').next().unwrap_or_default();
                let Some(parent) = reference.split_whitespace().next() else {
                    warn!("Empty is_a line in stanza: {line}");
                    return;
                };
                match GoTermId::try_from(parent) {
                    Ok(parent) => self.parents.push(parent),
                    Err(_) => warn!("Ignoring invalid is_a reference {parent}"),
                }
            }
            "is_obsolete" => self.obsolete = !value.eq_ignore_ascii_case("false"),
            _ => (),
        }
    }

    fn into_term(self) -> GoResult<Option<Term>> {
        let Some(id) = self.id else {
            return Err(GoError::MissingTermId(self.raw.join("\n")));
        };
        let id = GoTermId::try_from(id.as_str())?;
        if self.obsolete {
            debug!("Skipping obsolete term {id}");
            return Ok(None);
        }
        let namespace = self
            .namespace
            .as_deref()
            .map(Namespace::from_obo)
            .unwrap_or_default();
        let mut term = Term::new(id, self.name.unwrap_or_default(), namespace);
        for parent in self.parents {
            term.add_parent(parent);
        }
        Ok(Some(term))
    }
}

/// Parses an OBO file from disk, gzip-compressed if the name ends with `.gz`
pub fn read_obo_file<P: AsRef<Path>>(path: P) -> GoResult<ParsedObo> {
    let source = path.as_ref().display().to_string();
    let parsed = parse_obo(open_text(path)?)?;
    info!(
        "Parsed {} terms from {source} ({} obsolete skipped)",
        parsed.len(),
        parsed.obsolete_count()
    );
    Ok(parsed)
}

/// Parses an OBO source line by line
///
/// A `[Term]` or any other stanza marker closes the open term stanza, so
/// does the end of the input. `[Typedef]` and other non-term stanzas are
/// ignored.
///
/// # Errors
///
/// - [`GoError::MissingTermId`]: A term stanza has no `id:` line
/// - [`GoError::InvalidTermId`]: A term stanza has an invalid `id:`
/// - [`GoError::Io`]: The source cannot be read
///
/// # Examples
///
/// ```
/// use genescape::parser::parse_obo;
///
/// let obo = "[Term]\nid: GO:0000002\nname: root\nnamespace: biological_process\n\n\
///            [Term]\nid: GO:0000001\nname: child\nis_a: GO:0000002 ! root\n";
/// let parsed = parse_obo(obo.as_bytes()).unwrap();
/// assert_eq!(parsed.len(), 2);
/// ```
pub fn parse_obo<R: BufRead>(reader: R) -> GoResult<ParsedObo> {
    let mut parsed = ParsedObo::default();
    let mut section = Section::Header;
    let mut stanza = Stanza::default();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('!') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            flush(&mut stanza, &mut parsed)?;
            section = if line == "[Term]" {
                Section::Term
            } else {
                trace!("Skipping {line} stanza");
                Section::Other
            };
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            trace!("Ignoring line without key: {line}");
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        match section {
            Section::Header => parsed.header.set(key, value),
            Section::Term => stanza.add_line(key, value, line),
            Section::Other => (),
        }
    }
    flush(&mut stanza, &mut parsed)?;

    Ok(parsed)
}

fn flush(stanza: &mut Stanza, parsed: &mut ParsedObo) -> GoResult<()> {
    if stanza.is_empty() {
        return Ok(());
    }
    match std::mem::take(stanza).into_term()? {
        Some(term) => {
            if let Some(previous) = parsed.terms.insert(term.id(), term) {
                warn!("Duplicate term {}, keeping the later stanza", previous.id());
            }
        }
        None => parsed.obsolete += 1,
    }
    Ok(())
}
