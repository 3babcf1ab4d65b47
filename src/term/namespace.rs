use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::GoError;

/// The three sub-ontologies of GO
///
/// Any namespace value other than the three GO roots is mapped to
/// [`Namespace::Unknown`] instead of failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    BiologicalProcess,
    MolecularFunction,
    CellularComponent,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Namespace {
    /// Maps the OBO `namespace:` value to a [`Namespace`]
    ///
    /// # Examples
    ///
    /// ```
    /// use genescape::Namespace;
    ///
    /// assert_eq!(Namespace::from_obo("molecular_function"), Namespace::MolecularFunction);
    /// assert_eq!(Namespace::from_obo("external"), Namespace::Unknown);
    /// ```
    pub fn from_obo(value: &str) -> Self {
        match value.trim() {
            "biological_process" => Namespace::BiologicalProcess,
            "molecular_function" => Namespace::MolecularFunction,
            "cellular_component" => Namespace::CellularComponent,
            _ => Namespace::Unknown,
        }
    }

    /// The OBO spelling of the namespace
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::BiologicalProcess => "biological_process",
            Namespace::MolecularFunction => "molecular_function",
            Namespace::CellularComponent => "cellular_component",
            Namespace::Unknown => "unknown",
        }
    }

    /// The two-letter root code used in reports (`BP`, `MF`, `CC`)
    ///
    /// Unknown namespaces are reported as `?`.
    pub fn code(&self) -> &'static str {
        match self {
            Namespace::BiologicalProcess => "BP",
            Namespace::MolecularFunction => "MF",
            Namespace::CellularComponent => "CC",
            Namespace::Unknown => "?",
        }
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Restricts a query to one GO root, or to none
///
/// # Examples
///
/// ```
/// use genescape::{Namespace, NamespaceFilter};
///
/// let filter: NamespaceFilter = "bp".parse().unwrap();
/// assert!(filter.matches(Namespace::BiologicalProcess));
/// assert!(!filter.matches(Namespace::CellularComponent));
///
/// assert!(NamespaceFilter::All.matches(Namespace::Unknown));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NamespaceFilter {
    #[default]
    All,
    Only(Namespace),
}

impl NamespaceFilter {
    /// All filter choices that a caller can offer
    pub const CHOICES: [NamespaceFilter; 4] = [
        NamespaceFilter::All,
        NamespaceFilter::Only(Namespace::BiologicalProcess),
        NamespaceFilter::Only(Namespace::MolecularFunction),
        NamespaceFilter::Only(Namespace::CellularComponent),
    ];

    /// Returns `true` if a term of `namespace` passes the filter
    pub fn matches(&self, namespace: Namespace) -> bool {
        match self {
            NamespaceFilter::All => true,
            NamespaceFilter::Only(ns) => *ns == namespace,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            NamespaceFilter::All => "ALL",
            NamespaceFilter::Only(ns) => ns.code(),
        }
    }
}

impl FromStr for NamespaceFilter {
    type Err = GoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(NamespaceFilter::All),
            "BP" => Ok(NamespaceFilter::Only(Namespace::BiologicalProcess)),
            "MF" => Ok(NamespaceFilter::Only(Namespace::MolecularFunction)),
            "CC" => Ok(NamespaceFilter::Only(Namespace::CellularComponent)),
            other => Err(GoError::InvalidInput(format!(
                "unknown namespace root {other}, expected one of ALL, BP, MF, CC"
            ))),
        }
    }
}

impl Display for NamespaceFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for NamespaceFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for NamespaceFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
