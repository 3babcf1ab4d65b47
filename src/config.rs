//! Configuration of the index locations and query defaults
//!
//! A [`Config`] can be assembled with [`Config::builder`] or read from TOML:
//!
//! ```toml
//! index_path = "data/genescape.json.gz"
//! obo_path = "data/go-basic.obo"
//! gaf_path = "data/goa_human.gaf.gz"
//! namespaces = ["ALL", "BP", "MF", "CC"]
//! coverage_node_bound = 50
//! include_synonyms = false
//! ```
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::query::QueryParams;
use crate::term::NamespaceFilter;
use crate::{GoError, GoResult, Ontology, DEFAULT_COVERAGE_NODE_BOUND};

const DEFAULT_INDEX_PATH: &str = "genescape.json.gz";

/// Locations of the GO data and query defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The saved index
    pub index_path: PathBuf,

    /// `go-basic.obo`, required to build a missing index
    pub obo_path: Option<PathBuf>,

    /// GAF association file, required to build a missing index
    pub gaf_path: Option<PathBuf>,

    /// Namespace roots that queries may select
    pub namespaces: Vec<NamespaceFilter>,

    /// Node bound of the coverage estimation
    pub coverage_node_bound: usize,

    /// Add protein ids and synonyms as symbols when building the index
    pub include_synonyms: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            obo_path: None,
            gaf_path: None,
            namespaces: NamespaceFilter::CHOICES.to_vec(),
            coverage_node_bound: DEFAULT_COVERAGE_NODE_BOUND,
            include_synonyms: false,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parses and validates a TOML configuration
    ///
    /// # Examples
    ///
    /// ```
    /// use genescape::Config;
    ///
    /// let config = Config::from_toml_str("index_path = \"go.json.gz\"\ncoverage_node_bound = 30").unwrap();
    /// assert_eq!(config.coverage_node_bound, 30);
    /// assert_eq!(config.namespaces.len(), 4);
    ///
    /// assert!(Config::from_toml_str("coverage_node_bound = 0").is_err());
    /// ```
    pub fn from_toml_str(content: &str) -> GoResult<Self> {
        let config: Config =
            toml::from_str(content).map_err(|err| GoError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> GoResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|_| GoError::CannotOpenFile(path.display().to_string()))?;
        Config::from_toml_str(&content)
    }

    pub fn validate(&self) -> GoResult<()> {
        if self.index_path.as_os_str().is_empty() {
            return Err(GoError::InvalidConfig(
                "index_path cannot be empty".to_string(),
            ));
        }
        if self.coverage_node_bound == 0 {
            return Err(GoError::InvalidConfig(
                "coverage_node_bound must be greater than 0".to_string(),
            ));
        }
        if self.namespaces.is_empty() {
            return Err(GoError::InvalidConfig(
                "at least one namespace must be allowed".to_string(),
            ));
        }
        if self.obo_path.is_some() != self.gaf_path.is_some() {
            return Err(GoError::InvalidConfig(
                "obo_path and gaf_path must be set together".to_string(),
            ));
        }
        Ok(())
    }

    /// Query parameters for `targets` with the configured node bound
    pub fn query_params<I, S>(&self, targets: I) -> QueryParams
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryParams::new(targets).with_coverage_node_bound(self.coverage_node_bound)
    }

    /// Returns an error if queries may not select `root`
    pub fn check_root(&self, root: NamespaceFilter) -> GoResult<()> {
        if self.namespaces.contains(&root) {
            Ok(())
        } else {
            Err(GoError::InvalidInput(format!(
                "namespace {root} is not enabled"
            )))
        }
    }

    /// Loads the index, building and saving it first if it does not exist
    ///
    /// # Errors
    ///
    /// [`GoError::CannotOpenFile`] if neither the index nor both source
    /// files are available
    pub fn open(&self) -> GoResult<Ontology> {
        if self.index_path.exists() {
            return Ontology::from_index_file(&self.index_path);
        }
        let (Some(obo), Some(gaf)) = (&self.obo_path, &self.gaf_path) else {
            return Err(GoError::CannotOpenFile(
                self.index_path.display().to_string(),
            ));
        };
        info!(
            "Index {} does not exist, building it",
            self.index_path.display()
        );
        let ontology = Ontology::from_standard(obo, gaf, self.include_synonyms)?;
        ontology.save(&self.index_path)?;
        Ok(ontology)
    }
}

/// Builder for [`Config`]
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    index_path: Option<PathBuf>,
    obo_path: Option<PathBuf>,
    gaf_path: Option<PathBuf>,
    namespaces: Option<Vec<NamespaceFilter>>,
    coverage_node_bound: Option<usize>,
    include_synonyms: Option<bool>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn index_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.index_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn sources<P: Into<PathBuf>, Q: Into<PathBuf>>(mut self, obo: P, gaf: Q) -> Self {
        self.obo_path = Some(obo.into());
        self.gaf_path = Some(gaf.into());
        self
    }

    #[must_use]
    pub fn namespaces(mut self, namespaces: Vec<NamespaceFilter>) -> Self {
        self.namespaces = Some(namespaces);
        self
    }

    #[must_use]
    pub fn coverage_node_bound(mut self, bound: usize) -> Self {
        self.coverage_node_bound = Some(bound);
        self
    }

    #[must_use]
    pub fn include_synonyms(mut self, include: bool) -> Self {
        self.include_synonyms = Some(include);
        self
    }

    pub fn build(self) -> GoResult<Config> {
        let default = Config::default();
        let config = Config {
            index_path: self.index_path.unwrap_or(default.index_path),
            obo_path: self.obo_path,
            gaf_path: self.gaf_path,
            namespaces: self.namespaces.unwrap_or(default.namespaces),
            coverage_node_bound: self
                .coverage_node_bound
                .unwrap_or(default.coverage_node_bound),
            include_synonyms: self.include_synonyms.unwrap_or(default.include_synonyms),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::Namespace;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.coverage_node_bound, 50);
        assert_eq!(config.index_path, PathBuf::from("genescape.json.gz"));
        assert!(!config.include_synonyms);
    }

    #[test]
    fn builder() {
        let config = Config::builder()
            .index_path("go.json")
            .sources("go-basic.obo", "goa_human.gaf.gz")
            .namespaces(vec![NamespaceFilter::Only(Namespace::BiologicalProcess)])
            .coverage_node_bound(20)
            .include_synonyms(true)
            .build()
            .unwrap();
        assert_eq!(config.obo_path, Some(PathBuf::from("go-basic.obo")));
        assert!(config.check_root(NamespaceFilter::All).is_err());
        assert!(config
            .check_root(NamespaceFilter::Only(Namespace::BiologicalProcess))
            .is_ok());
        assert_eq!(config.query_params(["ACAA1"]).coverage_node_bound(), 20);
    }

    #[test]
    fn invalid_builder() {
        assert!(Config::builder().coverage_node_bound(0).build().is_err());
        assert!(Config::builder().namespaces(vec![]).build().is_err());
        assert!(Config::builder().index_path("").build().is_err());
    }

    #[test]
    fn toml() {
        let config = Config::from_toml_str(
            r#"
            index_path = "data/genescape.json.gz"
            obo_path = "data/go-basic.obo"
            gaf_path = "data/goa_human.gaf.gz"
            namespaces = ["BP", "cc"]
            include_synonyms = true
            "#,
        )
        .unwrap();
        assert_eq!(
            config.namespaces,
            vec![
                NamespaceFilter::Only(Namespace::BiologicalProcess),
                NamespaceFilter::Only(Namespace::CellularComponent)
            ]
        );
        assert_eq!(config.coverage_node_bound, 50);
        assert!(config.include_synonyms);
    }

    #[test]
    fn invalid_toml() {
        assert!(matches!(
            Config::from_toml_str("obo_path = \"go-basic.obo\""),
            Err(GoError::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_toml_str("namespaces = [\"XX\"]"),
            Err(GoError::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_toml_str("unknown_key = 1"),
            Err(GoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn open_builds_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        let index_path = dir.path().join("genescape.json.gz");
        let config = Config::builder()
            .index_path(&index_path)
            .sources("tests/example.obo", "tests/example.gaf")
            .build()
            .unwrap();

        let built = config.open().unwrap();
        assert!(index_path.exists());
        let loaded = config.open().unwrap();
        assert_eq!(built.index(), loaded.index());
    }

    #[test]
    fn open_without_sources() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::builder()
            .index_path(dir.path().join("missing.json"))
            .build()
            .unwrap();
        assert!(matches!(config.open(), Err(GoError::CannotOpenFile(_))));
    }
}
