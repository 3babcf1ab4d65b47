use std::fmt::Display;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Build information stored alongside the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Version of the crate that built the index
    pub version: String,
    /// UTC timestamp, `%Y-%m-%d %H:%M:%S`
    pub build_date: String,
    pub source_obo_filename: String,
    pub source_gaf_filename: String,
    pub synonyms_included: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obo_data_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gaf_version: Option<String>,
}

impl Metadata {
    /// Creates metadata for an index that is built right now
    ///
    /// Only the file names of the sources are kept, not their full path.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(obo: P, gaf: Q, synonyms_included: bool) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            build_date: Utc::now().format(DATE_FORMAT).to_string(),
            source_obo_filename: file_name(obo.as_ref()),
            source_gaf_filename: file_name(gaf.as_ref()),
            synonyms_included,
            obo_data_version: None,
            gaf_version: None,
        }
    }

    #[must_use]
    pub fn with_obo_data_version(mut self, version: Option<String>) -> Self {
        self.obo_data_version = version;
        self
    }

    #[must_use]
    pub fn with_gaf_version(mut self, version: Option<String>) -> Self {
        self.gaf_version = version;
        self
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata::new("", "", false)
    }
}

impl Display for Metadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "genescape {} built {} from {} and {}",
            self.version, self.build_date, self.source_obo_filename, self.source_gaf_filename
        )?;
        if self.synonyms_included {
            write!(f, " (with synonyms)")?;
        }
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().to_string())
}

#[cfg(test)]
mod test {
    use chrono::NaiveDateTime;

    use super::*;

    #[test]
    fn file_names_only() {
        let metadata = Metadata::new("/data/go/go-basic.obo", "data/goa_human.gaf.gz", true);
        assert_eq!(metadata.source_obo_filename, "go-basic.obo");
        assert_eq!(metadata.source_gaf_filename, "goa_human.gaf.gz");
        assert!(metadata.synonyms_included);
        assert_eq!(metadata.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn build_date_format() {
        let metadata = Metadata::default();
        assert!(NaiveDateTime::parse_from_str(&metadata.build_date, DATE_FORMAT).is_ok());
    }

    #[test]
    fn optional_versions_are_omitted() {
        let metadata = Metadata::default();
        let json = serde_json::to_value(&metadata).unwrap();
        assert!(json.get("gaf_version").is_none());

        let metadata = metadata.with_gaf_version(Some("2.2".to_string()));
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["gaf_version"], "2.2");
    }
}
