//! Country reference data.
//!
//! The source table lists one row per (country, supported document); the
//! catalog collapses it into one entry per country code, ordered by name the
//! way a reader expects: case and accents do not decide the order
//! ("Åland Islands" sits next to "Albania", not after "Zimbabwe").

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::types::DocumentKind;

const BUNDLED: &str = include_str!("../data/countries.json");

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountryRecord {
    pub country: String,
    pub country_code: String,
}

/// One row of the reference table.
#[derive(Debug, Deserialize)]
struct ReferenceRow {
    country: String,
    country_code: String,
    #[serde(default)]
    document: Option<DocumentKind>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("reading country table {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("parsing country table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("country table contains no usable records")]
    Empty,
}

/// Deduplicated, sorted country list plus the documents each country supports.
#[derive(Debug, Clone)]
pub struct CountryCatalog {
    entries: Vec<CountryRecord>,
    documents: HashMap<String, BTreeSet<DocumentKind>>,
}

impl CountryCatalog {
    /// The table compiled into the binary.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let rows: Vec<ReferenceRow> = serde_json::from_str(text)?;
        let catalog = Self::from_rows(rows);
        if catalog.entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(catalog)
    }

    /// Build from plain records; the first record seen for a code wins.
    pub fn from_records<I: IntoIterator<Item = CountryRecord>>(records: I) -> Self {
        Self::from_rows(records.into_iter().map(|r| ReferenceRow {
            country: r.country,
            country_code: r.country_code,
            document: None,
        }))
    }

    fn from_rows<I: IntoIterator<Item = ReferenceRow>>(rows: I) -> Self {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        let mut documents: HashMap<String, BTreeSet<DocumentKind>> = HashMap::new();

        for row in rows {
            let code = row.country_code.trim().to_ascii_uppercase();
            let name = row.country.trim();
            if code.is_empty() || name.is_empty() {
                tracing::debug!(?row, "skipping incomplete country row");
                continue;
            }
            if let Some(kind) = row.document {
                documents.entry(code.clone()).or_default().insert(kind);
            }
            if seen.insert(code.clone()) {
                entries.push(CountryRecord { country: name.to_string(), country_code: code });
            }
        }

        entries.sort_by(compare_names);
        Self { entries, documents }
    }

    pub fn entries(&self) -> &[CountryRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, code: &str) -> Option<&CountryRecord> {
        let code = code.trim().to_ascii_uppercase();
        self.entries.iter().find(|r| r.country_code == code)
    }

    /// Entries whose folded name starts with, or whose code equals, `query`.
    pub fn filter(&self, query: &str) -> Vec<&CountryRecord> {
        let q = collation_key(query.trim());
        if q.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|r| collation_key(&r.country).starts_with(&q) || r.country_code.eq_ignore_ascii_case(query.trim()))
            .collect()
    }

    /// Documents accepted for a country; every kind when the table does not say.
    pub fn documents_for(&self, code: &str) -> Vec<DocumentKind> {
        match self.documents.get(&code.trim().to_ascii_uppercase()) {
            Some(kinds) if !kinds.is_empty() => kinds.iter().copied().collect(),
            _ => DocumentKind::all().to_vec(),
        }
    }
}

/// Primary-strength sort key: decomposed, combining marks removed, lowercased.
pub fn collation_key(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase).collect()
}

fn compare_names(a: &CountryRecord, b: &CountryRecord) -> Ordering {
    collation_key(&a.country)
        .cmp(&collation_key(&b.country))
        .then_with(|| a.country.cmp(&b.country))
        .then_with(|| a.country_code.cmp(&b.country_code))
}
