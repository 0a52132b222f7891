//! Place dictionaries.
//!
//! Rooms only see the [`Dictionary`] trait. [`PlaceDictionary`] is the
//! in-memory implementation the server loads from a JSON file at startup
//! and shares, read-only, between every room.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::DictionaryError;
use crate::rules::starts_with_letter;

/// Category given to entries loaded from a plain list of names.
pub const DEFAULT_CATEGORY: &str = "Place";

/// A place name in its canonical spelling, with its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceInfo {
    pub name: String,
    /// `"City"`, `"Country"`, ...
    #[serde(rename = "type")]
    pub category: String,
}

impl PlaceInfo {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

/// Read-only lookup of valid place names.
///
/// Lookups are exact and case-insensitive: `"aruba"`, `"ARUBA"` and
/// `"Aruba"` all find the same entry, `"Arub"` finds nothing.
pub trait Dictionary: Send + Sync + 'static {
    /// Finds the entry for `word`, ignoring case. `Some` is a valid place
    /// and carries its canonical spelling and category.
    fn lookup(&self, word: &str) -> Option<PlaceInfo>;

    /// Any entry whose name starts with `letter` and whose lower-cased
    /// name is not in `used`.
    fn find_unused_starting_with(&self, letter: char, used: &HashSet<String>) -> Option<PlaceInfo>;
}

// ---------------------------------------------------------------------------
// PlaceDictionary
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Place(PlaceInfo),
    Name(String),
}

impl From<RawEntry> for PlaceInfo {
    fn from(raw: RawEntry) -> Self {
        match raw {
            RawEntry::Place(place) => place,
            RawEntry::Name(name) => PlaceInfo::new(name, DEFAULT_CATEGORY),
        }
    }
}

/// A [`Dictionary`] held in a hash map keyed by lower-cased name.
///
/// When two entries share a lower-cased name the later one wins.
#[derive(Debug, Clone, Default)]
pub struct PlaceDictionary {
    places: HashMap<String, PlaceInfo>,
}

impl PlaceDictionary {
    pub fn from_places(places: impl IntoIterator<Item = PlaceInfo>) -> Self {
        let places = places
            .into_iter()
            .map(|place| (place.name.to_lowercase(), place))
            .collect();
        Self { places }
    }

    /// Parses a JSON array of `{"name", "type"}` objects, of plain name
    /// strings, or a mix of both.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, DictionaryError> {
        let raw: Vec<RawEntry> = serde_json::from_slice(data)?;
        Ok(Self::from_places(raw.into_iter().map(PlaceInfo::from)))
    }

    /// Reads and parses a dictionary file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let dictionary = Self::from_json_slice(&data)?;
        info!(path = %path.display(), places = dictionary.len(), "dictionary loaded");
        Ok(dictionary)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

impl Dictionary for PlaceDictionary {
    fn lookup(&self, word: &str) -> Option<PlaceInfo> {
        self.places.get(&word.to_lowercase()).cloned()
    }

    /// Picks uniformly at random among the matching entries.
    fn find_unused_starting_with(&self, letter: char, used: &HashSet<String>) -> Option<PlaceInfo> {
        let candidates: Vec<&PlaceInfo> = self
            .places
            .iter()
            .filter(|(key, _)| starts_with_letter(key, letter) && !used.contains(*key))
            .map(|(_, place)| place)
            .collect();
        candidates.choose(&mut rand::rng()).map(|place| (*place).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PlaceDictionary {
        PlaceDictionary::from_places([
            PlaceInfo::new("India", "Country"),
            PlaceInfo::new("Aruba", "Country"),
            PlaceInfo::new("Amsterdam", "City"),
        ])
    }

    #[test]
    fn test_lookup_ignores_case_and_returns_canonical_name() {
        let dict = sample();
        let place = dict.lookup("aRUBA").unwrap();
        assert_eq!(place.name, "Aruba");
        assert_eq!(place.category, "Country");
        assert!(dict.lookup("INDIA").is_some());
    }

    #[test]
    fn test_lookup_is_exact() {
        let dict = sample();
        assert_eq!(dict.lookup("Arub"), None);
        assert_eq!(dict.lookup("Aruba "), None);
        assert_eq!(dict.lookup(""), None);
    }

    #[test]
    fn test_find_unused_skips_used_and_other_letters() {
        let dict = sample();
        let used = HashSet::from(["aruba".to_string()]);

        for _ in 0..20 {
            let place = dict.find_unused_starting_with('a', &used).unwrap();
            assert_eq!(place.name, "Amsterdam");
        }
    }

    #[test]
    fn test_find_unused_accepts_upper_case_letter() {
        let dict = sample();
        let place = dict.find_unused_starting_with('I', &HashSet::new()).unwrap();
        assert_eq!(place.name, "India");
    }

    #[test]
    fn test_find_unused_none_when_exhausted() {
        let dict = sample();
        let used = HashSet::from(["aruba".to_string(), "amsterdam".to_string()]);
        assert_eq!(dict.find_unused_starting_with('a', &used), None);
        assert_eq!(dict.find_unused_starting_with('z', &HashSet::new()), None);
    }

    #[test]
    fn test_json_objects() {
        let dict = PlaceDictionary::from_json_slice(
            br#"[{"name": "Oslo", "type": "City"}, {"name": "Peru", "type": "Country"}]"#,
        )
        .unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.lookup("oslo").unwrap().category, "City");
    }

    #[test]
    fn test_json_plain_strings_get_default_category() {
        let dict = PlaceDictionary::from_json_slice(br#"["Oslo", "Peru"]"#).unwrap();
        assert_eq!(dict.lookup("peru"), Some(PlaceInfo::new("Peru", DEFAULT_CATEGORY)));
    }

    #[test]
    fn test_json_not_a_list_fails() {
        let result = PlaceDictionary::from_json_slice(br#"{"name": "Oslo"}"#);
        assert!(matches!(result, Err(DictionaryError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("places.json");
        std::fs::write(&path, r#"[{"name": "Kenya", "type": "Country"}]"#).unwrap();

        let dict = PlaceDictionary::load(&path).unwrap();
        assert!(dict.lookup("kenya").is_some());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = PlaceDictionary::load(dir.path().join("nope.json"));
        assert!(matches!(result, Err(DictionaryError::Io(_))));
    }
}
