use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

/// Fallback used when the dictionary source is missing or unusable.
const DEFAULT_WORDS: [(&str, &str); 5] = [
    ("cat", "кот"),
    ("dog", "собака"),
    ("apple", "яблоко"),
    ("book", "книга"),
    ("sun", "солнце"),
];

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("failed to read dictionary: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a JSON dictionary: {0}")]
    Json(#[from] serde_json::Error),
    #[error("dictionary has no usable entries")]
    Empty,
}

/// A word and its translation, copied out of the dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct WordPair {
    pub word: String,
    pub translation: String,
}

impl WordPair {
    pub fn new(word: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            translation: translation.into(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Word => &self.word,
            Field::Translation => &self.translation,
        }
    }
}

/// Which side of a [`WordPair`] to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Word,
    Translation,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum JsonDictionary {
    Map(ObjectPairs),
    List(Vec<WordPair>),
}

/// A JSON object read in file order, repeated keys included, so the
/// first occurrence of a word wins like in the other formats.
struct ObjectPairs(Vec<WordPair>);

impl<'de> Deserialize<'de> for ObjectPairs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ObjectPairsVisitor)
    }
}

struct ObjectPairsVisitor;

impl<'de> Visitor<'de> for ObjectPairsVisitor {
    type Value = ObjectPairs;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object of word: translation entries")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut pairs = Vec::new();
        while let Some((word, translation)) = map.next_entry::<String, String>()? {
            pairs.push(WordPair { word, translation });
        }
        Ok(ObjectPairs(pairs))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordDictionary {
    pairs: Vec<WordPair>,
}

impl Default for WordDictionary {
    fn default() -> Self {
        Self {
            pairs: DEFAULT_WORDS
                .iter()
                .map(|(word, translation)| WordPair::new(*word, *translation))
                .collect(),
        }
    }
}

impl WordDictionary {
    /// Builds a dictionary from pairs, dropping blank entries and repeated words.
    pub fn from_pairs(pairs: impl IntoIterator<Item = WordPair>) -> Self {
        let mut seen = HashSet::new();
        let pairs = pairs
            .into_iter()
            .map(|p| WordPair::new(p.word.trim(), p.translation.trim()))
            .filter(|p| !p.word.is_empty() && !p.translation.is_empty())
            .filter(|p| seen.insert(p.word.clone()))
            .collect();
        Self { pairs }
    }

    /// Loads the dictionary at `path`.
    ///
    /// JSON is tried first, then `word:translation` lines. Anything that
    /// cannot be read or yields no entries falls back to the built-in words,
    /// so this always produces a usable dictionary.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path).map_err(DictionaryError::Io) {
            Ok(content) => content,
            Err(err) => {
                warn!(
                    "Dictionary {} unavailable: {}, using built-in words",
                    path.display(),
                    err
                );
                return Self::default();
            }
        };

        match Self::parse_json(&content) {
            Ok(dictionary) => {
                info!(
                    "Loaded {} words from JSON dictionary {}",
                    dictionary.len(),
                    path.display()
                );
                return dictionary;
            }
            Err(err) => warn!("{}: {}, trying word:translation lines", path.display(), err),
        }

        match Self::parse_lines(&content) {
            Ok(dictionary) => {
                info!(
                    "Loaded {} words from line dictionary {}",
                    dictionary.len(),
                    path.display()
                );
                dictionary
            }
            Err(err) => {
                warn!("{}: {}, using built-in words", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn parse_json(content: &str) -> Result<Self, DictionaryError> {
        let parsed: JsonDictionary = serde_json::from_str(content)?;
        let dictionary = match parsed {
            JsonDictionary::Map(ObjectPairs(pairs)) => Self::from_pairs(pairs),
            JsonDictionary::List(list) => Self::from_pairs(list),
        };
        dictionary.non_empty()
    }

    pub fn parse_lines(content: &str) -> Result<Self, DictionaryError> {
        let mut pairs = Vec::new();
        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once(':') {
                Some((word, translation))
                    if !word.trim().is_empty() && !translation.trim().is_empty() =>
                {
                    pairs.push(WordPair::new(word, translation));
                }
                _ => warn!("Skipping malformed dictionary line {}: {:?}", number + 1, line),
            }
        }
        Self::from_pairs(pairs).non_empty()
    }

    fn non_empty(self) -> Result<Self, DictionaryError> {
        if self.pairs.is_empty() {
            return Err(DictionaryError::Empty);
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self) -> &[WordPair] {
        &self.pairs
    }

    /// Picks up to `count` distinct values of `field`, none of which match
    /// (ignoring case) anything in `exclude`. Returns fewer when the
    /// dictionary runs short.
    pub fn sample_distinct<R: Rng + ?Sized>(
        &self,
        field: Field,
        exclude: &[&str],
        count: usize,
        rng: &mut R,
    ) -> Vec<String> {
        let mut seen: HashSet<String> = exclude.iter().map(|e| e.to_lowercase()).collect();
        let candidates = self
            .pairs
            .iter()
            .map(|p| p.get(field))
            .filter(|value| seen.insert(value.to_lowercase()))
            .collect::<Vec<_>>();

        candidates
            .choose_multiple(rng, count)
            .map(|value| value.to_string())
            .collect()
    }
}

/// The active dictionary, swapped as a whole on reload.
///
/// Readers take a snapshot per operation and never see a half-built dictionary.
pub struct SharedDictionary {
    source: PathBuf,
    current: RwLock<Arc<WordDictionary>>,
}

impl SharedDictionary {
    pub fn open(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let dictionary = WordDictionary::load(&source);
        Self {
            source,
            current: RwLock::new(Arc::new(dictionary)),
        }
    }

    pub fn snapshot(&self) -> Arc<WordDictionary> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Re-reads the source and replaces the active dictionary.
    pub fn reload(&self) -> Arc<WordDictionary> {
        let fresh = Arc::new(WordDictionary::load(&self.source));
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = fresh.clone();
        info!("Dictionary reloaded: {} words", fresh.len());
        fresh
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}
