use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

lazy_static! {
    static ref QUOTED_WORD: Regex = Regex::new(r#""([^"]*)""#).expect("valid regex");
}

/// Built-in fallback used when no stop-word file can be read.
const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for",
    "of", "with", "by", "is", "are", "was", "were", "be", "been", "have",
    "has", "had", "do", "does", "did", "will", "would", "could", "should",
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us",
    "them",
];

/// Common words excluded from indexing and querying. Loaded once at engine
/// startup and never changed afterwards.
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Parse a stop-word file: every double-quoted group is one word,
    /// lowercased and trimmed. Falls back to the built-in list when the file
    /// cannot be read; a readable file with no quoted words yields an empty
    /// set.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let words = QUOTED_WORD
                    .captures_iter(&text)
                    .map(|caps| caps[1].trim().to_lowercase())
                    .filter(|word| !word.is_empty())
                    .collect();
                Self { words }
            }
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    %err,
                    "stop-word file unreadable, using builtin list"
                );
                Self::builtin()
            }
        }
    }

    pub fn builtin() -> Self {
        Self {
            words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Lowercase, strip ASCII punctuation, drop non-ASCII characters, split on
/// whitespace, and drop stop words and single-character tokens.
pub fn normalize(line: &str, stop_words: &StopWords) -> Vec<String> {
    let lowered = line.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .filter(|c| !c.is_ascii_punctuation() && (*c as u32) < 128)
        .collect();
    cleaned
        .split_whitespace()
        .filter(|word| word.len() > 1 && !stop_words.contains(word))
        .map(str::to_string)
        .collect()
}

/// Crude suffix stemmer. First matching rule wins; rules never chain.
/// The known misfires ("boss" -> "bos") are part of the contract: stored
/// postings and query terms have to keep stemming identically.
pub fn stem(word: &str) -> &str {
    if let Some(stripped) = word.strip_suffix("ing") {
        return stripped;
    }
    if let Some(stripped) = word.strip_suffix("ed") {
        return stripped;
    }
    if word.len() > 3 {
        if let Some(stripped) = word.strip_suffix('s') {
            return stripped;
        }
    }
    word
}
