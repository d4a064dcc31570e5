use crate::error::{EngineError, Result};
use crate::index::{DocId, IndexStats, MatchingLine, Posting, SearchResult, StoredDocument};
use crate::tokenizer::{normalize, stem, StopWords};
use parking_lot::Mutex;
use regex::{NoExpand, RegexBuilder};
use sled::transaction::{ConflictableTransactionError, Transactional};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;

/// At most this many distinct matching lines are reported per document.
const MAX_MATCHING_LINES: usize = 5;

const DOCUMENTS_TREE: &str = "documents";
const WORD_INDEX_TREE: &str = "word_index";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding the embedded database.
    pub data_dir: PathBuf,
    /// Optional stop-word file (double-quoted words); the builtin list is
    /// used when unset or unreadable.
    pub stop_words_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            stop_words_path: None,
        }
    }
}

/// The indexing and retrieval engine. One instance per process owns the
/// durable trees; callers share it behind an `Arc`.
pub struct SearchEngine {
    db: sled::Db,
    documents: sled::Tree,
    word_index: sled::Tree,
    stop_words: StopWords,
    /// Serializes ingestions: id assignment and commit never interleave.
    write_lock: Mutex<()>,
}

impl SearchEngine {
    pub fn open(config: &EngineConfig) -> Result<Self> {
        let db = sled::open(&config.data_dir)?;
        let documents = db.open_tree(DOCUMENTS_TREE)?;
        let word_index = db.open_tree(WORD_INDEX_TREE)?;
        let stop_words = match &config.stop_words_path {
            Some(path) => StopWords::load(path),
            None => StopWords::builtin(),
        };
        tracing::info!(
            data_dir = %config.data_dir.display(),
            documents = documents.len(),
            stop_words = stop_words.len(),
            "search engine opened"
        );
        Ok(Self {
            db,
            documents,
            word_index,
            stop_words,
            write_lock: Mutex::new(()),
        })
    }

    /// Store a document and index every line of it in one atomic step:
    /// searches observe either all of the document's postings or none.
    pub fn add_document(&self, filename: &str, content: &str) -> Result<DocId> {
        let word_count = content.split_whitespace().count() as u64;

        let _guard = self.write_lock.lock();

        let doc_id = match self.documents.last()? {
            Some((key, _)) => decode_doc_id(&key) + 1,
            None => 1,
        };

        // One position counter for the whole document; only tokens that
        // survive normalization advance it.
        let mut by_word: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut position = 0u32;
        for (idx, line) in content.split('\n').enumerate() {
            let line_number = (idx + 1) as u32;
            for token in normalize(line, &self.stop_words) {
                by_word.entry(stem(&token).to_string()).or_default().push(Posting {
                    doc_id,
                    position,
                    line_number,
                });
                position += 1;
            }
        }

        let record = StoredDocument {
            id: doc_id,
            filename: filename.to_string(),
            content: content.to_string(),
            word_count,
            created_at: now_rfc3339(),
        };
        let record_bytes = bincode::serialize(&record)?;
        let doc_key = doc_id.to_be_bytes();

        (&self.documents, &self.word_index).transaction(|(documents, word_index)| {
            documents.insert(&doc_key[..], record_bytes.as_slice())?;
            for (word, group) in &by_word {
                let mut list: Vec<Posting> = match word_index.get(word.as_bytes())? {
                    Some(raw) => bincode::deserialize(&raw).map_err(abort)?,
                    None => Vec::new(),
                };
                list.extend(group.iter().cloned());
                let bytes = bincode::serialize(&list).map_err(abort)?;
                word_index.insert(word.as_bytes(), bytes)?;
            }
            Ok(())
        })?;
        self.db.flush()?;

        tracing::debug!(doc_id, filename, word_count, indexed = position, "document indexed");
        Ok(doc_id)
    }

    pub fn document(&self, id: DocId) -> Result<StoredDocument> {
        match self.documents.get(id.to_be_bytes())? {
            Some(raw) => Ok(bincode::deserialize(&raw)?),
            None => Err(EngineError::NotFound(id)),
        }
    }

    /// All recorded occurrences of an exact stemmed word, in insertion order.
    pub fn postings(&self, word: &str) -> Result<Vec<Posting>> {
        match self.word_index.get(word.as_bytes())? {
            Some(raw) => Ok(bincode::deserialize(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Rank documents by how many of their postings match any query stem,
    /// most matches first, equal scores by ascending document id. Each
    /// result carries up to five highlighted matching lines.
    pub fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let stems: Vec<String> = normalize(query, &self.stop_words)
            .iter()
            .map(|word| stem(word).to_string())
            .collect();
        if stems.is_empty() {
            return Ok(Vec::new());
        }

        let mut matched: HashMap<DocId, Vec<Posting>> = HashMap::new();
        let mut looked_up: HashSet<&str> = HashSet::new();
        for word in &stems {
            // the same stem twice in a query must not double-count rows
            if !looked_up.insert(word.as_str()) {
                continue;
            }
            for posting in self.postings(word)? {
                matched.entry(posting.doc_id).or_default().push(posting);
            }
        }

        let mut ranked: Vec<(DocId, Vec<Posting>)> = matched.into_iter().collect();
        ranked.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.0.cmp(&b.0)));
        ranked.truncate(max_results);

        let mut results = Vec::with_capacity(ranked.len());
        for (doc_id, postings) in ranked {
            let doc = self.document(doc_id)?;
            let lines: Vec<&str> = doc.content.split('\n').collect();

            let mut line_numbers: Vec<u32> =
                postings.iter().map(|p| p.line_number).collect();
            line_numbers.sort_unstable();
            line_numbers.dedup();

            let mut matching_lines = Vec::new();
            for line_number in line_numbers {
                if matching_lines.len() == MAX_MATCHING_LINES {
                    break;
                }
                // a stale row pointing past the stored text is skipped, not an error
                let Some(text) = (line_number as usize)
                    .checked_sub(1)
                    .and_then(|i| lines.get(i))
                else {
                    continue;
                };
                matching_lines.push(MatchingLine {
                    line_number,
                    content: highlight(text, &stems),
                });
            }

            results.push(SearchResult {
                document_id: doc_id,
                filename: doc.filename,
                relevance_score: postings.len() as u64,
                matching_lines,
            });
        }
        tracing::debug!(query, hits = results.len(), "search complete");
        Ok(results)
    }

    /// Aggregate counts over both trees plus the ten most frequent stems.
    pub fn stats(&self) -> Result<IndexStats> {
        let document_count = self.documents.len() as u64;
        let mut total = 0u64;
        let mut frequencies: Vec<(String, u64)> = Vec::new();
        for entry in self.word_index.iter() {
            let (key, raw) = entry?;
            let list: Vec<Posting> = bincode::deserialize(&raw)?;
            total += list.len() as u64;
            frequencies.push((
                String::from_utf8_lossy(&key).into_owned(),
                list.len() as u64,
            ));
        }
        let unique_word_count = frequencies.len() as u64;
        // frequency descending, ties by word ascending
        frequencies.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        frequencies.truncate(10);
        Ok(IndexStats {
            document_count,
            unique_word_count,
            total_indexed_occurrences: total,
            top_words: frequencies,
        })
    }
}

/// Replace every case-insensitive occurrence of each stem with the marked
/// stem itself, one pass per query stem in query order.
fn highlight(line: &str, stems: &[String]) -> String {
    let mut out = line.to_string();
    for word in stems {
        let pattern = RegexBuilder::new(&regex::escape(word))
            .case_insensitive(true)
            .build()
            .expect("valid regex");
        out = pattern
            .replace_all(&out, NoExpand(&format!("<mark>{word}</mark>")))
            .into_owned();
    }
    out
}

fn abort(err: bincode::Error) -> ConflictableTransactionError<EngineError> {
    ConflictableTransactionError::Abort(EngineError::Codec(err))
}

fn decode_doc_id(raw: &[u8]) -> DocId {
    raw.try_into().map(u64::from_be_bytes).unwrap_or(0)
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
