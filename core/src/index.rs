use serde::{Deserialize, Serialize};

pub type DocId = u64;

/// A stored document: the original text plus metadata derived at ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: DocId,
    pub filename: String,
    pub content: String,
    /// Whitespace-split token count of the raw content, before any filtering.
    pub word_count: u64,
    pub created_at: String,
}

/// One occurrence of a stemmed word. The word itself is the posting-list key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    /// Zero-based index among the document's surviving tokens, shared across lines.
    pub position: u32,
    /// 1-based line within the original content.
    pub line_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingLine {
    pub line_number: u32,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub document_id: DocId,
    pub filename: String,
    pub relevance_score: u64,
    pub matching_lines: Vec<MatchingLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub document_count: u64,
    pub unique_word_count: u64,
    pub total_indexed_occurrences: u64,
    /// The ten most frequent stems as (word, occurrences), most frequent first.
    pub top_words: Vec<(String, u64)>,
}
