//! Full-text indexing and retrieval over plain-text documents: positional
//! inverted index, crude suffix stemming, match-count ranking, and
//! highlighted matching lines.

pub mod engine;
pub mod error;
pub mod tokenizer;

mod index;

pub use engine::{EngineConfig, SearchEngine};
pub use error::{EngineError, Result};
pub use index::*;
