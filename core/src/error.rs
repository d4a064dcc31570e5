use crate::index::DocId;
use sled::transaction::TransactionError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("document {0} not found")]
    NotFound(DocId),

    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("corrupt record: {0}")]
    Codec(#[from] bincode::Error),
}

impl From<TransactionError<EngineError>> for EngineError {
    fn from(err: TransactionError<EngineError>) -> Self {
        match err {
            TransactionError::Abort(inner) => inner,
            TransactionError::Storage(storage) => EngineError::Storage(storage),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
