pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Word-root store is not initialized")]
    StoreUnavailable,

    #[error("Query failed ({context}): {source}")]
    Query {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Write failed ({context}): {source}")]
    Write {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// An import batch was rolled back; `key` is the root that failed
    #[error("Import aborted at root {key:?}: {source}")]
    TransactionAborted {
        key: String,
        #[source]
        source: Box<StoreError>,
    },

    #[error("Invalid word root {chinese:?}: {reason}")]
    InvalidEntry {
        chinese: String,
        reason: &'static str,
    },

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tags a rusqlite failure with the read/write kind and what was being done
pub(crate) trait SqlResultExt<T> {
    fn query_context(self, context: &'static str) -> Result<T>;
    fn write_context(self, context: &'static str) -> Result<T>;
}

impl<T> SqlResultExt<T> for rusqlite::Result<T> {
    fn query_context(self, context: &'static str) -> Result<T> {
        self.map_err(|source| StoreError::Query { context, source })
    }

    fn write_context(self, context: &'static str) -> Result<T> {
        self.map_err(|source| StoreError::Write { context, source })
    }
}
