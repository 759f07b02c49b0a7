//! # Source adapter seam
//!
//! The core never talks to an upstream directly. Each source (the search
//! index, the per-program partner feeds, the local override store) plugs
//! in behind [`SourceAdapter`], translating the core's filter and order
//! descriptors into its native query syntax and its payloads into record
//! structs. Transport and decode failures stay inside [`AdapterError`];
//! the repositories decide which of them are fatal.

use async_trait::async_trait;

use crate::filter::Order;
use crate::model::EntityRecord;

/// An absolute slice of an ordered result sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Zero-based offset of the first row to return.
    pub offset: u64,
    /// Maximum number of rows to return.
    pub limit: u64,
}

impl Window {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }
}

/// One windowed page of upstream rows plus the sequence-wide row count.
#[derive(Debug, Clone)]
pub struct Hits<E> {
    pub records: Vec<E>,
    /// Total rows matching the filter across the whole sequence, as
    /// reported by the source at query time.
    pub total_count: u64,
}

impl<E> Hits<E> {
    pub fn new(records: Vec<E>, total_count: u64) -> Self {
        Self {
            records,
            total_count,
        }
    }

    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            total_count: 0,
        }
    }
}

/// Failures an adapter can surface to the repositories.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The upstream could not be reached or answered with an error.
    #[error("transport: {0}")]
    Transport(String),

    /// The upstream answered with a payload the adapter could not decode.
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),

    /// The upstream rejected the query shape (bad filter, order field the
    /// source cannot sort by).
    #[error("unsupported query: {0}")]
    UnsupportedQuery(String),
}

impl AdapterError {
    pub fn transport(reason: impl Into<String>) -> Self {
        AdapterError::Transport(reason.into())
    }
}

/// Read access to one upstream source for one entity type.
///
/// Adapters must apply order descriptors in the given sequence and break
/// remaining ties with a stable natural order, so that a window taken at
/// `offset` lines up with the window taken at `offset + limit` on a later
/// call.
#[async_trait]
pub trait SourceAdapter<E: EntityRecord>: Send + Sync {
    /// Short name of the backing source, used in logs and error text.
    fn source_name(&self) -> &'static str;

    /// Fetches one record by natural key. `Ok(None)` means the source
    /// answered and the record does not exist there.
    async fn find_one(&self, key: &E::Key) -> Result<Option<E>, AdapterError>;

    /// Fetches one ordered, filtered window of the source's sequence.
    async fn find_many(
        &self,
        window: Window,
        filter: &E::Filter,
        order: &[Order<E::OrderField>],
    ) -> Result<Hits<E>, AdapterError>;
}
