//! Append-only, per-session comment list.

use crate::model::comment_record::CommentRecord;

/// Whether a store has received any comment yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Empty,
    NonEmpty,
}

/// Ordered list of the comments submitted during one session.
///
/// Records can only be appended; there is no way to edit or remove one.
#[derive(Debug, Default, Clone)]
pub struct CommentStore {
    records: Vec<CommentRecord>,
}

impl CommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return a reference to it.
    pub fn push(&mut self, record: CommentRecord) -> &CommentRecord {
        self.records.push(record);
        let last = self.records.len() - 1;
        &self.records[last]
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[CommentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn state(&self) -> StoreState {
        if self.records.is_empty() {
            StoreState::Empty
        } else {
            StoreState::NonEmpty
        }
    }
}
