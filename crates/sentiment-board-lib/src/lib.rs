//! Library entry point for the sentiment comment board.
//!
//! Visitors submit a username and a comment; every comment is labelled once by
//! a pretrained sentiment classifier, appended to that visitor's session store
//! and rendered back with colour-coded sentiment and a sidebar summary.
//!
//! Modules:
//! - [`classify`]: the `SentimentClassifier` seam plus the DistilBERT and
//!   lexicon backends.
//! - [`store`] / [`session`]: per-session, append-only comment lists.
//! - [`service`]: `add_comment` and `filter`.
//! - [`stats`] / [`render`]: sidebar aggregates and the HTML page.
//
// Public modules
pub mod classify;
pub mod model;
pub mod render;
pub mod service;
pub mod session;
pub mod stats;
pub mod store;

// Re‑export primary types for ergonomic use.
pub use classify::{
    load_classifier, Classification, ClassifierBackend, ClassifierConfig, ClassifierError,
    SentimentClassifier,
};
pub use model::{
    comment_record::CommentRecord,
    sentiment::{SentimentLabel, SortOption},
};
pub use render::{render_page, PageSettings, PageView};
pub use service::{add_comment, filter};
pub use session::{SessionId, SessionRegistry};
pub use stats::SentimentSummary;
pub use store::{CommentStore, StoreState};
