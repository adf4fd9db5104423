//! Documentation search: an inverted index over documentation records and a
//! TF-IDF query engine with snippets.

pub mod builder;
pub mod config;
pub mod error;
pub mod index;
pub mod loader;
pub mod persist;
pub mod record;
pub mod search;
pub mod snapshot;
pub mod snippet;
pub mod tokenizer;

pub use builder::{build, IndexBuilder};
pub use config::{AnalyzerConfig, BuilderConfig, ScoringConfig, Stopwords};
pub use error::{RecordError, SearchError};
pub use index::{InvertedIndex, Posting, Span, TermId};
pub use record::{Category, DocId, DocumentRecord, RawRecord};
pub use search::{query, QueryEngine, QueryResult, SearchOptions, SearchResults};
pub use snapshot::SharedIndex;
pub use snippet::Snippet;
