//! Tuning knobs shared by the index builder and the query engine.
//!
//! Everything that influences how text becomes terms lives in [`AnalyzerConfig`]
//! and is stored inside every built index, so a query is always tokenized with
//! exactly the rules its index was built with.

use crate::record::Category;
use serde::{Deserialize, Serialize};

/// Multiplier applied to title occurrences of a term, both for term frequency
/// and for document length.
pub const DEFAULT_TITLE_WEIGHT: u32 = 3;

/// Tokens with fewer characters than this are dropped.
pub const DEFAULT_MIN_TOKEN_LEN: usize = 2;

/// Number of results returned when the caller does not ask for a limit.
pub const DEFAULT_LIMIT: usize = 10;

/// Upper bound on `limit`; larger requests are clamped.
pub const MAX_LIMIT: usize = 1000;

/// Snippet window width, in characters.
pub const SNIPPET_WIDTH: usize = 160;

/// Which stopword list the analyzer filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stopwords {
    /// Built-in English list.
    English,
    /// Keep every token.
    None,
    /// Caller-provided list; entries are compared against lower-cased tokens.
    Custom(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub min_token_len: usize,
    /// Reduce tokens to their English Snowball stem.
    pub stem: bool,
    pub stopwords: Stopwords,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
            stem: false,
            stopwords: Stopwords::English,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    pub analyzer: AnalyzerConfig,
    pub title_weight: u32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            title_weight: DEFAULT_TITLE_WEIGHT,
        }
    }
}

/// Query-time ranking parameters. These do not affect the index itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Use `ln(1 + N/df)` instead of `ln(N/df)`.
    pub smoothed_idf: bool,
    /// Per-category score multipliers; categories not listed use 1.0.
    pub category_boost: Vec<(Category, f32)>,
    pub snippet_width: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            smoothed_idf: true,
            category_boost: Vec::new(),
            snippet_width: SNIPPET_WIDTH,
        }
    }
}

impl ScoringConfig {
    pub fn boost(&self, category: Category) -> f32 {
        self.category_boost
            .iter()
            .find(|(c, _)| *c == category)
            .map_or(1.0, |(_, b)| *b)
    }

    pub fn idf(&self, num_docs: u32, df: u32) -> f32 {
        let n = num_docs.max(1) as f32;
        let df = df.max(1) as f32;
        if self.smoothed_idf {
            (1.0 + n / df).ln()
        } else {
            (n / df).ln()
        }
    }
}
