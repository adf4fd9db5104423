//! Query engine: ranks documents of an [`InvertedIndex`] against free text.
//!
//! Retrieval is a union over the posting lists of all query terms, so a
//! document matching any term is a candidate; documents matching more terms
//! win through their score. Each term contributes
//! `weighted_tf / weighted_doc_len * idf`, with title hits counted
//! `title_weight` times as in the builder. Ties are broken by ascending
//! document id so results are reproducible.

use crate::config::{ScoringConfig, DEFAULT_LIMIT, MAX_LIMIT};
use crate::error::SearchError;
use crate::index::{InvertedIndex, Posting};
use crate::record::{Category, DocId};
use crate::snippet::{self, Snippet};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum results per page; must be at least 1. Clamped to [`MAX_LIMIT`].
    pub limit: usize,
    /// Ranked results to skip before the page starts.
    pub offset: usize,
    /// Category names to keep; `None` keeps everything.
    pub categories: Option<Vec<String>>,
    /// Results scoring strictly below this are dropped.
    pub min_score: f32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { limit: DEFAULT_LIMIT, offset: 0, categories: None, min_score: 0.0 }
    }
}

impl SearchOptions {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_categories<S: AsRef<str>>(mut self, categories: &[S]) -> Self {
        self.categories = Some(categories.iter().map(|c| c.as_ref().to_string()).collect());
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    fn validate(&self) -> Result<ValidOptions, SearchError> {
        if self.limit == 0 {
            return Err(SearchError::InvalidOptions("limit must be at least 1".into()));
        }
        if !self.min_score.is_finite() {
            return Err(SearchError::InvalidOptions(format!("min_score must be finite, got {}", self.min_score)));
        }
        let categories = match &self.categories {
            Some(names) => Some(names.iter().map(|n| n.parse()).collect::<Result<HashSet<Category>, _>>()?),
            None => None,
        };
        Ok(ValidOptions {
            limit: self.limit.min(MAX_LIMIT),
            offset: self.offset,
            categories,
            min_score: self.min_score,
        })
    }
}

struct ValidOptions {
    limit: usize,
    offset: usize,
    categories: Option<HashSet<Category>>,
    min_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub doc_id: DocId,
    pub score: f32,
    pub snippet: Snippet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Candidates that survived filtering, before pagination.
    pub total_hits: usize,
    pub results: Vec<QueryResult>,
}

/// Read-only view over one index with a ranking configuration.
pub struct QueryEngine<'a> {
    index: &'a InvertedIndex,
    scoring: ScoringConfig,
}

impl<'a> QueryEngine<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self {
        Self { index, scoring: ScoringConfig::default() }
    }

    pub fn with_scoring(index: &'a InvertedIndex, scoring: ScoringConfig) -> Self {
        Self { index, scoring }
    }

    pub fn search(&self, text: &str, options: &SearchOptions) -> Result<SearchResults, SearchError> {
        let opts = options.validate()?;
        if self.index.is_empty() {
            return Ok(SearchResults::default());
        }
        let terms = self.index.analyzer().query_terms(text);
        if terms.is_empty() {
            return Ok(SearchResults::default());
        }

        let title_weight = self.index.title_weight();
        let mut scores: HashMap<DocId, f32> = HashMap::new();
        let mut matched: HashMap<DocId, Vec<&Posting>> = HashMap::new();
        for term in &terms {
            let Some(postings) = self.index.postings(term) else { continue };
            let idf = self.scoring.idf(self.index.num_docs(), self.index.document_frequency(term));
            for p in postings {
                let Some(len) = self.index.doc_length(p.doc_id).filter(|&l| l > 0) else {
                    continue;
                };
                let tf = p.weighted_tf(title_weight) as f32 / len as f32;
                *scores.entry(p.doc_id).or_insert(0.0) += tf * idf;
                matched.entry(p.doc_id).or_default().push(p);
            }
        }

        let mut ranked: Vec<(DocId, f32)> = scores
            .into_iter()
            .filter_map(|(doc_id, score)| {
                let category = self.index.document(doc_id)?.category;
                if opts.categories.as_ref().is_some_and(|c| !c.contains(&category)) {
                    return None;
                }
                let score = score * self.scoring.boost(category);
                (score >= opts.min_score).then_some((doc_id, score))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        let total_hits = ranked.len();

        let results = ranked
            .into_iter()
            .skip(opts.offset)
            .take(opts.limit)
            .filter_map(|(doc_id, score)| {
                let doc = self.index.document(doc_id)?;
                let spans: Vec<_> = matched
                    .get(&doc_id)
                    .into_iter()
                    .flatten()
                    .flat_map(|p| p.spans.iter().copied())
                    .collect();
                let snippet = snippet::extract(&doc.text, &spans, self.scoring.snippet_width);
                Some(QueryResult { doc_id, score, snippet })
            })
            .collect();

        tracing::debug!(query = text, terms = terms.len(), total_hits, "search complete");
        Ok(SearchResults { total_hits, results })
    }
}

/// Rank `index` against `text` with default scoring and return one page of
/// results.
pub fn query(index: &InvertedIndex, text: &str, options: &SearchOptions) -> Result<Vec<QueryResult>, SearchError> {
    Ok(QueryEngine::new(index).search(text, options)?.results)
}
