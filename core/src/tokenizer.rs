use crate::config::{AnalyzerConfig, Stopwords};
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{L}\p{M}\p{N}]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could",
            "did","do","does","doing","down","during",
            "each","few","for","from","further",
            "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","it","its","itself",
            "me","more","most","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","should","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","we","were","what","when","where","which","while","who","whom","why","with","would",
            "you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// A normalized term and the byte span of the word it came from in the
/// analyzed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub term: String,
    pub start: usize,
    pub end: usize,
}

/// Turns text into normalized terms: NFKC, lowercase, length and stopword
/// filtering, optional stemming.
///
/// Serializes as its [`AnalyzerConfig`], so an index carries the exact rules
/// its queries have to be tokenized with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "AnalyzerConfig", into = "AnalyzerConfig")]
pub struct Analyzer {
    config: AnalyzerConfig,
    custom: HashSet<String>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl PartialEq for Analyzer {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
    }
}

impl From<AnalyzerConfig> for Analyzer {
    fn from(config: AnalyzerConfig) -> Self {
        Self::new(config)
    }
}

impl From<Analyzer> for AnalyzerConfig {
    fn from(analyzer: Analyzer) -> Self {
        analyzer.config
    }
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let custom = match &config.stopwords {
            Stopwords::Custom(words) => words.iter().map(|w| w.to_lowercase()).collect(),
            _ => HashSet::new(),
        };
        Self { config, custom }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    fn is_stopword(&self, word: &str) -> bool {
        match self.config.stopwords {
            Stopwords::English => STOPWORDS.contains(word),
            Stopwords::None => false,
            Stopwords::Custom(_) => self.custom.contains(word),
        }
    }

    /// Normalize a single word. Returns `None` when the word is filtered out.
    pub fn normalize(&self, word: &str) -> Option<String> {
        let lowered = word.nfkc().collect::<String>().to_lowercase();
        if lowered.chars().count() < self.config.min_token_len || self.is_stopword(&lowered) {
            return None;
        }
        if self.config.stem {
            Some(STEMMER.stem(&lowered).into_owned())
        } else {
            Some(lowered)
        }
    }

    /// Split on non-alphanumeric boundaries and normalize each word. Combining
    /// marks stay attached to their word so decomposed input composes under
    /// NFKC. Spans index into `text` itself, not into its normalized form.
    pub fn analyze(&self, text: &str) -> Vec<Token> {
        RE.find_iter(text)
            .filter_map(|m| {
                self.normalize(m.as_str()).map(|term| Token {
                    term,
                    start: m.start(),
                    end: m.end(),
                })
            })
            .collect()
    }

    /// Normalized terms only, deduplicated, in first-occurrence order.
    pub fn query_terms(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.analyze(text)
            .into_iter()
            .filter_map(|t| seen.insert(t.term.clone()).then_some(t.term))
            .collect()
    }
}

/// Tokenize with the default analyzer.
pub fn tokenize(text: &str) -> Vec<Token> {
    Analyzer::default().analyze(text)
}
