//! Batch construction of an [`InvertedIndex`] from raw records.

use crate::config::BuilderConfig;
use crate::error::RecordError;
use crate::index::{InvertedIndex, Posting, Span, StoredDoc, TermId};
use crate::record::{DocId, DocumentRecord, RawRecord};
use crate::tokenizer::Analyzer;
use std::collections::{HashMap, HashSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Builds a fresh index from a batch of records. Holds configuration only;
/// every call to [`IndexBuilder::build`] starts from scratch.
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    config: BuilderConfig,
}

#[derive(Default)]
struct TermStats {
    title_tf: u32,
    text_tf: u32,
    spans: Vec<Span>,
}

struct AnalyzedDoc {
    record: DocumentRecord,
    length: u32,
    // first-occurrence order keeps term id assignment stable
    terms: Vec<(String, TermStats)>,
}

impl IndexBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn build<I>(&self, records: I) -> InvertedIndex
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let analyzer = Analyzer::new(self.config.analyzer.clone());
        let (records, skipped) = assign_ids(records.into_iter().collect());

        #[cfg(feature = "parallel")]
        let analyzed: Vec<AnalyzedDoc> = records
            .into_par_iter()
            .map(|r| analyze_record(&analyzer, self.config.title_weight, r))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let analyzed: Vec<AnalyzedDoc> = records
            .into_iter()
            .map(|r| analyze_record(&analyzer, self.config.title_weight, r))
            .collect();

        let mut index = InvertedIndex {
            analyzer,
            title_weight: self.config.title_weight,
            skipped,
            ..InvertedIndex::default()
        };
        let mut next_term_id: TermId = 0;

        for doc in analyzed {
            let doc_id = doc.record.id;
            for (term, stats) in doc.terms {
                let tid = *index.dictionary.entry(term).or_insert_with(|| {
                    let id = next_term_id;
                    next_term_id += 1;
                    id
                });
                if index.postings.len() <= tid as usize {
                    index.postings.resize_with(tid as usize + 1, Vec::new);
                    index.df.resize(tid as usize + 1, 0);
                }
                index.df[tid as usize] += 1;
                index.postings[tid as usize].push(Posting {
                    doc_id,
                    title_tf: stats.title_tf,
                    text_tf: stats.text_tf,
                    spans: stats.spans,
                });
            }
            index.docs.insert(doc_id, StoredDoc { record: doc.record, length: doc.length });
        }
        index.num_docs = index.docs.len() as u32;

        // explicit ids may arrive out of order
        for list in &mut index.postings {
            list.sort_by_key(|p| p.doc_id);
        }

        tracing::info!(
            num_docs = index.num_docs,
            num_terms = index.dictionary.len(),
            skipped = index.skipped,
            "built inverted index"
        );
        index
    }
}

/// Validate records and give each one an id. Explicit ids are reserved up
/// front; records without one take the smallest free id, in input order.
fn assign_ids(raw: Vec<RawRecord>) -> (Vec<DocumentRecord>, u32) {
    let reserved: HashSet<DocId> = raw
        .iter()
        .filter(|r| r.validate().is_ok())
        .filter_map(|r| r.id)
        .collect();
    let mut taken: HashSet<DocId> = HashSet::with_capacity(raw.len());
    let mut next_free: DocId = 0;
    let mut out = Vec::with_capacity(raw.len());
    let mut skipped = 0u32;

    for (position, rec) in raw.into_iter().enumerate() {
        let id = match rec.id {
            Some(id) => id,
            None => {
                while reserved.contains(&next_free) || taken.contains(&next_free) {
                    next_free += 1;
                }
                next_free
            }
        };
        let result = if taken.contains(&id) {
            Err(RecordError::DuplicateId(id))
        } else {
            rec.into_record(id)
        };
        match result {
            Ok(record) => {
                taken.insert(id);
                out.push(record);
            }
            Err(err) => {
                skipped += 1;
                tracing::warn!(position, error = %err, "skipping malformed record");
            }
        }
    }
    (out, skipped)
}

fn analyze_record(analyzer: &Analyzer, title_weight: u32, record: DocumentRecord) -> AnalyzedDoc {
    let mut order: Vec<String> = Vec::new();
    let mut stats: HashMap<String, TermStats> = HashMap::new();

    let title_tokens = analyzer.analyze(&record.title);
    let text_tokens = analyzer.analyze(&record.text);
    let length = (text_tokens.len() as u32).saturating_add(title_weight.saturating_mul(title_tokens.len() as u32));

    for tok in title_tokens {
        let entry = stats.entry(tok.term.clone()).or_insert_with(|| {
            order.push(tok.term);
            TermStats::default()
        });
        entry.title_tf += 1;
    }
    for tok in text_tokens {
        let span = Span { start: tok.start as u32, end: tok.end as u32 };
        let entry = stats.entry(tok.term.clone()).or_insert_with(|| {
            order.push(tok.term);
            TermStats::default()
        });
        entry.text_tf += 1;
        entry.spans.push(span);
    }

    let terms = order
        .into_iter()
        .filter_map(|t| stats.remove(&t).map(|s| (t, s)))
        .collect();
    AnalyzedDoc { record, length, terms }
}

/// Build with default configuration.
pub fn build<I>(records: I) -> InvertedIndex
where
    I: IntoIterator<Item = RawRecord>,
{
    IndexBuilder::default().build(records)
}
