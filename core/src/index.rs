use crate::record::{DocId, DocumentRecord};
use crate::tokenizer::Analyzer;
use anyhow::{bail, ensure, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type TermId = u32;

/// Byte range of one term occurrence inside a document's `text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub title_tf: u32,
    pub text_tf: u32,
    /// Occurrences in `text`, ascending. Title hits carry no spans.
    pub spans: Vec<Span>,
}

impl Posting {
    pub fn weighted_tf(&self, title_weight: u32) -> u32 {
        self.text_tf.saturating_add(title_weight.saturating_mul(self.title_tf))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDoc {
    pub record: DocumentRecord,
    /// Weighted token count: text tokens plus `title_weight` per title token.
    pub length: u32,
}

/// Term dictionary, posting lists and document table of one corpus.
///
/// Built by [`crate::IndexBuilder`]; read-only afterwards. Postings are
/// addressed by [`TermId`], which is assigned in first-seen order while
/// building, so two builds of the same input are identical.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub(crate) analyzer: Analyzer,
    pub(crate) title_weight: u32,
    pub(crate) dictionary: BTreeMap<String, TermId>,
    pub(crate) df: Vec<u32>,
    pub(crate) postings: Vec<Vec<Posting>>, // indexed by term id, sorted by doc_id
    pub(crate) docs: BTreeMap<DocId, StoredDoc>,
    pub(crate) num_docs: u32,
    pub(crate) skipped: u32,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn num_docs(&self) -> u32 { self.num_docs }

    pub fn num_terms(&self) -> usize { self.dictionary.len() }

    pub fn is_empty(&self) -> bool { self.num_docs == 0 }

    /// Records dropped as malformed during the build.
    pub fn skipped_records(&self) -> u32 { self.skipped }

    pub fn analyzer(&self) -> &Analyzer { &self.analyzer }

    pub fn title_weight(&self) -> u32 { self.title_weight }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.dictionary.get(term).copied()
    }

    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        let tid = self.term_id(term)?;
        self.postings.get(tid as usize).map(Vec::as_slice)
    }

    pub fn document_frequency(&self, term: &str) -> u32 {
        self.term_id(term)
            .and_then(|tid| self.df.get(tid as usize).copied())
            .unwrap_or(0)
    }

    pub fn document(&self, id: DocId) -> Option<&DocumentRecord> {
        self.docs.get(&id).map(|d| &d.record)
    }

    pub fn doc_length(&self, id: DocId) -> Option<u32> {
        self.docs.get(&id).map(|d| d.length)
    }

    /// Documents in ascending id order.
    pub fn documents(&self) -> impl Iterator<Item = &DocumentRecord> + '_ {
        self.docs.values().map(|d| &d.record)
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.dictionary.keys().map(String::as_str)
    }

    /// Check the structural invariants: one posting list and df entry per
    /// term, postings strictly ascending by doc id, df equal to posting list
    /// length, and every posting pointing at a known document.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.df.len() == self.postings.len(),
            "df has {} entries but there are {} posting lists",
            self.df.len(),
            self.postings.len()
        );
        ensure!(
            self.dictionary.len() == self.postings.len(),
            "dictionary has {} terms but there are {} posting lists",
            self.dictionary.len(),
            self.postings.len()
        );
        ensure!(
            self.num_docs as usize == self.docs.len(),
            "num_docs is {} but the document table holds {}",
            self.num_docs,
            self.docs.len()
        );
        for (term, &tid) in &self.dictionary {
            let Some(list) = self.postings.get(tid as usize) else {
                bail!("term `{term}` points at missing posting list {tid}");
            };
            ensure!(
                list.windows(2).all(|w| w[0].doc_id < w[1].doc_id),
                "postings for `{term}` are not strictly ascending by doc id"
            );
            ensure!(
                self.df[tid as usize] as usize == list.len(),
                "df for `{term}` disagrees with its posting list"
            );
            if let Some(p) = list.iter().find(|p| !self.docs.contains_key(&p.doc_id)) {
                bail!("postings for `{term}` reference unknown document {}", p.doc_id);
            }
        }
        Ok(())
    }

    /// Serialize the whole index as JSON, e.g. for shipping to a browser.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let index: Self = serde_json::from_str(json)?;
        index.validate()?;
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IndexBuilder, RawRecord};

    fn sample() -> InvertedIndex {
        IndexBuilder::default().build(vec![
            RawRecord::new("a.html", "Mesh", "Create a mesh from nodes."),
            RawRecord::new("b.html", "Nodes", "Nodes carry coordinates."),
        ])
    }

    #[test]
    fn empty_index_is_valid() {
        let idx = InvertedIndex::new();
        assert!(idx.is_empty());
        idx.validate().unwrap();
    }

    #[test]
    fn lookups_resolve_terms_and_documents() {
        let idx = sample();
        assert_eq!(idx.num_docs(), 2);
        assert_eq!(idx.document_frequency("nodes"), 2);
        assert_eq!(idx.document_frequency("mesh"), 1);
        assert_eq!(idx.document_frequency("absent"), 0);
        assert_eq!(idx.document(1).unwrap().title, "Nodes");
        assert!(idx.postings("absent").is_none());
        idx.validate().unwrap();
    }

    #[test]
    fn validate_rejects_unsorted_postings() {
        let mut idx = sample();
        let tid = idx.term_id("nodes").unwrap() as usize;
        idx.postings[tid].reverse();
        assert!(idx.validate().is_err());
    }

    #[test]
    fn validate_rejects_dangling_documents() {
        let mut idx = sample();
        idx.docs.remove(&1);
        idx.num_docs = 1;
        assert!(idx.validate().is_err());
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let idx = sample();
        let back = InvertedIndex::from_json(&idx.to_json().unwrap()).unwrap();
        assert_eq!(back, idx);
    }
}
