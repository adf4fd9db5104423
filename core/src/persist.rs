use crate::config::AnalyzerConfig;
use crate::index::{InvertedIndex, Posting, StoredDoc, TermId};
use crate::record::DocId;
use crate::tokenizer::Analyzer;
use anyhow::{ensure, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Bumped whenever the on-disk layout changes.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub version: u32,
    pub created_at: String,
    pub num_docs: u32,
    pub num_terms: u32,
    pub skipped: u32,
}

/// Tokenization settings the index was built with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsFile {
    pub analyzer: AnalyzerConfig,
    pub title_weight: u32,
}

type Dictionary = (BTreeMap<String, TermId>, Vec<u32>);

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn dictionary(&self) -> PathBuf { self.root.join("dictionary.bin") }
    fn docs(&self) -> PathBuf { self.root.join("docs.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    fn settings(&self) -> PathBuf { self.root.join("analyzer.json") }
    fn postings(&self) -> PathBuf { self.root.join("postings.bin") }
}

fn write_bincode<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(f);
    bincode::serialize_into(&mut w, value).with_context(|| format!("encoding {}", path.display()))?;
    w.flush()?;
    Ok(())
}

fn read_bincode<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let value = bincode::deserialize_from(BufReader::new(f)).with_context(|| format!("decoding {}", path.display()))?;
    Ok(value)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let json = serde_json::to_string_pretty(value)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let value = serde_json::from_str(&buf).with_context(|| format!("parsing {}", path.display()))?;
    Ok(value)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_json(&paths.meta(), meta)
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    read_json(&paths.meta())
}

pub fn load_settings(paths: &IndexPaths) -> Result<SettingsFile> {
    read_json(&paths.settings())
}

/// Write every part of `index` under `paths.root`, creating the directory.
pub fn save_index(paths: &IndexPaths, index: &InvertedIndex, created_at: &str) -> Result<()> {
    create_dir_all(&paths.root).with_context(|| format!("creating {}", paths.root.display()))?;
    let settings = SettingsFile {
        analyzer: index.analyzer.config().clone(),
        title_weight: index.title_weight,
    };
    write_json(&paths.settings(), &settings)?;
    let dict: (&BTreeMap<String, TermId>, &Vec<u32>) = (&index.dictionary, &index.df);
    write_bincode(&paths.dictionary(), &dict)?;
    write_bincode(&paths.postings(), &index.postings)?;
    write_bincode(&paths.docs(), &index.docs)?;
    let meta = MetaFile {
        version: FORMAT_VERSION,
        created_at: created_at.to_string(),
        num_docs: index.num_docs,
        num_terms: index.dictionary.len() as u32,
        skipped: index.skipped,
    };
    save_meta(paths, &meta)?;
    tracing::info!(root = %paths.root.display(), num_docs = meta.num_docs, num_terms = meta.num_terms, "saved index");
    Ok(())
}

/// Read an index written by [`save_index`] and check its invariants.
pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let meta = load_meta(paths)?;
    ensure!(
        meta.version == FORMAT_VERSION,
        "index at {} has format version {}, expected {}",
        paths.root.display(),
        meta.version,
        FORMAT_VERSION
    );
    let settings = load_settings(paths)?;
    let (dictionary, df): Dictionary = read_bincode(&paths.dictionary())?;
    let postings: Vec<Vec<Posting>> = read_bincode(&paths.postings())?;
    let docs: BTreeMap<DocId, StoredDoc> = read_bincode(&paths.docs())?;

    let index = InvertedIndex {
        analyzer: Analyzer::new(settings.analyzer),
        title_weight: settings.title_weight,
        dictionary,
        df,
        postings,
        docs,
        num_docs: meta.num_docs,
        skipped: meta.skipped,
    };
    index.validate().with_context(|| format!("index at {} is inconsistent", paths.root.display()))?;
    ensure!(
        index.num_terms() == meta.num_terms as usize,
        "meta.json lists {} terms but dictionary holds {}",
        meta.num_terms,
        index.num_terms()
    );
    tracing::info!(root = %paths.root.display(), num_docs = index.num_docs, "loaded index");
    Ok(index)
}

/// Write the whole index as one JSON document.
pub fn export_json(index: &InvertedIndex, path: &Path) -> Result<()> {
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer(&mut w, index)?;
    w.flush()?;
    Ok(())
}

pub fn import_json(path: &Path) -> Result<InvertedIndex> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let index: InvertedIndex = serde_json::from_reader(BufReader::new(f))?;
    index.validate()?;
    Ok(index)
}
