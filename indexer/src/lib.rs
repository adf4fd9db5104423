use anyhow::{Context, Result};
use docsearch_core::loader::parse_records;
use docsearch_core::persist::{export_json, load_index, save_index, IndexPaths};
use docsearch_core::{BuilderConfig, InvertedIndex, QueryEngine, RawRecord, SearchOptions};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Record files under `input`: the file itself, or every `.js`, `.json` and
/// `.jsonl` file below a directory, sorted so builds are reproducible.
pub fn collect_files(input: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "js" | "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
        files.sort();
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        anyhow::bail!("input {} does not exist", input.display());
    }
    Ok(files)
}

pub fn read_records(files: &[PathBuf]) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    for file in files {
        let content = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
        let batch = parse_records(&content).with_context(|| format!("parsing {}", file.display()))?;
        tracing::debug!(file = %file.display(), records = batch.len(), "read records");
        records.extend(batch);
    }
    Ok(records)
}

pub fn build_index(input: &Path, output: &Path, config: BuilderConfig) -> Result<InvertedIndex> {
    let files = collect_files(input)?;
    let records = read_records(&files)?;
    tracing::info!(files = files.len(), records = records.len(), "ingesting records");

    let index = docsearch_core::IndexBuilder::new(config).build(records);
    if index.skipped_records() > 0 {
        tracing::warn!(skipped = index.skipped_records(), "some records were malformed and left out");
    }

    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default();
    save_index(&IndexPaths::new(output), &index, &created_at)?;
    tracing::info!(output = %output.display(), "index build complete");
    Ok(index)
}

#[derive(Debug, Serialize)]
pub struct Hit {
    pub doc_id: u32,
    pub score: f32,
    pub location: String,
    pub page: String,
    pub title: String,
    pub category: String,
    pub snippet: String,
}

pub fn search_index(index_dir: &Path, q: &str, options: &SearchOptions) -> Result<(usize, Vec<Hit>)> {
    let index = load_index(&IndexPaths::new(index_dir))?;
    let results = QueryEngine::new(&index).search(q, options)?;
    let hits = results
        .results
        .into_iter()
        .filter_map(|r| {
            let doc = index.document(r.doc_id)?;
            Some(Hit {
                doc_id: r.doc_id,
                score: r.score,
                location: doc.location.clone(),
                page: doc.page.clone(),
                title: doc.title.clone(),
                category: doc.category.to_string(),
                snippet: r.snippet.render("**", "**"),
            })
        })
        .collect();
    Ok((results.total_hits, hits))
}

pub fn export_index(index_dir: &Path, output: &Path) -> Result<()> {
    let index = load_index(&IndexPaths::new(index_dir))?;
    export_json(&index, output)?;
    tracing::info!(output = %output.display(), "exported index as json");
    Ok(())
}
