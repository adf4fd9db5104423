use docsearch_core::persist::{import_json, load_meta, IndexPaths};
use docsearch_core::{BuilderConfig, SearchOptions};
use docsearch_indexer::{build_index, collect_files, export_index, search_index};
use std::fs;
use tempfile::tempdir;

const V034: &str = r#"var documenterSearchIndex = {"docs": [

{
    "location": "index.html#JuliaFEM.jl-documentation-1",
    "page": "Home",
    "title": "JuliaFEM.jl documentation",
    "category": "section",
    "text": "The JuliaFEM project develops open-source software for reliable, scalable, distributed Finite Element Method."
},

{
    "location": "api.html#JuliaFEM.Problem",
    "page": "API",
    "title": "JuliaFEM.Problem",
    "category": "type",
    "text": "Defines a new field problem."
},

]}
"#;

#[test]
fn builds_and_searches_a_documentation_tree() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::create_dir_all(input.path().join("v0.3.4")).unwrap();
    fs::write(input.path().join("v0.3.4/search_index.js"), V034).unwrap();
    fs::write(input.path().join("extra.jsonl"), "{\"location\":\"x.html\",\"title\":\"Solver\",\"text\":\"Linear solver\"}\n{\"title\":\"no location\"}\n").unwrap();
    fs::write(input.path().join("notes.txt"), "ignored").unwrap();

    let files = collect_files(input.path()).unwrap();
    assert_eq!(files.len(), 2);

    let index = build_index(input.path(), out.path(), BuilderConfig::default()).unwrap();
    assert_eq!(index.num_docs(), 3);
    assert_eq!(index.skipped_records(), 1);

    let meta = load_meta(&IndexPaths::new(out.path())).unwrap();
    assert_eq!(meta.num_docs, 3);
    assert_eq!(meta.skipped, 1);

    let (total, hits) = search_index(out.path(), "field problem", &SearchOptions::default()).unwrap();
    assert_eq!(total, 1);
    assert_eq!(hits[0].location, "api.html#JuliaFEM.Problem");
    assert_eq!(hits[0].category, "type");
    assert_eq!(hits[0].snippet, "Defines a new **field** **problem**.");
}

#[test]
fn export_writes_a_loadable_json_index() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    let file = input.path().join("search_index.js");
    fs::write(&file, V034).unwrap();
    let built = build_index(&file, &out.path().join("idx"), BuilderConfig::default()).unwrap();
    let json = out.path().join("index.json");
    export_index(&out.path().join("idx"), &json).unwrap();
    assert_eq!(import_json(&json).unwrap(), built);
}

#[test]
fn missing_input_is_an_error() {
    let out = tempdir().unwrap();
    assert!(build_index(&out.path().join("missing"), out.path(), BuilderConfig::default()).is_err());
}
