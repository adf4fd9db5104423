use docsearch_core::loader::parse_records;
use docsearch_core::{build, query, DocId, InvertedIndex, QueryEngine, RawRecord, ScoringConfig, SearchOptions};
use proptest::prelude::*;

const SEARCH_INDEX_JS: &str = r#"var documenterSearchIndex = {"docs": [

{
    "location": "index.html#",
    "page": "Home",
    "title": "Home",
    "category": "page",
    "text": ""
},

{
    "location": "index.html#Installing-and-testing-package-1",
    "page": "Home",
    "title": "Installing and testing package",
    "category": "section",
    "text": "Installing package goes same way like other packages in julia, i.e.julia> Pkg.add(\"JuliaFEM\")Testing package can be done using Pkg.test, i.e.julia> Pkg.test(\"JuliaFEM\")"
},

{
    "location": "api.html#JuliaFEM.Element",
    "page": "API",
    "title": "JuliaFEM.Element",
    "category": "type",
    "text": "Construct a new element where TYPE is the type of the element."
},

{
    "location": "api.html#JuliaFEM.update!",
    "page": "API",
    "title": "JuliaFEM.update!",
    "category": "function",
    "text": "Update element field."
},

]}
"#;

fn ids(results: &[docsearch_core::QueryResult]) -> Vec<DocId> {
    results.iter().map(|r| r.doc_id).collect()
}

fn site() -> InvertedIndex {
    build(parse_records(SEARCH_INDEX_JS).unwrap())
}

#[test]
fn documenter_dump_is_searchable_end_to_end() {
    let idx = site();
    assert_eq!(idx.num_docs(), 4);
    let res = query(&idx, "update field", &SearchOptions::default()).unwrap();
    assert_eq!(res[0].doc_id, 3);
    let doc = idx.document(res[0].doc_id).unwrap();
    assert_eq!(doc.location, "api.html#JuliaFEM.update!");
    assert_eq!(res[0].snippet.render("<em>", "</em>"), "<em>Update</em> element <em>field</em>.");
}

#[test]
fn category_filter_over_documenter_categories() {
    let idx = site();
    let opts = SearchOptions::default().with_categories(&["type"]);
    let res = query(&idx, "element", &opts).unwrap();
    assert_eq!(ids(&res), vec![2]);
}

#[test]
fn highlights_cover_every_matched_term_in_the_window() {
    let idx = site();
    let res = query(&idx, "element type", &SearchOptions::default()).unwrap();
    assert_eq!(res[0].doc_id, 2);
    let marked = res[0].snippet.render("[", "]");
    assert_eq!(marked, "Construct a new [element] where [TYPE] is the [type] of the [element].");
}

#[test]
fn element_and_construct_scenarios() {
    let idx = build(vec![
        RawRecord::new("a", "Element", "Construct a new element of type E.").with_id(1),
        RawRecord::new("b", "Problem", "Construct a new field problem.").with_id(2),
    ]);
    assert_eq!(ids(&query(&idx, "element", &SearchOptions::default()).unwrap()), vec![1]);
    let both = query(&idx, "construct", &SearchOptions::default()).unwrap();
    assert_eq!(ids(&both), vec![1, 2]);
    assert!(both[0].score >= both[1].score);
}

#[test]
fn score_is_weighted_tf_over_weighted_length_times_idf() {
    let idx = build(vec![
        RawRecord::new("a", "Element", "Construct a new element of type E.").with_id(1),
        RawRecord::new("b", "Problem", "Construct a new field problem.").with_id(2),
    ]);
    // title "element" x3 plus one text hit; length 3 + construct, new, element, type
    let smoothed = query(&idx, "element", &SearchOptions::default()).unwrap();
    let expected = 4.0f32 / 7.0 * (1.0f32 + 2.0 / 1.0).ln();
    assert!((smoothed[0].score - expected).abs() < 1e-6, "{} != {expected}", smoothed[0].score);

    let raw = ScoringConfig { smoothed_idf: false, ..Default::default() };
    let res = QueryEngine::with_scoring(&idx, raw).search("element", &SearchOptions::default()).unwrap();
    let expected = 4.0f32 / 7.0 * 2f32.ln();
    assert!((res.results[0].score - expected).abs() < 1e-6, "{} != {expected}", res.results[0].score);
}

#[test]
fn decomposed_text_is_found_by_composed_query() {
    let idx = build(vec![RawRecord::new("a.html", "Menu", "The cafe\u{301} serves food.")]);
    let res = query(&idx, "caf\u{e9}", &SearchOptions::default()).unwrap();
    assert_eq!(ids(&res), vec![0]);
    assert_eq!(res[0].snippet.render("<em>", "</em>"), "The <em>cafe\u{301}</em> serves food.");
}

#[test]
fn engine_reports_total_hits_beyond_the_page() {
    let idx = site();
    let engine = QueryEngine::new(&idx);
    let page = engine.search("julia package element", &SearchOptions::default().with_limit(1)).unwrap();
    assert_eq!(page.results.len(), 1);
    assert!(page.total_hits >= 3);
}

fn word() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["mesh", "node", "solver", "element", "field", "the", "of", "x", "Problem", "assembly"])
        .prop_map(str::to_string)
}

fn record() -> impl Strategy<Value = RawRecord> {
    (prop::collection::vec(word(), 0..4), prop::collection::vec(word(), 0..12))
        .prop_map(|(title, text)| RawRecord::new("p.html", &title.join(" "), &text.join(" ")))
}

proptest! {
    #[test]
    fn build_is_deterministic(records in prop::collection::vec(record(), 0..20), q in prop::collection::vec(word(), 0..3)) {
        let a = build(records.clone());
        let b = build(records);
        prop_assert_eq!(&a, &b);
        let q = q.join(" ");
        prop_assert_eq!(
            query(&a, &q, &SearchOptions::default()).unwrap(),
            query(&b, &q, &SearchOptions::default()).unwrap()
        );
    }

    #[test]
    fn limit_is_respected_and_order_is_total(records in prop::collection::vec(record(), 0..30), limit in 1usize..8) {
        let idx = build(records);
        let res = query(&idx, "mesh solver field", &SearchOptions::default().with_limit(limit)).unwrap();
        prop_assert!(res.len() <= limit);
        for w in res.windows(2) {
            prop_assert!(w[0].score > w[1].score || (w[0].score == w[1].score && w[0].doc_id < w[1].doc_id));
        }
    }

    #[test]
    fn unique_token_finds_its_record(records in prop::collection::vec(record(), 0..15), pos in any::<prop::sample::Index>()) {
        let mut records = records;
        let at = pos.index(records.len() + 1);
        records.insert(at, RawRecord::new("unique.html", "", "zyxwvut"));
        let idx = build(records);
        let res = query(&idx, "zyxwvut", &SearchOptions::default()).unwrap();
        prop_assert_eq!(res.len(), 1);
        prop_assert_eq!(res[0].doc_id, at as DocId);
        prop_assert!(res[0].score > 0.0);
    }

    #[test]
    fn stopword_queries_are_always_empty(records in prop::collection::vec(record(), 0..10)) {
        let idx = build(records);
        prop_assert!(query(&idx, "the of a x", &SearchOptions::default()).unwrap().is_empty());
    }
}
