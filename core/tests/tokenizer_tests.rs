use docsearch_core::tokenizer::{tokenize, Analyzer};
use docsearch_core::AnalyzerConfig;

#[test]
fn it_normalizes_and_stems() {
    let analyzer = Analyzer::new(AnalyzerConfig { stem: true, ..Default::default() });
    let words = analyzer.query_terms("Running Runners RUN! The café's menu.");
    assert!(words.contains(&"run".to_string()));
    assert!(words.contains(&"menu".to_string()));
    assert!(!words.contains(&"the".to_string()));
}

#[test]
fn it_filters_stopwords() {
    let words: Vec<String> = tokenize("The quick brown fox and the lazy dog").into_iter().map(|t| t.term).collect();
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(words.contains(&"quick".to_string()));
}

#[test]
fn it_applies_nfkc_before_lowercasing() {
    // fullwidth letters and the "fi" ligature fold to plain ASCII
    let words: Vec<String> = tokenize("ＦＥＭ ﬁeld").into_iter().map(|t| t.term).collect();
    assert_eq!(words, vec!["fem", "field"]);
}

#[test]
fn query_and_index_tokenization_agree() {
    let analyzer = Analyzer::default();
    let text = "JuliaFEM.jl: Installing and testing package";
    let indexed: Vec<String> = analyzer.analyze(text).into_iter().map(|t| t.term).collect();
    assert_eq!(analyzer.query_terms(text), indexed);
}

#[test]
fn decomposed_accents_match_composed_queries() {
    let analyzer = Analyzer::default();
    let text = "The cafe\u{301} serves food.";
    let tokens = analyzer.analyze(text);
    assert_eq!(tokens[0].term, "caf\u{e9}");
    assert_eq!(&text[tokens[0].start..tokens[0].end], "cafe\u{301}");
    assert_eq!(analyzer.query_terms("caf\u{e9}"), vec!["caf\u{e9}".to_string()]);
}
