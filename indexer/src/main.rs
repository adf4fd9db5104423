use anyhow::Result;
use clap::{Parser, Subcommand};
use docsearch_core::{AnalyzerConfig, BuilderConfig, SearchOptions};
use docsearch_indexer::{build_index, export_index, search_index};
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "docsearch-indexer")]
#[command(about = "Build and query documentation search indexes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from search_index.js / JSON / JSONL files or a directory of them
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Weight of title occurrences relative to body text
        #[arg(long, default_value_t = docsearch_core::config::DEFAULT_TITLE_WEIGHT)]
        title_weight: u32,
        /// Minimum token length in characters
        #[arg(long, default_value_t = docsearch_core::config::DEFAULT_MIN_TOKEN_LEN)]
        min_token_len: usize,
        /// Reduce terms to English stems
        #[arg(long, default_value_t = false)]
        stem: bool,
    },
    /// Query a built index
    Search {
        /// Index directory
        #[arg(long)]
        index: String,
        #[arg(long, default_value_t = docsearch_core::config::DEFAULT_LIMIT)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Restrict to a category (repeatable)
        #[arg(long)]
        category: Vec<String>,
        #[arg(long, default_value_t = 0.0)]
        min_score: f32,
        /// Print results as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
        query: String,
    },
    /// Write an index directory out as a single JSON file
    Export {
        #[arg(long)]
        index: String,
        #[arg(long)]
        output: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, title_weight, min_token_len, stem } => {
            let config = BuilderConfig {
                analyzer: AnalyzerConfig { min_token_len, stem, ..Default::default() },
                title_weight,
            };
            build_index(Path::new(&input), Path::new(&output), config)?;
            Ok(())
        }
        Commands::Search { index, limit, offset, category, min_score, json, query } => {
            let mut options = SearchOptions::default().with_limit(limit).with_offset(offset).with_min_score(min_score);
            if !category.is_empty() {
                options = options.with_categories(&category);
            }
            let (total_hits, hits) = search_index(Path::new(&index), &query, &options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else {
                println!("{total_hits} hits");
                for h in hits {
                    println!("{:>8.4}  [{}] {} / {}  ({})", h.score, h.category, h.page, h.title, h.location);
                    if !h.snippet.is_empty() {
                        println!("          {}", h.snippet);
                    }
                }
            }
            Ok(())
        }
        Commands::Export { index, output } => export_index(Path::new(&index), Path::new(&output)),
    }
}
