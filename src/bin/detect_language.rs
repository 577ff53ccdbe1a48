//! Detect the language of text read from stdin and print the result as JSON.
//!
//! Usage:
//!   echo "നമസ്കാരം" | cargo run --bin detect-language
//!   cargo run --bin detect-language -- --all   # list every candidate score

use anyhow::{Context, Result};
use cultural_translator::catalog::LanguageCatalog;
use cultural_translator::detection::LanguageDetector;
use std::io::Read;
use std::sync::Arc;

fn main() -> Result<()> {
    let show_all = std::env::args().any(|arg| arg == "--all");

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;

    let catalog = Arc::new(LanguageCatalog::with_defaults());
    let detector = LanguageDetector::new(catalog.clone());
    let result = detector.detect(&text)?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if show_all {
        let mut scores: Vec<(String, f64)> = catalog
            .list_languages()
            .iter()
            .map(|language| (language.code.clone(), LanguageDetector::score(language, &text)))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        scores.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        for (code, score) in scores {
            println!("{:<8} {:.3}", code, score);
        }
    }

    Ok(())
}
