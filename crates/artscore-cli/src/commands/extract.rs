use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use artscore_core::extract;
use artscore_core::models::ScoreLabel;
use serde_json::{Value, json};

/// Run the extractor over saved model output and print the result as JSON.
pub fn run(label: ScoreLabel, file: Option<&Path>) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading model output from stdin")?;
            buf
        }
    };

    println!("{}", serde_json::to_string_pretty(&render(label, &text))?);
    Ok(())
}

fn render(label: ScoreLabel, text: &str) -> Value {
    let result = extract::extract(label, text);
    json!({
        "label": label,
        "score": result.score,
        "explanation": result.explanation,
        "defaulted": result.defaulted,
    })
}
