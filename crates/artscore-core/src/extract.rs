//! Score extraction from free-form model output.
//!
//! The model is asked to finish its analysis with a labeled score, but the
//! exact formatting drifts between responses (spacing around `=`, optional
//! `(RI)` abbreviation, one or two fractional digits). Extraction is a pure
//! function of the input text: it never fails, it only reports absence or
//! substitutes the label's default.

use crate::models::{Extraction, ScoreLabel};
use regex::Regex;
use std::sync::OnceLock;

/// Score reported for RI when the model output carries no usable marker.
/// Midpoint of the 1.00–5.00 representational scale.
pub const DEFAULT_RI: &str = "3.00";

static SMI_PATTERN: OnceLock<Regex> = OnceLock::new();
static RI_MARKER: OnceLock<Regex> = OnceLock::new();
static RI_LITERAL: OnceLock<Regex> = OnceLock::new();
static BLANK_LINE: OnceLock<Regex> = OnceLock::new();

// Digit classes are spelled `[0-9]`: `\d` in the regex crate also matches
// Arabic-Indic and fullwidth digits.

fn smi_pattern() -> &'static Regex {
    SMI_PATTERN.get_or_init(|| Regex::new(r"(?i)SMI\s*=\s*([0-9]+(?:\.[0-9]+)?)").unwrap())
}

fn ri_marker() -> &'static Regex {
    RI_MARKER.get_or_init(|| {
        Regex::new(r"(?i)Representational\s+Index\s*(?:\(\s*RI\s*\))?\s*=\s*").unwrap()
    })
}

fn ri_literal() -> &'static Regex {
    // Anchored at the end of the marker. Groups: 1 = integer part, 2 = fraction.
    RI_LITERAL.get_or_init(|| Regex::new(r"^([0-9]+)\.([0-9]{1,2})\b").unwrap())
}

fn blank_line() -> &'static Regex {
    BLANK_LINE.get_or_init(|| Regex::new(r"\n[ \t\r]*\n").unwrap())
}

/// Extract the score for `label` from model output.
pub fn extract(label: ScoreLabel, text: &str) -> Extraction {
    match label {
        ScoreLabel::Smi => extract_smi(text),
        ScoreLabel::Ri => extract_ri(text),
    }
}

/// Find the first `SMI = <number>` marker. The literal is returned as written;
/// there is no default and no explanation.
pub fn extract_smi(text: &str) -> Extraction {
    let score = smi_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    Extraction {
        score,
        explanation: String::new(),
        defaulted: false,
    }
}

/// Read the score after the first `Representational Index (RI) =` marker and
/// the explanation that follows it. The score always comes back with two
/// fractional digits. A missing marker, or a malformed literal after the first
/// marker, yields [`DEFAULT_RI`]; later markers are not consulted.
pub fn extract_ri(text: &str) -> Extraction {
    let defaulted = Extraction {
        score: Some(DEFAULT_RI.to_string()),
        explanation: String::new(),
        defaulted: true,
    };

    let Some(marker) = ri_marker().find(text) else {
        return defaulted;
    };
    let rest = &text[marker.end()..];
    let Some(caps) = ri_literal().captures(rest) else {
        return defaulted;
    };

    let whole = caps.get(1).map_or("", |m| m.as_str());
    let fraction = caps.get(2).map_or("", |m| m.as_str());
    let tail = caps.get(0).map_or(rest, |m| &rest[m.end()..]);
    let tail = blank_line().find(tail).map_or(tail, |m| &tail[..m.start()]);

    Extraction {
        score: Some(format!("{whole}.{fraction:0<2}")),
        explanation: explanation_text(tail),
        defaulted: false,
    }
}

/// Sentence punctuation written straight after the score belongs to the score
/// line, not the explanation.
fn explanation_text(tail: &str) -> String {
    let tail = tail
        .strip_prefix(|c: char| matches!(c, '.' | ',' | ';' | ':' | ')'))
        .unwrap_or(tail);
    tail.trim().to_string()
}
