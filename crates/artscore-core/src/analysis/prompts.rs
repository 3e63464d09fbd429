use crate::models::{AnalysisRequest, ScoreLabel};

/// System instruction sent with every completion call.
pub const SYSTEM_PROMPT: &str = "You are an expert art critic. Analyze the given image.";

const SMI_INSTRUCTION: &str = "IMPORTANT: At the very end of your analysis, please include the calculated SMI value in the format 'SMI = X.XX' (where X.XX is the actual calculated value rounded to 2 decimal places).";

const RI_INSTRUCTION: &str = "IMPORTANT: At the very end of your analysis, please report the score in the format 'Representational Index (RI) = X.XX' (where X.XX is a value between 1.00 and 5.00 rounded to 2 decimal places), followed on the next line by a short paragraph explaining the score.";

const SMI_INSTRUCTIONS_FILE: &str = "\
Analyze the artwork in the attached image.

Describe its composition, use of color, line and form, and the techniques the
artist appears to use. Then assess the Structural Measure Index (SMI): weigh the
balance, rhythm and complexity of the composition and combine them into a
single value.

Report the result on the last line as: SMI = X.XX
";

const RI_INSTRUCTIONS_FILE: &str = "\
Analyze the artwork in the attached image and rate how representational it is.

Use the Representational Index (RI) scale:
  1.00 - fully abstract, no recognizable subject
  2.00 - mostly abstract, faint references to real forms
  3.00 - balanced between abstraction and depiction
  4.00 - mostly representational, stylized subjects
  5.00 - fully representational, faithful depiction

Report the result as: Representational Index (RI) = X.XX
Follow it on the next line with a short paragraph explaining the score.
";

/// Scoring instruction appended to the caller's prompt.
pub fn score_instruction(label: ScoreLabel) -> &'static str {
    match label {
        ScoreLabel::Smi => SMI_INSTRUCTION,
        ScoreLabel::Ri => RI_INSTRUCTION,
    }
}

/// Built-in body of the prompt file, served when no file is deployed.
pub fn default_instructions(label: ScoreLabel) -> &'static str {
    match label {
        ScoreLabel::Smi => SMI_INSTRUCTIONS_FILE,
        ScoreLabel::Ri => RI_INSTRUCTIONS_FILE,
    }
}

/// Build the user text for the completion call.
///
/// The title/artist header is only added when both are present; a lone title
/// or artist is dropped, matching how the browser client fills the form.
pub fn build_user_prompt(label: ScoreLabel, prompt: &str, request: &AnalysisRequest) -> String {
    let title = non_empty(request.art_title.as_deref());
    let artist = non_empty(request.artist_name.as_deref());

    let mut text = String::with_capacity(prompt.len() + 512);
    if let (Some(title), Some(artist)) = (title, artist) {
        text.push_str(&format!("Title: {title}\nArtist: {artist}\n\n"));
    }
    text.push_str(prompt);
    text.push_str("\n\n");
    text.push_str(score_instruction(label));
    text
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
