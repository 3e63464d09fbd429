use serde::{Deserialize, Serialize};

// ── Score labels ──

/// Which score convention a deployment asks the model for and extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreLabel {
    /// `SMI = X.XX`, returned verbatim and never defaulted.
    Smi,
    /// `Representational Index (RI) = X.XX` plus an explanation, defaulted to `3.00`.
    Ri,
}

impl std::fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Smi => write!(f, "smi"),
            Self::Ri => write!(f, "ri"),
        }
    }
}

impl std::str::FromStr for ScoreLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smi" => Ok(Self::Smi),
            "ri" => Ok(Self::Ri),
            other => Err(format!("unknown score label '{other}' (expected 'smi' or 'ri')")),
        }
    }
}

impl ScoreLabel {
    /// Name of the prompt instructions file served for this label.
    pub fn prompt_file(&self) -> &'static str {
        match self {
            Self::Smi => "PromptAnalyzeArt.txt",
            Self::Ri => "PromptCalcRI.txt",
        }
    }
}

// ── Request / response bodies ──

/// Body of `POST /analyze`. Every field is optional on the wire so that
/// missing values surface as a validation error rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    /// Base64-encoded image bytes, without a `data:` prefix.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub art_title: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
}

/// Successful `/analyze` response, one shape per [`ScoreLabel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResponse {
    Ri(RiAnalysis),
    Smi(SmiAnalysis),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmiAnalysis {
    pub analysis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    pub smi_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiAnalysis {
    pub analysis: String,
    pub ri: String,
    pub explanation: String,
}

// ── Extraction ──

/// Score and explanation pulled out of model text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Decimal literal as it should be reported, or `None` when absent.
    pub score: Option<String>,
    pub explanation: String,
    /// True when no score was found and the label's default was substituted.
    pub defaulted: bool,
}

// ── Upstream completion ──

/// One multimodal completion call: a system instruction, user text and an inline image.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub text: String,
    pub image_base64: String,
    pub max_tokens: u32,
}

/// Response from a completion backend call.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The generated message content.
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_label_from_str() {
        assert_eq!("smi".parse::<ScoreLabel>().unwrap(), ScoreLabel::Smi);
        assert_eq!(" RI ".parse::<ScoreLabel>().unwrap(), ScoreLabel::Ri);
        assert!("index".parse::<ScoreLabel>().is_err());
    }

    #[test]
    fn test_score_label_deserialize() {
        let label: ScoreLabel = serde_json::from_str("\"ri\"").unwrap();
        assert_eq!(label, ScoreLabel::Ri);
        assert_eq!(label.to_string(), "ri");
    }

    #[test]
    fn test_analysis_request_camel_case() {
        let json = r#"{"prompt":"p","image":"aGk=","artTitle":"Starry Night","artistName":"Van Gogh"}"#;
        let req: AnalysisRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.art_title.as_deref(), Some("Starry Night"));
        assert_eq!(req.artist_name.as_deref(), Some("Van Gogh"));
    }

    #[test]
    fn test_analysis_request_missing_fields() {
        let req: AnalysisRequest = serde_json::from_str("{}").unwrap();
        assert!(req.prompt.is_none());
        assert!(req.image.is_none());
    }

    #[test]
    fn test_smi_response_shape() {
        let resp = AnalysisResponse::Smi(SmiAnalysis {
            analysis: "text".to_string(),
            art_title: None,
            artist_name: Some("Klee".to_string()),
            smi_value: None,
        });
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"analysis": "text", "artistName": "Klee", "smiValue": null})
        );
    }

    #[test]
    fn test_ri_response_shape() {
        let resp = AnalysisResponse::Ri(RiAnalysis {
            analysis: "text".to_string(),
            ri: "3.00".to_string(),
            explanation: String::new(),
        });
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"analysis": "text", "ri": "3.00", "explanation": ""})
        );
    }
}
