use serde::{Deserialize, Serialize};

pub const PREDICTION_ERROR: &str = "Error";
pub const PREDICTION_SKIPPED: &str = "Skipped";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    Pending,
    Success,
    Error,
}

impl ExtractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Pending => "pending",
            ExtractionStatus::Success => "success",
            ExtractionStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub status: ExtractionStatus,
    pub extracted_text: Option<String>,
    pub error_message: Option<String>,
}

impl ExtractionResult {
    pub fn pending() -> Self {
        ExtractionResult {
            status: ExtractionStatus::Pending,
            extracted_text: None,
            error_message: None,
        }
    }

    pub fn success(text: String) -> Self {
        ExtractionResult {
            status: ExtractionStatus::Success,
            extracted_text: Some(text),
            error_message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ExtractionResult {
            status: ExtractionStatus::Error,
            extracted_text: None,
            error_message: Some(message.into()),
        }
    }

    /// Text worth sending to the classifier: present and not blank.
    pub fn usable_text(&self) -> Option<&str> {
        match (self.status, self.extracted_text.as_deref()) {
            (ExtractionStatus::Success, Some(text)) if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub prediction: Option<String>,
    pub ai_likelihood: Option<f64>,
    pub error_message: Option<String>,
}

impl AnalysisResult {
    pub fn success(prediction: Option<String>, ai_likelihood: Option<f64>) -> Self {
        AnalysisResult {
            prediction,
            ai_likelihood,
            error_message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        AnalysisResult {
            prediction: Some(PREDICTION_ERROR.to_string()),
            ai_likelihood: None,
            error_message: Some(message.into()),
        }
    }

    pub fn skipped() -> Self {
        AnalysisResult {
            prediction: Some(PREDICTION_SKIPPED.to_string()),
            ai_likelihood: None,
            error_message: Some("No text from HyperBrowser".to_string()),
        }
    }

    pub fn is_unset(&self) -> bool {
        self.prediction.is_none() && self.error_message.is_none()
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self.prediction.as_deref(),
            Some(PREDICTION_ERROR) | Some(PREDICTION_SKIPPED)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessUrlResponse {
    pub hyperbrowser_result: ExtractionResult,
    pub pangram_analysis: AnalysisResult,
    pub overall_status: String,
    pub error_message: Option<String>,
}

pub const OVERALL_SUCCESS: &str = "success";
pub const OVERALL_PANGRAM_ERROR: &str = "error_pangram_analysis";
pub const OVERALL_SERVER_EXCEPTION: &str = "error_server_exception";

/// Names the first stage that failed, or `success`.
pub fn overall_status(extraction: &ExtractionResult, analysis: &AnalysisResult) -> String {
    if extraction.status != ExtractionStatus::Success {
        return format!("error_hyperbrowser_{}", extraction.status.as_str());
    }
    if extraction.usable_text().is_none() {
        return "error_hyperbrowser_empty".to_string();
    }
    if analysis.is_failure() {
        return OVERALL_PANGRAM_ERROR.to_string();
    }

    OVERALL_SUCCESS.to_string()
}
