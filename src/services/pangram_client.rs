use anyhow::{bail, Context};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::hyperbrowser_client::error_for_status;

#[derive(Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
}

/// The two fields kept from a Pangram prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct PangramPrediction {
    pub prediction: Option<String>,
    pub ai_likelihood: Option<f64>,
}

#[derive(Deserialize)]
struct RawPrediction {
    #[serde(default)]
    prediction: Option<String>,
    #[serde(default)]
    ai_likelihood: Option<f64>,
}

/// Blocking. Callers run it on the worker pool.
pub trait ClassificationService: Send + Sync {
    fn predict(&self, api_key: &str, text: &str) -> anyhow::Result<Value>;
}

pub struct PangramClient {
    url: String,
}

impl PangramClient {
    pub fn new(url: String) -> Self {
        PangramClient { url }
    }
}

impl ClassificationService for PangramClient {
    fn predict(&self, api_key: &str, text: &str) -> anyhow::Result<Value> {
        let res = Client::new()
            .post(&self.url)
            .header("x-api-key", api_key)
            .json(&PredictRequest { text })
            .send()
            .context("Failed to reach Pangram")?;

        let res = error_for_status(res)?;
        res.json().context("Failed to deserialize Pangram response")
    }
}

/// Reads the label and likelihood out of a raw Pangram result.
pub fn parse_prediction(raw: Value) -> anyhow::Result<PangramPrediction> {
    // Derived structs also accept sequences, so the object check comes first
    if !raw.is_object() {
        bail!("Unexpected Pangram response shape: {}", raw);
    }

    let raw: RawPrediction =
        serde_json::from_value(raw).context("Unexpected Pangram response shape")?;

    if let Some(likelihood) = raw.ai_likelihood {
        if !likelihood.is_finite() || !(0.0..=1.0).contains(&likelihood) {
            bail!("Pangram ai_likelihood {} is outside [0, 1]", likelihood);
        }
    }

    Ok(PangramPrediction {
        prediction: raw.prediction,
        ai_likelihood: raw.ai_likelihood,
    })
}
