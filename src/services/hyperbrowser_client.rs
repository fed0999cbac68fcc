use std::{thread, time::Duration};

use anyhow::{anyhow, Context};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ExtractionResult;

/// Parameters for a HyperBrowser extract job.
#[derive(Debug, Clone, Serialize)]
pub struct StartExtractJobParams {
    pub urls: Vec<String>,
    pub prompt: String,
    pub schema: Value,
}

#[derive(Debug, Deserialize)]
struct StartExtractJobResponse {
    #[serde(rename = "jobId")]
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct ExtractJobStatusResponse {
    status: String,
}

/// A finished (or at least no longer polled) extract job.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractJobResponse {
    #[serde(rename = "jobId", default)]
    pub job_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The single field asked of the extractor.
#[derive(Debug, Deserialize)]
struct ExtractionSchema {
    extracted_text: String,
}

pub fn extraction_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "extracted_text": {
                "type": "string",
                "description": "The text content extracted based on the user's prompt."
            }
        },
        "required": ["extracted_text"]
    })
}

/// Blocking. Callers run it on the worker pool.
pub trait ExtractionService: Send + Sync {
    fn start_and_wait(
        &self,
        api_key: &str,
        params: &StartExtractJobParams,
    ) -> anyhow::Result<ExtractJobResponse>;
}

pub struct HyperbrowserClient {
    base_url: String,
    poll_interval: Duration,
}

impl HyperbrowserClient {
    pub fn new(base_url: String, poll_interval: Duration) -> Self {
        HyperbrowserClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            poll_interval,
        }
    }

    fn start_job(
        &self,
        client: &Client,
        api_key: &str,
        params: &StartExtractJobParams,
    ) -> anyhow::Result<String> {
        let res = client
            .post(format!("{}/api/extract", self.base_url))
            .header("x-api-key", api_key)
            .json(params)
            .send()
            .context("Failed to start HyperBrowser extract job")?;

        let res = error_for_status(res)?;
        let started: StartExtractJobResponse = res
            .json()
            .context("Failed to deserialize HyperBrowser start job response")?;

        Ok(started.job_id)
    }

    fn job_status(&self, client: &Client, api_key: &str, job_id: &str) -> anyhow::Result<String> {
        let res = client
            .get(format!("{}/api/extract/{}/status", self.base_url, job_id))
            .header("x-api-key", api_key)
            .send()
            .context("Failed to poll HyperBrowser extract job")?;

        let res = error_for_status(res)?;
        let status: ExtractJobStatusResponse = res
            .json()
            .context("Failed to deserialize HyperBrowser job status")?;

        Ok(status.status)
    }

    fn job_result(
        &self,
        client: &Client,
        api_key: &str,
        job_id: &str,
    ) -> anyhow::Result<ExtractJobResponse> {
        let res = client
            .get(format!("{}/api/extract/{}", self.base_url, job_id))
            .header("x-api-key", api_key)
            .send()
            .context("Failed to fetch HyperBrowser extract job")?;

        let res = error_for_status(res)?;
        res.json()
            .context("Failed to deserialize HyperBrowser extract job")
    }
}

impl ExtractionService for HyperbrowserClient {
    fn start_and_wait(
        &self,
        api_key: &str,
        params: &StartExtractJobParams,
    ) -> anyhow::Result<ExtractJobResponse> {
        let client = Client::new();

        let job_id = self.start_job(&client, api_key, params)?;
        log::info!("Started HyperBrowser extract job {}", job_id);

        // No deadline: a job that never finishes keeps this worker busy
        loop {
            let status = self.job_status(&client, api_key, &job_id)?;
            match status.as_str() {
                "completed" | "failed" => break,
                _ => {
                    log::debug!("HyperBrowser job {} is {}", job_id, status);
                    thread::sleep(self.poll_interval);
                }
            }
        }

        self.job_result(&client, api_key, &job_id)
    }
}

pub(crate) fn error_for_status(
    res: reqwest::blocking::Response,
) -> anyhow::Result<reqwest::blocking::Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().unwrap_or_default();
    Err(anyhow!("API returned {}: {}", status.as_u16(), body))
}

/// Folds a finished job into the extraction result shown to the caller.
pub fn interpret_extract_job(job: &ExtractJobResponse) -> ExtractionResult {
    match job.status.as_str() {
        "completed" | "succeeded" if has_payload(job.data.as_ref()) => {
            let payload = match job.data.as_ref() {
                Some(Value::Array(items)) => items.first(),
                other => other,
            };
            let Some(payload) = payload else {
                return unexpected_status(&job.status);
            };

            match serde_json::from_value::<ExtractionSchema>(payload.clone()) {
                Ok(parsed) => ExtractionResult::success(parsed.extracted_text),
                Err(e) => {
                    log::error!(
                        "HyperBrowser data did not match the extraction schema: {:?}. Data: {}",
                        e,
                        payload
                    );
                    ExtractionResult::error(format!("Data parsing error: {}", e))
                }
            }
        }
        "failed" => ExtractionResult::error(
            job.error
                .clone()
                .unwrap_or_else(|| "Unknown HyperBrowser extraction error".to_string()),
        ),
        other => unexpected_status(other),
    }
}

/// Empty containers, empty strings, zero and `false` carry nothing to parse.
fn has_payload(data: Option<&Value>) -> bool {
    match data {
        None | Some(Value::Null) => false,
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
    }
}

fn unexpected_status(status: &str) -> ExtractionResult {
    ExtractionResult::error(format!("Unexpected HyperBrowser status: {}", status))
}
