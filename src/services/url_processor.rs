use std::sync::Arc;

use actix_web::{error::BlockingError, web};

use crate::{
    configuration::Settings,
    domain::{
        overall_status, AnalysisResult, ExtractionResult, ExtractionStatus, ProcessUrlRequest,
        ProcessUrlResponse, OVERALL_SERVER_EXCEPTION,
    },
};

use super::{
    extraction_schema, interpret_extract_job, parse_prediction, ClassificationService,
    ExtractionService, StartExtractJobParams,
};

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("{0} API key is not configured.")]
    MissingApiKey(&'static str),
    #[error("Worker pool failed to run the {stage} call: {source}")]
    Worker {
        stage: &'static str,
        #[source]
        source: BlockingError,
    },
}

/// Both vendor keys, checked present.
#[derive(Clone)]
pub struct ApiKeys {
    pub hyperbrowser: String,
    pub pangram: String,
}

impl ApiKeys {
    pub fn require(settings: &Settings) -> Result<Self, ProcessError> {
        let hyperbrowser = present(settings.hyperbrowser.api_key.as_deref())
            .ok_or(ProcessError::MissingApiKey("HyperBrowser"))?;
        let pangram = present(settings.pangram.api_key.as_deref())
            .ok_or(ProcessError::MissingApiKey("Pangram"))?;

        Ok(ApiKeys {
            hyperbrowser,
            pangram,
        })
    }
}

fn present(key: Option<&str>) -> Option<String> {
    key.map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

pub fn build_extraction_prompt(request: &ProcessUrlRequest) -> String {
    compose_prompt(request, false)
}

/// The prompt as it may appear in logs, with the password masked.
fn loggable_prompt(request: &ProcessUrlRequest) -> String {
    compose_prompt(request, true)
}

fn compose_prompt(request: &ProcessUrlRequest, mask_password: bool) -> String {
    let mut prompt_parts = vec![];

    match request.credentials() {
        Some((username, password)) => prompt_parts.push(format!(
            "The target site is {}. \
            If a login is encountered or required to access the main content, please attempt to log in. \
            Use username '{}'. The password is '{}'. \
            After handling any login, or if no login is needed, ",
            request.url,
            username,
            if mask_password { "********" } else { password }
        )),
        None => prompt_parts.push(format!("For the content at {}, ", request.url)),
    }

    prompt_parts.push(format!(
        "please extract the following: {}.",
        request.target_object_description
    ));
    prompt_parts.push(
        "Focus on returning only the specifically requested text as a single string in the 'extracted_text' field."
            .to_string(),
    );

    prompt_parts.join(" ")
}

/// Runs extraction then classification for one request.
pub struct UrlProcessor {
    extractor: Arc<dyn ExtractionService>,
    classifier: Arc<dyn ClassificationService>,
}

impl UrlProcessor {
    pub fn new(
        extractor: Arc<dyn ExtractionService>,
        classifier: Arc<dyn ClassificationService>,
    ) -> Self {
        UrlProcessor {
            extractor,
            classifier,
        }
    }

    pub async fn process(&self, keys: ApiKeys, request: &ProcessUrlRequest) -> ProcessUrlResponse {
        let mut extraction = ExtractionResult::pending();
        let mut analysis = AnalysisResult::default();

        match self
            .run(keys, request, &mut extraction, &mut analysis)
            .await
        {
            Ok(()) => {
                let overall_status = overall_status(&extraction, &analysis);
                log::info!("Processed {} with status {}", request.url, overall_status);

                ProcessUrlResponse {
                    hyperbrowser_result: extraction,
                    pangram_analysis: analysis,
                    overall_status,
                    error_message: None,
                }
            }
            Err(e) => {
                log::error!("Overall error processing URL {}: {:?}", request.url, e);

                if extraction.status == ExtractionStatus::Pending {
                    extraction = ExtractionResult::error(e.to_string());
                }
                if analysis.is_unset() {
                    analysis = AnalysisResult::error("Server exception before Pangram analysis");
                }

                ProcessUrlResponse {
                    hyperbrowser_result: extraction,
                    pangram_analysis: analysis,
                    overall_status: OVERALL_SERVER_EXCEPTION.to_string(),
                    error_message: Some(e.to_string()),
                }
            }
        }
    }

    async fn run(
        &self,
        keys: ApiKeys,
        request: &ProcessUrlRequest,
        extraction: &mut ExtractionResult,
        analysis: &mut AnalysisResult,
    ) -> Result<(), ProcessError> {
        let prompt = build_extraction_prompt(request);
        log::info!(
            "Constructed HyperBrowser prompt: {}",
            loggable_prompt(request)
        );

        let params = StartExtractJobParams {
            urls: vec![request.url.to_string()],
            prompt,
            schema: extraction_schema(),
        };

        let extractor = self.extractor.clone();
        let hyperbrowser_key = keys.hyperbrowser;
        let job = web::block(move || extractor.start_and_wait(&hyperbrowser_key, &params))
            .await
            .map_err(|source| ProcessError::Worker {
                stage: "HyperBrowser",
                source,
            })?;

        *extraction = match job {
            Ok(job) => {
                log::info!("HyperBrowser job finished with status {}", job.status);
                interpret_extract_job(&job)
            }
            Err(e) => {
                log::error!("Error during HyperBrowser interaction: {:?}", e);
                ExtractionResult::error(format!("{:#}", e))
            }
        };

        let text = match extraction.usable_text() {
            Some(text) => text.to_string(),
            None => {
                log::info!("Skipping Pangram analysis as no text was extracted");
                *analysis = AnalysisResult::skipped();
                return Ok(());
            }
        };

        log::info!(
            "Proceeding to Pangram analysis with extracted text (length: {})",
            text.len()
        );

        let classifier = self.classifier.clone();
        let pangram_key = keys.pangram;
        let prediction = web::block(move || {
            classifier
                .predict(&pangram_key, &text)
                .and_then(parse_prediction)
        })
        .await
        .map_err(|source| ProcessError::Worker {
            stage: "Pangram",
            source,
        })?;

        *analysis = match prediction {
            Ok(p) => {
                log::info!(
                    "Pangram analysis successful: prediction {:?}, likelihood {:?}",
                    p.prediction,
                    p.ai_likelihood
                );
                AnalysisResult::success(p.prediction, p.ai_likelihood)
            }
            Err(e) => {
                log::error!("Error during Pangram analysis: {:?}", e);
                AnalysisResult::error(format!("{:#}", e))
            }
        };

        Ok(())
    }
}
