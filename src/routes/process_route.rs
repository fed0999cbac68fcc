use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::StatusCode,
    post, web, HttpRequest, HttpResponse, ResponseError,
};
use serde_json::json;

use crate::{
    configuration::Settings,
    domain::ProcessUrlRequest,
    services::{ApiKeys, ProcessError, UrlProcessor},
};

impl ResponseError for ProcessError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.to_string() }))
    }
}

/// Body errors (bad JSON, missing fields, malformed URL) answer 422.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::warn!("Rejected request body: {}", err);
    let response = HttpResponse::UnprocessableEntity().json(json!({ "detail": err.to_string() }));
    InternalError::from_response(err, response).into()
}

#[post("/process-url")]
pub async fn process_url(
    body: web::Json<ProcessUrlRequest>,
    settings: web::Data<Settings>,
    processor: web::Data<UrlProcessor>,
) -> Result<HttpResponse, ProcessError> {
    let request = body.into_inner();

    log::info!("Received request for URL: {}", request.url);
    log::info!(
        "Target object description: {}",
        request.target_object_description
    );
    if let Some(username) = &request.username {
        log::info!("Username provided: {}", username);
    }

    let keys = ApiKeys::require(&settings).inspect_err(|e| log::error!("{}", e))?;

    let response = processor.process(keys, &request).await;

    Ok(HttpResponse::Ok().json(response))
}
