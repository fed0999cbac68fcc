use serde_json::{json, Value};

use crate::helpers::{
    spawn_app, ExtractorBehavior, FakeClassifier, FakeExtractor, TestKeys,
};

fn headline_request() -> Value {
    json!({
        "url": "https://example.com",
        "target_object_description": "the main headline"
    })
}

#[tokio::test]
async fn both_services_succeed() {
    let app = spawn_app(
        TestKeys::both(),
        FakeExtractor::returning_text("Example Headline"),
        FakeClassifier::human(),
    )
    .await;

    let response = app.post_process_url(&headline_request()).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["overall_status"], "success");
    assert_eq!(body["hyperbrowser_result"]["status"], "success");
    assert_eq!(
        body["hyperbrowser_result"]["extracted_text"],
        "Example Headline"
    );
    assert_eq!(body["pangram_analysis"]["prediction"], "Human");
    assert_eq!(body["pangram_analysis"]["ai_likelihood"], 0.12);
    assert_eq!(body["pangram_analysis"]["error_message"], Value::Null);
    assert_eq!(body["error_message"], Value::Null);

    assert_eq!(app.extractor.call_count(), 1);
    assert_eq!(app.classifier.call_count(), 1);
    assert_eq!(
        app.classifier.last_text.lock().unwrap().as_deref(),
        Some("Example Headline")
    );
}

#[tokio::test]
async fn api_prefixed_path_is_also_served() {
    let app = spawn_app(
        TestKeys::both(),
        FakeExtractor::returning_text("Example Headline"),
        FakeClassifier::human(),
    )
    .await;

    let response = app
        .client
        .post(app.url("/api/process-url"))
        .json(&headline_request())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["overall_status"], "success");
}

#[tokio::test]
async fn extractor_receives_url_prompt_and_schema() {
    let app = spawn_app(
        TestKeys::both(),
        FakeExtractor::returning_text("Example Headline"),
        FakeClassifier::human(),
    )
    .await;

    app.post_process_url(&json!({
        "url": "https://example.com/login",
        "target_object_description": "the account balance",
        "username": "alice",
        "password": "hunter2"
    }))
    .await;

    let params = app.extractor.last_params.lock().unwrap().clone().unwrap();
    assert_eq!(params.urls, vec!["https://example.com/login".to_string()]);
    assert!(params
        .prompt
        .contains("Use username 'alice'. The password is 'hunter2'."));
    assert_eq!(params.schema["required"], json!(["extracted_text"]));
}

#[tokio::test]
async fn failed_extraction_skips_analysis() {
    let app = spawn_app(
        TestKeys::both(),
        FakeExtractor::returning_job("failed", None, Some("page blocked")),
        FakeClassifier::human(),
    )
    .await;

    let response = app.post_process_url(&headline_request()).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["overall_status"]
        .as_str()
        .unwrap()
        .starts_with("error_hyperbrowser_"));
    assert_eq!(body["hyperbrowser_result"]["status"], "error");
    assert_eq!(body["hyperbrowser_result"]["error_message"], "page blocked");
    assert_eq!(body["pangram_analysis"]["prediction"], "Skipped");
    assert_eq!(
        body["pangram_analysis"]["error_message"],
        "No text from HyperBrowser"
    );
    assert_eq!(app.classifier.call_count(), 0);
}

#[tokio::test]
async fn extractor_transport_error_is_captured() {
    let app = spawn_app(
        TestKeys::both(),
        FakeExtractor::with(ExtractorBehavior::Fail("connection refused".to_string())),
        FakeClassifier::human(),
    )
    .await;

    let response = app.post_process_url(&headline_request()).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["overall_status"], "error_hyperbrowser_error");
    assert_eq!(
        body["hyperbrowser_result"]["error_message"],
        "connection refused"
    );
    assert_eq!(body["pangram_analysis"]["prediction"], "Skipped");
}

#[tokio::test]
async fn blank_text_is_never_a_success() {
    let app = spawn_app(
        TestKeys::both(),
        FakeExtractor::returning_text("   "),
        FakeClassifier::human(),
    )
    .await;

    let response = app.post_process_url(&headline_request()).await;

    let body: Value = response.json().await.unwrap();
    assert_ne!(body["overall_status"], "success");
    assert!(body["overall_status"]
        .as_str()
        .unwrap()
        .starts_with("error_hyperbrowser_"));
    assert_eq!(body["pangram_analysis"]["prediction"], "Skipped");
    assert_eq!(app.classifier.call_count(), 0);
}

#[tokio::test]
async fn unparseable_data_is_reported_not_crashed() {
    let app = spawn_app(
        TestKeys::both(),
        FakeExtractor::returning_job("completed", Some(json!({"headline": 42})), None),
        FakeClassifier::human(),
    )
    .await;

    let response = app.post_process_url(&headline_request()).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["overall_status"], "error_hyperbrowser_error");
    assert!(body["hyperbrowser_result"]["error_message"]
        .as_str()
        .unwrap()
        .starts_with("Data parsing error:"));
}

#[tokio::test]
async fn classifier_error_is_reported() {
    let app = spawn_app(
        TestKeys::both(),
        FakeExtractor::returning_text("Example Headline"),
        FakeClassifier::failing("quota exceeded"),
    )
    .await;

    let response = app.post_process_url(&headline_request()).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["overall_status"], "error_pangram_analysis");
    assert_eq!(body["hyperbrowser_result"]["status"], "success");
    assert_eq!(body["pangram_analysis"]["prediction"], "Error");
    assert_eq!(body["pangram_analysis"]["error_message"], "quota exceeded");
}

#[tokio::test]
async fn crashed_worker_becomes_server_exception() {
    let app = spawn_app(
        TestKeys::both(),
        FakeExtractor::with(ExtractorBehavior::Panic),
        FakeClassifier::human(),
    )
    .await;

    let response = app.post_process_url(&headline_request()).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["overall_status"], "error_server_exception");
    assert!(body["error_message"].is_string());
    assert_eq!(body["hyperbrowser_result"]["status"], "error");
    assert_eq!(body["pangram_analysis"]["prediction"], "Error");
    assert_eq!(
        body["pangram_analysis"]["error_message"],
        "Server exception before Pangram analysis"
    );
    assert_eq!(app.classifier.call_count(), 0);
}

#[tokio::test]
async fn missing_api_keys_answer_500_without_calls() {
    let cases = [
        (
            TestKeys {
                hyperbrowser: None,
                pangram: Some("pg-test-key".to_string()),
            },
            "HyperBrowser API key is not configured.",
        ),
        (
            TestKeys {
                hyperbrowser: Some("hb-test-key".to_string()),
                pangram: None,
            },
            "Pangram API key is not configured.",
        ),
    ];

    for (keys, detail) in cases {
        let app = spawn_app(
            keys,
            FakeExtractor::returning_text("Example Headline"),
            FakeClassifier::human(),
        )
        .await;

        let response = app.post_process_url(&headline_request()).await;

        assert_eq!(response.status().as_u16(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["detail"], detail);
        assert_eq!(app.extractor.call_count(), 0);
        assert_eq!(app.classifier.call_count(), 0);
    }
}

#[tokio::test]
async fn invalid_bodies_answer_422_without_calls() {
    let app = spawn_app(
        TestKeys::both(),
        FakeExtractor::returning_text("Example Headline"),
        FakeClassifier::human(),
    )
    .await;

    let cases = [
        (
            json!({"url": "not a url", "target_object_description": "headline"}),
            "malformed url",
        ),
        (
            json!({"url": "ftp://example.com", "target_object_description": "headline"}),
            "non-http url",
        ),
        (json!({"url": "https://example.com"}), "missing description"),
        (
            json!({"target_object_description": "headline"}),
            "missing url",
        ),
    ];

    for (body, description) in cases {
        let response = app.post_process_url(&body).await;

        assert_eq!(
            response.status().as_u16(),
            422,
            "The API did not reject the body: {}",
            description
        );
    }

    assert_eq!(app.extractor.call_count(), 0);
    assert_eq!(app.classifier.call_count(), 0);
}
