use std::io::Write;
use std::time::Duration;

use clipgrade::collaborator::{FileState, MediaHandle, VideoModel};
use clipgrade::config::{GeminiConfig, GraderConfig, PollConfig};
use clipgrade::gemini::GeminiClient;
use clipgrade::{GradeError, Grader, Tier};
use serde_json::json;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gemini_config(server: &MockServer) -> GeminiConfig {
    GeminiConfig::default()
        .with_api_key("test-key")
        .with_base_url(server.uri())
}

fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::new(&gemini_config(server)).expect("client")
}

fn video_file() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
    file.write_all(b"\x00\x00\x00\x18ftypmp42").unwrap();
    file
}

fn handle() -> MediaHandle {
    MediaHandle {
        name: "files/abc123".to_string(),
        uri: "https://generativelanguage.googleapis.com/v1beta/files/abc123".to_string(),
        mime_type: "video/mp4".to_string(),
    }
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    }))
}

async fn mount_upload(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .and(header("x-goog-api-key", "test-key"))
        .and(header("x-goog-upload-protocol", "resumable"))
        .and(header("x-goog-upload-command", "start"))
        .and(header("x-goog-upload-header-content-type", "video/mp4"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-goog-upload-url", format!("{}/upload-session/1", server.uri()).as_str()),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/upload-session/1"))
        .and(header("x-goog-upload-offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": {
                "name": "files/abc123",
                "uri": "https://generativelanguage.googleapis.com/v1beta/files/abc123",
                "mimeType": "video/mp4",
                "state": "PROCESSING"
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn upload_uses_resumable_protocol() {
    let server = MockServer::start().await;
    mount_upload(&server).await;

    let file = video_file();
    let handle = client(&server).upload(file.path()).await.expect("upload");

    assert_eq!(handle.name, "files/abc123");
    assert_eq!(handle.mime_type, "video/mp4");
    assert!(handle.uri.ends_with("/files/abc123"));
}

#[tokio::test]
async fn slow_upload_transfer_outlasts_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-goog-upload-url", format!("{}/upload-session/1", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload-session/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(1500))
                .set_body_json(json!({
                    "file": { "name": "files/big", "uri": "https://example.invalid/files/big" }
                })),
        )
        .mount(&server)
        .await;

    let config = GeminiConfig {
        request_timeout_secs: 1,
        upload_timeout_secs: 10,
        ..gemini_config(&server)
    };
    let file = video_file();
    let handle = GeminiClient::new(&config)
        .unwrap()
        .upload(file.path())
        .await
        .expect("upload should use the transfer timeout");
    assert_eq!(handle.name, "files/big");
    assert_eq!(handle.mime_type, "video/mp4");
}

#[tokio::test]
async fn rejected_upload_is_upload_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&server)
        .await;

    let file = video_file();
    let err = client(&server).upload(file.path()).await.unwrap_err();
    match err {
        GradeError::UploadFailed { message, .. } => assert!(message.contains("400")),
        other => panic!("expected UploadFailed, got {other}"),
    }
}

#[tokio::test]
async fn file_state_reads_state_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc123"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "files/abc123",
            "state": "ACTIVE"
        })))
        .mount(&server)
        .await;

    let state = client(&server).file_state(&handle()).await.unwrap();
    assert_eq!(state, FileState::Active);
}

#[tokio::test]
async fn generate_sends_file_and_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{
                "parts": [
                    { "file_data": { "mime_type": "video/mp4", "file_uri": handle().uri } },
                    { "text": "rate this" }
                ]
            }]
        })))
        .respond_with(text_response("```json\n{\"summary\": \"ok\"}\n```"))
        .expect(1)
        .mount(&server)
        .await;

    let text = client(&server)
        .generate("gemini-2.5-flash", &handle(), "rate this")
        .await
        .unwrap();
    assert_eq!(text, "```json\n{\"summary\": \"ok\"}\n```");
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .generate("gemini-2.5-flash", &handle(), "rate this")
        .await
        .unwrap_err();
    assert!(matches!(err, GradeError::ModelInvocation { .. }));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn grades_video_end_to_end() {
    let server = MockServer::start().await;
    mount_upload(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "files/abc123", "state": "PROCESSING"
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "files/abc123", "state": "ACTIVE"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(body_string_contains("quality evaluation agent"))
        .respond_with(text_response(
            r#"{"summary": "Useful", "scores": {"hook": 0.6, "retention": 0.6, "clarity": 0.6,
                "usefulness_originality": 0.6, "audience_specific_value": 0.6, "engagement": 0.6}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(body_string_contains("compliance agent"))
        .respond_with(text_response(
            r#"{"regulatory_flags": "", "critical_violation": false, "compliance_risk": 0.0}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = GraderConfig {
        gemini: gemini_config(&server),
        polling: PollConfig {
            interval_ms: 5,
            timeout_secs: 10,
        },
        ..Default::default()
    };
    let grader = Grader::new(GeminiClient::new(&config.gemini).unwrap(), config);
    let file = video_file();

    let report = grader.grade(file.path()).await.expect("graded");
    assert_eq!(report.model, "gemini-2.5-flash");
    assert_eq!(report.compliance.regulatory_flags, "none");
    assert_eq!(report.calculation.overall, 60.0);
    assert_eq!(report.calculation.tier, Tier::Medium);
    // ((60 - 40) / 60)^2 = 0.111
    assert_eq!(report.payout.payout, 0.11);
}
