use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use tracker_core::StatusTag;
use tracker_engine::{
    AnalysisBackend, BackendSettings, FailureKind, ReqwestBackend, SubmissionDescriptor,
    SubmissionError, SubmissionGateway,
};
use url::Url;
use wiremock::matchers::{body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> ReqwestBackend {
    let base_url = Url::parse(&server.uri()).unwrap();
    ReqwestBackend::new(BackendSettings::new(base_url)).unwrap()
}

fn pdf() -> SubmissionDescriptor {
    SubmissionDescriptor::file("report.pdf", b"%PDF-1.7 test".to_vec())
}

#[tokio::test]
async fn uploads_file_as_multipart_and_reads_process_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"file\"; filename=\"report.pdf\""))
        .and(body_string_contains("application/pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "process_id": "p-77"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = backend_for(&server).create_job(&pdf()).await.unwrap();
    assert!(response.succeeded());
    assert_eq!(response.process_id.as_deref(), Some("p-77"));
}

#[tokio::test]
async fn url_submission_sends_trimmed_url_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("name=\"url\""))
        .and(body_string_contains("https://example.com/annual.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "process_id": 12})),
        )
        .mount(&server)
        .await;

    let gateway = SubmissionGateway::new(Arc::new(backend_for(&server)));
    let handle = gateway
        .submit(&SubmissionDescriptor::url("  https://example.com/annual.pdf  "))
        .await
        .unwrap();
    assert_eq!(handle.job_id, "12");
    assert_eq!(handle.source_label, "https://example.com/annual.pdf");
}

#[tokio::test]
async fn status_decodes_numeric_document_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status/p-77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "progress": 100,
            "message": "Done",
            "document_id": 4711
        })))
        .mount(&server)
        .await;

    let report = backend_for(&server)
        .job_status("p-77")
        .await
        .unwrap()
        .into_report();
    assert_eq!(report.status, StatusTag::Completed);
    assert_eq!(report.document_id.as_deref(), Some("4711"));
    assert_eq!(report.message.as_deref(), Some("Done"));
}

#[tokio::test]
async fn job_ids_are_percent_encoded_into_one_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "queued"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = backend_for(&server).job_status("a/b").await.unwrap();
    assert_eq!(response.status, "queued");
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/app/api/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let base_url = Url::parse(&format!("{}/app/", server.uri())).unwrap();
    let backend = ReqwestBackend::new(BackendSettings::new(base_url)).unwrap();
    assert!(backend.recent_analyses().await.unwrap().is_empty());
}

#[tokio::test]
async fn http_errors_carry_the_status_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status/p-1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = backend_for(&server).job_status("p-1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn malformed_json_is_an_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status/p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = backend_for(&server).job_status("p-1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidResponse);
}

#[tokio::test]
async fn recent_list_accepts_loose_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 3,
                "company": "Acme Corp",
                "industry": "Manufacturing",
                "metrics": null,
                "date": "2024-03-02 10:15:00"
            },
            {
                "id": "9",
                "company": "Globex",
                "industry": "Energy",
                "metrics": "Revenue up 4%",
                "date": "2024-03-01T08:00:00Z"
            }
        ])))
        .mount(&server)
        .await;

    let entries = backend_for(&server).recent_analyses().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, "3");
    assert_eq!(entries[0].title, "Acme Corp");
    assert_eq!(entries[0].metrics_summary, "");
    assert_eq!(entries[1].metrics_summary, "Revenue up 4%");
    assert!(entries[0].timestamp > entries[1].timestamp);
}

#[tokio::test]
async fn gateway_maps_failures_to_submission_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Could not read PDF"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&server)
        .await;

    let gateway = SubmissionGateway::new(Arc::new(backend_for(&server)));

    let err = gateway.submit(&pdf()).await.unwrap_err();
    assert_eq!(err, SubmissionError::Protocol("Could not read PDF".to_string()));

    let err = gateway.submit(&pdf()).await.unwrap_err();
    assert_eq!(err.to_string(), "Upload failed: no job id returned");

    let err = gateway.submit(&pdf()).await.unwrap_err();
    assert!(matches!(
        err,
        SubmissionError::Transport {
            status: Some(413),
            ..
        }
    ));
    assert_eq!(err.to_string(), "Upload failed (HTTP 413)");
}

#[tokio::test]
async fn validation_failures_send_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = SubmissionGateway::new(Arc::new(backend_for(&server)));
    let err = gateway
        .submit(&SubmissionDescriptor::file("scan.png", b"png".to_vec()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Please select a PDF file");
}

#[tokio::test]
async fn unreachable_backend_is_a_network_failure() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    drop(server);

    let backend = ReqwestBackend::new(BackendSettings::new(base_url)).unwrap();
    let err = backend.job_status("p-1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
}
