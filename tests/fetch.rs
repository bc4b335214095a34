//! `HttpFetcher` against a local mock server.

use pdf2quiz::{DocumentFetcher, HttpFetcher, QuizError, Stage};
use reqwest::Url;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PDF_BYTES: &[u8] = b"%PDF-1.7\n1 0 obj\n<<>>\nendobj\n%%EOF\n";

async fn serve(route: &str, response: ResponseTemplate) -> (MockServer, Url) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(&server)
        .await;
    let url = Url::parse(&format!("{}{}", server.uri(), route)).unwrap();
    (server, url)
}

#[tokio::test]
async fn downloads_document_bytes() {
    let (_server, url) = serve("/doc.pdf", ResponseTemplate::new(200).set_body_bytes(PDF_BYTES)).await;
    let fetcher = HttpFetcher::new(5, 1024).unwrap();

    let bytes = assert_ok!(fetcher.fetch(&url).await);

    assert_eq!(bytes, PDF_BYTES);
}

#[tokio::test]
async fn non_success_status_is_a_download_failure() {
    let (_server, url) = serve("/missing.pdf", ResponseTemplate::new(404)).await;
    let fetcher = HttpFetcher::new(5, 1024).unwrap();

    let err = assert_err!(fetcher.fetch(&url).await);

    match &err {
        QuizError::DownloadFailed { reason, status, .. } => {
            assert!(reason.contains("404"), "{reason}");
            assert_eq!(*status, Some(404));
        }
        other => panic!("expected DownloadFailed, got {other:?}"),
    }
    assert_eq!(err.stage(), Stage::Fetching);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn server_errors_stay_retryable() {
    let (_server, url) = serve("/flaky.pdf", ResponseTemplate::new(503)).await;
    let fetcher = HttpFetcher::new(5, 1024).unwrap();

    let err = assert_err!(fetcher.fetch(&url).await);

    assert!(matches!(err, QuizError::DownloadFailed { status: Some(503), .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn oversized_document_is_rejected() {
    let body = vec![b'x'; 4096];
    let (_server, url) = serve("/big.pdf", ResponseTemplate::new(200).set_body_bytes(body)).await;
    let fetcher = HttpFetcher::new(5, 1024).unwrap();

    let err = assert_err!(fetcher.fetch(&url).await);

    assert!(matches!(err, QuizError::DocumentTooLarge { limit: 1024, .. }));
}

#[tokio::test]
async fn body_exactly_at_the_limit_is_accepted() {
    let (_server, url) = serve("/doc.pdf", ResponseTemplate::new(200).set_body_bytes(PDF_BYTES)).await;
    let fetcher = HttpFetcher::new(5, PDF_BYTES.len() as u64).unwrap();

    assert_ok!(fetcher.fetch(&url).await);
}

#[tokio::test]
async fn slow_server_times_out() {
    let (_server, url) = serve(
        "/slow.pdf",
        ResponseTemplate::new(200)
            .set_body_bytes(PDF_BYTES)
            .set_delay(Duration::from_secs(3)),
    )
    .await;
    let fetcher = HttpFetcher::new(1, 1024).unwrap();

    let err = assert_err!(fetcher.fetch(&url).await);

    assert!(matches!(err, QuizError::DownloadTimeout { secs: 1, .. }), "{err:?}");
    assert!(err.is_retryable());
}
