//! HTTP fetcher tests against a mock fragment server.

use stitch_fetch::{FetchError, FragmentFetcher, HttpFetcher, MAX_FRAGMENT_BYTES};
use stitch_testkit::{strip_png, MockFragmentServer};

#[tokio::test]
async fn fetches_body_and_announced_sequence() {
    let server = MockFragmentServer::start().await;
    let body = strip_png(4, 2, [9, 9, 9, 255]);
    server.serve_fragment(1, 3, 3, body.clone()).await;

    let fetcher = HttpFetcher::new(server.endpoint()).unwrap();
    let fragment = fetcher.fetch(1, 3).await.unwrap();

    assert_eq!(fragment.sequence, 3);
    assert_eq!(&fragment.body[..], &body[..]);
}

#[tokio::test]
async fn sequence_can_disagree_with_the_requested_part() {
    let server = MockFragmentServer::start().await;
    server.serve_fragment(1, 4, 7, b"body".to_vec()).await;

    let fetcher = HttpFetcher::new(server.endpoint()).unwrap();
    let fragment = fetcher.fetch(1, 4).await.unwrap();

    // The fetcher reports what the server claims; the caller arbitrates.
    assert_eq!(fragment.sequence, 7);
}

#[tokio::test]
async fn missing_sequence_header_is_an_error() {
    let server = MockFragmentServer::start().await;
    server.serve_headerless(1, 0, b"body".to_vec()).await;

    let fetcher = HttpFetcher::new(server.endpoint()).unwrap();
    assert!(matches!(
        fetcher.fetch(1, 0).await.unwrap_err(),
        FetchError::MissingSequence
    ));
}

#[tokio::test]
async fn error_status_is_surfaced() {
    let server = MockFragmentServer::start().await;
    server.serve_error(1, 0, 503).await;

    let fetcher = HttpFetcher::new(server.endpoint()).unwrap();
    assert!(matches!(
        fetcher.fetch(1, 0).await.unwrap_err(),
        FetchError::Status { code: 503 }
    ));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockFragmentServer::start().await;
    server
        .serve_fragment(1, 0, 0, vec![0u8; MAX_FRAGMENT_BYTES + 1])
        .await;

    let fetcher = HttpFetcher::new(server.endpoint()).unwrap();
    assert!(matches!(
        fetcher.fetch(1, 0).await.unwrap_err(),
        FetchError::BodyTooLarge { .. }
    ));
}
