//! Mock HTTP fragment server.
//!
//! Wraps wiremock with the strip server's contract: fragments are served
//! from `GET /image?img=N&part=K` with the sequence number announced in the
//! `X-Ece252-Fragment` response header.

use stitch_fetch::FRAGMENT_HEADER;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mock strip server for exercising the HTTP fetcher end to end.
pub struct MockFragmentServer {
    server: MockServer,
}

impl MockFragmentServer {
    /// Start a new mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// The fragment endpoint to hand to a fetcher.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/image", self.server.uri())
    }

    /// The underlying wiremock server for advanced configuration.
    #[must_use]
    pub const fn inner(&self) -> &MockServer {
        &self.server
    }

    /// Serve `body` for one fragment, announcing `sequence` in the header.
    pub async fn serve_fragment(&self, image: u8, part: u32, sequence: u32, body: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path("/image"))
            .and(query_param("img", image.to_string()))
            .and(query_param("part", part.to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(FRAGMENT_HEADER, sequence.to_string().as_str())
                    .set_body_bytes(body),
            )
            .mount(&self.server)
            .await;
    }

    /// Serve every strip of an image, parts `0..bodies.len()`.
    pub async fn serve_image(&self, image: u8, bodies: Vec<Vec<u8>>) {
        for (part, body) in bodies.into_iter().enumerate() {
            let part = u32::try_from(part).expect("strip count fits u32");
            self.serve_fragment(image, part, part, body).await;
        }
    }

    /// Answer one fragment with an HTTP error status.
    pub async fn serve_error(&self, image: u8, part: u32, status: u16) {
        Mock::given(method("GET"))
            .and(path("/image"))
            .and(query_param("img", image.to_string()))
            .and(query_param("part", part.to_string()))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Serve a body without the sequence header.
    pub async fn serve_headerless(&self, image: u8, part: u32, body: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path("/image"))
            .and(query_param("img", image.to_string()))
            .and(query_param("part", part.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&self.server)
            .await;
    }
}
