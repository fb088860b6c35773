//! reqwest-backed fragment fetcher.

use async_trait::async_trait;
use reqwest::Client;

use crate::{FetchError, FetchedFragment, FragmentFetcher, FRAGMENT_HEADER, MAX_FRAGMENT_BYTES};

const USER_AGENT: &str = concat!("stitch/", env!("CARGO_PKG_VERSION"));

/// HTTP fragment fetcher.
///
/// One shared connection pool serves all producer workers.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    endpoint: String,
}

impl HttpFetcher {
    /// Build a fetcher for the given endpoint.
    ///
    /// # Errors
    ///
    /// [`FetchError::Transport`] when the client cannot be constructed.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The endpoint fragments are requested from.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl FragmentFetcher for HttpFetcher {
    async fn fetch(&self, image: u8, part: u32) -> Result<FetchedFragment, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("img", u32::from(image)), ("part", part)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
            });
        }

        // The header map is fully parsed by the client; no prefix scanning
        // of the raw header block.
        let sequence = response
            .headers()
            .get(FRAGMENT_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|text| text.trim().parse::<u32>().ok())
            .ok_or(FetchError::MissingSequence)?;

        let body = response.bytes().await?;
        if body.len() > MAX_FRAGMENT_BYTES {
            return Err(FetchError::BodyTooLarge {
                len: body.len(),
                max: MAX_FRAGMENT_BYTES,
            });
        }

        Ok(FetchedFragment { sequence, body })
    }
}
