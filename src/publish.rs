// Posting client: publishes a short text to a microblog account using a
// user-context bearer token.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::{ensure_success, REQUEST_TIMEOUT};

pub const DEFAULT_POST_URL: &str = "https://api.twitter.com/2/tweets";

/// Something that can publish a status text.
pub trait Publisher {
    fn publish(&self, text: &str) -> Result<()>;
}

#[derive(Serialize)]
struct PostRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct PostResponse {
    data: PostData,
}

#[derive(Deserialize)]
struct PostData {
    id: String,
}

/// Blocking client for the X/Twitter v2 "create post" endpoint.
pub struct MicroblogClient {
    client: Client,
    url: String,
    token: String,
}

impl MicroblogClient {
    pub fn new(url: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(MicroblogClient {
            client,
            url: url.to_string(),
            token: token.to_string(),
        })
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let val = format!("Bearer {}", self.token);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&val).context("Posting token is not valid header text")?,
        );
        Ok(headers)
    }
}

impl Publisher for MicroblogClient {
    fn publish(&self, text: &str) -> Result<()> {
        debug!(url = %self.url, chars = text.chars().count(), "publishing post");
        let res = self
            .client
            .post(&self.url)
            .headers(self.auth_headers()?)
            .json(&PostRequest { text })
            .send()
            .context("Failed to send post request")?;
        let res = ensure_success(res, "Post")?;
        let posted: PostResponse = res.json().context("Parsing post response json")?;
        info!(id = %posted.data.id, "published post");
        Ok(())
    }
}
