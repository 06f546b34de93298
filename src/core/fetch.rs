use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("HTTP status {0}")]
    Status(u16),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// The page-fetch collaborator every adapter and the series expansion in
/// the link resolver go through. Kept as a trait so the whole pipeline
/// runs against canned documents in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;

    /// Form-encoded POST, needed by sources that resolve their players
    /// through an AJAX endpoint.
    async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<String, FetchError>;
}

enum Payload<'a> {
    Get,
    Form(&'a [(&'a str, &'a str)]),
}

/// reqwest-backed fetcher with bounded retry and a politeness delay.
///
/// The random inter-request sleep is a rate limit owed to the source
/// sites, not an optimization knob; keep `politeness_min_ms` above zero
/// in anything that touches the network.
pub struct HttpFetcher {
    client: reqwest::Client,
    retries: usize,
    politeness_min_ms: u64,
    politeness_max_ms: u64,
}

impl HttpFetcher {
    pub fn new(
        user_agent: &str,
        timeout_secs: u64,
        retries: usize,
        politeness_min_ms: u64,
        politeness_max_ms: u64,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            retries: retries.max(1),
            politeness_min_ms,
            politeness_max_ms: politeness_max_ms.max(politeness_min_ms),
        })
    }

    async fn politeness_pause(&self) {
        let millis = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.politeness_min_ms..=self.politeness_max_ms)
        };
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }

    async fn attempt(&self, url: &str, payload: &Payload<'_>) -> Result<String, FetchError> {
        let request = match payload {
            Payload::Get => self.client.get(url),
            Payload::Form(fields) => self
                .client
                .post(url)
                .header("X-Requested-With", "XMLHttpRequest")
                .form(fields),
        };
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    async fn request_with_retry(
        &self,
        url: &str,
        payload: Payload<'_>,
    ) -> Result<String, FetchError> {
        let mut last_error = FetchError::Transport("no attempts made".to_string());
        for attempt in 0..self.retries {
            self.politeness_pause().await;
            match self.attempt(url, &payload).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    warn!(url, attempt = attempt + 1, error = %err, "fetch attempt failed");
                    last_error = err;
                    if attempt + 1 < self.retries {
                        let backoff = Duration::from_millis(250 * 2u64.pow(attempt as u32));
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }
        Err(last_error)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "GET");
        self.request_with_retry(url, Payload::Get).await
    }

    async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<String, FetchError> {
        debug!(url, "POST");
        self.request_with_retry(url, Payload::Form(fields)).await
    }
}
