#![forbid(unsafe_code)]

//! Page transport. One blocking GET per watch page, no retries.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};

pub const DEFAULT_USER_AGENT: &str = concat!("ytstats-collector/", env!("CARGO_PKG_VERSION"));

/// Anything that can turn a URL into a page body. Errors mean the page was
/// unreachable; the collector skips the video.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain HTTP GET via `ureq`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// `timeout = None` leaves requests unbounded, matching a plain browser
    /// fetch.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT, None)
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let response = self.agent.get(url).call().map_err(|err| match err {
            ureq::Error::Status(code, _) => anyhow!("{url} answered HTTP {code}"),
            ureq::Error::Transport(transport) => anyhow!("fetching {url}: {transport}"),
        })?;
        if response.status() != 200 {
            bail!("{url} answered HTTP {}", response.status());
        }
        response
            .into_string()
            .with_context(|| format!("reading body of {url}"))
    }
}
