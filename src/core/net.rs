// src/core/net.rs
// Outbound HTTP: GET only, one request at a time, bounded by a timeout.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{
    ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderValue, REFERER, USER_AGENT,
};

use crate::config::consts::ACCEPT_LANGUAGE_VALUE;
use crate::config::options::ScrapeOptions;
use crate::error::{Result, ScrapeError};

/// Anything that can turn a URL into a page body.
///
/// The orchestrator only talks to this trait; tests plug in fixture pages.
/// `Sync` so one fetcher can serve parallel per-jurisdiction runs.
pub trait Fetch: Sync {
    fn get(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(opts: &ScrapeOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&opts.user_agent)?);
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(REFERER, header_value(&format!("{}/", opts.base_url.trim_end_matches('/')))?);

        let client = Client::builder()
            .timeout(opts.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ScrapeError::Config(format!("failed to build http client: {e}")))?;

        Ok(Self { client, timeout: opts.timeout })
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<String> {
        logd!("GET {url}");
        let resp = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                ScrapeError::fetch(url, format!("timed out after {:?}", self.timeout))
            } else {
                ScrapeError::fetch(url, e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::fetch(url, format!("HTTP {status}")));
        }
        resp.text()
            .map_err(|e| ScrapeError::fetch(url, format!("failed reading body: {e}")))
    }
}

fn header_value(v: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(v).map_err(|_| ScrapeError::Config(format!("invalid header value: {v:?}")))
}

/// Resolve a link against the page it was found on (RFC 3986 reference
/// resolution). `None` when either side is not a usable URL.
pub fn absolute_url(page_url: &str, href: &str) -> Option<String> {
    let base = Url::parse(page_url).ok()?;
    base.join(href.trim()).ok().map(String::from)
}
