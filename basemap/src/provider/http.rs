//! HTTP client abstraction for testability
//!
//! The trait mirrors the two operations the engine needs: streaming a
//! tile body straight to its cache path, and a one-off probe for the
//! provider's Content-Type. Injecting the trait keeps every network
//! consumer testable with the mock below.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use reqwest::header::USER_AGENT;
use thiserror::Error;

use super::url::user_agent_for;

/// HTTP transport errors.
///
/// Every variant is absorbed at the fetch boundary; these surface only
/// from client construction.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Failed to construct the underlying client.
    #[error("failed to build HTTP client: {0}")]
    Build(String),

    /// Request failed in transport (timeout, DNS, TLS, reset).
    #[error("request failed: {0}")]
    Transport(String),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Writing the response body to disk failed.
    #[error("failed to write response body: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for HTTP operations, enabling mock clients in tests.
pub trait HttpClient: Send + Sync {
    /// GET `url` and stream the body to `dest`.
    ///
    /// On transport failure mid-body the partially written file is left
    /// in place; callers treat a zero-length file as absent.
    fn download(&self, url: &str, dest: &Path) -> Result<(), HttpError>;

    /// GET `url` and return the response Content-Type, if any.
    fn probe_content_type(&self, url: &str) -> Result<Option<String>, HttpError>;
}

/// Real HTTP client implementation using reqwest.
///
/// Deliberately impatient: tile servers answer in tens of milliseconds,
/// and a blank tile beats a stalled worker. Certificate validation stays
/// on; only the minimum TLS version is pinned.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Create a client with the given connect/total timeouts.
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .redirect(reqwest::redirect::Policy::limited(1))
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, HttpError> {
        let host = url
            .split_once("://")
            .and_then(|(_, rest)| rest.split(['/', '?']).next())
            .unwrap_or_default();

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent_for(host))
            .send()
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(HttpError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }
}

impl HttpClient for ReqwestClient {
    fn download(&self, url: &str, dest: &Path) -> Result<(), HttpError> {
        let mut response = self.get(url)?;

        let mut file = File::create(dest)?;
        response
            .copy_to(&mut file)
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        Ok(())
    }

    fn probe_content_type(&self, url: &str) -> Result<Option<String>, HttpError> {
        let response = self.get(url)?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        Ok(content_type)
    }
}
