//! Forwarding of SABnzbd post-processing callbacks to the media manager.
//!
//! SABnzbd invokes its post-processing script with positional arguments:
//! the job directory first, the release name second and the job status
//! seventh. Only those three are forwarded.

use anyhow::Context;
use tracing::{debug, info};
use url::Url;

use marquee_config::PostProcessConfig;

pub const NO_FOLDER_MESSAGE: &str =
    "No folder supplied - is this being called from SABnzbd?";

/// Endpoint path relative to the configured base URL.
pub const PROCESS_EPISODE_PATH: &str = "home/postprocess/processEpisode";

const STATUS_ARG_INDEX: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostProcessRequest {
    pub dir: String,
    pub nzb_name: Option<String>,
    pub status: Option<String>,
}

impl PostProcessRequest {
    /// Map positional arguments (program name excluded). `None` when no
    /// folder was supplied.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Option<Self> {
        let dir = args.first()?.as_ref().to_string();
        let nzb_name = args.get(1).map(|name| name.as_ref().to_string());
        let status = args
            .get(STATUS_ARG_INDEX)
            .map(|status| status.as_ref().to_string());

        Some(Self {
            dir,
            nzb_name,
            status,
        })
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![("quiet", "1"), ("dir", self.dir.as_str())];
        if let Some(name) = &self.nzb_name {
            pairs.push(("nzbName", name.as_str()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.as_str()));
        }
        pairs
    }

    /// Send the request and return the response body.
    pub async fn forward(
        &self,
        config: &PostProcessConfig,
    ) -> anyhow::Result<String> {
        let url = endpoint(&config.url).with_context(|| {
            format!("invalid post-processing base URL {}", config.url)
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;

        let mut request = client.get(url.clone()).query(&self.query_pairs());
        if let Some((user, pass)) = config.credentials() {
            request = request.basic_auth(user, Some(pass));
        }

        info!(url = %url, dir = %self.dir, "forwarding post-processing request");
        let response = request
            .send()
            .await
            .with_context(|| format!("unable to reach {url}"))?;

        let status = response.status();
        debug!(status = %status, "post-processing response received");
        if !status.is_success() {
            anyhow::bail!("{url} answered with HTTP {status}");
        }

        response
            .text()
            .await
            .context("failed to read post-processing response")
    }
}

/// `<base>/home/postprocess/processEpisode`, keeping any base path prefix.
pub fn endpoint(base: &Url) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(PROCESS_EPISODE_PATH)
}
