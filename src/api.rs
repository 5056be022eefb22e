use reqwest::{Client, Proxy, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Default GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Releases fetched per project.
pub const DEFAULT_PER_PAGE: u32 = 30;

const USER_AGENT: &str = concat!("brewgen/", env!("CARGO_PKG_VERSION"));

// ──────────────────────────────────────────────────────────────────────────────
// Response types
// ──────────────────────────────────────────────────────────────────────────────

/// Subset of `GET /repos/{repo}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoInfo {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub license: Option<LicenseInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LicenseInfo {
    #[serde(default)]
    pub spdx_id: Option<String>,
}

/// A release as listed by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<GithubAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubAsset {
    pub name: String,
    pub browser_download_url: String,
}

// ──────────────────────────────────────────────────────────────────────────────
// ReleaseApi
// ──────────────────────────────────────────────────────────────────────────────

/// Read-only client for the GitHub releases API.
///
/// # Example
/// ```rust,no_run
/// use brewgen::ReleaseApi;
///
/// #[tokio::main]
/// async fn main() {
///     let api = ReleaseApi::new().set_token("ghp_example");
///     let releases = api.releases("owner/repo").await.unwrap();
///     println!("{} releases", releases.len());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ReleaseApi {
    base_url: String,
    token: Option<String>,
    per_page: u32,
    proxy: Option<String>,
}

impl ReleaseApi {
    /// Create a client for api.github.com.
    ///
    /// The token defaults to `GITHUB_TOKEN` and the proxy to `HTTP_PROXY` /
    /// `HTTPS_PROXY`.
    pub fn new() -> Self {
        let token = std::env::var("GITHUB_TOKEN").ok().filter(|s| !s.is_empty());
        let proxy = std::env::var("HTTP_PROXY")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| std::env::var("HTTPS_PROXY").ok().filter(|s| !s.is_empty()));

        Self {
            base_url: DEFAULT_API_URL.to_owned(),
            token,
            per_page: DEFAULT_PER_PAGE,
            proxy,
        }
    }

    /// Point the client at another API root (builder).
    pub fn set_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_owned();
        self
    }

    /// Authenticate with a static bearer token (builder).
    pub fn set_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_owned()).filter(|t| !t.is_empty());
        self
    }

    /// Number of releases requested from the list endpoint (builder).
    pub fn set_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Set an explicit HTTP/HTTPS proxy URL (builder).
    pub fn set_proxy(mut self, proxy: &str) -> Self {
        self.proxy = Some(proxy.to_owned());
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Build an HTTP client, optionally with proxy support.
    pub(crate) fn build_client(&self) -> Result<Client> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(Proxy::all(proxy_url)?);
        }
        Ok(builder.build()?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, "GitHub API request");

        let client = self.build_client()?;
        let request = client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        let resp = self.authorize(request).send().await?;

        let resp = check_status(resp, endpoint)?;
        Ok(resp.json().await?)
    }

    /// Repository metadata (`GET /repos/{repo}`).
    pub async fn repo(&self, repo: &str) -> Result<RepoInfo> {
        self.get_json(&format!("repos/{repo}")).await
    }

    /// The release GitHub marks as latest (`GET /repos/{repo}/releases/latest`).
    pub async fn latest_release(&self, repo: &str) -> Result<GithubRelease> {
        self.get_json(&format!("repos/{repo}/releases/latest")).await
    }

    /// One page of releases, newest first (`GET /repos/{repo}/releases`).
    pub async fn releases(&self, repo: &str) -> Result<Vec<GithubRelease>> {
        self.get_json(&format!("repos/{repo}/releases?per_page={}", self.per_page))
            .await
    }

    /// Start a binary download of `url`. Public asset URLs need no token.
    pub(crate) async fn download(&self, client: &Client, url: &str) -> Result<Response> {
        let resp = client
            .get(url)
            .header("Accept", "application/octet-stream")
            .send()
            .await?;
        check_status(resp, url)
    }
}

impl Default for ReleaseApi {
    fn default() -> Self {
        Self::new()
    }
}

fn check_status(resp: Response, endpoint: &str) -> Result<Response> {
    match resp.status() {
        StatusCode::NOT_FOUND => Err(Error::NotFound(endpoint.to_owned())),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimited),
        _ => Ok(resp.error_for_status()?),
    }
}
