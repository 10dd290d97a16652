//! Chzzk live-detail API client.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;

use crate::settings::{Channel, Cookies};

pub const DEFAULT_API_BASE: &str = "https://api.chzzk.naver.com";
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Unix x86_64)";
pub const ORIGIN: &str = "https://chzzk.naver.com";

/// Headers sent both to the API and (as `--http-header`) to streamlink.
pub fn auth_header_pairs(cookies: &Cookies) -> Vec<(&'static str, String)> {
    vec![
        ("Cookie", cookies.header_value()),
        ("User-Agent", USER_AGENT.to_string()),
        ("Origin", ORIGIN.to_string()),
        ("DNT", "1".to_string()),
        ("Sec-GPC", "1".to_string()),
        ("Connection", "keep-alive".to_string()),
        ("Referer", String::new()),
    ]
}

fn auth_headers(cookies: &Cookies) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in auth_header_pairs(cookies) {
        headers.insert(
            HeaderName::from_bytes(name.as_bytes())?,
            HeaderValue::from_str(&value).with_context(|| format!("Invalid {} header", name))?,
        );
    }
    Ok(headers)
}

/// The parts of the live-detail `content` object the recorder uses.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LiveContent {
    #[serde(default)]
    pub live_title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LiveDetailResponse {
    #[serde(default)]
    content: Option<LiveContent>,
}

pub struct LiveDetailClient {
    http: reqwest::Client,
    api_base: String,
}

impl LiveDetailClient {
    pub fn new() -> Result<Self> {
        Self::with_base(DEFAULT_API_BASE)
    }

    pub fn with_base(api_base: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, channel_id: &str) -> String {
        format!(
            "{}/service/v2/channels/{}/live-detail",
            self.api_base, channel_id
        )
    }

    async fn try_fetch(&self, channel: &Channel, cookies: &Cookies) -> Result<LiveContent> {
        let resp = self
            .http
            .get(self.url(&channel.id))
            .headers(auth_headers(cookies)?)
            .send()
            .await
            .context("live-detail request failed")?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("live-detail API error ({})", status);
        }
        let body: LiveDetailResponse = resp
            .json()
            .await
            .context("Failed to parse live-detail response")?;
        Ok(body.content.unwrap_or_default())
    }

    /// Fetch live info. Failures are logged and yield an empty [`LiveContent`].
    pub async fn fetch_live_content(&self, channel: &Channel, cookies: &Cookies) -> LiveContent {
        tracing::debug!(channel = %channel.name, "fetching live info");
        match self.try_fetch(channel, cookies).await {
            Ok(content) => {
                tracing::debug!(channel = %channel.name, ?content, "fetched live info");
                content
            }
            Err(e) => {
                tracing::error!(channel = %channel.name, "Failed to fetch live info: {:#}", e);
                LiveContent::default()
            }
        }
    }
}
