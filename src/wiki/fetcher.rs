use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use shorts_core::GroupRecord;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Trait for article sources
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Body of a 200 response, `None` for any other status
    async fn fetch(&self, url: &str) -> Result<Option<String>>;
}

/// Page source backed by HTTP
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(timeout_seconds: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("kpop-shorts/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> Result<Option<String>> {
        let response = self.client.get(url).send().await?;

        if response.status() != StatusCode::OK {
            debug!("HTTP {} for {}", response.status(), url);
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }
}

/// Which group name found the article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameUsed {
    English,
    Alternative,
    Korean,
}

impl fmt::Display for NameUsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::English => "english",
            Self::Alternative => "alternative",
            Self::Korean => "korean",
        };
        f.write_str(name)
    }
}

/// A fetched article
#[derive(Debug, Clone)]
pub struct WikiPage {
    pub html: String,
    pub name_used: NameUsed,
    pub url: String,
}

/// Stored intro of one group; every field is null when no article was found
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupWikiInfo {
    pub info: Option<Vec<String>>,
    pub name_used: Option<NameUsed>,
    pub url: Option<String>,
}

/// Intro file contents keyed by english group name
pub type WikiInfoMap = IndexMap<String, GroupWikiInfo>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WikiStats {
    pub english: usize,
    pub alternative: usize,
    pub korean: usize,
    pub failed: usize,
}

impl WikiStats {
    pub fn record(&mut self, name_used: Option<NameUsed>) {
        match name_used {
            Some(NameUsed::English) => self.english += 1,
            Some(NameUsed::Alternative) => self.alternative += 1,
            Some(NameUsed::Korean) => self.korean += 1,
            None => self.failed += 1,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Stats: {} found with English name, {} with alternative name, {} with Korean name, {} failed",
            self.english, self.alternative, self.korean, self.failed
        )
    }
}

/// Article URL for a page title, spaces become underscores
pub fn page_url(base_url: &str, name: &str) -> String {
    let title = name.trim().replace(' ', "_");
    format!("{}{}", base_url, urlencoding::encode(&title))
}

/// Finds a group's article by trying its names in order
pub struct WikiFetcher<S: PageSource> {
    source: S,
    base_url: String,
}

impl<S: PageSource> WikiFetcher<S> {
    pub fn new(source: S, base_url: &str) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        Self { source, base_url }
    }

    fn candidates(group: &GroupRecord) -> Vec<(NameUsed, &str)> {
        [
            (NameUsed::English, Some(group.english.as_str())),
            (NameUsed::Alternative, group.alternative.as_deref()),
            (NameUsed::Korean, Some(group.korean.as_str())),
        ]
        .into_iter()
        .filter_map(|(used, name)| name.filter(|n| !n.trim().is_empty()).map(|n| (used, n)))
        .collect()
    }

    /// Try english, alternative, then korean name. Request errors count as a
    /// miss for that name.
    pub async fn fetch_group(&self, group: &GroupRecord) -> Option<WikiPage> {
        for (name_used, name) in Self::candidates(group) {
            let url = page_url(&self.base_url, name);

            match self.source.fetch(&url).await {
                Ok(Some(html)) => {
                    return Some(WikiPage {
                        html,
                        name_used,
                        url,
                    })
                }
                Ok(None) => debug!("No article at {}", url),
                Err(e) => warn!("Error fetching {}: {}", url, e),
            }
        }

        None
    }
}
