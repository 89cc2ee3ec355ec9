use crate::{
    error::{Error, Result},
    util::ensure_dir,
};
use log::{debug, info, warn};
use reqwest::Client;
use scraper::Html;
use std::path::PathBuf;
use urlencoding::encode;

/// Source of raw catalog pages, addressed by page identifier
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// Returns the raw HTML of the page
    async fn fetch(&self, page_id: &str) -> Result<String>;
}

/// Response of a network retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieved {
    pub status: u16,
    /// Undecoded response body
    pub body: Vec<u8>,
}

impl Retrieved {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network retrieval of a URL
#[allow(async_fn_in_trait)]
pub trait Retrieve {
    async fn retrieve(&self, url: &str) -> Result<Retrieved>;
}

/// [`Retrieve`] over HTTP
#[derive(Debug, Clone, Default)]
pub struct HttpRetriever {
    client: Client,
}

impl HttpRetriever {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Retrieve for HttpRetriever {
    async fn retrieve(&self, url: &str) -> Result<Retrieved> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(Retrieved { status, body })
    }
}

/// Fetches pages through an on-disk cache holding one file per page identifier
///
/// A page present in the cache is never retrieved again. There is no expiry;
/// delete the cache file to force a refetch.
#[derive(Debug, Clone)]
pub struct CachedFetcher<R = HttpRetriever> {
    base_url: String,
    cache_dir: PathBuf,
    retriever: R,
}

impl CachedFetcher<HttpRetriever> {
    /// Creates a fetcher retrieving cache misses over HTTP
    pub fn http(base_url: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self::new(base_url, cache_dir, HttpRetriever::default())
    }
}

impl<R: Retrieve> CachedFetcher<R> {
    pub fn new(base_url: impl Into<String>, cache_dir: impl Into<PathBuf>, retriever: R) -> Self {
        Self {
            base_url: base_url.into(),
            cache_dir: cache_dir.into(),
            retriever,
        }
    }

    /// Cache file of a page identifier
    ///
    /// # Returns
    /// The path, or [`Error::InvalidPageId`] for an empty identifier
    pub fn cache_path(&self, page_id: &str) -> Result<PathBuf> {
        let name = cache_file_name(page_id)?;
        Ok(self.cache_dir.join(name))
    }

    /// Absolute URL of a page identifier
    pub fn url(&self, page_id: &str) -> String {
        if page_id.starts_with("http://") || page_id.starts_with("https://") {
            page_id.to_string()
        } else {
            format!("{}{}", self.base_url, page_id)
        }
    }
}

impl<R: Retrieve> Fetch for CachedFetcher<R> {
    async fn fetch(&self, page_id: &str) -> Result<String> {
        let path = self.cache_path(page_id)?;

        if path.is_file() {
            debug!("Cache hit for {page_id}");
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| Error::io(&path, e))?;
            return Ok(decode(&bytes));
        }

        let url = self.url(page_id);
        info!("Fetching {url}");

        let retrieved = self.retriever.retrieve(&url).await?;
        if !retrieved.is_success() {
            // The body is cached and parsed anyway; an error page yields no courses
            warn!("Retrieval of {url} failed with status {}", retrieved.status);
        }

        ensure_dir(&self.cache_dir)?;
        tokio::fs::write(&path, &retrieved.body)
            .await
            .map_err(|e| Error::io(&path, e))?;

        Ok(decode(&retrieved.body))
    }
}

/// Decodes a raw page, replacing invalid UTF-8 sequences
fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Fetches a page and parses it into a document tree
pub async fn fetch_document<F: Fetch>(fetcher: &F, page_id: &str) -> Result<Html> {
    let raw = fetcher.fetch(page_id).await?;
    Ok(Html::parse_document(&raw))
}

/// Maps a page identifier to a file name that stays inside the cache directory
///
/// Percent-encoding keeps distinct identifiers on distinct files and leaves no
/// path separator in the name.
fn cache_file_name(page_id: &str) -> Result<String> {
    let trimmed = page_id.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        return Err(Error::InvalidPageId(page_id.to_string()));
    }

    Ok(encode(trimmed).into_owned())
}
