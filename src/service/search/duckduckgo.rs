//! Web search backed by the DuckDuckGo HTML results page.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use crate::base::{config::Config, types::Res};

use super::{GenericSearchClient, SearchClient};

const USER_AGENT: &str = concat!("lead-gen-crew/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Base used to resolve the protocol-relative redirect links on the results page.
const REDIRECT_BASE: &str = "https://duckduckgo.com/";

/// One organic search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

// Extra methods on `SearchClient` applied by the duckduckgo implementation.

impl SearchClient {
    pub fn duckduckgo(config: &Config) -> Res<Self> {
        let client = DuckDuckGoSearchClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Specific implementations.

/// DuckDuckGo search client implementation.
#[derive(Clone)]
pub struct DuckDuckGoSearchClient {
    client: Client,
    endpoint: Url,
    max_results: usize,
}

impl DuckDuckGoSearchClient {
    #[instrument(name = "DuckDuckGoSearchClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let endpoint = Url::parse(&config.search_endpoint).map_err(|e| anyhow::anyhow!("Invalid search endpoint `{}`: {e}", config.search_endpoint))?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!("Search endpoint `{endpoint}` must use http or https."));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?;

        Ok(Self {
            client,
            endpoint,
            max_results: config.search_max_results,
        })
    }
}

#[async_trait]
impl GenericSearchClient for DuckDuckGoSearchClient {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    #[instrument(name = "DuckDuckGoSearchClient::search", skip(self))]
    async fn search(&self, query: &str) -> Res<String> {
        let response = self.client.get(self.endpoint.clone()).query(&[("q", query)]).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Search request failed: {status} - {error_text}"));
        }

        let body = response.text().await?;
        let hits = parse_results(&body, self.max_results)?;
        debug!("Search returned {} results.", hits.len());

        Ok(format_results(query, &hits))
    }
}

fn selector(css: &'static str) -> Res<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("Invalid selector `{css}`: {e:?}"))
}

/// Extract up to `max_results` organic results from a results page, skipping ads.
pub fn parse_results(html: &str, max_results: usize) -> Res<Vec<SearchHit>> {
    let result_selector = selector("div.result")?;
    let title_selector = selector(".result__title a, a.result__a")?;
    let url_selector = selector(".result__url")?;
    let snippet_selector = selector(".result__snippet")?;

    let document = Html::parse_document(html);

    let hits = document
        .select(&result_selector)
        .filter(|result| !result.value().classes().any(|c| c == "result--ad"))
        .filter_map(|result| {
            let title_link = result.select(&title_selector).next()?;
            let title = element_text(title_link);

            if title.is_empty() {
                return None;
            }

            let display_url = result.select(&url_selector).next().map(element_text).unwrap_or_default();
            let url = title_link.value().attr("href").and_then(decode_result_link).unwrap_or(display_url);
            let snippet = result.select(&snippet_selector).next().map(element_text).unwrap_or_default();

            Some(SearchHit { title, url, snippet })
        })
        .take(max_results)
        .collect();

    Ok(hits)
}

/// Resolve a result link, unwrapping DuckDuckGo's `uddg` redirect when present.
fn decode_result_link(href: &str) -> Option<String> {
    let url = Url::parse(REDIRECT_BASE).ok()?.join(href).ok()?;

    match url.query_pairs().find(|(key, _)| key == "uddg") {
        Some((_, target)) => Some(target.into_owned()),
        None => Some(url.to_string()),
    }
}

/// Collapse an element's text into a single line.
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Render search hits as a numbered Markdown list.
pub fn format_results(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results found for `{query}`.");
    }

    hits.iter()
        .enumerate()
        .map(|(index, hit)| {
            let mut entry = format!("{}. **{}**", index + 1, hit.title);

            if !hit.url.is_empty() {
                entry.push_str(&format!("\n   {}", hit.url));
            }

            if !hit.snippet.is_empty() {
                entry.push_str(&format!("\n   {}", hit.snippet));
            }

            entry
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

// Tests.
